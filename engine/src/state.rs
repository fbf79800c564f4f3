//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Framing state machine
//!
//! Separates in-band application bytes from Telnet command sequences, one
//! input byte at a time. The machine mirrors the RFC 854 parsing positions
//! as an explicit tagged enum so every transition is matched exhaustively.

use crate::consts;
use crate::options::NegotiationVerb;
use bytes::{BufMut, BytesMut};
use tracing::warn;

/// Current parsing position in the inbound byte stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FramerState {
    /// Plain application data
    Data,
    /// An IAC was read, the command byte follows
    IacReceived,
    /// `IAC DO`, the option byte follows
    ExpectDo,
    /// `IAC DONT`, the option byte follows
    ExpectDont,
    /// `IAC WILL`, the option byte follows
    ExpectWill,
    /// `IAC WONT`, the option byte follows
    ExpectWont,
    /// `IAC SB`, the option byte follows
    SubnegotiationStart,
    /// Accumulating a subnegotiation payload for the given option
    SubnegotiationBody(u8),
    /// An IAC inside a subnegotiation body; SE, IAC or violation follows
    SubnegotiationIac(u8),
}

/// What a single stepped byte produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum FramerAction {
    /// Nothing observable; the machine only moved state
    None,
    /// One in-band application byte (IAC IAC already unescaped)
    Application(u8),
    /// A complete three-byte negotiation: verb plus raw option code
    Negotiation(NegotiationVerb, u8),
    /// A complete subnegotiation: option code plus unescaped payload
    Subnegotiation(u8, BytesMut),
}

/// The lexical layer of the interpreter.
///
/// Owns the subnegotiation assembly buffer. The buffer is cleared when a
/// subnegotiation begins and taken whole when SE arrives, so it is empty
/// between subnegotiations.
pub(crate) struct Framer {
    state: FramerState,
    buffer: BytesMut,
}

impl Framer {
    pub fn new() -> Framer {
        Framer {
            state: FramerState::Data,
            buffer: BytesMut::new(),
        }
    }

    #[cfg(test)]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Steps the machine by one input byte.
    pub fn step(&mut self, byte: u8) -> FramerAction {
        match (self.state, byte) {
            (FramerState::Data, consts::IAC) => {
                self.state = FramerState::IacReceived;
                FramerAction::None
            }
            (FramerState::Data, _) => FramerAction::Application(byte),

            (FramerState::IacReceived, consts::IAC) => {
                // Escaped IAC: a literal 0xFF data byte.
                self.state = FramerState::Data;
                FramerAction::Application(consts::IAC)
            }
            (FramerState::IacReceived, consts::DO) => {
                self.state = FramerState::ExpectDo;
                FramerAction::None
            }
            (FramerState::IacReceived, consts::DONT) => {
                self.state = FramerState::ExpectDont;
                FramerAction::None
            }
            (FramerState::IacReceived, consts::WILL) => {
                self.state = FramerState::ExpectWill;
                FramerAction::None
            }
            (FramerState::IacReceived, consts::WONT) => {
                self.state = FramerState::ExpectWont;
                FramerAction::None
            }
            (FramerState::IacReceived, consts::SB) => {
                self.state = FramerState::SubnegotiationStart;
                FramerAction::None
            }
            (FramerState::IacReceived, consts::SE) => {
                warn!("received SE outside subnegotiation, ignored");
                self.state = FramerState::Data;
                FramerAction::None
            }
            (
                FramerState::IacReceived,
                consts::NOP
                | consts::DM
                | consts::BRK
                | consts::IP
                | consts::AO
                | consts::AYT
                | consts::EC
                | consts::EL
                | consts::GA,
            ) => {
                // Single-byte commands carry no payload for this engine.
                self.state = FramerState::Data;
                FramerAction::None
            }
            (FramerState::IacReceived, _) => {
                warn!("received unknown command {byte:#04X}, ignored");
                self.state = FramerState::Data;
                FramerAction::None
            }

            (FramerState::ExpectDo, _) => {
                self.state = FramerState::Data;
                FramerAction::Negotiation(NegotiationVerb::Do, byte)
            }
            (FramerState::ExpectDont, _) => {
                self.state = FramerState::Data;
                FramerAction::Negotiation(NegotiationVerb::Dont, byte)
            }
            (FramerState::ExpectWill, _) => {
                self.state = FramerState::Data;
                FramerAction::Negotiation(NegotiationVerb::Will, byte)
            }
            (FramerState::ExpectWont, _) => {
                self.state = FramerState::Data;
                FramerAction::Negotiation(NegotiationVerb::Wont, byte)
            }

            (FramerState::SubnegotiationStart, _) => {
                self.state = FramerState::SubnegotiationBody(byte);
                self.buffer.clear();
                FramerAction::None
            }
            (FramerState::SubnegotiationBody(option), consts::IAC) => {
                self.state = FramerState::SubnegotiationIac(option);
                FramerAction::None
            }
            (FramerState::SubnegotiationBody(_), _) => {
                self.buffer.put_u8(byte);
                FramerAction::None
            }
            (FramerState::SubnegotiationIac(option), consts::SE) => {
                self.state = FramerState::Data;
                FramerAction::Subnegotiation(option, self.buffer.split())
            }
            (FramerState::SubnegotiationIac(option), consts::IAC) => {
                self.state = FramerState::SubnegotiationBody(option);
                self.buffer.put_u8(consts::IAC);
                FramerAction::None
            }
            (FramerState::SubnegotiationIac(option), _) => {
                warn!(
                    "received {byte:#04X} inside subnegotiation for option {option}, \
                     discarding partial payload"
                );
                self.state = FramerState::Data;
                self.buffer.clear();
                FramerAction::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(framer: &mut Framer, bytes: &[u8]) -> Vec<FramerAction> {
        bytes
            .iter()
            .map(|b| framer.step(*b))
            .filter(|a| *a != FramerAction::None)
            .collect()
    }

    #[test]
    fn plain_data_passes_through() {
        let mut framer = Framer::new();
        let actions = run(&mut framer, b"hi\r\n");
        assert_eq!(
            actions,
            vec![
                FramerAction::Application(b'h'),
                FramerAction::Application(b'i'),
                FramerAction::Application(consts::CR),
                FramerAction::Application(consts::LF),
            ]
        );
    }

    #[test]
    fn escaped_iac_yields_literal_byte() {
        let mut framer = Framer::new();
        let actions = run(&mut framer, &[consts::IAC, consts::IAC]);
        assert_eq!(actions, vec![FramerAction::Application(0xFF)]);
    }

    #[test]
    fn negotiation_verbs_dispatch_with_option() {
        let mut framer = Framer::new();
        let actions = run(
            &mut framer,
            &[
                consts::IAC,
                consts::WILL,
                consts::option::ECHO,
                consts::IAC,
                consts::DONT,
                consts::option::NAWS,
            ],
        );
        assert_eq!(
            actions,
            vec![
                FramerAction::Negotiation(NegotiationVerb::Will, consts::option::ECHO),
                FramerAction::Negotiation(NegotiationVerb::Dont, consts::option::NAWS),
            ]
        );
    }

    #[test]
    fn subnegotiation_collects_payload_and_unescapes() {
        let mut framer = Framer::new();
        let actions = run(
            &mut framer,
            &[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0x00,
                0xFF,
                0xFF, // escaped literal 0xFF
                0x00,
                0x50,
                consts::IAC,
                consts::SE,
            ],
        );
        assert_eq!(
            actions,
            vec![FramerAction::Subnegotiation(
                consts::option::NAWS,
                BytesMut::from(&[0x00, 0xFF, 0x00, 0x50][..]),
            )]
        );
        assert_eq!(framer.buffer_len(), 0);
    }

    #[test]
    fn violation_inside_subnegotiation_discards_buffer() {
        let mut framer = Framer::new();
        let actions = run(
            &mut framer,
            &[
                consts::IAC,
                consts::SB,
                consts::option::GMCP,
                b'x',
                consts::IAC,
                consts::NOP, // neither SE nor IAC
                b'y',
            ],
        );
        // The stray byte aborts the subnegotiation; 'y' is back in band.
        assert_eq!(actions, vec![FramerAction::Application(b'y')]);
        assert_eq!(framer.buffer_len(), 0);
    }

    #[test]
    fn stray_se_is_ignored() {
        let mut framer = Framer::new();
        let actions = run(&mut framer, &[consts::IAC, consts::SE, b'a']);
        assert_eq!(actions, vec![FramerAction::Application(b'a')]);
    }
}
