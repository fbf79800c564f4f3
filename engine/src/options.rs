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

//! Option negotiation state tracking (RFC 1143 Q-method)
//!
//! Every Telnet option is negotiated twice, on two independent
//! half-channels: the *local* half (we send WILL/WONT, the peer answers
//! DO/DONT) tracks whether we perform the option, the *remote* half (the
//! peer sends WILL/WONT, we answer DO/DONT) tracks whether the peer
//! performs it. [`OptionTable`] holds one [`QState`] flag per (option,
//! half-channel) and implements the RFC 1143 transition rules, which
//! guarantee two well-behaved endpoints can never enter a negotiation
//! loop.

use crate::consts;
use std::fmt::Formatter;
use tracing::debug;

/// The Telnet options this engine negotiates.
///
/// Each variant corresponds to one option code from the IANA registry;
/// codes without a module here round-trip through
/// [`TelnetOption::Unknown`] so they can still be refused and logged.
///
/// [Telnet Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::ECHO`] Telnet Echo Option [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    NAWS,
    /// [`consts::option::CHARSET`] Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    Charset,
    /// [`consts::option::MSDP`] Mud Server Data Protocol [MSDP](https://tintin.mudhalla.net/protocols/msdp/)
    MSDP,
    /// [`consts::option::MSSP`] Mud Server Status Protocol [MSSP](https://tintin.mudhalla.net/protocols/mssp/)
    MSSP,
    /// [`consts::option::COMPRESS2`] Mud Client Compression Protocol version 2 [MCCP](https://tintin.mudhalla.net/protocols/mccp/)
    Compress2,
    /// [`consts::option::COMPRESS3`] Mud Client Compression Protocol version 3 [MCCP](https://tintin.mudhalla.net/protocols/mccp/)
    Compress3,
    /// [`consts::option::GMCP`] Generic Mud Communication Protocol [GMCP](https://www.gammon.com.au/gmcp)
    GMCP,
    /// Any option this engine has no module for
    Unknown(u8),
}

impl TelnetOption {
    /// Converts this `TelnetOption` into its wire byte.
    ///
    /// # Returns
    ///
    /// The option code defined under [`consts::option`], or the raw byte
    /// carried by the [`TelnetOption::Unknown`] variant.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::TelnetOption;
    ///
    /// assert_eq!(TelnetOption::Echo.to_u8(), 1);
    /// assert_eq!(TelnetOption::GMCP.to_u8(), 201);
    /// assert_eq!(TelnetOption::Unknown(99).to_u8(), 99);
    /// ```
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::MSDP => consts::option::MSDP,
            TelnetOption::MSSP => consts::option::MSSP,
            TelnetOption::Compress2 => consts::option::COMPRESS2,
            TelnetOption::Compress3 => consts::option::COMPRESS3,
            TelnetOption::GMCP => consts::option::GMCP,
            TelnetOption::Unknown(byte) => byte,
        }
    }

    /// Converts a wire byte into the corresponding `TelnetOption`.
    ///
    /// # Arguments
    ///
    /// * `byte` - An option code as it appears after DO/DONT/WILL/WONT/SB
    ///   on the wire
    ///
    /// # Returns
    ///
    /// The matching variant, or [`TelnetOption::Unknown`] carrying the
    /// original byte when no module claims the code. The conversion is
    /// lossless in both directions.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::TelnetOption;
    ///
    /// assert_eq!(TelnetOption::from_u8(31), TelnetOption::NAWS);
    /// assert_eq!(TelnetOption::from_u8(42), TelnetOption::Charset);
    /// assert_eq!(TelnetOption::from_u8(7), TelnetOption::Unknown(7));
    /// ```
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::CHARSET => TelnetOption::Charset,
            consts::option::MSDP => TelnetOption::MSDP,
            consts::option::MSSP => TelnetOption::MSSP,
            consts::option::COMPRESS2 => TelnetOption::Compress2,
            consts::option::COMPRESS3 => TelnetOption::Compress3,
            consts::option::GMCP => TelnetOption::GMCP,
            byte => TelnetOption::Unknown(byte),
        }
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::Echo => write!(f, "Echo"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::Charset => write!(f, "Charset"),
            TelnetOption::MSDP => write!(f, "MSDP"),
            TelnetOption::MSSP => write!(f, "MSSP"),
            TelnetOption::Compress2 => write!(f, "Compress2"),
            TelnetOption::Compress3 => write!(f, "Compress3"),
            TelnetOption::GMCP => write!(f, "GMCP"),
            TelnetOption::Unknown(option) => write!(f, "Unknown({option})"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Which half-channel of an option negotiation is meant.
///
/// In the Telnet protocol, option negotiation involves two independent
/// paths: one for what the local side performs and one for what the
/// remote side performs. `TelnetSide` disambiguates between these two
/// perspectives when reporting option state changes.
///
/// # Variants
///
/// ## `Local`
///
/// Whether *we* perform the option.
/// - We send `WILL` (agreement to perform) or `WONT` (refusal to perform)
/// - The peer answers `DO` (asking us to perform) or `DONT`
///
/// ```text
/// Local: WILL <option>  →  Remote
/// Remote: DO <option>   →  Local
/// ```
///
/// ## `Remote`
///
/// Whether the *peer* performs the option.
/// - We send `DO` (asking them to perform) or `DONT`
/// - The peer answers `WILL` or `WONT`
///
/// ```text
/// Local: DO <option>    →  Remote
/// Remote: WILL <option> →  Local
/// ```
///
/// # See Also
///
/// - [`TelnetOption`]: the option being negotiated
/// - [`QState`]: the per-half-channel negotiation flag
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetSide {
    /// The local half-channel (whether we perform the option)
    Local,
    /// The remote half-channel (whether the peer performs the option)
    Remote,
}

impl std::fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetSide::Local => write!(f, "Local"),
            TelnetSide::Remote => write!(f, "Remote"),
        }
    }
}

/// The four option negotiation verbs of RFC 854.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// We desire to perform the option
    Will,
    /// We refuse to perform the option
    Wont,
    /// We ask the peer to perform the option
    Do,
    /// We ask the peer to stop performing the option
    Dont,
}

impl NegotiationVerb {
    /// Converts this verb into its wire byte.
    ///
    /// # Returns
    ///
    /// The command byte that follows IAC on the wire: [`consts::WILL`],
    /// [`consts::WONT`], [`consts::DO`] or [`consts::DONT`].
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::NegotiationVerb;
    ///
    /// assert_eq!(NegotiationVerb::Will.to_u8(), 251);
    /// assert_eq!(NegotiationVerb::Dont.to_u8(), 254);
    /// ```
    pub fn to_u8(self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }
}

impl std::fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// RFC 1143 negotiation flag.
///
/// One flag per (option, half-channel). At most one `Want*` may be
/// outstanding per half-channel. An opposite reply to an outstanding
/// request resolves per RFC 1143: a refusal answering `WantYes` lands on
/// `No`, an enable answering `WantNo` forces the option back to `Yes`.
/// A new request in the opposite direction while a `Want*` is pending is
/// ignored rather than queued.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum QState {
    /// The option is off
    #[default]
    No,
    /// We asked to turn the option on and await the answer
    WantYes,
    /// The option is on
    Yes,
    /// We asked to turn the option off and await the answer
    WantNo,
}

impl std::fmt::Display for QState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QState::No => write!(f, "No"),
            QState::WantYes => write!(f, "WantYes"),
            QState::Yes => write!(f, "Yes"),
            QState::WantNo => write!(f, "WantNo"),
        }
    }
}

/// What a processed negotiation verb did to a half-channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OptionOutcome {
    /// The half-channel reached `Yes`
    Enabled,
    /// The half-channel left the enabled set for `No`
    Disabled,
    /// Our pending request was declined before it ever took effect
    Refused,
}

/// The result of feeding one negotiation verb through the table.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NegotiationReply {
    /// The verb to answer with, if an answer is owed
    pub respond: Option<NegotiationVerb>,
    /// The observable transition, if the half-channel changed meaningfully
    pub outcome: Option<(TelnetSide, OptionOutcome)>,
}

#[derive(Clone, Copy, Debug, Default)]
struct OptionState {
    local: QState,
    remote: QState,
}

#[derive(Clone, Copy, Debug, Default)]
struct SupportState {
    local: bool,
    remote: bool,
}

/// Per-option negotiation state for a whole session.
///
/// `support` is fixed at build time from the registered plugins' policies;
/// `state` holds the live Q-method flags. Options without support answer
/// every WILL/DO with the matching refusal and never change state, which
/// is what keeps an unknown option from looping.
pub(crate) struct OptionTable {
    support: [SupportState; 256],
    state: [OptionState; 256],
}

impl OptionTable {
    pub fn new() -> OptionTable {
        OptionTable {
            support: [SupportState {
                local: false,
                remote: false,
            }; 256],
            state: [OptionState {
                local: QState::No,
                remote: QState::No,
            }; 256],
        }
    }

    /// Marks an option as acceptable on one or both half-channels.
    pub fn allow(&mut self, option: TelnetOption, local: bool, remote: bool) {
        let slot = &mut self.support[option.to_u8() as usize];
        slot.local = slot.local || local;
        slot.remote = slot.remote || remote;
    }

    /// Whether a plugin supports the option on the local half-channel.
    pub fn is_supported_local(&self, option: TelnetOption) -> bool {
        self.support[option.to_u8() as usize].local
    }

    /// Whether a plugin supports the option on the remote half-channel.
    pub fn is_supported_remote(&self, option: TelnetOption) -> bool {
        self.support[option.to_u8() as usize].remote
    }

    /// Whether we currently perform the option.
    ///
    /// `WantNo` still counts as enabled: disablement is not final until
    /// the peer confirms it.
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        matches!(
            self.state[option.to_u8() as usize].local,
            QState::Yes | QState::WantNo
        )
    }

    /// Whether the peer currently performs the option.
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        matches!(
            self.state[option.to_u8() as usize].remote,
            QState::Yes | QState::WantNo
        )
    }

    /// Ask to start performing the option ourselves.
    ///
    /// # Returns
    ///
    /// `Some(Will)` when a WILL must go on the wire (the half-channel
    /// moved to `WantYes`), `None` when the option is unsupported, the
    /// request is already in flight, or a disable is still pending.
    pub fn request_will(&mut self, option: TelnetOption) -> Option<NegotiationVerb> {
        let idx = option.to_u8() as usize;
        if !self.support[idx].local {
            return None;
        }
        match self.state[idx].local {
            QState::No => {
                self.state[idx].local = QState::WantYes;
                Some(NegotiationVerb::Will)
            }
            QState::WantNo => {
                // One request may be outstanding per half-channel.
                debug!("WILL {option} requested while WONT pending, ignored");
                None
            }
            QState::WantYes | QState::Yes => None,
        }
    }

    /// Ask the peer to start performing the option.
    ///
    /// # Returns
    ///
    /// `Some(Do)` when a DO must go on the wire, `None` when no message
    /// is owed (see [`OptionTable::request_will`]).
    pub fn request_do(&mut self, option: TelnetOption) -> Option<NegotiationVerb> {
        let idx = option.to_u8() as usize;
        if !self.support[idx].remote {
            return None;
        }
        match self.state[idx].remote {
            QState::No => {
                self.state[idx].remote = QState::WantYes;
                Some(NegotiationVerb::Do)
            }
            QState::WantNo => {
                debug!("DO {option} requested while DONT pending, ignored");
                None
            }
            QState::WantYes | QState::Yes => None,
        }
    }

    /// Ask to stop performing the option ourselves.
    ///
    /// # Returns
    ///
    /// `Some(Wont)` when a WONT must go on the wire (the half-channel
    /// moved to `WantNo`), `None` when the option is already off or an
    /// enable is still pending.
    pub fn request_wont(&mut self, option: TelnetOption) -> Option<NegotiationVerb> {
        let idx = option.to_u8() as usize;
        match self.state[idx].local {
            QState::Yes => {
                self.state[idx].local = QState::WantNo;
                Some(NegotiationVerb::Wont)
            }
            QState::WantYes => {
                debug!("WONT {option} requested while WILL pending, ignored");
                None
            }
            QState::No | QState::WantNo => None,
        }
    }

    /// Ask the peer to stop performing the option.
    ///
    /// # Returns
    ///
    /// `Some(Dont)` when a DONT must go on the wire, `None` when no
    /// message is owed (see [`OptionTable::request_wont`]).
    pub fn request_dont(&mut self, option: TelnetOption) -> Option<NegotiationVerb> {
        let idx = option.to_u8() as usize;
        match self.state[idx].remote {
            QState::Yes => {
                self.state[idx].remote = QState::WantNo;
                Some(NegotiationVerb::Dont)
            }
            QState::WantYes => {
                debug!("DONT {option} requested while DO pending, ignored");
                None
            }
            QState::No | QState::WantNo => None,
        }
    }

    /// Feed one verb received from the peer through the table.
    ///
    /// # Arguments
    ///
    /// * `verb` - The negotiation verb the peer sent
    /// * `option` - The option the verb names
    ///
    /// # Returns
    ///
    /// A [`NegotiationReply`] carrying the verb to answer with (if any)
    /// and the half-channel transition the caller must surface to the
    /// owning plugin (if any). Duplicate verbs that match the current
    /// flag are idempotent: no reply, no transition.
    pub fn receive(&mut self, verb: NegotiationVerb, option: TelnetOption) -> NegotiationReply {
        match verb {
            NegotiationVerb::Do => self.receive_do(option),
            NegotiationVerb::Dont => self.receive_dont(option),
            NegotiationVerb::Will => self.receive_will(option),
            NegotiationVerb::Wont => self.receive_wont(option),
        }
    }

    /// Peer asks us to perform the option.
    fn receive_do(&mut self, option: TelnetOption) -> NegotiationReply {
        let idx = option.to_u8() as usize;
        if !self.support[idx].local {
            return NegotiationReply {
                respond: Some(NegotiationVerb::Wont),
                outcome: None,
            };
        }
        match self.state[idx].local {
            QState::No => {
                self.state[idx].local = QState::Yes;
                NegotiationReply {
                    respond: Some(NegotiationVerb::Will),
                    outcome: Some((TelnetSide::Local, OptionOutcome::Enabled)),
                }
            }
            QState::WantYes => {
                // Our WILL was answered; no further reply owed.
                self.state[idx].local = QState::Yes;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Local, OptionOutcome::Enabled)),
                }
            }
            QState::Yes => NegotiationReply::default(),
            QState::WantNo => {
                // Our WONT was answered with DO: the disable attempt
                // failed and the option stays in force (RFC 1143,
                // WANTNO + enable reply -> YES).
                self.state[idx].local = QState::Yes;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Local, OptionOutcome::Enabled)),
                }
            }
        }
    }

    /// Peer asks us to stop performing the option.
    fn receive_dont(&mut self, option: TelnetOption) -> NegotiationReply {
        let idx = option.to_u8() as usize;
        match self.state[idx].local {
            QState::No => NegotiationReply::default(),
            QState::Yes | QState::WantNo => {
                self.state[idx].local = QState::No;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Local, OptionOutcome::Disabled)),
                }
            }
            QState::WantYes => {
                // WANTYES + refusal -> NO.
                self.state[idx].local = QState::No;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Local, OptionOutcome::Refused)),
                }
            }
        }
    }

    /// Peer offers to perform the option.
    fn receive_will(&mut self, option: TelnetOption) -> NegotiationReply {
        let idx = option.to_u8() as usize;
        if !self.support[idx].remote {
            return NegotiationReply {
                respond: Some(NegotiationVerb::Dont),
                outcome: None,
            };
        }
        match self.state[idx].remote {
            QState::No => {
                self.state[idx].remote = QState::Yes;
                NegotiationReply {
                    respond: Some(NegotiationVerb::Do),
                    outcome: Some((TelnetSide::Remote, OptionOutcome::Enabled)),
                }
            }
            QState::WantYes => {
                self.state[idx].remote = QState::Yes;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Remote, OptionOutcome::Enabled)),
                }
            }
            QState::Yes => NegotiationReply::default(),
            QState::WantNo => {
                // Our DONT was answered with WILL: the peer keeps the
                // option in force (RFC 1143, WANTNO + enable reply ->
                // YES).
                self.state[idx].remote = QState::Yes;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Remote, OptionOutcome::Enabled)),
                }
            }
        }
    }

    /// Peer refuses or stops performing the option.
    fn receive_wont(&mut self, option: TelnetOption) -> NegotiationReply {
        let idx = option.to_u8() as usize;
        match self.state[idx].remote {
            QState::No => NegotiationReply::default(),
            QState::Yes | QState::WantNo => {
                self.state[idx].remote = QState::No;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Remote, OptionOutcome::Disabled)),
                }
            }
            QState::WantYes => {
                self.state[idx].remote = QState::No;
                NegotiationReply {
                    respond: None,
                    outcome: Some((TelnetSide::Remote, OptionOutcome::Refused)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(option: TelnetOption) -> OptionTable {
        let mut table = OptionTable::new();
        table.allow(option, true, true);
        table
    }

    #[test]
    fn request_will_from_no_moves_to_wantyes() {
        let mut opts = table(TelnetOption::Echo);
        assert_eq!(
            opts.request_will(TelnetOption::Echo),
            Some(NegotiationVerb::Will)
        );
        assert!(!opts.local_enabled(TelnetOption::Echo));
        // Duplicate request emits nothing.
        assert_eq!(opts.request_will(TelnetOption::Echo), None);
    }

    #[test]
    fn receive_do_completes_pending_will_without_reply() {
        let mut opts = table(TelnetOption::Echo);
        opts.request_will(TelnetOption::Echo);
        let reply = opts.receive(NegotiationVerb::Do, TelnetOption::Echo);
        assert_eq!(reply.respond, None);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Local, OptionOutcome::Enabled))
        );
        assert!(opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn receive_do_unsolicited_answers_will() {
        let mut opts = table(TelnetOption::Echo);
        let reply = opts.receive(NegotiationVerb::Do, TelnetOption::Echo);
        assert_eq!(reply.respond, Some(NegotiationVerb::Will));
        assert!(opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn receive_will_unsupported_answers_dont() {
        let mut opts = OptionTable::new();
        let reply = opts.receive(NegotiationVerb::Will, TelnetOption::Unknown(99));
        assert_eq!(reply.respond, Some(NegotiationVerb::Dont));
        assert!(reply.outcome.is_none());
        assert!(!opts.remote_enabled(TelnetOption::Unknown(99)));
    }

    #[test]
    fn receive_wont_while_yes_disables_silently() {
        let mut opts = table(TelnetOption::Echo);
        opts.receive(NegotiationVerb::Will, TelnetOption::Echo);
        assert!(opts.remote_enabled(TelnetOption::Echo));
        let reply = opts.receive(NegotiationVerb::Wont, TelnetOption::Echo);
        assert_eq!(reply.respond, None);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Remote, OptionOutcome::Disabled))
        );
        assert!(!opts.remote_enabled(TelnetOption::Echo));
    }

    #[test]
    fn refusal_of_pending_do_reports_refused() {
        let mut opts = table(TelnetOption::NAWS);
        assert_eq!(
            opts.request_do(TelnetOption::NAWS),
            Some(NegotiationVerb::Do)
        );
        let reply = opts.receive(NegotiationVerb::Wont, TelnetOption::NAWS);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Remote, OptionOutcome::Refused))
        );
        assert!(!opts.remote_enabled(TelnetOption::NAWS));
    }

    #[test]
    fn do_answering_pending_wont_forces_yes() {
        let mut opts = table(TelnetOption::Echo);
        opts.receive(NegotiationVerb::Do, TelnetOption::Echo);
        opts.request_wont(TelnetOption::Echo);
        // Peer answers our WONT with DO: WANTNO + enable reply -> YES.
        let reply = opts.receive(NegotiationVerb::Do, TelnetOption::Echo);
        assert_eq!(reply.respond, None);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Local, OptionOutcome::Enabled))
        );
        assert!(opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn will_answering_pending_dont_forces_yes() {
        let mut opts = table(TelnetOption::Echo);
        opts.receive(NegotiationVerb::Will, TelnetOption::Echo);
        opts.request_dont(TelnetOption::Echo);
        // Peer answers our DONT with WILL: WANTNO + enable reply -> YES.
        let reply = opts.receive(NegotiationVerb::Will, TelnetOption::Echo);
        assert_eq!(reply.respond, None);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Remote, OptionOutcome::Enabled))
        );
        assert!(opts.remote_enabled(TelnetOption::Echo));
    }

    #[test]
    fn dont_confirming_pending_wont_lands_on_no() {
        let mut opts = table(TelnetOption::Echo);
        opts.receive(NegotiationVerb::Do, TelnetOption::Echo);
        opts.request_wont(TelnetOption::Echo);
        let reply = opts.receive(NegotiationVerb::Dont, TelnetOption::Echo);
        assert_eq!(reply.respond, None);
        assert_eq!(
            reply.outcome,
            Some((TelnetSide::Local, OptionOutcome::Disabled))
        );
        assert!(!opts.local_enabled(TelnetOption::Echo));
    }

    #[test]
    fn duplicate_will_while_yes_is_silent() {
        let mut opts = table(TelnetOption::GMCP);
        opts.receive(NegotiationVerb::Will, TelnetOption::GMCP);
        let reply = opts.receive(NegotiationVerb::Will, TelnetOption::GMCP);
        assert_eq!(reply.respond, None);
        assert!(reply.outcome.is_none());
    }

    #[test]
    fn option_round_trips_all_codes() {
        for byte in 0..=255u8 {
            assert_eq!(TelnetOption::from_u8(byte).to_u8(), byte);
        }
    }
}
