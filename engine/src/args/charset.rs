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

//! Charset negotiation payload codec (RFC 2066)
//!
//! <https://tools.ietf.org/html/rfc2066>
//!
//! Once the CHARSET option is agreed, the offering side proposes a list
//! of character set names and the answering side either accepts one of
//! them or rejects the lot. The commands below are the first byte of
//! each subnegotiation payload.

use crate::consts;
use crate::result::{TelnetError, TelnetResult};
use bytes::{BufMut, BytesMut};

/// The default name separator used in REQUEST payloads.
pub const DEFAULT_SEPARATOR: u8 = b';';

/// One CHARSET subnegotiation command.
///
/// A REQUEST carries its separator byte followed by the offered charset
/// names, each preceded by the separator:
/// `REQUEST ';' "UTF-8" ';' "ISO-8859-1"`. The receiver answers with
/// ACCEPTED plus one of the offered names, or REJECTED. Translation
/// tables are not supported by this engine; a received TTABLE-IS is
/// answered with TTABLE-REJECTED.
///
/// # Example
/// ```
/// use mudwire_engine::charset::CharsetCommand;
///
/// let request = CharsetCommand::request(["UTF-8", "ISO-8859-1"]);
/// assert_eq!(request.len(), 1 + ";UTF-8;ISO-8859-1".len());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CharsetCommand {
    /// Offer a list of charsets, most preferred first
    Request {
        /// The byte separating the offered names
        separator: u8,
        /// The offered charset names in preference order
        charsets: Vec<String>,
    },
    /// Accept the named charset
    Accepted(String),
    /// Use none of the offered charsets
    Rejected,
    /// A translation table was offered (payload kept verbatim)
    TtableIs(BytesMut),
    /// The received translation table cannot be handled
    TtableRejected,
}

impl CharsetCommand {
    /// Builds a REQUEST for the given names with the default `;`
    /// separator.
    ///
    /// # Arguments
    ///
    /// * `charsets` - The names to offer, most preferred first
    ///
    /// # Returns
    ///
    /// A [`CharsetCommand::Request`] using [`DEFAULT_SEPARATOR`].
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::charset::CharsetCommand;
    ///
    /// let request = CharsetCommand::request(["UTF-8"]);
    /// assert!(matches!(request, CharsetCommand::Request { separator: b';', .. }));
    /// ```
    pub fn request<I, S>(charsets: I) -> CharsetCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CharsetCommand::Request {
            separator: DEFAULT_SEPARATOR,
            charsets: charsets.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the encoded payload length of this command.
    ///
    /// # Returns
    ///
    /// The number of bytes [`CharsetCommand::encode`] would write: one
    /// command byte, plus one separator per offered name for a REQUEST,
    /// plus the name bytes themselves.
    pub fn len(&self) -> usize {
        match self {
            CharsetCommand::Request {
                charsets,
                separator: _,
            } => {
                // Command byte plus one separator per name.
                1 + charsets.iter().map(|name| 1 + name.len()).sum::<usize>()
            }
            CharsetCommand::Accepted(name) => 1 + name.len(),
            CharsetCommand::Rejected | CharsetCommand::TtableRejected => 1,
            CharsetCommand::TtableIs(payload) => 1 + payload.len(),
        }
    }

    /// Whether the encoded payload would be empty.
    ///
    /// # Returns
    ///
    /// Always `false`; every command carries at least its command byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this command into a buffer.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the payload bytes (command byte first)
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written, equal to
    /// [`CharsetCommand::len`].
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::charset::CharsetCommand;
    ///
    /// let mut buffer = BytesMut::new();
    /// CharsetCommand::Accepted("UTF-8".into())
    ///     .encode(&mut buffer)
    ///     .unwrap();
    /// assert_eq!(&buffer[..], b"\x02UTF-8");
    /// ```
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        match self {
            CharsetCommand::Request {
                separator,
                charsets,
            } => {
                dst.put_u8(consts::option::charset::REQUEST);
                for name in charsets {
                    dst.put_u8(*separator);
                    dst.put_slice(name.as_bytes());
                }
            }
            CharsetCommand::Accepted(name) => {
                dst.put_u8(consts::option::charset::ACCEPTED);
                dst.put_slice(name.as_bytes());
            }
            CharsetCommand::Rejected => dst.put_u8(consts::option::charset::REJECTED),
            CharsetCommand::TtableIs(payload) => {
                dst.put_u8(consts::option::charset::TTABLE_IS);
                dst.put_slice(payload);
            }
            CharsetCommand::TtableRejected => dst.put_u8(consts::option::charset::TTABLE_REJECTED),
        }
        Ok(self.len())
    }

    /// Decodes a command from an unescaped subnegotiation payload.
    ///
    /// Byte 0 selects the command. For a REQUEST, byte 1 is the
    /// separator and the remainder is split on it; empty segments are
    /// skipped so both `;UTF-8` and `;;UTF-8` decode to one name.
    ///
    /// # Arguments
    ///
    /// * `payload` - The payload between `IAC SB CHARSET` and `IAC SE`,
    ///   already stripped of IAC escaping
    ///
    /// # Returns
    ///
    /// The decoded [`CharsetCommand`].
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::ProtocolViolation`] for an empty payload,
    /// an unknown command byte, a REQUEST with no separator or no names,
    /// or an ACCEPTED with no name. The caller drops that subnegotiation
    /// and keeps the session.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::charset::CharsetCommand;
    ///
    /// let decoded = CharsetCommand::decode(b"\x01;UTF-8;ISO-8859-1").unwrap();
    /// assert_eq!(
    ///     decoded,
    ///     CharsetCommand::Request {
    ///         separator: b';',
    ///         charsets: vec!["UTF-8".into(), "ISO-8859-1".into()],
    ///     }
    /// );
    /// ```
    pub fn decode(payload: &[u8]) -> TelnetResult<CharsetCommand> {
        let violation = |reason: String| TelnetError::ProtocolViolation {
            option: Some(consts::option::CHARSET),
            reason,
        };
        let (&command, rest) = payload
            .split_first()
            .ok_or_else(|| violation("empty charset payload".into()))?;
        match command {
            consts::option::charset::REQUEST => {
                let (&separator, names) = rest
                    .split_first()
                    .ok_or_else(|| violation("charset request without separator".into()))?;
                let charsets = names
                    .split(|b| *b == separator)
                    .filter(|name| !name.is_empty())
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .collect::<Vec<_>>();
                if charsets.is_empty() {
                    return Err(violation("charset request offered no names".into()));
                }
                Ok(CharsetCommand::Request {
                    separator,
                    charsets,
                })
            }
            consts::option::charset::ACCEPTED => {
                if rest.is_empty() {
                    return Err(violation("charset accepted without a name".into()));
                }
                Ok(CharsetCommand::Accepted(
                    String::from_utf8_lossy(rest).into_owned(),
                ))
            }
            consts::option::charset::REJECTED => Ok(CharsetCommand::Rejected),
            consts::option::charset::TTABLE_IS => {
                Ok(CharsetCommand::TtableIs(BytesMut::from(rest)))
            }
            consts::option::charset::TTABLE_REJECTED => Ok(CharsetCommand::TtableRejected),
            byte => Err(violation(format!("unknown charset command {byte:#04X}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_encodes_with_leading_separator() {
        let mut buffer = BytesMut::new();
        CharsetCommand::request(["UTF-8", "ISO-8859-1"])
            .encode(&mut buffer)
            .unwrap();
        assert_eq!(&buffer[..], b"\x01;UTF-8;ISO-8859-1");
    }

    #[test]
    fn request_decodes_names_in_order() {
        let decoded = CharsetCommand::decode(b"\x01;UTF-16;UTF-8;ISO-8859-1").unwrap();
        assert_eq!(
            decoded,
            CharsetCommand::Request {
                separator: b';',
                charsets: vec!["UTF-16".into(), "UTF-8".into(), "ISO-8859-1".into()],
            }
        );
    }

    #[test]
    fn accepted_round_trips() {
        let mut buffer = BytesMut::new();
        CharsetCommand::Accepted("UTF-8".into())
            .encode(&mut buffer)
            .unwrap();
        assert_eq!(&buffer[..], b"\x02UTF-8");
        assert_eq!(
            CharsetCommand::decode(&buffer).unwrap(),
            CharsetCommand::Accepted("UTF-8".into())
        );
    }

    #[test]
    fn rejected_is_a_single_byte() {
        let mut buffer = BytesMut::new();
        CharsetCommand::Rejected.encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..], &[0x03]);
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(CharsetCommand::decode(&[]).is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(CharsetCommand::decode(&[0x09, b'x']).is_err());
    }

    #[test]
    fn ttable_is_decodes_for_rejection() {
        let decoded = CharsetCommand::decode(b"\x04\x01stuff").unwrap();
        assert!(matches!(decoded, CharsetCommand::TtableIs(_)));
    }
}
