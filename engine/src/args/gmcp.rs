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

//! Generic Mud Communication Protocol payload codec
//!
//! <https://tintin.mudhalla.net/protocols/gmcp/>
//!
//! GMCP carries structured, typed data between a MUD server and its
//! client as UTF-8 text keyed by a dotted package name. The payload is
//! conventionally JSON, but this codec treats it as opaque text.

use bytes::BytesMut;
use std::fmt;

/// A GMCP message: a dotted package name plus an optional UTF-8 payload.
///
/// Each GMCP message consists of a package name and optional data. The
/// two are separated by a single ASCII space on the wire:
/// `<package.subpackage.command> <data>`. No JSON validation is
/// performed here; the data portion passes through verbatim.
///
/// # Examples
///
/// ```text
/// Core.Hello {"client": "TinTin++", "version": "2.02.0"}
/// Char.Vitals {"hp": 100, "maxhp": 120, "mp": 50, "maxmp": 80}
/// Room.Info {"num": 1234, "name": "Town Square"}
/// Core.Ping
/// ```
///
/// # References
///
/// - [GMCP Protocol Specification](https://tintin.mudhalla.net/protocols/gmcp/)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GmcpMessage {
    /// The package name (e.g., "Core.Hello", "Char.Vitals", "MSDP").
    /// Package names are typically case-insensitive, except for "MSDP"
    /// which must be fully capitalized when tunneling MSDP over GMCP.
    package: String,

    /// Optional data payload, separated from the package by one space.
    data: Option<String>,
}

impl GmcpMessage {
    /// Creates a new GMCP message with a package name and payload.
    ///
    /// # Arguments
    ///
    /// * `package` - The package name (e.g., "Core.Hello", "Char.Vitals")
    /// * `data` - The payload text, conventionally JSON
    ///
    /// # Returns
    ///
    /// A message whose encoded form is `package SP data`.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::gmcp::GmcpMessage;
    ///
    /// let msg = GmcpMessage::new("Core.Hello", r#"{"client":"MyClient"}"#);
    /// assert_eq!(msg.package(), "Core.Hello");
    /// ```
    pub fn new<S: Into<String>, D: Into<String>>(package: S, data: D) -> Self {
        Self {
            package: package.into(),
            data: Some(data.into()),
        }
    }

    /// Creates a GMCP message without data (command only).
    ///
    /// # Arguments
    ///
    /// * `package` - The package name
    ///
    /// # Returns
    ///
    /// A message whose encoded form is the bare package name.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::gmcp::GmcpMessage;
    ///
    /// let msg = GmcpMessage::command("Core.Ping");
    /// assert_eq!(msg.data(), None);
    /// ```
    pub fn command<S: Into<String>>(package: S) -> Self {
        Self {
            package: package.into(),
            data: None,
        }
    }

    /// Parses a GMCP message from an unescaped subnegotiation payload.
    ///
    /// The format is `<package> <data>` or just `<package>`: the package
    /// token runs to the first ASCII space, and the remainder - spaces
    /// included - is the data.
    ///
    /// # Arguments
    ///
    /// * `payload` - The raw GMCP subnegotiation payload
    ///
    /// # Returns
    ///
    /// `Some(GmcpMessage)` when the payload is valid UTF-8, `None`
    /// otherwise.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::gmcp::GmcpMessage;
    ///
    /// let msg = GmcpMessage::parse(b"Core.Hello {\"client\":\"Test\"}").unwrap();
    /// assert_eq!(msg.package(), "Core.Hello");
    /// assert_eq!(msg.data(), Some(r#"{"client":"Test"}"#));
    /// ```
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(payload).ok()?;
        match text.split_once(' ') {
            Some((package, data)) => Some(Self {
                package: package.to_string(),
                data: Some(data.to_string()),
            }),
            None => Some(Self {
                package: text.to_string(),
                data: None,
            }),
        }
    }

    /// Returns the package name.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the data payload if present.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Returns the encoded byte length of this message.
    ///
    /// # Returns
    ///
    /// The package length, plus one separator byte and the data length
    /// when data is present.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::gmcp::GmcpMessage;
    ///
    /// assert_eq!(GmcpMessage::command("Core.Ping").len(), 9);
    /// assert_eq!(GmcpMessage::new("Core.Hello", r#"{"v":1}"#).len(), 18);
    /// ```
    pub fn len(&self) -> usize {
        self.package.len() + self.data.as_ref().map_or(0, |data| 1 + data.len())
    }

    /// Checks whether the message has no package name.
    pub fn is_empty(&self) -> bool {
        self.package.is_empty()
    }

    /// Encodes the GMCP message to bytes.
    ///
    /// # Returns
    ///
    /// A [`BytesMut`] containing `package`, or `package SP data` when
    /// data is present. The inverse of [`GmcpMessage::parse`].
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::gmcp::GmcpMessage;
    ///
    /// let msg = GmcpMessage::new("Core.Hello", r#"{"v":1}"#);
    /// assert_eq!(&msg.encode()[..], br#"Core.Hello {"v":1}"#);
    /// ```
    pub fn encode(&self) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(self.len());
        bytes.extend_from_slice(self.package.as_bytes());
        if let Some(data) = &self.data {
            bytes.extend_from_slice(b" ");
            bytes.extend_from_slice(data.as_bytes());
        }
        bytes
    }
}

impl fmt::Display for GmcpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(data) = &self.data {
            write!(f, " {data}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_data() {
        let msg = GmcpMessage::parse(b"Core.Hello {\"client\":\"Test\"}").unwrap();
        assert_eq!(msg.package(), "Core.Hello");
        assert_eq!(msg.data(), Some(r#"{"client":"Test"}"#));
    }

    #[test]
    fn parse_without_data() {
        let msg = GmcpMessage::parse(b"Core.Ping").unwrap();
        assert_eq!(msg.package(), "Core.Ping");
        assert_eq!(msg.data(), None);
    }

    #[test]
    fn parse_rejects_invalid_utf8() {
        assert_eq!(GmcpMessage::parse(&[0xC0, 0x80]), None);
    }

    #[test]
    fn encode_joins_with_single_space() {
        let msg = GmcpMessage::new("Core.Hello", r#"{"v":1}"#);
        assert_eq!(&msg.encode()[..], br#"Core.Hello {"v":1}"#);
    }

    #[test]
    fn encode_command_only() {
        let msg = GmcpMessage::command("Core.Ping");
        assert_eq!(&msg.encode()[..], b"Core.Ping");
    }

    #[test]
    fn round_trip() {
        let original = GmcpMessage::new("Char.Vitals", r#"{"hp":100,"mp":50}"#);
        let parsed = GmcpMessage::parse(&original.encode()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn message_payload_is_verbatim_past_first_space() {
        let msg = GmcpMessage::parse(b"Comm.Channel say hello world").unwrap();
        assert_eq!(msg.package(), "Comm.Channel");
        assert_eq!(msg.data(), Some("say hello world"));
    }
}
