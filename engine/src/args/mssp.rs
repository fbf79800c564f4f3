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

//! Mud Server Status Protocol payload codec
//!
//! <https://tintin.mudhalla.net/protocols/mssp/>
//!
//! MSSP sends server self-description to crawlers and clients as a flat
//! series of variable/value pairs: `VAR name VAL value`, with repeated
//! VAL entries forming an array. The wire carries only strings; the
//! typed [`MsspValue`] exists so applications can populate a config in
//! natural types and let the serializer render them.

use crate::consts;
use crate::result::TelnetResult;
use bytes::{Buf, BufMut};
use std::collections::BTreeMap;
use tracing::warn;

/// Well-known MSSP variable names.
pub mod variables {
    /// Name of the MUD
    pub const NAME: &str = "NAME";
    /// Current number of logged-in players
    pub const PLAYERS: &str = "PLAYERS";
    /// Unix timestamp of the last reboot
    pub const UPTIME: &str = "UPTIME";
    /// Name of the codebase
    pub const CODEBASE: &str = "CODEBASE";
    /// Contact email address
    pub const CONTACT: &str = "CONTACT";
    /// Website URL
    pub const WEBSITE: &str = "WEBSITE";
    /// Listening port, repeated for each port
    pub const PORT: &str = "PORT";
    /// Whether UTF-8 is supported ("1"/"0")
    pub const UTF_8: &str = "UTF-8";
    /// Whether ANSI color is supported ("1"/"0")
    pub const ANSI: &str = "ANSI";
    /// Whether VT100 interface is supported ("1"/"0")
    pub const VT100: &str = "VT100";
    /// Gameplay style
    pub const GAMEPLAY: &str = "GAMEPLAY";
    /// Genre of the game
    pub const GENRE: &str = "GENRE";
    /// Development status
    pub const STATUS: &str = "STATUS";
    /// Number of areas
    pub const AREAS: &str = "AREAS";
    /// Number of rooms
    pub const ROOMS: &str = "ROOMS";
    /// Number of mobiles
    pub const MOBILES: &str = "MOBILES";
    /// Codebase family
    pub const FAMILY: &str = "FAMILY";
}

/// One MSSP variable value.
///
/// The wire only carries strings; the tags exist so applications can
/// populate a config in natural types and the serializer renders them:
/// integers in decimal, booleans as `"1"`/`"0"`, arrays as repeated VAL
/// entries. A `Nested` map is flattened one level into dotted variable
/// names at serialization time; deeper nesting is not representable and
/// the offending entry is skipped with a warning.
///
/// # Example
/// ```
/// use mudwire_engine::mssp::MsspValue;
///
/// let players: MsspValue = 52i64.into();
/// let ansi: MsspValue = true.into();
/// assert_eq!(players, MsspValue::Integer(52));
/// assert_eq!(ansi, MsspValue::Boolean(true));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MsspValue {
    /// A string value
    String(String),
    /// An integer, rendered in decimal
    Integer(i64),
    /// A boolean, rendered as "1" or "0"
    Boolean(bool),
    /// An array of strings, rendered as repeated VAL entries
    StringArray(Vec<String>),
    /// A nested map, flattened into `PREFIX.KEY` variables
    Nested(BTreeMap<String, MsspValue>),
}

impl MsspValue {
    fn render(&self) -> Option<String> {
        match self {
            MsspValue::String(value) => Some(value.clone()),
            MsspValue::Integer(value) => Some(value.to_string()),
            MsspValue::Boolean(value) => Some(if *value { "1" } else { "0" }.to_string()),
            MsspValue::StringArray(_) | MsspValue::Nested(_) => None,
        }
    }
}

impl From<&str> for MsspValue {
    fn from(value: &str) -> Self {
        MsspValue::String(value.to_string())
    }
}

impl From<String> for MsspValue {
    fn from(value: String) -> Self {
        MsspValue::String(value)
    }
}

impl From<i64> for MsspValue {
    fn from(value: i64) -> Self {
        MsspValue::Integer(value)
    }
}

impl From<bool> for MsspValue {
    fn from(value: bool) -> Self {
        MsspValue::Boolean(value)
    }
}

/// A server status table: variable names mapped to values.
///
/// Produced by the application on the server side and serialized on each
/// agreed MSSP exchange; decoded into on the client side. Kept sorted so
/// the wire image is deterministic.
///
/// # Example
/// ```
/// use mudwire_engine::mssp::{MsspConfig, variables};
///
/// let mut config = MsspConfig::new();
/// config.set(variables::NAME, "Moonbase");
/// config.set(variables::PLAYERS, 3i64);
/// config.set(variables::ANSI, true);
/// assert_eq!(config.len(), 3);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MsspConfig(BTreeMap<String, MsspValue>);

impl MsspConfig {
    /// Creates a new, empty `MsspConfig`.
    ///
    /// # Returns
    ///
    /// A config with no variables.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::mssp::MsspConfig;
    ///
    /// let config = MsspConfig::new();
    /// assert!(config.is_empty());
    /// ```
    pub fn new() -> MsspConfig {
        MsspConfig(BTreeMap::new())
    }

    /// Sets a variable, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name (see [`variables`] for the
    ///   well-known set)
    /// * `value` - The value, or anything convertible into an
    ///   [`MsspValue`] (`&str`, `String`, `i64`, `bool`)
    pub fn set<V: Into<MsspValue>>(&mut self, name: &str, value: V) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Retrieves the value associated with the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name to look up
    ///
    /// # Returns
    ///
    /// `Some(&MsspValue)` if the variable exists, otherwise `None`.
    pub fn get(&self, name: &str) -> Option<&MsspValue> {
        self.0.get(name)
    }

    /// Returns the number of top-level variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the config holds no variables.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MsspValue)> {
        self.0.iter()
    }

    /// Encodes the config into a buffer as VAR/VAL pairs.
    ///
    /// Scalars render to their string form, arrays fan out as one VAR
    /// with repeated VALs, and nested maps flatten one level into dotted
    /// names. Bytes that would corrupt the framing (NUL, IAC and the
    /// VAR/VAL markers) are filtered out of names and values.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded pairs
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::mssp::MsspConfig;
    ///
    /// let mut config = MsspConfig::new();
    /// config.set("PLAYERS", 52i64);
    /// let mut buffer = BytesMut::new();
    /// config.encode(&mut buffer).unwrap();
    /// // VAR "PLAYERS" VAL "52"
    /// assert_eq!(buffer[0], 0x01);
    /// assert_eq!(&buffer[8..], &[0x02, b'5', b'2'][..]);
    /// ```
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        let mut written = 0;
        for (name, value) in &self.0 {
            written += write_variable(dst, name, value, false);
        }
        Ok(written)
    }

    /// Decodes a config from an unescaped subnegotiation payload.
    ///
    /// Tokenizes on the VAR/VAL markers: every VAR opens a variable, and
    /// the run of VALs that follows forms its value. Values always come
    /// back as strings (single VAL) or string arrays (repeated VAL); the
    /// wire carries no type tags to recover.
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`] holding the payload
    ///
    /// # Returns
    ///
    /// The decoded config. Variables with an empty name are skipped.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::mssp::{MsspConfig, MsspValue};
    ///
    /// let mut wire = BytesMut::new();
    /// wire.extend_from_slice(&[0x01]);
    /// wire.extend_from_slice(b"NAME");
    /// wire.extend_from_slice(&[0x02]);
    /// wire.extend_from_slice(b"Moonbase");
    /// let config = MsspConfig::decode(&mut wire).unwrap();
    /// assert_eq!(config.get("NAME"), Some(&MsspValue::String("Moonbase".into())));
    /// ```
    pub fn decode<T: Buf>(src: &mut T) -> TelnetResult<MsspConfig> {
        let mut config = MsspConfig::new();
        // Skip anything before the first VAR.
        while src.has_remaining() && src.chunk()[0] != consts::option::mssp::VAR {
            src.advance(1);
        }
        while src.has_remaining() {
            src.advance(1); // VAR
            let name = read_token(src);
            let mut values = Vec::new();
            while src.has_remaining() && src.chunk()[0] == consts::option::mssp::VAL {
                src.advance(1);
                values.push(read_token(src));
            }
            if name.is_empty() {
                continue;
            }
            let value = match values.len() {
                0 => MsspValue::String(String::new()),
                1 => MsspValue::String(values.into_iter().next().unwrap_or_default()),
                _ => MsspValue::StringArray(values),
            };
            config.0.insert(name, value);
        }
        Ok(config)
    }
}

/// Reads bytes until the next VAR/VAL marker or end of input.
fn read_token<T: Buf>(src: &mut T) -> String {
    let mut token = Vec::new();
    while src.has_remaining() {
        let byte = src.chunk()[0];
        if byte == consts::option::mssp::VAR || byte == consts::option::mssp::VAL {
            break;
        }
        token.push(src.get_u8());
    }
    String::from_utf8_lossy(&token).into_owned()
}

fn write_variable<T: BufMut>(dst: &mut T, name: &str, value: &MsspValue, nested: bool) -> usize {
    match value {
        MsspValue::StringArray(values) => {
            let mut written = put_marked(dst, consts::option::mssp::VAR, name);
            for value in values {
                written += put_marked(dst, consts::option::mssp::VAL, value);
            }
            written
        }
        MsspValue::Nested(map) => {
            if nested {
                warn!("MSSP variable {name} nests deeper than one level, skipped");
                return 0;
            }
            let mut written = 0;
            for (key, inner) in map {
                let flat = format!("{name}.{key}");
                written += write_variable(dst, &flat, inner, true);
            }
            written
        }
        scalar => {
            let rendered = scalar.render().unwrap_or_default();
            put_marked(dst, consts::option::mssp::VAR, name)
                + put_marked(dst, consts::option::mssp::VAL, &rendered)
        }
    }
}

/// Writes a marker byte followed by the text, dropping bytes that would
/// corrupt the framing (NUL, IAC and the markers themselves).
fn put_marked<T: BufMut>(dst: &mut T, marker: u8, text: &str) -> usize {
    dst.put_u8(marker);
    let mut written = 1;
    for &byte in text.as_bytes() {
        if byte == consts::NUL
            || byte == consts::IAC
            || byte == consts::option::mssp::VAR
            || byte == consts::option::mssp::VAL
        {
            continue;
        }
        dst.put_u8(byte);
        written += 1;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    const VAR: u8 = 1;
    const VAL: u8 = 2;

    #[test]
    fn scalar_pairs_encode_in_name_order() {
        let mut config = MsspConfig::new();
        config.set(variables::NAME, "Haon Dor");
        config.set(variables::ANSI, true);
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let mut expected = vec![VAR];
        expected.extend_from_slice(b"ANSI");
        expected.push(VAL);
        expected.extend_from_slice(b"1");
        expected.push(VAR);
        expected.extend_from_slice(b"NAME");
        expected.push(VAL);
        expected.extend_from_slice(b"Haon Dor");
        assert_eq!(&buffer[..], &expected[..]);
    }

    #[test]
    fn integers_render_in_decimal() {
        let mut config = MsspConfig::new();
        config.set(variables::PLAYERS, 52i64);
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let expected = [&[VAR][..], b"PLAYERS", &[VAL], b"52"].concat();
        assert_eq!(&buffer[..], &expected[..]);
    }

    #[test]
    fn arrays_emit_one_var_many_vals() {
        let mut config = MsspConfig::new();
        config.set(
            variables::PORT,
            MsspValue::StringArray(vec!["4000".into(), "4001".into()]),
        );
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let expected = [&[VAR][..], b"PORT", &[VAL], b"4000", &[VAL], b"4001"].concat();
        assert_eq!(&buffer[..], &expected[..]);
    }

    #[test]
    fn nested_maps_flatten_to_dotted_names() {
        let mut inner = BTreeMap::new();
        inner.insert("DISCORD".to_string(), MsspValue::from("https://disc"));
        let mut config = MsspConfig::new();
        config.set("EXTRA", MsspValue::Nested(inner));
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let expected = [&[VAR][..], b"EXTRA.DISCORD", &[VAL], b"https://disc"].concat();
        assert_eq!(&buffer[..], &expected[..]);
    }

    #[test]
    fn decode_groups_consecutive_vals_into_arrays() {
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(&[VAR]);
        buffer.extend_from_slice(b"PORT");
        buffer.extend_from_slice(&[VAL]);
        buffer.extend_from_slice(b"4000");
        buffer.extend_from_slice(&[VAL]);
        buffer.extend_from_slice(b"4001");
        buffer.extend_from_slice(&[VAR]);
        buffer.extend_from_slice(b"NAME");
        buffer.extend_from_slice(&[VAL]);
        buffer.extend_from_slice(b"Mud");
        let config = MsspConfig::decode(&mut buffer).unwrap();
        assert_eq!(
            config.get("PORT"),
            Some(&MsspValue::StringArray(vec!["4000".into(), "4001".into()]))
        );
        assert_eq!(config.get("NAME"), Some(&MsspValue::String("Mud".into())));
    }

    #[test]
    fn string_arrays_survive_a_round_trip() {
        let mut config = MsspConfig::new();
        config.set(
            variables::PORT,
            MsspValue::StringArray(vec!["23".into(), "4000".into()]),
        );
        config.set(variables::NAME, "Moonbase");
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let decoded = MsspConfig::decode(&mut buffer).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn framing_bytes_are_filtered_from_values() {
        let mut config = MsspConfig::new();
        config.set("NAME", "bad\u{0001}name");
        let mut buffer = BytesMut::new();
        config.encode(&mut buffer).unwrap();
        let expected = [&[VAR][..], b"NAME", &[VAL], b"badname"].concat();
        assert_eq!(&buffer[..], &expected[..]);
    }
}
