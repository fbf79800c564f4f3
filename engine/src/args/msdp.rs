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

//! Mud Server Data Protocol payload codec
//!
//! <https://tintin.mudhalla.net/protocols/msdp/>
//!
//! MSDP carries structured out-of-band data as a recursive tree: strings,
//! arrays (`ARRAY_OPEN (VAL value)* ARRAY_CLOSE`) and tables
//! (`TABLE_OPEN (VAR name VAL value)* TABLE_CLOSE`). [`MsdpTable::scan`]
//! reads a payload as the implicit outermost table and
//! [`MsdpTable::report`] serializes one back; the two are inverses for
//! well-formed data.

use crate::consts::option::msdp;
use crate::result::TelnetResult;
use bytes::{Buf, BufMut};
use std::collections::BTreeMap;

/// One MSDP value: a string, an array of values or a table of named
/// values.
///
/// Values are constructed by decoding and consumed by the application
/// callback; the engine never retains them.
///
/// # Example
/// ```
/// use mudwire_engine::msdp::{MsdpTable, MsdpValue};
///
/// let mut table = MsdpTable::new();
/// table.set("LIST", MsdpValue::string("COMMANDS"));
/// assert_eq!(table.get("LIST"), Some(&MsdpValue::string("COMMANDS")));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MsdpValue {
    /// Scalar bytes, terminated by the next structural byte
    String(String),
    /// An ordered list of values
    Array(MsdpArray),
    /// A nested name/value table
    Table(MsdpTable),
}

impl MsdpValue {
    /// Creates a new string value.
    ///
    /// # Arguments
    ///
    /// * `value` - The string content
    ///
    /// # Returns
    ///
    /// A new `MsdpValue::String` variant.
    pub fn string(value: &str) -> MsdpValue {
        MsdpValue::String(value.to_string())
    }

    /// Returns the encoded length of this value.
    ///
    /// # Returns
    ///
    /// The number of bytes [`MsdpValue::encode`] would write, including
    /// any structural markers for arrays and tables.
    pub fn len(&self) -> usize {
        match self {
            MsdpValue::String(value) => value.len(),
            MsdpValue::Array(array) => array.len(),
            MsdpValue::Table(table) => table.len(),
        }
    }

    /// Whether the encoded form is empty.
    ///
    /// # Returns
    ///
    /// `true` only for an empty string; arrays and tables always carry
    /// their delimiters.
    pub fn is_empty(&self) -> bool {
        matches!(self, MsdpValue::String(value) if value.is_empty())
    }

    /// Encodes this value into a buffer.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded bytes
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        match self {
            MsdpValue::String(value) => {
                dst.put_slice(value.as_bytes());
                Ok(value.len())
            }
            MsdpValue::Array(array) => array.encode(dst),
            MsdpValue::Table(table) => table.encode(dst),
        }
    }

    /// Decodes one value, dispatching on the first byte.
    ///
    /// The value type is detected from the leading byte:
    /// - `ARRAY_OPEN` begins an array
    /// - `TABLE_OPEN` begins a table
    /// - anything else is scalar bytes running until the next structural
    ///   byte (`VAR`, `VAL`, `ARRAY_CLOSE` or `TABLE_CLOSE`)
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`] positioned at the value
    ///
    /// # Returns
    ///
    /// The decoded value; an exhausted buffer yields an empty string.
    pub fn decode<T: Buf>(src: &mut T) -> TelnetResult<MsdpValue> {
        if !src.has_remaining() {
            return Ok(MsdpValue::String(String::new()));
        }
        match src.chunk()[0] {
            msdp::ARRAY_OPEN => Ok(MsdpValue::Array(MsdpArray::decode(src)?)),
            msdp::TABLE_OPEN => Ok(MsdpValue::Table(MsdpTable::decode(src)?)),
            _ => {
                // Scalar bytes run until the next structural byte.
                let mut value = Vec::new();
                while src.has_remaining() {
                    let byte = src.chunk()[0];
                    if byte == msdp::VAR
                        || byte == msdp::VAL
                        || byte == msdp::ARRAY_CLOSE
                        || byte == msdp::TABLE_CLOSE
                    {
                        break;
                    }
                    value.push(src.get_u8());
                }
                Ok(MsdpValue::String(
                    String::from_utf8_lossy(&value).into_owned(),
                ))
            }
        }
    }
}

impl std::fmt::Display for MsdpValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsdpValue::String(value) => std::fmt::Display::fmt(value, f),
            MsdpValue::Array(array) => std::fmt::Display::fmt(array, f),
            MsdpValue::Table(table) => std::fmt::Display::fmt(table, f),
        }
    }
}

impl From<&str> for MsdpValue {
    fn from(value: &str) -> Self {
        MsdpValue::String(value.to_string())
    }
}

/// An ordered collection of MSDP values.
///
/// Arrays are used in MSDP to represent lists of values. Each array is
/// delimited by `ARRAY_OPEN` and `ARRAY_CLOSE` bytes, with individual
/// elements preceded by `VAL` markers.
///
/// # Example
/// ```
/// use mudwire_engine::msdp::{MsdpArray, MsdpValue};
///
/// let mut array = MsdpArray::new();
/// array.push(MsdpValue::string("COMMANDS"));
/// array.push(MsdpValue::string("JIM"));
/// assert_eq!(array.items(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MsdpArray(Vec<MsdpValue>);

impl MsdpArray {
    /// Creates a new empty array.
    ///
    /// # Returns
    ///
    /// An `MsdpArray` with no elements.
    pub fn new() -> MsdpArray {
        MsdpArray(Vec::new())
    }

    /// Adds a value to the end of the array.
    ///
    /// # Arguments
    ///
    /// * `value` - The value (or anything convertible into one) to
    ///   append
    pub fn push<V: Into<MsdpValue>>(&mut self, value: V) {
        self.0.push(value.into());
    }

    /// Retrieves a reference to the value at the specified index.
    ///
    /// # Arguments
    ///
    /// * `index` - The zero-based index of the element
    ///
    /// # Returns
    ///
    /// `Some(&MsdpValue)` if the index is valid, otherwise `None`.
    pub fn get(&self, index: usize) -> Option<&MsdpValue> {
        self.0.get(index)
    }

    /// Returns the number of elements in the array.
    pub fn items(&self) -> usize {
        self.0.len()
    }

    /// Returns the encoded length of this array.
    ///
    /// # Returns
    ///
    /// The total number of bytes [`MsdpArray::encode`] would write: the
    /// `ARRAY_OPEN`/`ARRAY_CLOSE` delimiters plus a `VAL` marker and the
    /// encoded length of every element.
    pub fn len(&self) -> usize {
        2 + self.0.iter().map(|value| 1 + value.len()).sum::<usize>()
    }

    /// Whether the encoded form is empty.
    ///
    /// # Returns
    ///
    /// Always `false`; an encoded array is never shorter than its two
    /// delimiters.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this array into a buffer.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded bytes
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        dst.put_u8(msdp::ARRAY_OPEN);
        let mut written = 2;
        for value in &self.0 {
            dst.put_u8(msdp::VAL);
            written += 1 + value.encode(dst)?;
        }
        dst.put_u8(msdp::ARRAY_CLOSE);
        Ok(written)
    }

    /// Decodes an array from a buffer positioned at `ARRAY_OPEN`.
    ///
    /// Elements are read at each `VAL` marker until the matching
    /// `ARRAY_CLOSE`; stray bytes between elements are skipped.
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`]
    ///
    /// # Returns
    ///
    /// The decoded array.
    pub fn decode<T: Buf>(src: &mut T) -> TelnetResult<MsdpArray> {
        let mut array = MsdpArray::new();
        if src.has_remaining() && src.chunk()[0] == msdp::ARRAY_OPEN {
            src.advance(1);
        }
        while src.has_remaining() {
            let byte = src.chunk()[0];
            if byte == msdp::ARRAY_CLOSE {
                src.advance(1);
                break;
            } else if byte == msdp::VAL {
                src.advance(1);
                array.0.push(MsdpValue::decode(src)?);
            } else {
                // Unexpected byte, skip it.
                src.advance(1);
            }
        }
        Ok(array)
    }
}

impl std::fmt::Display for MsdpArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            std::fmt::Display::fmt(value, f)?;
        }
        write!(f, "]")
    }
}

impl<V: Into<MsdpValue>> FromIterator<V> for MsdpArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        MsdpArray(iter.into_iter().map(Into::into).collect())
    }
}

/// A name/value table, the unit every MSDP payload is built from.
///
/// Tables represent structured data with named fields. Each table is
/// delimited by `TABLE_OPEN` and `TABLE_CLOSE` bytes, with each pair
/// preceded by `VAR` and `VAL` markers respectively. Keys are kept
/// sorted so serialization is deterministic and equal tables produce
/// equal wire images.
///
/// # Example
/// ```
/// use bytes::BytesMut;
/// use mudwire_engine::msdp::MsdpTable;
///
/// let mut table = MsdpTable::new();
/// table.set("LIST", "COMMANDS");
///
/// let mut wire = BytesMut::new();
/// table.report(&mut wire).unwrap();
/// let scanned = MsdpTable::scan(&mut wire).unwrap();
/// assert_eq!(scanned, table);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MsdpTable(BTreeMap<String, MsdpValue>);

impl MsdpTable {
    /// Creates a new empty table.
    ///
    /// # Returns
    ///
    /// An `MsdpTable` with no entries.
    pub fn new() -> MsdpTable {
        MsdpTable(BTreeMap::new())
    }

    /// Sets a variable, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name
    /// * `value` - The value (or anything convertible into one) to store
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::msdp::{MsdpTable, MsdpValue};
    ///
    /// let mut table = MsdpTable::new();
    /// table.set("SEND", "HEALTH");
    /// table.set("ROOM", MsdpValue::Table(MsdpTable::new()));
    /// assert_eq!(table.entries(), 2);
    /// ```
    pub fn set<V: Into<MsdpValue>>(&mut self, name: &str, value: V) {
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
    /// `Some(&MsdpValue)` if the name exists, otherwise `None`.
    pub fn get(&self, name: &str) -> Option<&MsdpValue> {
        self.0.get(name)
    }

    /// Returns the number of entries in the table.
    pub fn entries(&self) -> usize {
        self.0.len()
    }

    /// Iterates the entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MsdpValue)> {
        self.0.iter()
    }

    /// Returns the encoded length of this table.
    ///
    /// # Returns
    ///
    /// The total number of bytes [`MsdpTable::encode`] would write: the
    /// `TABLE_OPEN`/`TABLE_CLOSE` delimiters, `VAR` and `VAL` markers for
    /// each pair, and the encoded lengths of all names and values.
    pub fn len(&self) -> usize {
        2 + self
            .0
            .iter()
            .map(|(name, value)| 2 + name.len() + value.len())
            .sum::<usize>()
    }

    /// Whether the encoded form is empty.
    ///
    /// # Returns
    ///
    /// Always `false`; an encoded table is never shorter than its two
    /// delimiters.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Reads a payload as the implicit outermost table.
    ///
    /// Accepts both the delimited form (`TABLE_OPEN … TABLE_CLOSE`) and
    /// the bare `VAR name VAL value` series most servers send at top
    /// level. The inverse of [`MsdpTable::report`] for well-formed data.
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`] holding the unescaped
    ///   subnegotiation payload
    ///
    /// # Returns
    ///
    /// The decoded table.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::msdp::{MsdpTable, MsdpValue};
    ///
    /// // VAR "SEND" VAL "HEALTH", the bare top-level form.
    /// let mut wire = BytesMut::new();
    /// wire.extend_from_slice(&[0x01]);
    /// wire.extend_from_slice(b"SEND");
    /// wire.extend_from_slice(&[0x02]);
    /// wire.extend_from_slice(b"HEALTH");
    /// let table = MsdpTable::scan(&mut wire).unwrap();
    /// assert_eq!(table.get("SEND"), Some(&MsdpValue::string("HEALTH")));
    /// ```
    pub fn scan<T: Buf>(src: &mut T) -> TelnetResult<MsdpTable> {
        MsdpTable::decode(src)
    }

    /// Serializes this table as a delimited payload, the inverse of
    /// [`MsdpTable::scan`].
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded bytes
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::msdp::MsdpTable;
    ///
    /// let mut table = MsdpTable::new();
    /// table.set("LIST", "COMMANDS");
    /// let mut wire = BytesMut::new();
    /// table.report(&mut wire).unwrap();
    /// // TABLE_OPEN VAR "LIST" VAL "COMMANDS" TABLE_CLOSE
    /// assert_eq!(wire[0], 0x03);
    /// assert_eq!(wire[wire.len() - 1], 0x04);
    /// ```
    pub fn report<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        self.encode(dst)
    }

    /// Encodes this table into a buffer.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded bytes
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of bytes written.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        dst.put_u8(msdp::TABLE_OPEN);
        let mut written = 2;
        for (name, value) in &self.0 {
            dst.put_u8(msdp::VAR);
            dst.put_slice(name.as_bytes());
            dst.put_u8(msdp::VAL);
            written += 2 + name.len() + value.encode(dst)?;
        }
        dst.put_u8(msdp::TABLE_CLOSE);
        Ok(written)
    }

    /// Decodes a table, delimited or bare.
    ///
    /// Automatically detects whether the table carries explicit
    /// `TABLE_OPEN`/`TABLE_CLOSE` markers and handles both cases. In the
    /// bare form the table ends at the first byte that starts neither a
    /// pair nor a close marker.
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`]
    ///
    /// # Returns
    ///
    /// The decoded table.
    pub fn decode<T: Buf>(src: &mut T) -> TelnetResult<MsdpTable> {
        let mut table = MsdpTable::new();
        let delimited = src.has_remaining() && src.chunk()[0] == msdp::TABLE_OPEN;
        if delimited {
            src.advance(1);
        }
        while src.has_remaining() {
            let byte = src.chunk()[0];
            if byte == msdp::TABLE_CLOSE {
                if delimited {
                    src.advance(1);
                }
                break;
            } else if byte == msdp::VAR {
                src.advance(1);
                let mut name = Vec::new();
                while src.has_remaining() && src.chunk()[0] != msdp::VAL {
                    name.push(src.get_u8());
                }
                if src.has_remaining() {
                    src.advance(1); // VAL
                    let value = MsdpValue::decode(src)?;
                    table.set(&String::from_utf8_lossy(&name), value);
                }
            } else {
                // Neither a pair nor a close: the table ends here.
                break;
            }
        }
        Ok(table)
    }
}

impl std::fmt::Display for MsdpTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
