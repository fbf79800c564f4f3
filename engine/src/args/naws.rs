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

//! Negotiate About Window Size payload codec
//!
//! <https://tools.ietf.org/html/rfc1073>
//!
//! NAWS lets the side driving a terminal report its dimensions so the
//! peer can wrap and paginate correctly. The subnegotiation payload is
//! four bytes: columns and rows as big-endian 16-bit integers.

use crate::result::{TelnetError, TelnetResult};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, BufMut};

/// Terminal dimensions carried by a NAWS subnegotiation.
///
/// This struct encodes the window dimensions (width and height) used in
/// Telnet negotiation. The NAWS option allows a client and server to
/// communicate the terminal window size, typically used to adjust text
/// wrapping and display.
///
/// # Format
///
/// The window size is encoded as four bytes in big-endian order:
/// - 2 bytes for columns (width)
/// - 2 bytes for rows (height)
///
/// IAC escaping of 0xFF bytes is the wire layer's concern; this codec
/// works on the unescaped payload.
///
/// # Example
/// ```
/// use mudwire_engine::naws::WindowSize;
///
/// let size = WindowSize::new(100, 40);
/// assert_eq!(size.cols, 100);
/// assert_eq!(size.rows, 40);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize` with the specified columns and rows.
    ///
    /// # Arguments
    ///
    /// * `cols` - The number of columns (width) in the terminal window
    /// * `rows` - The number of rows (height) in the terminal window
    ///
    /// # Returns
    ///
    /// A new `WindowSize` instance with the given dimensions.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::naws::WindowSize;
    ///
    /// let size = WindowSize::new(120, 30);
    /// assert_eq!(size.cols, 120);
    /// ```
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Returns the encoded length of this `WindowSize` in bytes.
    ///
    /// The NAWS subnegotiation data always occupies exactly 4 bytes:
    /// 2 bytes for columns and 2 bytes for rows.
    ///
    /// # Returns
    ///
    /// Always returns `4`.
    pub fn len(&self) -> usize {
        4
    }

    /// Whether the encoded payload would be empty.
    ///
    /// # Returns
    ///
    /// Always `false`; a NAWS payload is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encodes this `WindowSize` into a byte buffer.
    ///
    /// The window size is encoded as four bytes: columns (2 bytes)
    /// followed by rows (2 bytes), both in big-endian byte order.
    ///
    /// # Arguments
    ///
    /// * `dst` - A mutable buffer implementing [`BufMut`] that receives
    ///   the encoded bytes
    ///
    /// # Returns
    ///
    /// `Ok(4)` on success.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::naws::WindowSize;
    ///
    /// let size = WindowSize::new(80, 24);
    /// let mut buffer = BytesMut::new();
    /// size.encode(&mut buffer).unwrap();
    /// assert_eq!(&buffer[..], &[0x00, 0x50, 0x00, 0x18]);
    /// ```
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> TelnetResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes this `WindowSize` to a writer.
    ///
    /// This is the underlying implementation for serialization. It writes
    /// the columns followed by the rows as big-endian u16 values.
    ///
    /// # Arguments
    ///
    /// * `writer` - A mutable writer implementing `std::io::Write`
    ///
    /// # Returns
    ///
    /// `Ok(4)` if the write succeeds, or an `std::io::Error` if writing
    /// fails.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::naws::WindowSize;
    ///
    /// let size = WindowSize::new(80, 24);
    /// let mut output = Vec::new();
    /// let written = size.write(&mut output).unwrap();
    /// assert_eq!(written, 4);
    /// ```
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }

    /// Decodes a `WindowSize` from an unescaped subnegotiation payload.
    ///
    /// Reads 4 bytes from the provided buffer: 2 bytes for columns and
    /// 2 bytes for rows, interpreting them as big-endian unsigned
    /// integers.
    ///
    /// # Arguments
    ///
    /// * `src` - A buffer implementing [`Buf`] containing the payload,
    ///   already stripped of IAC escaping
    ///
    /// # Returns
    ///
    /// `Ok(WindowSize)` containing the decoded dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::ProtocolViolation`] when the payload is not
    /// exactly four bytes; the caller drops that subnegotiation and keeps
    /// the session.
    ///
    /// # Example
    /// ```
    /// use bytes::BytesMut;
    /// use mudwire_engine::naws::WindowSize;
    ///
    /// let mut buffer = BytesMut::from(&[0x00, 0x50, 0x00, 0x18][..]);
    /// let size = WindowSize::decode(&mut buffer).unwrap();
    /// assert_eq!(size.cols, 80);
    /// assert_eq!(size.rows, 24);
    /// ```
    pub fn decode<T: Buf>(src: &mut T) -> TelnetResult<WindowSize> {
        // NAWS format: WIDTH-HIGH WIDTH-LOW HEIGHT-HIGH HEIGHT-LOW
        if src.remaining() != 4 {
            return Err(TelnetError::ProtocolViolation {
                option: Some(crate::consts::option::NAWS),
                reason: format!("window size payload is {} bytes, expected 4", src.remaining()),
            });
        }
        Ok(WindowSize {
            cols: src.get_u16(),
            rows: src.get_u16(),
        })
    }
}

impl Default for WindowSize {
    /// Returns a default `WindowSize` representing a standard 80x24
    /// terminal.
    ///
    /// These are the traditional terminal dimensions, commonly used as a
    /// fallback when window size negotiation is unavailable or
    /// incomplete.
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::naws::WindowSize;
    ///
    /// let size = WindowSize::default();
    /// assert_eq!(size.cols, 80);
    /// assert_eq!(size.rows, 24);
    /// ```
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    /// Formats the `WindowSize` as a human-readable string.
    ///
    /// The output format is `(cols,rows)`, for example: `(80,24)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn encode_is_big_endian() {
        let mut buffer = BytesMut::new();
        WindowSize::new(100, 40).encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..], &[0x00, 0x64, 0x00, 0x28]);
    }

    #[test]
    fn decode_round_trip() {
        let mut buffer = BytesMut::new();
        let size = WindowSize::new(0xFFFF, 1);
        size.encode(&mut buffer).unwrap();
        assert_eq!(WindowSize::decode(&mut buffer).unwrap(), size);
    }

    #[test]
    fn short_payload_is_rejected() {
        let mut buffer = BytesMut::from(&[0x00, 0x50, 0x00][..]);
        assert!(WindowSize::decode(&mut buffer).is_err());
    }

    #[test]
    fn long_payload_is_rejected() {
        let mut buffer = BytesMut::from(&[0x00, 0x50, 0x00, 0x18, 0x00][..]);
        assert!(WindowSize::decode(&mut buffer).is_err());
    }
}
