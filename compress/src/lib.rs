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

//! # Streaming zlib inflation
//!
//! MCCP switches a Telnet connection to a zlib-deflated byte stream in the
//! middle of a TCP segment: the bytes after the `IAC SB COMPRESSn IAC SE`
//! marker are compressed, and chunk boundaries fall wherever the socket
//! read happened to end. [`InflateStream`] wraps [`flate2::Decompress`]
//! for exactly this shape of input: feed it arbitrary slices as they
//! arrive, collect whatever plaintext is decodable so far, and watch for
//! the stream end that turns compression back off.
//!
//! ```
//! use mudwire_compress::InflateStream;
//! use bytes::BytesMut;
//!
//! # fn example(chunk: &[u8]) -> Result<(), mudwire_compress::CompressError> {
//! let mut inflate = InflateStream::new();
//! let mut plain = BytesMut::new();
//! let status = inflate.feed(chunk, &mut plain)?;
//! if status.ended {
//!     // The peer closed the zlib stream; later bytes are uncompressed.
//! }
//! # Ok(())
//! # }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

use bytes::BytesMut;
use flate2::{Decompress, FlushDecompress, Status};
use thiserror::Error;

/// Errors from the inflation stream.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The deflate data was corrupt and the stream cannot continue.
    #[error("corrupt deflate stream: {0}")]
    Corrupt(String),
    /// Input arrived after the zlib stream already ended.
    #[error("input after end of deflate stream")]
    Finished,
}

/// What one [`InflateStream::feed`] call accomplished.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InflateStatus {
    /// Input bytes consumed from the slice
    pub consumed: usize,
    /// Plaintext bytes appended to the output buffer
    pub produced: usize,
    /// The zlib stream ended inside this input
    pub ended: bool,
}

/// An incremental zlib inflater for a mid-connection compressed stream.
///
/// Tolerates partial input: a call may consume bytes without producing
/// output (header or mid-block) or produce output from previously buffered
/// state. After `ended` is reported the stream refuses further input;
/// bytes past the reported `consumed` count belong to the uncompressed
/// continuation of the connection.
pub struct InflateStream {
    inner: Decompress,
    finished: bool,
}

impl InflateStream {
    /// Creates an inflater expecting a zlib header, as MCCP streams carry.
    pub fn new() -> InflateStream {
        InflateStream {
            inner: Decompress::new(true),
            finished: false,
        }
    }

    /// Total compressed bytes consumed over the stream's lifetime.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    /// Total plaintext bytes produced over the stream's lifetime.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// Whether the zlib stream has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Inflates as much of `input` as possible, appending plaintext to
    /// `output`.
    ///
    /// # Arguments
    ///
    /// * `input` - The next compressed bytes, sliced however the
    ///   transport delivered them
    /// * `output` - Buffer the decoded plaintext is appended to
    ///
    /// # Returns
    ///
    /// An [`InflateStatus`] reporting how much input was consumed and
    /// how much plaintext was produced. On `ended`, the caller owns the
    /// unconsumed remainder of the slice (it is not deflate data).
    ///
    /// # Errors
    ///
    /// [`CompressError::Corrupt`] when the deflate data is invalid and
    /// [`CompressError::Finished`] when input arrives after the stream
    /// already ended; the stream is unusable after either.
    pub fn feed(
        &mut self,
        input: &[u8],
        output: &mut BytesMut,
    ) -> Result<InflateStatus, CompressError> {
        if self.finished {
            return Err(CompressError::Finished);
        }
        let mut status = InflateStatus::default();
        let mut chunk = [0u8; 4096];
        loop {
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let result = self
                .inner
                .decompress(
                    &input[status.consumed..],
                    &mut chunk,
                    FlushDecompress::None,
                )
                .map_err(|error| CompressError::Corrupt(error.to_string()))?;
            let used = (self.inner.total_in() - before_in) as usize;
            let made = (self.inner.total_out() - before_out) as usize;
            status.consumed += used;
            status.produced += made;
            output.extend_from_slice(&chunk[..made]);
            match result {
                Status::StreamEnd => {
                    status.ended = true;
                    self.finished = true;
                    return Ok(status);
                }
                Status::Ok | Status::BufError => {
                    if status.consumed == input.len() && made < chunk.len() {
                        return Ok(status);
                    }
                    if used == 0 && made == 0 {
                        // No progress possible with the input at hand.
                        return Ok(status);
                    }
                }
            }
        }
    }
}

impl Default for InflateStream {
    fn default() -> Self {
        InflateStream::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;

    fn deflate(plain: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plain).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn whole_stream_in_one_call() {
        let compressed = deflate(b"You are standing in an open field.");
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        let status = inflate.feed(&compressed, &mut plain).unwrap();
        assert_eq!(status.consumed, compressed.len());
        assert!(status.ended);
        assert_eq!(&plain[..], b"You are standing in an open field.");
    }

    #[test]
    fn odd_sized_slices_reassemble() {
        let text: Vec<u8> = (0..10_000).map(|i| (i % 251) as u8).collect();
        let compressed = deflate(&text);
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        for chunk in compressed.chunks(7) {
            let status = inflate.feed(chunk, &mut plain).unwrap();
            assert_eq!(status.consumed, chunk.len());
        }
        assert!(inflate.is_finished());
        assert_eq!(&plain[..], &text[..]);
    }

    #[test]
    fn single_byte_drip_feed() {
        let compressed = deflate(b"prompt> ");
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        for &byte in &compressed {
            inflate.feed(&[byte], &mut plain).unwrap();
        }
        assert_eq!(&plain[..], b"prompt> ");
    }

    #[test]
    fn trailing_bytes_after_stream_end_are_left_over() {
        let mut wire = deflate(b"last compressed words");
        let compressed_len = wire.len();
        wire.extend_from_slice(b"plain again");
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        let status = inflate.feed(&wire, &mut plain).unwrap();
        assert!(status.ended);
        assert_eq!(status.consumed, compressed_len);
        assert_eq!(&wire[status.consumed..], b"plain again");
        assert_eq!(&plain[..], b"last compressed words");
    }

    #[test]
    fn input_after_end_is_refused() {
        let compressed = deflate(b"done");
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        inflate.feed(&compressed, &mut plain).unwrap();
        assert!(matches!(
            inflate.feed(b"more", &mut plain),
            Err(CompressError::Finished)
        ));
    }

    #[test]
    fn garbage_input_reports_corruption() {
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        let result = inflate.feed(&[0x00, 0x12, 0x34, 0x56, 0x78], &mut plain);
        assert!(matches!(result, Err(CompressError::Corrupt(_))));
    }

    #[test]
    fn output_larger_than_internal_chunk() {
        let text = vec![b'x'; 100_000];
        let compressed = deflate(&text);
        let mut inflate = InflateStream::new();
        let mut plain = BytesMut::new();
        let status = inflate.feed(&compressed, &mut plain).unwrap();
        assert!(status.ended);
        assert_eq!(plain.len(), text.len());
    }
}
