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

//! Error types for the negotiation engine

use thiserror::Error;

/// Result type for engine operations
pub type TelnetResult<T> = Result<T, TelnetError>;

/// Engine error types
///
/// Peer-originated anomalies (`ProtocolViolation`, `UnsupportedOption`) are
/// recoverable: the interpreter logs them, drops the offending sequence and
/// keeps the session. `InvalidConfiguration` only occurs at build time and
/// `Disposed` only after [`dispose`](crate::TelnetInterpreter::dispose).
#[derive(Debug, Error)]
pub enum TelnetError {
    /// Malformed subnegotiation payload or unknown structural byte.
    ///
    /// The current subnegotiation is discarded; the session continues.
    #[error("protocol violation (option {option:?}): {reason}")]
    ProtocolViolation {
        /// The option being subnegotiated, if known
        option: Option<u8>,
        /// What was wrong with the payload
        reason: String,
    },

    /// The peer offered an option no registered plugin claims.
    ///
    /// Answered automatically with WONT/DONT.
    #[error("unsupported option {0}")]
    UnsupportedOption(u8),

    /// A user callback panicked.
    ///
    /// Logged by the worker; the state machine advances past the event.
    #[error("callback failure: {0}")]
    CallbackFailure(String),

    /// The builder was given contradictory plugins or settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Input was submitted after [`dispose`](crate::TelnetInterpreter::dispose).
    #[error("interpreter disposed")]
    Disposed,

    /// The inbound decompression stream was corrupt.
    #[error("decompression error: {0}")]
    Decompression(#[from] mudwire_compress::CompressError),

    /// An I/O error from an underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TelnetError {
    /// Whether the session can continue after this error.
    ///
    /// Recoverable errors are contained by the worker loop; the rest fail the
    /// calling operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TelnetError::ProtocolViolation { .. }
                | TelnetError::UnsupportedOption(_)
                | TelnetError::CallbackFailure(_)
                | TelnetError::Decompression(_)
        )
    }
}
