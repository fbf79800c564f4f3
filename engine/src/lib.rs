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

//! # Mudwire Telnet Negotiation Engine
//!
//! A byte-oriented, full-duplex Telnet interpreter implementing RFC 854
//! option negotiation plus the extensions interactive text-based servers
//! (MUDs) rely on: ECHO, NAWS, CHARSET, MSSP, MSDP, GMCP and MCCP2/3.
//! Both the client and the server role are supported.
//!
//! ## Overview
//!
//! The engine separates in-band application bytes from Telnet control
//! sequences, tracks option negotiation with the RFC 1143 Q-method, and
//! hands each structured subnegotiation payload to the option plugin that
//! claims it. It is transport-agnostic: an adapter feeds inbound bytes in
//! through [`TelnetInterpreter::interpret`] and writes whatever the
//! `on_negotiation` callback hands back. There is no socket, TLS or
//! rendering code here.
//!
//! ## Core pieces
//!
//! - [`TelnetInterpreter`] — the façade. Built once, immutable after
//!   build, fed bytes for the session lifetime.
//! - [`InterpreterBuilder`] — composes role, plugins, callbacks, span and
//!   queue capacity.
//! - [`TelnetPlugin`] — one implementation per extension; declares its
//!   negotiation policy per role and decodes its own payloads. The
//!   built-in modules live in [`plugins`].
//! - Payload codecs in [`naws`], [`charset`], [`mssp`], [`msdp`] and
//!   [`gmcp`].
//!
//! ## Usage example
//!
//! ```no_run
//! use mudwire_engine::{
//!     CharsetPlugin, EchoPlugin, GmcpPlugin, NawsPlugin, TelnetInterpreter, TelnetMode,
//! };
//!
//! # async fn example() -> mudwire_engine::TelnetResult<()> {
//! let interpreter = TelnetInterpreter::builder(TelnetMode::Client)
//!     .plugin(EchoPlugin::new())
//!     .plugin(NawsPlugin::new().with_window_size(120, 40))
//!     .plugin(CharsetPlugin::new(["UTF-8", "ISO-8859-1"]))
//!     .plugin(GmcpPlugin::new())
//!     .on_negotiation(|bytes| async move {
//!         // write `bytes` to the socket unchanged
//!         let _ = bytes;
//!     })
//!     .on_submit(|line, encoding| async move {
//!         println!("[{encoding}] {}", String::from_utf8_lossy(&line));
//!     })
//!     .build()?;
//!
//! // bytes read from the socket:
//! interpreter.interpret(b"\xFF\xFB\x01Welcome!\r\n").await?;
//! interpreter.wait_for_processing().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency model
//!
//! One worker task per interpreter drains a bounded queue and steps the
//! state machine byte by byte. Callback futures are awaited before the
//! next byte advances, so consecutive subnegotiations never interleave
//! and negotiation replies are written before any later input is
//! interpreted. [`TelnetInterpreter::wait_for_processing`] resolves when
//! the queue is empty and no callback is in flight.
//!
//! ## Wire format
//!
//! Bit-exact RFC 854/855/857/1073/2066 negotiation, plus MSSP, MSDP, GMCP
//! and MCCP2/3 as specified by their MUD community documents. IAC bytes in
//! application data and subnegotiation payloads are doubled on the wire.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod args;
pub mod consts;
mod interpreter;
mod machine;
mod options;
mod plugin;
pub mod plugins;
mod result;
mod state;

pub use self::args::charset::{self, CharsetCommand};
pub use self::args::gmcp::{self, GmcpMessage};
pub use self::args::msdp::{self, MsdpArray, MsdpTable, MsdpValue};
pub use self::args::mssp::{self, MsspConfig, MsspValue};
pub use self::args::naws::{self, WindowSize};
pub use self::interpreter::{
    ByteCallback, CharsetCallback, CompressionCallback, EchoStateCallback, GmcpCallback,
    InterpreterBuilder, MsdpCallback, MsspCallback, NawsCallback, NegotiationCallback,
    SubmitCallback, TelnetInterpreter, TelnetMode,
};
pub use self::machine::DEFAULT_ENCODING;
pub use self::options::{NegotiationVerb, TelnetOption, TelnetSide};
pub use self::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
pub use self::plugins::{
    CharsetPlugin, CompressVersion, EchoPlugin, GmcpPlugin, MccpPlugin, MsdpPlugin, MsspPlugin,
    MsspProvider, NawsPlugin,
};
pub use self::result::{TelnetError, TelnetResult};
