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

//! Mud Client Compression Protocol option (MCCP2/MCCP3)

use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::{TelnetOption, TelnetSide};
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::TelnetResult;
use std::any::Any;
use tracing::debug;

/// Which MCCP revision a compression event refers to.
///
/// Version 2 compresses the server-to-client direction, version 3 the
/// client-to-server direction. The two are independent streams.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompressVersion {
    /// MCCP2, server-to-client
    V2,
    /// MCCP3, client-to-server
    V3,
}

impl std::fmt::Display for CompressVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressVersion::V2 => write!(f, "MCCP2"),
            CompressVersion::V3 => write!(f, "MCCP3"),
        }
    }
}

/// The MCCP option module.
///
/// Claims COMPRESS2 and COMPRESS3 and depends on nothing: compression can
/// be negotiated before or after every other option. A server prefers v3
/// when configured for it — it offers WILL COMPRESS3 first and falls back
/// to WILL COMPRESS2 only after the peer refuses — and otherwise offers v2
/// directly.
///
/// The compressed stream begins immediately after an empty subnegotiation
/// marker: the offering side emits `IAC SB COMPRESSn IAC SE` and starts
/// deflating, the receiving side switches its inbound path to a zlib
/// inflater the moment the marker is interpreted. The engine inflates the
/// inbound direction itself; compressing the outbound direction is left to
/// the transport, signalled through `on_compression_enabled`.
pub struct MccpPlugin {
    offer_v3: bool,
    inbound: Option<CompressVersion>,
    outbound: Option<CompressVersion>,
}

impl MccpPlugin {
    /// Creates the plugin offering MCCP2 only.
    pub fn new() -> MccpPlugin {
        MccpPlugin {
            offer_v3: false,
            inbound: None,
            outbound: None,
        }
    }

    /// Prefer MCCP3: offer it first and fall back to MCCP2 on refusal.
    ///
    /// # Arguments
    ///
    /// * `enabled` - When `true`, a server interpreter offers
    ///   `WILL COMPRESS3` at startup and only offers `WILL COMPRESS2`
    ///   after the peer refuses v3
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::MccpPlugin;
    ///
    /// let plugin = MccpPlugin::new().with_v3(true);
    /// assert_eq!(plugin.inbound_active(), None);
    /// ```
    pub fn with_v3(mut self, enabled: bool) -> MccpPlugin {
        self.offer_v3 = enabled;
        self
    }

    /// The version inflating the inbound stream, if any.
    ///
    /// # Returns
    ///
    /// `Some` once the peer's empty marker subnegotiation switched the
    /// inbound path to the zlib inflater.
    pub fn inbound_active(&self) -> Option<CompressVersion> {
        self.inbound
    }

    /// The version the outbound stream was switched to, if any.
    ///
    /// # Returns
    ///
    /// `Some` once this side emitted its marker; compressing the
    /// outbound direction from there on is the transport's job.
    pub fn outbound_active(&self) -> Option<CompressVersion> {
        self.outbound
    }
}

impl Default for MccpPlugin {
    fn default() -> Self {
        MccpPlugin::new()
    }
}

fn version_of(option: TelnetOption) -> CompressVersion {
    match option {
        TelnetOption::Compress3 => CompressVersion::V3,
        _ => CompressVersion::V2,
    }
}

impl TelnetPlugin for MccpPlugin {
    fn name(&self) -> &'static str {
        "mccp"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::Compress2, TelnetOption::Compress3]
    }

    fn policy(&self, mode: TelnetMode, option: TelnetOption) -> OptionPolicy {
        match (mode, option) {
            (TelnetMode::Server, TelnetOption::Compress2) => {
                // With v3 preferred, v2 is only the fallback offer.
                let local = if self.offer_v3 {
                    PolicyAction::Accepted
                } else {
                    PolicyAction::Offered
                };
                OptionPolicy::new(local, PolicyAction::Refused)
            }
            (TelnetMode::Server, TelnetOption::Compress3) => {
                let local = if self.offer_v3 {
                    PolicyAction::Offered
                } else {
                    PolicyAction::Refused
                };
                OptionPolicy::new(local, PolicyAction::Refused)
            }
            (TelnetMode::Client, _) => {
                OptionPolicy::new(PolicyAction::Refused, PolicyAction::Accepted)
            }
            _ => OptionPolicy::refused(),
        }
    }

    fn option_enabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        option: TelnetOption,
        side: TelnetSide,
    ) {
        let version = version_of(option);
        match (ctx.mode(), side, version) {
            // Server got DO COMPRESSn: emit the marker; the transport
            // starts deflating the v2 stream from here on.
            (TelnetMode::Server, TelnetSide::Local, CompressVersion::V2) => {
                ctx.send_subnegotiation(option, &[]);
                self.outbound = Some(CompressVersion::V2);
                ctx.effects
                    .queue(CallbackCall::Compression(CompressVersion::V2, true));
            }
            // Client accepted the server's WILL COMPRESS3: the client owns
            // the compressed direction, so it emits the marker and its
            // transport starts deflating.
            (TelnetMode::Client, TelnetSide::Remote, CompressVersion::V3) => {
                ctx.send_subnegotiation(option, &[]);
                self.outbound = Some(CompressVersion::V3);
                ctx.effects
                    .queue(CallbackCall::Compression(CompressVersion::V3, true));
            }
            _ => {}
        }
    }

    fn option_disabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        option: TelnetOption,
        _side: TelnetSide,
    ) {
        let version = version_of(option);
        if self.inbound == Some(version) {
            self.inbound = None;
        }
        if self.outbound == Some(version) {
            self.outbound = None;
        }
        ctx.effects
            .queue(CallbackCall::Compression(version, false));
    }

    fn option_refused(
        &mut self,
        ctx: &mut PluginContext<'_>,
        option: TelnetOption,
        side: TelnetSide,
    ) {
        // Prefer v3, else v2: a refused COMPRESS3 offer falls back.
        if option == TelnetOption::Compress3
            && side == TelnetSide::Local
            && ctx.mode() == TelnetMode::Server
            && self.offer_v3
        {
            debug!("peer refused MCCP3, falling back to MCCP2");
            ctx.request_local_enable(TelnetOption::Compress2);
        }
    }

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        option: TelnetOption,
        _payload: &[u8],
    ) -> TelnetResult<()> {
        let version = version_of(option);
        match (ctx.mode(), version) {
            // The peer's marker: everything after it is deflate data.
            (TelnetMode::Client, CompressVersion::V2)
            | (TelnetMode::Server, CompressVersion::V3) => {
                self.inbound = Some(version);
                ctx.enable_inbound_decompression(version);
                ctx.effects
                    .queue(CallbackCall::Compression(version, true));
            }
            _ => {
                debug!("ignoring {version} marker for the uncompressed direction");
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
