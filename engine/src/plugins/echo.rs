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

//! Echo option (RFC 857)

use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::{TelnetOption, TelnetSide};
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use std::any::Any;

/// The ECHO option module.
///
/// A server offers WILL ECHO at startup and, once the peer agrees, is the
/// side that echoes input. A client accepts a server's WILL with DO and
/// reports the change through `on_echo_state_changed`; it never offers to
/// echo itself.
///
/// With [`EchoPlugin::with_server_echo`] the plugin also performs the echo:
/// while local echo is on, every application byte received is written back
/// to the peer (IAC-escaped) through the negotiation channel.
pub struct EchoPlugin {
    server_echo: bool,
    local_echoing: bool,
    remote_echoing: bool,
}

impl EchoPlugin {
    /// Creates the plugin with the echo-back handler disabled.
    pub fn new() -> EchoPlugin {
        EchoPlugin {
            server_echo: false,
            local_echoing: false,
            remote_echoing: false,
        }
    }

    /// Enables the default server-side echo-back handler.
    ///
    /// # Arguments
    ///
    /// * `enabled` - When `true`, a server interpreter writes every
    ///   received application byte back to the peer while local echo is
    ///   negotiated on
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::EchoPlugin;
    ///
    /// let plugin = EchoPlugin::new().with_server_echo(true);
    /// assert!(!plugin.is_local_echoing());
    /// ```
    pub fn with_server_echo(mut self, enabled: bool) -> EchoPlugin {
        self.server_echo = enabled;
        self
    }

    /// Whether we are currently echoing for the peer.
    ///
    /// # Returns
    ///
    /// `true` once the local ECHO half-channel is negotiated on.
    pub fn is_local_echoing(&self) -> bool {
        self.local_echoing
    }

    /// Whether the peer is currently echoing for us.
    ///
    /// # Returns
    ///
    /// `true` once the remote ECHO half-channel is negotiated on - the
    /// client-side `IsEchoing` view of the session.
    pub fn is_remote_echoing(&self) -> bool {
        self.remote_echoing
    }
}

impl Default for EchoPlugin {
    fn default() -> Self {
        EchoPlugin::new()
    }
}

impl TelnetPlugin for EchoPlugin {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::Echo]
    }

    fn policy(&self, mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
        match mode {
            TelnetMode::Server => {
                OptionPolicy::new(PolicyAction::Offered, PolicyAction::Refused)
            }
            TelnetMode::Client => {
                OptionPolicy::new(PolicyAction::Refused, PolicyAction::Accepted)
            }
        }
    }

    fn option_enabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        side: TelnetSide,
    ) {
        match side {
            TelnetSide::Local => self.local_echoing = true,
            TelnetSide::Remote => self.remote_echoing = true,
        }
        ctx.effects.queue(CallbackCall::EchoState(true));
    }

    fn option_disabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        side: TelnetSide,
    ) {
        match side {
            TelnetSide::Local => self.local_echoing = false,
            TelnetSide::Remote => self.remote_echoing = false,
        }
        ctx.effects.queue(CallbackCall::EchoState(false));
    }

    fn application_byte(&mut self, ctx: &mut PluginContext<'_>, byte: u8) {
        if self.server_echo && self.local_echoing && ctx.mode() == TelnetMode::Server {
            ctx.send_data(byte);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
