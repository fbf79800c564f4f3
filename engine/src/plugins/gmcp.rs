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

//! Generic Mud Communication Protocol option

use crate::args::gmcp::GmcpMessage;
use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::TelnetOption;
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::{TelnetError, TelnetResult};
use std::any::Any;

/// The GMCP option module.
///
/// Negotiates the channel and parses each subnegotiation into a
/// [`GmcpMessage`] for `on_gmcp`. The message payload is free-form UTF-8,
/// conventionally JSON; it is never validated or parsed further here.
pub struct GmcpPlugin;

impl GmcpPlugin {
    /// Creates the plugin.
    pub fn new() -> GmcpPlugin {
        GmcpPlugin
    }
}

impl Default for GmcpPlugin {
    fn default() -> Self {
        GmcpPlugin::new()
    }
}

impl TelnetPlugin for GmcpPlugin {
    fn name(&self) -> &'static str {
        "gmcp"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::GMCP]
    }

    fn policy(&self, mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
        match mode {
            TelnetMode::Server => {
                OptionPolicy::new(PolicyAction::Offered, PolicyAction::Accepted)
            }
            TelnetMode::Client => {
                OptionPolicy::new(PolicyAction::Accepted, PolicyAction::Accepted)
            }
        }
    }

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        payload: &[u8],
    ) -> TelnetResult<()> {
        let message = GmcpMessage::parse(payload).ok_or(TelnetError::ProtocolViolation {
            option: Some(crate::consts::option::GMCP),
            reason: "GMCP payload is not valid UTF-8".into(),
        })?;
        ctx.effects.queue(CallbackCall::Gmcp(message));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
