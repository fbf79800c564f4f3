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

//! Mud Server Status Protocol option

use crate::args::mssp::MsspConfig;
use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::{TelnetOption, TelnetSide};
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::TelnetResult;
use bytes::BytesMut;
use std::any::Any;
use std::sync::Arc;

/// Supplies the status table serialized on each agreed MSSP exchange.
///
/// Called from the interpreter worker; it must return an owned snapshot so
/// the application can keep mutating its own copy.
pub type MsspProvider = Arc<dyn Fn() -> MsspConfig + Send + Sync>;

/// The MSSP option module.
///
/// A server offers WILL MSSP and, when the peer agrees, serializes a fresh
/// snapshot from its provider. A client decodes the table and fires
/// `on_mssp`.
pub struct MsspPlugin {
    provider: Option<MsspProvider>,
    last_received: Option<MsspConfig>,
}

impl MsspPlugin {
    /// Creates the plugin without a provider (client use).
    pub fn new() -> MsspPlugin {
        MsspPlugin {
            provider: None,
            last_received: None,
        }
    }

    /// Sets the server-side status provider.
    ///
    /// # Arguments
    ///
    /// * `provider` - Called on the worker each time the exchange is
    ///   agreed; must return an owned snapshot so the application can
    ///   keep mutating its own copy
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::{MsspConfig, MsspPlugin};
    ///
    /// let plugin = MsspPlugin::new().with_provider(|| {
    ///     let mut config = MsspConfig::new();
    ///     config.set("NAME", "Moonbase");
    ///     config.set("PLAYERS", 3i64);
    ///     config
    /// });
    /// # let _ = plugin;
    /// ```
    pub fn with_provider<F>(mut self, provider: F) -> MsspPlugin
    where
        F: Fn() -> MsspConfig + Send + Sync + 'static,
    {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// The last status table the peer sent, if any.
    ///
    /// # Returns
    ///
    /// `Some` once a table was decoded on the client side, `None`
    /// before that (and always on a pure server).
    pub fn last_received(&self) -> Option<&MsspConfig> {
        self.last_received.as_ref()
    }
}

impl Default for MsspPlugin {
    fn default() -> Self {
        MsspPlugin::new()
    }
}

impl TelnetPlugin for MsspPlugin {
    fn name(&self) -> &'static str {
        "mssp"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::MSSP]
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
        if side != TelnetSide::Local {
            return;
        }
        let Some(provider) = &self.provider else {
            return;
        };
        let snapshot = provider();
        let mut payload = BytesMut::new();
        if snapshot.encode(&mut payload).is_ok() {
            ctx.send_subnegotiation(TelnetOption::MSSP, &payload);
        }
    }

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        payload: &[u8],
    ) -> TelnetResult<()> {
        let mut src = payload;
        let config = MsspConfig::decode(&mut src)?;
        self.last_received = Some(config.clone());
        ctx.effects.queue(CallbackCall::Mssp(config));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
