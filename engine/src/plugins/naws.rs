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

//! Negotiate About Window Size option (RFC 1073)

use crate::args::naws::WindowSize;
use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::{TelnetOption, TelnetSide};
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::TelnetResult;
use bytes::BytesMut;
use std::any::Any;

/// The NAWS option module.
///
/// A server announces DO NAWS at startup; a client accepts with WILL and
/// immediately reports its window size as a subnegotiation, then again on
/// every `send_naws`. The server side decodes incoming reports and fires
/// `on_naws`.
pub struct NawsPlugin {
    window: WindowSize,
    last_received: Option<WindowSize>,
}

impl NawsPlugin {
    /// Creates the plugin reporting the traditional 80x24 window.
    pub fn new() -> NawsPlugin {
        NawsPlugin {
            window: WindowSize::default(),
            last_received: None,
        }
    }

    /// Sets the window size reported to the peer.
    ///
    /// # Arguments
    ///
    /// * `cols` - Terminal columns to report
    /// * `rows` - Terminal rows to report
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::NawsPlugin;
    ///
    /// let plugin = NawsPlugin::new().with_window_size(100, 40);
    /// assert_eq!(plugin.window_size().cols, 100);
    /// ```
    pub fn with_window_size(mut self, cols: u16, rows: u16) -> NawsPlugin {
        self.window = WindowSize::new(cols, rows);
        self
    }

    pub(crate) fn set_window_size(&mut self, size: WindowSize) {
        self.window = size;
    }

    /// The size we report to the peer.
    ///
    /// # Returns
    ///
    /// The configured [`WindowSize`], sent on NAWS agreement and on
    /// every `send_naws`.
    pub fn window_size(&self) -> WindowSize {
        self.window
    }

    /// The most recent size the peer reported, if any.
    ///
    /// # Returns
    ///
    /// `Some` once a well-formed NAWS subnegotiation arrived, `None`
    /// before that.
    pub fn last_received(&self) -> Option<WindowSize> {
        self.last_received
    }

    fn report(&self, ctx: &mut PluginContext<'_>) {
        let mut payload = BytesMut::with_capacity(4);
        if self.window.encode(&mut payload).is_ok() {
            ctx.send_subnegotiation(TelnetOption::NAWS, &payload);
        }
    }
}

impl Default for NawsPlugin {
    fn default() -> Self {
        NawsPlugin::new()
    }
}

impl TelnetPlugin for NawsPlugin {
    fn name(&self) -> &'static str {
        "naws"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::NAWS]
    }

    fn policy(&self, mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
        match mode {
            TelnetMode::Server => {
                OptionPolicy::new(PolicyAction::Refused, PolicyAction::Offered)
            }
            TelnetMode::Client => {
                OptionPolicy::new(PolicyAction::Accepted, PolicyAction::Refused)
            }
        }
    }

    fn option_enabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        side: TelnetSide,
    ) {
        // The side that performs NAWS reports its size on agreement.
        if side == TelnetSide::Local {
            self.report(ctx);
        }
    }

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        payload: &[u8],
    ) -> TelnetResult<()> {
        let mut src = payload;
        let size = WindowSize::decode(&mut src)?;
        self.last_received = Some(size);
        ctx.effects
            .queue(CallbackCall::Naws(size.cols, size.rows));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
