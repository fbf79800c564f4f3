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

//! Mud Server Data Protocol option

use crate::args::msdp::MsdpTable;
use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::TelnetOption;
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::TelnetResult;
use std::any::Any;

/// The MSDP option module.
///
/// Carries structured out-of-band data with the same framing as GMCP but a
/// binary tree payload. Every complete subnegotiation is scanned into an
/// [`MsdpTable`] and handed to `on_msdp`; the table is not retained beyond
/// the latest one.
pub struct MsdpPlugin {
    last_received: Option<MsdpTable>,
}

impl MsdpPlugin {
    /// Creates the plugin.
    pub fn new() -> MsdpPlugin {
        MsdpPlugin {
            last_received: None,
        }
    }

    /// The last table the peer sent, if any.
    ///
    /// # Returns
    ///
    /// `Some` once a payload was scanned, `None` before that. Only the
    /// newest table is kept.
    pub fn last_received(&self) -> Option<&MsdpTable> {
        self.last_received.as_ref()
    }
}

impl Default for MsdpPlugin {
    fn default() -> Self {
        MsdpPlugin::new()
    }
}

impl TelnetPlugin for MsdpPlugin {
    fn name(&self) -> &'static str {
        "msdp"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::MSDP]
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

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        payload: &[u8],
    ) -> TelnetResult<()> {
        let mut src = payload;
        let table = MsdpTable::scan(&mut src)?;
        self.last_received = Some(table.clone());
        ctx.effects.queue(CallbackCall::Msdp(table));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
