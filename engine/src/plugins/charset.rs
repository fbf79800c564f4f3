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

//! Charset option (RFC 2066)

use crate::args::charset::CharsetCommand;
use crate::interpreter::TelnetMode;
use crate::machine::CallbackCall;
use crate::options::{TelnetOption, TelnetSide};
use crate::plugin::{OptionPolicy, PluginContext, PolicyAction, TelnetPlugin};
use crate::result::TelnetResult;
use bytes::BytesMut;
use std::any::Any;
use tracing::debug;

/// The CHARSET option module.
///
/// Holds an ordered charset preference list. Whoever's WILL is accepted
/// becomes the offerer and sends a REQUEST listing its preferences; the
/// responder picks the earliest entry of its own list that was offered,
/// answers ACCEPTED and both sides switch the session encoding. With no
/// acceptable entry the answer is REJECTED and the encoding stays.
pub struct CharsetPlugin {
    preferred: Vec<String>,
    agreed: Option<String>,
}

impl CharsetPlugin {
    /// Creates the plugin with a preference list, most preferred first.
    ///
    /// # Arguments
    ///
    /// * `preferred` - Charset names in preference order; the first
    ///   entry also present in a peer's REQUEST wins
    ///
    /// # Example
    /// ```
    /// use mudwire_engine::CharsetPlugin;
    ///
    /// let plugin = CharsetPlugin::new(["UTF-8", "ISO-8859-1"]);
    /// assert_eq!(plugin.preferred().len(), 2);
    /// assert_eq!(plugin.agreed(), None);
    /// ```
    pub fn new<I, S>(preferred: I) -> CharsetPlugin
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CharsetPlugin {
            preferred: preferred.into_iter().map(Into::into).collect(),
            agreed: None,
        }
    }

    /// The negotiated charset, once agreement was reached.
    ///
    /// # Returns
    ///
    /// `Some` with the accepted name after an ACCEPTED was sent or
    /// received, `None` while the session is still on its initial
    /// encoding.
    pub fn agreed(&self) -> Option<&str> {
        self.agreed.as_deref()
    }

    /// The preference list, most preferred first.
    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    fn accept(&mut self, ctx: &mut PluginContext<'_>, name: &str) {
        self.agreed = Some(name.to_string());
        ctx.set_encoding(name);
        ctx.effects
            .queue(CallbackCall::CharsetChanged(name.to_string()));
    }
}

impl TelnetPlugin for CharsetPlugin {
    fn name(&self) -> &'static str {
        "charset"
    }

    fn options(&self) -> &'static [TelnetOption] {
        &[TelnetOption::Charset]
    }

    fn policy(&self, mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
        // Either side may offer; this engine has the server initiate and
        // the client follow.
        match mode {
            TelnetMode::Server => {
                OptionPolicy::new(PolicyAction::Offered, PolicyAction::Accepted)
            }
            TelnetMode::Client => {
                OptionPolicy::new(PolicyAction::Accepted, PolicyAction::Accepted)
            }
        }
    }

    fn option_enabled(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        side: TelnetSide,
    ) {
        // Our accepted WILL makes us the offerer.
        if side == TelnetSide::Local && !self.preferred.is_empty() {
            let request = CharsetCommand::request(self.preferred.clone());
            let mut payload = BytesMut::new();
            if request.encode(&mut payload).is_ok() {
                ctx.send_subnegotiation(TelnetOption::Charset, &payload);
            }
        }
    }

    fn subnegotiation(
        &mut self,
        ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        payload: &[u8],
    ) -> TelnetResult<()> {
        match CharsetCommand::decode(payload)? {
            CharsetCommand::Request { charsets, .. } => {
                let pick = self.preferred.iter().find(|ours| {
                    charsets
                        .iter()
                        .any(|offered| offered.eq_ignore_ascii_case(ours))
                });
                let reply = match pick {
                    Some(name) => {
                        let name = name.clone();
                        self.accept(ctx, &name);
                        CharsetCommand::Accepted(name)
                    }
                    None => {
                        debug!("no offered charset matches the preference list");
                        CharsetCommand::Rejected
                    }
                };
                let mut bytes = BytesMut::new();
                reply.encode(&mut bytes)?;
                ctx.send_subnegotiation(TelnetOption::Charset, &bytes);
            }
            CharsetCommand::Accepted(name) => {
                self.accept(ctx, &name);
            }
            CharsetCommand::Rejected => {
                debug!("peer rejected every offered charset");
            }
            CharsetCommand::TtableIs(_) => {
                // Translation tables are not supported.
                let mut bytes = BytesMut::new();
                CharsetCommand::TtableRejected.encode(&mut bytes)?;
                ctx.send_subnegotiation(TelnetOption::Charset, &bytes);
            }
            CharsetCommand::TtableRejected => {
                debug!("peer rejected a translation table we never sent");
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
