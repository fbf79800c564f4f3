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

//! Synchronous interpreter core
//!
//! [`Machine`] joins the framer, the Q-method option table and the plugin
//! set. Each stepped byte produces an ordered list of [`Effect`]s; the
//! worker drains them (writing negotiation bytes, awaiting callbacks)
//! before the next byte is stepped, which keeps the wire trace and the
//! callback order faithful to the input order.

use crate::args::gmcp::GmcpMessage;
use crate::args::msdp::MsdpTable;
use crate::args::mssp::MsspConfig;
use crate::args::naws::WindowSize;
use crate::consts;
use crate::interpreter::TelnetMode;
use crate::options::{NegotiationVerb, OptionOutcome, OptionTable, TelnetOption};
use crate::plugin::{PluginContext, PluginRegistry, PolicyAction, TelnetPlugin};
use crate::plugins::mccp::CompressVersion;
use crate::plugins::naws::NawsPlugin;
use crate::state::{Framer, FramerAction};
use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

/// The initial session encoding.
pub const DEFAULT_ENCODING: &str = "US-ASCII";

/// A deferred invocation of one of the user's callback slots.
#[derive(Clone, Debug)]
pub(crate) enum CallbackCall {
    /// A completed application line under the given encoding
    Submit(BytesMut, String),
    /// One application byte under the given encoding
    Byte(u8, String),
    /// Echo state changed
    EchoState(bool),
    /// The peer reported its window size
    Naws(u16, u16),
    /// The session encoding changed
    CharsetChanged(String),
    /// A server status table arrived
    Mssp(MsspConfig),
    /// A structured data table arrived
    Msdp(MsdpTable),
    /// A GMCP message arrived
    Gmcp(GmcpMessage),
    /// Compression was switched on or off
    Compression(CompressVersion, bool),
}

/// One ordered output of the machine.
#[derive(Clone, Debug)]
pub(crate) enum Effect {
    /// Bytes to write to the peer unchanged
    Negotiation(BytesMut),
    /// A user callback to invoke
    Call(CallbackCall),
}

/// The outputs of stepping the machine, in emission order.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub items: Vec<Effect>,
    /// Set when the rest of the inbound stream must be inflated
    pub activate_inflate: Option<CompressVersion>,
}

impl Effects {
    pub fn new() -> Effects {
        Effects::default()
    }

    /// Queues `IAC verb option`.
    pub fn negotiate(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        let mut bytes = BytesMut::with_capacity(3);
        bytes.put_u8(consts::IAC);
        bytes.put_u8(verb.to_u8());
        bytes.put_u8(option.to_u8());
        self.items.push(Effect::Negotiation(bytes));
    }

    /// Queues `IAC SB option payload IAC SE` with 0xFF payload bytes
    /// doubled.
    pub fn subnegotiate(&mut self, option: TelnetOption, payload: &[u8]) {
        let mut bytes = BytesMut::with_capacity(payload.len() + 5);
        bytes.put_u8(consts::IAC);
        bytes.put_u8(consts::SB);
        bytes.put_u8(option.to_u8());
        for &byte in payload {
            if byte == consts::IAC {
                bytes.put_u8(consts::IAC);
            }
            bytes.put_u8(byte);
        }
        bytes.put_u8(consts::IAC);
        bytes.put_u8(consts::SE);
        self.items.push(Effect::Negotiation(bytes));
    }

    /// Queues one application byte to the peer, IAC-escaped.
    pub fn data(&mut self, byte: u8) {
        let mut bytes = BytesMut::with_capacity(2);
        if byte == consts::IAC {
            bytes.put_u8(consts::IAC);
        }
        bytes.put_u8(byte);
        self.items.push(Effect::Negotiation(bytes));
    }

    /// Queues a callback invocation.
    pub fn queue(&mut self, call: CallbackCall) {
        self.items.push(Effect::Call(call));
    }
}

/// Per-session mutable state outside the option table.
pub(crate) struct SessionState {
    /// Encoding applied to application data, switched by CHARSET
    pub encoding: String,
    /// Line assembly buffer for the submit channel
    pub line: BytesMut,
    /// A CR was seen and awaits its LF/NUL partner
    pub saw_cr: bool,
}

impl SessionState {
    fn new() -> SessionState {
        SessionState {
            encoding: DEFAULT_ENCODING.to_string(),
            line: BytesMut::new(),
            saw_cr: false,
        }
    }
}

/// The synchronous interpreter core, driven one byte at a time.
pub(crate) struct Machine {
    mode: TelnetMode,
    framer: Framer,
    options: OptionTable,
    registry: PluginRegistry,
    session: SessionState,
}

impl Machine {
    pub fn new(mode: TelnetMode, registry: PluginRegistry) -> Machine {
        let mut options = OptionTable::new();
        for plugin in registry.iter() {
            for &option in plugin.options() {
                let policy = plugin.policy(mode, option);
                options.allow(
                    option,
                    policy.local != PolicyAction::Refused,
                    policy.remote != PolicyAction::Refused,
                );
            }
        }
        Machine {
            mode,
            framer: Framer::new(),
            options,
            registry,
            session: SessionState::new(),
        }
    }

    pub fn current_encoding(&self) -> &str {
        &self.session.encoding
    }

    pub fn supported_local(&self, option: TelnetOption) -> bool {
        self.options.is_supported_local(option)
    }

    pub fn supported_remote(&self, option: TelnetOption) -> bool {
        self.options.is_supported_remote(option)
    }

    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        self.options.local_enabled(option)
    }

    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.options.remote_enabled(option)
    }

    /// Finds a registered plugin by concrete type.
    pub fn plugin<P: TelnetPlugin>(&self) -> Option<&P> {
        self.registry
            .iter()
            .find_map(|plugin| plugin.as_any().downcast_ref::<P>())
    }

    /// Emits the startup offers in dependency order.
    pub fn start(&mut self) -> Effects {
        let mut fx = Effects::new();
        let order = self.registry.order().to_vec();
        for slot in order {
            let Some(plugin) = self.registry.take(slot) else {
                continue;
            };
            for &option in plugin.options() {
                let policy = plugin.policy(self.mode, option);
                if policy.local == PolicyAction::Offered
                    && let Some(verb) = self.options.request_will(option)
                {
                    fx.negotiate(verb, option);
                }
                if policy.remote == PolicyAction::Offered
                    && let Some(verb) = self.options.request_do(option)
                {
                    fx.negotiate(verb, option);
                }
            }
            self.registry.restore(slot, plugin);
        }
        fx
    }

    /// Steps one inbound byte.
    pub fn feed(&mut self, byte: u8) -> Effects {
        let mut fx = Effects::new();
        match self.framer.step(byte) {
            FramerAction::None => {}
            FramerAction::Application(byte) => self.application_byte(byte, &mut fx),
            FramerAction::Negotiation(verb, code) => self.negotiation(verb, code, &mut fx),
            FramerAction::Subnegotiation(code, payload) => {
                self.subnegotiation(code, payload, &mut fx);
            }
        }
        fx
    }

    /// Encodes and queues an outbound GMCP message.
    pub fn send_gmcp(&mut self, package: &str, message: &str) -> Effects {
        let mut fx = Effects::new();
        let encoded = GmcpMessage::new(package, message).encode();
        fx.subnegotiate(TelnetOption::GMCP, &encoded);
        fx
    }

    /// Queues an outbound window size report and remembers it.
    pub fn send_naws(&mut self, width: u16, height: u16) -> Effects {
        let size = WindowSize::new(width, height);
        if let Some(slot) = self.registry.owner_of(consts::option::NAWS)
            && let Some(mut plugin) = self.registry.take(slot)
        {
            if let Some(naws) = plugin.as_any_mut().downcast_mut::<NawsPlugin>() {
                naws.set_window_size(size);
            }
            self.registry.restore(slot, plugin);
        }
        let mut fx = Effects::new();
        let mut payload = BytesMut::with_capacity(4);
        if size.encode(&mut payload).is_ok() {
            fx.subnegotiate(TelnetOption::NAWS, &payload);
        }
        fx
    }

    fn application_byte(&mut self, byte: u8, fx: &mut Effects) {
        fx.queue(CallbackCall::Byte(byte, self.session.encoding.clone()));
        self.each_plugin(fx, |plugin, ctx| plugin.application_byte(ctx, byte));
        match byte {
            consts::LF => {
                self.session.saw_cr = false;
                self.flush_line(fx);
            }
            consts::CR => {
                self.session.saw_cr = true;
            }
            consts::NUL if self.session.saw_cr => {
                // CR NUL is the bare-CR line terminator.
                self.session.saw_cr = false;
                self.flush_line(fx);
            }
            _ => {
                if self.session.saw_cr {
                    self.session.line.put_u8(consts::CR);
                    self.session.saw_cr = false;
                }
                self.session.line.put_u8(byte);
            }
        }
    }

    fn flush_line(&mut self, fx: &mut Effects) {
        let line = self.session.line.split();
        fx.queue(CallbackCall::Submit(line, self.session.encoding.clone()));
    }

    fn negotiation(&mut self, verb: NegotiationVerb, code: u8, fx: &mut Effects) {
        let option = TelnetOption::from_u8(code);
        let reply = self.options.receive(verb, option);
        if let Some(respond) = reply.respond {
            fx.negotiate(respond, option);
        }
        let Some(slot) = self.registry.owner_of(code) else {
            if matches!(verb, NegotiationVerb::Will | NegotiationVerb::Do) {
                debug!("peer sent {verb} for unclaimed option {option}, refused");
            }
            return;
        };
        if let Some((side, outcome)) = reply.outcome {
            self.with_plugin_slot(slot, fx, |plugin, ctx| match outcome {
                OptionOutcome::Enabled => plugin.option_enabled(ctx, option, side),
                OptionOutcome::Disabled => plugin.option_disabled(ctx, option, side),
                OptionOutcome::Refused => plugin.option_refused(ctx, option, side),
            });
        }
    }

    fn subnegotiation(&mut self, code: u8, payload: BytesMut, fx: &mut Effects) {
        let option = TelnetOption::from_u8(code);
        let Some(slot) = self.registry.owner_of(code) else {
            warn!("subnegotiation for unclaimed option {option}, dropped");
            return;
        };
        let mut failure = None;
        self.with_plugin_slot(slot, fx, |plugin, ctx| {
            if let Err(error) = plugin.subnegotiation(ctx, option, &payload) {
                failure = Some(error);
            }
        });
        if let Some(error) = failure {
            warn!("dropped malformed {option} subnegotiation: {error}");
        }
    }

    fn with_plugin_slot(
        &mut self,
        slot: usize,
        fx: &mut Effects,
        f: impl FnOnce(&mut Box<dyn TelnetPlugin>, &mut PluginContext<'_>),
    ) {
        let Some(mut plugin) = self.registry.take(slot) else {
            return;
        };
        let mut ctx = PluginContext {
            mode: self.mode,
            options: &mut self.options,
            session: &mut self.session,
            effects: &mut *fx,
        };
        f(&mut plugin, &mut ctx);
        self.registry.restore(slot, plugin);
    }

    fn each_plugin(
        &mut self,
        fx: &mut Effects,
        mut f: impl FnMut(&mut Box<dyn TelnetPlugin>, &mut PluginContext<'_>),
    ) {
        for slot in 0..self.registry.slots() {
            let Some(mut plugin) = self.registry.take(slot) else {
                continue;
            };
            let mut ctx = PluginContext {
                mode: self.mode,
                options: &mut self.options,
                session: &mut self.session,
                effects: &mut *fx,
            };
            f(&mut plugin, &mut ctx);
            self.registry.restore(slot, plugin);
        }
    }
}
