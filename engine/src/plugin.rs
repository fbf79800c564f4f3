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

//! Option plugin architecture
//!
//! Each Telnet extension is one plugin: it claims option codes, declares
//! its negotiation policy per interpreter role, and decodes its own
//! subnegotiation payloads. Plugins are registered on the builder; the
//! registry validates the set and fixes the order initial offers are made
//! in.

use crate::interpreter::TelnetMode;
use crate::machine::{Effects, SessionState};
use crate::options::{OptionTable, TelnetOption, TelnetSide};
use crate::plugins::mccp::CompressVersion;
use crate::result::{TelnetError, TelnetResult};
use std::any::Any;

/// How one half-channel of an option is handled for a given role.
///
/// # Variants
///
/// - `Offered`: we initiate negotiation at startup (a server's
///   `WILL ECHO`, its `DO NAWS`)
/// - `Accepted`: we agree when the peer initiates, but never initiate
///   ourselves (a client answering `WILL ECHO` with `DO`)
/// - `Refused`: the peer's request is answered with the matching
///   refusal (`WONT`/`DONT`)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyAction {
    /// Negotiation is initiated by us when the interpreter starts
    Offered,
    /// The peer's request is accepted, but we never initiate
    Accepted,
    /// The peer's request is answered with the matching refusal
    Refused,
}

/// A plugin's negotiation policy for one (role, option) pair.
///
/// Policies are queried once at build time to derive the option support
/// mask and the startup-offer list; mode (client vs server) is the only
/// input, so the same plugin type serves both roles.
///
/// # Example
/// ```
/// use mudwire_engine::{OptionPolicy, PolicyAction};
///
/// // A server-side option we offer, while refusing the peer's mirror.
/// let policy = OptionPolicy::new(PolicyAction::Offered, PolicyAction::Refused);
/// assert_eq!(policy.local, PolicyAction::Offered);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionPolicy {
    /// Policy for the local half-channel (we WILL/WONT)
    pub local: PolicyAction,
    /// Policy for the remote half-channel (peer WILL/WONT)
    pub remote: PolicyAction,
}

impl OptionPolicy {
    /// Builds a policy from its two halves.
    ///
    /// # Arguments
    ///
    /// * `local` - How our own performance of the option is handled
    /// * `remote` - How the peer's performance of the option is handled
    pub const fn new(local: PolicyAction, remote: PolicyAction) -> OptionPolicy {
        OptionPolicy { local, remote }
    }

    /// Refuses the option on both half-channels.
    ///
    /// # Returns
    ///
    /// A policy answering every DO with WONT and every WILL with DONT.
    pub const fn refused() -> OptionPolicy {
        OptionPolicy {
            local: PolicyAction::Refused,
            remote: PolicyAction::Refused,
        }
    }
}

/// The capabilities the engine hands a plugin while it runs.
///
/// All emission is queued: negotiation bytes and subnegotiations written
/// here reach the peer before any later input byte is interpreted.
pub struct PluginContext<'a> {
    pub(crate) mode: TelnetMode,
    pub(crate) options: &'a mut OptionTable,
    pub(crate) session: &'a mut SessionState,
    pub(crate) effects: &'a mut Effects,
}

impl PluginContext<'_> {
    /// The role this interpreter was built with.
    pub fn mode(&self) -> TelnetMode {
        self.mode
    }

    /// The character encoding currently applied to application data.
    pub fn current_encoding(&self) -> &str {
        &self.session.encoding
    }

    /// Switches the session encoding for all subsequent application data.
    pub fn set_encoding(&mut self, encoding: &str) {
        self.session.encoding = encoding.to_string();
    }

    /// Queues a subnegotiation for the peer.
    ///
    /// # Arguments
    ///
    /// * `option` - The option the payload belongs to
    /// * `payload` - The unescaped payload; 0xFF bytes are doubled when
    ///   the frame is written
    ///
    /// The frame goes on the wire as `IAC SB option payload IAC SE`,
    /// before any later input byte is interpreted.
    pub fn send_subnegotiation(&mut self, option: TelnetOption, payload: &[u8]) {
        self.effects.subnegotiate(option, payload);
    }

    /// Queues one application byte back to the peer, IAC-escaped.
    ///
    /// # Arguments
    ///
    /// * `byte` - The byte to echo; 0xFF is doubled on the wire
    pub fn send_data(&mut self, byte: u8) {
        self.effects.data(byte);
    }

    /// Starts negotiation to perform `option` ourselves (queues WILL).
    pub fn request_local_enable(&mut self, option: TelnetOption) {
        if let Some(verb) = self.options.request_will(option) {
            self.effects.negotiate(verb, option);
        }
    }

    /// Starts negotiation for the peer to perform `option` (queues DO).
    pub fn request_remote_enable(&mut self, option: TelnetOption) {
        if let Some(verb) = self.options.request_do(option) {
            self.effects.negotiate(verb, option);
        }
    }

    /// Starts negotiation to stop performing `option` (queues WONT).
    pub fn request_local_disable(&mut self, option: TelnetOption) {
        if let Some(verb) = self.options.request_wont(option) {
            self.effects.negotiate(verb, option);
        }
    }

    /// Starts negotiation for the peer to stop performing `option`
    /// (queues DONT).
    pub fn request_remote_disable(&mut self, option: TelnetOption) {
        if let Some(verb) = self.options.request_dont(option) {
            self.effects.negotiate(verb, option);
        }
    }

    /// Whether we currently perform `option`.
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        self.options.local_enabled(option)
    }

    /// Whether the peer currently performs `option`.
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.options.remote_enabled(option)
    }

    /// Routes every later inbound byte through the zlib inflater.
    ///
    /// Takes effect immediately after the current byte: the rest of the
    /// chunk the activating subnegotiation arrived in is already treated
    /// as compressed.
    pub fn enable_inbound_decompression(&mut self, version: CompressVersion) {
        self.effects.activate_inflate = Some(version);
    }
}

/// One Telnet extension module.
///
/// Implementations own their per-option state; the engine owns the
/// negotiation flags and calls back in on transitions and
/// subnegotiations. Hooks default to no-ops so simple options implement
/// only what they use.
///
/// # Lifecycle
///
/// 1. The plugin is registered on the builder; its
///    [`policy`](TelnetPlugin::policy) answers shape the option support
///    mask.
/// 2. At startup, `Offered` half-channels produce WILL/DO frames in
///    dependency order.
/// 3. For the session lifetime the engine routes negotiation
///    transitions and subnegotiation payloads for the claimed options to
///    the hooks below.
///
/// # Example
///
/// A minimal plugin that refuses its option everywhere:
///
/// ```
/// use std::any::Any;
/// use mudwire_engine::{
///     OptionPolicy, TelnetMode, TelnetOption, TelnetPlugin,
/// };
///
/// struct NullPlugin;
///
/// impl TelnetPlugin for NullPlugin {
///     fn name(&self) -> &'static str {
///         "null"
///     }
///     fn options(&self) -> &'static [TelnetOption] {
///         &[TelnetOption::Unknown(200)]
///     }
///     fn policy(&self, _mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
///         OptionPolicy::refused()
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
pub trait TelnetPlugin: Send + 'static {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// The option codes this plugin claims. A code may be claimed by at
    /// most one registered plugin.
    fn options(&self) -> &'static [TelnetOption];

    /// Options that must be offered before this plugin's own, used only to
    /// order startup offers.
    ///
    /// # Returns
    ///
    /// Option codes whose owning plugins are offered first. Empty for
    /// every built-in plugin: the standard extensions are independent of
    /// one another.
    fn dependencies(&self) -> &'static [TelnetOption] {
        &[]
    }

    /// The negotiation policy for one claimed option under the given role.
    ///
    /// # Arguments
    ///
    /// * `mode` - The role the interpreter was built with
    /// * `option` - One of the codes returned by
    ///   [`options`](TelnetPlugin::options)
    fn policy(&self, mode: TelnetMode, option: TelnetOption) -> OptionPolicy;

    /// A half-channel of a claimed option reached Yes.
    ///
    /// Fires on every transition to Yes, including a failed disable the
    /// peer answered with DO/WILL.
    fn option_enabled(
        &mut self,
        _ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        _side: TelnetSide,
    ) {
    }

    /// A half-channel of a claimed option left Yes.
    fn option_disabled(
        &mut self,
        _ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        _side: TelnetSide,
    ) {
    }

    /// Our pending request for a claimed option was declined by the peer.
    fn option_refused(
        &mut self,
        _ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        _side: TelnetSide,
    ) {
    }

    /// A complete subnegotiation payload arrived for a claimed option.
    ///
    /// Errors are recoverable: the engine logs them and drops only this
    /// subnegotiation.
    fn subnegotiation(
        &mut self,
        _ctx: &mut PluginContext<'_>,
        _option: TelnetOption,
        _payload: &[u8],
    ) -> TelnetResult<()> {
        Ok(())
    }

    /// One in-band application byte was interpreted.
    fn application_byte(&mut self, _ctx: &mut PluginContext<'_>, _byte: u8) {}

    /// Upcast for state inspection.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for state mutation.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The registered plugin set.
///
/// Validated once at build time: duplicate option claims, dependencies on
/// unregistered options and dependency cycles all fail the build. Dispatch
/// from an option code to its owner is a single array lookup.
pub(crate) struct PluginRegistry {
    plugins: Vec<Option<Box<dyn TelnetPlugin>>>,
    index: [Option<usize>; 256],
    order: Vec<usize>,
}

impl PluginRegistry {
    pub fn new(plugins: Vec<Box<dyn TelnetPlugin>>) -> TelnetResult<PluginRegistry> {
        let mut index: [Option<usize>; 256] = [None; 256];
        for (slot, plugin) in plugins.iter().enumerate() {
            for option in plugin.options() {
                let code = option.to_u8() as usize;
                if let Some(previous) = index[code] {
                    return Err(TelnetError::InvalidConfiguration(format!(
                        "option {option} claimed by both {} and {}",
                        plugins[previous].name(),
                        plugin.name(),
                    )));
                }
                index[code] = Some(slot);
            }
        }
        let order = topological_order(&plugins, &index)?;
        Ok(PluginRegistry {
            plugins: plugins.into_iter().map(Some).collect(),
            index,
            order,
        })
    }

    /// The number of plugin slots.
    pub fn slots(&self) -> usize {
        self.plugins.len()
    }

    /// The slot claiming the given option code.
    pub fn owner_of(&self, code: u8) -> Option<usize> {
        self.index[code as usize]
    }

    /// Plugin slots in startup-offer order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Temporarily removes a plugin so it can be called with a context
    /// borrowing the rest of the machine. Must be paired with
    /// [`PluginRegistry::restore`].
    pub fn take(&mut self, slot: usize) -> Option<Box<dyn TelnetPlugin>> {
        self.plugins.get_mut(slot).and_then(Option::take)
    }

    pub fn restore(&mut self, slot: usize, plugin: Box<dyn TelnetPlugin>) {
        self.plugins[slot] = Some(plugin);
    }

    /// Iterates the registered plugins.
    pub fn iter(&self) -> impl Iterator<Item = &dyn TelnetPlugin> {
        self.plugins
            .iter()
            .filter_map(|slot| slot.as_deref())
    }
}

/// Kahn's algorithm over the dependency edges. Dependency-free plugins
/// keep their registration order.
fn topological_order(
    plugins: &[Box<dyn TelnetPlugin>],
    index: &[Option<usize>; 256],
) -> TelnetResult<Vec<usize>> {
    let count = plugins.len();
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indegree = vec![0usize; count];
    for (slot, plugin) in plugins.iter().enumerate() {
        for dependency in plugin.dependencies() {
            let owner = index[dependency.to_u8() as usize].ok_or_else(|| {
                TelnetError::InvalidConfiguration(format!(
                    "{} depends on option {dependency}, which no plugin claims",
                    plugin.name(),
                ))
            })?;
            if owner == slot {
                continue;
            }
            edges[owner].push(slot);
            indegree[slot] += 1;
        }
    }
    let mut ready: Vec<usize> = (0..count).filter(|slot| indegree[*slot] == 0).collect();
    let mut order = Vec::with_capacity(count);
    let mut cursor = 0;
    while cursor < ready.len() {
        let slot = ready[cursor];
        cursor += 1;
        order.push(slot);
        for &next in &edges[slot] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(next);
            }
        }
    }
    if order.len() != count {
        return Err(TelnetError::InvalidConfiguration(
            "plugin dependencies form a cycle".into(),
        ));
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{EchoPlugin, GmcpPlugin, NawsPlugin};

    /// A plugin whose startup offers must come after GMCP's.
    struct AfterGmcpPlugin;

    impl TelnetPlugin for AfterGmcpPlugin {
        fn name(&self) -> &'static str {
            "after-gmcp"
        }

        fn options(&self) -> &'static [TelnetOption] {
            &[TelnetOption::Unknown(200)]
        }

        fn dependencies(&self) -> &'static [TelnetOption] {
            &[TelnetOption::GMCP]
        }

        fn policy(&self, _mode: TelnetMode, _option: TelnetOption) -> OptionPolicy {
            OptionPolicy::refused()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn dependency_on_unregistered_option_fails_registration() {
        let result = PluginRegistry::new(vec![Box::new(AfterGmcpPlugin)]);
        assert!(matches!(
            result,
            Err(TelnetError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn dependencies_reorder_startup_offers() {
        let registry = PluginRegistry::new(vec![
            Box::new(AfterGmcpPlugin),
            Box::new(GmcpPlugin::new()),
        ])
        .unwrap();
        assert_eq!(registry.order(), &[1, 0]);
    }

    #[test]
    fn duplicate_option_claims_fail_registration() {
        let result = PluginRegistry::new(vec![
            Box::new(EchoPlugin::new()),
            Box::new(EchoPlugin::new()),
        ]);
        assert!(matches!(
            result,
            Err(TelnetError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn dependency_free_plugins_keep_registration_order() {
        let registry = PluginRegistry::new(vec![
            Box::new(GmcpPlugin::new()),
            Box::new(EchoPlugin::new()),
            Box::new(NawsPlugin::new()),
        ])
        .unwrap();
        assert_eq!(registry.order(), &[0, 1, 2]);
    }

    #[test]
    fn dispatch_index_finds_owner() {
        let registry =
            PluginRegistry::new(vec![Box::new(EchoPlugin::new()), Box::new(NawsPlugin::new())])
                .unwrap();
        assert_eq!(registry.owner_of(crate::consts::option::ECHO), Some(0));
        assert_eq!(registry.owner_of(crate::consts::option::NAWS), Some(1));
        assert_eq!(registry.owner_of(crate::consts::option::GMCP), None);
    }
}
