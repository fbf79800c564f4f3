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

//! Interpreter façade
//!
//! [`TelnetInterpreter`] is the public entry point: a builder composes
//! role, plugins and callback slots, `build` spawns a single worker task,
//! and the transport adapter feeds bytes in through a bounded queue. All
//! interpretation happens on the worker, strictly in input order; each
//! callback future is awaited before the next byte is stepped, so the
//! negotiation bytes the peer sees and the events the application sees
//! both follow the protocol trace exactly.

use crate::args::gmcp::GmcpMessage;
use crate::args::msdp::MsdpTable;
use crate::args::mssp::MsspConfig;
use crate::machine::{CallbackCall, Effect, Effects, Machine};
use crate::options::TelnetOption;
use crate::plugin::{PluginRegistry, TelnetPlugin};
use crate::plugins::mccp::CompressVersion;
use crate::result::{TelnetError, TelnetResult};
use bytes::{Bytes, BytesMut};
use futures::FutureExt;
use futures::future::BoxFuture;
use mudwire_compress::InflateStream;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, warn};

/// Which end of the connection this interpreter speaks for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetMode {
    /// The connecting end: accepts offers, never initiates
    Client,
    /// The accepting end: makes the startup offers
    Server,
}

impl std::fmt::Display for TelnetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetMode::Client => write!(f, "Client"),
            TelnetMode::Server => write!(f, "Server"),
        }
    }
}

/// Callback slot for completed application lines.
pub type SubmitCallback = Box<dyn FnMut(BytesMut, String) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for bytes the interpreter wants written to the peer.
pub type NegotiationCallback = Box<dyn FnMut(BytesMut) -> BoxFuture<'static, ()> + Send>;
/// Callback slot observing each application byte.
pub type ByteCallback = Box<dyn FnMut(u8, String) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for echo state changes.
pub type EchoStateCallback = Box<dyn FnMut(bool) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for peer window size reports (width, height).
pub type NawsCallback = Box<dyn FnMut(u16, u16) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for session encoding changes.
pub type CharsetCallback = Box<dyn FnMut(String) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for received server status tables.
pub type MsspCallback = Box<dyn FnMut(MsspConfig) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for received structured data tables.
pub type MsdpCallback = Box<dyn FnMut(MsdpTable) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for received GMCP messages.
pub type GmcpCallback = Box<dyn FnMut(GmcpMessage) -> BoxFuture<'static, ()> + Send>;
/// Callback slot for compression state changes.
pub type CompressionCallback =
    Box<dyn FnMut(CompressVersion, bool) -> BoxFuture<'static, ()> + Send>;

/// The optional, individually-shaped callback slots.
#[derive(Default)]
pub(crate) struct Callbacks {
    submit: Option<SubmitCallback>,
    negotiation: Option<NegotiationCallback>,
    byte: Option<ByteCallback>,
    echo_state: Option<EchoStateCallback>,
    naws: Option<NawsCallback>,
    charset: Option<CharsetCallback>,
    mssp: Option<MsspCallback>,
    msdp: Option<MsdpCallback>,
    gmcp: Option<GmcpCallback>,
    compression: Option<CompressionCallback>,
}

/// Work items for the interpreter worker.
enum Input {
    Bytes(Bytes),
    Gmcp(String, String),
    Naws(u16, u16),
    Flush(oneshot::Sender<()>),
}

/// Composes a [`TelnetInterpreter`].
///
/// ```no_run
/// use mudwire_engine::{EchoPlugin, GmcpPlugin, TelnetInterpreter, TelnetMode};
///
/// # async fn example() -> mudwire_engine::TelnetResult<()> {
/// let interpreter = TelnetInterpreter::builder(TelnetMode::Server)
///     .plugin(EchoPlugin::new().with_server_echo(true))
///     .plugin(GmcpPlugin::new())
///     .on_negotiation(|bytes| async move {
///         // write bytes to the socket
///         let _ = bytes;
///     })
///     .build()?;
/// interpreter.interpret(b"hello\r\n").await?;
/// # Ok(())
/// # }
/// ```
pub struct InterpreterBuilder {
    mode: TelnetMode,
    span: Option<tracing::Span>,
    capacity: usize,
    plugins: Vec<Box<dyn TelnetPlugin>>,
    callbacks: Callbacks,
}

impl InterpreterBuilder {
    fn new(mode: TelnetMode) -> InterpreterBuilder {
        InterpreterBuilder {
            mode,
            span: None,
            capacity: 64,
            plugins: Vec::new(),
            callbacks: Callbacks::default(),
        }
    }

    /// Instruments the worker with the given span instead of a fresh one.
    /// All engine log events flow through it; no process-wide state is
    /// touched.
    pub fn span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Sets the bounded work queue capacity (default 64).
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Registers an option plugin.
    ///
    /// # Arguments
    ///
    /// * `plugin` - The module handling one or more option codes.
    ///   Registration order is the startup-offer order for plugins
    ///   without dependencies.
    ///
    /// # Notes
    ///
    /// Duplicate option claims across plugins fail
    /// [`InterpreterBuilder::build`] with
    /// [`TelnetError::InvalidConfiguration`].
    pub fn plugin<P: TelnetPlugin>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Delivers each completed application line with its encoding.
    ///
    /// Lines are assembled from the in-band data channel and flushed on
    /// CR LF, bare LF or CR NUL; the terminator is not included. The
    /// encoding is the name current at flush time (initially
    /// [`crate::DEFAULT_ENCODING`], switched by CHARSET).
    pub fn on_submit<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(BytesMut, String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.submit = Some(Box::new(move |line, encoding| {
            callback(line, encoding).boxed()
        }));
        self
    }

    /// Receives every byte the interpreter wants written to the peer.
    ///
    /// The adapter must write these bytes to the transport unchanged;
    /// they arrive in the exact order the wire protocol requires, before
    /// any later input byte is interpreted.
    pub fn on_negotiation<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(BytesMut) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.negotiation = Some(Box::new(move |bytes| callback(bytes).boxed()));
        self
    }

    /// Observes each application byte with the current encoding.
    pub fn on_byte<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(u8, String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.byte = Some(Box::new(move |byte, encoding| {
            callback(byte, encoding).boxed()
        }));
        self
    }

    /// Fires when echo is switched on or off.
    pub fn on_echo_state_changed<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(bool) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.echo_state = Some(Box::new(move |enabled| callback(enabled).boxed()));
        self
    }

    /// Fires when the peer reports its window size (width, height).
    pub fn on_naws<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(u16, u16) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.naws = Some(Box::new(move |width, height| {
            callback(width, height).boxed()
        }));
        self
    }

    /// Fires when the session encoding changes.
    pub fn on_charset_changed<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.charset = Some(Box::new(move |encoding| callback(encoding).boxed()));
        self
    }

    /// Fires when a server status table arrives.
    pub fn on_mssp<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(MsspConfig) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.mssp = Some(Box::new(move |config| callback(config).boxed()));
        self
    }

    /// Fires when a structured data table arrives.
    pub fn on_msdp<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(MsdpTable) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.msdp = Some(Box::new(move |table| callback(table).boxed()));
        self
    }

    /// Fires when a GMCP message arrives.
    pub fn on_gmcp<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(GmcpMessage) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.gmcp = Some(Box::new(move |message| callback(message).boxed()));
        self
    }

    /// Fires when compression is switched on or off for either direction.
    pub fn on_compression_enabled<F, Fut>(mut self, mut callback: F) -> Self
    where
        F: FnMut(CompressVersion, bool) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.callbacks.compression = Some(Box::new(move |version, enabled| {
            callback(version, enabled).boxed()
        }));
        self
    }

    /// Validates the configuration and spawns the interpreter worker.
    ///
    /// Must be called inside a tokio runtime. The built interpreter is
    /// ready to consume bytes immediately; in server mode the startup
    /// offers are queued before any input can be interpreted, so the
    /// peer sees them first.
    ///
    /// # Returns
    ///
    /// The running [`TelnetInterpreter`].
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::InvalidConfiguration`] for a zero queue
    /// capacity, duplicate option claims, a dependency on an option no
    /// plugin claims, or a dependency cycle.
    pub fn build(self) -> TelnetResult<TelnetInterpreter> {
        if self.capacity == 0 {
            return Err(TelnetError::InvalidConfiguration(
                "work queue capacity must be nonzero".into(),
            ));
        }
        let registry = PluginRegistry::new(self.plugins)?;
        let machine = Arc::new(Mutex::new(Machine::new(self.mode, registry)));
        let (sender, receiver) = mpsc::channel(self.capacity);
        let span = self
            .span
            .unwrap_or_else(|| tracing::debug_span!("telnet", mode = %self.mode));
        let worker = tokio::spawn(
            run_worker(Arc::clone(&machine), self.callbacks, receiver).instrument(span),
        );
        Ok(TelnetInterpreter {
            mode: self.mode,
            machine,
            sender: Mutex::new(Some(sender)),
            worker: tokio::sync::Mutex::new(Some(worker)),
        })
    }
}

/// The Telnet negotiation interpreter.
///
/// Single-writer: one logical producer feeds bytes in order. Internally a
/// single worker drains the bounded queue and steps the state machine;
/// [`TelnetInterpreter::wait_for_processing`] is the only synchronization
/// primitive needed to observe a quiescent state.
pub struct TelnetInterpreter {
    mode: TelnetMode,
    machine: Arc<Mutex<Machine>>,
    sender: Mutex<Option<mpsc::Sender<Input>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TelnetInterpreter {
    /// Starts composing an interpreter for the given role.
    pub fn builder(mode: TelnetMode) -> InterpreterBuilder {
        InterpreterBuilder::new(mode)
    }

    /// The role this interpreter was built with.
    pub fn mode(&self) -> TelnetMode {
        self.mode
    }

    /// Feeds a buffer of inbound bytes.
    ///
    /// Semantically equivalent to feeding the bytes one at a time with
    /// [`TelnetInterpreter::interpret_byte`]. The call enqueues the
    /// buffer and returns; interpretation happens on the worker, in
    /// arrival order. Backpressure: awaits while the work queue is full.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Bytes exactly as read from the transport, IAC
    ///   escaping and all
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::Disposed`] after
    /// [`TelnetInterpreter::dispose`].
    pub async fn interpret(&self, bytes: &[u8]) -> TelnetResult<()> {
        self.submit(Input::Bytes(Bytes::copy_from_slice(bytes)))
            .await
    }

    /// Feeds a single inbound byte.
    ///
    /// # Arguments
    ///
    /// * `byte` - One byte as read from the transport
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::Disposed`] after
    /// [`TelnetInterpreter::dispose`].
    pub async fn interpret_byte(&self, byte: u8) -> TelnetResult<()> {
        self.submit(Input::Bytes(Bytes::copy_from_slice(&[byte])))
            .await
    }

    /// Encodes a GMCP message and routes it to the negotiation channel.
    ///
    /// The message is framed as `IAC SB GMCP package SP message IAC SE`
    /// and handed to `on_negotiation` from the worker, ordered with
    /// respect to any replies already queued.
    ///
    /// # Arguments
    ///
    /// * `package` - The dotted package name, e.g. `"Core.Hello"`
    /// * `message` - The payload text, conventionally JSON, passed
    ///   through verbatim
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::Disposed`] after
    /// [`TelnetInterpreter::dispose`].
    pub async fn send_gmcp(&self, package: &str, message: &str) -> TelnetResult<()> {
        self.submit(Input::Gmcp(package.to_string(), message.to_string()))
            .await
    }

    /// Encodes a window size report and routes it to the negotiation
    /// channel.
    ///
    /// The dimensions are framed as `IAC SB NAWS w h IAC SE` with each
    /// 0xFF byte doubled, and the registered [`NawsPlugin`]'s stored
    /// size is updated so later re-negotiations report the same values.
    ///
    /// # Arguments
    ///
    /// * `width` - Terminal columns
    /// * `height` - Terminal rows
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::Disposed`] after
    /// [`TelnetInterpreter::dispose`].
    ///
    /// [`NawsPlugin`]: crate::plugins::NawsPlugin
    pub async fn send_naws(&self, width: u16, height: u16) -> TelnetResult<()> {
        self.submit(Input::Naws(width, height)).await
    }

    /// Awaits queue drain.
    ///
    /// Resolves once every input queued before this call has been
    /// interpreted and every resulting callback future has completed.
    /// This is the only synchronization primitive tests need: after it
    /// resolves, the inspection accessors see a quiescent state.
    ///
    /// # Errors
    ///
    /// Returns [`TelnetError::Disposed`] when the interpreter was
    /// disposed before or while waiting.
    pub async fn wait_for_processing(&self) -> TelnetResult<()> {
        let (done, waiter) = oneshot::channel();
        self.submit(Input::Flush(done)).await?;
        waiter.await.map_err(|_| TelnetError::Disposed)
    }

    /// Stops the interpreter.
    ///
    /// The work queue is drained, in-flight callbacks are awaited, the
    /// worker exits and any decompressor state is released with it. The
    /// call is idempotent; every input method called afterwards fails
    /// with [`TelnetError::Disposed`].
    ///
    /// # Errors
    ///
    /// None in the current implementation; the signature leaves room for
    /// shutdown failures.
    pub async fn dispose(&self) -> TelnetResult<()> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        Ok(())
    }

    /// The encoding currently applied to application data.
    pub fn current_encoding(&self) -> String {
        self.lock_machine().current_encoding().to_string()
    }

    /// Whether a registered plugin supports the option on the local
    /// half-channel under this role.
    pub fn is_supported_local(&self, option: TelnetOption) -> bool {
        self.lock_machine().supported_local(option)
    }

    /// Whether a registered plugin supports the option on the remote
    /// half-channel under this role.
    pub fn is_supported_remote(&self, option: TelnetOption) -> bool {
        self.lock_machine().supported_remote(option)
    }

    /// Whether we currently perform the option.
    pub fn is_enabled_local(&self, option: TelnetOption) -> bool {
        self.lock_machine().local_enabled(option)
    }

    /// Whether the peer currently performs the option.
    pub fn is_enabled_remote(&self, option: TelnetOption) -> bool {
        self.lock_machine().remote_enabled(option)
    }

    /// Inspects a registered plugin's state by concrete type.
    ///
    /// # Arguments
    ///
    /// * `f` - Applied to the first registered plugin of type `P` while
    ///   the machine is locked
    ///
    /// # Returns
    ///
    /// `Some` with the closure's result, or `None` when no plugin of
    /// type `P` is registered.
    ///
    /// # Example
    /// ```no_run
    /// use mudwire_engine::{EchoPlugin, TelnetInterpreter, TelnetMode};
    ///
    /// # async fn example() -> mudwire_engine::TelnetResult<()> {
    /// let interpreter = TelnetInterpreter::builder(TelnetMode::Client)
    ///     .plugin(EchoPlugin::new())
    ///     .build()?;
    /// interpreter.wait_for_processing().await?;
    /// let echoing = interpreter
    ///     .with_plugin(|echo: &EchoPlugin| echo.is_remote_echoing())
    ///     .unwrap_or(false);
    /// # let _ = echoing;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Notes
    ///
    /// Call after [`TelnetInterpreter::wait_for_processing`] for a
    /// consistent view; the worker mutates plugin state between inputs.
    pub fn with_plugin<P: TelnetPlugin, R>(&self, f: impl FnOnce(&P) -> R) -> Option<R> {
        let machine = self.lock_machine();
        machine.plugin::<P>().map(f)
    }

    fn lock_machine(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn submit(&self, input: Input) -> TelnetResult<()> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TelnetError::Disposed)?;
        sender.send(input).await.map_err(|_| TelnetError::Disposed)
    }
}

fn lock(machine: &Arc<Mutex<Machine>>) -> MutexGuard<'_, Machine> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single worker: drains the queue, steps the machine and awaits the
/// resulting callbacks in order.
async fn run_worker(
    machine: Arc<Mutex<Machine>>,
    mut callbacks: Callbacks,
    mut receiver: mpsc::Receiver<Input>,
) {
    let startup = lock(&machine).start();
    dispatch(startup, &mut callbacks).await;
    let mut inflate: Option<InflateStream> = None;
    while let Some(input) = receiver.recv().await {
        match input {
            Input::Bytes(bytes) => {
                ingest(&machine, &mut callbacks, &mut inflate, &bytes).await;
            }
            Input::Gmcp(package, message) => {
                let fx = lock(&machine).send_gmcp(&package, &message);
                dispatch(fx, &mut callbacks).await;
            }
            Input::Naws(width, height) => {
                let fx = lock(&machine).send_naws(width, height);
                dispatch(fx, &mut callbacks).await;
            }
            Input::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("interpreter worker stopped");
}

/// Routes a chunk of inbound bytes, switching to the inflater the moment a
/// compression marker takes effect so the rest of the chunk is already
/// treated as deflate data.
async fn ingest(
    machine: &Arc<Mutex<Machine>>,
    callbacks: &mut Callbacks,
    inflate: &mut Option<InflateStream>,
    bytes: &[u8],
) {
    let mut rest = bytes;
    while !rest.is_empty() {
        if let Some(stream) = inflate.as_mut() {
            let mut plain = BytesMut::new();
            match stream.feed(rest, &mut plain) {
                Ok(status) => {
                    rest = &rest[status.consumed..];
                    for &byte in plain.iter() {
                        if step(machine, callbacks, byte).await.is_some() {
                            warn!("compression marker inside compressed stream ignored");
                        }
                    }
                    if status.ended {
                        debug!("inbound compression stream ended");
                        *inflate = None;
                    } else if status.consumed == 0 && status.produced == 0 && !rest.is_empty() {
                        warn!("inbound decompressor stalled, dropping {} bytes", rest.len());
                        rest = &[];
                    }
                }
                Err(error) => {
                    warn!("inbound decompression failed, dropping compression: {error}");
                    *inflate = None;
                    rest = &[];
                }
            }
        } else {
            let byte = rest[0];
            rest = &rest[1..];
            if let Some(version) = step(machine, callbacks, byte).await {
                debug!("inbound decompression active ({version})");
                *inflate = Some(InflateStream::new());
            }
        }
    }
}

/// Steps one byte and drains its effects. Returns a requested inflater
/// activation, which takes effect on the next inbound byte.
async fn step(
    machine: &Arc<Mutex<Machine>>,
    callbacks: &mut Callbacks,
    byte: u8,
) -> Option<CompressVersion> {
    let fx = lock(machine).feed(byte);
    let activate = fx.activate_inflate;
    dispatch(fx, callbacks).await;
    activate
}

/// Drains effects in order: negotiation bytes and callbacks interleave
/// exactly as the machine queued them.
async fn dispatch(fx: Effects, callbacks: &mut Callbacks) {
    for effect in fx.items {
        match effect {
            Effect::Negotiation(bytes) => {
                if let Some(slot) = callbacks.negotiation.as_mut() {
                    invoke(slot(bytes)).await;
                }
            }
            Effect::Call(call) => invoke_call(call, callbacks).await,
        }
    }
}

async fn invoke_call(call: CallbackCall, callbacks: &mut Callbacks) {
    match call {
        CallbackCall::Submit(line, encoding) => {
            if let Some(slot) = callbacks.submit.as_mut() {
                invoke(slot(line, encoding)).await;
            }
        }
        CallbackCall::Byte(byte, encoding) => {
            if let Some(slot) = callbacks.byte.as_mut() {
                invoke(slot(byte, encoding)).await;
            }
        }
        CallbackCall::EchoState(enabled) => {
            if let Some(slot) = callbacks.echo_state.as_mut() {
                invoke(slot(enabled)).await;
            }
        }
        CallbackCall::Naws(width, height) => {
            if let Some(slot) = callbacks.naws.as_mut() {
                invoke(slot(width, height)).await;
            }
        }
        CallbackCall::CharsetChanged(encoding) => {
            if let Some(slot) = callbacks.charset.as_mut() {
                invoke(slot(encoding)).await;
            }
        }
        CallbackCall::Mssp(config) => {
            if let Some(slot) = callbacks.mssp.as_mut() {
                invoke(slot(config)).await;
            }
        }
        CallbackCall::Msdp(table) => {
            if let Some(slot) = callbacks.msdp.as_mut() {
                invoke(slot(table)).await;
            }
        }
        CallbackCall::Gmcp(message) => {
            if let Some(slot) = callbacks.gmcp.as_mut() {
                invoke(slot(message)).await;
            }
        }
        CallbackCall::Compression(version, enabled) => {
            if let Some(slot) = callbacks.compression.as_mut() {
                invoke(slot(version, enabled)).await;
            }
        }
    }
}

/// Awaits a callback future with panic containment: a panicking callback
/// is logged and the worker advances past the event.
async fn invoke(future: BoxFuture<'static, ()>) {
    if AssertUnwindSafe(future).catch_unwind().await.is_err() {
        warn!("user callback panicked; continuing");
    }
}
