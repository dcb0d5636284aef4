//! Message proxy (broker) implementation for ZeroMQ patterns.
//!
//! A proxy connects frontend and backend sockets, forwarding messages
//! bidirectionally. This enables common patterns like message brokers,
//! load balancers, and forwarders without application logic.
//!
//! # Supported Patterns
//!
//! - **PUB-SUB broker**: XSUB frontend ←→ XPUB backend
//! - **REQ-REP load balancer**: ROUTER frontend ←→ DEALER backend
//! - **PUSH-PULL forwarder**: PULL frontend ←→ PUSH backend
//!
//! # Message Flow
//!
//! ```text
//! Publishers → XSUB (frontend) → XPUB (backend) → Subscribers
//! Clients    → ROUTER (frontend) → DEALER (backend) → Workers
//! ```
//!
//! # Example: PUB-SUB Broker
//!
//! ```no_run
//! use monocoque_zmtp::proxy::{proxy, ProxySocket};
//! use monocoque_zmtp::xsub::XSubSocket;
//! use monocoque_zmtp::xpub::XPubSocket;
//!
//! #[compio::main]
//! async fn main() -> std::io::Result<()> {
//!     // Publishers connect to 5555
//!     let mut frontend = XSubSocket::bind("127.0.0.1:5555").await?;
//!     
//!     // Subscribers connect to 5556
//!     let mut backend = XPubSocket::bind("127.0.0.1:5556").await?;
//!     
//!     // Forward messages and subscriptions bidirectionally
//!     proxy(&mut frontend, &mut backend, None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Example: REQ-REP Load Balancer
//!
//! ```no_run
//! use monocoque_zmtp::proxy::{proxy, ProxySocket};
//! use monocoque_zmtp::router::RouterSocket;
//! use monocoque_zmtp::dealer::DealerSocket;
//!
//! #[compio::main]
//! async fn main() -> std::io::Result<()> {
//!     // Clients connect to 5555
//!     let mut frontend = RouterSocket::bind("127.0.0.1:5555").await?;
//!     
//!     // Workers connect to 5556
//!     let mut backend = DealerSocket::bind("127.0.0.1:5556").await?;
//!     
//!     // Load balance requests across workers
//!     proxy(&mut frontend, &mut backend, None).await?;
//!     Ok(())
//! }
//! ```

use bytes::Bytes;
use std::io;
use std::time::Duration;
use tracing::debug;

use monocoque_core::context::Context;

// Import socket types
use crate::dealer::DealerSocket;
use crate::pair::PairSocket;
use crate::publisher::PubSocket;
use crate::pull::PullSocket;
use crate::push::PushSocket;
use crate::rep::RepSocket;
use crate::req::ReqSocket;
use crate::router::RouterSocket;
use crate::subscriber::SubSocket;
use crate::xpub::XPubSocket;
use crate::xsub::XSubSocket;

/// Socket types that can participate in a proxy.
///
/// Sockets must implement multipart message send/receive operations
/// to be used in a proxy pattern.
///
/// Note: This trait is designed for single-threaded async runtimes like compio
/// and does not require `Send`.
#[async_trait::async_trait(?Send)]
pub trait ProxySocket {
    /// Receive a multipart message from the socket.
    ///
    /// Returns `None` if no message is available or connection closed.
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>>;

    /// Send a multipart message to the socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the send operation fails.
    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()>;

    /// Get a description of the socket for logging.
    fn socket_desc(&self) -> &'static str;
}

/// Run a bidirectional message proxy between frontend and backend sockets.
///
/// Messages are forwarded in both directions:
/// - Frontend → Backend
/// - Backend → Frontend
///
/// An optional capture socket receives copies of all messages for monitoring.
///
/// # Parameters
///
/// - `frontend`: Socket facing clients/publishers
/// - `backend`: Socket facing workers/subscribers
/// - `capture`: Optional socket to receive message copies
///
/// # Patterns
///
/// - **PUB-SUB**: `XSUB` (frontend) ←→ `XPUB` (backend)
/// - **REQ-REP**: `ROUTER` (frontend) ←→ `DEALER` (backend)
/// - **PUSH-PULL**: `PULL` (frontend) ←→ `PUSH` (backend)
///
/// # Blocking
///
/// This function runs forever, forwarding messages until an error occurs.
///
/// # Errors
///
/// Returns an error if a socket operation fails.
///
/// # Example
///
/// ```no_run
/// use monocoque_zmtp::proxy::{proxy, ProxySocket};
/// use monocoque_zmtp::xsub::XSubSocket;
/// use monocoque_zmtp::xpub::XPubSocket;
///
/// #[compio::main]
/// async fn main() -> std::io::Result<()> {
///     let mut frontend = XSubSocket::bind("127.0.0.1:5555").await?;
///     let mut backend = XPubSocket::bind("127.0.0.1:5556").await?;
///     
///     proxy(&mut frontend, &mut backend, None).await
/// }
/// ```
pub async fn proxy<F, B, C>(
    frontend: &mut F,
    backend: &mut B,
    capture: Option<&mut C>,
) -> io::Result<()>
where
    F: ProxySocket,
    B: ProxySocket,
    C: ProxySocket,
{
    proxy_with_context(frontend, backend, capture, None, None).await
}

/// How often the termination-observing arm of a device/proxy loop wakes up
/// to check [`Context::is_terminating`]. Keeping this short is what lets
/// `Context::terminate` unblock a device that has no socket ready to poll.
const TERMINATION_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Cooperative stop signal for a running device. Cloning and calling
/// [`StopHandle::stop`] from anywhere causes the device's run loop to
/// return `Ok(())` the next time it polls.
#[derive(Clone)]
pub struct StopHandle {
    tx: flume::Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.tx.try_send(());
    }
}

/// The receiving half of a [`StopHandle`], held internally by a device.
struct StopToken {
    rx: flume::Receiver<()>,
}

fn stop_pair() -> (StopHandle, StopToken) {
    let (tx, rx) = flume::bounded(1);
    (StopHandle { tx }, StopToken { rx })
}

async fn wait_stop(token: Option<&StopToken>) {
    match token {
        Some(token) => {
            let _ = token.rx.recv_async().await;
        }
        None => futures::future::pending::<()>().await,
    }
}

/// Polls `context.is_terminating()` until it reports true, then returns.
/// Never resolves if `context` is `None`, so it can sit as a no-op arm in a
/// `select!` alongside real work.
async fn wait_terminated(context: Option<&Context>) {
    let Some(context) = context else {
        futures::future::pending::<()>().await;
        return;
    };
    loop {
        if context.is_terminating() {
            return;
        }
        compio::time::sleep(TERMINATION_POLL_INTERVAL).await;
    }
}

/// Same as [`proxy`], but additionally observes an optional [`Context`]'s
/// termination and an optional cooperative [`StopHandle`]/token, exiting
/// promptly either way instead of looping forever.
///
/// Returns `Err` carrying [`monocoque_core::error::Error::Term`] if the
/// context terminated, `Ok(())` if stopped cooperatively, or the first
/// socket I/O error encountered.
async fn proxy_with_context<F, B, C>(
    frontend: &mut F,
    backend: &mut B,
    mut capture: Option<&mut C>,
    context: Option<&Context>,
    stop: Option<&StopToken>,
) -> io::Result<()>
where
    F: ProxySocket,
    B: ProxySocket,
    C: ProxySocket,
{
    use futures::{select, FutureExt};

    debug!("Starting proxy: {} ←→ {}", frontend.socket_desc(), backend.socket_desc());

    loop {
        select! {
            () = wait_terminated(context).fuse() => {
                debug!("proxy observed context termination, exiting");
                return Err(io::Error::other(monocoque_core::error::Error::Term));
            }
            () = wait_stop(stop).fuse() => {
                debug!("proxy received stop signal, exiting");
                return Ok(());
            }
            // Forward frontend → backend
            msg_result = frontend.recv_multipart().fuse() => {
                if let Some(msg) = msg_result? {
                    debug!("Proxy: {} → {}: {} frames",
                           frontend.socket_desc(),
                           backend.socket_desc(),
                           msg.len());

                    // Send copy to capture if present
                    if let Some(ref mut cap) = capture {
                        if let Err(e) = cap.send_multipart(msg.clone()).await {
                            debug!("Capture socket send failed: {}", e);
                        }
                    }

                    // Forward to backend
                    backend.send_multipart(msg).await?;
                }
            }

            // Forward backend → frontend
            msg_result = backend.recv_multipart().fuse() => {
                if let Some(msg) = msg_result? {
                    debug!("Proxy: {} → {}: {} frames",
                           backend.socket_desc(),
                           frontend.socket_desc(),
                           msg.len());

                    // Send copy to capture if present
                    if let Some(ref mut cap) = capture {
                        if let Err(e) = cap.send_multipart(msg.clone()).await {
                            debug!("Capture socket send failed: {}", e);
                        }
                    }

                    // Forward to frontend
                    frontend.send_multipart(msg).await?;
                }
            }
        }
    }
}

/// Whether a device runs on the caller's own task (blocking it until the
/// device stops) or detached as its own `compio` task.
///
/// This crate's sockets are all driven by `compio::runtime::spawn` tasks on
/// a single-threaded `io_uring` reactor rather than by OS threads (see the
/// facade doc comment on `io_thread.rs`), so `Threaded` here means "its own
/// task", not "its own OS thread".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// Run to completion on the caller's task.
    InProc,
    /// Detach as its own `compio` task and return immediately.
    Threaded,
}

/// The result of starting a device with [`DeviceMode::Threaded`]: a stop
/// handle plus the spawned task, which resolves to the device's final
/// `io::Result<()>`.
pub struct RunningDevice {
    pub stop: StopHandle,
    pub task: compio::runtime::Task<io::Result<()>>,
}

/// A ROUTER/DEALER load-balancing device.
///
/// The frontend is a multi-peer ROUTER accepting any number of clients on
/// `frontend_endpoint`. The backend is a single DEALER worker connection
/// accepted on `backend_endpoint` — this crate's `DealerSocket` is a single
/// actor-backed connection, not yet fan-out over a `PeerTable` the way
/// ROUTER/PUSH/PULL are, so a `Queue` load-balances to exactly one worker at
/// a time until that changes.
pub struct Queue {
    frontend: RouterSocket<compio::net::TcpStream>,
    frontend_listener: compio::net::TcpListener,
    backend: Option<DealerSocket>,
    backend_listener: compio::net::TcpListener,
    context: Option<Context>,
    stop_handle: StopHandle,
    stop_token: StopToken,
}

impl Queue {
    /// Bind both endpoints and return a device ready to [`Queue::run`].
    pub async fn bind(frontend_endpoint: &str, backend_endpoint: &str) -> io::Result<Self> {
        Self::bind_with_context(frontend_endpoint, backend_endpoint, None).await
    }

    /// Like [`Queue::bind`], but ties the device's run loop to `context`:
    /// when the context terminates, `run()` returns `Err` carrying
    /// [`monocoque_core::error::Error::Term`] instead of blocking forever.
    pub async fn bind_with_context(
        frontend_endpoint: &str,
        backend_endpoint: &str,
        context: Option<Context>,
    ) -> io::Result<Self> {
        let frontend_listener = compio::net::TcpListener::bind(frontend_endpoint).await?;
        let backend_listener = compio::net::TcpListener::bind(backend_endpoint).await?;
        let (stop_handle, stop_token) = stop_pair();
        Ok(Self {
            frontend: RouterSocket::bind(),
            frontend_listener,
            backend: None,
            backend_listener,
            context,
            stop_handle,
            stop_token,
        })
    }

    /// A handle that can stop this device's run loop from elsewhere.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Run until stopped, the context terminates, or a socket error occurs.
    pub async fn run(mut self) -> io::Result<()> {
        use futures::{select, FutureExt};

        debug!("Queue device running");

        loop {
            select! {
                () = wait_terminated(self.context.as_ref()).fuse() => {
                    debug!("Queue device observed context termination, exiting");
                    return Err(io::Error::other(monocoque_core::error::Error::Term));
                }
                () = wait_stop(Some(&self.stop_token)).fuse() => {
                    debug!("Queue device stopped");
                    return Ok(());
                }
                accepted = self.frontend_listener.accept().fuse() => {
                    let (stream, addr) = accepted?;
                    debug!(%addr, "Queue: new frontend client");
                    monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
                    if let Err(e) = self.frontend.accept(stream).await {
                        debug!(error = %e, "Queue: frontend handshake failed");
                    }
                }
                accepted = async {
                    if self.backend.is_none() {
                        Some(self.backend_listener.accept().await)
                    } else {
                        futures::future::pending().await
                    }
                }.fuse() => {
                    if let Some(accepted) = accepted {
                        let (stream, addr) = accepted?;
                        debug!(%addr, "Queue: backend worker connected");
                        monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
                        self.backend = Some(DealerSocket::new(stream).await);
                    }
                }
                msg = self.frontend.recv().fuse() => {
                    if let Some(msg) = msg? {
                        if let Some(backend) = self.backend.as_mut() {
                            channel_to_io_error(backend.send(msg).await)?;
                        }
                    }
                }
                msg = async {
                    match self.backend.as_mut() {
                        Some(backend) => Some(backend.recv().await),
                        None => { futures::future::pending::<()>().await; None }
                    }
                }.fuse() => {
                    if let Some(result) = msg {
                        let msg = channel_to_io_error(result)?;
                        self.frontend.send(msg).await?;
                    }
                }
            }
        }
    }

    /// Detach this device onto its own `compio` task ([`DeviceMode::Threaded`])
    /// and return a handle to stop and await it.
    pub fn spawn(self) -> RunningDevice {
        let stop = self.stop_handle();
        let task = compio::runtime::spawn(self.run());
        RunningDevice { stop, task }
    }
}

/// An XSUB/XPUB forwarding device for pub-sub brokering.
///
/// The backend XPUB owns its own listener (subscribers connect to
/// `backend_endpoint`); the frontend XSUB has no listener of its own, so the
/// device binds `frontend_endpoint` and attaches every publisher that
/// connects. Published messages flow frontend→backend; subscription frames
/// XPUB collects from subscribers flow backend→frontend so upstream
/// publishers only emit topics somebody actually wants.
pub struct Forwarder {
    frontend: XSubSocket<compio::net::TcpStream>,
    frontend_listener: compio::net::TcpListener,
    backend: XPubSocket,
    context: Option<Context>,
    stop_handle: StopHandle,
    stop_token: StopToken,
}

impl Forwarder {
    pub async fn bind(frontend_endpoint: &str, backend_endpoint: &str) -> io::Result<Self> {
        Self::bind_with_context(frontend_endpoint, backend_endpoint, None).await
    }

    pub async fn bind_with_context(
        frontend_endpoint: &str,
        backend_endpoint: &str,
        context: Option<Context>,
    ) -> io::Result<Self> {
        let frontend_listener = compio::net::TcpListener::bind(frontend_endpoint).await?;
        let backend = XPubSocket::bind(backend_endpoint).await?;
        let (stop_handle, stop_token) = stop_pair();
        Ok(Self {
            frontend: XSubSocket::new(Default::default(), Default::default()),
            frontend_listener,
            backend,
            context,
            stop_handle,
            stop_token,
        })
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    pub async fn run(mut self) -> io::Result<()> {
        use futures::{select, FutureExt};

        debug!("Forwarder device running");

        loop {
            select! {
                () = wait_terminated(self.context.as_ref()).fuse() => {
                    debug!("Forwarder device observed context termination, exiting");
                    return Err(io::Error::other(monocoque_core::error::Error::Term));
                }
                () = wait_stop(Some(&self.stop_token)).fuse() => {
                    debug!("Forwarder device stopped");
                    return Ok(());
                }
                accepted = self.frontend_listener.accept().fuse() => {
                    let (stream, addr) = accepted?;
                    debug!(%addr, "Forwarder: new publisher");
                    monocoque_core::tcp::enable_tcp_nodelay(&stream)?;
                    if let Err(e) = self.frontend.attach(stream).await {
                        debug!(error = %e, "Forwarder: publisher handshake failed");
                    }
                }
                accepted = self.backend.accept().fuse() => {
                    if let Err(e) = accepted {
                        debug!(error = %e, "Forwarder: subscriber accept failed");
                    }
                }
                // Published data: frontend (XSUB) → backend (XPUB), filtered by subscription.
                msg = self.frontend.recv().fuse() => {
                    if let Some(msg) = msg? {
                        self.backend.send(msg).await?;
                    }
                }
                // Subscriptions: backend (XPUB) → frontend (XSUB), so publishers only
                // see the topics somebody downstream actually wants.
                event = self.backend.recv_subscription().fuse() => {
                    if let Some(event) = event? {
                        self.frontend.send_subscription_event(event).await?;
                    }
                }
            }
        }
    }

    pub fn spawn(self) -> RunningDevice {
        let stop = self.stop_handle();
        let task = compio::runtime::spawn(self.run());
        RunningDevice { stop, task }
    }
}

/// A PULL/PUSH streaming (pipeline) device.
///
/// Neither PULL nor PUSH owns a listener, so the device binds both endpoints
/// itself and accepts any number of producers on `frontend_endpoint` and any
/// number of consumers on `backend_endpoint`, fair-queuing reads and
/// load-balancing writes the same way a directly-connected PULL/PUSH pair
/// would.
pub struct Streamer {
    frontend: PullSocket<compio::net::TcpStream>,
    frontend_listener: compio::net::TcpListener,
    backend: PushSocket<compio::net::TcpStream>,
    backend_listener: compio::net::TcpListener,
    context: Option<Context>,
    stop_handle: StopHandle,
    stop_token: StopToken,
}

impl Streamer {
    pub async fn bind(frontend_endpoint: &str, backend_endpoint: &str) -> io::Result<Self> {
        Self::bind_with_context(frontend_endpoint, backend_endpoint, None).await
    }

    pub async fn bind_with_context(
        frontend_endpoint: &str,
        backend_endpoint: &str,
        context: Option<Context>,
    ) -> io::Result<Self> {
        let frontend_listener = compio::net::TcpListener::bind(frontend_endpoint).await?;
        let backend_listener = compio::net::TcpListener::bind(backend_endpoint).await?;
        let (stop_handle, stop_token) = stop_pair();
        Ok(Self {
            frontend: PullSocket::bind(),
            frontend_listener,
            backend: PushSocket::bind(),
            backend_listener,
            context,
            stop_handle,
            stop_token,
        })
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    pub async fn run(mut self) -> io::Result<()> {
        use futures::{select, FutureExt};

        debug!("Streamer device running");

        loop {
            select! {
                () = wait_terminated(self.context.as_ref()).fuse() => {
                    debug!("Streamer device observed context termination, exiting");
                    return Err(io::Error::other(monocoque_core::error::Error::Term));
                }
                () = wait_stop(Some(&self.stop_token)).fuse() => {
                    debug!("Streamer device stopped");
                    return Ok(());
                }
                accepted = self.frontend_listener.accept().fuse() => {
                    let (stream, addr) = accepted?;
                    debug!(%addr, "Streamer: new producer");
                    if let Err(e) = self.frontend.accept_tcp(stream).await {
                        debug!(error = %e, "Streamer: producer handshake failed");
                    }
                }
                accepted = self.backend_listener.accept().fuse() => {
                    let (stream, addr) = accepted?;
                    debug!(%addr, "Streamer: new consumer");
                    if let Err(e) = self.backend.accept_tcp(stream).await {
                        debug!(error = %e, "Streamer: consumer handshake failed");
                    }
                }
                msg = self.frontend.recv().fuse() => {
                    if let Some(msg) = msg? {
                        self.backend.send(msg).await?;
                    }
                }
            }
        }
    }

    pub fn spawn(self) -> RunningDevice {
        let stop = self.stop_handle();
        let task = compio::runtime::spawn(self.run());
        RunningDevice { stop, task }
    }
}

// ===== ProxySocket Implementations =====

// XSUB socket (frontend in PUB-SUB broker)
#[async_trait::async_trait(?Send)]
impl ProxySocket for XSubSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.recv().await
    }

    async fn send_multipart(&mut self, _msg: Vec<Bytes>) -> io::Result<()> {
        // XSUB sends subscriptions, not data messages
        // In a proxy context, we don't forward data back to XSUB
        Ok(())
    }

    fn socket_desc(&self) -> &'static str {
        "XSUB"
    }
}

// XPUB socket (backend in PUB-SUB broker)
#[async_trait::async_trait(?Send)]
impl ProxySocket for XPubSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        // XPUB receives subscription events, not data
        // Map subscription events to message format
        if let Some(event) = self.recv_subscription().await? {
            let msg = match event {
                monocoque_core::subscription::SubscriptionEvent::Subscribe(topic) => {
                    vec![Bytes::from(&b"\x01"[..]), topic]
                }
                monocoque_core::subscription::SubscriptionEvent::Unsubscribe(topic) => {
                    vec![Bytes::from(&b"\x00"[..]), topic]
                }
            };
            Ok(Some(msg))
        } else {
            Ok(None)
        }
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.send(msg).await
    }

    fn socket_desc(&self) -> &'static str {
        "XPUB"
    }
}

fn channel_to_io_error<T, E>(result: Result<T, E>) -> io::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
}

// DEALER socket (backend in REQ-REP load balancer)
#[async_trait::async_trait(?Send)]
impl ProxySocket for DealerSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        channel_to_io_error(self.recv().await).map(Some)
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        channel_to_io_error(self.send(msg).await)
    }

    fn socket_desc(&self) -> &'static str {
        "DEALER"
    }
}

// ROUTER socket (frontend in REQ-REP load balancer)
#[async_trait::async_trait(?Send)]
impl ProxySocket for RouterSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.recv().await
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.send(msg).await
    }

    fn socket_desc(&self) -> &'static str {
        "ROUTER"
    }
}

// PULL socket (frontend in PUSH-PULL forwarder)
#[async_trait::async_trait(?Send)]
impl ProxySocket for PullSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.recv().await
    }

    async fn send_multipart(&mut self, _msg: Vec<Bytes>) -> io::Result<()> {
        // PULL doesn't send
        Ok(())
    }

    fn socket_desc(&self) -> &'static str {
        "PULL"
    }
}

// PUSH socket (backend in PUSH-PULL forwarder)
#[async_trait::async_trait(?Send)]
impl ProxySocket for PushSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        // PUSH doesn't receive
        Ok(None)
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.send(msg).await
    }

    fn socket_desc(&self) -> &'static str {
        "PUSH"
    }
}

// REQ socket
#[async_trait::async_trait(?Send)]
impl ProxySocket for ReqSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        channel_to_io_error(self.recv().await)
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        channel_to_io_error(self.send(msg).await)
    }

    fn socket_desc(&self) -> &'static str {
        "REQ"
    }
}

// REP socket
#[async_trait::async_trait(?Send)]
impl ProxySocket for RepSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        channel_to_io_error(self.recv().await)
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        channel_to_io_error(self.send(msg).await)
    }

    fn socket_desc(&self) -> &'static str {
        "REP"
    }
}

// PAIR socket
#[async_trait::async_trait(?Send)]
impl ProxySocket for PairSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.recv().await
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.send(msg).await
    }

    fn socket_desc(&self) -> &'static str {
        "PAIR"
    }
}

// PUB socket (typically not used in proxy, but included for completeness)
#[async_trait::async_trait(?Send)]
impl ProxySocket for PubSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        // PUB doesn't receive
        Ok(None)
    }

    async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
        self.send(msg).await
    }

    fn socket_desc(&self) -> &'static str {
        "PUB"
    }
}

// SUB socket (typically not used directly in proxy, XSUB is preferred)
#[async_trait::async_trait(?Send)]
impl ProxySocket for SubSocket {
    async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
        self.recv().await
    }

    async fn send_multipart(&mut self, _msg: Vec<Bytes>) -> io::Result<()> {
        // SUB doesn't send data
        Ok(())
    }

    fn socket_desc(&self) -> &'static str {
        "SUB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock socket for testing proxy logic
    struct MockSocket {
        name: &'static str,
        recv_queue: Vec<Vec<Bytes>>,
        send_queue: Vec<Vec<Bytes>>,
    }

    impl MockSocket {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                recv_queue: Vec::new(),
                send_queue: Vec::new(),
            }
        }

        fn enqueue(&mut self, msg: Vec<Bytes>) {
            self.recv_queue.push(msg);
        }
    }

    #[async_trait::async_trait(?Send)]
    impl ProxySocket for MockSocket {
        async fn recv_multipart(&mut self) -> io::Result<Option<Vec<Bytes>>> {
            Ok(self.recv_queue.pop())
        }

        async fn send_multipart(&mut self, msg: Vec<Bytes>) -> io::Result<()> {
            self.send_queue.push(msg);
            Ok(())
        }

        fn socket_desc(&self) -> &'static str {
            self.name
        }
    }

    #[test]
    fn test_mock_socket() {
        let mut sock = MockSocket::new("test");
        sock.enqueue(vec![Bytes::from("hello")]);
        assert_eq!(sock.recv_queue.len(), 1);
    }

    // TODO: Add integration tests with real sockets
    // - Test XSUB-XPUB broker pattern
    // - Test ROUTER-DEALER load balancer
    // - Test capture socket monitoring
    // - Test error handling when socket fails
}
