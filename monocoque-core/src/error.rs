//! Error types shared across the kernel.
//!
//! The variant set mirrors libzmq's error taxonomy (`EAGAIN`, `EFSM`,
//! `EHOSTUNREACH`, `ETERM`, ...) rather than inventing a parallel one, since
//! callers porting libzmq-shaped code expect to match on these.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Monocoque operations.
#[derive(Error, Debug)]
pub enum Error {
    /// `EAGAIN`: operation would block a non-blocking call (HWM reached on
    /// send, nothing available on recv).
    #[error("resource temporarily unavailable")]
    Again,

    /// `EFSM`: operation not valid in the socket's current state (e.g.
    /// REP calling `send` before a `recv`).
    #[error("operation not valid in current socket state")]
    Fsm,

    /// `EHOSTUNREACH`: `ROUTER_MANDATORY` send to an identity with no
    /// connected peer.
    #[error("no peer registered for routing id")]
    HostUnreachable,

    /// `ETERM`: the owning context is terminating or has terminated.
    #[error("context terminated")]
    Term,

    /// `EINVAL`: invalid argument (option value out of range, malformed
    /// endpoint string).
    #[error("invalid argument: {0}")]
    Invalid(String),

    /// `EADDRINUSE`: bind to an endpoint already bound.
    #[error("address in use: {0}")]
    AddrInUse(String),

    /// `EADDRNOTAVAIL`: connect/bind to an address that cannot be resolved
    /// or assigned.
    #[error("address not available: {0}")]
    AddrNotAvail(String),

    /// `ENOTSUP`: operation not supported by this socket type.
    #[error("not supported by this socket type")]
    NotSupported,

    /// `EMTHREAD`: context's I/O thread pool is exhausted.
    #[error("too many I/O threads requested")]
    TooManyThreads,

    /// IO error during socket operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Protocol error during ZMTP handshake or framing.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Handshake timeout.
    #[error("handshake timeout after {0:?}")]
    HandshakeTimeout(Duration),

    /// Invalid greeting received.
    #[error("invalid greeting: {0}")]
    InvalidGreeting(String),

    /// Invalid frame format.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Socket closed.
    #[error("socket closed")]
    SocketClosed,

    /// Channel send error.
    #[error("channel send error")]
    ChannelSend,

    /// Channel receive error.
    #[error("channel receive error")]
    ChannelRecv,

    /// Peer disconnected.
    #[error("peer disconnected: {0}")]
    PeerDisconnected(String),

    /// Invalid routing id.
    #[error("invalid routing id")]
    InvalidRoutingId,

    /// Message too large.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Subscription error.
    #[error("subscription error: {0}")]
    Subscription(String),
}

/// Result type alias for Monocoque operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    #[must_use]
    pub fn invalid_greeting(msg: impl Into<String>) -> Self {
        Self::InvalidGreeting(msg.into())
    }

    #[must_use]
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }

    #[must_use]
    pub fn peer_disconnected(peer_id: impl Into<String>) -> Self {
        Self::PeerDisconnected(peer_id.into())
    }

    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Whether the caller should retry rather than treat this as fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Again => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::SocketClosed | Self::PeerDisconnected(_) | Self::HandshakeTimeout(_)
        )
    }
}
