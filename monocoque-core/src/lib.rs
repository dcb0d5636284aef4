//! Monocoque Core
//!
//! Runtime-agnostic messaging kernel: the pieces every wire protocol and
//! every socket pattern share.
//!
//! - Pinned / io_uring-safe allocation (`alloc`)
//! - Split-pump socket actor (`actor`)
//! - Wire-agnostic frame type (`msg`) and the fluent builder (`message_builder`)
//! - Bounded, credit-flow-controlled peer pipes (`pipe`)
//! - Ownership tree and termination protocol (`own`)
//! - Cross-thread command dispatch (`mailbox`)
//! - Tickless timer poller and I/O thread pool (`poller`, `io_thread`)
//! - Process-scoped root (`context`)
//! - ROUTER hub + peer map (`router`)
//! - PUB/SUB core: subscription index + hub (`pubsub`, `subscription`)
//! - Byte-based backpressure (`backpressure`)
//! - Transport helpers: TCP/IPC/inproc (`tcp`, `ipc`, `inproc`)
//! - Error types (`error`)

#![deny(unsafe_code)]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::needless_pass_by_ref_mut)]
#![allow(clippy::match_same_arms)]

pub mod actor;
pub mod alloc;
pub mod backpressure;
pub mod buffer;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod inproc;
pub mod io_thread;
pub mod ipc;
pub mod mailbox;
pub mod message_builder;
pub mod monitor;
pub mod msg;
pub mod options;
pub mod own;
pub mod pipe;
pub mod poison;
pub mod poller;
pub mod reconnect;
pub mod router;
pub mod socket_type;
pub mod subscription;
pub mod tcp;
pub mod timeout;

pub mod pubsub {
    pub mod hub;
    pub mod index;
}

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::actor::{SocketActor, SocketEvent, UserCmd};
    pub use crate::alloc::{IoArena, SlabMut};
    pub use crate::backpressure::{BytePermits, NoOpPermits, Permit, SemaphorePermits};
    pub use crate::config::{BufferConfig, ContextOptions};
    pub use crate::context::Context;
    pub use crate::error::{Error, Result};
    pub use crate::mailbox::{Command, Mailbox, MailboxSender};
    pub use crate::msg::{LogicalMessage, Msg};
    pub use crate::own::{Linger, NodeId, Ownership};
    pub use crate::pipe::{pipepair, PipeEnd, PipeError};
    pub use crate::pubsub::hub::{PubSubCmd, PubSubEvent, PubSubHub};
    pub use crate::pubsub::index::{PeerKey, SubscriptionIndex};
    pub use crate::router::{HubEvent, PeerCmd, RouterBehavior, RouterCmd, RouterHub};
    pub use crate::socket_type::SocketType;
}
