//! Buffer sizing configuration, shared by every ZMTP socket and the
//! reassembly decoder.
//!
//! This lives in `monocoque-core` (not the protocol crate) because the
//! decoder's staging buffer and every pattern socket's read/write buffers
//! all need it; a prior layout had this defined only in `monocoque-zmtp`
//! while being imported as `monocoque_core::config` throughout, which this
//! placement resolves properly rather than papering over with a re-export.

/// Default read buffer size (8KB).
pub const DEFAULT_READ_BUF_SIZE: usize = 8192;
/// Default write buffer size (8KB).
pub const DEFAULT_WRITE_BUF_SIZE: usize = 8192;
/// Small read buffer size (4KB), tuned for REQ/REP ping-pong traffic.
pub const SMALL_READ_BUF_SIZE: usize = 4096;
/// Small write buffer size (4KB).
pub const SMALL_WRITE_BUF_SIZE: usize = 4096;
/// Large read buffer size (16KB), tuned for DEALER/ROUTER bulk traffic.
pub const LARGE_READ_BUF_SIZE: usize = 16384;
/// Large write buffer size (16KB).
pub const LARGE_WRITE_BUF_SIZE: usize = 16384;
/// Initial staging buffer capacity for decoder reassembly of a
/// frame split across reads.
pub const STAGING_BUF_INITIAL_CAP: usize = 256;

/// Per-socket buffer sizing.
#[derive(Debug, Clone, Copy)]
pub struct BufferConfig {
    pub read_buf_size: usize,
    pub write_buf_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_buf_size: DEFAULT_READ_BUF_SIZE,
            write_buf_size: DEFAULT_WRITE_BUF_SIZE,
        }
    }
}

impl BufferConfig {
    /// Tuned for small messages (< 1KB), e.g. REQ/REP.
    #[must_use]
    pub const fn small() -> Self {
        Self {
            read_buf_size: SMALL_READ_BUF_SIZE,
            write_buf_size: SMALL_WRITE_BUF_SIZE,
        }
    }

    /// Tuned for larger messages (8-16KB), e.g. DEALER/ROUTER.
    #[must_use]
    pub const fn large() -> Self {
        Self {
            read_buf_size: LARGE_READ_BUF_SIZE,
            write_buf_size: LARGE_WRITE_BUF_SIZE,
        }
    }

    #[must_use]
    pub const fn custom(read_buf_size: usize, write_buf_size: usize) -> Self {
        Self {
            read_buf_size,
            write_buf_size,
        }
    }
}

/// Process-scoped `Context` options (`ZMQ_IO_THREADS`, `ZMQ_MAX_SOCKETS`).
#[derive(Debug, Clone, Copy)]
pub struct ContextOptions {
    /// Size of the I/O thread pool. Default 1, matching libzmq.
    pub io_threads: usize,
    /// Upper bound on live sockets tracked by a `Context`.
    pub max_sockets: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            io_threads: 1,
            max_sockets: 1024,
        }
    }
}
