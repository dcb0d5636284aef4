//! The wire-level message frame (`Msg`).
//!
//! This is the low-level counterpart to [`crate::message_builder::Message`]:
//! a single frame with ZMTP flag bits, not a multipart convenience builder.
//! A logical message is a sequence of `Msg` frames ending in one with
//! [`Msg::MORE`] clear.
//!
//! Large payloads are backed by [`bytes::Bytes`], which is already
//! atomically refcounted internally; cloning a `Msg` over such a payload is
//! a refcount bump, never a copy of the bytes.

use bytes::Bytes;

/// More frames follow in the same logical message.
pub const MORE: u8 = 0x01;
/// First frame of a logical message carries a routing identity (ROUTER).
pub const IDENTITY: u8 = 0x02;
/// Frame is a protocol control frame (subscribe/cancel/ping), not user data.
pub const COMMAND: u8 = 0x04;

/// Inline payloads up to this many bytes avoid a heap allocation in
/// `bytes::Bytes` (its own small-vec inlining already covers this in
/// practice; the constant documents the boundary used in sizing decisions
/// elsewhere in this crate, e.g. `BufferConfig`).
pub const MAX_INLINE: usize = 29;

/// A single ZMTP wire frame: payload plus flag bits.
///
/// Once `close`d a `Msg` is inert; `data()`/`size()` on a closed message is a
/// logic error in the same sense as using a moved-from value, but since
/// `close` simply drops the backing `Bytes` there is nothing to free
/// explicitly — `Msg` has no `Drop` impl beyond the derived one.
#[derive(Debug, Clone, Default)]
pub struct Msg {
    payload: Bytes,
    flags: u8,
    /// `Some` marks this frame as the logical-message delimiter used by the
    /// pipe termination handshake; carries no payload.
    delimiter: bool,
}

impl Msg {
    /// An empty, non-delimiter message with no flags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            payload: Bytes::new(),
            flags: 0,
            delimiter: false,
        }
    }

    /// Allocate an uninitialized-content message of `size` bytes.
    ///
    /// Mirrors libzmq's `zmq_msg_init_size`; here it simply zero-fills,
    /// since Rust has no uninitialized-`Bytes` escape hatch worth the unsafe.
    #[must_use]
    pub fn init(size: usize) -> Self {
        Self {
            payload: Bytes::from(vec![0u8; size]),
            flags: 0,
            delimiter: false,
        }
    }

    /// Wrap an existing buffer. `copy` forces an owned copy; otherwise the
    /// buffer is adopted by reference (refcounted, zero-copy).
    #[must_use]
    pub fn init_buffer(bytes: Bytes, copy: bool) -> Self {
        let payload = if copy {
            Bytes::copy_from_slice(&bytes)
        } else {
            bytes
        };
        Self {
            payload,
            flags: 0,
            delimiter: false,
        }
    }

    /// The empty delimiter frame used by REQ/REP envelope framing and by
    /// the pipe termination handshake.
    #[must_use]
    pub const fn init_delimiter() -> Self {
        Self {
            payload: Bytes::new(),
            flags: 0,
            delimiter: true,
        }
    }

    /// Shallow copy: bumps the `Bytes` refcount, never copies bytes.
    /// A copy of the delimiter is the delimiter.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Transfer ownership, leaving `self` as an empty message — mirrors
    /// `zmq_msg_move`, where the source is reset to a fresh, empty message.
    pub fn move_msg(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Drop the payload. No-op beyond resetting to empty; kept for symmetry
    /// with the init/close lifecycle described in the data model.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub const fn is_delimiter(&self) -> bool {
        self.delimiter
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.payload
    }

    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.flags & MORE != 0
    }

    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.flags & IDENTITY != 0
    }

    #[must_use]
    pub const fn is_command(&self) -> bool {
        self.flags & COMMAND != 0
    }

    /// Set or clear the MORE flag. Setting MORE on what the caller intends
    /// as the last frame of a logical message is a user error the pattern
    /// state machines must guard against — this setter itself performs no
    /// such validation, matching libzmq's `zmq_msg_set` semantics.
    pub fn set_more(&mut self, more: bool) -> &mut Self {
        self.set_flag(MORE, more)
    }

    pub fn set_identity(&mut self, identity: bool) -> &mut Self {
        self.set_flag(IDENTITY, identity)
    }

    pub fn set_command(&mut self, command: bool) -> &mut Self {
        self.set_flag(COMMAND, command)
    }

    fn set_flag(&mut self, bit: u8, on: bool) -> &mut Self {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
        self
    }

    #[must_use]
    pub fn from_bytes(bytes: Bytes, more: bool) -> Self {
        let mut msg = Self::init_buffer(bytes, false);
        msg.set_more(more);
        msg
    }
}

impl From<Bytes> for Msg {
    fn from(bytes: Bytes) -> Self {
        Self::init_buffer(bytes, false)
    }
}

impl From<Vec<u8>> for Msg {
    fn from(bytes: Vec<u8>) -> Self {
        Self::init_buffer(Bytes::from(bytes), false)
    }
}

/// A logical message: a non-empty run of frames, MORE clear only on the last.
#[derive(Debug, Clone, Default)]
pub struct LogicalMessage(Vec<Msg>);

impl LogicalMessage {
    #[must_use]
    pub fn from_frames(mut frames: Vec<Msg>) -> Self {
        if let Some(last) = frames.last_mut() {
            last.set_more(false);
        }
        for f in &mut frames[..frames.len().saturating_sub(1)] {
            f.set_more(true);
        }
        Self(frames)
    }

    #[must_use]
    pub fn into_frames(self) -> Vec<Msg> {
        self.0
    }

    #[must_use]
    pub fn frames(&self) -> &[Msg] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_buffer_no_copy_shares_refcount() {
        let bytes = Bytes::from_static(b"hello");
        let msg = Msg::init_buffer(bytes.clone(), false);
        let copy = msg.copy();
        assert_eq!(copy.data(), b"hello");
        // bytes::Bytes clone is a refcount bump; both point at same storage.
        assert_eq!(bytes.as_ptr(), copy.data().as_ptr());
    }

    #[test]
    fn move_msg_empties_source() {
        let mut msg = Msg::from(Bytes::from_static(b"x"));
        let moved = msg.move_msg();
        assert_eq!(moved.data(), b"x");
        assert!(msg.is_empty());
        assert_eq!(msg.flags(), 0);
    }

    #[test]
    fn delimiter_copy_is_delimiter() {
        let d = Msg::init_delimiter();
        assert!(d.copy().is_delimiter());
        assert!(d.is_empty());
    }

    #[test]
    fn logical_message_clears_more_on_last_frame_only() {
        let frames = vec![Msg::from(Bytes::from_static(b"a")), Msg::from(Bytes::from_static(b"b"))];
        let logical = LogicalMessage::from_frames(frames);
        assert!(logical.frames()[0].has_more());
        assert!(!logical.frames()[1].has_more());
    }

    #[test]
    fn flag_accessors_round_trip() {
        let mut msg = Msg::new();
        msg.set_more(true).set_identity(true);
        assert!(msg.has_more());
        assert!(msg.is_identity());
        assert!(!msg.is_command());
        msg.set_more(false);
        assert!(!msg.has_more());
    }
}
