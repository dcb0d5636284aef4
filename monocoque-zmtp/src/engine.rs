//! Shared per-peer read/write loops used by every multi-peer pattern socket.
//!
//! Generalizes the accumulate-until-`!more` loop that used to be hand-rolled
//! with a bare `SmallVec` in `router.rs` (and stubbed out entirely in
//! `xsub.rs`) into one place, backed by `MultipartBuffer`'s frame/byte limits
//! so every socket gets the same DoS guard rather than each reimplementing
//! (or forgetting) it.

use bytes::Bytes;
use compio::io::{AsyncRead, AsyncWrite};
use std::io;

use crate::base::SocketBase;
use crate::multipart::{MultipartBuffer, MultipartError};

/// Default frame-count ceiling for an accumulated multipart message.
pub const DEFAULT_MAX_FRAMES: usize = 1024;
/// Default byte-size ceiling (8 MiB) for an accumulated multipart message.
pub const DEFAULT_MAX_BYTES: usize = 8 * 1024 * 1024;

fn multipart_err(e: MultipartError) -> io::Error {
    match e {
        MultipartError::TooManyFrames => {
            io::Error::new(io::ErrorKind::InvalidData, "message exceeded max frame count")
        }
        MultipartError::TooLarge => {
            io::Error::new(io::ErrorKind::InvalidData, "message exceeded max byte size")
        }
    }
}

/// Read one complete multipart message from `base`, reading more bytes off
/// the stream as needed. Returns `Ok(None)` on a clean EOF with no partial
/// message pending.
pub async fn recv_multipart<S>(base: &mut SocketBase<S>) -> io::Result<Option<Vec<Bytes>>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut acc = MultipartBuffer::new(DEFAULT_MAX_FRAMES, DEFAULT_MAX_BYTES);
    loop {
        while let Some(frame) = base
            .decoder
            .decode(&mut base.recv)
            .map_err(|e| io::Error::other(e.to_string()))?
        {
            match acc.push_frame(frame) {
                Ok(Some(msg)) => return Ok(Some(msg)),
                Ok(None) => continue,
                Err(e) => return Err(multipart_err(e)),
            }
        }
        let n = base.read_raw().await?;
        if n == 0 {
            return Ok(None);
        }
    }
}

/// Encode and write a multipart message to `base` in one I/O operation.
pub async fn send_multipart<S>(base: &mut SocketBase<S>, frames: &[Bytes]) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    base.write_buf.clear();
    crate::codec::encode_multipart(frames, &mut base.write_buf);
    base.write_from_buf().await
}

/// Bounded single poll of one peer, for sockets that rotate attention across
/// many peers from a single task rather than spawning a reader per
/// connection (the multi-peer patterns in this crate). `partial` carries
/// whatever frames were accumulated across earlier polls of this same peer
/// — a multipart message can span more polls than the `poll_timeout` window
/// allows for any single one.
///
/// Returns `Ok(Some(msg))` on a completed message, `Ok(None)` if nothing
/// completed within the window (try again / move to the next peer), and
/// `Err` only on a real I/O error. EOF is reported as `Ok(None)` with the
/// peer's `SocketBase::is_connected()` now false — callers detect that and
/// detach the peer rather than treating EOF as a transient empty poll.
pub async fn poll_recv_multipart<S>(
    base: &mut SocketBase<S>,
    partial: &mut MultipartBuffer,
    poll_timeout: std::time::Duration,
) -> io::Result<Option<Vec<Bytes>>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(frame) = base
        .decoder
        .decode(&mut base.recv)
        .map_err(|e| io::Error::other(e.to_string()))?
    {
        match partial.push_frame(frame) {
            Ok(Some(msg)) => return Ok(Some(msg)),
            Ok(None) => continue,
            Err(e) => return Err(multipart_err(e)),
        }
    }
    match compio::time::timeout(poll_timeout, base.read_raw()).await {
        Ok(Ok(0)) | Err(_) => Ok(None),
        Ok(Ok(_)) => {
            while let Some(frame) = base
                .decoder
                .decode(&mut base.recv)
                .map_err(|e| io::Error::other(e.to_string()))?
            {
                match partial.push_frame(frame) {
                    Ok(Some(msg)) => return Ok(Some(msg)),
                    Ok(None) => continue,
                    Err(e) => return Err(multipart_err(e)),
                }
            }
            Ok(None)
        }
        Ok(Err(e)) => Err(e),
    }
}

/// Default per-peer poll window used when rotating over many connections.
pub const DEFAULT_POLL_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(2);
