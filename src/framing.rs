//! RFC 6242 §4.1 end-of-message framing over an arbitrary async byte stream.
//!
//! Only base:1.0 framing is implemented; chunked framing (RFC 6242 §4.2,
//! base:1.1) is a stated Non-goal.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

use crate::error::{Error, Result};

/// The RFC 6242 §4.1 end-of-message delimiter.
pub const EOM: &str = "]]>]]>";

const INITIAL_BUFFER: usize = 8 * 1024;

/// Appends the framing delimiter to `payload` and flushes it to `out`.
///
/// `payload` must already be complete, well-formed XML; this function does
/// not escape or validate it.
pub async fn write_message<W>(out: &mut W, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut framed = Vec::with_capacity(payload.len() + EOM.len());
    framed.extend_from_slice(payload.as_bytes());
    framed.extend_from_slice(EOM.as_bytes());
    out.write_all(&framed)
        .await
        .map_err(|e| Error::transport("write netconf message", e))?;
    out.flush()
        .await
        .map_err(|e| Error::transport("flush netconf message", e))?;
    Ok(())
}

/// Reads from `input` until the framing delimiter appears or `deadline`
/// elapses, returning the bytes preceding the delimiter with the delimiter
/// itself stripped.
///
/// The read loop polls cooperatively: when no bytes are immediately
/// available it yields for roughly a tenth of the remaining deadline before
/// re-checking, rather than busy-looping on the stream.
pub async fn read_message<R>(input: &mut R, deadline: Instant) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(INITIAL_BUFFER);
    let mut chunk = [0u8; INITIAL_BUFFER];

    loop {
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::timeout("read netconf message", Duration::ZERO));
        }
        let remaining = deadline - now;

        match tokio::time::timeout(remaining, input.read(&mut chunk)).await {
            Ok(Ok(0)) => {
                return Err(Error::transport(
                    "read netconf message",
                    anyhow::anyhow!("stream closed before a delimiter was seen"),
                ));
            }
            Ok(Ok(n)) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_delimiter(&buf) {
                    buf.truncate(pos);
                    return Ok(buf);
                }
                // No delimiter yet: give the stream a moment before polling
                // again instead of spinning on it.
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::timeout("read netconf message", Duration::ZERO));
                }
                let remaining = deadline - now;
                tokio::time::sleep(remaining / 10).await;
            }
            Ok(Err(e)) => return Err(Error::transport("read netconf message", e)),
            Err(_) => {
                return Err(Error::timeout(
                    "read netconf message",
                    deadline.saturating_duration_since(now),
                ))
            }
        }
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    let needle = EOM.as_bytes();
    if buf.len() < needle.len() {
        return None;
    }
    buf.windows(needle.len()).position(|w| w == needle)
}
