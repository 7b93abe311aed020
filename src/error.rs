use std::time::Duration;

use thiserror::Error;

/// Upper bound on how much of a raw RPC reply is attached to an error for
/// diagnosis. Replies from real devices can run to tens of kilobytes.
const REPLY_TRUNCATE_BYTES: usize = 4096;

pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy from the protocol and transport layers.
///
/// `Configuration`, `Argument` and `NotConnected` are caller bugs and never
/// leave a session in a worse state than it was in. `Transport` and
/// `Timeout` invalidate the session (it is marked `Failed`). `Protocol`,
/// `Load` and `Commit` are per-RPC outcomes; the session remains usable
/// after them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not connected: {0}")]
    NotConnected(String),

    #[error("transport error during {operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("timed out waiting for reply to {operation} after {elapsed:?}")]
    Timeout { operation: String, elapsed: Duration },

    #[error("protocol error during {operation}: {message}")]
    Protocol { operation: String, message: String },

    #[error("load operation '{operation}' failed: {reply}")]
    Load { operation: String, reply: String },

    #[error("commit operation '{operation}' failed: {reply}")]
    Commit { operation: String, reply: String },

    #[error("invalid argument: {0}")]
    Argument(String),
}

impl Error {
    pub fn transport(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            elapsed,
        }
    }

    pub fn protocol(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Protocol {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn load(operation: impl Into<String>, reply: &str) -> Self {
        Error::Load {
            operation: operation.into(),
            reply: truncate_reply(reply),
        }
    }

    pub fn commit(operation: impl Into<String>, reply: &str) -> Self {
        Error::Commit {
            operation: operation.into(),
            reply: truncate_reply(reply),
        }
    }

    pub fn not_connected(operation: impl Into<String>) -> Self {
        Error::NotConnected(operation.into())
    }

    /// True for errors that invalidate the session (transport loss, timeout).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Timeout { .. })
    }
}

pub(crate) fn truncate_reply(reply: &str) -> String {
    if reply.len() <= REPLY_TRUNCATE_BYTES {
        reply.to_string()
    } else {
        let mut end = REPLY_TRUNCATE_BYTES;
        while !reply.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}… ({} bytes total)", &reply[..end], reply.len())
    }
}
