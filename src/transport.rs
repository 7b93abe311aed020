//! The byte-stream abstraction the session engine and device facade are
//! generic over: anything that can be read from and written to
//! asynchronously, regardless of whether it is a real SSH channel or an
//! in-memory test double.

use tokio::io::{AsyncRead, AsyncWrite};

/// A NETCONF transport: an SSH subsystem channel in production, a
/// `tokio::io::DuplexStream` half in tests.
pub trait NetconfIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> NetconfIo for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// A type-erased transport, used by the device facade once the concrete SSH
/// channel type has been hidden behind the subsystem request.
pub type BoxedIo = std::pin::Pin<Box<dyn NetconfIo>>;
