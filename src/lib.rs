//! A NETCONF (RFC 6241) client over an SSH `netconf` subsystem channel
//! (RFC 6242 §4.1 end-of-message framing only; base:1.1 chunked framing is
//! not implemented).
//!
//! The crate is organized as five components: [`framing`] (wire framing),
//! [`xmldom`] (a fluent, arena-backed XML DOM), [`message`] (the `<hello>`
//! and `<rpc-reply>` models), [`session`] (the RPC engine), and [`device`]
//! (the connection-lifecycle facade most applications use directly).

pub mod capability;
pub mod config;
pub mod device;
pub mod error;
pub mod framing;
pub mod message;
pub mod session;
pub mod transport;
pub mod xmldom;

pub use capability::CapabilityUri;
pub use device::{DeviceConfig, DeviceConfigBuilder, HostKeyPolicy, NetconfClient};
pub use error::{Error, Result};
pub use message::{Hello, RpcError, RpcReply};
pub use session::{Datastore, LoadType, NetconfSession, SessionState};
pub use xmldom::Xml;
