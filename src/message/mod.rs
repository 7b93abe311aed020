//! Typed NETCONF message models built on top of the XML DOM helper.

mod hello;
mod reply;

pub use hello::Hello;
pub use reply::{ErrorInfo, ErrorSeverity, ErrorTag, ErrorType, LoadConfigurationResults, RpcError, RpcReply};
