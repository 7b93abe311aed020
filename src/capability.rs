//! Capability URIs (RFC 6241 §8): strings naming a feature both peers claim
//! to support, validated as RFC 3986 URIs at construction.

use once_cell::sync::Lazy;
use url::Url;

use crate::error::{Error, Result};

pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";
pub const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// The XML namespace NETCONF elements (`<rpc>`, `<hello>`, `<rpc-reply>`)
/// are emitted in. Distinct from the `base:1.0` capability URI above.
pub const NETCONF_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// An RFC 3986 URI naming a NETCONF capability. Rejected at construction if
/// it does not parse as a URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityUri(String);

impl CapabilityUri {
    pub fn new(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        Url::parse(&uri).map_err(|e| {
            Error::Argument(format!("'{}' is not a valid capability URI: {}", uri, e))
        })?;
        Ok(CapabilityUri(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CapabilityUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CapabilityUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The client-advertised capability set used when a `DeviceConfig` does not
/// override it. Custom lists override this default entirely rather than
/// extending it.
pub static DEFAULT_CAPABILITIES: Lazy<Vec<CapabilityUri>> = Lazy::new(|| {
    [
        BASE_1_0,
        "urn:ietf:params:netconf:capability:candidate:1.0",
        "urn:ietf:params:netconf:capability:confirmed-commit:1.0",
        "urn:ietf:params:netconf:capability:validate:1.0",
        "urn:ietf:params:netconf:capability:url:1.0?protocol=http,ftp,file",
    ]
    .iter()
    .map(|s| CapabilityUri::new(*s).expect("default capability URIs are well-formed"))
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capabilities_parse() {
        assert_eq!(DEFAULT_CAPABILITIES.len(), 5);
    }

    #[test]
    fn rejects_unparseable_uri() {
        assert!(CapabilityUri::new("not a uri").is_err());
    }

    #[test]
    fn accepts_urn_form() {
        assert!(CapabilityUri::new(BASE_1_0).is_ok());
    }
}
