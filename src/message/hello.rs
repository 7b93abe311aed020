//! The `<hello>` message: the first message of a NETCONF session,
//! advertising each peer's capability set.

use crate::capability::{CapabilityUri, BASE_1_1};
use crate::error::{Error, Result};
use crate::xmldom::Xml;

/// A parsed or to-be-emitted `<hello>`. The client always builds one with
/// no session-id; the server's hello carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    capabilities: Vec<CapabilityUri>,
    session_id: Option<String>,
}

impl Hello {
    /// Builds a client hello. An empty capability list is rejected at the
    /// call site that constructs one from a `DeviceConfig` (the builder
    /// defaults to the crate's standard set); this constructor injects
    /// base:1.1 if handed an empty list directly so a hello is never sent
    /// empty.
    pub fn new(capabilities: Vec<CapabilityUri>) -> Self {
        let capabilities = if capabilities.is_empty() {
            vec![CapabilityUri::new(BASE_1_1).expect("base:1.1 URI is well-formed")]
        } else {
            capabilities
        };
        Hello { capabilities, session_id: None }
    }

    pub fn capabilities(&self) -> &[CapabilityUri] {
        &self.capabilities
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Parses a `<hello>` document. Accepts both default-namespace and
    /// prefixed-namespace forms since the underlying DOM walk ignores
    /// namespace prefixes; rejects DOCTYPE declarations and malformed XML.
    pub fn parse(input: &str) -> Result<Self> {
        let input = strip_trailing_delimiter(input);
        let xml = Xml::parse(input)?;
        if xml.tag().as_deref() != Some("hello") {
            return Err(Error::protocol(
                "parse hello",
                format!("expected <hello>, got <{}>", xml.tag().unwrap_or_default()),
            ));
        }

        let mut capabilities = Vec::new();
        for node in xml.find_nodes(&["capabilities"]) {
            for cap in node.find_nodes(&["capability"]) {
                if let Some(text) = cap.find_value(&[]) {
                    capabilities.push(CapabilityUri::new(text)?);
                }
            }
        }
        let session_id = xml.find_value(&["session-id"]);

        Ok(Hello { capabilities, session_id })
    }

    /// Renders this hello to a well-formed `<hello>` carrying the NETCONF
    /// base:1.0 namespace, capabilities in insertion order.
    pub fn to_xml(&self) -> Xml {
        let root = Xml::build_named("hello");
        root.set_attribute("xmlns", crate::capability::NETCONF_NAMESPACE);
        let caps = root.append("capabilities");
        for cap in &self.capabilities {
            caps.append_text("capability", cap.as_str());
        }
        if let Some(id) = &self.session_id {
            root.append_text("session-id", id);
        }
        root
    }

    pub fn to_xml_string(&self) -> String {
        self.to_xml().to_xml_string()
    }
}

fn strip_trailing_delimiter(input: &str) -> &str {
    input
        .trim_end()
        .strip_suffix(crate::framing::EOM)
        .unwrap_or_else(|| input.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_hello_never_empty() {
        let hello = Hello::new(Vec::new());
        assert_eq!(hello.capabilities().len(), 1);
        assert_eq!(hello.capabilities()[0].as_str(), BASE_1_1);
    }

    #[test]
    fn round_trips_through_xml() {
        let cap = CapabilityUri::new(crate::capability::BASE_1_0).unwrap();
        let hello = Hello::new(vec![cap.clone()]);
        let xml = hello.to_xml_string();
        let parsed = Hello::parse(&xml).unwrap();
        assert_eq!(parsed.capabilities(), &[cap]);
    }

    #[test]
    fn parses_prefixed_namespace_form() {
        let doc = r#"<nc:hello xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
            <nc:capabilities><nc:capability>urn:ietf:params:netconf:base:1.0</nc:capability></nc:capabilities>
            <nc:session-id>42</nc:session-id>
        </nc:hello>"#;
        let hello = Hello::parse(doc).unwrap();
        assert_eq!(hello.session_id(), Some("42"));
        assert_eq!(hello.capabilities().len(), 1);
    }

    #[test]
    fn tolerates_trailing_delimiter() {
        let doc = "<hello><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>]]>]]>";
        assert!(Hello::parse(doc).is_ok());
    }

    #[test]
    fn rejects_doctype() {
        let doc = "<!DOCTYPE hello><hello><capabilities/></hello>";
        assert!(Hello::parse(doc).is_err());
    }
}
