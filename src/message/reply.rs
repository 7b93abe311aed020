//! The `<rpc-reply>` message: ok/error/data union, with the structured
//! `rpc-error` model from RFC 6241 §4.3 and the Juniper
//! `load-configuration-results` subtype.

use crate::capability::NETCONF_NAMESPACE;
use crate::error::{Error, Result};
use crate::xmldom::Xml;

/// error-type values (RFC 6241 §4.3). Unlike `ErrorTag`, these are not
/// tolerant of unknown values — the four listed here are exhaustive on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl ErrorType {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "transport" => Ok(ErrorType::Transport),
            "rpc" => Ok(ErrorType::Rpc),
            "protocol" => Ok(ErrorType::Protocol),
            "application" => Ok(ErrorType::Application),
            other => Err(Error::protocol(
                "parse rpc-error",
                format!("unrecognized error-type '{}'", other),
            )),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl ErrorSeverity {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "error" => Ok(ErrorSeverity::Error),
            "warning" => Ok(ErrorSeverity::Warning),
            other => Err(Error::protocol(
                "parse rpc-error",
                format!("unrecognized error-severity '{}'", other),
            )),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Error => "error",
            ErrorSeverity::Warning => "warning",
        }
    }
}

/// RFC 6241 §A.3 canonical error tags, tolerant of anything else: an
/// unrecognized tag surfaces as `Unknown` rather than failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
    MalformedMessage,
    Unknown(String),
}

impl ErrorTag {
    fn parse(raw: &str) -> Self {
        match raw {
            "in-use" => ErrorTag::InUse,
            "invalid-value" => ErrorTag::InvalidValue,
            "too-big" => ErrorTag::TooBig,
            "missing-attribute" => ErrorTag::MissingAttribute,
            "bad-attribute" => ErrorTag::BadAttribute,
            "unknown-attribute" => ErrorTag::UnknownAttribute,
            "missing-element" => ErrorTag::MissingElement,
            "bad-element" => ErrorTag::BadElement,
            "unknown-element" => ErrorTag::UnknownElement,
            "unknown-namespace" => ErrorTag::UnknownNamespace,
            "access-denied" => ErrorTag::AccessDenied,
            "lock-denied" => ErrorTag::LockDenied,
            "resource-denied" => ErrorTag::ResourceDenied,
            "rollback-failed" => ErrorTag::RollbackFailed,
            "data-exists" => ErrorTag::DataExists,
            "data-missing" => ErrorTag::DataMissing,
            "operation-not-supported" => ErrorTag::OperationNotSupported,
            "operation-failed" => ErrorTag::OperationFailed,
            "partial-operation" => ErrorTag::PartialOperation,
            "malformed-message" => ErrorTag::MalformedMessage,
            other => ErrorTag::Unknown(other.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::PartialOperation => "partial-operation",
            ErrorTag::MalformedMessage => "malformed-message",
            ErrorTag::Unknown(s) => s,
        }
    }
}

/// The structured children of `<error-info>`: a handful of well-known
/// fields plus the raw subtree for anything this model does not name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorInfo {
    pub bad_attribute: Option<String>,
    pub bad_element: Option<String>,
    pub session_id: Option<String>,
    pub ok_element: Option<String>,
    pub err_element: Option<String>,
    pub noop_element: Option<String>,
    pub bad_namespace: Option<String>,
    raw: String,
}

impl ErrorInfo {
    fn from_xml(node: &Xml) -> Self {
        ErrorInfo {
            bad_attribute: node.find_value(&["bad-attribute"]),
            bad_element: node.find_value(&["bad-element"]),
            session_id: node.find_value(&["session-id"]),
            ok_element: node.find_value(&["ok-element"]),
            err_element: node.find_value(&["err-element"]),
            noop_element: node.find_value(&["noop-element"]),
            bad_namespace: node.find_value(&["bad-namespace"]),
            raw: node.to_fragment_string(),
        }
    }

    /// The `<error-info>` subtree exactly as received, for fields this
    /// model does not name.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub error_type: ErrorType,
    pub error_tag: ErrorTag,
    pub error_severity: ErrorSeverity,
    pub error_path: Option<String>,
    pub error_message: Option<String>,
    pub error_message_lang: Option<String>,
    pub error_info: Option<ErrorInfo>,
}

impl RpcError {
    fn from_xml(node: Xml) -> Result<Self> {
        let error_type = node
            .find_value(&["error-type"])
            .ok_or_else(|| Error::protocol("parse rpc-error", "missing error-type"))
            .and_then(|s| ErrorType::parse(&s))?;
        let error_tag = node
            .find_value(&["error-tag"])
            .map(|s| ErrorTag::parse(&s))
            .ok_or_else(|| Error::protocol("parse rpc-error", "missing error-tag"))?;
        let error_severity = node
            .find_value(&["error-severity"])
            .ok_or_else(|| Error::protocol("parse rpc-error", "missing error-severity"))
            .and_then(|s| ErrorSeverity::parse(&s))?;
        let error_path = node.find_value(&["error-path"]);
        let error_message = node.find_value(&["error-message"]);
        let error_message_lang = node
            .find_nodes(&["error-message"])
            .into_iter()
            .next()
            .and_then(|m| m.attribute("xml:lang"));
        let error_info = node
            .find_nodes(&["error-info"])
            .into_iter()
            .next()
            .map(|n| ErrorInfo::from_xml(&n));

        Ok(RpcError {
            error_type,
            error_tag,
            error_severity,
            error_path,
            error_message,
            error_message_lang,
            error_info,
        })
    }

    fn to_xml(&self, parent: &Xml) {
        let node = parent.append("rpc-error");
        node.append_text("error-type", self.error_type.as_str());
        node.append_text("error-tag", self.error_tag.as_str());
        node.append_text("error-severity", self.error_severity.as_str());
        if let Some(path) = &self.error_path {
            node.append_text("error-path", path);
        }
        if let Some(message) = &self.error_message {
            let msg = node.append_text("error-message", message);
            if let Some(lang) = &self.error_message_lang {
                msg.set_attribute("xml:lang", lang);
            }
        }
        if let Some(info) = &self.error_info {
            let info_node = node.append("error-info");
            if let Some(v) = &info.bad_attribute {
                info_node.append_text("bad-attribute", v);
            }
            if let Some(v) = &info.bad_element {
                info_node.append_text("bad-element", v);
            }
            if let Some(v) = &info.session_id {
                info_node.append_text("session-id", v);
            }
            if let Some(v) = &info.ok_element {
                info_node.append_text("ok-element", v);
            }
            if let Some(v) = &info.err_element {
                info_node.append_text("err-element", v);
            }
            if let Some(v) = &info.noop_element {
                info_node.append_text("noop-element", v);
            }
            if let Some(v) = &info.bad_namespace {
                info_node.append_text("bad-namespace", v);
            }
        }
    }
}

/// The Juniper `load-configuration-results` subtype: an `action` attribute
/// plus an inner ok/error body, parsed and emitted losslessly alongside the
/// generic `RpcReply` carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfigurationResults {
    pub action: Option<String>,
    pub ok: bool,
    pub errors: Vec<RpcError>,
}

impl LoadConfigurationResults {
    fn from_xml(node: Xml) -> Result<Self> {
        let action = node.attribute("action");
        let ok = !node.find_nodes(&["ok"]).is_empty();
        let errors = node
            .find_nodes(&["rpc-error"])
            .into_iter()
            .map(RpcError::from_xml)
            .collect::<Result<Vec<_>>>()?;
        Ok(LoadConfigurationResults { action, ok, errors })
    }

    fn to_xml(&self, parent: &Xml) {
        let node = parent.append("load-configuration-results");
        if let Some(action) = &self.action {
            node.set_attribute("action", action);
        }
        if self.ok {
            node.append("ok");
        }
        for error in &self.errors {
            error.to_xml(&node);
        }
    }
}

/// A parsed `<rpc-reply>`: message-id, ok flag, error list, and (if
/// present) an arbitrary `<data>` subtree or the vendor
/// `load-configuration-results` subtype.
#[derive(Debug, Clone)]
pub struct RpcReply {
    message_id: Option<String>,
    ok: bool,
    errors: Vec<RpcError>,
    data: Option<Xml>,
    load_results: Option<LoadConfigurationResults>,
    raw: String,
}

impl RpcReply {
    /// Parses a reply, rejecting non-UTF-8 bytes and malformed XML.
    /// Tolerates a trailing RFC 6242 framing delimiter.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::protocol("parse rpc-reply", format!("non-utf8 input: {}", e)))?;
        Self::parse_str(text)
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        let trimmed = strip_trailing_delimiter(text);
        let xml = Xml::parse(trimmed)?;
        Self::from_xml(xml, text.to_string())
    }

    /// Builds a reply model from an already-parsed document, reusing the
    /// parse a caller may have already done for its own purposes.
    pub fn from_xml(xml: Xml, raw: String) -> Result<Self> {
        if xml.tag().as_deref() != Some("rpc-reply") {
            return Err(Error::protocol(
                "parse rpc-reply",
                format!("expected <rpc-reply>, got <{}>", xml.tag().unwrap_or_default()),
            ));
        }
        let message_id = xml.attribute("message-id");
        let ok = !xml.find_nodes(&["ok"]).is_empty();
        let errors = xml
            .find_nodes(&["rpc-error"])
            .into_iter()
            .map(RpcError::from_xml)
            .collect::<Result<Vec<_>>>()?;
        let data = xml.find_nodes(&["data"]).into_iter().next();
        let load_results = xml
            .find_nodes(&["load-configuration-results"])
            .into_iter()
            .next()
            .map(LoadConfigurationResults::from_xml)
            .transpose()?;

        Ok(RpcReply { message_id, ok, errors, data, load_results, raw })
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn errors(&self) -> &[RpcError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.error_severity == ErrorSeverity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.errors.iter().any(|e| e.error_severity == ErrorSeverity::Warning)
    }

    pub fn has_errors_or_warnings(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The `<data>` subtree, if the reply carried one, navigable with the
    /// XML DOM helper's `find_value`/`find_nodes`.
    pub fn data(&self) -> Option<&Xml> {
        self.data.as_ref()
    }

    pub fn load_configuration_results(&self) -> Option<&LoadConfigurationResults> {
        self.load_results.as_ref()
    }

    /// The reply exactly as received, for error messages and diagnostics.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Renders an equivalent `<rpc-reply>` document. Used by tests to check
    /// the parse/emit round trip; not required on the production send path,
    /// since replies are produced by the remote device, not this client.
    pub fn to_xml(&self) -> Xml {
        let root = Xml::build_named("rpc-reply");
        root.set_attribute("xmlns", NETCONF_NAMESPACE);
        if let Some(id) = &self.message_id {
            root.set_attribute("message-id", id);
        }
        if self.ok {
            root.append("ok");
        }
        for error in &self.errors {
            error.to_xml(&root);
        }
        if let Some(data) = &self.data {
            // `data` is opaque to this model: splice the fragment's raw
            // markup in directly rather than walking it node by node,
            // since the DOM helper has no wildcard child query. The
            // fragment was already parsed once by this crate, so
            // re-parsing it here cannot fail.
            root.append_raw("data", &data.to_fragment_string())
                .expect("data fragment re-serialized from a parsed document is well-formed");
        }
        if let Some(results) = &self.load_results {
            results.to_xml(&root);
        }
        root
    }
}

fn strip_trailing_delimiter(input: &str) -> &str {
    input
        .trim_end()
        .strip_suffix(crate::framing::EOM)
        .unwrap_or_else(|| input.trim_end())
}

impl PartialEq for RpcReply {
    fn eq(&self, other: &Self) -> bool {
        self.message_id == other.message_id
            && self.ok == other.ok
            && self.errors == other.errors
            && self.load_results == other.load_results
            && self.data.as_ref().map(|d| d.to_fragment_string())
                == other.data.as_ref().map(|d| d.to_fragment_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ok_reply() {
        let reply = RpcReply::parse_str(r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#).unwrap();
        assert_eq!(reply.message_id(), Some("1"));
        assert!(reply.is_ok());
        assert!(!reply.has_errors());
    }

    #[test]
    fn parses_rpc_error_fields() {
        let xml = r#"<rpc-reply message-id="2">
            <rpc-error>
                <error-type>application</error-type>
                <error-tag>lock-denied</error-tag>
                <error-severity>error</error-severity>
                <error-path>/config</error-path>
                <error-message xml:lang="en">locked by another session</error-message>
                <error-info><session-id>7</session-id></error-info>
            </rpc-error>
        </rpc-reply>"#;
        let reply = RpcReply::parse_str(xml).unwrap();
        assert!(reply.has_errors());
        assert!(!reply.is_ok());
        let error = &reply.errors()[0];
        assert_eq!(error.error_type, ErrorType::Application);
        assert_eq!(error.error_tag, ErrorTag::LockDenied);
        assert_eq!(error.error_severity, ErrorSeverity::Error);
        assert_eq!(error.error_path.as_deref(), Some("/config"));
        assert_eq!(error.error_message_lang.as_deref(), Some("en"));
        assert_eq!(
            error.error_info.as_ref().unwrap().session_id.as_deref(),
            Some("7")
        );
    }

    #[test]
    fn unknown_error_tag_is_tolerated() {
        let xml = r#"<rpc-reply>
            <rpc-error>
                <error-type>application</error-type>
                <error-tag>totally-made-up</error-tag>
                <error-severity>warning</error-severity>
            </rpc-error>
        </rpc-reply>"#;
        let reply = RpcReply::parse_str(xml).unwrap();
        assert!(reply.has_warnings());
        assert!(!reply.has_errors());
        assert_eq!(
            reply.errors()[0].error_tag,
            ErrorTag::Unknown("totally-made-up".to_string())
        );
    }

    #[test]
    fn rejects_non_utf8() {
        let bytes = vec![0xff, 0xfe, 0xfd];
        assert!(RpcReply::parse(&bytes).is_err());
    }

    #[test]
    fn tolerates_trailing_delimiter() {
        let xml = "<rpc-reply message-id=\"3\"><ok/></rpc-reply>]]>]]>";
        assert!(RpcReply::parse_str(xml).is_ok());
    }

    #[test]
    fn parses_load_configuration_results() {
        let xml = r#"<rpc-reply>
            <load-configuration-results action="merge"><ok/></load-configuration-results>
        </rpc-reply>"#;
        let reply = RpcReply::parse_str(xml).unwrap();
        let results = reply.load_configuration_results().unwrap();
        assert_eq!(results.action.as_deref(), Some("merge"));
        assert!(results.ok);
    }

    #[test]
    fn reply_round_trips_modulo_whitespace() {
        let original = RpcReply::parse_str(
            r#"<rpc-reply message-id="9"><ok/></rpc-reply>"#,
        )
        .unwrap();
        let reparsed = RpcReply::from_xml(original.to_xml(), original.to_xml().to_xml_string()).unwrap();
        assert_eq!(original, reparsed);
    }
}
