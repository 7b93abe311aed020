//! The Session Engine (C4): owns an attached subsystem channel, performs
//! capability exchange, and serializes RPC calls one at a time.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader, Lines};
use tokio::time::Instant;
use tracing::{debug, debug_span, warn};

use crate::capability::{CapabilityUri, NETCONF_NAMESPACE};
use crate::error::{Error, Result};
use crate::framing;
use crate::message::{Hello, RpcReply};
use crate::transport::NetconfIo;
use crate::xmldom::Xml;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";
const SYNTAX_ERROR_SIGNAL: &str = "netconf error: syntax error";

/// The session lifecycle. All RPC operations require `Ready`; `Closed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    HelloPending,
    Ready,
    Closed,
    Failed,
}

/// A datastore accepted by `getData`, parsed case-insensitively and emitted
/// in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datastore {
    Running,
    Candidate,
    Startup,
    Intended,
    Operational,
}

impl FromStr for Datastore {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "running" => Ok(Datastore::Running),
            "candidate" => Ok(Datastore::Candidate),
            "startup" => Ok(Datastore::Startup),
            "intended" => Ok(Datastore::Intended),
            "operational" => Ok(Datastore::Operational),
            other => Err(Error::Argument(format!("unknown datastore '{}'", other))),
        }
    }
}

impl std::fmt::Display for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
            Datastore::Startup => "startup",
            Datastore::Intended => "intended",
            Datastore::Operational => "operational",
        })
    }
}

/// `edit-config`'s `default-operation`, restricted to the two values this
/// client supports; a caller holding one of these cannot trigger the
/// argument-validation error path that a bare string could.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    Merge,
    Replace,
}

impl FromStr for LoadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(LoadType::Merge),
            "replace" => Ok(LoadType::Replace),
            other => Err(Error::Argument(format!(
                "load type must be 'merge' or 'replace', got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LoadType::Merge => "merge",
            LoadType::Replace => "replace",
        })
    }
}

/// Owns the attached subsystem channel `S` and the per-session RPC
/// envelope state. Single-session, single-outstanding-RPC: there is no
/// request pipelining.
pub struct NetconfSession<S: NetconfIo> {
    stream: S,
    state: SessionState,
    next_message_id: u64,
    connection_timeout: Duration,
    command_timeout: Duration,
    server_hello: Option<Hello>,
    last_rpc_reply: Option<RpcReply>,
    rpc_attributes: Vec<(String, String)>,
}

impl<S: NetconfIo> NetconfSession<S> {
    /// Performs the hello exchange over an already-attached subsystem
    /// channel and returns a session in state `Ready`.
    pub async fn connect(
        stream: S,
        connection_timeout: Duration,
        command_timeout: Duration,
        capabilities: Vec<CapabilityUri>,
    ) -> Result<Self> {
        let mut session = NetconfSession {
            stream,
            state: SessionState::Connecting,
            next_message_id: 1,
            connection_timeout,
            command_timeout,
            server_hello: None,
            last_rpc_reply: None,
            rpc_attributes: Vec::new(),
        };
        session.state = SessionState::HelloPending;
        session.exchange_hello(capabilities).await?;
        session.state = SessionState::Ready;
        Ok(session)
    }

    async fn exchange_hello(&mut self, capabilities: Vec<CapabilityUri>) -> Result<()> {
        let hello = Hello::new(capabilities);
        let deadline = Instant::now() + self.connection_timeout;
        framing::write_message(&mut self.stream, &hello.to_xml_string()).await?;
        let bytes = framing::read_message(&mut self.stream, deadline).await?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::protocol("exchange hello", format!("non-utf8 server hello: {}", e)))?;
        debug!(target: "session::hello", "received server hello");
        self.server_hello = Some(Hello::parse(&text)?);
        Ok(())
    }

    fn require_ready(&self, operation: &str) -> Result<()> {
        if self.state == SessionState::Ready {
            Ok(())
        } else {
            Err(Error::not_connected(operation))
        }
    }

    /// Normalizes a caller-supplied RPC payload into a complete, framed
    /// wire message: trims, wraps bare operation names or loose XML into an
    /// `<rpc>` element, injects the base:1.0 namespace, a fresh
    /// `message-id`, and any caller-set attributes, prepends an XML
    /// declaration when absent, and appends the framing delimiter.
    fn fixup_rpc(&mut self, payload: &str) -> Result<String> {
        let trimmed_full = payload.trim();
        if trimmed_full.is_empty() {
            return Err(Error::Argument("rpc payload must not be empty".into()));
        }

        let (decl, trimmed) = strip_xml_declaration(trimmed_full);

        let body = if is_rpc_element(trimmed) {
            normalize_self_closing_rpc(trimmed)
        } else if trimmed.starts_with('<') {
            format!("<rpc>{}</rpc>", trimmed)
        } else {
            format!("<rpc><{0}/></rpc>", trimmed)
        };

        let message_id = self.next_message_id;
        self.next_message_id += 1;
        let with_attrs = rewrite_rpc_open_tag(&body, message_id, &self.rpc_attributes)?;

        let mut out = String::with_capacity(with_attrs.len() + 64);
        out.push_str(decl.unwrap_or(XML_DECLARATION));
        out.push_str(&with_attrs);
        out.push_str(framing::EOM);
        Ok(out)
    }

    async fn send_and_parse(&mut self, operation: &str, payload: &str) -> Result<(Xml, RpcReply)> {
        self.require_ready(operation)?;
        let normalized = self.fixup_rpc(payload)?;
        let span = debug_span!("session::rpc", operation, message_id = self.next_message_id - 1);
        let _enter = span.enter();

        if let Err(e) = write_already_framed(&mut self.stream, normalized.as_bytes()).await {
            self.state = SessionState::Failed;
            return Err(e);
        }

        let deadline = Instant::now() + self.command_timeout;
        let bytes = match framing::read_message(&mut self.stream, deadline).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.is_fatal() {
                    warn!(target: "session::rpc", "session failed: {}", e);
                    self.state = SessionState::Failed;
                }
                return Err(e);
            }
        };

        let raw = String::from_utf8(bytes)
            .map_err(|e| Error::protocol(operation, format!("non-utf8 reply: {}", e)))?;
        if raw.contains(SYNTAX_ERROR_SIGNAL) {
            return Err(Error::protocol(operation, "device reported a syntax error"));
        }

        let xml = Xml::parse(&raw)?;
        let reply = RpcReply::from_xml(xml.clone(), raw)?;
        debug!(target: "session::rpc", ok = reply.is_ok(), has_errors = reply.has_errors(), "rpc reply classified");
        self.last_rpc_reply = Some(reply.clone());
        Ok((xml, reply))
    }

    async fn execute_boolean(&mut self, operation: &str, payload: &str) -> Result<bool> {
        let (_xml, reply) = self.send_and_parse(operation, payload).await?;
        Ok(!reply.has_errors() && reply.is_ok())
    }

    async fn execute_load(&mut self, operation: &str, payload: &str) -> Result<()> {
        let (_xml, reply) = self.send_and_parse(operation, payload).await?;
        if reply.has_errors() || !reply.is_ok() {
            return Err(Error::load(operation, reply.raw()));
        }
        Ok(())
    }

    async fn execute_commit(&mut self, operation: &str, payload: &str) -> Result<()> {
        let (_xml, reply) = self.send_and_parse(operation, payload).await?;
        if reply.has_errors() || !reply.is_ok() {
            return Err(Error::commit(operation, reply.raw()));
        }
        Ok(())
    }

    /// Sends an already-built or raw RPC payload and returns the parsed
    /// reply document.
    pub async fn execute_rpc(&mut self, payload: &str) -> Result<Xml> {
        let (xml, _reply) = self.send_and_parse("execute rpc", payload).await?;
        Ok(xml)
    }

    /// Sends an RPC and returns a line-oriented reader over the raw
    /// subsystem output instead of waiting for and parsing a complete
    /// reply. Timeout enforcement and finding the framing delimiter in the
    /// stream are the caller's responsibility on this path.
    pub async fn execute_rpc_streaming(
        &mut self,
        payload: &str,
    ) -> Result<Lines<BufReader<&mut S>>> {
        self.require_ready("execute rpc (streaming)")?;
        let normalized = self.fixup_rpc(payload)?;
        write_already_framed(&mut self.stream, normalized.as_bytes()).await?;
        Ok(BufReader::new(&mut self.stream).lines())
    }

    pub async fn lock_config(&mut self) -> Result<bool> {
        self.execute_boolean("lock", "<lock><target><candidate/></target></lock>").await
    }

    pub async fn unlock_config(&mut self) -> Result<bool> {
        self.execute_boolean("unlock", "<unlock><target><candidate/></target></unlock>").await
    }

    pub async fn load_xml_configuration(&mut self, config: &str, load_type: LoadType) -> Result<()> {
        let root = Xml::build_named("edit-config");
        root.add_path("target").append("candidate");
        root.append_text("default-operation", &load_type.to_string());
        let config_node = root.append("config");
        config_node.append_raw("configuration", config)?;
        self.execute_load("edit-config", &root.to_fragment_string()).await
    }

    pub async fn load_xml_configuration_str(&mut self, config: &str, load_type: &str) -> Result<()> {
        self.load_xml_configuration(config, load_type.parse()?).await
    }

    pub async fn load_text_configuration(&mut self, config: &str, load_type: LoadType) -> Result<()> {
        let root = Xml::build_named("edit-config");
        root.add_path("target").append("candidate");
        root.append_text("default-operation", &load_type.to_string());
        let config_node = root.append("config");
        config_node.append_text("configuration-text", config);
        self.execute_load("edit-config", &root.to_fragment_string()).await
    }

    pub async fn load_text_configuration_str(&mut self, config: &str, load_type: &str) -> Result<()> {
        self.load_text_configuration(config, load_type.parse()?).await
    }

    pub async fn load_set_configuration(&mut self, config: &str) -> Result<()> {
        let root = Xml::build_named("load-configuration");
        root.set_attribute("action", "set");
        root.append_text("configuration-set", config);
        self.execute_load("load-configuration(set)", &root.to_fragment_string()).await
    }

    pub async fn load_xml_file(&mut self, path: &Path, load_type: LoadType) -> Result<()> {
        let content = read_config_file(path).await?;
        self.load_xml_configuration(&content, load_type).await
    }

    pub async fn load_text_file(&mut self, path: &Path, load_type: LoadType) -> Result<()> {
        let content = read_config_file(path).await?;
        self.load_text_configuration(&content, load_type).await
    }

    pub async fn load_set_file(&mut self, path: &Path) -> Result<()> {
        let content = read_config_file(path).await?;
        self.load_set_configuration(&content).await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.execute_commit("commit", "<commit/>").await
    }

    pub async fn commit_confirm(&mut self, seconds: u32, persist_token: Option<&str>) -> Result<()> {
        let root = Xml::build_named("commit");
        root.append("confirmed");
        root.append_text("confirm-timeout", &seconds.to_string());
        if let Some(token) = persist_token {
            root.append_text("persist", token);
        }
        self.execute_commit("commit-confirm", &root.to_fragment_string()).await
    }

    /// `<commit-configuration><full/></commit-configuration>`: treated as a
    /// vendor-only extension, not a standard NETCONF operation.
    pub async fn commit_full(&mut self) -> Result<()> {
        let root = Xml::build_named("commit-configuration");
        root.append("full");
        self.execute_commit("commit-configuration(full)", &root.to_fragment_string()).await
    }

    pub async fn validate(&mut self) -> Result<bool> {
        self.execute_boolean("validate", "<validate><source><candidate/></source></validate>").await
    }

    pub async fn reboot(&mut self) -> Result<()> {
        let (_xml, reply) = self.send_and_parse("request-reboot", "<request-reboot/>").await?;
        if reply.has_errors() {
            return Err(Error::protocol("request-reboot", reply.raw()));
        }
        Ok(())
    }

    pub async fn get_candidate_config(&mut self, subtree_filter: Option<&str>) -> Result<Option<Xml>> {
        self.get_config("candidate", subtree_filter).await
    }

    pub async fn get_running_config(&mut self, subtree_filter: Option<&str>) -> Result<Option<Xml>> {
        self.get_config("running", subtree_filter).await
    }

    async fn get_config(&mut self, source: &str, subtree_filter: Option<&str>) -> Result<Option<Xml>> {
        let root = Xml::build_named("get-config");
        root.add_path("source").append(source);
        if let Some(filter) = subtree_filter {
            root.append_raw("filter", filter)?.set_attribute("type", "subtree");
        }
        let operation = format!("get-config({})", source);
        let (_xml, reply) = self.send_and_parse(&operation, &root.to_fragment_string()).await?;
        Ok(reply.data().cloned())
    }

    /// `<get>` with an XPath filter, reaching both configuration and
    /// operational state (unlike `get-config`, which is configuration
    /// only).
    pub async fn get_running_config_and_state(&mut self, xpath_filter: &str) -> Result<Option<Xml>> {
        let root = Xml::build_named("get");
        let filter = root.append("filter");
        filter.set_attribute("type", "xpath");
        filter.set_attribute("select", xpath_filter);
        let (_xml, reply) = self.send_and_parse("get", &root.to_fragment_string()).await?;
        Ok(reply.data().cloned())
    }

    /// NMDA (RFC 8526) `<get-data>` against an explicit datastore.
    pub async fn get_data(&mut self, xpath_filter: &str, datastore: Datastore) -> Result<Option<Xml>> {
        let root = Xml::build_named("get-data");
        root.set_attribute("xmlns", "urn:ietf:params:xml:ns:yang:ietf-netconf-nmda");
        root.append_text("datastore", &format!("ds:{}", datastore));
        root.append_text("xpath-filter", xpath_filter);
        let operation = format!("get-data({})", datastore);
        let (_xml, reply) = self.send_and_parse(&operation, &root.to_fragment_string()).await?;
        Ok(reply.data().cloned())
    }

    /// Wraps `cmd` as a Junos `<command>` RPC and extracts its `<output>`
    /// text. Falls back to the raw reply text when no `<output>` element is
    /// present, matching the behavior of existing NETCONF clients against
    /// devices that omit it for certain command forms.
    pub async fn run_cli_command(&mut self, cmd: &str) -> Result<String> {
        let root = Xml::build_named("command");
        root.set_text(cmd);
        let (xml, reply) = self.send_and_parse("command", &root.to_fragment_string()).await?;
        Ok(xml.find_value(&["output"]).unwrap_or_else(|| reply.raw().to_string()))
    }

    pub async fn run_cli_command_streaming(&mut self, cmd: &str) -> Result<Lines<BufReader<&mut S>>> {
        let root = Xml::build_named("command");
        root.set_text(cmd);
        self.execute_rpc_streaming(&root.to_fragment_string()).await
    }

    pub async fn open_configuration(&mut self, mode: &str) -> Result<bool> {
        let root = Xml::build_named("open-configuration");
        root.append(mode);
        self.execute_boolean("open-configuration", &root.to_fragment_string()).await
    }

    pub async fn close_configuration(&mut self) -> Result<bool> {
        self.execute_boolean("close-configuration", "<close-configuration/>").await
    }

    pub async fn kill_session(&mut self, session_id: &str) -> Result<bool> {
        let root = Xml::build_named("kill-session");
        root.append_text("session-id", session_id);
        self.execute_boolean("kill-session", &root.to_fragment_string()).await
    }

    pub async fn cancel_commit(&mut self, persist_token: Option<&str>) -> Result<bool> {
        let root = Xml::build_named("cancel-commit");
        if let Some(token) = persist_token {
            root.append_text("persist-id", token);
        }
        self.execute_boolean("cancel-commit", &root.to_fragment_string()).await
    }

    pub fn get_session_id(&self) -> Option<&str> {
        self.server_hello.as_ref().and_then(|h| h.session_id())
    }

    pub fn get_server_hello(&self) -> Option<&Hello> {
        self.server_hello.as_ref()
    }

    pub fn last_rpc_reply(&self) -> Option<&RpcReply> {
        self.last_rpc_reply.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn add_rpc_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_attr(&mut self.rpc_attributes, &name.into(), &value.into());
    }

    pub fn remove_rpc_attribute(&mut self, name: &str) {
        self.rpc_attributes.retain(|(k, _)| k != name);
    }

    pub fn remove_all_rpc_attributes(&mut self) {
        self.rpc_attributes.clear();
    }

    /// Sends `<close-session/>` and marks the session closed. Not
    /// idempotent at this layer: a second call observes `state=Closed` and
    /// fails with a not-connected error, same as any other operation
    /// issued outside `Ready`. The device facade is the idempotent,
    /// always-safe entry point; it absorbs that error on a repeated close.
    pub async fn close(&mut self) -> Result<()> {
        self.require_ready("close-session")?;
        if let Err(e) = self.send_and_parse("close-session", "<close-session/>").await {
            warn!(target: "session::close", "close-session rpc failed: {}", e);
        }
        self.state = SessionState::Closed;
        Ok(())
    }
}

async fn read_config_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Configuration(format!("failed to read {}: {}", path.display(), e)))
}

async fn write_already_framed<W: AsyncWrite + Unpin>(out: &mut W, framed: &[u8]) -> Result<()> {
    use tokio::io::AsyncWriteExt;
    out.write_all(framed)
        .await
        .map_err(|e| Error::transport("write netconf message", e))?;
    out.flush().await.map_err(|e| Error::transport("flush netconf message", e))
}

fn strip_xml_declaration(input: &str) -> (Option<&str>, &str) {
    if let Some(rest) = input.strip_prefix("<?xml") {
        if let Some(end) = rest.find("?>") {
            let decl_end = "<?xml".len() + end + 2;
            return (Some(&input[..decl_end]), input[decl_end..].trim_start());
        }
    }
    (None, input)
}

fn is_rpc_element(trimmed: &str) -> bool {
    match trimmed.strip_prefix("<rpc") {
        Some(rest) => matches!(rest.chars().next(), Some(c) if c == '>' || c == '/' || c.is_whitespace()),
        None => false,
    }
}

fn normalize_self_closing_rpc(trimmed: &str) -> String {
    let tag_end = match trimmed.find('>') {
        Some(i) => i,
        None => return trimmed.to_string(),
    };
    if tag_end > 0 && trimmed.as_bytes()[tag_end - 1] == b'/' {
        format!("{}></rpc>", &trimmed[..tag_end - 1])
    } else {
        trimmed.to_string()
    }
}

fn rewrite_rpc_open_tag(body: &str, message_id: u64, extra_attrs: &[(String, String)]) -> Result<String> {
    let start = body
        .find("<rpc")
        .ok_or_else(|| Error::protocol("fixup rpc", "missing <rpc> element"))?;
    let tag_end = body[start..]
        .find('>')
        .map(|i| start + i)
        .ok_or_else(|| Error::protocol("fixup rpc", "unterminated <rpc> tag"))?;
    let self_closing = tag_end > start && body.as_bytes()[tag_end - 1] == b'/';
    let attrs_region_end = if self_closing { tag_end - 1 } else { tag_end };
    let attrs_str = &body[start + "<rpc".len()..attrs_region_end];

    let mut attrs = parse_attrs(attrs_str);
    set_attr(&mut attrs, "xmlns", NETCONF_NAMESPACE);
    set_attr(&mut attrs, "message-id", &message_id.to_string());
    for (k, v) in extra_attrs {
        set_attr(&mut attrs, k, v);
    }

    let rebuilt: String = attrs.iter().map(|(k, v)| format!(" {}=\"{}\"", k, v)).collect();
    let new_open = format!("<rpc{}>", rebuilt);

    if self_closing {
        Ok(format!("{}{}</rpc>", &body[..start], new_open))
    } else {
        Ok(format!("{}{}{}", &body[..start], new_open, &body[tag_end + 1..]))
    }
}

fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        let eq = match rest.find('=') {
            Some(i) => i,
            None => break,
        };
        let key = rest[..eq].trim().to_string();
        rest = &rest[eq + 1..];
        let quote = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => break,
        };
        rest = &rest[1..];
        let end = match rest.find(quote) {
            Some(i) => i,
            None => break,
        };
        let value = rest[..end].to_string();
        rest = rest[end + 1..].trim_start();
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }
    attrs
}

fn set_attr(attrs: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(existing) = attrs.iter_mut().find(|(k, _)| k == key) {
        existing.1 = value.to_string();
    } else {
        attrs.push((key.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_op_session() -> NetconfSession<tokio::io::DuplexStream> {
        let (a, _b) = tokio::io::duplex(4096);
        NetconfSession {
            stream: a,
            state: SessionState::Ready,
            next_message_id: 1,
            connection_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
            server_hello: None,
            last_rpc_reply: None,
            rpc_attributes: Vec::new(),
        }
    }

    #[test]
    fn fixup_rejects_empty_payload() {
        let mut session = no_op_session();
        assert!(matches!(session.fixup_rpc("   "), Err(Error::Argument(_))));
    }

    #[test]
    fn fixup_wraps_bare_operation_name() {
        let mut session = no_op_session();
        let framed = session.fixup_rpc("get-chassis-inventory").unwrap();
        assert!(framed.contains("<rpc xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"1\">"));
        assert!(framed.contains("<get-chassis-inventory/>"));
        assert!(framed.ends_with(framing::EOM));
    }

    #[test]
    fn fixup_wraps_loose_xml() {
        let mut session = no_op_session();
        let framed = session.fixup_rpc("<get/>").unwrap();
        assert!(framed.contains("<rpc "));
        assert!(framed.contains("<get/></rpc>"));
    }

    #[test]
    fn fixup_leaves_existing_rpc_element_in_place() {
        let mut session = no_op_session();
        let framed = session.fixup_rpc("<rpc><get/></rpc>").unwrap();
        // single rpc wrapper, not double-wrapped
        assert_eq!(framed.matches("<rpc").count(), 1);
    }

    #[test]
    fn fixup_message_ids_increase_monotonically() {
        let mut session = no_op_session();
        let first = session.fixup_rpc("<get/>").unwrap();
        let second = session.fixup_rpc("<get/>").unwrap();
        assert!(first.contains("message-id=\"1\""));
        assert!(second.contains("message-id=\"2\""));
    }

    #[test]
    fn fixup_is_idempotent_given_matching_message_ids() {
        let mut left = no_op_session();
        let mut right = no_op_session();
        let first_pass = left.fixup_rpc("<get/>").unwrap();
        let stripped = first_pass.strip_suffix(framing::EOM).unwrap();
        let second_pass_on_left_output = right.fixup_rpc(stripped).unwrap();
        assert_eq!(second_pass_on_left_output, first_pass);
    }

    #[test]
    fn fixup_preserves_custom_rpc_attributes() {
        let mut session = no_op_session();
        session.add_rpc_attribute("xmlns:junos", "http://xml.juniper.net/junos");
        let framed = session.fixup_rpc("<get/>").unwrap();
        assert!(framed.contains("xmlns:junos=\"http://xml.juniper.net/junos\""));
    }

    #[test]
    fn datastore_parses_case_insensitively() {
        assert_eq!("Running".parse::<Datastore>().unwrap(), Datastore::Running);
        assert_eq!(Datastore::Operational.to_string(), "operational");
        assert!("bogus".parse::<Datastore>().is_err());
    }

    #[test]
    fn load_type_rejects_anything_but_merge_or_replace() {
        assert_eq!("MERGE".parse::<LoadType>().unwrap(), LoadType::Merge);
        assert!("delete".parse::<LoadType>().is_err());
    }
}
