//! The Device Facade (C5): connection lifecycle (auth, host-key policy,
//! proxy tunneling) wrapped around the Session Engine.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use async_ssh2_tokio::{AuthMethod, Client, ServerCheckMethod};
use base64::{engine::general_purpose, Engine};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{info, warn};

use crate::capability::{CapabilityUri, DEFAULT_CAPABILITIES};
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::session::NetconfSession;
use crate::transport::NetconfIo;

const DEFAULT_NETCONF_PORT: u16 = 830;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How the SSH client verifies the remote host key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    Strict(PathBuf),
    Insecure,
}

#[derive(Debug, Clone)]
enum Secret {
    Password(String),
    KeyFile { path: PathBuf, passphrase: Option<String> },
}

/// An immutable, validated connection record. Construct through
/// [`DeviceConfigBuilder`].
pub struct DeviceConfig {
    host: String,
    port: u16,
    connection_timeout: Duration,
    command_timeout: Duration,
    user: String,
    secret: Option<Secret>,
    host_key_policy: HostKeyPolicy,
    capabilities: Vec<CapabilityUri>,
    ssh_client: Option<Client>,
}

impl DeviceConfig {
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Builds a [`DeviceConfig`], enforcing the field invariants at `build()`
/// time rather than leaving the caller to discover a missing field at
/// connect time.
#[derive(Default)]
pub struct DeviceConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    connection_timeout: Option<Duration>,
    command_timeout: Option<Duration>,
    user: Option<String>,
    password: Option<String>,
    key_file: Option<PathBuf>,
    key_passphrase: Option<String>,
    strict_host_key_checking: Option<bool>,
    known_hosts_path: Option<PathBuf>,
    capabilities: Option<Vec<CapabilityUri>>,
    ssh_client: Option<Client>,
}

impl DeviceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn key_file(mut self, path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        self.key_file = Some(path.into());
        self.key_passphrase = passphrase;
        self
    }

    pub fn strict_host_key_checking(mut self, known_hosts_path: impl Into<PathBuf>) -> Self {
        self.strict_host_key_checking = Some(true);
        self.known_hosts_path = Some(known_hosts_path.into());
        self
    }

    pub fn insecure_host_key_checking(mut self) -> Self {
        self.strict_host_key_checking = Some(false);
        self
    }

    /// Overrides the crate's default capability set entirely, rather than
    /// extending it.
    pub fn capabilities(mut self, capabilities: Vec<CapabilityUri>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Supplies an already-authenticated SSH client instead of having
    /// `connect()` dial and authenticate one itself. When set, `connect()`
    /// skips `auth_method`/host-key checking/proxy tunneling entirely and
    /// opens the `netconf` subsystem channel directly on this client.
    pub fn ssh_client(mut self, client: Client) -> Self {
        self.ssh_client = Some(client);
        self
    }

    pub fn build(self) -> Result<DeviceConfig> {
        let host = self
            .host
            .ok_or_else(|| Error::Configuration("host is required".into()))?;
        let user = self
            .user
            .ok_or_else(|| Error::Configuration("user is required".into()))?;

        // A preconfigured ssh client already carries its own authentication,
        // so credentials are only required when one was not supplied.
        let secret = match (self.password, self.key_file) {
            (Some(password), None) => Some(Secret::Password(password)),
            (None, Some(path)) => Some(Secret::KeyFile { path, passphrase: self.key_passphrase }),
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "exactly one of password or key file must be set, not both".into(),
                ))
            }
            (None, None) if self.ssh_client.is_some() => None,
            (None, None) => {
                return Err(Error::Configuration(
                    "exactly one of password or key file must be set".into(),
                ))
            }
        };

        let host_key_policy = match self.strict_host_key_checking {
            Some(true) => {
                let path = self.known_hosts_path.ok_or_else(|| {
                    Error::Configuration(
                        "strict host-key checking requires a known-hosts path".into(),
                    )
                })?;
                HostKeyPolicy::Strict(path)
            }
            _ => HostKeyPolicy::Insecure,
        };

        Ok(DeviceConfig {
            host,
            port: self.port.unwrap_or(DEFAULT_NETCONF_PORT),
            connection_timeout: self.connection_timeout.unwrap_or(DEFAULT_TIMEOUT),
            command_timeout: self.command_timeout.unwrap_or(DEFAULT_TIMEOUT),
            user,
            secret,
            host_key_policy,
            // Defensively copied so a caller's later mutation of the Vec
            // they passed in cannot reach back into this immutable config.
            capabilities: self.capabilities.unwrap_or_else(|| DEFAULT_CAPABILITIES.clone()),
            ssh_client: self.ssh_client,
        })
    }
}

/// The top-level handle an application holds: an SSH session plus the
/// attached NETCONF session engine, once connected.
pub struct NetconfClient {
    config: DeviceConfig,
    client: Option<Client>,
    session: Option<NetconfSession<Pin<Box<dyn NetconfIo>>>>,
}

impl NetconfClient {
    pub fn new(config: DeviceConfig) -> Self {
        NetconfClient { config, client: None, session: None }
    }

    /// Opens the SSH session (applying the host-key policy and any proxy
    /// configured in the environment), opens the `netconf` subsystem
    /// channel, and performs the hello exchange. If the builder was given a
    /// preconfigured SSH client via `.ssh_client(...)`, that client is used
    /// as-is and auth/host-key checking/proxy tunneling are skipped
    /// entirely.
    pub async fn connect(&mut self) -> Result<()> {
        let client = if let Some(client) = self.config.ssh_client.take() {
            info!(target: "device::connect", "using caller-supplied ssh client, skipping dial and auth");
            client
        } else {
            let auth = self.auth_method().await?;
            let server_check = match &self.config.host_key_policy {
                HostKeyPolicy::Insecure => ServerCheckMethod::NoCheck,
                HostKeyPolicy::Strict(path) => ServerCheckMethod::KnownHostsFile(path.to_string_lossy().into_owned()),
            };

            let proxy = ProxyConfig::from_env();
            if !matches!(proxy, ProxyConfig::None) {
                info!(target: "device::connect", "tunneling ssh connection through a configured proxy");
            }
            connect_ssh(&self.config, auth, server_check, &proxy).await?
        };

        let channel = client
            .get_channel()
            .await
            .map_err(|e| Error::transport("open ssh channel", e))?;
        channel
            .request_subsystem(true, "netconf")
            .await
            .map_err(|e| Error::transport("request netconf subsystem", e))?;
        let stream: Pin<Box<dyn NetconfIo>> = Box::pin(channel.into_stream());

        let session = NetconfSession::connect(
            stream,
            self.config.connection_timeout,
            self.config.command_timeout,
            self.config.capabilities.clone(),
        )
        .await?;

        info!(target: "device::connect", host = %self.config.host, "netconf session ready");
        self.client = Some(client);
        self.session = Some(session);
        Ok(())
    }

    async fn auth_method(&self) -> Result<AuthMethod> {
        match self.config.secret.as_ref() {
            Some(Secret::Password(password)) => Ok(AuthMethod::with_password(password)),
            Some(Secret::KeyFile { path, passphrase }) => {
                let key_content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::Configuration(format!("reading ssh key {}: {}", path.display(), e)))?;
                Ok(AuthMethod::with_key(&key_content, passphrase.as_deref()))
            }
            // `build()` only allows a missing secret when an ssh client was
            // supplied, and that path never calls `auth_method`.
            None => Err(Error::Configuration("no credentials configured".into())),
        }
    }

    /// True iff both the SSH session and the subsystem channel report
    /// connected, i.e. a session was established and has not yet reached a
    /// terminal state.
    pub fn is_connected(&self) -> bool {
        match &self.session {
            Some(session) => session.state() == crate::session::SessionState::Ready,
            None => false,
        }
    }

    /// Access to the underlying Session Engine for every typed NETCONF
    /// operation (`lock_config`, `load_xml_configuration`, `commit`, ...).
    pub fn session(&mut self) -> Result<&mut NetconfSession<Pin<Box<dyn NetconfIo>>>> {
        self.session.as_mut().ok_or_else(|| Error::not_connected("netconf operation"))
    }

    /// Opens an ad-hoc exec channel independent of the netconf subsystem
    /// and runs `cmd` to completion, returning its stdout.
    pub async fn run_shell_command(&mut self, cmd: &str) -> Result<String> {
        let client = self.client.as_ref().ok_or_else(|| Error::not_connected("run shell command"))?;
        let timeout = self.config.command_timeout;
        let result = tokio::time::timeout(timeout, client.execute(cmd))
            .await
            .map_err(|_| Error::timeout("run shell command", timeout))?
            .map_err(|e| Error::transport("run shell command", e))?;
        if result.exit_status != 0 {
            return Err(Error::protocol(
                "run shell command",
                format!("'{}' exited with status {}", cmd, result.exit_status),
            ));
        }
        Ok(result.stdout)
    }

    /// Like [`run_shell_command`](Self::run_shell_command) but returns a
    /// line-oriented reader over a freshly opened exec channel's combined
    /// stream instead of waiting for the command to finish.
    pub async fn run_shell_command_streaming(
        &mut self,
        cmd: &str,
    ) -> Result<tokio::io::Lines<tokio::io::BufReader<impl AsyncRead>>> {
        let client = self.client.as_ref().ok_or_else(|| Error::not_connected("run shell command (streaming)"))?;
        let channel = client
            .get_channel()
            .await
            .map_err(|e| Error::transport("open ssh channel", e))?;
        channel
            .exec(true, cmd)
            .await
            .map_err(|e| Error::transport("exec shell command", e))?;
        let stream = channel.into_stream();
        Ok(tokio::io::AsyncBufReadExt::lines(tokio::io::BufReader::new(stream)))
    }

    /// Sends `<close-session/>`, disconnects the subsystem channel, and
    /// drops the SSH session. Idempotent and always safe: a NOT-CONNECTED
    /// error from an already-closed or never-opened session is absorbed
    /// rather than propagated.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            match session.close().await {
                Ok(()) | Err(Error::NotConnected(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.session = None;
        self.client = None;
        Ok(())
    }
}

impl Drop for NetconfClient {
    /// Best-effort: `Drop` cannot await, so this cannot send
    /// `<close-session/>`. It only logs that an explicit `close()` should
    /// have been called; callers are still responsible for clean shutdown.
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!(
                target: "device::drop",
                host = %self.config.host,
                "netconf client dropped without calling close(); connection will be torn down uncleanly"
            );
        }
    }
}

async fn connect_ssh(
    config: &DeviceConfig,
    auth: AuthMethod,
    server_check: ServerCheckMethod,
    proxy: &ProxyConfig,
) -> Result<Client> {
    match proxy {
        ProxyConfig::None => connect_ssh_direct(config, auth, server_check).await,
        ProxyConfig::Socks5 { host, port, user, pass } => {
            let tunnel = socks5_tunnel(host, *port, user.as_deref(), pass.as_deref(), config).await?;
            Client::connect_with_stream(tunnel, &config.user, auth, server_check)
                .await
                .map_err(|e| Error::transport("ssh handshake over socks5 proxy", e))
        }
        ProxyConfig::Http { host, port, user, pass } => {
            let tunnel = http_connect_tunnel(host, *port, user.as_deref(), pass.as_deref(), config).await?;
            Client::connect_with_stream(tunnel, &config.user, auth, server_check)
                .await
                .map_err(|e| Error::transport("ssh handshake over http proxy", e))
        }
    }
}

async fn connect_ssh_direct(
    config: &DeviceConfig,
    auth: AuthMethod,
    server_check: ServerCheckMethod,
) -> Result<Client> {
    match resolve_target(&config.host, config.port) {
        Ok(addr) => Client::connect(addr, &config.user, auth, server_check).await,
        Err(_) => Client::connect((config.host.as_str(), config.port), &config.user, auth, server_check).await,
    }
    .map_err(|e| Error::transport(format!("ssh connect {}:{}", config.host, config.port), e))
}

fn resolve_target(host: &str, port: u16) -> std::result::Result<SocketAddr, ()> {
    SocketAddr::from_str(&format!("{}:{}", host, port)).map_err(|_| ())
}

async fn socks5_tunnel(
    proxy_host: &str,
    proxy_port: u16,
    user: Option<&str>,
    pass: Option<&str>,
    config: &DeviceConfig,
) -> Result<tokio::net::TcpStream> {
    let proxy_addr = (proxy_host, proxy_port);
    let target = (config.host.as_str(), config.port);
    let stream = match (user, pass) {
        (Some(user), Some(pass)) => {
            tokio_socks::tcp::Socks5Stream::connect_with_password(proxy_addr, target, user, pass)
                .await
                .map_err(|e| Error::transport("socks5 proxy handshake", anyhow::anyhow!(e)))?
        }
        _ => tokio_socks::tcp::Socks5Stream::connect(proxy_addr, target)
            .await
            .map_err(|e| Error::transport("socks5 proxy handshake", anyhow::anyhow!(e)))?,
    };
    Ok(stream.into_inner())
}

/// A minimal HTTP CONNECT tunnel: `async-ssh2-tokio` has no native HTTP
/// proxy support, so this hand-dials the proxy, issues `CONNECT`, and
/// hands the resulting raw socket to the SSH handshake.
async fn http_connect_tunnel(
    proxy_host: &str,
    proxy_port: u16,
    user: Option<&str>,
    pass: Option<&str>,
    config: &DeviceConfig,
) -> Result<tokio::net::TcpStream> {
    let mut stream = tokio::net::TcpStream::connect((proxy_host, proxy_port))
        .await
        .map_err(|e| Error::transport("http proxy connect", e))?;

    let mut request = format!(
        "CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n",
        host = config.host,
        port = config.port,
    );
    if let (Some(user), Some(pass)) = (user, pass) {
        let credentials = general_purpose::STANDARD.encode(format!("{}:{}", user, pass));
        request.push_str(&format!("Proxy-Authorization: Basic {}\r\n", credentials));
    }
    request.push_str("\r\n");

    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| Error::transport("http proxy connect request", e))?;

    let mut response = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| Error::transport("http proxy connect response", e))?;
        if n == 0 {
            return Err(Error::transport(
                "http proxy connect response",
                anyhow::anyhow!("proxy closed the connection before a response was seen"),
            ));
        }
        response.extend_from_slice(&chunk[..n]);
        if response.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let status_line = String::from_utf8_lossy(&response);
    if !status_line.starts_with("HTTP/1.1 200") && !status_line.starts_with("HTTP/1.0 200") {
        return Err(Error::transport(
            "http proxy connect response",
            anyhow::anyhow!("proxy refused the tunnel: {}", status_line.lines().next().unwrap_or("")),
        ));
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_host_and_user() {
        let err = DeviceConfig::builder().password("x").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn builder_requires_exactly_one_secret() {
        let err = DeviceConfig::builder()
            .host("r1")
            .user("admin")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = DeviceConfig::builder()
            .host("r1")
            .user("admin")
            .password("pw")
            .key_file("/tmp/id_rsa", None)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn builder_requires_known_hosts_path_for_strict_checking() {
        let config = DeviceConfig::builder()
            .host("r1")
            .user("admin")
            .password("pw")
            .strict_host_key_checking("/home/user/.ssh/known_hosts")
            .build()
            .unwrap();
        assert_eq!(
            config.host_key_policy,
            HostKeyPolicy::Strict(PathBuf::from("/home/user/.ssh/known_hosts"))
        );
    }

    #[test]
    fn builder_accepts_minimal_valid_config() {
        let config = DeviceConfig::builder()
            .host("r1")
            .user("admin")
            .password("pw")
            .build()
            .unwrap();
        assert_eq!(config.port(), DEFAULT_NETCONF_PORT);
        assert_eq!(config.capabilities.len(), DEFAULT_CAPABILITIES.len());
    }

    #[test]
    fn builder_defensively_copies_custom_capabilities() {
        let mut caps = vec![CapabilityUri::new(crate::capability::BASE_1_0).unwrap()];
        let config = DeviceConfig::builder()
            .host("r1")
            .user("admin")
            .password("pw")
            .capabilities(caps.clone())
            .build()
            .unwrap();
        caps.push(CapabilityUri::new(crate::capability::BASE_1_1).unwrap());
        assert_eq!(config.capabilities.len(), 1);
    }

    #[test]
    fn not_connected_before_connect() {
        let config = DeviceConfig::builder().host("r1").user("admin").password("pw").build().unwrap();
        let client = NetconfClient::new(config);
        assert!(!client.is_connected());
    }

    #[test]
    fn proxy_basic_auth_matches_known_vector() {
        let credentials = general_purpose::STANDARD.encode("Aladdin:open sesame");
        assert_eq!(credentials, "QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }
}
