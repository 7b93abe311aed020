//! Environment-driven configuration. Connection/command timeouts are
//! explicit `DeviceConfig` fields, not environment overrides — the only
//! thing that legitimately varies per deployment without a code change is
//! proxy placement, so that is all this module resolves.

use std::env;

/// A proxy to tunnel the SSH connection through, resolved from environment
/// variables at `connect()` time rather than cached in a `Lazy` static,
/// since proxy placement can change between builds and connects in a
/// long-lived process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyConfig {
    Http {
        host: String,
        port: u16,
        user: Option<String>,
        pass: Option<String>,
    },
    Socks5 {
        host: String,
        port: u16,
        user: Option<String>,
        pass: Option<String>,
    },
    None,
}

impl ProxyConfig {
    /// Reads `HTTP_PROXY_HOST`/`PORT`/`USER`/`PASS` and
    /// `SOCKS_PROXY_HOST`/`PORT`/`USER`/`PASS`. An HTTP proxy takes
    /// precedence when both pairs are set, matching the order they are
    /// listed in.
    pub fn from_env() -> Self {
        if let Some((host, port)) = host_port("HTTP_PROXY_HOST", "HTTP_PROXY_PORT") {
            return ProxyConfig::Http {
                host,
                port,
                user: env::var("HTTP_PROXY_USER").ok(),
                pass: env::var("HTTP_PROXY_PASS").ok(),
            };
        }
        if let Some((host, port)) = host_port("SOCKS_PROXY_HOST", "SOCKS_PROXY_PORT") {
            return ProxyConfig::Socks5 {
                host,
                port,
                user: env::var("SOCKS_PROXY_USER").ok(),
                pass: env::var("SOCKS_PROXY_PASS").ok(),
            };
        }
        ProxyConfig::None
    }
}

fn host_port(host_var: &str, port_var: &str) -> Option<(String, u16)> {
    let host = env::var(host_var).ok()?;
    let port = env::var(port_var).ok()?.parse().ok()?;
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_proxy_env() {
        for var in [
            "HTTP_PROXY_HOST",
            "HTTP_PROXY_PORT",
            "HTTP_PROXY_USER",
            "HTTP_PROXY_PASS",
            "SOCKS_PROXY_HOST",
            "SOCKS_PROXY_PORT",
            "SOCKS_PROXY_USER",
            "SOCKS_PROXY_PASS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn no_env_means_no_proxy() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_proxy_env();
        assert_eq!(ProxyConfig::from_env(), ProxyConfig::None);
    }

    #[test]
    fn socks_host_and_port_are_required_together() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_proxy_env();
        env::set_var("SOCKS_PROXY_HOST", "10.0.0.1");
        let config = ProxyConfig::from_env();
        clear_proxy_env();
        assert_eq!(config, ProxyConfig::None);
    }

    #[test]
    fn socks_proxy_resolved_with_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_proxy_env();
        env::set_var("SOCKS_PROXY_HOST", "10.0.0.1");
        env::set_var("SOCKS_PROXY_PORT", "1080");
        env::set_var("SOCKS_PROXY_USER", "alice");
        let config = ProxyConfig::from_env();
        clear_proxy_env();
        assert_eq!(
            config,
            ProxyConfig::Socks5 {
                host: "10.0.0.1".to_string(),
                port: 1080,
                user: Some("alice".to_string()),
                pass: None,
            }
        );
    }

    #[test]
    fn http_proxy_takes_precedence_over_socks() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_proxy_env();
        env::set_var("HTTP_PROXY_HOST", "proxy.example");
        env::set_var("HTTP_PROXY_PORT", "8080");
        env::set_var("SOCKS_PROXY_HOST", "10.0.0.1");
        env::set_var("SOCKS_PROXY_PORT", "1080");
        let config = ProxyConfig::from_env();
        clear_proxy_env();
        assert!(matches!(config, ProxyConfig::Http { .. }));
    }
}
