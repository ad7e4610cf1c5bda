//! Where and how to connect.

use std::time::Duration;

use crate::{Error, Result};

/// Transport encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption (port 143). Only meant for local test servers.
    None,
    /// TLS from the start (port 993).
    #[default]
    Implicit,
}

impl Security {
    /// Well-known IMAP port for the mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 143,
            Self::Implicit => 993,
        }
    }
}

/// Server address plus timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DNS name or IP literal; also the TLS server name.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Plain or implicit TLS.
    pub security: Security,
    /// Limit for TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Limit for each individual read.
    pub io_timeout: Duration,
}

impl Config {
    /// Implicit TLS on 993, 30 s to connect, 60 s per read.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Security::Implicit.default_port(),
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Builds a configuration from a `host` or `host:port` string.
    ///
    /// Bracketed IPv6 literals (`[::1]:993`) are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the host is empty or the port is not
    /// a valid number.
    pub fn from_server(server: &str) -> Result<Self> {
        let server = server.trim();
        let (host, port) = split_host_port(server)
            .ok_or_else(|| Error::Protocol(format!("invalid server address: {server:?}")))?;
        if host.is_empty() {
            return Err(Error::Protocol(format!("invalid server address: {server:?}")));
        }
        let mut config = Self::new(host);
        if let Some(port) = port {
            config.port = port;
        }
        Ok(config)
    }

    /// Sets the security mode, resetting the port to its default.
    #[must_use]
    pub const fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self.port = security.default_port();
        self
    }

    /// Overrides the per-read limit.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }
}

/// Splits `host[:port]`; `None` when the port part is not a number.
fn split_host_port(server: &str) -> Option<(&str, Option<u16>)> {
    if let Some(rest) = server.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        return match after.strip_prefix(':') {
            Some(port) => Some((host, Some(port.parse().ok()?))),
            None if after.is_empty() => Some((host, None)),
            None => None,
        };
    }
    match server.rsplit_once(':') {
        // A bare IPv6 address has several colons and no port.
        Some((host, _)) if host.contains(':') => Some((server, None)),
        Some((host, port)) => Some((host, Some(port.parse().ok()?))),
        None => Some((server, None)),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 143);
        assert_eq!(Security::Implicit.default_port(), 993);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("imap.example.com");
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.io_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_from_server_host_only() {
        let config = Config::from_server("outlook.office365.com").unwrap();
        assert_eq!(config.host, "outlook.office365.com");
        assert_eq!(config.port, 993);
    }

    #[test]
    fn test_from_server_with_port() {
        let config = Config::from_server(" mail.example.org:1993 ").unwrap();
        assert_eq!(config.host, "mail.example.org");
        assert_eq!(config.port, 1993);
    }

    #[test]
    fn test_from_server_ipv6() {
        let config = Config::from_server("[::1]:10993").unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 10993);
        assert_eq!(Config::from_server("::1").unwrap().port, 993);
    }

    #[test]
    fn test_from_server_rejects_garbage() {
        assert!(Config::from_server("").is_err());
        assert!(Config::from_server("host:imap").is_err());
        assert!(Config::from_server(":993").is_err());
        assert!(Config::from_server("host:70000").is_err());
    }

    #[test]
    fn test_with_security_resets_port() {
        let config = Config::new("localhost").with_security(Security::None);
        assert_eq!(config.port, 143);
    }
}
