//! Server configuration
//!
//! `ServerConfig` carries the bind target and per-connection socket limits.
//! It is a plain value with builder-style setters; the `minihttpd` binary
//! fills it from command-line flags and environment variables.

use std::time::Duration;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Default bound on each socket read and write
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Default listen backlog
pub const DEFAULT_BACKLOG: i32 = 128;

/// Listener and connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or IP address to bind
    pub host: String,
    /// Port to bind, 0 picks an ephemeral port
    pub port: u16,
    /// How long a connection may wait on a single read or write
    pub read_timeout: Duration,
    /// Pending-connection queue length passed to `listen(2)`
    pub backlog: i32,
}

impl ServerConfig {
    /// Create a configuration for `host:port` with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ServerConfig {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-read/write socket timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    /// `host:port` as given, for display and resolution
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            backlog: DEFAULT_BACKLOG,
        }
    }
}
