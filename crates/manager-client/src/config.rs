//! Connection settings for the manager interface

use std::time::Duration;

use serde::Deserialize;

/// Manager interface connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmiConfig {
    /// Switch host name or address
    pub host: String,
    /// Manager port, 5038 on a stock Asterisk
    pub port: u16,
    pub username: String,
    pub secret: String,
    /// Delay between reconnect attempts
    pub reconnect_interval_ms: u64,
    /// How long an action may wait for its response
    pub action_timeout_ms: u64,
}

impl Default for AmiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5038,
            username: "admin".to_string(),
            secret: String::new(),
            reconnect_interval_ms: 5_000,
            action_timeout_ms: 10_000,
        }
    }
}

impl AmiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.username = username.into();
        self.secret = secret.into();
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// `host:port` string suitable for `TcpStream::connect`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}
