//! Server configuration.
//!
//! Values come from the environment with sensible defaults, so the binary
//! runs out of the box and can be re-bound in deployment.

use std::env;

use log::warn;

/// Environment variable holding the bind host.
pub const HOST_VAR: &str = "TACTICS_HOST";

/// Environment variable holding the bind port.
pub const PORT_VAR: &str = "TACTICS_PORT";

/// HTTP/WebSocket server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from `TACTICS_HOST` / `TACTICS_PORT`.
    ///
    /// An unparsable port is logged and replaced by the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var(HOST_VAR) {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }
        if let Ok(port) = env::var(PORT_VAR) {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("[Config] Ignoring invalid {}={:?}, using {}", PORT_VAR, port, config.port),
            }
        }
        config
    }

    /// Address tuple accepted by `HttpServer::bind`.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
