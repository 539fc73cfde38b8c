//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the relay server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Seconds between liveness probes; a client that misses one full
    /// interval is dropped on the following cycle.
    pub ping_interval_secs: u64,
    /// Capacity of each connection's outbound frame channel.
    pub send_buffer: usize,
    /// Max `WebSocket` message size in bytes.
    pub max_message_size: usize,
}

impl RelayConfig {
    /// The probe interval as a `Duration`, clamped to at least one second.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            ping_interval_secs: 3,
            send_buffer: 64,
            max_message_size: 64 * 1024,
        }
    }
}
