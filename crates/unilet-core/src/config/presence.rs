//! Presence service configuration.

use serde::{Deserialize, Serialize};

/// Real-time presence service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Interval between heartbeat supervisor scans, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Seconds without a client heartbeat before a connection is evicted.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,
    /// Internal per-connection outbound channel buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    15
}

fn default_heartbeat_timeout() -> u64 {
    30
}

fn default_channel_buffer() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = PresenceConfig::default();
        assert_eq!(config.heartbeat_interval_seconds, 15);
        assert_eq!(config.heartbeat_timeout_seconds, 30);
        assert!(config.heartbeat_timeout_seconds > config.heartbeat_interval_seconds);
    }
}
