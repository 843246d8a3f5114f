use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::error::{Result, XfrError};

/// Engine configuration.
///
/// Defaults are overridable from `MUNINN_*` environment variables at
/// startup; the `transfers_in` quota can additionally be updated at
/// runtime through the control channel.
#[derive(Debug, Clone)]
pub struct XfrConfig {
    /// Maximum number of concurrently in-flight inbound transfers
    pub transfers_in: usize,

    /// How long a connection may sit idle waiting for the next message
    pub idle_timeout: Duration,

    /// TCP connect timeout towards a master
    pub connect_timeout: Duration,

    /// Whether an AXFR response with an empty answer section fails the
    /// transfer. Strict by default; unusual but not clearly invalid, so
    /// the rejection stays revisable.
    pub reject_empty_axfr: bool,
}

impl Default for XfrConfig {
    fn default() -> Self {
        Self {
            transfers_in: 10,
            idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            reject_empty_axfr: true,
        }
    }
}

impl XfrConfig {
    /// Create an XfrConfig from environment variables.
    /// Returns Err if a present variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(transfers_in) = std::env::var("MUNINN_TRANSFERS_IN") {
            let value = transfers_in
                .parse::<usize>()
                .map_err(|_| XfrError::BadParameters(format!("invalid transfers_in: {}", transfers_in)))?;
            if value == 0 {
                return Err(XfrError::BadParameters(
                    "transfers_in must be at least 1".to_string(),
                ));
            }
            config.transfers_in = value;
        }

        if let Ok(timeout_str) = std::env::var("MUNINN_IDLE_TIMEOUT") {
            let secs = timeout_str
                .parse::<u64>()
                .map_err(|_| XfrError::BadParameters(format!("invalid idle timeout: {}", timeout_str)))?;
            if secs == 0 {
                return Err(XfrError::BadParameters(
                    "idle timeout must be greater than 0".to_string(),
                ));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }

        if let Ok(timeout_str) = std::env::var("MUNINN_CONNECT_TIMEOUT") {
            let secs = timeout_str
                .parse::<u64>()
                .map_err(|_| {
                    XfrError::BadParameters(format!("invalid connect timeout: {}", timeout_str))
                })?;
            if secs == 0 {
                return Err(XfrError::BadParameters(
                    "connect timeout must be greater than 0".to_string(),
                ));
            }
            config.connect_timeout = Duration::from_secs(secs);
        }

        if let Ok(reject) = std::env::var("MUNINN_REJECT_EMPTY_AXFR") {
            config.reject_empty_axfr = matches!(
                reject.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(config)
    }

    /// Extract an updated `transfers_in` quota from a runtime config
    /// mapping. An absent key leaves the current value untouched and
    /// returns `None`; a present but invalid value is an error.
    pub fn transfers_in_update(update: &serde_json::Map<String, Value>) -> Result<Option<usize>> {
        let Some(value) = update.get("transfers_in") else {
            return Ok(None);
        };
        let quota = value
            .as_u64()
            .filter(|&v| v >= 1)
            .ok_or_else(|| {
                XfrError::BadParameters(format!("transfers_in must be an integer >= 1, got {}", value))
            })?;
        info!("transfers_in quota updated to {}", quota);
        Ok(Some(quota as usize))
    }
}
