//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{constants, MarketError, Result};

/// Tunables for the marketplace engines and background tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lifetime of a freshly created signed order, in seconds.
    pub order_ttl_secs: i64,
    /// Upper bound on a single Chain Gateway call, in milliseconds.
    pub gateway_timeout_ms: u64,
    /// Interval between reconciler sweeps, in seconds.
    pub reconcile_interval_secs: u64,
    /// Capacity of the on-chain event broadcast channel.
    pub event_buffer: usize,
}

impl EngineConfig {
    /// Validate that every bound is usable.
    pub fn validate(&self) -> Result<()> {
        if self.order_ttl_secs <= 0 {
            return Err(MarketError::Configuration(
                "order_ttl_secs must be positive".to_string(),
            ));
        }
        if self.gateway_timeout_ms == 0 {
            return Err(MarketError::Configuration(
                "gateway_timeout_ms must be nonzero".to_string(),
            ));
        }
        if self.reconcile_interval_secs == 0 {
            return Err(MarketError::Configuration(
                "reconcile_interval_secs must be nonzero".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(MarketError::Configuration(
                "event_buffer must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn order_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.order_ttl_secs)
    }

    #[must_use]
    pub fn gateway_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.gateway_timeout_ms)
    }

    #[must_use]
    pub fn reconcile_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reconcile_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_ttl_secs: constants::DEFAULT_ORDER_TTL_SECS,
            gateway_timeout_ms: constants::DEFAULT_GATEWAY_TIMEOUT_MS,
            reconcile_interval_secs: constants::DEFAULT_RECONCILE_INTERVAL_SECS,
            event_buffer: constants::DEFAULT_EVENT_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.order_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = EngineConfig {
            gateway_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            MarketError::Configuration(_)
        ));
    }

    #[test]
    fn serde_round_trip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_ttl_secs, cfg.order_ttl_secs);
        assert_eq!(back.event_buffer, cfg.event_buffer);
    }
}
