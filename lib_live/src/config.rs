//! Runtime configuration for the live-data services.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LiveError;

/// Timing knobs for the four services. The binaries layer file / env / CLI
/// merging on top of this; the library only sees the resolved values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveConfig {
    /// Period of the market-price random walk, in seconds.
    pub market_tick_secs: u64,
    /// Period of the analytics counter tick, in seconds.
    pub analytics_tick_secs: u64,
    /// Maximum age of a cached weather record, in seconds.
    pub weather_ttl_secs: u64,
    /// Artificial latency of the simulated weather fetch, in milliseconds.
    pub weather_fetch_delay_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            market_tick_secs: 30,
            analytics_tick_secs: 10,
            weather_ttl_secs: 10 * 60,
            weather_fetch_delay_ms: 150,
        }
    }
}

impl LiveConfig {
    /// Rejects values that would stall or spin a service.
    pub fn validate(&self) -> Result<(), LiveError> {
        if self.market_tick_secs == 0 {
            return Err(LiveError::InvalidConfig(
                "marketTickSecs must be greater than zero".into(),
            ));
        }
        if self.analytics_tick_secs == 0 {
            return Err(LiveError::InvalidConfig(
                "analyticsTickSecs must be greater than zero".into(),
            ));
        }
        if self.weather_ttl_secs == 0 {
            return Err(LiveError::InvalidConfig(
                "weatherTtlSecs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn market_tick(&self) -> Duration {
        Duration::from_secs(self.market_tick_secs)
    }

    pub fn analytics_tick(&self) -> Duration {
        Duration::from_secs(self.analytics_tick_secs)
    }

    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }

    pub fn weather_fetch_delay(&self) -> Duration {
        Duration::from_millis(self.weather_fetch_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(LiveConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_tick_is_rejected() {
        let config = LiveConfig {
            market_tick_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LiveError::InvalidConfig(_))
        ));
    }
}
