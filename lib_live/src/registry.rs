//! # Service Registry
//!
//! Explicit ownership root for the four services. The application constructs
//! one registry, passes `Arc` handles to its collaborators, and keeps
//! "exactly one instance per domain" without hidden global state.
//!
//! The registry also owns the periodic tickers for the market and analytics
//! services and exposes the shutdown hook the simulated backend lacks: in a
//! long-running process the tick tasks stop when [`ServiceRegistry::shutdown`]
//! cancels their token.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::LiveConfig;
use crate::error::LiveError;
use crate::services::analytics::AnalyticsService;
use crate::services::market::MarketPriceService;
use crate::services::notifications::NotificationService;
use crate::services::weather::WeatherService;

/// Owns the service instances and their tick tasks.
///
/// Must be constructed inside a tokio runtime; `new` spawns the tickers.
pub struct ServiceRegistry {
    weather: Arc<WeatherService>,
    market: Arc<MarketPriceService>,
    notifications: Arc<NotificationService>,
    analytics: Arc<AnalyticsService>,
    shutdown_token: CancellationToken,
    tickers: Mutex<Vec<JoinHandle<()>>>,
}

impl ServiceRegistry {
    /// Validates `config`, constructs every service once and starts the
    /// market and analytics tickers.
    pub fn new(config: LiveConfig) -> Result<Self, LiveError> {
        config.validate()?;

        let weather = Arc::new(WeatherService::new(
            config.weather_ttl(),
            config.weather_fetch_delay(),
        ));
        let market = Arc::new(MarketPriceService::new());
        let notifications = Arc::new(NotificationService::new());
        let analytics = Arc::new(AnalyticsService::new());

        let shutdown_token = CancellationToken::new();
        let tickers = vec![
            tokio::spawn(run_ticker("market", config.market_tick(), shutdown_token.clone(), {
                let market = Arc::clone(&market);
                move || market.random_tick()
            })),
            tokio::spawn(run_ticker(
                "analytics",
                config.analytics_tick(),
                shutdown_token.clone(),
                {
                    let analytics = Arc::clone(&analytics);
                    move || analytics.random_tick()
                },
            )),
        ];

        log::info!(
            "Live services started (market tick {}s, analytics tick {}s, weather TTL {}s)",
            config.market_tick_secs,
            config.analytics_tick_secs,
            config.weather_ttl_secs
        );

        Ok(Self {
            weather,
            market,
            notifications,
            analytics,
            shutdown_token,
            tickers: Mutex::new(tickers),
        })
    }

    pub fn weather(&self) -> Arc<WeatherService> {
        Arc::clone(&self.weather)
    }

    pub fn market(&self) -> Arc<MarketPriceService> {
        Arc::clone(&self.market)
    }

    pub fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notifications)
    }

    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }

    /// Stops the tick tasks and waits for them to finish. Idempotent; the
    /// services themselves stay usable for direct reads and mutations.
    pub async fn shutdown(&self) {
        self.shutdown_token.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut tickers = self.tickers.lock().expect("Registry ticker lock poisoned");
            tickers.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
        log::info!("Live services shut down.");
    }
}

/// Select loop driving one service's periodic mutation. Ticks are
/// independent; if one runs long the timer delays rather than bursting to
/// catch up.
async fn run_ticker<F>(name: &'static str, period: Duration, shutdown: CancellationToken, mut tick: F)
where
    F: FnMut() + Send,
{
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; swallow that so the seeded state stands
    // for one full period
    timer.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::info!("{} ticker received shutdown signal.", name);
                break;
            }
            _ = timer.tick() => tick(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_invalid_config() {
        let config = LiveConfig {
            analytics_tick_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            ServiceRegistry::new(config),
            Err(LiveError::InvalidConfig(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn tickers_drive_mutation_and_stop_on_shutdown() {
        let registry = ServiceRegistry::new(LiveConfig {
            market_tick_secs: 1,
            analytics_tick_secs: 1,
            ..Default::default()
        })
        .unwrap();

        let market = registry.market();
        let before = market.current_prices();

        // Two periods of paused time; tick tasks run on the same runtime
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let after = market.current_prices();
        assert!(after
            .iter()
            .any(|r| before.iter().any(|b| b.product == r.product && b.last_updated < r.last_updated)));

        registry.shutdown().await;

        let frozen = market.current_prices();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(market.current_prices(), frozen);
    }
}
