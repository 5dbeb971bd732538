//! # Weather Service
//!
//! Pull-based weather data with a fixed TTL cache. Unlike the other three
//! domains this service has no subscriber list: consumers call
//! [`WeatherService::get_weather`] on demand and the cache absorbs repeat
//! lookups. The fetch is simulated with a short artificial delay and
//! synthetic bounded-random values; in a real deployment this is where the
//! upstream HTTP call would live.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::error::LiveError;

/// Condition labels the simulation draws from.
pub const CONDITION_LABELS: [&str; 4] = ["Sunny", "Partly Cloudy", "Cloudy", "Light Rain"];

const FORECAST_DAYS: [&str; 5] = ["Today", "Tomorrow", "Wednesday", "Thursday", "Friday"];

/// One day of the five-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub day: String,
    pub high: i32,
    pub low: i32,
    pub conditions: String,
}

/// Current conditions plus forecast and active alerts for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Degrees Fahrenheit, 65-85 in the simulation.
    pub temperature: i32,
    /// Percent relative humidity, 40-80 in the simulation.
    pub humidity: i32,
    pub conditions: String,
    pub forecast: Vec<ForecastDay>,
    pub alerts: Vec<String>,
    /// When this record was synthesized. Advances on every cache refresh.
    pub fetched_at: DateTime<Utc>,
}

struct CacheEntry {
    data: WeatherData,
    stored_at: Instant,
}

/// TTL-cached weather lookups, keyed by location string.
pub struct WeatherService {
    cache: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    fetch_delay: Duration,
}

impl WeatherService {
    pub fn new(ttl: Duration, fetch_delay: Duration) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            ttl,
            fetch_delay,
        }
    }

    /// Returns the cached record for `location` if it is younger than the
    /// TTL, otherwise fetches a fresh one and stores it under that key.
    ///
    /// The cache lock is not held across the simulated fetch, so concurrent
    /// calls for different locations do not contend. Two calls racing on the
    /// same expired key both fetch; the last writer wins, which is acceptable
    /// for synthetic data.
    pub async fn get_weather(&self, location: &str) -> Result<WeatherData, LiveError> {
        if location.trim().is_empty() {
            return Err(LiveError::InvalidLocation);
        }

        if let Some(hit) = self.cached(location) {
            log::debug!("Weather cache hit for '{}'", location);
            return Ok(hit);
        }

        log::debug!("Weather cache miss for '{}', fetching", location);
        sleep(self.fetch_delay).await;
        let data = synthesize();

        let mut cache = self.cache.lock().expect("Weather cache lock poisoned");
        cache.insert(
            location.to_string(),
            CacheEntry {
                data: data.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(data)
    }

    /// Just the alert strings for `location`, fetching through the same cache.
    pub async fn get_alerts(&self, location: &str) -> Result<Vec<String>, LiveError> {
        Ok(self.get_weather(location).await?.alerts)
    }

    fn cached(&self, location: &str) -> Option<WeatherData> {
        let cache = self.cache.lock().expect("Weather cache lock poisoned");
        cache
            .get(location)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.data.clone())
    }
}

fn synthesize() -> WeatherData {
    let mut rng = rand::rng();

    let forecast = FORECAST_DAYS
        .iter()
        .map(|day| ForecastDay {
            day: (*day).to_string(),
            high: rng.random_range(70..=85),
            low: rng.random_range(50..=65),
            conditions: CONDITION_LABELS[rng.random_range(0..CONDITION_LABELS.len())].to_string(),
        })
        .collect();

    let alerts = if rng.random_bool(0.3) {
        vec!["Heavy rain expected in next 24 hours".to_string()]
    } else {
        Vec::new()
    };

    WeatherData {
        temperature: rng.random_range(65..=85),
        humidity: rng.random_range(40..=80),
        conditions: CONDITION_LABELS[rng.random_range(0..CONDITION_LABELS.len())].to_string(),
        forecast,
        alerts,
        fetched_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synthesized_values_stay_in_bounds() {
        let service = WeatherService::new(Duration::from_secs(600), Duration::ZERO);
        let weather = service.get_weather("Salinas Valley").await.unwrap();

        assert!((65..=85).contains(&weather.temperature));
        assert!((40..=80).contains(&weather.humidity));
        assert!(CONDITION_LABELS.contains(&weather.conditions.as_str()));
        assert_eq!(weather.forecast.len(), 5);
        for day in &weather.forecast {
            assert!((70..=85).contains(&day.high));
            assert!((50..=65).contains(&day.low));
        }
    }

    #[tokio::test]
    async fn empty_location_is_rejected() {
        let service = WeatherService::new(Duration::from_secs(600), Duration::ZERO);
        assert!(matches!(
            service.get_weather("  ").await,
            Err(LiveError::InvalidLocation)
        ));
    }
}
