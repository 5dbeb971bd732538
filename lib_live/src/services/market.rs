//! # Market Price Service
//!
//! Wholesale price table keyed by product name. Every tick applies a small
//! bounded random delta to each price, recomputes the change fields against
//! the pre-tick price, stamps a new update time and pushes the full table to
//! subscribers. Reads never block a tick and never trigger one.
//!
//! Invariant: a price never goes non-positive. The walk floors at
//! [`MIN_PRICE`].

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::broadcast::{Broadcaster, SubscriptionId};

/// Products seeded by [`MarketPriceService::new`].
pub const DEFAULT_PRODUCTS: [&str; 8] = [
    "Organic Tomatoes",
    "Fresh Lettuce",
    "Organic Carrots",
    "Sweet Corn",
    "Bell Peppers",
    "Organic Spinach",
    "Strawberries",
    "Blueberries",
];

/// Floor for the random walk. Prices never drop below this.
pub const MIN_PRICE: f64 = 0.50;

/// Per-tick delta bound: each tick moves a price by at most this much.
pub const MAX_TICK_DELTA: f64 = 0.10;

const MARKET_LABEL: &str = "USDA Wholesale";

/// One row of the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPrice {
    pub product: String,
    /// Dollars, rounded to cents.
    pub price: f64,
    /// Absolute move of the last tick, relative to the pre-tick price.
    pub change: f64,
    /// Percent move of the last tick, relative to the pre-tick price.
    pub change_percent: f64,
    pub market: String,
    pub last_updated: DateTime<Utc>,
}

/// Keyed price table plus its snapshot broadcaster.
pub struct MarketPriceService {
    prices: Mutex<HashMap<String, MarketPrice>>,
    broadcaster: Broadcaster<Vec<MarketPrice>>,
}

impl MarketPriceService {
    /// Seeds one record per default product with bounded-random starting
    /// values ($2-10, change within -1..+1, percent within -10..+10).
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let seed = DEFAULT_PRODUCTS.iter().map(|product| MarketPrice {
            product: (*product).to_string(),
            price: round_cents(rng.random_range(2.0..10.0)),
            change: round_cents(rng.random_range(-1.0..1.0)),
            change_percent: round_cents(rng.random_range(-10.0..10.0)),
            market: MARKET_LABEL.to_string(),
            last_updated: Utc::now(),
        });
        Self::with_prices(seed)
    }

    /// Builds the table from explicit records. Used by tests and anything
    /// that wants a non-default product set.
    pub fn with_prices(seed: impl IntoIterator<Item = MarketPrice>) -> Self {
        let prices = seed
            .into_iter()
            .map(|record| (record.product.clone(), record))
            .collect();
        Self {
            prices: Mutex::new(prices),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Convenience seed: `(product, price)` pairs with zeroed change fields.
    pub fn with_seed_prices<'a>(seed: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::with_prices(seed.into_iter().map(|(product, price)| MarketPrice {
            product: product.to_string(),
            price,
            change: 0.0,
            change_percent: 0.0,
            market: MARKET_LABEL.to_string(),
            last_updated: Utc::now(),
        }))
    }

    /// Registers a subscriber; it receives the current table synchronously
    /// before this call returns, then a fresh snapshot after every tick.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Vec<MarketPrice>) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(self.current_prices(), callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }

    /// Current table snapshot. Never blocks on or triggers a tick.
    pub fn current_prices(&self) -> Vec<MarketPrice> {
        self.prices
            .lock()
            .expect("Market price lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn price_for(&self, product: &str) -> Option<MarketPrice> {
        self.prices
            .lock()
            .expect("Market price lock poisoned")
            .get(product)
            .cloned()
    }

    /// One periodic tick with random deltas. Driven by the registry ticker.
    pub fn random_tick(&self) {
        let mut rng = rand::rng();
        self.apply_tick(|_| rng.random_range(-MAX_TICK_DELTA..MAX_TICK_DELTA));
    }

    /// Applies `delta` to every record, floors the result at [`MIN_PRICE`],
    /// recomputes the change fields against the pre-tick price, then
    /// notifies subscribers with the updated table.
    pub fn apply_tick<F>(&self, mut delta: F)
    where
        F: FnMut(&MarketPrice) -> f64,
    {
        let snapshot = {
            let mut prices = self.prices.lock().expect("Market price lock poisoned");
            for record in prices.values_mut() {
                let old_price = record.price;
                let new_price = (old_price + delta(record)).max(MIN_PRICE);
                record.price = round_cents(new_price);
                record.change = round_cents(new_price - old_price);
                record.change_percent = round_cents((new_price - old_price) / old_price * 100.0);
                record.last_updated = Utc::now();
            }
            prices.values().cloned().collect::<Vec<_>>()
        };

        log::debug!("Market tick applied to {} products", snapshot.len());
        self.broadcaster.notify(snapshot);
    }
}

impl Default for MarketPriceService {
    fn default() -> Self {
        Self::new()
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_tick_recomputes_change_fields() {
        let service = MarketPriceService::with_seed_prices([("Tomatoes", 5.00)]);

        service.apply_tick(|_| -0.10);

        let record = service.price_for("Tomatoes").unwrap();
        assert!((record.price - 4.90).abs() < 1e-9);
        assert!((record.change - (-0.10)).abs() < 1e-9);
        assert!((record.change_percent - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn price_floors_at_minimum_and_stays_positive() {
        let service = MarketPriceService::with_seed_prices([("Sweet Corn", 1.00)]);

        for _ in 0..100 {
            service.apply_tick(|_| -1.0);
            let record = service.price_for("Sweet Corn").unwrap();
            assert!(record.price > 0.0);
            assert!(record.price >= MIN_PRICE);
        }
    }

    #[test]
    fn change_is_relative_to_pre_tick_price() {
        let service = MarketPriceService::with_seed_prices([("Blueberries", 4.00)]);

        service.apply_tick(|_| 1.00);
        service.apply_tick(|_| 1.00);

        // Second tick: 5.00 -> 6.00, so change must not accumulate to 2.00
        let record = service.price_for("Blueberries").unwrap();
        assert!((record.price - 6.00).abs() < 1e-9);
        assert!((record.change - 1.00).abs() < 1e-9);
        assert!((record.change_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn default_seed_covers_all_products_within_bounds() {
        let service = MarketPriceService::new();
        let prices = service.current_prices();

        assert_eq!(prices.len(), DEFAULT_PRODUCTS.len());
        for record in prices {
            assert!((2.0..=10.0).contains(&record.price));
            assert_eq!(record.market, "USDA Wholesale");
        }
    }
}
