//! # Analytics Service
//!
//! Dashboard counters keyed by metric name. A periodic tick nudges each
//! counter by a small bounded delta and pushes the full table to
//! subscribers. All counters clamp at zero: the upstream behavior this
//! simulates could drift `activeUsers` negative, which is treated here as a
//! bug rather than a behavior to preserve.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;

use crate::broadcast::{Broadcaster, SubscriptionId};

pub const METRIC_ACTIVE_USERS: &str = "activeUsers";
pub const METRIC_ORDERS_TODAY: &str = "ordersToday";
pub const METRIC_REVENUE_TODAY: &str = "revenueToday";
pub const METRIC_NEW_SIGNUPS: &str = "newSignups";
pub const METRIC_AVG_ORDER_VALUE: &str = "avgOrderValue";

/// Probability that a tick records a new signup.
const SIGNUP_PROBABILITY: f64 = 0.2;

/// One tick's worth of counter adjustments. Split out so tests (and the
/// ticker) can drive [`AnalyticsService::apply_deltas`] deterministically.
#[derive(Debug, Clone, Copy)]
pub struct MetricDeltas {
    pub active_users: f64,
    pub orders_today: f64,
    pub revenue_today: f64,
    pub new_signup: bool,
}

impl MetricDeltas {
    /// Bounded random deltas matching the simulated dashboard: active users
    /// drift both ways, orders and revenue only accumulate, signups land
    /// probabilistically.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            active_users: rng.random_range(-5..5) as f64,
            orders_today: rng.random_range(0..3) as f64,
            revenue_today: rng.random_range(0..200) as f64,
            new_signup: rng.random_bool(SIGNUP_PROBABILITY),
        }
    }
}

/// Counter table plus its snapshot broadcaster.
pub struct AnalyticsService {
    metrics: Mutex<HashMap<String, f64>>,
    broadcaster: Broadcaster<HashMap<String, f64>>,
}

impl AnalyticsService {
    /// Seeds the fixed baseline counter set.
    pub fn new() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert(METRIC_ACTIVE_USERS.to_string(), 1247.0);
        metrics.insert(METRIC_ORDERS_TODAY.to_string(), 89.0);
        metrics.insert(METRIC_REVENUE_TODAY.to_string(), 8945.0);
        metrics.insert(METRIC_NEW_SIGNUPS.to_string(), 23.0);
        metrics.insert(METRIC_AVG_ORDER_VALUE.to_string(), 67.5);
        Self {
            metrics: Mutex::new(metrics),
            broadcaster: Broadcaster::new(),
        }
    }

    /// Registers a subscriber; it receives the current counters
    /// synchronously before this call returns, then a snapshot per tick.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(HashMap<String, f64>) + Send + Sync + 'static,
    {
        self.broadcaster.subscribe(self.all_metrics(), callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .lock()
            .expect("Analytics lock poisoned")
            .get(name)
            .copied()
    }

    /// Snapshot of every counter.
    pub fn all_metrics(&self) -> HashMap<String, f64> {
        self.metrics
            .lock()
            .expect("Analytics lock poisoned")
            .clone()
    }

    /// One periodic tick with random deltas. Driven by the registry ticker.
    pub fn random_tick(&self) {
        self.apply_deltas(MetricDeltas::random(&mut rand::rng()));
    }

    /// Applies one tick's adjustments, clamps every counter at zero, then
    /// notifies subscribers with the updated table.
    pub fn apply_deltas(&self, deltas: MetricDeltas) {
        let snapshot = {
            let mut metrics = self.metrics.lock().expect("Analytics lock poisoned");
            nudge(&mut metrics, METRIC_ACTIVE_USERS, deltas.active_users);
            nudge(&mut metrics, METRIC_ORDERS_TODAY, deltas.orders_today);
            nudge(&mut metrics, METRIC_REVENUE_TODAY, deltas.revenue_today);
            if deltas.new_signup {
                nudge(&mut metrics, METRIC_NEW_SIGNUPS, 1.0);
            }
            metrics.clone()
        };

        log::debug!("Analytics tick applied to {} metrics", snapshot.len());
        self.broadcaster.notify(snapshot);
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn nudge(metrics: &mut HashMap<String, f64>, name: &str, delta: f64) {
    if let Some(value) = metrics.get_mut(name) {
        // Counters never go negative, whatever the walk does
        *value = (*value + delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SIGNUP: MetricDeltas = MetricDeltas {
        active_users: 0.0,
        orders_today: 0.0,
        revenue_today: 0.0,
        new_signup: false,
    };

    #[test]
    fn baseline_metrics_are_seeded() {
        let service = AnalyticsService::new();
        assert_eq!(service.metric(METRIC_ACTIVE_USERS), Some(1247.0));
        assert_eq!(service.metric(METRIC_AVG_ORDER_VALUE), Some(67.5));
        assert_eq!(service.metric("noSuchMetric"), None);
    }

    #[test]
    fn counters_clamp_at_zero() {
        let service = AnalyticsService::new();

        // Adversarial walk: far larger than any baseline
        for _ in 0..3 {
            service.apply_deltas(MetricDeltas {
                active_users: -100_000.0,
                orders_today: -100_000.0,
                revenue_today: -100_000.0,
                new_signup: false,
            });
        }

        for (name, value) in service.all_metrics() {
            assert!(value >= 0.0, "{} went negative: {}", name, value);
        }
    }

    #[test]
    fn signups_only_accumulate() {
        let service = AnalyticsService::new();
        let before = service.metric(METRIC_NEW_SIGNUPS).unwrap();

        service.apply_deltas(MetricDeltas {
            new_signup: true,
            ..NO_SIGNUP
        });
        service.apply_deltas(NO_SIGNUP);

        assert_eq!(service.metric(METRIC_NEW_SIGNUPS), Some(before + 1.0));
    }

    #[test]
    fn subscriber_snapshot_is_a_copy() {
        let service = AnalyticsService::new();
        let id = service.subscribe(|mut snapshot| {
            // Mutating the received table must not reach the service
            snapshot.insert(METRIC_ACTIVE_USERS.to_string(), -1.0);
        });
        service.apply_deltas(NO_SIGNUP);
        service.unsubscribe(id);

        assert_eq!(service.metric(METRIC_ACTIVE_USERS), Some(1247.0));
    }
}
