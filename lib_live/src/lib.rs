//! # lib_live
//!
//! In-process simulation of a live-data backend for the marketplace UI.
//! One [`ServiceRegistry`] owns four domain services:
//!
//! - **weather**: pull-based cache with a TTL (no subscribers, by design),
//! - **market**: keyed price table mutated by a periodic random walk,
//! - **notifications**: bounded newest-first log with read/unread state,
//! - **analytics**: counter table nudged by a periodic tick.
//!
//! The push-based services share the [`Broadcaster`] primitive: subscribers
//! register a callback, receive a synchronous snapshot immediately, and get a
//! fresh snapshot on every tick or mutation until they unsubscribe.

// Declare the modules to re-export
pub mod broadcast;
pub mod config;
pub mod error;
pub mod registry;
pub mod services;

// Re-export the public surface
pub use broadcast::{Broadcaster, SubscriptionId};
pub use config::LiveConfig;
pub use error::LiveError;
pub use registry::ServiceRegistry;
pub use services::analytics::{AnalyticsService, MetricDeltas};
pub use services::market::{MarketPrice, MarketPriceService};
pub use services::notifications::{
    Notification, NotificationDraft, NotificationKind, NotificationService, Priority,
};
pub use services::weather::{ForecastDay, WeatherData, WeatherService};
