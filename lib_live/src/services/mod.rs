//! # Domain Services
//!
//! The four concrete services behind the live-data simulation:
//!
//! - **`weather`**: pull-based cache with a TTL. The only service with no
//!   subscription mechanism and the only suspending call in this crate.
//! - **`market`**: keyed price table, periodic bounded random walk.
//! - **`notifications`**: bounded newest-first log with read/unread flags.
//! - **`analytics`**: counter table nudged every tick, clamped at zero.
//!
//! Market, notifications and analytics push full-table snapshots through a
//! [`crate::broadcast::Broadcaster`]; their periodic ticks are driven by the
//! [`crate::registry::ServiceRegistry`].

pub mod analytics;
pub mod market;
pub mod notifications;
pub mod weather;
