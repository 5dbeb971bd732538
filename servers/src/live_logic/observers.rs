//! Logging subscribers for the push-based services. These are the server's
//! stand-in for the UI components that would normally mount and subscribe.

use lib_live::services::analytics::{METRIC_ACTIVE_USERS, METRIC_ORDERS_TODAY};
use lib_live::{ServiceRegistry, SubscriptionId};

/// Attaches one logging subscriber per push-based service and returns the
/// subscription handles (kept alive for the process lifetime).
pub fn attach(registry: &ServiceRegistry) -> Vec<SubscriptionId> {
    let market_sub = registry.market().subscribe(|prices| {
        let movers = prices.iter().filter(|p| p.change.abs() > 0.0).count();
        log::info!("Market snapshot: {} products, {} moved", prices.len(), movers);
        for price in &prices {
            log::debug!(
                "  {} ${:.2} ({:+.2} / {:+.2}%)",
                price.product,
                price.price,
                price.change,
                price.change_percent
            );
        }
    });

    let notification_sub = registry.notifications().subscribe(|entries| {
        let unread = entries.iter().filter(|n| !n.read).count();
        log::info!("Notification snapshot: {} entries, {} unread", entries.len(), unread);
    });

    let analytics_sub = registry.analytics().subscribe(|metrics| {
        log::info!(
            "Analytics snapshot: activeUsers={:.0} ordersToday={:.0}",
            metrics.get(METRIC_ACTIVE_USERS).copied().unwrap_or(0.0),
            metrics.get(METRIC_ORDERS_TODAY).copied().unwrap_or(0.0)
        );
    });

    vec![market_sub, notification_sub, analytics_sub]
}
