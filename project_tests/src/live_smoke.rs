//! # Live Services Smoke Run
//!
//! Spins up the full service registry with short tick periods, exercises
//! every service once and prints what came back. Exits non-zero if any
//! observable contract is broken.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lib_live::services::notifications::{NotificationDraft, NotificationKind, Priority};
use lib_live::{LiveConfig, ServiceRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // // Statement: One-second ticks so the smoke run completes quickly
    let registry = ServiceRegistry::new(LiveConfig {
        market_tick_secs: 1,
        analytics_tick_secs: 1,
        weather_ttl_secs: 600,
        weather_fetch_delay_ms: 50,
    })?;

    println!("[*] Fetching weather for Salinas Valley...");
    let weather = registry.weather().get_weather("Salinas Valley").await?;
    println!("{}", serde_json::to_string_pretty(&weather)?);

    // // Statement: Cached call must return the identical record
    let cached = registry.weather().get_weather("Salinas Valley").await?;
    if cached != weather {
        eprintln!("[ERROR] Weather cache returned a different record inside the TTL");
        std::process::exit(1);
    }

    println!("[*] Subscribing to market and analytics snapshots...");
    let market_hits = Arc::new(AtomicUsize::new(0));
    let analytics_hits = Arc::new(AtomicUsize::new(0));

    let market_hits_cb = Arc::clone(&market_hits);
    registry.market().subscribe(move |prices| {
        market_hits_cb.fetch_add(1, Ordering::SeqCst);
        log::info!("market snapshot with {} products", prices.len());
    });

    let analytics_hits_cb = Arc::clone(&analytics_hits);
    registry.analytics().subscribe(move |metrics| {
        analytics_hits_cb.fetch_add(1, Ordering::SeqCst);
        log::info!("analytics snapshot with {} metrics", metrics.len());
    });

    // // Statement: Initial snapshots arrive synchronously, before any tick
    if market_hits.load(Ordering::SeqCst) != 1 || analytics_hits.load(Ordering::SeqCst) != 1 {
        eprintln!("[ERROR] Initial snapshot was not delivered synchronously");
        std::process::exit(1);
    }

    println!("[*] Waiting for three tick periods...");
    tokio::time::sleep(Duration::from_millis(3500)).await;

    if market_hits.load(Ordering::SeqCst) < 2 || analytics_hits.load(Ordering::SeqCst) < 2 {
        eprintln!("[ERROR] Tickers did not push any snapshots");
        std::process::exit(1);
    }

    println!("[*] Exercising the notification log...");
    let notifications = registry.notifications();
    let before = notifications.unread_count();
    notifications.add(NotificationDraft::new(
        NotificationKind::Order,
        "New Order",
        "Smoke-run order for organic lettuce",
        Priority::Medium,
    ));
    if notifications.unread_count() != before + 1 {
        eprintln!("[ERROR] Unread count did not increase after add");
        std::process::exit(1);
    }
    notifications.mark_all_as_read();
    if notifications.unread_count() != 0 {
        eprintln!("[ERROR] Unread count is not zero after mark_all_as_read");
        std::process::exit(1);
    }

    // // Statement: Prices must stay positive through the observed ticks
    for price in registry.market().current_prices() {
        if price.price <= 0.0 {
            eprintln!("[ERROR] {} has a non-positive price: {}", price.product, price.price);
            std::process::exit(1);
        }
    }

    registry.shutdown().await;

    println!("\n[SUCCESS] Live services smoke run completed:");
    println!("-----------------------------------------------");
    println!(
        "market snapshots: {}, analytics snapshots: {}",
        market_hits.load(Ordering::SeqCst),
        analytics_hits.load(Ordering::SeqCst)
    );
    println!("-----------------------------------------------");

    Ok(())
}
