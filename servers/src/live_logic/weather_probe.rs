//! Periodic weather probe. Polls the pull-based weather service for the
//! configured location and raises a high-priority notification when a new
//! alert appears, mirroring what the dashboard's weather widget does.

use std::sync::Arc;
use std::time::Duration;

use lib_live::services::notifications::{NotificationDraft, NotificationKind, Priority};
use lib_live::services::weather::WeatherService;
use lib_live::NotificationService;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

pub async fn run(
    location: String,
    period: Duration,
    weather: Arc<WeatherService>,
    notifications: Arc<NotificationService>,
    shutdown: CancellationToken,
) {
    let mut timer = interval(period);
    let mut last_alerts: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::info!("Weather probe received shutdown signal.");
                break;
            }
            _ = timer.tick() => {
                match weather.get_weather(&location).await {
                    Ok(data) => {
                        log::info!(
                            "Weather for '{}': {}F, {}% humidity, {}",
                            location, data.temperature, data.humidity, data.conditions
                        );
                        if data.alerts != last_alerts {
                            for alert in &data.alerts {
                                notifications.add(NotificationDraft::new(
                                    NotificationKind::Weather,
                                    "Weather Alert",
                                    alert.clone(),
                                    Priority::High,
                                ));
                            }
                            last_alerts = data.alerts;
                        }
                    }
                    Err(e) => {
                        // The probe does not retry early; the next tick will
                        log::error!("Weather probe failed for '{}': {}", location, e);
                    }
                }
            }
        }
    }
}
