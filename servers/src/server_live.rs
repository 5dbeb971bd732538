use anyhow::Result;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use lib_live::ServiceRegistry;

mod live_logic;
use live_logic::{config, observers, weather_probe};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();

    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let registry = ServiceRegistry::new(config.to_live_config())?;

    // Stand-ins for the UI components that would subscribe on mount
    let _subscriptions = observers::attach(&registry);

    let probe_shutdown = CancellationToken::new();
    let probe_handle = tokio::spawn(weather_probe::run(
        config.location.clone().unwrap_or_else(|| "Salinas Valley".to_string()),
        Duration::from_secs(config.weather_probe_secs.unwrap_or(300)),
        registry.weather(),
        registry.notifications(),
        probe_shutdown.clone(),
    ));

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut term_signal = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();
                term_signal.recv().await;
                log::info!("SIGTERM received, initiating shutdown.");
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    probe_shutdown.cancel();
    let _ = probe_handle.await;
    registry.shutdown().await;

    log::info!("Shutdown complete.");
    Ok(())
}
