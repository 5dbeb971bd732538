use clap::Parser;
use lib_live::LiveConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Live-data simulation server for the marketplace", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "LIVE_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "LIVE_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "LIVE_MARKET_TICK_SECS", help = "Period of the market price random walk in seconds.")]
    pub market_tick_secs: Option<u64>,

    #[clap(long, env = "LIVE_ANALYTICS_TICK_SECS", help = "Period of the analytics counter tick in seconds.")]
    pub analytics_tick_secs: Option<u64>,

    #[clap(long, env = "LIVE_WEATHER_TTL_SECS", help = "Maximum age of a cached weather record in seconds.")]
    pub weather_ttl_secs: Option<u64>,

    #[clap(long, env = "LIVE_WEATHER_FETCH_DELAY_MS", help = "Artificial latency of the simulated weather fetch in milliseconds.")]
    pub weather_fetch_delay_ms: Option<u64>,

    #[clap(long, env = "LIVE_WEATHER_PROBE_SECS", help = "Period of the periodic weather probe in seconds.")]
    pub weather_probe_secs: Option<u64>,

    #[clap(long, env = "LIVE_LOCATION", help = "Location key used by the periodic weather probe.")]
    pub location: Option<String>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            log_level: other.log_level.or(self.log_level),
            market_tick_secs: other.market_tick_secs.or(self.market_tick_secs),
            analytics_tick_secs: other.analytics_tick_secs.or(self.analytics_tick_secs),
            weather_ttl_secs: other.weather_ttl_secs.or(self.weather_ttl_secs),
            weather_fetch_delay_ms: other.weather_fetch_delay_ms.or(self.weather_fetch_delay_ms),
            weather_probe_secs: other.weather_probe_secs.or(self.weather_probe_secs),
            location: other.location.or(self.location),
        }
    }

    /// The library-facing slice of this config, with defaults filled in.
    pub fn to_live_config(&self) -> LiveConfig {
        let defaults = LiveConfig::default();
        LiveConfig {
            market_tick_secs: self.market_tick_secs.unwrap_or(defaults.market_tick_secs),
            analytics_tick_secs: self
                .analytics_tick_secs
                .unwrap_or(defaults.analytics_tick_secs),
            weather_ttl_secs: self.weather_ttl_secs.unwrap_or(defaults.weather_ttl_secs),
            weather_fetch_delay_ms: self
                .weather_fetch_delay_ms
                .unwrap_or(defaults.weather_fetch_delay_ms),
        }
    }
}

pub fn load_config() -> Config {
    // 1. Load defaults
    let default_config = Config {
        log_level: Some("info".to_string()),
        weather_probe_secs: Some(300),
        location: Some("Salinas Valley".to_string()),
        ..Default::default()
    };

    // 2. Load from config file (server_live.conf) if present.
    //    Allow overriding default config file path with CLI arg.
    let cli_args_for_path = Config::parse();

    let config_file_path = cli_args_for_path
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("server_live.conf"));

    let mut current_config = default_config;

    if config_file_path.exists() {
        if let Ok(config_str) = fs::read_to_string(&config_file_path) {
            if let Ok(file_config) = serde_json::from_str::<Config>(&config_str) {
                current_config = current_config.merge(file_config);
            } else {
                log::warn!(
                    "Failed to parse config file: {}. Falling back to other sources.",
                    config_file_path.display()
                );
            }
        } else {
            log::warn!(
                "Failed to read config file: {}. Falling back to other sources.",
                config_file_path.display()
            );
        }
    } else {
        log::info!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            config_file_path.display()
        );
    }

    // 3. Override with environment variables and CLI arguments
    let cli_args_final = Config::parse();
    current_config.merge(cli_args_final)
}
