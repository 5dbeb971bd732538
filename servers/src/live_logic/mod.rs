pub mod config;
pub mod observers;
pub mod weather_probe;
