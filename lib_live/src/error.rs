//! Library error type.
//!
//! The taxonomy is deliberately narrow: lookup misses (unknown notification
//! id, unknown metric) are silent no-ops per the service contracts, and
//! subscriber failures are isolated inside the broadcaster. What remains is
//! caller misuse.

use thiserror::Error;

/// Errors surfaced by the live-data services.
#[derive(Debug, Error)]
pub enum LiveError {
    /// A configuration value would make a service inoperable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Weather lookups require a non-empty location key.
    #[error("weather location must not be empty")]
    InvalidLocation,
}
