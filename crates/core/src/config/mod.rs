//! Environment-sourced configuration.
//!
//! Scalar settings come from flat variables (`MAX_UPGRADES`, `DRY_RUN`,
//! ...); instances are declared as numbered blocks (`RADARR0_URL`,
//! `RADARR0_API_KEY`, optionally `RADARR0_NUM_TO_UPGRADE`, then
//! `RADARR1_...` and so on, same scheme for `SONARR`).

mod loader;
mod types;

pub use loader::{load_config, scan_instances, settings_from};
pub use types::{Config, InstanceConfig, InstanceId, InstanceKind, Settings};

use thiserror::Error;

/// Errors that abort a run before any instance is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from environment: {0}")]
    Settings(String),

    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: String, value: String },
}
