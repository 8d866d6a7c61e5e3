use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::selector::InstanceCap;

/// Which kind of library manager an instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    Radarr,
    Sonarr,
}

impl InstanceKind {
    /// Environment variable prefix for this kind's numbered instance blocks.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            InstanceKind::Radarr => "RADARR",
            InstanceKind::Sonarr => "SONARR",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKind::Radarr => write!(f, "radarr"),
            InstanceKind::Sonarr => write!(f, "sonarr"),
        }
    }
}

/// Identity of one configured instance: kind plus ordinal index.
///
/// Displays as `radarr0`, `sonarr1`, ... and forms the instance half of
/// history keys, so it must stay stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub kind: InstanceKind,
    pub ordinal: usize,
}

impl InstanceId {
    pub fn new(kind: InstanceKind, ordinal: usize) -> Self {
        Self { kind, ordinal }
    }

    /// History key for an item on this instance.
    pub fn history_key(&self, item_id: u64) -> String {
        format!("{}-{}", self, item_id)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.ordinal)
    }
}

/// One connected library manager endpoint, immutable for the run.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub id: InstanceId,
    /// Base URL, stored without a trailing slash.
    pub url: String,
    pub api_key: String,
    /// Per-instance upgrade cap. `Limit(0)` disables selection for this
    /// instance; a missing or negative `NUM_TO_UPGRADE` means unlimited.
    pub upgrade_cap: InstanceCap,
}

/// Scalar settings, read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Global upgrade cap across all instances. 0 disables every search,
    /// a negative value removes the limit.
    #[serde(default = "default_max_upgrades")]
    pub max_upgrades: i64,

    /// Compute selections but never send a search command, and leave the
    /// search history untouched.
    #[serde(default)]
    pub dry_run: bool,

    /// Write a per-instance dump of the catalog with eligibility flags.
    #[serde(default)]
    pub debug_mode: bool,

    /// Seconds to sleep between instances.
    #[serde(default = "default_delay_between_instances")]
    pub delay_between_instances: u64,

    /// Minimum age in days before an already-searched item may be
    /// searched again. Negative values clamp to zero.
    #[serde(default = "default_history_cooldown_days")]
    pub history_cooldown_days: i64,

    /// Path of the search history store.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Directory the debug dumps are written to.
    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,

    /// Timeout for every remote request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Cooldown window as a duration.
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::days(self.history_cooldown_days.max(0))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_upgrades: default_max_upgrades(),
            dry_run: false,
            debug_mode: false,
            delay_between_instances: default_delay_between_instances(),
            history_cooldown_days: default_history_cooldown_days(),
            history_file: default_history_file(),
            debug_dir: default_debug_dir(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_max_upgrades() -> i64 {
    20
}

fn default_delay_between_instances() -> u64 {
    10
}

fn default_history_cooldown_days() -> i64 {
    30
}

fn default_history_file() -> PathBuf {
    PathBuf::from("search_history.json")
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_http_timeout_secs() -> u64 {
    30
}

/// Root configuration: scalar settings plus the discovered instances,
/// Radarr blocks first, then Sonarr, each in ordinal order.
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub instances: Vec<InstanceConfig>,
}
