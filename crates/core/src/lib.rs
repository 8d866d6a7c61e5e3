//! Core engine for upgradarr.
//!
//! Scans Radarr and Sonarr instances for items whose acquired file falls
//! below their quality profile's cutoff, then triggers a bounded,
//! randomized set of upgrade searches while honoring a per-item cooldown
//! window persisted across runs.

pub mod client;
pub mod config;
pub mod eligibility;
pub mod history;
pub mod orchestrator;
pub mod selector;
pub mod testing;

pub use client::{CatalogItem, ClientError, LibraryClient, RadarrClient, SonarrClient};
pub use config::{
    load_config, scan_instances, settings_from, Config, ConfigError, InstanceConfig, InstanceId,
    InstanceKind, Settings,
};
pub use eligibility::eligible_items;
pub use history::{HistoryError, SearchHistory};
pub use orchestrator::{InstanceReport, ManagedInstance, RunError, RunOrchestrator, RunSummary};
pub use selector::{select_upgrades, InstanceCap, RunBudget};
