//! Types for the run orchestrator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::history::HistoryError;

/// Errors that make a run fail as a whole. Remote failures are not among
/// them; those skip the affected instance and show up in the report.
#[derive(Debug, Error)]
pub enum RunError {
    /// Freshly recorded searches could not be persisted.
    #[error("history store error: {0}")]
    History(#[from] HistoryError),
}

/// What happened on a single instance during a run.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    /// Instance identity, e.g. `radarr0`.
    pub instance: String,
    pub url: String,
    /// Items fetched from the instance.
    pub catalog_size: usize,
    /// Items below cutoff and outside the cooldown window.
    pub eligible: usize,
    /// Items whose search went through this run (or would have, under
    /// dry-run). Zero when the search command failed.
    pub selected: usize,
    /// Whether a search command reached the instance.
    pub triggered: bool,
    /// Set when the instance was skipped or its search command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceReport {
    pub(crate) fn new(instance: String, url: String) -> Self {
        Self {
            instance,
            url,
            catalog_size: 0,
            eligible: 0,
            selected: 0,
            triggered: false,
            error: None,
        }
    }
}

/// Aggregated outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub instances: Vec<InstanceReport>,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Total items selected across all instances.
    pub fn total_selected(&self) -> usize {
        self.instances.iter().map(|report| report.selected).sum()
    }

    /// Instances that could not be processed.
    pub fn skipped_instances(&self) -> usize {
        self.instances
            .iter()
            .filter(|report| report.error.is_some())
            .count()
    }
}
