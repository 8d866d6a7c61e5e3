//! Run orchestrator implementation.
//!
//! Instances are processed strictly one at a time, in configuration
//! order, with a pacing sleep in between. The global upgrade budget is
//! the only state shared between instances.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{CatalogItem, LibraryClient};
use crate::config::{InstanceId, Settings};
use crate::eligibility::eligible_items;
use crate::history::SearchHistory;
use crate::selector::{select_upgrades, InstanceCap, RunBudget};

use super::types::{InstanceReport, RunError, RunSummary};

/// One instance ready to be processed: its client plus its cap.
pub struct ManagedInstance {
    pub cap: InstanceCap,
    pub client: Arc<dyn LibraryClient>,
}

/// Drives one full run over the configured instances.
pub struct RunOrchestrator<R: Rng> {
    settings: Settings,
    instances: Vec<ManagedInstance>,
    history: SearchHistory,
    rng: R,
}

impl<R: Rng> RunOrchestrator<R> {
    pub fn new(
        settings: Settings,
        instances: Vec<ManagedInstance>,
        history: SearchHistory,
        rng: R,
    ) -> Self {
        Self {
            settings,
            instances,
            history,
            rng,
        }
    }

    /// The history store as it stands after the last run.
    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Execute one run and flush the history store.
    pub async fn run(&mut self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let started_at = Utc::now();

        let mut budget = RunBudget::new(self.settings.max_upgrades);
        if budget.is_exhausted() {
            info!("Global upgrade limit is 0, no searches will be triggered this run");
        }
        if self.settings.dry_run {
            info!("Dry run enabled, no search commands will be sent");
        }

        let total = self.instances.len();
        let mut reports = Vec::with_capacity(total);
        for idx in 0..total {
            reports.push(self.process_instance(idx, &mut budget).await);
            if idx + 1 < total {
                self.pace().await;
            }
        }

        if self.settings.dry_run {
            info!("Dry run, search history left untouched");
        } else {
            self.history.save()?;
        }

        let summary = RunSummary {
            started_at,
            dry_run: self.settings.dry_run,
            instances: reports,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            instances = summary.instances.len(),
            selected = summary.total_selected(),
            skipped = summary.skipped_instances(),
            duration_ms = summary.duration_ms,
            "Run complete"
        );
        Ok(summary)
    }

    async fn process_instance(&mut self, idx: usize, budget: &mut RunBudget) -> InstanceReport {
        let client = Arc::clone(&self.instances[idx].client);
        let cap = self.instances[idx].cap;
        let id = *client.instance_id();
        let mut report = InstanceReport::new(id.to_string(), client.url().to_string());

        info!(instance = %id, url = %client.url(), "Processing instance");

        if let Err(e) = client.ping().await {
            warn!(instance = %id, error = %e, "Instance unreachable, skipping");
            report.error = Some(e.to_string());
            return report;
        }

        let catalog = match client.list_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(instance = %id, error = %e, "Catalog fetch failed, skipping instance");
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.catalog_size = catalog.len();

        let now = Utc::now();
        let cooldown = self.settings.cooldown();
        let eligible = eligible_items(&catalog, &id, now, cooldown, &self.history);
        report.eligible = eligible.len();
        debug!(instance = %id, catalog = catalog.len(), eligible = eligible.len(),
            "Eligibility computed");

        if self.settings.debug_mode {
            self.write_debug_dump(&id, &catalog, now, cooldown);
        }

        let selected = select_upgrades(&eligible, cap, budget, &mut self.rng);
        report.selected = selected.len();
        if selected.is_empty() {
            info!(instance = %id, eligible = eligible.len(), "Nothing selected");
            return report;
        }

        for item in &selected {
            info!(instance = %id, item = item.id, title = %item.title,
                "Queueing upgrade search");
        }

        if self.settings.dry_run {
            info!(instance = %id, items = selected.len(),
                "Dry run, search command not sent");
        } else {
            let item_ids: Vec<u64> = selected.iter().map(|item| item.id).collect();
            match client.trigger_search(&item_ids).await {
                Ok(()) => {
                    report.triggered = true;
                    for item in &selected {
                        self.history.record(&id, item.id, now);
                    }
                    info!(instance = %id, items = item_ids.len(), "Search command sent");
                }
                Err(e) => {
                    // Nothing was searched, so nothing is recorded and
                    // the budget keeps its slots.
                    warn!(instance = %id, error = %e, "Search command failed");
                    report.selected = 0;
                    report.error = Some(e.to_string());
                    return report;
                }
            }
        }

        budget.consume(selected.len());
        report
    }

    /// Blocking pause between instances, an admission-control measure for
    /// the indexers and download clients sitting behind the remotes.
    async fn pace(&self) {
        let delay = self.settings.delay_between_instances;
        if delay == 0 {
            return;
        }
        if self.settings.dry_run {
            debug!("Dry run, skipping pacing delay");
            return;
        }
        info!(seconds = delay, "Waiting before next instance");
        tokio::time::sleep(Duration::from_secs(delay)).await;
    }

    fn write_debug_dump(
        &self,
        id: &InstanceId,
        catalog: &[CatalogItem],
        now: DateTime<Utc>,
        cooldown: chrono::Duration,
    ) {
        #[derive(Serialize)]
        struct DumpEntry<'a> {
            id: u64,
            title: &'a str,
            quality_profile_id: u64,
            cutoff_met: bool,
            cooling_down: bool,
            eligible: bool,
        }

        let entries: Vec<DumpEntry> = catalog
            .iter()
            .map(|item| {
                let cooling_down = self.history.is_cooling_down(id, item.id, now, cooldown);
                DumpEntry {
                    id: item.id,
                    title: &item.title,
                    quality_profile_id: item.quality_profile_id,
                    cutoff_met: item.cutoff_met,
                    cooling_down,
                    eligible: !item.cutoff_met && !cooling_down,
                }
            })
            .collect();

        let path = self.settings.debug_dir.join(format!("{id}_catalog.json"));
        let written = serde_json::to_string_pretty(&entries)
            .map_err(|e| e.to_string())
            .and_then(|payload| fs::write(&path, payload).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!(instance = %id, path = %path.display(), "Wrote catalog dump"),
            Err(e) => warn!(instance = %id, error = %e, "Failed to write catalog dump"),
        }
    }
}
