use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::InstanceId;

use super::HistoryError;

/// Durable record of when each item was last searched.
///
/// Backed by a JSON object mapping `"{instance}-{item}"` keys to unix
/// timestamps. Loaded once at run start, mutated in memory, flushed once
/// at run end.
pub struct SearchHistory {
    path: PathBuf,
    entries: HashMap<String, i64>,
}

impl SearchHistory {
    /// Load the history from `path`. A missing or unreadable file is an
    /// empty history, never an error; entries already outside `cooldown`
    /// are dropped on the way in.
    pub fn load(path: impl Into<PathBuf>, now: DateTime<Utc>, cooldown: Duration) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, i64>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e,
                        "Search history unreadable, starting fresh");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No search history found, starting fresh");
                HashMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e,
                    "Failed to read search history, starting fresh");
                HashMap::new()
            }
        };

        let mut history = Self { path, entries };
        let pruned = history.prune(now, cooldown);
        if pruned > 0 {
            info!(pruned, "Dropped expired search history entries");
        }
        history
    }

    /// Drop entries whose cooldown has already lapsed. Stale entries are
    /// harmless either way; the age check stays authoritative.
    pub fn prune(&mut self, now: DateTime<Utc>, cooldown: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, searched_at| within_cooldown(*searched_at, now, cooldown));
        before - self.entries.len()
    }

    /// True iff the item was searched less than `cooldown` ago.
    pub fn is_cooling_down(
        &self,
        instance: &InstanceId,
        item_id: u64,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> bool {
        self.entries
            .get(&instance.history_key(item_id))
            .is_some_and(|searched_at| within_cooldown(*searched_at, now, cooldown))
    }

    /// Record a search, overwriting any previous timestamp for the item.
    pub fn record(&mut self, instance: &InstanceId, item_id: u64, now: DateTime<Utc>) {
        self.entries
            .insert(instance.history_key(item_id), now.timestamp());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist to disk. Writes a sibling temp file and renames it over
    /// the target, so a kill mid-save cannot tear the store.
    pub fn save(&self) -> Result<(), HistoryError> {
        let payload = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload).map_err(|e| HistoryError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| HistoryError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), entries = self.entries.len(),
            "Search history saved");
        Ok(())
    }
}

fn within_cooldown(searched_at: i64, now: DateTime<Utc>, cooldown: Duration) -> bool {
    now.timestamp() - searched_at < cooldown.num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstanceKind;
    use tempfile::TempDir;

    fn radarr0() -> InstanceId {
        InstanceId::new(InstanceKind::Radarr, 0)
    }

    fn days(n: i64) -> Duration {
        Duration::days(n)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = SearchHistory::load(dir.path().join("none.json"), Utc::now(), days(30));
        assert!(history.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        let history = SearchHistory::load(&path, Utc::now(), days(30));
        assert!(history.is_empty());
    }

    #[test]
    fn test_record_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let now = Utc::now();

        let mut history = SearchHistory::load(&path, now, days(30));
        history.record(&radarr0(), 123, now);
        history.record(&radarr0(), 456, now);
        history.save().unwrap();

        let reloaded = SearchHistory::load(&path, now, days(30));
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_cooling_down(&radarr0(), 123, now, days(30)));
        assert!(reloaded.is_cooling_down(&radarr0(), 456, now, days(30)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let now = Utc::now();

        let mut history = SearchHistory::load(&path, now, days(30));
        history.record(&radarr0(), 1, now);
        history.save().unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_cooldown_boundary() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let mut history = SearchHistory::load(dir.path().join("h.json"), now, days(30));

        let searched_at = now - days(30);
        history.record(&radarr0(), 9, searched_at);

        // One second inside the window.
        let just_inside = searched_at + days(30) - Duration::seconds(1);
        assert!(history.is_cooling_down(&radarr0(), 9, just_inside, days(30)));

        // Exactly at the window's edge the cooldown is over.
        let at_boundary = searched_at + days(30);
        assert!(!history.is_cooling_down(&radarr0(), 9, at_boundary, days(30)));
    }

    #[test]
    fn test_unknown_item_is_not_cooling_down() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let history = SearchHistory::load(dir.path().join("h.json"), now, days(30));
        assert!(!history.is_cooling_down(&radarr0(), 777, now, days(30)));
    }

    #[test]
    fn test_record_overwrites_older_timestamp() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let mut history = SearchHistory::load(dir.path().join("h.json"), now, days(30));

        history.record(&radarr0(), 5, now - days(40));
        assert!(!history.is_cooling_down(&radarr0(), 5, now, days(30)));

        history.record(&radarr0(), 5, now);
        assert_eq!(history.len(), 1);
        assert!(history.is_cooling_down(&radarr0(), 5, now, days(30)));
    }

    #[test]
    fn test_load_prunes_expired_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let now = Utc::now();

        let mut history = SearchHistory::load(&path, now, days(30));
        history.record(&radarr0(), 1, now - days(40));
        history.record(&radarr0(), 2, now - days(5));
        history.save().unwrap();

        let reloaded = SearchHistory::load(&path, now, days(30));
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.is_cooling_down(&radarr0(), 2, now, days(30)));
    }

    #[test]
    fn test_keys_are_scoped_per_instance() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let mut history = SearchHistory::load(dir.path().join("h.json"), now, days(30));

        let sonarr1 = InstanceId::new(InstanceKind::Sonarr, 1);
        history.record(&radarr0(), 42, now);
        assert!(history.is_cooling_down(&radarr0(), 42, now, days(30)));
        assert!(!history.is_cooling_down(&sonarr1, 42, now, days(30)));
    }
}
