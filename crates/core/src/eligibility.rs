//! Upgrade eligibility filtering.

use chrono::{DateTime, Duration, Utc};

use crate::client::CatalogItem;
use crate::config::InstanceId;
use crate::history::SearchHistory;

/// Items that are below their quality cutoff and outside the search
/// cooldown window. Output order carries no meaning; selection shuffles
/// regardless.
pub fn eligible_items(
    items: &[CatalogItem],
    instance: &InstanceId,
    now: DateTime<Utc>,
    cooldown: Duration,
    history: &SearchHistory,
) -> Vec<CatalogItem> {
    items
        .iter()
        .filter(|item| !item.cutoff_met)
        .filter(|item| !history.is_cooling_down(instance, item.id, now, cooldown))
        .cloned()
        .collect()
}
