//! Sonarr episode library client.
//!
//! Sonarr has no single endpoint that lists episodes with their file
//! scores, so the catalog walk goes series by series: episodes and
//! episode files are fetched per series and joined on the episode's
//! `episodeFileId`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{InstanceConfig, InstanceId};

use super::api::ArrApi;
use super::{CatalogItem, ClientError, LibraryClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Series {
    id: u64,
    title: String,
    #[serde(default)]
    monitored: bool,
    quality_profile_id: u64,
    #[serde(default)]
    statistics: Option<SeriesStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesStatistics {
    #[serde(default)]
    episode_file_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Episode {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    monitored: bool,
    season_number: u32,
    episode_number: u32,
    #[serde(default)]
    episode_file_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeFile {
    id: u64,
    #[serde(default)]
    custom_format_score: i64,
}

/// Client for one Sonarr instance.
pub struct SonarrClient {
    id: InstanceId,
    api: ArrApi,
}

impl SonarrClient {
    pub fn new(config: &InstanceConfig, timeout: Duration) -> Self {
        Self {
            id: config.id,
            api: ArrApi::new(&config.url, &config.api_key, timeout),
        }
    }
}

#[async_trait]
impl LibraryClient for SonarrClient {
    fn instance_id(&self) -> &InstanceId {
        &self.id
    }

    fn url(&self) -> &str {
        self.api.base_url()
    }

    async fn ping(&self) -> Result<(), ClientError> {
        self.api.ping().await
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogItem>, ClientError> {
        let cutoffs = self.api.quality_cutoffs().await?;
        let series_list: Vec<Series> = self.api.get("series", &[]).await?;

        let mut items = Vec::new();
        for series in series_list {
            let file_count = series
                .statistics
                .as_ref()
                .map(|stats| stats.episode_file_count)
                .unwrap_or(0);
            if !series.monitored || file_count == 0 {
                debug!(instance = %self.id, series = %series.title,
                    "Skipping series (unmonitored or no files)");
                continue;
            }

            let Some(&cutoff) = cutoffs.get(&series.quality_profile_id) else {
                debug!(instance = %self.id, series = %series.title,
                    "Skipping series (no cutoff score for its profile)");
                continue;
            };

            // A failing series should not take the whole instance down
            // with it; the next run will see it again.
            let episodes: Vec<Episode> =
                match self.api.get("episode", &[("seriesId", series.id)]).await {
                    Ok(episodes) => episodes,
                    Err(e) => {
                        warn!(instance = %self.id, series = %series.title, error = %e,
                            "Failed to fetch episodes, skipping series");
                        continue;
                    }
                };
            let files: Vec<EpisodeFile> =
                match self.api.get("episodefile", &[("seriesId", series.id)]).await {
                    Ok(files) => files,
                    Err(e) => {
                        warn!(instance = %self.id, series = %series.title, error = %e,
                            "Failed to fetch episode files, skipping series");
                        continue;
                    }
                };

            items.extend(episode_items(&series, episodes, files, cutoff));
        }

        debug!(instance = %self.id, items = items.len(), "Episode catalog fetched");
        Ok(items)
    }

    async fn trigger_search(&self, item_ids: &[u64]) -> Result<(), ClientError> {
        if item_ids.is_empty() {
            return Ok(());
        }
        self.api
            .post_command(episode_search_payload(item_ids))
            .await
    }
}

/// Catalog entries for one series: monitored episodes that have a file,
/// scored against the series' profile cutoff.
fn episode_items(
    series: &Series,
    episodes: Vec<Episode>,
    files: Vec<EpisodeFile>,
    cutoff: i64,
) -> Vec<CatalogItem> {
    let file_scores: HashMap<u64, i64> = files
        .into_iter()
        .map(|file| (file.id, file.custom_format_score))
        .collect();

    episodes
        .into_iter()
        .filter(|episode| episode.monitored)
        .filter_map(|episode| {
            let score = *file_scores.get(&episode.episode_file_id)?;
            let title = format!(
                "{} - S{:02}E{:02} - {}",
                series.title, episode.season_number, episode.episode_number, episode.title
            );
            Some(CatalogItem {
                id: episode.id,
                title,
                cutoff_met: score >= cutoff,
                quality_profile_id: series.quality_profile_id,
            })
        })
        .collect()
}

fn episode_search_payload(item_ids: &[u64]) -> serde_json::Value {
    json!({
        "name": "EpisodeSearch",
        "episodeIds": item_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Series {
        serde_json::from_str(
            r#"{"id": 11, "title": "The Wire", "monitored": true,
                "qualityProfileId": 1,
                "statistics": {"episodeFileCount": 2}}"#,
        )
        .unwrap()
    }

    fn episodes() -> Vec<Episode> {
        serde_json::from_str(
            r#"[
                {"id": 100, "title": "The Target", "monitored": true,
                 "seasonNumber": 1, "episodeNumber": 1, "episodeFileId": 900},
                {"id": 101, "title": "The Detail", "monitored": true,
                 "seasonNumber": 1, "episodeNumber": 2, "episodeFileId": 901},
                {"id": 102, "title": "The Buys", "monitored": false,
                 "seasonNumber": 1, "episodeNumber": 3, "episodeFileId": 902},
                {"id": 103, "title": "Old Cases", "monitored": true,
                 "seasonNumber": 1, "episodeNumber": 4, "episodeFileId": 0}
            ]"#,
        )
        .unwrap()
    }

    fn files() -> Vec<EpisodeFile> {
        serde_json::from_str(
            r#"[
                {"id": 900, "customFormatScore": 20},
                {"id": 901, "customFormatScore": 120},
                {"id": 902, "customFormatScore": 0}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_episode_join_and_scoring() {
        let items = episode_items(&series(), episodes(), files(), 100);
        // 102 is unmonitored, 103 has no file.
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 100);
        assert!(!items[0].cutoff_met);
        assert_eq!(items[1].id, 101);
        assert!(items[1].cutoff_met);
    }

    #[test]
    fn test_episode_title_format() {
        let items = episode_items(&series(), episodes(), files(), 100);
        assert_eq!(items[0].title, "The Wire - S01E01 - The Target");
    }

    #[test]
    fn test_episode_without_file_entry_is_dropped() {
        let episodes: Vec<Episode> = serde_json::from_str(
            r#"[{"id": 100, "title": "X", "monitored": true,
                 "seasonNumber": 2, "episodeNumber": 5, "episodeFileId": 999}]"#,
        )
        .unwrap();
        let items = episode_items(&series(), episodes, files(), 100);
        assert!(items.is_empty());
    }

    #[test]
    fn test_series_decoding_defaults() {
        let series: Series =
            serde_json::from_str(r#"{"id": 1, "title": "S", "qualityProfileId": 3}"#).unwrap();
        assert!(!series.monitored);
        assert!(series.statistics.is_none());
    }

    #[test]
    fn test_episode_search_payload() {
        let payload = episode_search_payload(&[100, 101]);
        assert_eq!(payload["name"], "EpisodeSearch");
        assert_eq!(payload["episodeIds"], json!([100, 101]));
    }
}
