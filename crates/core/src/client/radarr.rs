//! Radarr movie library client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::{InstanceConfig, InstanceId};

use super::api::ArrApi;
use super::{CatalogItem, ClientError, LibraryClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Movie {
    id: u64,
    title: String,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    has_file: bool,
    quality_profile_id: u64,
    #[serde(default)]
    movie_file: Option<MovieFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieFile {
    #[serde(default)]
    custom_format_score: i64,
}

/// Client for one Radarr instance.
pub struct RadarrClient {
    id: InstanceId,
    api: ArrApi,
}

impl RadarrClient {
    pub fn new(config: &InstanceConfig, timeout: Duration) -> Self {
        Self {
            id: config.id,
            api: ArrApi::new(&config.url, &config.api_key, timeout),
        }
    }
}

#[async_trait]
impl LibraryClient for RadarrClient {
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
        let movies: Vec<Movie> = self.api.get("movie", &[]).await?;

        let items: Vec<CatalogItem> = movies
            .into_iter()
            .filter_map(|movie| movie_item(movie, &cutoffs))
            .collect();

        debug!(instance = %self.id, items = items.len(), "Movie catalog fetched");
        Ok(items)
    }

    async fn trigger_search(&self, item_ids: &[u64]) -> Result<(), ClientError> {
        if item_ids.is_empty() {
            return Ok(());
        }
        self.api.post_command(movies_search_payload(item_ids)).await
    }
}

/// Catalog entry for a movie, or `None` when the movie cannot be an
/// upgrade candidate at all (unmonitored, or no file to upgrade).
fn movie_item(movie: Movie, cutoffs: &HashMap<u64, i64>) -> Option<CatalogItem> {
    if !movie.monitored || !movie.has_file {
        return None;
    }

    // An unknown profile cannot be compared against, which leaves the
    // item counted as satisfied.
    let cutoff_met = match cutoffs.get(&movie.quality_profile_id) {
        None => true,
        Some(&cutoff) => {
            let score = movie
                .movie_file
                .as_ref()
                .map(|file| file.custom_format_score)
                .unwrap_or(0);
            score >= cutoff
        }
    };

    Some(CatalogItem {
        id: movie.id,
        title: movie.title,
        cutoff_met,
        quality_profile_id: movie.quality_profile_id,
    })
}

fn movies_search_payload(item_ids: &[u64]) -> serde_json::Value {
    json!({
        "name": "MoviesSearch",
        "movieIds": item_ids,
    })
}
