//! Shared plumbing for the *arr v3 REST API.
//!
//! Radarr and Sonarr expose the same surface for everything this crate
//! needs: `system/status`, `qualityprofile`, and the `command` endpoint.
//! The kind-specific clients layer their catalog walks on top of this.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ClientError;

const API_KEY_HEADER: &str = "X-Api-Key";

/// A quality profile as returned by `qualityprofile`. Only the cutoff
/// score matters here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QualityProfile {
    id: u64,
    #[serde(default)]
    cutoff_format_score: i64,
}

/// One authenticated connection to an *arr instance.
pub(crate) struct ArrApi {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ArrApi {
    pub(crate) fn new(url: &str, api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET an endpoint and decode its JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, u64)],
    ) -> Result<T, ClientError> {
        let url = api_url(&self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        let response = check_status(response, &url).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("failed to decode {url}: {e}")))
    }

    /// POST a command payload to the `command` endpoint. The response body
    /// (the queued job) is not interesting here.
    pub(crate) async fn post_command(
        &self,
        payload: serde_json::Value,
    ) -> Result<(), ClientError> {
        let url = api_url(&self.base_url, "command");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClientError::Unavailable(e.to_string()))?;

        check_status(response, &url).await?;
        Ok(())
    }

    /// Connectivity and credential check against `system/status`.
    pub(crate) async fn ping(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.get("system/status", &[]).await?;
        Ok(())
    }

    /// Map of quality profile id to its cutoff score.
    pub(crate) async fn quality_cutoffs(&self) -> Result<HashMap<u64, i64>, ClientError> {
        let profiles: Vec<QualityProfile> = self.get("qualityprofile", &[]).await?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile.cutoff_format_score))
            .collect())
    }
}

fn api_url(base_url: &str, endpoint: &str) -> String {
    format!("{base_url}/api/v3/{endpoint}")
}

async fn check_status(
    response: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Auth(format!("HTTP {status} from {url}")));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(ClientError::Unavailable(format!(
            "HTTP {status} from {url}: {snippet}"
        )));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("http://radarr:7878", "movie"),
            "http://radarr:7878/api/v3/movie"
        );
        assert_eq!(
            api_url("http://sonarr:8989", "system/status"),
            "http://sonarr:8989/api/v3/system/status"
        );
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let api = ArrApi::new("http://radarr:7878/", "key", Duration::from_secs(5));
        assert_eq!(api.base_url(), "http://radarr:7878");
    }

    #[test]
    fn test_quality_profile_decoding() {
        let raw = r#"[
            {"id": 1, "name": "HD-1080p", "cutoffFormatScore": 150, "upgradeAllowed": true},
            {"id": 6, "name": "Any"}
        ]"#;
        let profiles: Vec<QualityProfile> = serde_json::from_str(raw).unwrap();
        assert_eq!(profiles[0].id, 1);
        assert_eq!(profiles[0].cutoff_format_score, 150);
        // Missing score defaults to zero.
        assert_eq!(profiles[1].cutoff_format_score, 0);
    }
}
