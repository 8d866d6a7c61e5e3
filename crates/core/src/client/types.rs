//! Types for the library manager clients.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::InstanceId;

/// One catalog item with its quality-cutoff state.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    /// Remote identifier, unique within its instance.
    pub id: u64,
    /// Human-readable title for logs and dumps.
    pub title: String,
    /// True when the acquired file already satisfies the profile cutoff,
    /// i.e. no upgrade is needed.
    pub cutoff_met: bool,
    /// Quality profile the item is assigned to.
    pub quality_profile_id: u64,
}

/// Errors from talking to a library manager instance. Any of these skips
/// the instance for the run; none of them is fatal to the run itself.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure, timeout, or a non-auth HTTP error status.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The instance rejected the API key.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The instance answered with something we cannot decode.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// A connected library manager instance.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Identity of the instance this client talks to.
    fn instance_id(&self) -> &InstanceId;

    /// Base URL, for logs.
    fn url(&self) -> &str;

    /// Cheap connectivity and credential check.
    async fn ping(&self) -> Result<(), ClientError>;

    /// Fetch every catalog item together with its cutoff state.
    async fn list_catalog(&self) -> Result<Vec<CatalogItem>, ClientError>;

    /// Ask the instance to queue a search for the given items.
    async fn trigger_search(&self, item_ids: &[u64]) -> Result<(), ClientError>;
}
