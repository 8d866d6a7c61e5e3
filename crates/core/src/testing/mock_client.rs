//! Mock library client for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{CatalogItem, ClientError, LibraryClient};
use crate::config::{InstanceId, InstanceKind};

/// Which error a mocked call should fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Unavailable,
    Auth,
    Protocol,
}

impl MockFailure {
    fn to_error(self) -> ClientError {
        match self {
            MockFailure::Unavailable => {
                ClientError::Unavailable("mock remote down".to_string())
            }
            MockFailure::Auth => ClientError::Auth("mock api key rejected".to_string()),
            MockFailure::Protocol => {
                ClientError::Protocol("mock undecodable response".to_string())
            }
        }
    }
}

/// Mock implementation of [`LibraryClient`].
///
/// Serves a configured catalog and records every search command so tests
/// can assert on exactly what reached the remote.
pub struct MockLibraryClient {
    id: InstanceId,
    url: String,
    catalog: Vec<CatalogItem>,
    fail_ping: Option<MockFailure>,
    fail_catalog: Option<MockFailure>,
    fail_search: Option<MockFailure>,
    searches: Mutex<Vec<Vec<u64>>>,
}

impl MockLibraryClient {
    pub fn new(kind: InstanceKind, ordinal: usize) -> Self {
        let id = InstanceId::new(kind, ordinal);
        Self {
            url: format!("http://{id}.test"),
            id,
            catalog: Vec::new(),
            fail_ping: None,
            fail_catalog: None,
            fail_search: None,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogItem>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn failing_ping(mut self, failure: MockFailure) -> Self {
        self.fail_ping = Some(failure);
        self
    }

    pub fn failing_catalog(mut self, failure: MockFailure) -> Self {
        self.fail_catalog = Some(failure);
        self
    }

    pub fn failing_search(mut self, failure: MockFailure) -> Self {
        self.fail_search = Some(failure);
        self
    }

    /// Number of search commands that reached this mock.
    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    /// Every batch of item ids a search command carried, in call order.
    pub fn searched_batches(&self) -> Vec<Vec<u64>> {
        self.searches.lock().unwrap().clone()
    }

    /// All searched item ids, flattened.
    pub fn searched_ids(&self) -> Vec<u64> {
        self.searches.lock().unwrap().iter().flatten().copied().collect()
    }
}

#[async_trait]
impl LibraryClient for MockLibraryClient {
    fn instance_id(&self) -> &InstanceId {
        &self.id
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn ping(&self) -> Result<(), ClientError> {
        match self.fail_ping {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogItem>, ClientError> {
        match self.fail_catalog {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.catalog.clone()),
        }
    }

    async fn trigger_search(&self, item_ids: &[u64]) -> Result<(), ClientError> {
        if let Some(failure) = self.fail_search {
            return Err(failure.to_error());
        }
        self.searches.lock().unwrap().push(item_ids.to_vec());
        Ok(())
    }
}
