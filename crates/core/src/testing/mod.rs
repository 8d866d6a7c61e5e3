//! Test doubles and fixtures for the library client seam.

mod mock_client;

pub use mock_client::{MockFailure, MockLibraryClient};

/// Catalog item fixtures.
pub mod fixtures {
    use crate::client::CatalogItem;

    /// An item below its cutoff, i.e. an upgrade candidate.
    pub fn upgradeable(id: u64, title: &str) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            cutoff_met: false,
            quality_profile_id: 1,
        }
    }

    /// An item whose file already satisfies its cutoff.
    pub fn satisfied(id: u64, title: &str) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            cutoff_met: true,
            quality_profile_id: 1,
        }
    }
}
