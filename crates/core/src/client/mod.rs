//! Clients for the Radarr and Sonarr v3 REST APIs.
//!
//! Both speak through the shared [`ArrApi`](api::ArrApi) plumbing and
//! expose the same [`LibraryClient`] trait: list the catalog with each
//! item's cutoff state, and queue a search command for a set of items.

mod api;
mod radarr;
mod sonarr;
mod types;

pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;
pub use types::{CatalogItem, ClientError, LibraryClient};
