//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::permanence::IdPermanenceCodec;
use crate::repository::ResourceRepository;

/// Pagination limits applied to list endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    /// Page size when the request omits `page-size`.
    pub default_page_size: u32,
    /// Largest accepted `page-size`.
    pub max_page_size: u32,
}

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped or `Copy` so that Axum can clone the state
/// for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// The ID Permanence codec, constructed once over the injected secret.
    pub codec: Arc<IdPermanenceCodec>,
    /// Seeded read-only resource data.
    pub repository: Arc<ResourceRepository>,
    /// Public base URI for response links.
    pub base_uri: Arc<String>,
    /// Pagination limits.
    pub page_limits: PageLimits,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(
        codec: IdPermanenceCodec,
        repository: ResourceRepository,
        base_uri: String,
        page_limits: PageLimits,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            repository: Arc::new(repository),
            base_uri: Arc::new(base_uri),
            page_limits,
        }
    }

    /// State over the seeded repository and a fixed test secret, for tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let secret =
            crate::permanence::ServerSecret::new(b"90733A75F19347118B3BE0030AB590A8".to_vec())
                .expect("test secret is valid");
        Self::new(
            IdPermanenceCodec::new(secret),
            ResourceRepository::seeded(),
            "https://dh.example".into(),
            PageLimits {
                default_page_size: 25,
                max_page_size: 1000,
            },
        )
    }
}
