//! Types for the catalog gateway API.

use levelplay_core::TrackRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog connection configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the gateway (e.g., "https://catalog.example.com/v1")
    pub url: String,
    /// Bearer token sent with every request, if set
    pub access_token: Option<String>,
    /// Market the catalog resolves tracks for
    pub country_code: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Create a config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
            country_code: "US".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Set the market.
    #[must_use]
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A page of tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub items: Vec<TrackRecord>,
    /// Total number of tracks in the collection, when the gateway reports it
    #[serde(default)]
    pub total: Option<usize>,
}

/// Stream locator for a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUrlResponse {
    pub url: String,
    /// URL validity in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}
