//! Catalog gateway client.

use crate::error::{CatalogError, Result};
use crate::types::{CatalogConfig, StreamUrlResponse, TrackPage};
use async_trait::async_trait;
use levelplay_core::{Catalog, CollectionKind, CollectionRef, TrackRecord};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// HTTP client for the catalog gateway.
///
/// Resolves collection references into ordered track lists and hands out
/// stream locators. Every request carries the configured market and, if
/// set, the bearer token.
///
/// # Example
///
/// ```ignore
/// use levelplay_catalog::{CatalogClient, CatalogConfig};
/// use levelplay_core::CollectionRef;
///
/// let client = CatalogClient::new(CatalogConfig::new("https://catalog.example.com/v1"))?;
/// let tracks = client.get_tracks(&CollectionRef::parse("album/58990510")?).await?;
/// let locator = client.get_stream_url(&tracks[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
    country_code: String,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("levelplay/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            access_token: config.access_token,
            country_code: config.country_code,
        })
    }

    /// Get the gateway URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Check if the client sends a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Fetch the ordered track list of a collection.
    pub async fn get_tracks(&self, reference: &CollectionRef) -> Result<Vec<TrackRecord>> {
        let path = collection_path(reference);
        debug!(reference = %reference, path = %path, "Fetching collection");

        let tracks = match reference {
            CollectionRef::Collection {
                kind: CollectionKind::Track,
                ..
            } => vec![self.get_json::<TrackRecord>(&path).await?],
            _ => self.get_json::<TrackPage>(&path).await?.items,
        };

        info!(reference = %reference, tracks = tracks.len(), "Fetched collection");
        Ok(tracks)
    }

    /// Get a stream locator for a track.
    ///
    /// The URL is time-limited and should be used promptly.
    pub async fn get_stream_url(&self, track_id: &str) -> Result<String> {
        let url = format!("{}/tracks/{}/streamurl", self.base_url, track_id);
        debug!(url = %url, track_id = %track_id, "Getting stream URL");

        let response = self.request(&url).send().await.map_err(|e| {
            CatalogError::StreamUnavailable {
                track_id: track_id.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            let stream: StreamUrlResponse = response.json().await.map_err(|e| {
                CatalogError::ParseError(format!("Failed to parse stream response: {}", e))
            })?;
            Ok(stream.url)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(CatalogError::AuthRequired)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(CatalogError::StreamUnavailable {
                track_id: track_id.to_string(),
                reason: format!("{}: {}", status, error_text.trim()),
            })
        }
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .get(url)
            .query(&[("countryCode", self.country_code.as_str())]);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.request(&url).send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("Failed to parse response: {}", e)))
    } else if status == StatusCode::UNAUTHORIZED {
        Err(CatalogError::AuthRequired)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(CatalogError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

/// Gateway path for a collection reference
pub fn collection_path(reference: &CollectionRef) -> String {
    match reference {
        CollectionRef::Favorites => "/users/me/favorites/tracks".to_string(),
        CollectionRef::Collection { kind, id } => match kind {
            CollectionKind::Album => format!("/albums/{}/tracks", id),
            CollectionKind::Playlist => format!("/playlists/{}/tracks", id),
            CollectionKind::Artist => format!("/artists/{}/toptracks", id),
            CollectionKind::ArtistRadio => format!("/artists/{}/radio", id),
            CollectionKind::TrackRadio => format!("/tracks/{}/radio", id),
            CollectionKind::Track => format!("/tracks/{}", id),
        },
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn tracks(&self, reference: &CollectionRef) -> levelplay_core::Result<Vec<TrackRecord>> {
        Ok(self.get_tracks(reference).await?)
    }

    async fn stream_url(&self, track_id: &str) -> levelplay_core::Result<String> {
        Ok(self.get_stream_url(track_id).await?)
    }
}
