/// Core traits for levelplay
use crate::error::Result;
use crate::types::{CollectionRef, TrackRecord};
use async_trait::async_trait;

/// Catalog collaborator
///
/// Resolves collection references into ordered track lists and hands out
/// stream locators. Authentication and browsing live behind this trait and
/// are not the player's concern.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a collection reference into its ordered tracks
    ///
    /// `CollectionRef::Favorites` returns the user's saved tracks.
    ///
    /// # Errors
    /// Returns `LevelError::Catalog` if the collection cannot be fetched
    async fn tracks(&self, reference: &CollectionRef) -> Result<Vec<TrackRecord>>;

    /// Get a stream locator (URL) for a track
    ///
    /// # Errors
    /// Returns `LevelError::StreamUnavailable` if no locator can be obtained
    async fn stream_url(&self, track_id: &str) -> Result<String>;
}
