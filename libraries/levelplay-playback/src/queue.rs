//! Track source policy
//!
//! Two modes:
//! - **Explicit**: an ordered collection (album, playlist, artist top tracks,
//!   radio, single track) resolved once and consumed in order.
//! - **Favorites**: endless. The favorites collection is fetched again
//!   before every pick and one track is chosen uniformly at random from
//!   that snapshot. Repeats across picks are expected.

use crate::error::{PlaybackError, Result};
use levelplay_core::{Catalog, CollectionRef, TrackRecord};
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Where the next track comes from
#[derive(Debug, Clone)]
pub enum TrackQueue {
    /// Remaining tracks of an explicit collection
    Explicit(VecDeque<TrackRecord>),
    /// Endless random picks from the favorites collection
    Favorites {
        /// Last favorites snapshot that was fetched successfully
        snapshot: Option<Vec<TrackRecord>>,
    },
}

impl TrackQueue {
    /// Resolve a collection reference into a queue
    ///
    /// # Errors
    /// Returns `Catalog` if an explicit collection cannot be fetched. For
    /// favorites the first fetch happens on the first [`next`](Self::next).
    pub async fn resolve(catalog: &dyn Catalog, reference: &CollectionRef) -> Result<Self> {
        if reference.is_favorites() {
            info!("Playing favorites in random order");
            return Ok(Self::Favorites { snapshot: None });
        }

        let tracks = catalog
            .tracks(reference)
            .await
            .map_err(|e| PlaybackError::Catalog(e.to_string()))?;
        info!(reference = %reference, tracks = tracks.len(), "Resolved collection");
        if tracks.is_empty() {
            warn!(reference = %reference, "Collection is empty");
        }
        Ok(Self::Explicit(tracks.into()))
    }

    /// An explicit queue over known tracks
    pub fn explicit(tracks: impl IntoIterator<Item = TrackRecord>) -> Self {
        Self::Explicit(tracks.into_iter().collect())
    }

    /// Next track to play, or `None` when an explicit queue is exhausted
    ///
    /// # Errors
    /// Favorites mode returns `Catalog` when the first snapshot cannot be
    /// fetched or the collection is empty. A failed refresh after that reuses
    /// the previous snapshot.
    pub async fn next(&mut self, catalog: &dyn Catalog) -> Result<Option<TrackRecord>> {
        match self {
            Self::Explicit(tracks) => Ok(tracks.pop_front()),
            Self::Favorites { snapshot } => {
                match catalog.tracks(&CollectionRef::Favorites).await {
                    Ok(tracks) => *snapshot = Some(tracks),
                    Err(e) if snapshot.is_some() => {
                        warn!(error = %e, "Favorites refresh failed, reusing previous snapshot");
                    }
                    Err(e) => return Err(PlaybackError::Catalog(e.to_string())),
                }

                let tracks = snapshot.as_deref().unwrap_or_default();
                let index = pick_index(&mut rand::thread_rng(), tracks.len()).ok_or_else(|| {
                    PlaybackError::Catalog("favorites collection is empty".to_string())
                })?;
                debug!(index, of = tracks.len(), "Picked favorite");
                Ok(Some(tracks[index].clone()))
            }
        }
    }

    /// Whether this queue never runs out on its own
    pub fn is_endless(&self) -> bool {
        matches!(self, Self::Favorites { .. })
    }
}

/// Uniform index into a collection of `len` items
pub fn pick_index<R: Rng>(rng: &mut R, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.gen_range(0..len))
}
