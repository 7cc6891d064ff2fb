/// Catalog-side domain types: track records and collection references
use crate::error::{LevelError, Result};
use serde::{Deserialize, Serialize};

/// Quality tag the catalog attaches to a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioQuality {
    /// Lossy, low bitrate
    Low,
    /// Lossy, high bitrate
    High,
    /// CD-quality lossless
    Lossless,
    /// Losslessly folded high-resolution encoding
    HiRes,
    /// Anything the catalog reports that we do not know
    #[serde(other)]
    Unknown,
}

impl AudioQuality {
    /// Whether the stream carries a folded encoding that an unfold pass can expand
    #[must_use]
    pub fn is_folded(&self) -> bool {
        matches!(self, Self::HiRes)
    }

    /// Convert to the catalog's tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::High => "HIGH",
            Self::Lossless => "LOSSLESS",
            Self::HiRes => "HI_RES",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Default for AudioQuality {
    fn default() -> Self {
        Self::Lossless
    }
}

/// A track as the catalog describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Catalog track identifier
    pub id: String,

    /// Artist name
    pub artist_name: String,

    /// Album name
    pub album_name: String,

    /// Track title
    pub track_name: String,

    /// Album release date as reported by the catalog
    #[serde(default)]
    pub album_release_date: Option<String>,

    /// Cover art location
    #[serde(default)]
    pub album_cover_url: Option<String>,

    /// Stream quality tag
    #[serde(default)]
    pub quality_tag: AudioQuality,
}

/// Kind of collection a reference points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    /// Album tracks in album order
    Album,
    /// Playlist tracks in playlist order
    Playlist,
    /// An artist's top tracks
    Artist,
    /// Radio seeded from an artist
    ArtistRadio,
    /// Radio seeded from a track
    TrackRadio,
    /// A single track
    Track,
}

impl CollectionKind {
    /// Reference prefix for this kind
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Artist => "artist",
            Self::ArtistRadio => "artist-radio",
            Self::TrackRadio => "track-radio",
            Self::Track => "track",
        }
    }

    /// Parse from a reference prefix
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "album" => Some(Self::Album),
            "playlist" => Some(Self::Playlist),
            "artist" => Some(Self::Artist),
            "artist-radio" => Some(Self::ArtistRadio),
            "track-radio" => Some(Self::TrackRadio),
            "track" => Some(Self::Track),
            _ => None,
        }
    }
}

/// What to play: an explicit collection, or the user's favorites
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionRef {
    /// `{kind}/{id}`
    Collection {
        /// Collection kind
        kind: CollectionKind,
        /// Catalog identifier
        id: String,
    },
    /// The saved-favorites collection
    Favorites,
}

impl CollectionRef {
    /// Parse a `{kind}/{id}` reference; an empty string selects favorites
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim().trim_matches('/');
        if reference.is_empty() {
            return Ok(Self::Favorites);
        }

        let (kind, id) = reference.rsplit_once('/').ok_or_else(|| {
            LevelError::InvalidReference(format!("expected {{kind}}/{{id}}, got '{}'", reference))
        })?;

        let kind = CollectionKind::from_str(kind)
            .ok_or_else(|| LevelError::InvalidReference(format!("unknown kind '{}'", kind)))?;

        if id.is_empty() {
            return Err(LevelError::InvalidReference(format!(
                "missing id in '{}'",
                reference
            )));
        }

        Ok(Self::Collection {
            kind,
            id: id.to_string(),
        })
    }

    /// Whether this reference selects endless favorites playback
    #[must_use]
    pub fn is_favorites(&self) -> bool {
        matches!(self, Self::Favorites)
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection { kind, id } => write!(f, "{}/{}", kind.as_str(), id),
            Self::Favorites => write!(f, "favorites"),
        }
    }
}
