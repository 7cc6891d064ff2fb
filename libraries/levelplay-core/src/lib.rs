//! levelplay Core
//!
//! Shared building blocks for the levelplay gain-staging player.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `SourceProfile`, `SinkProfile`, `TrackRecord`, `CollectionRef`
//! - **Core Traits**: `Catalog`, the collaborator that resolves collections and stream locators
//! - **External Tools**: `ExternalTool`, a timeout-bounded subprocess runner
//! - **Error Handling**: Unified `LevelError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use levelplay_core::types::{CollectionRef, SampleFormat};
//!
//! let reference = CollectionRef::parse("album/58990510").unwrap();
//! assert_eq!(reference.to_string(), "album/58990510");
//!
//! assert_eq!(SampleFormat::S24_3LE.bit_depth(), 24);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod tool;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LevelError, Result};
pub use format::{format_track, format_track_detail};
pub use tool::{ExternalTool, ToolOutput};
pub use traits::Catalog;

pub use types::{
    // Device profiles
    DeviceCatalog, SampleFormat, SinkProfile, SourceProfile, VolumeControl,
    // Catalog records
    AudioQuality, CollectionKind, CollectionRef, TrackRecord,
};
