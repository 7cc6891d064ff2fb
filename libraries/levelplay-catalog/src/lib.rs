//! levelplay Catalog Client
//!
//! HTTP client for the JSON catalog gateway levelplay streams from.
//!
//! # Features
//!
//! - **Collections**: album, playlist, artist top tracks, artist and track
//!   radio, single tracks and the saved-favorites collection
//! - **Stream locators**: time-limited stream URLs per track
//! - **`Catalog` implementation**: plugs straight into the orchestrator
//!
//! Obtaining the bearer token is out of scope; a pre-configured token is
//! sent when one is set.
//!
//! # Example
//!
//! ```ignore
//! use levelplay_catalog::{CatalogClient, CatalogConfig};
//! use levelplay_core::CollectionRef;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CatalogConfig::new("https://catalog.example.com/v1").with_token("token");
//!     let client = CatalogClient::new(config)?;
//!
//!     let tracks = client.get_tracks(&CollectionRef::Favorites).await?;
//!     println!("Found {} favorites", tracks.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{collection_path, CatalogClient};
pub use error::{CatalogError, Result};
pub use types::{CatalogConfig, StreamUrlResponse, TrackPage, DEFAULT_TIMEOUT};
