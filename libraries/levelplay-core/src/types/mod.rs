//! Domain types for levelplay

mod profile;
mod track;

pub use profile::{DeviceCatalog, SampleFormat, SinkProfile, SourceProfile, VolumeControl};
pub use track::{AudioQuality, CollectionKind, CollectionRef, TrackRecord};
