//! levelplay CLI Library
//!
//! Configuration loading and session wiring for the `levelplay` binary.
//!
//! This library exposes the components for testing purposes.

pub mod app;
pub mod config;

// Re-export commonly used types for convenience
pub use app::{build_capabilities, build_orchestrator, run};
pub use config::{AppConfig, LoudnessBackend};
