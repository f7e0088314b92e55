//! Trimline Common Utilities
//!
//! Shared infrastructure for all Trimline crates:
//! - Error types and result aliases
//! - Frame clock and refresh-rate utilities for the playback tick
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
