//! Trimline Thumbnails
//!
//! Samples a fixed number of evenly spaced frames across the *full* source
//! to form the timeline background. Sampling runs against its own
//! off-screen decoder, never the visible player, one seek and capture at a
//! time. Results are published incrementally so a partially filled strip
//! can be drawn.
//!
//! A run is keyed by source URL. Switching sources abandons the running
//! extraction and clears the strip; a late result of an abandoned run is
//! never published into the new strip.

pub mod decoder;
pub mod sampler;

pub use decoder::*;
pub use sampler::*;
