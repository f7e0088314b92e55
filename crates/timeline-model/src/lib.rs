//! Trimline Timeline Model
//!
//! Defines the core data contracts for trim-aware playback:
//! - **Media:** Resolved source metadata (duration, resolution, frame rate)
//! - **Trim:** The selected sub-range of the source and its invariants
//! - **Frames:** Mapping between Source Frame Space and Player Frame Space
//! - **Playback:** Observable player state
//! - **Thumbnails:** The fixed-length strip sampled across the full source
//! - **Export:** Trim export requests and completion events
//!
//! Every externally observable frame index is in Source Frame Space, i.e.
//! relative to the untrimmed asset. Player Frame Space only exists between
//! the mapper and the media engine.

pub mod export;
pub mod frames;
pub mod media;
pub mod playback;
pub mod thumbnail;
pub mod trim;

pub use export::*;
pub use frames::*;
pub use media::*;
pub use playback::*;
pub use thumbnail::*;
pub use trim::*;
