//! Trimline Playback
//!
//! Presents one playback surface over either the full source or a trimmed
//! sub-range of it. Callers always speak Source Frame Space; only the media
//! engine sees Player Frame Space.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  apply_trim / pause / seek  ┌──────────────────────┐
//! │  TrimRangeEditor │ ──────────────────────────▶ │  PlaybackController  │
//! │  owns TrimRange  │                             │  owns PlaybackState  │
//! └────────┬─────────┘                             └──────────┬───────────┘
//!          │ watch<TrimRange>                                 │ player frames
//!          ▼                                                  ▼
//!     subscribers                                     ┌──────────────┐
//!                                                     │ MediaEngine  │
//!                                                     └──────────────┘
//! ```
//!
//! The controller runs inside a single driver task ([`driver::spawn_player`])
//! that serializes commands and the per-frame position tick.

pub mod controller;
pub mod driver;
pub mod engine;
pub mod metadata;
pub mod trim_editor;

pub use controller::*;
pub use driver::*;
pub use engine::*;
pub use metadata::*;
pub use trim_editor::*;
