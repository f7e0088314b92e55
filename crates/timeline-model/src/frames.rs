//! Mapping between Source Frame Space and Player Frame Space.
//!
//! When a trim is active the media engine is handed only the trimmed window,
//! so its positions start at 0 at `range.start_frame`. Every conversion
//! between the two spaces goes through this module.

use serde::{Deserialize, Serialize};

use crate::trim::TrimRange;

/// True iff the range excludes any part of a source of `total` frames.
pub fn is_trim_active(range: &TrimRange, total: u64) -> bool {
    range.start_frame > 0 || range.end_frame < total
}

/// Convert a source frame to a player frame.
///
/// Frames outside the range clamp to the nearest edge of the window.
pub fn to_player_frame(source_frame: u64, range: &TrimRange, active: bool) -> u64 {
    if !active {
        return source_frame;
    }
    source_frame
        .saturating_sub(range.start_frame)
        .min(range.len())
}

/// Convert a player frame back to a source frame.
pub fn to_source_frame(player_frame: u64, range: &TrimRange, active: bool) -> u64 {
    if active {
        player_frame + range.start_frame
    } else {
        player_frame
    }
}

/// Length of the window presented by the player, never less than one frame.
pub fn player_duration(range: &TrimRange, active: bool, total: u64) -> u64 {
    if active {
        range.len().max(1)
    } else {
        total
    }
}

/// Sub-range hints handed to the media engine so it restricts playback natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineWindow {
    /// First source frame of the window.
    pub start_from: u64,
    /// Source frame at which the window ends.
    pub end_at: u64,
}

/// A trim range resolved against a source duration.
///
/// Computed once per range change and shared by every consumer so that no
/// component recomputes offsets on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMapping {
    range: TrimRange,
    total: u64,
    active: bool,
}

impl FrameMapping {
    pub fn new(range: TrimRange, total: u64) -> Self {
        Self {
            range,
            total,
            active: is_trim_active(&range, total),
        }
    }

    /// Mapping for an untrimmed source.
    pub fn full(total: u64) -> Self {
        Self::new(TrimRange::full(total), total)
    }

    pub fn range(&self) -> TrimRange {
        self.range
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn to_player(&self, source_frame: u64) -> u64 {
        to_player_frame(source_frame, &self.range, self.active)
    }

    pub fn to_source(&self, player_frame: u64) -> u64 {
        to_source_frame(player_frame, &self.range, self.active)
    }

    pub fn player_duration(&self) -> u64 {
        player_duration(&self.range, self.active, self.total)
    }

    /// Source frame where the player window begins.
    pub fn window_start(&self) -> u64 {
        self.to_source(0)
    }

    /// Clamp a source frame into the frames the player can present.
    pub fn clamp_source(&self, source_frame: u64) -> u64 {
        if self.active {
            self.to_source(self.to_player(source_frame))
        } else {
            source_frame.min(self.total)
        }
    }

    /// Window hints for the engine; `None` when the full source plays.
    pub fn engine_window(&self) -> Option<EngineWindow> {
        self.active.then_some(EngineWindow {
            start_from: self.range.start_frame,
            end_at: self.range.end_frame,
        })
    }
}
