//! Source media metadata.

use serde::{Deserialize, Serialize};
use trimline_common::clock::FrameClock;

/// Metadata resolved once per source URL.
///
/// Immutable: a source change discards the value and resolves a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Total number of frames in the untrimmed source.
    pub duration_in_frames: u64,

    /// Frame size in pixels.
    pub width: u32,
    pub height: u32,

    /// Frame rate.
    pub fps: f64,
}

impl MediaMetadata {
    pub fn new(duration_in_frames: u64, width: u32, height: u32, fps: f64) -> Self {
        Self {
            duration_in_frames,
            width,
            height,
            fps,
        }
    }

    /// Build metadata from a duration in seconds (e.g. from a container probe).
    pub fn from_duration_secs(duration_secs: f64, width: u32, height: u32, fps: f64) -> Self {
        let clock = FrameClock::new(fps);
        Self {
            duration_in_frames: clock.secs_to_frames(duration_secs),
            width,
            height,
            fps: clock.fps(),
        }
    }

    pub fn clock(&self) -> FrameClock {
        FrameClock::new(self.fps)
    }

    pub fn duration_secs(&self) -> f64 {
        self.clock().frames_to_secs(self.duration_in_frames)
    }

    pub fn frames_to_secs(&self, frame: u64) -> f64 {
        self.clock().frames_to_secs(frame)
    }

    pub fn secs_to_frames(&self, secs: f64) -> u64 {
        self.clock().secs_to_frames(secs)
    }

    /// Minimum number of frames between the two trim handles.
    ///
    /// Roughly `gap_secs` worth of frames, never below 1 and never above
    /// the full duration (a clip shorter than the gap can only be shown whole).
    pub fn min_trim_gap_frames(&self, gap_secs: f64) -> u64 {
        self.secs_to_frames(gap_secs)
            .max(1)
            .min(self.duration_in_frames.max(1))
    }

    /// Whether the metadata describes playable media.
    pub fn is_playable(&self) -> bool {
        self.duration_in_frames > 0 && self.fps.is_finite() && self.fps > 0.0
    }
}
