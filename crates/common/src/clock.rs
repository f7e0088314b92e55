//! Frame clock utilities.
//!
//! Media positions are frame indices; export and thumbnail sampling work in
//! seconds. This module keeps the conversions in one place, and provides the
//! refresh-rate bound used by the playback tick.

use std::time::Duration;

/// Conversion between frame indices and seconds at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for `fps`. Non-finite or non-positive rates fall back to 30.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            30.0
        };
        Self { fps }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Seconds at the start of `frame`.
    pub fn frames_to_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.fps
    }

    /// Nearest frame for `secs`. Negative input maps to frame 0.
    pub fn secs_to_frames(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.fps).round() as u64
    }

    /// Frames elapsed over a wall-clock duration (truncated).
    pub fn frames_in(&self, elapsed: Duration) -> u64 {
        (elapsed.as_secs_f64() * self.fps) as u64
    }
}

/// Tick bound derived from a display refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRate {
    hz: u32,
}

impl RefreshRate {
    /// Create a refresh rate. Zero is treated as 1 Hz.
    pub fn new(hz: u32) -> Self {
        Self { hz: hz.max(1) }
    }

    pub fn hz(&self) -> u32 {
        self.hz
    }

    /// Interval between ticks.
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.hz as u64)
    }
}

impl Default for RefreshRate {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_to_secs_at_30fps() {
        let clock = FrameClock::new(30.0);
        assert!((clock.frames_to_secs(90) - 3.0).abs() < 1e-9);
        assert!((clock.frames_to_secs(210) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_secs_to_frames_rounds_and_clamps() {
        let clock = FrameClock::new(30.0);
        assert_eq!(clock.secs_to_frames(1.0), 30);
        assert_eq!(clock.secs_to_frames(0.51), 15);
        assert_eq!(clock.secs_to_frames(-2.0), 0);
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        assert!((FrameClock::new(0.0).fps() - 30.0).abs() < 1e-9);
        assert!((FrameClock::new(f64::NAN).fps() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_frames_in_elapsed() {
        let clock = FrameClock::new(30.0);
        assert_eq!(clock.frames_in(Duration::from_millis(1_000)), 30);
        assert_eq!(clock.frames_in(Duration::from_millis(40)), 1);
    }

    #[test]
    fn test_refresh_interval() {
        assert_eq!(RefreshRate::new(60).interval(), Duration::from_nanos(16_666_666));
        assert_eq!(RefreshRate::new(0).hz(), 1);
    }
}
