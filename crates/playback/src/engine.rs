//! Media engine contract.
//!
//! The engine decodes and presents frames; Trimline only drives it. All
//! positions exchanged with an engine are in Player Frame Space.

use tokio::time::Instant;

use trimline_common::clock::FrameClock;
use trimline_common::error::TrimlineResult;
use trimline_timeline_model::frames::EngineWindow;

/// What the engine should present.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSource {
    pub url: String,
    pub fps: f64,
    pub duration_in_frames: u64,
    /// Restrict playback to this sub-range of the source; `None` plays it whole.
    pub window: Option<EngineWindow>,
}

impl EngineSource {
    /// Number of frames the engine presents.
    pub fn player_frames(&self) -> u64 {
        match self.window {
            Some(w) => w.end_at.saturating_sub(w.start_from).max(1),
            None => self.duration_in_frames,
        }
    }
}

/// Trait for a playback engine.
///
/// Implementations wrap a real decoder/presenter. Playback loops natively:
/// an engine never stops on its own at the end of the window.
pub trait MediaEngine: Send {
    /// Hand the engine a source, replacing any previous one.
    fn load_source(&mut self, source: &EngineSource) -> TrimlineResult<()>;

    fn play(&mut self) -> TrimlineResult<()>;

    fn pause(&mut self) -> TrimlineResult<()>;

    /// Seek to a player-space frame.
    fn seek_to(&mut self, player_frame: u64) -> TrimlineResult<()>;

    /// Current player-space position.
    fn current_frame(&self) -> u64;

    /// Apply output volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f64) -> TrimlineResult<()>;

    fn set_muted(&mut self, muted: bool) -> TrimlineResult<()>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}

/// An engine that presents nothing and advances its position by wall time.
///
/// Useful for previews without a display and as a stand-in during tests.
#[derive(Debug)]
pub struct HeadlessEngine {
    clock: FrameClock,
    frames: u64,
    anchor_frame: u64,
    anchor: Option<Instant>,
    volume: f64,
    muted: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(30.0),
            frames: 0,
            anchor_frame: 0,
            anchor: None,
            volume: 1.0,
            muted: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    fn position(&self) -> u64 {
        let Some(anchor) = self.anchor else {
            return self.anchor_frame;
        };
        let advanced = self.anchor_frame + self.clock.frames_in(anchor.elapsed());
        if self.frames == 0 {
            0
        } else {
            advanced % self.frames
        }
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEngine for HeadlessEngine {
    fn load_source(&mut self, source: &EngineSource) -> TrimlineResult<()> {
        self.clock = FrameClock::new(source.fps);
        self.frames = source.player_frames();
        self.anchor_frame = 0;
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn play(&mut self) -> TrimlineResult<()> {
        if self.anchor.is_none() {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) -> TrimlineResult<()> {
        self.anchor_frame = self.position();
        self.anchor = None;
        Ok(())
    }

    fn seek_to(&mut self, player_frame: u64) -> TrimlineResult<()> {
        self.anchor_frame = player_frame.min(self.frames);
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        Ok(())
    }

    fn current_frame(&self) -> u64 {
        self.position()
    }

    fn set_volume(&mut self, volume: f64) -> TrimlineResult<()> {
        self.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> TrimlineResult<()> {
        self.muted = muted;
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source(window: Option<EngineWindow>) -> EngineSource {
        EngineSource {
            url: "file:///clip.mp4".to_string(),
            fps: 30.0,
            duration_in_frames: 300,
            window,
        }
    }

    #[test]
    fn test_player_frames_follow_window() {
        assert_eq!(source(None).player_frames(), 300);
        let window = EngineWindow {
            start_from: 90,
            end_at: 210,
        };
        assert_eq!(source(Some(window)).player_frames(), 120);
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_engine_advances_and_loops() {
        let mut engine = HeadlessEngine::new();
        engine
            .load_source(&source(Some(EngineWindow {
                start_from: 0,
                end_at: 30,
            })))
            .unwrap();
        engine.play().unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(engine.current_frame(), 15);

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(engine.current_frame(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_engine_holds_position_when_paused() {
        let mut engine = HeadlessEngine::new();
        engine.load_source(&source(None)).unwrap();
        engine.seek_to(42).unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(engine.current_frame(), 42);
        assert!(!engine.is_playing());
    }
}
