//! Playback control over a media engine.

use std::time::Duration;

use tokio::sync::watch;

use trimline_common::config::PlayerDefaults;
use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_timeline_model::frames::FrameMapping;
use trimline_timeline_model::media::MediaMetadata;
use trimline_timeline_model::playback::{PlaybackState, PlayerPhase};
use trimline_timeline_model::trim::TrimRange;

use crate::engine::{EngineSource, MediaEngine};

/// Lifecycle and source published alongside [`PlaybackState`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub phase: PlayerPhase,
    pub source_url: Option<String>,
    pub metadata: Option<MediaMetadata>,
}

/// Owns [`PlaybackState`] and drives a [`MediaEngine`].
///
/// State machine: `Idle -> Ready -> {Playing <-> Paused}`. Loading a new
/// source re-enters `Ready` from any phase. Positions published to
/// subscribers are always in Source Frame Space.
pub struct PlaybackController {
    engine: Box<dyn MediaEngine>,
    mapping: FrameMapping,
    blur_repause_delay: Duration,
    state: watch::Sender<PlaybackState>,
    status: watch::Sender<PlayerStatus>,
}

impl PlaybackController {
    pub fn new(engine: Box<dyn MediaEngine>, defaults: &PlayerDefaults) -> Self {
        let (state, _) = watch::channel(PlaybackState {
            volume: defaults.default_volume.clamp(0.0, 1.0),
            ..PlaybackState::default()
        });
        let (status, _) = watch::channel(PlayerStatus {
            phase: PlayerPhase::Idle,
            source_url: None,
            metadata: None,
        });
        Self {
            engine,
            mapping: FrameMapping::full(0),
            blur_repause_delay: defaults.blur_repause_delay(),
            state,
            status,
        }
    }

    /// Snapshot of the published state.
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PlayerStatus> {
        self.status.subscribe()
    }

    pub fn phase(&self) -> PlayerPhase {
        self.status.borrow().phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == PlayerPhase::Playing
    }

    pub fn metadata(&self) -> Option<MediaMetadata> {
        self.status.borrow().metadata
    }

    pub fn source_url(&self) -> Option<String> {
        self.status.borrow().source_url.clone()
    }

    pub fn mapping(&self) -> FrameMapping {
        self.mapping
    }

    pub fn blur_repause_delay(&self) -> Duration {
        self.blur_repause_delay
    }

    /// Load a source: any phase -> `Ready`, trim reset to the full duration.
    pub fn load(&mut self, url: impl Into<String>, metadata: MediaMetadata) -> TrimlineResult<()> {
        let url = url.into();
        if !metadata.is_playable() {
            return Err(TrimlineError::metadata_load(url, "media has no frames"));
        }

        if self.is_playing() {
            self.engine.pause()?;
        }

        self.mapping = FrameMapping::full(metadata.duration_in_frames);
        self.engine.load_source(&self.engine_source(&url, &metadata))?;

        let state = self.state();
        self.engine.set_volume(state.volume)?;
        self.engine.set_muted(state.is_muted)?;

        tracing::info!(
            url = %url,
            engine = self.engine.name(),
            frames = metadata.duration_in_frames,
            fps = metadata.fps,
            "Player loaded source"
        );

        self.status.send_modify(|status| {
            status.phase = PlayerPhase::Ready;
            status.source_url = Some(url);
            status.metadata = Some(metadata);
        });
        self.state.send_modify(|s| {
            s.is_playing = false;
            s.current_frame = 0;
        });
        Ok(())
    }

    /// Start playback. Fails before a source is loaded.
    pub fn play(&mut self) -> TrimlineResult<()> {
        match self.phase() {
            PlayerPhase::Idle => Err(TrimlineError::playback("No media loaded")),
            PlayerPhase::Playing => Ok(()),
            PlayerPhase::Ready | PlayerPhase::Paused => {
                self.engine.play()?;
                self.set_phase(PlayerPhase::Playing);
                tracing::debug!("Playback started");
                Ok(())
            }
        }
    }

    /// Pause playback. No engine call unless currently playing.
    pub fn pause(&mut self) -> TrimlineResult<()> {
        if !self.is_playing() {
            return Ok(());
        }
        self.engine.pause()?;
        self.set_phase(PlayerPhase::Paused);
        tracing::debug!("Playback paused");
        Ok(())
    }

    pub fn toggle_play(&mut self) -> TrimlineResult<()> {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Pause the engine unconditionally.
    ///
    /// The engine may have been resumed behind the controller's back (e.g.
    /// by autoplay), so the engine is told to pause even when the phase
    /// already says it is not playing.
    pub fn force_pause(&mut self) -> TrimlineResult<()> {
        if !self.phase().is_loaded() {
            return Ok(());
        }
        self.engine.pause()?;
        if self.is_playing() {
            self.set_phase(PlayerPhase::Paused);
        }
        Ok(())
    }

    /// Seek to a source frame.
    ///
    /// The published position is updated immediately rather than waiting
    /// for the next tick, so the playhead does not jitter.
    pub fn seek(&mut self, source_frame: u64) -> TrimlineResult<()> {
        let player_frame = self.mapping.to_player(source_frame);
        self.seek_player_frame(player_frame)
    }

    /// Seek to a frame of the currently presented window.
    pub fn seek_player_frame(&mut self, player_frame: u64) -> TrimlineResult<()> {
        if !self.phase().is_loaded() {
            return Err(TrimlineError::playback("No media loaded"));
        }
        let player_frame = player_frame.min(self.mapping.player_duration());
        self.engine.seek_to(player_frame)?;
        let source_frame = self.mapping.to_source(player_frame);
        self.state.send_modify(|s| s.current_frame = source_frame);
        tracing::trace!(player_frame, source_frame, "Seek issued");
        Ok(())
    }

    /// Read the engine position and publish it in Source Frame Space.
    ///
    /// Only does work while playing; returns whether ticking should go on.
    pub fn tick(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let duration = self.mapping.player_duration();
        let raw = self.engine.current_frame();
        // Engines loop natively; a position past the window is a wrap that
        // has not been reported yet.
        let player_frame = if duration > 0 && raw > duration {
            raw % duration
        } else {
            raw
        };
        let source_frame = self.mapping.to_source(player_frame);
        self.state.send_if_modified(|s| {
            if s.current_frame == source_frame {
                false
            } else {
                s.current_frame = source_frame;
                true
            }
        });
        true
    }

    /// Hand the engine a new trim window.
    ///
    /// The published position is clamped into the new window; re-anchoring
    /// the playhead to a handle is the trim editor's decision.
    pub fn apply_trim(&mut self, range: TrimRange) -> TrimlineResult<()> {
        let status = self.status.borrow().clone();
        let (Some(url), Some(metadata)) = (status.source_url, status.metadata) else {
            return Err(TrimlineError::playback("No media loaded"));
        };

        self.mapping = FrameMapping::new(range, metadata.duration_in_frames);
        self.engine.load_source(&self.engine_source(&url, &metadata))?;

        let mapping = self.mapping;
        self.state
            .send_modify(|s| s.current_frame = mapping.clamp_source(s.current_frame));
        tracing::debug!(
            start = range.start_frame,
            end = range.end_frame,
            active = mapping.is_active(),
            "Trim applied to player"
        );
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f64) -> TrimlineResult<()> {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.engine.set_volume(volume)?;
        self.state.send_modify(|s| s.volume = volume);
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) -> TrimlineResult<()> {
        self.engine.set_muted(muted)?;
        self.state.send_modify(|s| s.is_muted = muted);
        Ok(())
    }

    pub fn toggle_mute(&mut self) -> TrimlineResult<()> {
        let muted = self.state().is_muted;
        self.set_muted(!muted)
    }

    /// The page became hidden: a background tab must not keep playing.
    pub fn on_visibility_hidden(&mut self) -> TrimlineResult<()> {
        if self.is_playing() {
            tracing::debug!("Pausing for hidden visibility");
        }
        self.pause()
    }

    /// Something covers the player: pause now.
    ///
    /// Returns the delay after which [`PlaybackController::force_pause`]
    /// must be called a second time.
    pub fn on_external_blur_requested(&mut self) -> TrimlineResult<Duration> {
        tracing::debug!("Pausing for external blur");
        self.force_pause()?;
        Ok(self.blur_repause_delay)
    }

    fn set_phase(&mut self, phase: PlayerPhase) {
        self.status.send_modify(|status| status.phase = phase);
        self.state
            .send_modify(|s| s.is_playing = phase == PlayerPhase::Playing);
    }

    fn engine_source(&self, url: &str, metadata: &MediaMetadata) -> EngineSource {
        EngineSource {
            url: url.to_string(),
            fps: metadata.fps,
            duration_in_frames: metadata.duration_in_frames,
            window: self.mapping.engine_window(),
        }
    }
}
