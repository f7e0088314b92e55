//! Observable playback state.

use serde::{Deserialize, Serialize};

/// State published by the playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    /// Volume in `[0.0, 1.0]`.
    pub volume: f64,
    /// Playhead position, always in Source Frame Space.
    pub current_frame: u64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_muted: false,
            volume: 1.0,
            current_frame: 0,
        }
    }
}

impl PlaybackState {
    /// Volume the engine should actually apply.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// Lifecycle of the player.
///
/// `Playing` and `Paused` alternate indefinitely: playback loops, so there
/// is no ended state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPhase {
    /// Waiting for metadata.
    Idle,
    /// Metadata loaded, never started.
    Ready,
    Playing,
    Paused,
}

impl PlayerPhase {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, PlayerPhase::Idle)
    }
}
