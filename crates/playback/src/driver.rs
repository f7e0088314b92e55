//! Single-task driver for a [`PlaybackController`].
//!
//! Commands and the per-frame tick are handled one at a time by one task,
//! so the controller needs no locking. The tick arm only runs while the
//! player is playing and goes quiet the moment it stops.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use trimline_common::clock::RefreshRate;
use trimline_common::config::PlayerDefaults;
use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_timeline_model::media::MediaMetadata;
use trimline_timeline_model::playback::{PlaybackState, PlayerPhase};
use trimline_timeline_model::trim::TrimRange;

use crate::controller::{PlaybackController, PlayerStatus};
use crate::metadata::MetadataResolver;
use crate::trim_editor::TrimFollower;

/// Operations understood by the driver task.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Load { url: String, metadata: MediaMetadata },
    Play,
    Pause,
    TogglePlay,
    Seek(u64),
    SeekPlayer(u64),
    ApplyTrim(TrimRange),
    SetVolume(f64),
    SetMuted(bool),
    ToggleMute,
    VisibilityHidden,
    ExternalBlur,
    /// Second half of an external blur, sent by the driver itself.
    BlurRepause,
    Shutdown,
}

type Reply = oneshot::Sender<TrimlineResult<()>>;

struct Envelope {
    command: PlayerCommand,
    reply: Option<Reply>,
}

/// Cloneable handle to a running player task.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<Envelope>,
    state: watch::Receiver<PlaybackState>,
    status: watch::Receiver<PlayerStatus>,
}

/// Spawn the driver task for `controller`.
pub fn spawn_player(
    controller: PlaybackController,
    defaults: &PlayerDefaults,
) -> (PlayerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = PlayerHandle {
        commands: tx.clone(),
        state: controller.subscribe(),
        status: controller.subscribe_status(),
    };
    let refresh = RefreshRate::new(defaults.refresh_hz);
    let task = tokio::spawn(run_player(controller, rx, tx.downgrade(), refresh));
    (handle, task)
}

async fn run_player(
    mut controller: PlaybackController,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    weak_tx: mpsc::WeakUnboundedSender<Envelope>,
    refresh: RefreshRate,
) {
    let mut ticker = tokio::time::interval(refresh.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(refresh_hz = refresh.hz(), "Player task started");

    loop {
        let playing = controller.is_playing();
        tokio::select! {
            envelope = rx.recv() => {
                let Some(Envelope { command, reply }) = envelope else {
                    break;
                };
                if matches!(command, PlayerCommand::Shutdown) {
                    if let Some(reply) = reply {
                        let _ = reply.send(Ok(()));
                    }
                    break;
                }
                let was_playing = playing;
                let result = handle_command(&mut controller, command, &weak_tx);
                if !was_playing && controller.is_playing() {
                    ticker.reset();
                }
                match reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            tracing::warn!(error = %e, "Player command failed");
                        }
                    }
                }
            }
            _ = ticker.tick(), if playing => {
                controller.tick();
            }
        }
    }

    if let Err(e) = controller.force_pause() {
        tracing::warn!(error = %e, "Failed to pause engine on shutdown");
    }
    tracing::debug!("Player task stopped");
}

fn handle_command(
    controller: &mut PlaybackController,
    command: PlayerCommand,
    weak_tx: &mpsc::WeakUnboundedSender<Envelope>,
) -> TrimlineResult<()> {
    match command {
        PlayerCommand::Load { url, metadata } => controller.load(url, metadata),
        PlayerCommand::Play => controller.play(),
        PlayerCommand::Pause => controller.pause(),
        PlayerCommand::TogglePlay => controller.toggle_play(),
        PlayerCommand::Seek(frame) => controller.seek(frame),
        PlayerCommand::SeekPlayer(frame) => controller.seek_player_frame(frame),
        PlayerCommand::ApplyTrim(range) => controller.apply_trim(range),
        PlayerCommand::SetVolume(volume) => controller.set_volume(volume),
        PlayerCommand::SetMuted(muted) => controller.set_muted(muted),
        PlayerCommand::ToggleMute => controller.toggle_mute(),
        PlayerCommand::VisibilityHidden => controller.on_visibility_hidden(),
        PlayerCommand::ExternalBlur => {
            let delay = controller.on_external_blur_requested()?;
            let weak_tx = weak_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(tx) = weak_tx.upgrade() {
                    let _ = tx.send(Envelope {
                        command: PlayerCommand::BlurRepause,
                        reply: None,
                    });
                }
            });
            Ok(())
        }
        PlayerCommand::BlurRepause => controller.force_pause(),
        PlayerCommand::Shutdown => Ok(()),
    }
}

impl PlayerHandle {
    /// Queue a command without waiting for it; failures are logged by the task.
    pub fn send(&self, command: PlayerCommand) -> TrimlineResult<()> {
        self.commands
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| TrimlineError::playback("Player task has stopped"))
    }

    /// Run a command and wait for its result.
    pub async fn request(&self, command: PlayerCommand) -> TrimlineResult<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Envelope {
                command,
                reply: Some(reply),
            })
            .map_err(|_| TrimlineError::playback("Player task has stopped"))?;
        rx.await
            .map_err(|_| TrimlineError::playback("Player task dropped the request"))?
    }

    /// Resolve metadata for `url` and load it.
    ///
    /// Re-opening the URL that is already loaded keeps the existing
    /// metadata. On failure the player stays in its previous phase.
    pub async fn open(&self, url: &str, resolver: &dyn MetadataResolver) -> TrimlineResult<()> {
        {
            let status = self.status.borrow();
            if status.phase.is_loaded() && status.source_url.as_deref() == Some(url) {
                return Ok(());
            }
        }

        let metadata = match resolver.resolve_metadata(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(url, error = %e, "Metadata load failed");
                return Err(e);
            }
        };

        self.request(PlayerCommand::Load {
            url: url.to_string(),
            metadata,
        })
        .await
    }

    pub async fn play(&self) -> TrimlineResult<()> {
        self.request(PlayerCommand::Play).await
    }

    pub fn pause(&self) -> TrimlineResult<()> {
        self.send(PlayerCommand::Pause)
    }

    pub fn seek(&self, source_frame: u64) -> TrimlineResult<()> {
        self.send(PlayerCommand::Seek(source_frame))
    }

    pub fn set_volume(&self, volume: f64) -> TrimlineResult<()> {
        self.send(PlayerCommand::SetVolume(volume))
    }

    pub fn toggle_mute(&self) -> TrimlineResult<()> {
        self.send(PlayerCommand::ToggleMute)
    }

    pub fn on_visibility_hidden(&self) -> TrimlineResult<()> {
        self.send(PlayerCommand::VisibilityHidden)
    }

    pub fn on_external_blur_requested(&self) -> TrimlineResult<()> {
        self.send(PlayerCommand::ExternalBlur)
    }

    /// Stop the driver task. The engine is paused on the way out.
    pub async fn shutdown(&self) -> TrimlineResult<()> {
        self.request(PlayerCommand::Shutdown).await
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    pub fn status(&self) -> PlayerStatus {
        self.status.borrow().clone()
    }

    pub fn phase(&self) -> PlayerPhase {
        self.status.borrow().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PlayerStatus> {
        self.status.clone()
    }
}

impl TrimFollower for PlayerHandle {
    fn apply_trim(&mut self, range: TrimRange) -> TrimlineResult<()> {
        self.send(PlayerCommand::ApplyTrim(range))
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().is_playing
    }

    fn pause(&mut self) -> TrimlineResult<()> {
        self.send(PlayerCommand::Pause)
    }

    fn seek_player_frame(&mut self, player_frame: u64) -> TrimlineResult<()> {
        self.send(PlayerCommand::SeekPlayer(player_frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;
    use crate::metadata::StaticResolver;
    use std::time::Duration;

    fn spawn_headless() -> (PlayerHandle, JoinHandle<()>) {
        let defaults = PlayerDefaults::default();
        let controller = PlaybackController::new(Box::new(HeadlessEngine::new()), &defaults);
        spawn_player(controller, &defaults)
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_then_play_publishes_positions() {
        let (player, _task) = spawn_headless();
        let resolver = StaticResolver::new(MediaMetadata::new(300, 1920, 1080, 30.0));
        player.open("file:///clip.mp4", &resolver).await.unwrap();
        assert_eq!(player.phase(), PlayerPhase::Ready);

        player.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let state = player.state();
        assert!(state.is_playing);
        assert!(state.current_frame >= 28 && state.current_frame <= 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_failure_keeps_player_idle() {
        let (player, _task) = spawn_headless();
        let resolver = StaticResolver::new(MediaMetadata::new(0, 0, 0, 30.0));
        assert!(player.open("file:///broken.mp4", &resolver).await.is_err());
        assert_eq!(player.phase(), PlayerPhase::Idle);
        assert!(player.play().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_position_updates() {
        let (player, _task) = spawn_headless();
        let resolver = StaticResolver::new(MediaMetadata::new(300, 1920, 1080, 30.0));
        player.open("file:///clip.mp4", &resolver).await.unwrap();
        player.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        player.request(PlayerCommand::Pause).await.unwrap();
        let frozen = player.state().current_frame;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(player.state().current_frame, frozen);
        assert!(!player.state().is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_task() {
        let (player, task) = spawn_headless();
        player.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(player.send(PlayerCommand::Play).is_err());
    }
}
