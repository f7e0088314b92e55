//! Play a synthetic source through the player driver.

use std::time::Duration;

use trimline_common::config::AppConfig;
use trimline_playback::{
    spawn_player, HeadlessEngine, PlaybackController, StaticResolver, TrimRangeEditor,
};
use trimline_timeline_model::media::MediaMetadata;
use trimline_timeline_model::trim::TrimRange;

const PREVIEW_URL: &str = "headless://preview";

pub async fn run(
    config: &AppConfig,
    total: u64,
    fps: f64,
    start: Option<u64>,
    end: Option<u64>,
    secs: f64,
) -> anyhow::Result<()> {
    let metadata = MediaMetadata::new(total, 1920, 1080, fps);
    let controller = PlaybackController::new(Box::new(HeadlessEngine::new()), &config.player);
    let (mut player, task) = spawn_player(controller, &config.player);

    player
        .open(PREVIEW_URL, &StaticResolver::new(metadata))
        .await?;

    let mut editor = TrimRangeEditor::for_metadata(&metadata, &config.player);
    if start.is_some() || end.is_some() {
        let range = TrimRange::new(start.unwrap_or(0), end.unwrap_or(total));
        editor.set_range(range, &mut player)?;
    }
    let range = editor.range();
    tracing::info!(
        start = range.start_frame,
        end = range.end_frame,
        active = editor.is_active(),
        "Preview window"
    );

    let mut positions = player.subscribe();
    player.play().await?;

    let deadline = tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0)));
    tokio::pin!(deadline);
    let mut last_logged = None;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = positions.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = positions.borrow_and_update().current_frame;
                tracing::debug!(frame, "Position");
                // One info line per second of source time.
                let second = metadata.frames_to_secs(frame).floor() as u64;
                if last_logged != Some(second) {
                    last_logged = Some(second);
                    tracing::info!(frame, secs = metadata.frames_to_secs(frame), "Playing");
                }
            }
        }
    }

    let state = player.state();
    player.shutdown().await?;
    task.await?;

    println!(
        "Stopped at source frame {} ({:.2}s) after {:.1}s of playback",
        state.current_frame,
        metadata.frames_to_secs(state.current_frame),
        secs
    );
    Ok(())
}
