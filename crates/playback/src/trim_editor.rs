//! Trim range editing.
//!
//! The editor owns the [`TrimRange`]. Each range change hands the player a
//! different sub-clip, so after a handle drag the player is re-anchored to
//! the handle that moved; otherwise the displayed frame would jump.

use tokio::sync::watch;

use trimline_common::config::PlayerDefaults;
use trimline_common::error::TrimlineResult;
use trimline_timeline_model::frames::FrameMapping;
use trimline_timeline_model::media::MediaMetadata;
use trimline_timeline_model::trim::{HandleMove, TrimRange};

use crate::controller::PlaybackController;

/// Player operations the trim editor depends on.
pub trait TrimFollower {
    /// Present the given range from now on.
    fn apply_trim(&mut self, range: TrimRange) -> TrimlineResult<()>;

    fn is_playing(&self) -> bool;

    fn pause(&mut self) -> TrimlineResult<()>;

    /// Seek within the presented window.
    fn seek_player_frame(&mut self, player_frame: u64) -> TrimlineResult<()>;
}

impl TrimFollower for PlaybackController {
    fn apply_trim(&mut self, range: TrimRange) -> TrimlineResult<()> {
        PlaybackController::apply_trim(self, range)
    }

    fn is_playing(&self) -> bool {
        PlaybackController::is_playing(self)
    }

    fn pause(&mut self) -> TrimlineResult<()> {
        PlaybackController::pause(self)
    }

    fn seek_player_frame(&mut self, player_frame: u64) -> TrimlineResult<()> {
        PlaybackController::seek_player_frame(self, player_frame)
    }
}

/// Owns the trim range of the current source.
pub struct TrimRangeEditor {
    total: u64,
    min_gap: u64,
    range: watch::Sender<TrimRange>,
}

impl TrimRangeEditor {
    /// Editor over a source of `total` frames with handles at least
    /// `min_gap` frames apart.
    pub fn new(total: u64, min_gap: u64) -> Self {
        let (range, _) = watch::channel(TrimRange::full(total));
        Self {
            total,
            min_gap: min_gap.max(1),
            range,
        }
    }

    /// Editor for `metadata` with the configured minimum handle gap.
    pub fn for_metadata(metadata: &MediaMetadata, defaults: &PlayerDefaults) -> Self {
        Self::new(
            metadata.duration_in_frames,
            metadata.min_trim_gap_frames(defaults.min_trim_gap_secs),
        )
    }

    pub fn range(&self) -> TrimRange {
        *self.range.borrow()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn min_gap(&self) -> u64 {
        self.min_gap
    }

    pub fn mapping(&self) -> FrameMapping {
        FrameMapping::new(self.range(), self.total)
    }

    pub fn is_active(&self) -> bool {
        self.mapping().is_active()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrimRange> {
        self.range.subscribe()
    }

    /// Replace the range and re-anchor the player to the moved handle.
    ///
    /// - start moved: pause if playing, seek to player frame 0
    /// - end moved: pause if playing, seek to player frame `end - start`
    /// - both moved: handled as a start move
    ///
    /// An invalid range, or one the player refuses, is rejected and leaves
    /// both editor and player untouched.
    pub fn set_range(
        &mut self,
        range: TrimRange,
        player: &mut dyn TrimFollower,
    ) -> TrimlineResult<HandleMove> {
        let range =
            TrimRange::validated(range.start_frame, range.end_frame, self.total, self.min_gap)?;
        let moved = range.diff(&self.range());
        if moved == HandleMove::Unchanged {
            return Ok(moved);
        }

        player.apply_trim(range)?;
        self.range.send_replace(range);

        let anchor = match moved {
            HandleMove::End => range.len(),
            _ => 0,
        };
        if player.is_playing() {
            player.pause()?;
        }
        player.seek_player_frame(anchor)?;

        tracing::debug!(
            start = range.start_frame,
            end = range.end_frame,
            ?moved,
            anchor,
            "Trim range updated"
        );
        Ok(moved)
    }

    /// Restore the full range.
    pub fn reset(&mut self, player: &mut dyn TrimFollower) -> TrimlineResult<HandleMove> {
        self.set_range(TrimRange::full(self.total), player)
    }

    /// Start over for a new source. The player resets itself on load, so it
    /// is not notified.
    pub fn rebase(&mut self, total: u64, min_gap: u64) {
        self.total = total;
        self.min_gap = min_gap.max(1);
        self.range.send_replace(TrimRange::full(total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingFollower {
        playing: bool,
        applied: Vec<TrimRange>,
        pauses: usize,
        seeks: Vec<u64>,
    }

    impl TrimFollower for RecordingFollower {
        fn apply_trim(&mut self, range: TrimRange) -> TrimlineResult<()> {
            self.applied.push(range);
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn pause(&mut self) -> TrimlineResult<()> {
            self.playing = false;
            self.pauses += 1;
            Ok(())
        }

        fn seek_player_frame(&mut self, player_frame: u64) -> TrimlineResult<()> {
            self.seeks.push(player_frame);
            Ok(())
        }
    }

    #[test]
    fn test_start_handle_seeks_to_zero() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let mut player = RecordingFollower::default();
        let moved = editor
            .set_range(TrimRange::new(60, 300), &mut player)
            .unwrap();
        assert_eq!(moved, HandleMove::Start);
        assert_eq!(player.seeks, vec![0]);
        assert_eq!(player.pauses, 0);
    }

    #[test]
    fn test_end_handle_seeks_to_window_end_and_pauses() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let mut player = RecordingFollower {
            playing: true,
            ..Default::default()
        };
        editor
            .set_range(TrimRange::new(0, 150), &mut player)
            .unwrap();
        assert_eq!(player.seeks, vec![150]);
        assert_eq!(player.pauses, 1);
        assert!(editor.is_active());
        assert_eq!(editor.mapping().player_duration(), 150);
    }

    #[test]
    fn test_invalid_range_leaves_state_untouched() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let mut player = RecordingFollower::default();
        assert!(editor
            .set_range(TrimRange::new(100, 110), &mut player)
            .is_err());
        assert_eq!(editor.range(), TrimRange::full(300));
        assert!(player.applied.is_empty());
        assert!(player.seeks.is_empty());
    }

    #[test]
    fn test_range_refused_by_unloaded_player_is_not_published() {
        use crate::controller::PlaybackController;
        use crate::engine::HeadlessEngine;
        use trimline_common::config::PlayerDefaults;

        let mut editor = TrimRangeEditor::new(300, 30);
        let rx = editor.subscribe();
        let mut player =
            PlaybackController::new(Box::new(HeadlessEngine::new()), &PlayerDefaults::default());

        assert!(editor
            .set_range(TrimRange::new(0, 150), &mut player)
            .is_err());
        assert_eq!(editor.range(), TrimRange::full(300));
        assert!(!editor.is_active());
        assert!(!rx.has_changed().unwrap());
        assert!(!player.mapping().is_active());
    }

    #[test]
    fn test_unchanged_range_is_a_no_op() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let mut player = RecordingFollower::default();
        let moved = editor.set_range(TrimRange::full(300), &mut player).unwrap();
        assert_eq!(moved, HandleMove::Unchanged);
        assert!(player.applied.is_empty());
    }

    #[test]
    fn test_reset_restores_full_range() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let mut player = RecordingFollower::default();
        editor
            .set_range(TrimRange::new(0, 150), &mut player)
            .unwrap();
        let moved = editor.reset(&mut player).unwrap();
        assert_eq!(moved, HandleMove::End);
        assert_eq!(editor.range(), TrimRange::full(300));
        assert!(!editor.is_active());
        assert_eq!(player.seeks, vec![150, 300]);
    }

    #[test]
    fn test_subscribers_see_new_range() {
        let mut editor = TrimRangeEditor::new(300, 30);
        let rx = editor.subscribe();
        let mut player = RecordingFollower::default();
        editor
            .set_range(TrimRange::new(30, 270), &mut player)
            .unwrap();
        assert_eq!(*rx.borrow(), TrimRange::new(30, 270));
    }

    #[test]
    fn test_rebase_for_new_source() {
        let mut editor = TrimRangeEditor::new(300, 30);
        editor.rebase(600, 60);
        assert_eq!(editor.range(), TrimRange::full(600));
        assert_eq!(editor.min_gap(), 60);
    }
}
