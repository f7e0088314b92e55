//! Trim range types.
//!
//! A trim is a `[start, end)` sub-interval of Source Frame Space selected
//! for preview and export.

use serde::{Deserialize, Serialize};
use trimline_common::error::TrimlineError;

/// A selected sub-range of the source, in Source Frame Space.
///
/// Invariant (enforced by [`TrimRange::validated`]):
/// `0 <= start_frame < end_frame <= total` and
/// `end_frame - start_frame >= min_gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrimRange {
    pub start_frame: u64,
    pub end_frame: u64,
}

/// Which trim handle changed between two ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMove {
    Unchanged,
    Start,
    End,
    Both,
}

impl TrimRange {
    /// The range covering the whole source.
    pub fn full(total: u64) -> Self {
        Self {
            start_frame: 0,
            end_frame: total,
        }
    }

    /// Build a range without validation. Use for values already known good.
    pub fn new(start_frame: u64, end_frame: u64) -> Self {
        Self {
            start_frame,
            end_frame,
        }
    }

    /// Build a range, checking ordering, bounds and the handle gap.
    pub fn validated(
        start_frame: u64,
        end_frame: u64,
        total: u64,
        min_gap: u64,
    ) -> Result<Self, TrimError> {
        if total == 0 {
            return Err(TrimError::EmptySource);
        }
        if start_frame >= end_frame {
            return Err(TrimError::Inverted {
                start: start_frame,
                end: end_frame,
            });
        }
        if end_frame > total {
            return Err(TrimError::OutOfBounds {
                end: end_frame,
                total,
            });
        }
        let min_gap = min_gap.clamp(1, total);
        if end_frame - start_frame < min_gap {
            return Err(TrimError::GapTooSmall {
                gap: end_frame - start_frame,
                min_gap,
            });
        }
        Ok(Self {
            start_frame,
            end_frame,
        })
    }

    /// Number of frames covered. Zero for a degenerate range.
    pub fn len(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `frame` lies in `[start, end]`.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start_frame && frame <= self.end_frame
    }

    /// Whether this range spans the full source of `total` frames.
    pub fn is_full(&self, total: u64) -> bool {
        self.start_frame == 0 && self.end_frame >= total
    }

    /// Determine which handle moved going from `previous` to `self`.
    pub fn diff(&self, previous: &TrimRange) -> HandleMove {
        let start_moved = self.start_frame != previous.start_frame;
        let end_moved = self.end_frame != previous.end_frame;
        match (start_moved, end_moved) {
            (false, false) => HandleMove::Unchanged,
            (true, false) => HandleMove::Start,
            (false, true) => HandleMove::End,
            (true, true) => HandleMove::Both,
        }
    }
}

/// Errors raised when a trim range violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrimError {
    #[error("Source has no frames to trim")]
    EmptySource,

    #[error("Trim start {start} must be before end {end}")]
    Inverted { start: u64, end: u64 },

    #[error("Trim end {end} exceeds source duration {total}")]
    OutOfBounds { end: u64, total: u64 },

    #[error("Trim handles {gap} frames apart, minimum is {min_gap}")]
    GapTooSmall { gap: u64, min_gap: u64 },
}

impl From<TrimError> for TrimlineError {
    fn from(err: TrimError) -> Self {
        TrimlineError::trim(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range() {
        let range = TrimRange::full(300);
        assert_eq!(range.len(), 300);
        assert!(range.is_full(300));
    }

    #[test]
    fn test_validated_accepts_minimum_gap() {
        let range = TrimRange::validated(100, 130, 300, 30).unwrap();
        assert_eq!(range.len(), 30);
    }

    #[test]
    fn test_validated_rejects_small_gap() {
        let err = TrimRange::validated(100, 120, 300, 30).unwrap_err();
        assert_eq!(err, TrimError::GapTooSmall { gap: 20, min_gap: 30 });
    }

    #[test]
    fn test_validated_rejects_inverted_and_out_of_bounds() {
        assert!(matches!(
            TrimRange::validated(150, 150, 300, 1),
            Err(TrimError::Inverted { .. })
        ));
        assert!(matches!(
            TrimRange::validated(0, 301, 300, 1),
            Err(TrimError::OutOfBounds { .. })
        ));
        assert_eq!(
            TrimRange::validated(0, 1, 0, 1),
            Err(TrimError::EmptySource)
        );
    }

    #[test]
    fn test_gap_clamped_to_short_source() {
        assert!(TrimRange::validated(0, 10, 10, 30).is_ok());
    }

    #[test]
    fn test_diff_identifies_moved_handle() {
        let prev = TrimRange::new(0, 300);
        assert_eq!(TrimRange::new(0, 300).diff(&prev), HandleMove::Unchanged);
        assert_eq!(TrimRange::new(30, 300).diff(&prev), HandleMove::Start);
        assert_eq!(TrimRange::new(0, 150).diff(&prev), HandleMove::End);
        assert_eq!(TrimRange::new(30, 150).diff(&prev), HandleMove::Both);
    }

    #[test]
    fn test_trim_error_converts() {
        let err: TrimlineError = TrimError::EmptySource.into();
        assert!(matches!(err, TrimlineError::Trim { .. }));
    }
}
