//! Timeline thumbnail strip.

use std::sync::Arc;

/// One captured preview frame, RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// Slot in the strip.
    pub index: usize,
    /// Source time the frame was captured at.
    pub at_secs: f64,
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

/// Fixed-length, incrementally filled strip covering the full source.
///
/// `generation` identifies the sampling run the slots belong to; results
/// carrying any other generation are rejected by [`ThumbnailSet::publish`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThumbnailSet {
    pub source_url: Option<String>,
    pub generation: u64,
    pub slots: Vec<Option<Thumbnail>>,
}

impl ThumbnailSet {
    /// An empty strip of `count` loading slots for `source_url`.
    pub fn loading(source_url: impl Into<String>, generation: u64, count: usize) -> Self {
        Self {
            source_url: Some(source_url.into()),
            generation,
            slots: vec![None; count],
        }
    }

    /// Place a thumbnail into its slot if it belongs to this run.
    ///
    /// Returns `false` (and leaves the set untouched) for a stale generation
    /// or an out-of-range slot.
    pub fn publish(&mut self, generation: u64, thumbnail: Thumbnail) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.slots.get_mut(thumbnail.index) {
            Some(slot) => {
                *slot = Some(thumbnail);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.filled() == self.slots.len()
    }
}

/// Evenly spaced sample times `i * duration / count` for `i in 0..count`.
pub fn sample_times(duration_secs: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let step = duration_secs.max(0.0) / count as f64;
    (0..count).map(|i| i as f64 * step).collect()
}
