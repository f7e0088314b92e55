//! Thumbnail strip sampling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use trimline_common::config::ThumbnailDefaults;
use trimline_timeline_model::thumbnail::{sample_times, Thumbnail, ThumbnailSet};

use crate::decoder::DecoderFactory;

/// How a sampling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every slot was filled.
    Completed,
    /// The run was cancelled or superseded by another source.
    Abandoned,
    /// Metadata, a seek or a capture failed; remaining slots stay empty.
    Failed,
}

struct SamplerRun {
    url: String,
    stop_flag: Arc<AtomicBool>,
    task: Option<JoinHandle<RunOutcome>>,
    outcome: Option<RunOutcome>,
}

/// Owns the [`ThumbnailSet`] for the current source.
pub struct ThumbnailStripSampler {
    factory: Arc<dyn DecoderFactory>,
    config: ThumbnailDefaults,
    set: Arc<watch::Sender<ThumbnailSet>>,
    generation: u64,
    current: Option<SamplerRun>,
}

impl ThumbnailStripSampler {
    pub fn new(factory: Arc<dyn DecoderFactory>, config: ThumbnailDefaults) -> Self {
        let (set, _) = watch::channel(ThumbnailSet::default());
        Self {
            factory,
            config,
            set: Arc::new(set),
            generation: 0,
            current: None,
        }
    }

    /// Begin sampling `url`.
    ///
    /// Returns `false` if `url` is already the sampled source. Otherwise the
    /// previous run is abandoned, the strip is cleared to `count` loading
    /// slots, and a new run starts.
    pub fn start(&mut self, url: &str) -> bool {
        if self.current.as_ref().is_some_and(|run| run.url == url) {
            return false;
        }

        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        self.set.send_replace(ThumbnailSet::loading(
            url,
            generation,
            self.config.count,
        ));

        let stop_flag = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(sample_strip(
            self.factory.clone(),
            url.to_string(),
            generation,
            self.config.clone(),
            stop_flag.clone(),
            self.set.clone(),
        ));

        tracing::debug!(url, generation, count = self.config.count, "Thumbnail sampling started");
        self.current = Some(SamplerRun {
            url: url.to_string(),
            stop_flag,
            task: Some(task),
            outcome: None,
        });
        true
    }

    /// Abandon the current run, if any. Slots already published remain.
    pub fn cancel(&mut self) {
        if let Some(run) = self.current.take() {
            run.stop_flag.store(true, Ordering::SeqCst);
            if let Some(task) = run.task {
                task.abort();
            }
            tracing::debug!(url = %run.url, "Thumbnail sampling abandoned");
        }
    }

    /// Wait for the current run to end.
    ///
    /// The run stays registered, so starting the same URL again is still a
    /// no-op afterwards.
    pub async fn wait(&mut self) -> Option<RunOutcome> {
        let run = self.current.as_mut()?;
        if let Some(task) = run.task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "Thumbnail task ended abnormally");
                    RunOutcome::Failed
                }
            };
            run.outcome = Some(outcome);
        }
        run.outcome
    }

    pub fn source_url(&self) -> Option<&str> {
        self.current.as_ref().map(|run| run.url.as_str())
    }

    pub fn snapshot(&self) -> ThumbnailSet {
        self.set.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThumbnailSet> {
        self.set.subscribe()
    }
}

impl Drop for ThumbnailStripSampler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn sample_strip(
    factory: Arc<dyn DecoderFactory>,
    url: String,
    generation: u64,
    config: ThumbnailDefaults,
    stop_flag: Arc<AtomicBool>,
    set: Arc<watch::Sender<ThumbnailSet>>,
) -> RunOutcome {
    let mut decoder = match factory.open(&url).await {
        Ok(decoder) => decoder,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Thumbnail decoder failed to open");
            return RunOutcome::Failed;
        }
    };

    let duration_secs = match decoder.duration_secs().await {
        Ok(duration) => duration,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Thumbnail metadata failed");
            return RunOutcome::Failed;
        }
    };

    for (index, at_secs) in sample_times(duration_secs, config.count)
        .into_iter()
        .enumerate()
    {
        if stop_flag.load(Ordering::SeqCst) {
            return RunOutcome::Abandoned;
        }

        // A stall may sit in either half; the whole step shares one budget.
        let step = async {
            decoder.seek(at_secs).await?;
            decoder.capture(config.width, config.height).await
        };
        let rgba = match tokio::time::timeout(config.seek_timeout(), step).await {
            Ok(Ok(rgba)) => rgba,
            Ok(Err(e)) => {
                tracing::warn!(url = %url, index, error = %e, "Thumbnail capture failed");
                return RunOutcome::Failed;
            }
            Err(_) => {
                tracing::warn!(url = %url, index, at_secs, "Thumbnail seek or capture stalled");
                return RunOutcome::Failed;
            }
        };

        // The source may have changed while the seek was in flight.
        if stop_flag.load(Ordering::SeqCst) {
            tracing::debug!(url = %url, index, "Dropping thumbnail of abandoned run");
            return RunOutcome::Abandoned;
        }

        let thumbnail = Thumbnail {
            index,
            at_secs,
            width: config.width,
            height: config.height,
            rgba: Arc::from(rgba),
        };
        if !set.send_if_modified(|strip| strip.publish(generation, thumbnail)) {
            tracing::debug!(url = %url, index, "Thumbnail generation superseded");
            return RunOutcome::Abandoned;
        }
    }

    tracing::debug!(url = %url, count = config.count, "Thumbnail strip complete");
    RunOutcome::Completed
}
