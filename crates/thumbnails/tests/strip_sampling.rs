use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};

use trimline_common::config::ThumbnailDefaults;
use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_thumbnails::{DecoderFactory, OffscreenDecoder, RunOutcome, ThumbnailStripSampler};

/// Behaviour of the fake decoder for one URL.
#[derive(Clone)]
struct FakeSource {
    /// Byte every pixel of a capture is filled with, to tell sources apart.
    tag: u8,
    duration_secs: Option<f64>,
    /// Captures wait for a permit when set.
    capture_gate: Option<Arc<Semaphore>>,
    /// Notified when a capture starts.
    capture_started: Arc<Notify>,
    stall_seeks: bool,
    /// Captures from this index on never finish.
    stall_captures_from: Option<usize>,
}

impl FakeSource {
    fn new(tag: u8, duration_secs: f64) -> Self {
        Self {
            tag,
            duration_secs: Some(duration_secs),
            capture_gate: None,
            capture_started: Arc::new(Notify::new()),
            stall_seeks: false,
            stall_captures_from: None,
        }
    }
}

#[derive(Clone, Default)]
struct FakeFactory {
    sources: Arc<Mutex<HashMap<String, FakeSource>>>,
    seeks: Arc<Mutex<Vec<(String, f64)>>>,
}

impl FakeFactory {
    fn with_source(self, url: &str, source: FakeSource) -> Self {
        self.sources.lock().unwrap().insert(url.to_string(), source);
        self
    }
}

struct FakeDecoder {
    url: String,
    source: FakeSource,
    seeks: Arc<Mutex<Vec<(String, f64)>>>,
    captures: usize,
}

#[async_trait::async_trait]
impl OffscreenDecoder for FakeDecoder {
    async fn duration_secs(&mut self) -> TrimlineResult<f64> {
        self.source
            .duration_secs
            .ok_or_else(|| TrimlineError::metadata_load(&self.url, "unreachable"))
    }

    async fn seek(&mut self, secs: f64) -> TrimlineResult<()> {
        if self.source.stall_seeks {
            std::future::pending::<()>().await;
        }
        self.seeks.lock().unwrap().push((self.url.clone(), secs));
        Ok(())
    }

    async fn capture(&mut self, width: u32, height: u32) -> TrimlineResult<Vec<u8>> {
        self.source.capture_started.notify_one();
        let index = self.captures;
        self.captures += 1;
        if self.source.stall_captures_from.is_some_and(|from| index >= from) {
            std::future::pending::<()>().await;
        }
        if let Some(gate) = &self.source.capture_gate {
            gate.acquire().await.unwrap().forget();
        }
        Ok(vec![self.source.tag; (width * height * 4) as usize])
    }
}

#[async_trait::async_trait]
impl DecoderFactory for FakeFactory {
    async fn open(&self, url: &str) -> TrimlineResult<Box<dyn OffscreenDecoder>> {
        let source = self
            .sources
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| TrimlineError::thumbnail(format!("unknown source {url}")))?;
        Ok(Box::new(FakeDecoder {
            url: url.to_string(),
            source,
            seeks: self.seeks.clone(),
            captures: 0,
        }))
    }
}

fn config() -> ThumbnailDefaults {
    ThumbnailDefaults {
        count: 10,
        width: 4,
        height: 2,
        seek_timeout_ms: 5_000,
    }
}

#[tokio::test(start_paused = true)]
async fn fills_every_slot_across_the_full_duration() {
    let factory = FakeFactory::default().with_source("a.mp4", FakeSource::new(1, 10.0));
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory.clone()), config());

    assert!(sampler.start("a.mp4"));
    assert_eq!(sampler.wait().await, Some(RunOutcome::Completed));

    let strip = sampler.snapshot();
    assert_eq!(strip.source_url.as_deref(), Some("a.mp4"));
    assert!(strip.is_complete());
    for (i, slot) in strip.slots.iter().enumerate() {
        let thumb = slot.as_ref().unwrap();
        assert_eq!(thumb.index, i);
        assert!((thumb.at_secs - i as f64).abs() < 1e-9);
        assert_eq!(thumb.rgba.len(), 32);
    }

    let seeks = factory.seeks.lock().unwrap().clone();
    assert_eq!(seeks.len(), 10);
    assert!((seeks[9].1 - 9.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn switching_sources_never_publishes_stale_thumbnails() {
    let gate = Arc::new(Semaphore::new(0));
    let mut source_a = FakeSource::new(0xA, 10.0);
    source_a.capture_gate = Some(gate.clone());
    let a_capturing = source_a.capture_started.clone();

    let factory = FakeFactory::default()
        .with_source("a.mp4", source_a)
        .with_source("b.mp4", FakeSource::new(0xB, 20.0));
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory), config());
    let strip_rx = sampler.subscribe();

    sampler.start("a.mp4");
    // A is mid-run with a capture in flight.
    a_capturing.notified().await;

    sampler.start("b.mp4");
    assert_eq!(sampler.snapshot().filled(), 0);

    // Let A's late capture land after the switch.
    gate.add_permits(100);
    assert_eq!(sampler.wait().await, Some(RunOutcome::Completed));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let strip = strip_rx.borrow().clone();
    assert_eq!(strip.source_url.as_deref(), Some("b.mp4"));
    assert!(strip.is_complete());
    for slot in &strip.slots {
        let thumb = slot.as_ref().unwrap();
        assert!(thumb.rgba.iter().all(|b| *b == 0xB));
    }
}

#[tokio::test(start_paused = true)]
async fn restarting_the_same_source_is_a_no_op() {
    let factory = FakeFactory::default().with_source("a.mp4", FakeSource::new(1, 5.0));
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory.clone()), config());

    assert!(sampler.start("a.mp4"));
    sampler.wait().await;
    assert!(!sampler.start("a.mp4"));
    assert_eq!(factory.seeks.lock().unwrap().len(), 10);
}

#[tokio::test(start_paused = true)]
async fn stalled_seek_abandons_the_run_and_leaves_slots_loading() {
    let mut source = FakeSource::new(1, 10.0);
    source.stall_seeks = true;
    let factory = FakeFactory::default().with_source("slow.mp4", source);
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory), config());

    sampler.start("slow.mp4");
    assert_eq!(sampler.wait().await, Some(RunOutcome::Failed));

    let strip = sampler.snapshot();
    assert_eq!(strip.len(), 10);
    assert_eq!(strip.filled(), 0);
}

#[tokio::test(start_paused = true)]
async fn hung_capture_ends_the_run_within_the_stall_budget() {
    let mut source = FakeSource::new(7, 10.0);
    source.stall_captures_from = Some(3);
    let factory = FakeFactory::default().with_source("net.mp4", source);
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory), config());

    sampler.start("net.mp4");
    let outcome = tokio::time::timeout(Duration::from_secs(60), sampler.wait())
        .await
        .expect("run should end once the capture exceeds the stall budget");
    assert_eq!(outcome, Some(RunOutcome::Failed));

    let strip = sampler.snapshot();
    assert_eq!(strip.filled(), 3);
    assert!(strip.slots[3..].iter().all(Option::is_none));
}

#[tokio::test(start_paused = true)]
async fn metadata_failure_is_swallowed() {
    let mut source = FakeSource::new(1, 10.0);
    source.duration_secs = None;
    let factory = FakeFactory::default().with_source("gone.mp4", source);
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory), config());

    sampler.start("gone.mp4");
    assert_eq!(sampler.wait().await, Some(RunOutcome::Failed));
    assert_eq!(sampler.snapshot().filled(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_the_in_flight_capture() {
    let gate = Arc::new(Semaphore::new(0));
    let mut source = FakeSource::new(1, 10.0);
    source.capture_gate = Some(gate.clone());
    let capturing = source.capture_started.clone();
    let factory = FakeFactory::default().with_source("a.mp4", source);
    let mut sampler = ThumbnailStripSampler::new(Arc::new(factory), config());

    sampler.start("a.mp4");
    capturing.notified().await;
    sampler.cancel();
    gate.add_permits(100);
    tokio::time::sleep(Duration::from_secs(1)).await;

    // The in-flight capture was dropped, not left to finish.
    assert_eq!(gate.available_permits(), 100);
    assert_eq!(sampler.snapshot().filled(), 0);
    assert_eq!(sampler.source_url(), None);
}
