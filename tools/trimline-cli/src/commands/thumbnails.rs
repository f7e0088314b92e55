//! Sample the timeline thumbnail strip.

use std::sync::Arc;

use trimline_common::config::AppConfig;
use trimline_thumbnails::{FfmpegDecoderFactory, RunOutcome, ThumbnailStripSampler};

pub async fn run(config: &AppConfig, url: String, count: Option<usize>) -> anyhow::Result<()> {
    let mut settings = config.thumbnails.clone();
    if let Some(count) = count {
        settings.count = count;
    }

    let mut sampler = ThumbnailStripSampler::new(Arc::new(FfmpegDecoderFactory::new()), settings);
    sampler.start(&url);
    let outcome = sampler.wait().await;

    let strip = sampler.snapshot();
    println!("Thumbnails for {url}: {}/{}", strip.filled(), strip.len());
    for (index, slot) in strip.slots.iter().enumerate() {
        match slot {
            Some(thumb) => println!(
                "  [{index}] {:>8.2}s  {}x{}  {} bytes",
                thumb.at_secs,
                thumb.width,
                thumb.height,
                thumb.rgba.len()
            ),
            None => println!("  [{index}] (missing)"),
        }
    }

    match outcome {
        Some(RunOutcome::Completed) => Ok(()),
        other => anyhow::bail!("Thumbnail sampling did not complete: {other:?}"),
    }
}
