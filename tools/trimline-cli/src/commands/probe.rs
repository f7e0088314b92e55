//! Resolve media metadata.

use trimline_playback::{FfprobeResolver, MetadataResolver};

pub async fn run(url: String) -> anyhow::Result<()> {
    let resolver = FfprobeResolver::new();
    if !resolver.is_available().await {
        anyhow::bail!("ffprobe not found on PATH");
    }

    let metadata = resolver
        .resolve_metadata(&url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to probe {url}: {e}"))?;

    println!("Media: {url}");
    println!("  Resolution: {}x{}", metadata.width, metadata.height);
    println!("  Frame rate: {:.3} fps", metadata.fps);
    println!(
        "  Duration: {} frames ({:.2}s)",
        metadata.duration_in_frames,
        metadata.duration_secs()
    );
    Ok(())
}
