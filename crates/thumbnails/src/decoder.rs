//! Off-screen decode contexts used for sampling.

use std::process::Stdio;

use tokio::process::Command;

use trimline_common::error::{TrimlineError, TrimlineResult};

/// A hidden decode context for a single source.
#[async_trait::async_trait]
pub trait OffscreenDecoder: Send {
    /// Full duration of the source in seconds.
    async fn duration_secs(&mut self) -> TrimlineResult<f64>;

    /// Position the decoder at `secs`. Completes when the frame is ready.
    async fn seek(&mut self, secs: f64) -> TrimlineResult<()>;

    /// Snapshot the current frame as RGBA8 scaled to `width` x `height`.
    async fn capture(&mut self, width: u32, height: u32) -> TrimlineResult<Vec<u8>>;
}

/// Opens independent decode contexts.
#[async_trait::async_trait]
pub trait DecoderFactory: Send + Sync {
    async fn open(&self, url: &str) -> TrimlineResult<Box<dyn OffscreenDecoder>>;
}

/// Decoder factory backed by the `ffprobe`/`ffmpeg` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegDecoderFactory {
    ffmpeg: String,
    ffprobe: String,
}

impl FfmpegDecoderFactory {
    pub fn new() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Default for FfmpegDecoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DecoderFactory for FfmpegDecoderFactory {
    async fn open(&self, url: &str) -> TrimlineResult<Box<dyn OffscreenDecoder>> {
        Ok(Box::new(FfmpegDecoder {
            url: url.to_string(),
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            position_secs: 0.0,
        }))
    }
}

/// Seeks are recorded; each capture decodes exactly one frame at the
/// recorded position. Child processes die with their future, so a timed
/// out capture does not leave ffmpeg running.
struct FfmpegDecoder {
    url: String,
    ffmpeg: String,
    ffprobe: String,
    position_secs: f64,
}

#[async_trait::async_trait]
impl OffscreenDecoder for FfmpegDecoder {
    async fn duration_secs(&mut self) -> TrimlineResult<f64> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(&self.url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TrimlineError::metadata_load(&self.url, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrimlineError::metadata_load(&self.url, stderr.trim()));
        }

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| TrimlineError::metadata_load(&self.url, "unreadable duration"))
    }

    async fn seek(&mut self, secs: f64) -> TrimlineResult<()> {
        self.position_secs = secs.max(0.0);
        Ok(())
    }

    async fn capture(&mut self, width: u32, height: u32) -> TrimlineResult<Vec<u8>> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss"])
            .arg(format!("{:.3}", self.position_secs))
            .arg("-i")
            .arg(&self.url)
            .args(["-frames:v", "1", "-vf"])
            .arg(format!("scale={width}:{height}"))
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "-"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TrimlineError::thumbnail(format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrimlineError::thumbnail(format!(
                "ffmpeg capture at {:.3}s failed: {}",
                self.position_secs,
                stderr.trim()
            )));
        }

        let expected = width as usize * height as usize * 4;
        if output.stdout.len() != expected {
            return Err(TrimlineError::thumbnail(format!(
                "expected {expected} bytes of RGBA, got {}",
                output.stdout.len()
            )));
        }
        Ok(output.stdout)
    }
}
