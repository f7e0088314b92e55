//! Media metadata resolution.

use serde::Deserialize;
use tokio::process::Command;

use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_timeline_model::media::MediaMetadata;

/// Resolves duration, resolution and frame rate for a source URL.
#[async_trait::async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Fails with [`TrimlineError::MetadataLoad`] for unreachable or
    /// undecodable media.
    async fn resolve_metadata(&self, url: &str) -> TrimlineResult<MediaMetadata>;
}

/// Resolver that returns the same metadata for every URL.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    metadata: MediaMetadata,
}

impl StaticResolver {
    pub fn new(metadata: MediaMetadata) -> Self {
        Self { metadata }
    }
}

#[async_trait::async_trait]
impl MetadataResolver for StaticResolver {
    async fn resolve_metadata(&self, url: &str) -> TrimlineResult<MediaMetadata> {
        if !self.metadata.is_playable() {
            return Err(TrimlineError::metadata_load(url, "media has no frames"));
        }
        Ok(self.metadata)
    }
}

/// Resolver backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeResolver {
    binary: String,
}

impl FfprobeResolver {
    pub fn new() -> Self {
        Self {
            binary: "ffprobe".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Whether the configured binary can be found.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Default for FfprobeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetadataResolver for FfprobeResolver {
    async fn resolve_metadata(&self, url: &str) -> TrimlineResult<MediaMetadata> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames:format=duration",
                "-of",
                "json",
            ])
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TrimlineError::metadata_load(url, format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrimlineError::metadata_load(url, stderr.trim().to_string()));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_ffprobe_json(&raw).map_err(|e| TrimlineError::metadata_load(url, e))?;
        tracing::debug!(
            url,
            frames = metadata.duration_in_frames,
            fps = metadata.fps,
            "Resolved media metadata"
        );
        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output into metadata.
fn parse_ffprobe_json(raw: &str) -> Result<MediaMetadata, String> {
    let probe: ProbeOutput =
        serde_json::from_str(raw).map_err(|e| format!("invalid ffprobe output: {e}"))?;
    let stream = probe
        .streams
        .first()
        .ok_or_else(|| "no video stream".to_string())?;

    let width = stream.width.filter(|w| *w > 0).ok_or("missing width")?;
    let height = stream.height.filter(|h| *h > 0).ok_or("missing height")?;
    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .ok_or("missing frame rate")?;

    let frames = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .filter(|n| *n > 0);

    let metadata = match frames {
        Some(frames) => MediaMetadata::new(frames, width, height, fps),
        None => {
            let duration_secs = probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(|d| d.parse::<f64>().ok())
                .ok_or("missing duration")?;
            MediaMetadata::from_duration_secs(duration_secs, width, height, fps)
        }
    };

    if !metadata.is_playable() {
        return Err("media has no frames".to_string());
    }
    Ok(metadata)
}

/// Parse an ffprobe rational such as `30000/1001` or `25/1`.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/').unwrap_or((raw, "1"));
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
