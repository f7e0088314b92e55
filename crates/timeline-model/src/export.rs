//! Trim export requests and completion events.

use serde::{Deserialize, Serialize};
use trimline_common::clock::FrameClock;

use crate::trim::TrimRange;

/// Time-based trim window submitted to the render service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimOptions {
    #[serde(rename = "start")]
    pub start_secs: f64,
    #[serde(rename = "end")]
    pub end_secs: f64,
}

impl TrimOptions {
    /// Convert a frame range to seconds at `fps`.
    pub fn from_range(range: &TrimRange, fps: f64) -> Self {
        let clock = FrameClock::new(fps);
        Self {
            start_secs: clock.frames_to_secs(range.start_frame),
            end_secs: clock.frames_to_secs(range.end_frame),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

/// Lifecycle of an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Pending,
    Completed,
    Failed,
}

/// A trim export submitted to the render service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Fresh identifier per call; keys the completion channel.
    pub request_id: String,

    /// Source media identifier.
    pub source_id: String,

    pub trim_start_secs: f64,
    pub trim_end_secs: f64,

    pub status: ExportStatus,

    /// Submission timestamp (RFC 3339).
    pub submitted_at: String,
}

impl ExportRequest {
    pub fn pending(
        request_id: impl Into<String>,
        source_id: impl Into<String>,
        options: TrimOptions,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            source_id: source_id.into(),
            trim_start_secs: options.start_secs,
            trim_end_secs: options.end_secs,
            status: ExportStatus::Pending,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn options(&self) -> TrimOptions {
        TrimOptions {
            start_secs: self.trim_start_secs,
            end_secs: self.trim_end_secs,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != ExportStatus::Pending
    }
}

/// Terminal status reported on the completion channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportEventStatus {
    Completed,
    Failed,
}

/// Payload delivered on the completion channel keyed by request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEvent {
    pub status: ExportEventStatus,
    #[serde(
        default,
        rename = "downloadLocation",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExportEvent {
    pub fn completed(download_location: impl Into<String>) -> Self {
        Self {
            status: ExportEventStatus::Completed,
            download_location: Some(download_location.into()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ExportEventStatus::Failed,
            download_location: None,
            message: Some(message.into()),
        }
    }
}

/// Download filename for an export of `source_id`.
///
/// Trimmed exports carry their window so repeated exports do not collide.
pub fn export_filename(source_id: &str, options: Option<&TrimOptions>) -> String {
    let stem: String = source_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "video".to_string() } else { stem };
    match options {
        Some(opts) => format!("{stem}_{:.1}s-{:.1}s.mp4", opts.start_secs, opts.end_secs),
        None => format!("{stem}.mp4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_options_at_30fps() {
        let opts = TrimOptions::from_range(&TrimRange::new(90, 210), 30.0);
        assert!((opts.start_secs - 3.0).abs() < 1e-9);
        assert!((opts.end_secs - 7.0).abs() < 1e-9);
        assert!((opts.duration_secs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_options_wire_names() {
        let opts = TrimOptions {
            start_secs: 3.0,
            end_secs: 7.0,
        };
        let json = serde_json::to_value(opts).unwrap();
        assert_eq!(json, serde_json::json!({"start": 3.0, "end": 7.0}));
    }

    #[test]
    fn test_event_deserializes_from_channel_payload() {
        let event: ExportEvent = serde_json::from_str(
            r#"{"status":"completed","downloadLocation":"exports/abc.mp4"}"#,
        )
        .unwrap();
        assert_eq!(event, ExportEvent::completed("exports/abc.mp4"));

        let failed: ExportEvent =
            serde_json::from_str(r#"{"status":"failed","message":"codec error"}"#).unwrap();
        assert_eq!(failed.message.as_deref(), Some("codec error"));
    }

    #[test]
    fn test_pending_request() {
        let opts = TrimOptions {
            start_secs: 1.0,
            end_secs: 2.0,
        };
        let request = ExportRequest::pending("req-1", "video-9", opts);
        assert_eq!(request.status, ExportStatus::Pending);
        assert!(!request.is_terminal());
        assert_eq!(request.options(), opts);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("clip 7", None), "clip_7.mp4");
        let opts = TrimOptions {
            start_secs: 3.0,
            end_secs: 7.0,
        };
        assert_eq!(export_filename("clip", Some(&opts)), "clip_3.0s-7.0s.mp4");
        assert_eq!(export_filename("", None), "video.mp4");
    }
}
