//! Error types shared across Trimline crates.

/// Top-level error type for Trimline operations.
#[derive(Debug, thiserror::Error)]
pub enum TrimlineError {
    #[error("Metadata load failed for {url}: {message}")]
    MetadataLoad { url: String, message: String },

    #[error("Playback error: {message}")]
    Playback { message: String },

    #[error("Media engine error: {message}")]
    Engine { message: String },

    #[error("Trim error: {message}")]
    Trim { message: String },

    #[error("Thumbnail error: {message}")]
    Thumbnail { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Export timed out after {secs}s without a terminal event")]
    ExportTimeout { secs: u64 },

    #[error("Export job failed: {message}")]
    ExportJobFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TrimlineError.
pub type TrimlineResult<T> = Result<T, TrimlineError>;

impl TrimlineError {
    pub fn metadata_load(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MetadataLoad {
            url: url.into(),
            message: msg.into(),
        }
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback {
            message: msg.into(),
        }
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine {
            message: msg.into(),
        }
    }

    pub fn trim(msg: impl Into<String>) -> Self {
        Self::Trim {
            message: msg.into(),
        }
    }

    pub fn thumbnail(msg: impl Into<String>) -> Self {
        Self::Thumbnail {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn export_job_failed(msg: impl Into<String>) -> Self {
        Self::ExportJobFailed {
            message: msg.into(),
        }
    }

    /// Whether the caller can reasonably offer the user a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExportTimeout { .. } | Self::MetadataLoad { .. } | Self::Io(_)
        )
    }
}
