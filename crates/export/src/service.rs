//! Collaborators of the export dispatcher.

use std::time::Duration;

use tokio::sync::mpsc;

use trimline_common::error::TrimlineResult;
use trimline_timeline_model::export::ExportEvent;

/// Server-side trim render service.
#[async_trait::async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a trim job. Completion arrives on the [`CompletionChannel`]
    /// under `request_id`.
    async fn submit_trim(
        &self,
        source_id: &str,
        start_secs: f64,
        end_secs: f64,
        request_id: &str,
    ) -> TrimlineResult<()>;

    /// Exchange a storage location for a time-limited download URL.
    async fn signed_download_url(&self, location: &str, ttl: Duration) -> TrimlineResult<String>;
}

/// Push channel of export events keyed by request id.
#[async_trait::async_trait]
pub trait CompletionChannel: Send + Sync {
    async fn subscribe(&self, request_id: &str) -> TrimlineResult<mpsc::Receiver<ExportEvent>>;

    /// Release the subscription for `request_id`. Must not block; it runs
    /// from `Drop`.
    fn unsubscribe(&self, request_id: &str);
}

/// Hands a URL to whatever performs the actual download.
#[async_trait::async_trait]
pub trait DownloadTrigger: Send + Sync {
    async fn download(&self, url: &str, filename: &str) -> TrimlineResult<()>;
}
