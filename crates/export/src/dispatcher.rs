//! Export dispatch for the current trim range.

use std::sync::Arc;

use uuid::Uuid;

use trimline_common::config::ExportDefaults;
use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_timeline_model::export::{
    export_filename, ExportEventStatus, ExportRequest, ExportStatus, TrimOptions,
};
use trimline_timeline_model::frames::is_trim_active;
use trimline_timeline_model::media::MediaMetadata;
use trimline_timeline_model::trim::TrimRange;

use crate::service::{CompletionChannel, DownloadTrigger, RenderService};
use crate::subscription::SubscriptionGuard;

/// What an export handed to the download trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDownload {
    pub url: String,
    pub filename: String,
    /// Set when the download came from a server-side trim job.
    pub request_id: Option<String>,
}

/// Turns the current trim range into a download.
///
/// An untrimmed source is downloaded as-is. A trimmed one is rendered by the
/// [`RenderService`] and downloaded once its completion event arrives.
pub struct ExportRequestDispatcher {
    render: Arc<dyn RenderService>,
    channel: Arc<dyn CompletionChannel>,
    downloads: Arc<dyn DownloadTrigger>,
    config: ExportDefaults,
    last_request: Option<ExportRequest>,
}

impl ExportRequestDispatcher {
    pub fn new(
        render: Arc<dyn RenderService>,
        channel: Arc<dyn CompletionChannel>,
        downloads: Arc<dyn DownloadTrigger>,
        config: ExportDefaults,
    ) -> Self {
        Self {
            render,
            channel,
            downloads,
            config,
            last_request: None,
        }
    }

    /// The most recent trim job, with its final status once it ended.
    pub fn last_request(&self) -> Option<&ExportRequest> {
        self.last_request.as_ref()
    }

    /// Export `range` of the source.
    ///
    /// Taking `&mut self` keeps a single export outstanding per dispatcher.
    pub async fn export(
        &mut self,
        source_id: &str,
        source_url: &str,
        range: TrimRange,
        metadata: &MediaMetadata,
    ) -> TrimlineResult<ExportDownload> {
        if !is_trim_active(&range, metadata.duration_in_frames) {
            let filename = export_filename(source_id, None);
            tracing::info!(source_id, filename = %filename, "Exporting untrimmed source");
            self.downloads.download(source_url, &filename).await?;
            return Ok(ExportDownload {
                url: source_url.to_string(),
                filename,
                request_id: None,
            });
        }

        let options = TrimOptions::from_range(&range, metadata.fps);
        let request_id = Uuid::new_v4().to_string();

        tracing::info!(
            source_id,
            request_id = %request_id,
            start_secs = options.start_secs,
            end_secs = options.end_secs,
            duration_secs = options.duration_secs(),
            "Submitting trim export"
        );

        let mut pending = PendingRequest::record(
            &mut self.last_request,
            ExportRequest::pending(&request_id, source_id, options),
        );
        let job = TrimJob {
            render: self.render.as_ref(),
            channel: &self.channel,
            downloads: self.downloads.as_ref(),
            config: &self.config,
        };
        let result = job.run(source_id, &request_id, options).await;

        match &result {
            Ok(download) => {
                pending.complete();
                tracing::info!(request_id = %request_id, filename = %download.filename, "Trim export downloaded")
            }
            Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Trim export failed"),
        }
        result
    }
}

/// Keeps `last_request` honest: anything that has not completed when the
/// export ends, including a dropped export future, is recorded as failed.
struct PendingRequest<'a> {
    slot: &'a mut Option<ExportRequest>,
}

impl<'a> PendingRequest<'a> {
    fn record(slot: &'a mut Option<ExportRequest>, request: ExportRequest) -> Self {
        *slot = Some(request);
        Self { slot }
    }

    fn complete(&mut self) {
        if let Some(request) = self.slot.as_mut() {
            request.status = ExportStatus::Completed;
        }
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if let Some(request) = self.slot.as_mut() {
            if !request.is_terminal() {
                request.status = ExportStatus::Failed;
            }
        }
    }
}

/// Collaborators borrowed for the duration of one trim job.
struct TrimJob<'a> {
    render: &'a dyn RenderService,
    channel: &'a Arc<dyn CompletionChannel>,
    downloads: &'a dyn DownloadTrigger,
    config: &'a ExportDefaults,
}

impl TrimJob<'_> {
    async fn run(
        &self,
        source_id: &str,
        request_id: &str,
        options: TrimOptions,
    ) -> TrimlineResult<ExportDownload> {
        // Subscribe before submitting so a fast completion is not missed.
        let mut subscription = SubscriptionGuard::acquire(self.channel.clone(), request_id).await?;

        self.render
            .submit_trim(source_id, options.start_secs, options.end_secs, request_id)
            .await?;

        let timeout = self.config.timeout();
        tracing::debug!(
            request_id = subscription.request_id(),
            timeout_secs = timeout.as_secs(),
            "Waiting for export completion"
        );
        let event = match tokio::time::timeout(timeout, subscription.next_event()).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                return Err(TrimlineError::export(
                    "completion channel closed before a terminal event",
                ))
            }
            Err(_) => {
                return Err(TrimlineError::ExportTimeout {
                    secs: timeout.as_secs(),
                })
            }
        };
        drop(subscription);

        match event.status {
            ExportEventStatus::Completed => {
                let location = event.download_location.ok_or_else(|| {
                    TrimlineError::export("completed event carries no download location")
                })?;
                let url = self
                    .render
                    .signed_download_url(&location, self.config.download_ttl())
                    .await?;
                let filename = export_filename(source_id, Some(&options));
                self.downloads.download(&url, &filename).await?;
                Ok(ExportDownload {
                    url,
                    filename,
                    request_id: Some(request_id.to_string()),
                })
            }
            ExportEventStatus::Failed => Err(TrimlineError::export_job_failed(
                event
                    .message
                    .unwrap_or_else(|| "render service reported a failure".to_string()),
            )),
        }
    }
}
