//! Completion subscriptions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use trimline_common::error::{TrimlineError, TrimlineResult};
use trimline_timeline_model::export::ExportEvent;

use crate::service::CompletionChannel;

/// Owned subscription to one request id.
///
/// Dropping the guard unsubscribes, so every exit from an export releases
/// the channel, including a cancelled future.
pub struct SubscriptionGuard {
    channel: Arc<dyn CompletionChannel>,
    request_id: String,
    events: mpsc::Receiver<ExportEvent>,
}

impl SubscriptionGuard {
    pub async fn acquire(
        channel: Arc<dyn CompletionChannel>,
        request_id: &str,
    ) -> TrimlineResult<Self> {
        let events = channel.subscribe(request_id).await?;
        tracing::debug!(request_id, "Export subscription acquired");
        Ok(Self {
            channel,
            request_id: request_id.to_string(),
            events,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Next event, or `None` once the channel side closed.
    pub async fn next_event(&mut self) -> Option<ExportEvent> {
        self.events.recv().await
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.channel.unsubscribe(&self.request_id);
        tracing::debug!(request_id = %self.request_id, "Export subscription released");
    }
}

/// In-process [`CompletionChannel`]; the render side calls
/// [`publish`](Self::publish).
#[derive(Clone, Default)]
pub struct LocalCompletionHub {
    subscribers: Arc<Mutex<HashMap<String, mpsc::Sender<ExportEvent>>>>,
}

impl LocalCompletionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to the subscriber of `request_id`.
    ///
    /// Returns `false` when nobody is listening.
    pub fn publish(&self, request_id: &str, event: ExportEvent) -> bool {
        let sender = self.lock().get(request_id).cloned();
        match sender {
            Some(sender) => sender.try_send(event).is_ok(),
            None => {
                tracing::debug!(request_id, "Export event without subscriber");
                false
            }
        }
    }

    pub fn is_subscribed(&self, request_id: &str) -> bool {
        self.lock().contains_key(request_id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, mpsc::Sender<ExportEvent>>> {
        // A poisoned map is still a valid map.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl CompletionChannel for LocalCompletionHub {
    async fn subscribe(&self, request_id: &str) -> TrimlineResult<mpsc::Receiver<ExportEvent>> {
        let mut subscribers = self.lock();
        if subscribers.contains_key(request_id) {
            return Err(TrimlineError::export(format!(
                "request {request_id} already has a subscriber"
            )));
        }
        // One terminal event per request; a little slack for duplicates.
        let (tx, rx) = mpsc::channel(4);
        subscribers.insert(request_id.to_string(), tx);
        Ok(rx)
    }

    fn unsubscribe(&self, request_id: &str) {
        self.lock().remove(request_id);
    }
}
