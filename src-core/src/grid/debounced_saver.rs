//! Quiet-period persistence for grid edits.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::budget_items::LineItem;
use crate::errors::Result;

pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Destination of a full-year item snapshot.
#[async_trait]
pub trait ItemsSink: Send + Sync + 'static {
    async fn save_items(&self, year: &str, items: Vec<LineItem>) -> Result<()>;
}

/// Writes the latest snapshot once edits have been quiet for `delay`.
///
/// Every `schedule` call aborts the pending timer and restarts it, so only the last
/// snapshot of a burst is saved. Once the timer fires the save runs as its own task:
/// `schedule`, `cancel` and drop never interrupt a save that has been dispatched, so
/// a slow save may be followed by a newer one. Save failures are logged and dropped.
/// Must be used from within a tokio runtime.
pub struct DebouncedSaver<S: ItemsSink> {
    sink: Arc<S>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ItemsSink> DebouncedSaver<S> {
    pub fn new(sink: Arc<S>, delay: Duration) -> Self {
        Self {
            sink,
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn with_default_delay(sink: Arc<S>) -> Self {
        Self::new(sink, DEFAULT_SAVE_DELAY)
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn schedule(&self, year: &str, items: Vec<LineItem>) {
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        let year = year.to_string();

        let mut pending = self.pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: aborting the timer handle must not reach the save.
            tokio::spawn(async move {
                debug!("Saving {} item(s) for {}", items.len(), year);
                if let Err(e) = sink.save_items(&year, items).await {
                    warn!("Saving budget {} failed: {}", year, e);
                }
            });
        }));
    }

    /// Drops the pending write if its timer has not fired yet.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending().take() {
            previous.abort();
        }
    }

    /// Cancels the pending write and saves `items` immediately.
    pub async fn flush(&self, year: &str, items: Vec<LineItem>) -> Result<()> {
        self.cancel();
        self.sink.save_items(year, items).await
    }

    pub fn is_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl<S: ItemsSink> Drop for DebouncedSaver<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
