//! Upload batch controller.
//!
//! Owns the ordered collection of uploads and runs the pending ones through a
//! [`Processor`], one at a time:
//!
//! 1. mark the item `Processing` (progress 0) and notify;
//! 2. await the processor, which reports progress through a [`ProgressHandle`];
//! 3. bring progress to 100 if the processor stopped short, then resolve to
//!    `Completed` or `Failed`;
//! 4. pause for `settle_delay` before the next item.
//!
//! Each await is a suspension point: observers and user calls such as
//! [`UploadBatch::remove_item`] interleave there, but a second item never
//! starts before the current one is terminal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{ProcessError, UploadError};
use crate::events::{AggregateCounts, BatchEvent, BatchSnapshot, BatchUpdate};
use crate::processor::{ProgressHandle, Processor};
use crate::upload::{FileRef, UploadId, UploadItem, UploadStatus};

const INTERRUPTED_MESSAGE: &str = "processing interrupted";

/// Timing knobs of the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    /// Pause after each item resolves.
    pub settle_delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
        }
    }
}

/// Mutable batch state shared by the controller handle and progress reporters.
#[derive(Default)]
pub(crate) struct BatchState {
    items: Vec<UploadItem>,
    next_id: u64,
    running: bool,
    subscribers: Vec<mpsc::UnboundedSender<BatchUpdate>>,
}

impl BatchState {
    pub(crate) fn lock(state: &Mutex<BatchState>) -> MutexGuard<'_, BatchState> {
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot::new(self.items.clone(), self.running)
    }

    fn counts(&self) -> AggregateCounts {
        AggregateCounts::from_items(&self.items)
    }

    // Sent while the lock is held, so subscribers see mutations in order.
    fn emit(&mut self, event: BatchEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        let update = BatchUpdate {
            event,
            snapshot: self.snapshot(),
        };
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn position(&self, id: UploadId) -> Option<usize> {
        self.items.iter().position(|i| i.id() == id)
    }

    fn push(&mut self, file: FileRef) -> UploadId {
        self.next_id += 1;
        let id = UploadId::new(self.next_id);
        self.items.push(UploadItem::pending(id, file));
        id
    }

    /// Move a still-pending item to `Processing`; `None` if it was removed.
    fn begin(&mut self, id: UploadId) -> Option<FileRef> {
        let idx = self.position(id)?;
        let item = &mut self.items[idx];
        if item.status() != UploadStatus::Pending {
            return None;
        }
        item.begin();
        let file = item.file().clone();
        self.emit(BatchEvent::StatusChanged {
            id,
            status: UploadStatus::Processing,
        });
        Some(file)
    }

    pub(crate) fn advance(&mut self, id: UploadId, percent: u8) {
        let Some(idx) = self.position(id) else { return };
        let item = &mut self.items[idx];
        if item.status() != UploadStatus::Processing {
            return;
        }
        item.advance(percent);
        let progress = item.progress();
        self.emit(BatchEvent::Progress { id, progress });
    }

    /// Bring a processing item to 100 before it resolves, if the processor
    /// stopped short.
    fn fill_progress(&mut self, id: UploadId) {
        let unfinished = self
            .position(id)
            .map(|idx| &self.items[idx])
            .is_some_and(|i| i.status() == UploadStatus::Processing && i.progress() < 100);
        if unfinished {
            self.advance(id, 100);
        }
    }

    fn resolve(&mut self, id: UploadId, failure: Option<&str>) {
        let Some(idx) = self.position(id) else { return };
        let item = &mut self.items[idx];
        match failure {
            Some(message) => item.fail(message),
            None => item.complete(),
        }
        let status = item.status();
        self.emit(BatchEvent::StatusChanged { id, status });
    }
}

/// Clears the running flag if a run future is dropped before it finishes.
struct RunGuard {
    state: Arc<Mutex<BatchState>>,
    active: Option<UploadId>,
    armed: bool,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut st = BatchState::lock(&self.state);
        if let Some(id) = self.active {
            warn!(%id, "batch run dropped while processing");
            st.resolve(id, Some(INTERRUPTED_MESSAGE));
        }
        st.running = false;
        let counts = st.counts();
        st.emit(BatchEvent::BatchInterrupted { counts });
    }
}

/// Cloneable handle to an upload batch.
///
/// All clones share the same collection; mutations go through these methods.
pub struct UploadBatch<P: Processor> {
    processor: Arc<P>,
    settings: BatchSettings,
    state: Arc<Mutex<BatchState>>,
    outputs: Arc<Mutex<HashMap<UploadId, P::Output>>>,
}

impl<P: Processor> Clone for UploadBatch<P> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
            settings: self.settings.clone(),
            state: Arc::clone(&self.state),
            outputs: Arc::clone(&self.outputs),
        }
    }
}

impl<P: Processor> UploadBatch<P> {
    pub fn new(processor: P) -> Self {
        Self::with_settings(processor, BatchSettings::default())
    }

    pub fn with_settings(processor: P, settings: BatchSettings) -> Self {
        Self {
            processor: Arc::new(processor),
            settings,
            state: Arc::new(Mutex::new(BatchState::default())),
            outputs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    fn lock_state(&self) -> MutexGuard<'_, BatchState> {
        BatchState::lock(&self.state)
    }

    fn lock_outputs(&self) -> MutexGuard<'_, HashMap<UploadId, P::Output>> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive a [`BatchUpdate`] for every mutation from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BatchUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_state().subscribers.push(tx);
        rx
    }

    /// Append one pending item per file, in order. Duplicates are allowed.
    pub fn add_files(&self, files: impl IntoIterator<Item = FileRef>) -> Vec<UploadId> {
        let mut st = self.lock_state();
        let ids: Vec<UploadId> = files.into_iter().map(|f| st.push(f)).collect();
        if !ids.is_empty() {
            debug!(count = ids.len(), "uploads added");
            st.emit(BatchEvent::ItemsAdded { ids: ids.clone() });
        }
        ids
    }

    /// Remove a pending item.
    pub fn remove_item(&self, id: UploadId) -> Result<UploadItem, UploadError> {
        let mut st = self.lock_state();
        let idx = st.position(id).ok_or(UploadError::NotFound(id))?;
        let status = st.items[idx].status();
        if status != UploadStatus::Pending {
            return Err(UploadError::NotPending { id, status });
        }
        let removed = st.items.remove(idx);
        st.emit(BatchEvent::ItemRemoved { id });
        Ok(removed)
    }

    /// Discard every item and stored output.
    pub fn clear(&self) -> Result<usize, UploadError> {
        let mut st = self.lock_state();
        if st.running {
            return Err(UploadError::BatchRunning);
        }
        let removed = st.items.len();
        st.items.clear();
        st.emit(BatchEvent::BatchCleared);
        drop(st);
        self.lock_outputs().clear();
        Ok(removed)
    }

    pub fn is_batch_running(&self) -> bool {
        self.lock_state().running
    }

    pub fn aggregate_counts(&self) -> AggregateCounts {
        self.lock_state().counts()
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        self.lock_state().snapshot()
    }

    /// Items in insertion order.
    pub fn items(&self) -> Vec<UploadItem> {
        self.lock_state().items.clone()
    }

    pub fn item(&self, id: UploadId) -> Option<UploadItem> {
        let st = self.lock_state();
        st.position(id).map(|idx| st.items[idx].clone())
    }

    pub fn len(&self) -> usize {
        self.lock_state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().items.is_empty()
    }

    /// Output of a completed item.
    pub fn output(&self, id: UploadId) -> Option<P::Output>
    where
        P::Output: Clone,
    {
        self.lock_outputs().get(&id).cloned()
    }

    /// Drain the outputs of completed items, in insertion order.
    pub fn take_outputs(&self) -> Vec<(UploadId, P::Output)> {
        let order: Vec<UploadId> = self.lock_state().items.iter().map(|i| i.id()).collect();
        let mut outputs = self.lock_outputs();
        order
            .into_iter()
            .filter_map(|id| outputs.remove(&id).map(|out| (id, out)))
            .collect()
    }

    /// Process every item that is pending right now, sequentially.
    ///
    /// Returns `None` without doing anything when nothing is pending or a run
    /// is already active. Otherwise returns the counts carried by the single
    /// `BatchCompleted` notification. Items removed while waiting are skipped;
    /// items added during the run stay pending for the next one.
    pub async fn start_batch(&self) -> Option<AggregateCounts> {
        let pending: Vec<UploadId> = {
            let mut st = self.lock_state();
            if st.running {
                debug!("start_batch ignored: run already active");
                return None;
            }
            let pending: Vec<UploadId> = st
                .items
                .iter()
                .filter(|i| i.status() == UploadStatus::Pending)
                .map(|i| i.id())
                .collect();
            if pending.is_empty() {
                debug!("start_batch ignored: nothing pending");
                return None;
            }
            st.running = true;
            st.emit(BatchEvent::BatchStarted {
                pending: pending.len(),
            });
            pending
        };

        info!(pending = pending.len(), "batch started");
        let mut guard = RunGuard {
            state: Arc::clone(&self.state),
            active: None,
            armed: true,
        };

        for id in pending {
            let Some(file) = self.lock_state().begin(id) else {
                debug!(%id, "skipping upload removed before its turn");
                continue;
            };
            guard.active = Some(id);

            let handle = ProgressHandle::new(Arc::clone(&self.state), id);
            let outcome: Result<P::Output, ProcessError> =
                self.processor.process(&file, handle).await;
            self.lock_state().fill_progress(id);

            match outcome {
                Ok(output) => {
                    self.lock_outputs().insert(id, output);
                    self.lock_state().resolve(id, None);
                    debug!(%id, file = %file.name, "upload completed");
                }
                Err(err) => {
                    self.lock_state().resolve(id, Some(err.message()));
                    warn!(%id, file = %file.name, error = %err, "upload failed");
                }
            }
            guard.active = None;

            if !self.settings.settle_delay.is_zero() {
                tokio::time::sleep(self.settings.settle_delay).await;
            }
        }

        guard.armed = false;
        let counts = {
            let mut st = self.lock_state();
            st.running = false;
            let counts = st.counts();
            st.emit(BatchEvent::BatchCompleted { counts });
            counts
        };
        info!(
            completed = counts.completed,
            failed = counts.failed,
            total = counts.total,
            "batch completed"
        );
        Some(counts)
    }
}
