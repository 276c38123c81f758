//! Processing capability invoked by the controller for each upload.

use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::controller::BatchState;
use crate::error::ProcessError;
use crate::upload::{FileRef, UploadId};

/// One processing step, run for a single file.
///
/// The simulated step and the statement parser are both implementations;
/// the controller is the same for either.
pub trait Processor: Send + Sync + 'static {
    /// Result kept by the controller for each completed item.
    type Output: Send + 'static;

    /// Process `file`, reporting progress through `progress`.
    ///
    /// Returning `Err` marks the item as failed; the batch carries on.
    fn process(
        &self,
        file: &FileRef,
        progress: ProgressHandle,
    ) -> impl Future<Output = Result<Self::Output, ProcessError>> + Send;
}

/// Progress reporter bound to the item being processed.
#[derive(Clone)]
pub struct ProgressHandle {
    state: Arc<Mutex<BatchState>>,
    id: UploadId,
}

impl ProgressHandle {
    pub(crate) fn new(state: Arc<Mutex<BatchState>>, id: UploadId) -> Self {
        Self { state, id }
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    /// Report progress in percent. Values above 100 are clamped and a value
    /// lower than the current one leaves progress unchanged. Each call made
    /// while the item is processing produces a progress notification; calls
    /// after it resolved are ignored.
    pub fn report(&self, percent: u8) {
        BatchState::lock(&self.state).advance(self.id, percent);
    }
}
