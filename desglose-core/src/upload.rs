//! Upload model: one selected statement file and its processing state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque identifier assigned when a file is added to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UploadId(u64);

impl UploadId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

/// Handle to a selected file. The controller never reads the bytes behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    /// Size in bytes, as reported by the file picker.
    pub size: u64,
    /// Local path when the file lives on disk.
    pub path: Option<PathBuf>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Size in mebibytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    /// `Completed` and `Failed` admit no further automatic transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One entry of an upload batch.
///
/// Fields are read-only outside the crate; every mutation goes through
/// [`crate::UploadBatch`] so the lifecycle invariants hold:
/// progress is 0 while pending and exactly 100 once the item is terminal,
/// and an item never goes back to pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadItem {
    id: UploadId,
    file: FileRef,
    progress: u8,
    status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl UploadItem {
    pub(crate) fn pending(id: UploadId, file: FileRef) -> Self {
        Self {
            id,
            file,
            progress: 0,
            status: UploadStatus::Pending,
            error_message: None,
        }
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    pub fn file(&self) -> &FileRef {
        &self.file
    }

    /// Percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Set only when the item failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub(crate) fn begin(&mut self) {
        debug_assert_eq!(self.status, UploadStatus::Pending);
        self.status = UploadStatus::Processing;
        self.progress = 0;
    }

    /// Raise progress, clamped to 100. Lower values are ignored.
    pub(crate) fn advance(&mut self, percent: u8) {
        if self.status == UploadStatus::Processing {
            self.progress = self.progress.max(percent.min(100));
        }
    }

    pub(crate) fn complete(&mut self) {
        self.progress = 100;
        self.status = UploadStatus::Completed;
        self.error_message = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.progress = 100;
        self.status = UploadStatus::Failed;
        self.error_message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> UploadItem {
        UploadItem::pending(UploadId::new(1), FileRef::new("resumen-enero.pdf", 2 * 1024 * 1024))
    }

    #[test]
    fn test_new_item_is_pending_at_zero() {
        let it = item();
        assert_eq!(it.status(), UploadStatus::Pending);
        assert_eq!(it.progress(), 0);
        assert!(it.error_message().is_none());
        assert_eq!(it.file().size_mb(), 2.0);
    }

    #[test]
    fn test_advance_is_monotonic_and_clamped() {
        let mut it = item();
        it.advance(40);
        assert_eq!(it.progress(), 0, "pending items do not move");

        it.begin();
        it.advance(40);
        it.advance(20);
        assert_eq!(it.progress(), 40);
        it.advance(250);
        assert_eq!(it.progress(), 100);
    }

    #[test]
    fn test_terminal_transitions_force_full_progress() {
        let mut ok = item();
        ok.begin();
        ok.advance(30);
        ok.complete();
        assert_eq!(ok.progress(), 100);
        assert!(ok.status().is_terminal());

        let mut bad = item();
        bad.begin();
        bad.fail("broken");
        assert_eq!(bad.progress(), 100);
        assert_eq!(bad.status(), UploadStatus::Failed);
        assert_eq!(bad.error_message(), Some("broken"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&UploadStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert_eq!(UploadId::new(7).to_string(), "upload-7");
    }
}
