//! Change notifications and read-only views for the presentation layer.

use serde::Serialize;

use crate::upload::{UploadId, UploadItem, UploadStatus};

/// Derived counts, recomputed from the collection on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCounts {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

impl AggregateCounts {
    pub fn from_items(items: &[UploadItem]) -> Self {
        let mut counts = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.status() {
                UploadStatus::Completed => counts.completed += 1,
                UploadStatus::Failed => counts.failed += 1,
                UploadStatus::Pending | UploadStatus::Processing => {}
            }
        }
        counts
    }

    /// Items that reached a terminal state.
    pub fn settled(&self) -> usize {
        self.completed + self.failed
    }

    /// Overall progress of the batch, 0 when empty.
    pub fn percent_settled(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.settled() * 100) / self.total) as u8
    }
}

/// Point-in-time copy of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSnapshot {
    pub items: Vec<UploadItem>,
    pub running: bool,
    pub counts: AggregateCounts,
}

impl BatchSnapshot {
    pub(crate) fn new(items: Vec<UploadItem>, running: bool) -> Self {
        let counts = AggregateCounts::from_items(&items);
        Self {
            items,
            running,
            counts,
        }
    }

    /// Nothing running, at least one item, and none left pending.
    pub fn is_finished(&self) -> bool {
        !self.running
            && !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|i| i.status() != UploadStatus::Pending)
    }

    /// Items currently being processed. At most one by construction.
    pub fn processing(&self) -> impl Iterator<Item = &UploadItem> {
        self.items
            .iter()
            .filter(|i| i.status() == UploadStatus::Processing)
    }

    pub fn get(&self, id: UploadId) -> Option<&UploadItem> {
        self.items.iter().find(|i| i.id() == id)
    }
}

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    ItemsAdded { ids: Vec<UploadId> },
    ItemRemoved { id: UploadId },
    BatchStarted { pending: usize },
    StatusChanged { id: UploadId, status: UploadStatus },
    Progress { id: UploadId, progress: u8 },
    BatchCompleted { counts: AggregateCounts },
    /// The run was dropped before it finished.
    BatchInterrupted { counts: AggregateCounts },
    BatchCleared,
}

/// A change notification together with the state right after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    pub event: BatchEvent,
    pub snapshot: BatchSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_settled() {
        let counts = AggregateCounts {
            completed: 2,
            failed: 1,
            total: 4,
        };
        assert_eq!(counts.settled(), 3);
        assert_eq!(counts.percent_settled(), 75);
        assert_eq!(AggregateCounts::default().percent_settled(), 0);
    }

    #[test]
    fn test_empty_snapshot_is_not_finished() {
        let snap = BatchSnapshot::new(Vec::new(), false);
        assert!(!snap.is_finished());
        assert_eq!(snap.counts.total, 0);
    }
}
