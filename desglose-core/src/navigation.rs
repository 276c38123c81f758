//! Hand-off to the results view once a batch completes.
//!
//! The controller only announces completion; whoever renders results
//! implements [`Navigator`].

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::events::{AggregateCounts, BatchEvent, BatchUpdate};

pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1000);

pub trait Navigator {
    /// Show the results of a finished batch.
    fn navigate(&mut self, counts: &AggregateCounts);
}

/// Wait for the next `BatchCompleted`, pause `delay`, then navigate once.
///
/// Returns the completed counts, or `None` if the channel closed first.
pub async fn navigate_on_completion<N: Navigator>(
    updates: &mut mpsc::UnboundedReceiver<BatchUpdate>,
    navigator: &mut N,
    delay: Duration,
) -> Option<AggregateCounts> {
    while let Some(update) = updates.recv().await {
        if let BatchEvent::BatchCompleted { counts } = update.event {
            debug!(?delay, "batch completed, navigating to results");
            tokio::time::sleep(delay).await;
            navigator.navigate(&counts);
            return Some(counts);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BatchSnapshot;

    #[derive(Default)]
    struct Recorder(Vec<AggregateCounts>);

    impl Navigator for Recorder {
        fn navigate(&mut self, counts: &AggregateCounts) {
            self.0.push(*counts);
        }
    }

    fn update(event: BatchEvent) -> BatchUpdate {
        BatchUpdate {
            event,
            snapshot: BatchSnapshot::new(Vec::new(), false),
        }
    }

    #[tokio::test]
    async fn test_navigates_once_after_completion() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counts = AggregateCounts {
            completed: 1,
            failed: 0,
            total: 1,
        };
        tx.send(update(BatchEvent::BatchStarted { pending: 1 })).unwrap();
        tx.send(update(BatchEvent::BatchCompleted { counts })).unwrap();

        let mut nav = Recorder::default();
        let got = navigate_on_completion(&mut rx, &mut nav, Duration::ZERO).await;
        assert_eq!(got, Some(counts));
        assert_eq!(nav.0, vec![counts]);
    }

    #[tokio::test]
    async fn test_closed_channel_never_navigates() {
        let (tx, mut rx) = mpsc::unbounded_channel::<BatchUpdate>();
        tx.send(update(BatchEvent::BatchCleared)).unwrap();
        drop(tx);

        let mut nav = Recorder::default();
        assert!(navigate_on_completion(&mut rx, &mut nav, Duration::ZERO).await.is_none());
        assert!(nav.0.is_empty());
    }
}
