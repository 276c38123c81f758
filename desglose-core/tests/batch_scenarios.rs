use std::collections::HashMap;
use std::time::Duration;

use desglose_core::{
    BatchEvent, BatchSettings, BatchUpdate, FileRef, SimulatedProcessor, SimulationSettings,
    UploadBatch, UploadError, UploadId, UploadStatus,
};
use tokio::sync::mpsc::UnboundedReceiver;

fn simulated(tick_ms: u64, failure_rate: f64) -> UploadBatch<SimulatedProcessor> {
    let settings = SimulationSettings {
        tick_interval: Duration::from_millis(tick_ms),
        failure_rate,
        ..SimulationSettings::default()
    };
    let processor = SimulatedProcessor::with_seed(settings, 2024).unwrap();
    UploadBatch::with_settings(
        processor,
        BatchSettings {
            settle_delay: Duration::ZERO,
        },
    )
}

fn statements(names: &[&str]) -> Vec<FileRef> {
    names
        .iter()
        .map(|n| FileRef::new(*n, 512 * 1024))
        .collect()
}

fn drain(rx: &mut UnboundedReceiver<BatchUpdate>) -> Vec<BatchUpdate> {
    let mut out = Vec::new();
    while let Ok(u) = rx.try_recv() {
        out.push(u);
    }
    out
}

/// Three statements go through Pending -> Processing -> terminal in insertion order.
#[tokio::test]
async fn test_three_files_processed_sequentially() {
    let batch = simulated(0, 0.5);
    let ids = batch.add_files(statements(&["enero.pdf", "febrero.pdf", "marzo.pdf"]));
    let mut rx = batch.subscribe();

    let counts = batch.start_batch().await.expect("batch should run");
    let updates = drain(&mut rx);

    // Status transitions, in order.
    let transitions: Vec<(UploadId, UploadStatus)> = updates
        .iter()
        .filter_map(|u| match u.event {
            BatchEvent::StatusChanged { id, status } => Some((id, status)),
            _ => None,
        })
        .collect();
    assert_eq!(transitions.len(), 6);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(transitions[2 * i], (*id, UploadStatus::Processing));
        assert_eq!(transitions[2 * i + 1].0, *id);
        assert!(transitions[2 * i + 1].1.is_terminal());
    }

    // Exactly one completion, and it is the last notification.
    let completions = updates
        .iter()
        .filter(|u| matches!(u.event, BatchEvent::BatchCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert!(matches!(
        updates.last().map(|u| &u.event),
        Some(BatchEvent::BatchCompleted { .. })
    ));

    assert_eq!(counts.completed + counts.failed, counts.total);
    assert_eq!(counts.total, 3);
    assert_eq!(counts, batch.aggregate_counts());
}

#[tokio::test]
async fn test_observed_invariants_hold_at_every_update() {
    let batch = simulated(0, 0.3);
    batch.add_files(statements(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]));
    let mut rx = batch.subscribe();
    batch.start_batch().await.unwrap();

    let mut progress: HashMap<UploadId, Vec<u8>> = HashMap::new();
    for update in drain(&mut rx) {
        let snap = &update.snapshot;
        assert!(snap.processing().count() <= 1, "two items processing at once");
        assert!(snap.counts.settled() <= snap.counts.total);

        for item in &snap.items {
            match item.status() {
                UploadStatus::Pending => assert_eq!(item.progress(), 0),
                UploadStatus::Completed | UploadStatus::Failed => {
                    assert_eq!(item.progress(), 100)
                }
                UploadStatus::Processing => {}
            }
            assert_eq!(
                item.error_message().is_some(),
                item.status() == UploadStatus::Failed
            );
        }

        if let BatchEvent::Progress { id, progress: p } = update.event {
            progress.entry(id).or_default().push(p);
        }
    }

    assert_eq!(progress.len(), 4);
    for seen in progress.values() {
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
        assert_eq!(seen.len(), 11, "0..=100 in steps of 10");
    }
}

#[tokio::test]
async fn test_removed_file_leaves_nothing_to_run() {
    let batch = simulated(0, 0.0);
    let ids = batch.add_files(statements(&["solo.pdf"]));
    batch.remove_item(ids[0]).unwrap();

    assert!(batch.is_empty());
    assert!(batch.start_batch().await.is_none());
    assert!(!batch.is_batch_running());
}

#[tokio::test]
async fn test_cannot_remove_file_while_it_is_processing() {
    let batch = simulated(5, 0.0);
    let ids = batch.add_files(statements(&["uno.pdf", "dos.pdf"]));
    let mut rx = batch.subscribe();

    let runner = batch.clone();
    let run = tokio::spawn(async move { runner.start_batch().await });

    // Wait until the first file is picked up.
    while let Some(update) = rx.recv().await {
        if update.event
            == (BatchEvent::StatusChanged {
                id: ids[0],
                status: UploadStatus::Processing,
            })
        {
            break;
        }
    }

    let before = batch.items();
    let err = batch.remove_item(ids[0]).unwrap_err();
    assert_eq!(
        err,
        UploadError::NotPending {
            id: ids[0],
            status: UploadStatus::Processing
        }
    );
    assert_eq!(batch.items().len(), before.len());

    let counts = run.await.unwrap().unwrap();
    assert_eq!(counts.completed, 2);
    assert!(batch
        .items()
        .iter()
        .all(|i| i.status() == UploadStatus::Completed));
}

#[tokio::test]
async fn test_terminal_items_are_not_reprocessed() {
    let batch = simulated(0, 1.0);
    let first = batch.add_files(statements(&["viejo.pdf"]));
    batch.start_batch().await.unwrap();
    assert_eq!(batch.item(first[0]).unwrap().status(), UploadStatus::Failed);

    let second = batch.add_files(statements(&["nuevo.pdf"]));
    let mut rx = batch.subscribe();
    let counts = batch.start_batch().await.unwrap();

    let touched: Vec<UploadId> = drain(&mut rx)
        .into_iter()
        .filter_map(|u| match u.event {
            BatchEvent::StatusChanged { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(touched, vec![second[0], second[0]]);
    assert_eq!(counts.failed, 2);
    assert_eq!(counts.total, 2);
}
