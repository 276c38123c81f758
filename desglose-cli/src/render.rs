//! Live progress of an upload batch, drawn with indicatif.

use std::collections::HashMap;
use std::time::Duration;

use desglose_core::{
    AggregateCounts, BatchEvent, BatchSnapshot, BatchUpdate, UploadId, UploadStatus,
};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;

const ITEM_TEMPLATE: &str = "{prefix:>24.bold} [{bar:30.cyan/blue}] {pos:>3}% {msg}";
const OVERALL_TEMPLATE: &str = "{spinner:.green} Processing files... {msg} [{bar:30.green}]";

pub struct ProgressView {
    multi: MultiProgress,
    overall: ProgressBar,
    bars: HashMap<UploadId, ProgressBar>,
}

impl ProgressView {
    /// `hidden` suppresses drawing (JSON output on stdout).
    pub fn new(snapshot: &BatchSnapshot, hidden: bool) -> Self {
        let multi = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        let overall = multi.add(ProgressBar::new(snapshot.counts.total as u64));
        if let Ok(style) = ProgressStyle::default_bar().template(OVERALL_TEMPLATE) {
            overall.set_style(style.progress_chars("=>-"));
        }
        overall.enable_steady_tick(Duration::from_millis(120));

        let mut view = Self {
            multi,
            overall,
            bars: HashMap::new(),
        };
        for item in &snapshot.items {
            view.add_bar(item.id(), &item.file().name, item.file().size_mb());
        }
        view.refresh_overall(snapshot);
        view
    }

    fn add_bar(&mut self, id: UploadId, name: &str, size_mb: f64) {
        let bar = self.multi.add(ProgressBar::new(100));
        if let Ok(style) = ProgressStyle::default_bar().template(ITEM_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_prefix(truncate(name, 24));
        bar.set_message(format!("pending ({size_mb:.2} MB)"));
        self.bars.insert(id, bar);
    }

    fn refresh_overall(&self, snapshot: &BatchSnapshot) {
        let counts = snapshot.counts;
        self.overall.set_length(counts.total as u64);
        self.overall.set_position(counts.settled() as u64);
        self.overall.set_message(overall_message(&counts));
    }

    pub fn apply(&mut self, update: &BatchUpdate) {
        let snapshot = &update.snapshot;
        match &update.event {
            BatchEvent::ItemsAdded { ids } => {
                for id in ids {
                    if let Some(item) = snapshot.get(*id) {
                        self.add_bar(*id, &item.file().name, item.file().size_mb());
                    }
                }
            }
            BatchEvent::ItemRemoved { id } => {
                if let Some(bar) = self.bars.remove(id) {
                    bar.finish_and_clear();
                    self.multi.remove(&bar);
                }
            }
            BatchEvent::StatusChanged { id, status } => {
                if let Some(bar) = self.bars.get(id) {
                    match status {
                        UploadStatus::Processing => bar.set_message("processing..."),
                        UploadStatus::Completed => {
                            bar.set_position(100);
                            bar.finish_with_message("completed");
                        }
                        UploadStatus::Failed => {
                            let msg = snapshot
                                .get(*id)
                                .and_then(|i| i.error_message())
                                .unwrap_or("failed");
                            bar.set_position(100);
                            bar.abandon_with_message(format!("error: {msg}"));
                        }
                        UploadStatus::Pending => {}
                    }
                }
            }
            BatchEvent::Progress { id, progress } => {
                if let Some(bar) = self.bars.get(id) {
                    bar.set_position(u64::from(*progress));
                }
            }
            BatchEvent::BatchStarted { .. } => {}
            BatchEvent::BatchCompleted { .. } | BatchEvent::BatchInterrupted { .. } => {
                self.refresh_overall(snapshot);
                self.overall
                    .finish_with_message(overall_message(&snapshot.counts));
                return;
            }
            BatchEvent::BatchCleared => {
                for (_, bar) in self.bars.drain() {
                    bar.finish_and_clear();
                }
            }
        }
        self.refresh_overall(snapshot);
    }
}

fn overall_message(counts: &AggregateCounts) -> String {
    format!(
        "{} of {} ({}%)",
        counts.settled(),
        counts.total,
        counts.percent_settled()
    )
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let head: String = name.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}

/// Drive a [`ProgressView`] until the run ends; returns the last snapshot seen.
pub async fn run_progress_view(
    mut updates: mpsc::UnboundedReceiver<BatchUpdate>,
    initial: BatchSnapshot,
    hidden: bool,
) -> BatchSnapshot {
    let mut view = ProgressView::new(&initial, hidden);
    let mut last = initial;
    while let Some(update) = updates.recv().await {
        view.apply(&update);
        let done = matches!(
            update.event,
            BatchEvent::BatchCompleted { .. } | BatchEvent::BatchInterrupted { .. }
        );
        last = update.snapshot;
        if done {
            break;
        }
    }
    last
}

/// Completion banner, with the error of each failed file.
pub fn completion_banner(snapshot: &BatchSnapshot) -> String {
    let counts = snapshot.counts;
    let mut out = String::from("Processing complete\n");
    out.push_str(&format!("{} files processed successfully", counts.completed));
    if counts.failed > 0 {
        out.push_str(&format!(", {} with errors", counts.failed));
    }
    out.push('\n');
    for item in &snapshot.items {
        if let Some(msg) = item.error_message() {
            out.push_str(&format!("  ✗ {}: {}\n", item.file().name, msg));
        }
    }
    out
}
