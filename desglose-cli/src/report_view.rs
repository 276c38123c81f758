//! Results view shown after a batch completes.

use desglose_core::{AggregateCounts, Navigator, UploadBatch};
use desglose_finance::{StatementProcessor, StatementReport};
use tracing::warn;

/// Merges the reports of every completed upload and prints them.
pub struct ReportNavigator {
    batch: UploadBatch<StatementProcessor>,
    json: bool,
    shown: Option<StatementReport>,
}

impl ReportNavigator {
    pub fn new(batch: UploadBatch<StatementProcessor>, json: bool) -> Self {
        Self {
            batch,
            json,
            shown: None,
        }
    }

    pub fn shown(&self) -> Option<&StatementReport> {
        self.shown.as_ref()
    }
}

impl Navigator for ReportNavigator {
    fn navigate(&mut self, counts: &AggregateCounts) {
        let reports: Vec<StatementReport> = self
            .batch
            .take_outputs()
            .into_iter()
            .map(|(_, report)| report)
            .collect();
        if reports.is_empty() {
            eprintln!("No statements could be processed ({} failed).", counts.failed);
            return;
        }

        let merged = StatementReport::merge(reports);
        if self.json {
            match serde_json::to_string_pretty(&merged) {
                Ok(s) => println!("{s}"),
                Err(e) => warn!(error = %e, "could not serialize report"),
            }
        } else {
            print!("{}", render_report(&merged));
        }
        self.shown = Some(merged);
    }
}

/// Results view for simulated runs, which produce no data.
pub struct SummaryNavigator;

impl Navigator for SummaryNavigator {
    fn navigate(&mut self, counts: &AggregateCounts) {
        println!(
            "\n→ Dashboard: {} of {} statements ready ({} failed). Simulated run: no data extracted.",
            counts.completed, counts.total, counts.failed
        );
    }
}

fn money(amount: f64) -> String {
    format!("$ {amount:.2}")
}

pub fn render_report(report: &StatementReport) -> String {
    let s = &report.summary;
    let mut out = String::new();

    out.push_str("\n# Statement breakdown\n\n");
    out.push_str(&format!(
        "Total spent:          {:>16}   ({} statements processed)\n",
        money(s.total_spent),
        s.processed_files
    ));
    out.push_str(&format!(
        "Installments to pay:  {:>16}   ({} active plans)\n\n",
        money(s.total_to_pay),
        s.active_installments
    ));

    out.push_str("## Expenses\n\n");
    out.push_str(&format!(
        "{:>4}  {:<10}  {:<24}  {:>14}  {:>7}  {:>14}  {:<16}  {}\n",
        "#", "date", "merchant", "total", "plan", "this period", "category", "period"
    ));
    for e in &report.expenses {
        let plan = if e.is_installment_plan() {
            format!("{}/{}", e.current_installment, e.installments)
        } else {
            "-".to_string()
        };
        out.push_str(&format!(
            "{:>4}  {:<10}  {:<24}  {:>14}  {:>7}  {:>14}  {:<16}  {}\n",
            e.id,
            e.date.format("%Y-%m-%d").to_string(),
            e.merchant,
            money(e.total_amount),
            plan,
            money(e.installment_amount),
            e.category,
            e.period
        ));
    }

    out.push_str("\n## By category\n\n");
    for (category, total) in report.totals_by_category() {
        out.push_str(&format!("{category:<20} {:>16}\n", money(total)));
    }

    if !report.projection.is_empty() {
        out.push_str("\n## Upcoming installments\n\n");
        for p in &report.projection {
            out.push_str(&format!("{:<10} {:>16}\n", p.month, money(p.amount)));
        }
    }
    out
}
