//! Statement report: summary cards, expense table and payment projection.
//!
//! Serialized with the field names the dashboard reads
//! (`summaryData`, `expensesData`, `projectionData`).

use std::collections::HashMap;

use anyhow::{Result, bail};
use desglose_ingest::{ProjectedPayment, parse_projection, parse_statement_rows};
use serde::{Deserialize, Serialize};

use crate::category_rules::CategoryRules;
use crate::expenses::{Expense, build_expenses, round2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    pub total_spent: f64,
    /// Sum of this period's installments across active plans.
    pub total_to_pay: f64,
    pub active_installments: usize,
    pub processed_files: usize,
}

impl StatementSummary {
    pub fn from_expenses(expenses: &[Expense], processed_files: usize) -> Self {
        let plans = || expenses.iter().filter(|e| e.is_installment_plan());
        Self {
            total_spent: round2(expenses.iter().map(|e| e.total_amount).sum()),
            total_to_pay: round2(plans().map(|e| e.installment_amount).sum()),
            active_installments: plans().count(),
            processed_files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementReport {
    #[serde(rename = "summaryData")]
    pub summary: StatementSummary,
    #[serde(rename = "expensesData")]
    pub expenses: Vec<Expense>,
    #[serde(rename = "projectionData")]
    pub projection: Vec<ProjectedPayment>,
}

impl StatementReport {
    /// Combine several statements into one view.
    ///
    /// Expense ids are renumbered in order, projections are summed per month
    /// label (first-seen order) and the summary is recomputed.
    pub fn merge(reports: impl IntoIterator<Item = StatementReport>) -> StatementReport {
        let mut expenses = Vec::new();
        let mut projection: Vec<ProjectedPayment> = Vec::new();
        let mut month_idx: HashMap<String, usize> = HashMap::new();
        let mut files = 0;

        for report in reports {
            files += 1;
            expenses.extend(report.expenses);
            for p in report.projection {
                match month_idx.get(&p.month) {
                    Some(&i) => projection[i].amount = round2(projection[i].amount + p.amount),
                    None => {
                        month_idx.insert(p.month.clone(), projection.len());
                        projection.push(p);
                    }
                }
            }
        }

        for (i, e) in expenses.iter_mut().enumerate() {
            e.id = i as u32 + 1;
        }

        StatementReport {
            summary: StatementSummary::from_expenses(&expenses, files),
            expenses,
            projection,
        }
    }

    /// Expense totals per category, largest first.
    pub fn totals_by_category(&self) -> Vec<(String, f64)> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for e in &self.expenses {
            *totals.entry(e.category.as_str()).or_insert(0.0) += e.total_amount;
        }
        let mut out: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(c, t)| (c.to_string(), round2(t)))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

/// Parse one statement's extracted text into a report.
///
/// Fails when no charge rows are recognized.
pub fn process_statement_text(text: &str, rules: &CategoryRules) -> Result<StatementReport> {
    let rows = parse_statement_rows(text)?;
    if rows.is_empty() {
        bail!("no statement rows found");
    }
    let expenses = build_expenses(&rows, rules);
    let projection = parse_projection(text)?;

    Ok(StatementReport {
        summary: StatementSummary::from_expenses(&expenses, 1),
        expenses,
        projection,
    })
}
