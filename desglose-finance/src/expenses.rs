//! Expense records shown on the dashboard, built from parsed statement rows.

use chrono::NaiveDate;
use desglose_ingest::StatementRow;
use desglose_ingest::months::period_label;
use serde::{Deserialize, Serialize};

use crate::category_rules::CategoryRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// 1-based position in the statement.
    pub id: u32,
    pub date: NaiveDate,
    pub merchant: String,
    pub total_amount: f64,
    pub installments: u32,
    pub current_installment: u32,
    /// Amount billed this period.
    pub installment_amount: f64,
    pub category: String,
    /// Billing period, e.g. `January 2024`.
    pub period: String,
}

impl Expense {
    pub fn is_installment_plan(&self) -> bool {
        self.installments > 1
    }

    /// Installments still to be billed after this one.
    pub fn remaining_installments(&self) -> u32 {
        self.installments.saturating_sub(self.current_installment)
    }
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Merchant shown for a row: the first word of the description.
pub fn clean_merchant(description: &str) -> String {
    description
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

pub fn build_expenses(rows: &[StatementRow], rules: &CategoryRules) -> Vec<Expense> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let merchant = clean_merchant(&row.description);
            let category = rules.categorize(&merchant).to_string();
            let installments = row.installment.total.max(1);
            let installment_amount = if row.installment.is_plan() {
                round2(row.amount / f64::from(installments))
            } else {
                row.amount
            };

            Expense {
                id: i as u32 + 1,
                date: row.date,
                merchant,
                total_amount: row.amount,
                installments,
                current_installment: row.installment.current,
                installment_amount,
                category,
                period: period_label(row.date),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use desglose_ingest::Installment;

    fn row(desc: &str, amount: f64, installment: Installment) -> StatementRow {
        StatementRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
            description: desc.to_string(),
            amount,
            installment,
        }
    }

    #[test]
    fn test_build_expenses() {
        let rows = vec![
            row("HUSH PALERMO", 45000.0, Installment::SINGLE),
            row("MERPAGO*ELECTRO C.03/12", 89999.99, Installment { current: 3, total: 12 }),
        ];
        let expenses = build_expenses(&rows, &CategoryRules::default());

        assert_eq!(expenses[0].id, 1);
        assert_eq!(expenses[0].merchant, "HUSH");
        assert_eq!(expenses[0].category, "Ropa");
        assert_eq!(expenses[0].installment_amount, 45000.0);
        assert_eq!(expenses[0].period, "January 2024");

        let plan = &expenses[1];
        assert_eq!(plan.id, 2);
        assert_eq!(plan.merchant, "MERPAGO*ELECTRO");
        assert_eq!(plan.category, "E-commerce");
        assert_eq!(plan.installment_amount, 7500.0);
        assert!(plan.is_installment_plan());
        assert_eq!(plan.remaining_installments(), 9);
    }

    #[test]
    fn test_serializes_camel_case() {
        let rows = vec![row("RACING", 100.0, Installment::SINGLE)];
        let json = serde_json::to_value(&build_expenses(&rows, &CategoryRules::default())[0]).unwrap();
        assert_eq!(json["totalAmount"], 100.0);
        assert_eq!(json["currentInstallment"], 1);
        assert_eq!(json["date"], "2024-01-18");
    }
}
