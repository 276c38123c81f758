use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Position of a charge inside an installment plan ("cuota 3 de 12").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub current: u32,
    pub total: u32,
}

impl Installment {
    /// A charge paid in one go.
    pub const SINGLE: Installment = Installment {
        current: 1,
        total: 1,
    };

    pub fn is_plan(&self) -> bool {
        self.total > 1
    }
}

impl Default for Installment {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// One dated charge extracted from statement text (issuer-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub description: String,
    /// Full amount of the purchase. Negative for credits/refunds.
    pub amount: f64,
    pub installment: Installment,
}

/// One column of the "Cuotas a vencer" table: what is due in a future month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPayment {
    /// Month label as printed, e.g. `Feb-24`.
    pub month: String,
    pub amount: f64,
}
