//! desglose-finance: category rules, expense building, statement reports and
//! the statement processing step for upload batches

pub mod category_rules;
pub mod expenses;
pub mod report;
pub mod statement_processor;

pub use category_rules::{CategoryRule, CategoryRules, FALLBACK_CATEGORY};
pub use expenses::{Expense, build_expenses, clean_merchant};
pub use report::{StatementReport, StatementSummary, process_statement_text};
pub use statement_processor::StatementProcessor;
