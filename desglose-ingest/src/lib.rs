//! desglose-ingest: parsers for credit-card statement text (already extracted from the PDF).

pub mod amounts;
pub mod months;
pub mod parsers;
pub mod types;

pub use parsers::{card_rows::parse_statement_rows, projection::parse_projection};
pub use types::{Installment, ProjectedPayment, StatementRow};
