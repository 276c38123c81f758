//! Charge rows of an Argentine credit-card statement (text)
//!
//! Expected rows after PDF-to-text:
//!   15-Ene-24  SUPERMERCADO CENTRAL           01234   25.430,50
//!   18-Ene-24  MERPAGO*TIENDAELEC C.03/12     55321    7.499,99
//!   22-Ene-24  DEVOLUCION HUSH                00077    1.500,00-
//!
//! The five-digit column is the coupon number and is dropped.

use anyhow::Result;
use regex::Regex;

use crate::amounts::parse_amount;
use crate::months::parse_statement_date;
use crate::types::{Installment, StatementRow};

/// `NN/NN` inside a description: current installment / plan length.
fn detect_installment(description: &str, re: &Regex) -> Installment {
    let Some(caps) = re.captures(description) else {
        return Installment::SINGLE;
    };
    let current: u32 = caps["current"].parse().unwrap_or(1);
    let total: u32 = caps["total"].parse().unwrap_or(1);
    if total == 0 {
        return Installment::SINGLE;
    }
    Installment {
        current: current.max(1),
        total,
    }
}

/// Parse extracted statement text into dated charge rows, in statement order.
///
/// Rows with an unknown month or an unreadable amount are skipped.
pub fn parse_statement_rows(text: &str) -> Result<Vec<StatementRow>> {
    let row_re = Regex::new(concat!(
        r"(?P<date>\d{2}-[A-Za-z]{3}-\d{2})\s+",
        r"(?P<desc>.+?)\s+",
        r"\d{5}\s+",
        r"(?P<amount>[\d.,-]+)"
    ))?;
    let installment_re = Regex::new(r"(?P<current>\d{2})/(?P<total>\d{2})")?;

    let mut out = Vec::new();

    for line in text.lines() {
        for caps in row_re.captures_iter(line) {
            let date = match parse_statement_date(&caps["date"]) {
                Ok(d) => d,
                Err(_) => continue,
            };
            let Some(amount) = parse_amount(&caps["amount"]) else {
                continue;
            };
            let description = caps["desc"].trim().to_string();
            let installment = detect_installment(&description, &installment_re);

            out.push(StatementRow {
                date,
                description,
                amount,
                installment,
            });
        }
    }

    Ok(out)
}
