//! "Cuotas a vencer" table: installments due in upcoming months.
//!
//! Expected extracted text:
//!   Cuotas a vencer   Feb-24        Mar-24        Abr-24
//!                     $ 22.199,99   $ 14.699,99   $ 7.499,99

use anyhow::Result;
use regex::Regex;

use crate::amounts::parse_amount;
use crate::types::ProjectedPayment;

const SECTION_MARKER: &str = "Cuotas a vencer";

/// Parse the projection table. Missing section → empty projection.
///
/// Month labels and amounts are paired by position; months without an
/// amount are dropped.
pub fn parse_projection(text: &str) -> Result<Vec<ProjectedPayment>> {
    let month_re = Regex::new(r"[A-Za-z]+-\d{2}")?;
    let amount_re = Regex::new(r"\$\s*-?[\d.\s]*\d+,\d{2}")?;

    let mut lines = text.lines();

    let mut months_line = None;
    for line in lines.by_ref() {
        if let Some(idx) = line.find(SECTION_MARKER) {
            months_line = Some(line[idx + SECTION_MARKER.len()..].to_string());
            break;
        }
    }
    let Some(mut months_line) = months_line else {
        return Ok(Vec::new());
    };

    // The month labels may sit on the line after the marker.
    if months_line.trim().is_empty() {
        match lines.by_ref().find(|l| !l.trim().is_empty()) {
            Some(next) => months_line = next.to_string(),
            None => return Ok(Vec::new()),
        }
    }

    let amounts_line = match lines.find(|l| !l.trim().is_empty()) {
        Some(l) if l.trim_start().starts_with('$') => l,
        _ => return Ok(Vec::new()),
    };

    let months: Vec<&str> = month_re
        .find_iter(&months_line)
        .map(|m| m.as_str())
        .collect();
    let amounts: Vec<f64> = amount_re
        .find_iter(amounts_line)
        .filter_map(|m| parse_amount(m.as_str()))
        .collect();

    Ok(months
        .into_iter()
        .zip(amounts)
        .map(|(month, amount)| ProjectedPayment {
            month: month.to_string(),
            amount: (amount * 100.0).round() / 100.0,
        })
        .collect())
}
