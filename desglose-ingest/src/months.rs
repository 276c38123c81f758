//! Month names on Spanish-language statements.

use anyhow::{Context, Result};
use chrono::NaiveDate;

const SPANISH_TO_ENGLISH: [(&str, &str); 12] = [
    ("ene", "Jan"),
    ("feb", "Feb"),
    ("mar", "Mar"),
    ("abr", "Apr"),
    ("may", "May"),
    ("jun", "Jun"),
    ("jul", "Jul"),
    ("ago", "Aug"),
    ("sep", "Sep"),
    ("oct", "Oct"),
    ("nov", "Nov"),
    ("dic", "Dec"),
];

/// Map a three-letter month (Spanish or English, any case) to its English
/// abbreviation.
pub fn english_month(abbrev: &str) -> Option<&'static str> {
    let key = abbrev.trim().to_lowercase();
    SPANISH_TO_ENGLISH.iter().find_map(|(es, en)| {
        if key == *es || key == en.to_lowercase() {
            Some(*en)
        } else {
            None
        }
    })
}

/// Parse a statement date such as `15-Ene-24` or `03-Aug-23`.
pub fn parse_statement_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.splitn(3, '-');
    let (day, month, year) = match (parts.next(), parts.next(), parts.next()) {
        (Some(d), Some(m), Some(y)) => (d, m, y),
        _ => anyhow::bail!("expected DD-Mmm-YY, got '{raw}'"),
    };
    let month = english_month(month).with_context(|| format!("unknown month in '{raw}'"))?;
    let normalized = format!("{day}-{month}-{year}");
    NaiveDate::parse_from_str(&normalized, "%d-%b-%y")
        .with_context(|| format!("invalid statement date '{raw}'"))
}

/// Billing period label for a date, e.g. `January 2024`.
pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_month() {
        assert_eq!(english_month("Ene"), Some("Jan"));
        assert_eq!(english_month("AGO"), Some("Aug"));
        assert_eq!(english_month("dec"), Some("Dec"));
        assert_eq!(english_month("Xyz"), None);
    }

    #[test]
    fn test_parse_statement_date() {
        let d = parse_statement_date("15-Ene-24").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let d = parse_statement_date("20-Dic-23").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 12, 20).unwrap());

        assert!(parse_statement_date("31-Feb-24").is_err());
        assert!(parse_statement_date("2024-01-15").is_err());
    }

    #[test]
    fn test_period_label() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(period_label(d), "January 2024");
    }
}
