//! Amounts printed the Argentine way: `.` groups thousands, `,` marks decimals.

/// Parse `12.345,67`, `$ 1.200,00`, `-350,00` or `350,00-` into a float.
///
/// A minus sign on either end makes the amount negative (a credit).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();

    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.to_string();
    }
    if let Some(rest) = s.strip_suffix('-') {
        negative = !negative;
        s = rest.to_string();
    }
    if s.is_empty() || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = s.replace('.', "").replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}
