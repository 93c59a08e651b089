//! Common display utilities and helpers

use chrono::{DateTime, Utc};

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with its currency code, or "-" when there is none
pub fn format_price(amount: Option<f64>, currency: Option<&str>) -> String {
    match (amount, currency) {
        (Some(amount), Some(code)) => format!("{:.2} {}", amount, code),
        (Some(amount), None) => format!("{:.2}", amount),
        (None, _) => "-".to_string(),
    }
}

/// Quantity with its unit, e.g. "50 kg"
pub fn format_quantity(quantity: Option<&str>, unit: Option<&str>) -> String {
    match (quantity, unit) {
        (Some(q), Some(u)) => format!("{} {}", q, u),
        (Some(q), None) => q.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// Date part of a timestamp, "-" when absent
pub fn format_date(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
