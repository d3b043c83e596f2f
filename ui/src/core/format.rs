//! Formatting helpers for presenting metrics.

/// Signed value as published by the producer, trimmed of trailing zeros: `+4.2%`, `-1%`.
pub fn format_signed_compact(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{}%", format_compact(value))
}

pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let text = format!("{value:.2}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "—".to_string()
    }
}

pub fn format_whole_percent(value: i64) -> String {
    format!("{value}%")
}
