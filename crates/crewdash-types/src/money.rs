//! Currency parsing and display formatting
//!
//! The API mixes raw numbers with pre-formatted strings such as `"$1,234.56"`.
//! Everything here is tolerant: anything that cannot be read as a number
//! becomes `0.0` instead of failing the caller.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a currency or plain numeric string.
///
/// Accepts `"$1,234.56"`, `"-$12.00"`, `"$-12.00"`, `"(12.00)"`, `"42"`,
/// `"55%"`. Returns `0.0` for anything else.
pub fn parse_currency(raw: &str) -> f64 {
    let mut s = raw.trim();
    let mut negative = false;

    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        negative = true;
        s = &s[1..s.len() - 1];
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, cleaned.as_str()),
    };

    let value = digits.parse::<f64>().map(|v| v * sign).unwrap_or(0.0);
    let value = if negative { -value } else { value };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Coerce an arbitrary JSON value into an amount.
pub fn parse_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_currency(s),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// Round to two decimal places (display only).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group the integer part of a non-negative number with commas and keep two decimals.
fn group_two_decimals(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}.{:02}", grouped, frac)
}

fn is_negative_display(value: f64) -> bool {
    value < 0.0 && (value.abs() * 100.0).round() > 0.0
}

/// Format as US currency: `$1,234.56`, `-$1,234.56`.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if is_negative_display(value) { "-" } else { "" };
    format!("{}${}", sign, group_two_decimals(value))
}

/// Format a plain quantity with grouping: `1,234.50`.
pub fn format_number(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if is_negative_display(value) { "-" } else { "" };
    format!("{}{}", sign, group_two_decimals(value))
}

/// Format a percentage value (already scaled by 100): `12.34%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", round2(if value.is_finite() { value } else { 0.0 }))
}

/// Serde helper: deserialize any JSON value as a lenient amount.
///
/// Use with `#[serde(default, deserialize_with = "crewdash_types::money::lenient")]`.
pub fn lenient<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_amount(&value))
}

/// Serde helper for booleans that may arrive as `"true"`, `1` or `null`.
pub fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

/// Like [`lenient`], but an absent field stays `None` (pair with `#[serde(default)]`).
pub fn lenient_opt<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient(deserializer).map(Some)
}

pub fn lenient_bool_opt<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_bool(deserializer).map(Some)
}

/// Serde helper for counts; negative or malformed values become `0`.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let amount = parse_amount(&value);
    Ok(if amount > 0.0 { amount.round() as usize } else { 0 })
}
