//! Shared coercion and guarded arithmetic.
//!
//! Every calculator goes through these helpers so a derived value is always finite.

use super::domain::RawValue;

/// Absent, empty, or non-numeric values become zero; `1,50,000` style separators are ignored.
pub fn to_number_or_zero(value: &RawValue) -> f64 {
    match value {
        RawValue::Number(number) => finite_or_zero(*number),
        RawValue::Text(text) => parse_decimal(text),
        RawValue::Empty => 0.0,
    }
}

pub fn parse_decimal(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned
        .parse::<f64>()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Division that yields zero for a zero denominator or a non-finite quotient.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    finite_or_zero((value * factor).round() / factor)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    safe_div(values.iter().sum(), values.len() as f64)
}

pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = safe_div(
        values.iter().map(|value| (value - avg).powi(2)).sum(),
        values.len() as f64,
    );
    finite_or_zero(variance.sqrt())
}

/// Renders `value` with thousands separators, e.g. `1,234,567.89`.
pub(crate) fn format_grouped(value: f64, decimals: usize) -> String {
    let value = finite_or_zero(value);
    let rendered = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match rendered.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (rendered.clone(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && rendered.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
