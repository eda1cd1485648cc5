//! Polars `AnyValue` coercion helpers.
//!
//! Shared by the transform, validate, and report crates for cell-level
//! conversions between Polars values and Rust scalars.

use polars::prelude::AnyValue;

/// Converts an `AnyValue` to a display string. Null becomes the empty string.
pub fn any_to_string(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(*v)),
        AnyValue::Float64(v) => format_numeric(*v),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts an `AnyValue` to a string, returning None when blank or null.
pub fn any_to_string_non_empty(value: &AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Converts an `AnyValue` to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(s),
        _ => None,
    }
}

/// Converts an `AnyValue` to i64.
///
/// Floats convert only when integer-valued; fractional floats, non-numeric
/// strings, and nulls all return None.
pub fn any_to_i64(value: &AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int32(v) => Some(i64::from(*v)),
        AnyValue::Int64(v) => Some(*v),
        AnyValue::UInt32(v) => Some(i64::from(*v)),
        AnyValue::UInt64(v) => i64::try_from(*v).ok(),
        AnyValue::Float32(v) => integral_to_i64(f64::from(*v)),
        AnyValue::Float64(v) => integral_to_i64(*v),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(s),
        _ => None,
    }
}

fn integral_to_i64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses a string as i64, returning None for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Formats a float without trailing zeros ("10.50" -> "10.5", "10.0" -> "10").
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_coercion_rejects_fractional_floats() {
        assert_eq!(any_to_i64(&AnyValue::Float64(3.0)), Some(3));
        assert_eq!(any_to_i64(&AnyValue::Float64(3.5)), None);
        assert_eq!(any_to_i64(&AnyValue::String("7")), Some(7));
        assert_eq!(any_to_i64(&AnyValue::String("abc")), None);
        assert_eq!(any_to_i64(&AnyValue::Null), None);
    }

    #[test]
    fn f64_coercion_parses_strings() {
        assert_eq!(any_to_f64(&AnyValue::String("19.99")), Some(19.99));
        assert_eq!(any_to_f64(&AnyValue::String("  ")), None);
        assert_eq!(any_to_f64(&AnyValue::Int64(4)), Some(4.0));
    }

    #[test]
    fn numeric_formatting_drops_trailing_zeros() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(10.5), "10.5");
    }
}
