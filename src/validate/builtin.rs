//! Common name-aware validators

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::{Validator, ValidatorSpec};
use crate::error::{FormError, FormResult};
use crate::values::{display_value, is_truthy};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Values with nothing entered yet; format validators let these through
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Fails with "`Name` is required." when the value is not truthy
pub fn required() -> ValidatorSpec {
    ValidatorSpec::factory(|name| {
        let message = format!("{} is required.", name);
        Validator::new(move |value, _| (!is_truthy(value)).then(|| message.clone()))
    })
}

/// Fails with "`Name` must be a number." when the value cannot be read as one.
///
/// Blank input reads as zero and passes. Text follows the usual numeric
/// literal forms: decimals with an optional exponent, `0x`/`0o`/`0b`
/// integers and `Infinity`.
pub fn number() -> ValidatorSpec {
    ValidatorSpec::factory(|name| {
        let message = format!("{} must be a number.", name);
        Validator::new(move |value, _| {
            let numeric = match value {
                Value::Null | Value::Bool(_) | Value::Number(_) => true,
                Value::String(s) => parse_number(s).is_some(),
                Value::Array(_) | Value::Object(_) => false,
            };
            (!numeric).then(|| message.clone())
        })
    })
}

/// Read numeric text, `None` when it is not a number
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in prefixed {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // Rejects the "inf" and "nan" spellings f64 parsing would accept
    if !trimmed.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Fails when a non-blank value does not look like an email address
pub fn email() -> ValidatorSpec {
    ValidatorSpec::factory(|name| {
        let message = format!("{} must be a valid email address.", name);
        Validator::new(move |value, _| {
            (!is_blank(value) && !EMAIL.is_match(&display_value(value))).then(|| message.clone())
        })
    })
}

/// Fails when a non-blank value is shorter than `min` characters
pub fn min_length(min: usize) -> ValidatorSpec {
    ValidatorSpec::factory(move |name| {
        let message = format!("{} must be at least {} characters.", name, min);
        Validator::new(move |value, _| {
            (!is_blank(value) && display_value(value).chars().count() < min).then(|| message.clone())
        })
    })
}

/// Fails when the value is longer than `max` characters
pub fn max_length(max: usize) -> ValidatorSpec {
    ValidatorSpec::factory(move |name| {
        let message = format!("{} must be at most {} characters.", name, max);
        Validator::new(move |value, _| (display_value(value).chars().count() > max).then(|| message.clone()))
    })
}

/// Fails when a non-blank value does not match `pattern`
pub fn pattern(pattern: &str) -> FormResult<ValidatorSpec> {
    let regex = Regex::new(pattern).map_err(|e| FormError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(ValidatorSpec::factory(move |name| {
        let message = format!("{} is invalid.", name);
        let regex = regex.clone();
        Validator::new(move |value, _| {
            (!is_blank(value) && !regex.is_match(&display_value(value))).then(|| message.clone())
        })
    }))
}
