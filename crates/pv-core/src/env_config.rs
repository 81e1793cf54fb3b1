#![forbid(unsafe_code)]

//! Shared parsing for env-overridable configuration.
//!
//! Config structs in the engine crates read overrides through an injected
//! getter (`FnMut(&str) -> Option<String>`) so tests never touch the process
//! environment. Parse failures are collected as [`ConfigError`]s and the
//! default value is kept for that field.

use std::fmt;

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Parse a boolean flag (`1/0/true/false/yes/no/on/off`).
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a non-negative integer.
#[must_use]
pub fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Parse a signed integer.
#[must_use]
pub fn parse_i32(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

/// Parse a finite float.
#[must_use]
pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Apply an override read from `get(key)` to `slot`.
///
/// Missing keys leave `slot` untouched; unparsable values push a
/// [`ConfigError`] for `field` with `expected` as the message.
pub fn apply<T, G, P>(
    get: &mut G,
    key: &str,
    field: &'static str,
    expected: &str,
    parse: P,
    slot: &mut T,
    errors: &mut Vec<ConfigError>,
) where
    G: FnMut(&str) -> Option<String>,
    P: FnOnce(&str) -> Option<T>,
{
    if let Some(value) = get(key) {
        match parse(&value) {
            Some(parsed) => *slot = parsed,
            None => errors.push(ConfigError::new(field, value, expected)),
        }
    }
}

/// Push an error unless `value` is strictly positive.
pub fn validate_positive(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(value > 0.0) {
        errors.push(ConfigError::new(
            field,
            value.to_string(),
            "must be greater than zero",
        ));
    }
}

/// Push an error when `value` is negative.
pub fn validate_non_negative(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if value < 0.0 || value.is_nan() {
        errors.push(ConfigError::new(field, value.to_string(), "must not be negative"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool(" On "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn float_rejects_non_finite() {
        assert_eq!(parse_f64("2.5"), Some(2.5));
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("NaN"), None);
    }

    #[test]
    fn apply_collects_errors_and_keeps_default() {
        let mut get = |key: &str| match key {
            "GOOD" => Some("12".to_string()),
            "BAD" => Some("twelve".to_string()),
            _ => None,
        };
        let mut errors = Vec::new();
        let mut good = 1u64;
        let mut bad = 7u64;
        let mut missing = 3u64;
        apply(&mut get, "GOOD", "good", "integer", parse_u64, &mut good, &mut errors);
        apply(&mut get, "BAD", "bad", "integer", parse_u64, &mut bad, &mut errors);
        apply(&mut get, "NONE", "none", "integer", parse_u64, &mut missing, &mut errors);
        assert_eq!((good, bad, missing), (12, 7, 3));
        assert_eq!(errors, vec![ConfigError::new("bad", "twelve", "integer")]);
        assert_eq!(errors[0].to_string(), "bad=twelve (integer)");
    }

    #[test]
    fn positivity_checks() {
        let mut errors = Vec::new();
        validate_positive("cell", 0.0, &mut errors);
        validate_positive("cell", f64::NAN, &mut errors);
        validate_positive("cell", 4.0, &mut errors);
        validate_non_negative("pad", -1.0, &mut errors);
        validate_non_negative("pad", 0.0, &mut errors);
        assert_eq!(errors.len(), 3);
    }
}
