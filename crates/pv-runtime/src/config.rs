#![forbid(unsafe_code)]

//! Interaction settings for a mounted graph view.
//!
//! Environment overrides:
//! - `PROTOVIEW_RESIZE_DEBOUNCE_MS` (milliseconds)
//! - `PROTOVIEW_MARGIN` (cells on every side, >= 0)
//! - `PROTOVIEW_WHEEL_STEP` (pixels per wheel notch, > 0)
//! - `PROTOVIEW_REVEAL_MS` (milliseconds, 0 jumps)

use std::time::Duration;

use pv_core::env_config::{self, ConfigError};
use pv_core::geometry::Sides;

const ENV_RESIZE_DEBOUNCE_MS: &str = "PROTOVIEW_RESIZE_DEBOUNCE_MS";
const ENV_MARGIN: &str = "PROTOVIEW_MARGIN";
const ENV_WHEEL_STEP: &str = "PROTOVIEW_WHEEL_STEP";
const ENV_REVEAL_MS: &str = "PROTOVIEW_REVEAL_MS";

/// Settings for [`GraphView`](crate::GraphView).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Quiet period before a follow-up resize is committed.
    pub resize_debounce_ms: u64,
    /// Scrollable slack around the content, in grid cells.
    pub margins: Sides,
    /// Pixels panned per wheel notch.
    pub wheel_step: f64,
    /// Length of the reveal slide.
    pub reveal_duration_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 500,
            margins: Sides::all(1),
            wheel_step: 3.0,
            reveal_duration_ms: 250,
        }
    }
}

/// Parsed config plus every rejected override.
#[derive(Debug, Clone)]
pub struct ViewConfigParse {
    pub config: ViewConfig,
    pub errors: Vec<ConfigError>,
}

impl ViewConfig {
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub const fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.reveal_duration_ms)
    }

    /// Defaults with process environment overrides. Bad values are dropped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok()).config
    }

    /// Defaults with overrides read through `get`.
    pub fn from_env_with<F>(mut get: F) -> ViewConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();
        env_config::apply(
            &mut get,
            ENV_RESIZE_DEBOUNCE_MS,
            "resize_debounce_ms",
            "expected integer",
            env_config::parse_u64,
            &mut config.resize_debounce_ms,
            &mut errors,
        );
        let mut margin = None;
        env_config::apply(
            &mut get,
            ENV_MARGIN,
            "margins",
            "expected integer",
            |v| env_config::parse_i32(v).map(Some),
            &mut margin,
            &mut errors,
        );
        if let Some(margin) = margin {
            config.margins = Sides::all(margin);
        }
        env_config::apply(
            &mut get,
            ENV_WHEEL_STEP,
            "wheel_step",
            "expected number",
            env_config::parse_f64,
            &mut config.wheel_step,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_REVEAL_MS,
            "reveal_duration_ms",
            "expected integer",
            env_config::parse_u64,
            &mut config.reveal_duration_ms,
            &mut errors,
        );

        if let Err(invalid) = config.validate() {
            let fallback = Self::default();
            for err in &invalid {
                match err.field {
                    "margins" => config.margins = fallback.margins,
                    "wheel_step" => config.wheel_step = fallback.wheel_step,
                    _ => {}
                }
            }
            errors.extend(invalid);
        }
        ViewConfigParse { config, errors }
    }

    /// Check value ranges, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        let m = self.margins;
        if m.top < 0 || m.right < 0 || m.bottom < 0 || m.left < 0 {
            errors.push(ConfigError::new(
                "margins",
                format!("{} {} {} {}", m.top, m.right, m.bottom, m.left),
                "must not be negative",
            ));
        }
        env_config::validate_positive("wheel_step", self.wheel_step, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_validate() {
        let config = ViewConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resize_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn overrides_apply() {
        let vars = env(&[
            ("PROTOVIEW_RESIZE_DEBOUNCE_MS", "120"),
            ("PROTOVIEW_MARGIN", "3"),
            ("PROTOVIEW_WHEEL_STEP", "1.5"),
            ("PROTOVIEW_REVEAL_MS", "0"),
        ]);
        let parsed = ViewConfig::from_env_with(|k| vars.get(k).cloned());
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config.resize_debounce_ms, 120);
        assert_eq!(parsed.config.margins, Sides::all(3));
        assert_eq!(parsed.config.wheel_step, 1.5);
        assert_eq!(parsed.config.reveal_duration(), Duration::ZERO);
    }

    #[test]
    fn bad_values_fall_back() {
        let vars = env(&[
            ("PROTOVIEW_MARGIN", "-2"),
            ("PROTOVIEW_WHEEL_STEP", "0"),
            ("PROTOVIEW_REVEAL_MS", "soon"),
        ]);
        let parsed = ViewConfig::from_env_with(|k| vars.get(k).cloned());
        let fields: Vec<_> = parsed.errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"margins"));
        assert!(fields.contains(&"wheel_step"));
        assert!(fields.contains(&"reveal_duration_ms"));
        assert_eq!(parsed.config, ViewConfig::default());
    }
}
