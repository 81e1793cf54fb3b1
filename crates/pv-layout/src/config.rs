#![forbid(unsafe_code)]

//! Graph geometry configuration.
//!
//! # Environment overrides
//! - `PROTOVIEW_CELL_PIXEL_SIZE` (f64 > 0)
//! - `PROTOVIEW_NODE_BORDER_WIDTH` (f64 >= 0)
//! - `PROTOVIEW_HEADER_HEIGHT` (f64 >= 0)
//! - `PROTOVIEW_PADDING` (f64 >= 0)
//! - `PROTOVIEW_AXIS` (`vertical` | `horizontal`)
//! - `PROTOVIEW_GAP` (cells, >= 0)
//! - `PROTOVIEW_ORIGIN_X`, `PROTOVIEW_ORIGIN_Y` (cells)
//! - `PROTOVIEW_MAX_DEPTH` (>= 1)

use std::fmt;
use std::str::FromStr;

use pv_core::env_config::{self, ConfigError};
use pv_core::geometry::{Point, Size};

const ENV_CELL_PIXEL_SIZE: &str = "PROTOVIEW_CELL_PIXEL_SIZE";
const ENV_NODE_BORDER_WIDTH: &str = "PROTOVIEW_NODE_BORDER_WIDTH";
const ENV_HEADER_HEIGHT: &str = "PROTOVIEW_HEADER_HEIGHT";
const ENV_PADDING: &str = "PROTOVIEW_PADDING";
const ENV_AXIS: &str = "PROTOVIEW_AXIS";
const ENV_GAP: &str = "PROTOVIEW_GAP";
const ENV_ORIGIN_X: &str = "PROTOVIEW_ORIGIN_X";
const ENV_ORIGIN_Y: &str = "PROTOVIEW_ORIGIN_Y";
const ENV_MAX_DEPTH: &str = "PROTOVIEW_MAX_DEPTH";

/// Main flow direction of sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Children stack top to bottom.
    #[default]
    Vertical,
    /// Children stack left to right.
    Horizontal,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }

    /// Component of `p` along the flow.
    #[inline]
    pub const fn main(self, p: Point) -> i32 {
        match self {
            Self::Vertical => p.y,
            Self::Horizontal => p.x,
        }
    }

    /// Component of `p` across the flow.
    #[inline]
    pub const fn cross(self, p: Point) -> i32 {
        match self {
            Self::Vertical => p.x,
            Self::Horizontal => p.y,
        }
    }

    /// Build a point from flow coordinates.
    #[inline]
    pub const fn point(self, main: i32, cross: i32) -> Point {
        match self {
            Self::Vertical => Point::new(cross, main),
            Self::Horizontal => Point::new(main, cross),
        }
    }

    /// Extent of `size` along the flow.
    #[inline]
    pub const fn main_len(self, size: Size) -> i32 {
        match self {
            Self::Vertical => size.height,
            Self::Horizontal => size.width,
        }
    }

    /// Extent of `size` across the flow.
    #[inline]
    pub const fn cross_len(self, size: Size) -> i32 {
        match self {
            Self::Vertical => size.width,
            Self::Horizontal => size.height,
        }
    }

    /// Build a size from flow extents.
    #[inline]
    pub const fn size(self, main: i32, cross: i32) -> Size {
        match self {
            Self::Vertical => Size::new(cross, main),
            Self::Horizontal => Size::new(main, cross),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" | "v" | "tb" => Ok(Self::Vertical),
            "horizontal" | "h" | "lr" => Ok(Self::Horizontal),
            _ => Err(()),
        }
    }
}

/// Pixel-space constants for node cards.
///
/// Text is measured at one pixel per display column and one pixel per line,
/// so a `cell_pixel_size` of 2 packs two columns into each layout cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    pub cell_pixel_size: f64,
    pub node_border_width: f64,
    pub header_height: f64,
    pub padding: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            cell_pixel_size: 2.0,
            node_border_width: 1.0,
            header_height: 1.0,
            padding: 0.0,
        }
    }
}

/// Graph layout configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub geometry: GeometryConfig,
    pub axis: Axis,
    /// Cells between siblings of a composite.
    pub gap: i32,
    /// Grid origin of the root block.
    pub origin: Point,
    /// Deepest nesting accepted before reporting a cycle.
    pub max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            axis: Axis::Vertical,
            gap: 1,
            origin: Point::ZERO,
            max_depth: 256,
        }
    }
}

/// Result of parsing env overrides: usable config plus every rejected value.
#[derive(Debug, Clone)]
pub struct GraphConfigParse {
    pub config: GraphConfig,
    pub errors: Vec<ConfigError>,
}

impl GraphConfig {
    /// Defaults with process environment overrides. Bad values are dropped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok()).config
    }

    /// Defaults with overrides read through `get`.
    pub fn from_env_with<F>(mut get: F) -> GraphConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();
        let geometry = &mut config.geometry;
        env_config::apply(
            &mut get,
            ENV_CELL_PIXEL_SIZE,
            "cell_pixel_size",
            "expected number",
            env_config::parse_f64,
            &mut geometry.cell_pixel_size,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_NODE_BORDER_WIDTH,
            "node_border_width",
            "expected number",
            env_config::parse_f64,
            &mut geometry.node_border_width,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_HEADER_HEIGHT,
            "header_height",
            "expected number",
            env_config::parse_f64,
            &mut geometry.header_height,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_PADDING,
            "padding",
            "expected number",
            env_config::parse_f64,
            &mut geometry.padding,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_AXIS,
            "axis",
            "expected vertical|horizontal",
            |v| v.parse::<Axis>().ok(),
            &mut config.axis,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_GAP,
            "gap",
            "expected integer",
            env_config::parse_i32,
            &mut config.gap,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_ORIGIN_X,
            "origin_x",
            "expected integer",
            env_config::parse_i32,
            &mut config.origin.x,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_ORIGIN_Y,
            "origin_y",
            "expected integer",
            env_config::parse_i32,
            &mut config.origin.y,
            &mut errors,
        );
        env_config::apply(
            &mut get,
            ENV_MAX_DEPTH,
            "max_depth",
            "expected integer",
            |v| env_config::parse_u64(v).and_then(|n| usize::try_from(n).ok()),
            &mut config.max_depth,
            &mut errors,
        );

        if let Err(invalid) = config.validate() {
            let fallback = Self::default();
            for err in &invalid {
                config.reset_field(err.field, &fallback);
            }
            errors.extend(invalid);
        }
        GraphConfigParse { config, errors }
    }

    /// Check value ranges, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        let g = &self.geometry;
        env_config::validate_positive("cell_pixel_size", g.cell_pixel_size, &mut errors);
        env_config::validate_non_negative("node_border_width", g.node_border_width, &mut errors);
        env_config::validate_non_negative("header_height", g.header_height, &mut errors);
        env_config::validate_non_negative("padding", g.padding, &mut errors);
        if self.gap < 0 {
            errors.push(ConfigError::new(
                "gap",
                self.gap.to_string(),
                "must not be negative",
            ));
        }
        if self.max_depth == 0 {
            errors.push(ConfigError::new("max_depth", "0", "must be at least 1"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn reset_field(&mut self, field: &str, fallback: &Self) {
        match field {
            "cell_pixel_size" => self.geometry.cell_pixel_size = fallback.geometry.cell_pixel_size,
            "node_border_width" => {
                self.geometry.node_border_width = fallback.geometry.node_border_width;
            }
            "header_height" => self.geometry.header_height = fallback.geometry.header_height,
            "padding" => self.geometry.padding = fallback.geometry.padding,
            "gap" => self.gap = fallback.gap,
            "max_depth" => self.max_depth = fallback.max_depth,
            _ => {}
        }
    }
}
