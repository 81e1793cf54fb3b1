#![forbid(unsafe_code)]

//! Layout engine for protocol block trees.
//!
//! A protocol is a JSON tree of variant-typed blocks. Each variant is
//! described by a [`RendererEntry`] in a [`Registry`]. A layout pass runs in
//! two phases:
//!
//! 1. [`MetricsBuilder`] walks the tree bottom-up, collapsing chains of
//!    trivial wrappers into labeled containers, and produces a [`Metrics`]
//!    tree sized in grid cells.
//! 2. [`Metrics::render`] places that tree at an origin, producing a
//!    [`Scene`] of shapes plus the grid position of every rendered node.
//!
//! # Example
//!
//! ```
//! use pv_layout::{GraphConfig, Registry, layout};
//! use serde_json::json;
//!
//! let protocol = json!({
//!     "namespace": "sequence", "name": "_",
//!     "children": [
//!         { "namespace": "segment", "name": "_", "label": "A" },
//!         { "namespace": "segment", "name": "_", "label": "B" }
//!     ]
//! });
//! let pass = layout(&Registry::with_builtins(), &GraphConfig::default(), &protocol, None, None)?;
//! assert_eq!(pass.output.nodes.len(), 2);
//! # Ok::<(), pv_layout::LayoutError>(())
//! ```

pub mod block;
pub mod builder;
pub mod builtins;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod scene;

use pv_core::geometry::Size;
use serde_json::Value;

pub use block::{Block, BlockPath, ShapeError, TypeTag};
pub use builder::{MetricsBuilder, MetricsCx};
pub use config::{Axis, GeometryConfig, GraphConfig, GraphConfigParse};
pub use error::LayoutError;
pub use metrics::{Attach, Feature, Metrics, RenderContext};
pub use registry::{Registry, RendererEntry};
pub use scene::{Attachments, NodePosition, RenderOutput, Scene, Shape};

/// Output of one full layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    /// Total content size in grid cells.
    pub content_size: Size,
    pub output: RenderOutput,
}

/// Measure `root` without placing it.
pub fn compute_metrics(
    registry: &Registry,
    config: &GraphConfig,
    root: &Value,
    location: Option<&Value>,
) -> Result<Metrics, LayoutError> {
    MetricsBuilder::new(registry, config).compute_root(root, location)
}

/// Measure and place `root` at the configured origin.
///
/// Any error aborts the whole pass; nothing partial is returned.
pub fn layout(
    registry: &Registry,
    config: &GraphConfig,
    root: &Value,
    location: Option<&Value>,
    selection: Option<&BlockPath>,
) -> Result<LayoutPass, LayoutError> {
    let span = pv_core::debug_span!("layout");
    let _guard = span.enter();
    let metrics = compute_metrics(registry, config, root, location)?;
    let output = metrics.render_with(
        config.origin,
        Attachments::NONE,
        &RenderContext { selection },
    );
    pv_core::debug!(
        nodes = output.nodes.len(),
        width = metrics.size().width,
        height = metrics.size().height,
        "layout pass complete"
    );
    Ok(LayoutPass {
        content_size: metrics.size(),
        output,
    })
}
