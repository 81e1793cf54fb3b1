#![forbid(unsafe_code)]

//! Protoview public facade crate.
//!
//! Re-exports the types most hosts need from the engine crates and offers a
//! small prelude.
//!
//! ```
//! use protoview::prelude::*;
//! use serde_json::json;
//!
//! let protocol = json!({
//!     "namespace": "sequence", "name": "_",
//!     "children": [{ "namespace": "segment", "name": "_", "label": "Mix" }]
//! });
//! let pass = protoview::layout(&Registry::with_builtins(), &GraphConfig::default(), &protocol, None, None)?;
//! assert_eq!(pass.output.nodes[0].path, BlockPath::from([0]));
//! # Ok::<(), LayoutError>(())
//! ```

// --- Core re-exports -------------------------------------------------------

pub use pv_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use pv_core::geometry::{PixelPoint, PixelSize, Point, Rect, Sides, Size};

// --- Layout re-exports -----------------------------------------------------

pub use pv_layout::{
    Axis, Block, BlockPath, GraphConfig, LayoutError, LayoutPass, Metrics, NodePosition, Registry,
    RendererEntry, Scene, Shape, TypeTag, compute_metrics, layout,
};

// --- Render re-exports -----------------------------------------------------

pub use pv_render::{Buffer, Cell, RasterParams, Style, Theme, rasterize};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use pv_runtime::{
    Boundaries, Direction, EventOutcome, GraphView, NavigationIndex, SelectOptions, ViewConfig,
    Viewport,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, BlockPath, Buffer, Event, GraphConfig, KeyCode, KeyEvent, LayoutError, Modifiers,
        Registry, Theme,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Direction, EventOutcome, GraphView, SelectOptions, ViewConfig};

    pub use crate::{core, layout, render};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use pv_core as core;
pub use pv_layout as layout;
pub use pv_render as render;
#[cfg(feature = "runtime")]
pub use pv_runtime as runtime;
