#![forbid(unsafe_code)]

//! Terminal rendering for laid-out protocol scenes.
//!
//! [`raster::rasterize`] paints a [`Scene`](pv_layout::Scene) into a
//! [`Buffer`](buffer::Buffer) through a pan offset; the
//! [`Presenter`](presenter::Presenter) writes buffers to the terminal.

pub mod buffer;
pub mod cell;
pub mod drawing;
#[cfg(not(target_arch = "wasm32"))]
pub mod presenter;
pub mod raster;
pub mod theme;

pub use buffer::Buffer;
pub use cell::{Cell, Rgb, Style, StyleFlags};
pub use drawing::{BorderChars, Draw};
pub use raster::{RasterParams, rasterize};
pub use theme::Theme;
