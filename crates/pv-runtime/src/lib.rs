#![forbid(unsafe_code)]

//! Interaction layer for protocol graphs.
//!
//! - [`Viewport`] keeps the pan offset inside the content [`Boundaries`] and
//!   animates reveals.
//! - [`ResizeDebouncer`] applies the first size at once and coalesces the
//!   rest.
//! - [`NavigationIndex`] answers arrow-key moves over rendered positions.
//! - [`GraphView`] ties these to a layout pass, input routing, a selection
//!   callback and background [`Subscription`]s.

pub mod config;
pub mod navigation;
pub mod resize;
pub mod subscription;
pub mod view;
pub mod viewport;

pub use config::{ViewConfig, ViewConfigParse};
pub use navigation::{Direction, NavigationIndex};
pub use resize::{ResizeAction, ResizeDebouncer};
#[cfg(not(target_arch = "wasm32"))]
pub use subscription::TerminalEvents;
pub use subscription::{Every, StopSignal, SubId, Subscription, SubscriptionManager};
pub use view::{EventOutcome, GraphView, OnSelect, SelectOptions};
pub use viewport::{Boundaries, ViewState, Viewport, ease_out};
