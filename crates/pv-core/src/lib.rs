#![forbid(unsafe_code)]

//! Core: grid/pixel geometry, canonical input events, logging, and config parsing.

pub mod env_config;
pub mod event;
pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
