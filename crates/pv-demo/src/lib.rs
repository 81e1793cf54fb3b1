#![forbid(unsafe_code)]

//! Terminal viewer for protocol block graphs.

pub mod app;
pub mod cli;
pub mod logging;
