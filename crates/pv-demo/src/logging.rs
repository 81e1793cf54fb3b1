#![forbid(unsafe_code)]

//! File logging for the viewer.
//!
//! The terminal is owned by the diagram, so logs only go to the file named
//! by `PROTOVIEW_LOG`. `PROTOVIEW_LOG_LEVEL` takes an `EnvFilter` directive.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "PROTOVIEW_LOG";
pub const ENV_LOG_LEVEL: &str = "PROTOVIEW_LOG_LEVEL";

/// Filter from `PROTOVIEW_LOG_LEVEL`, or `info`.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `path`.
pub fn init_file(path: &Path, filter: EnvFilter) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)
}

/// Install file logging when `PROTOVIEW_LOG` is set. Returns whether it was.
pub fn init_from_env() -> io::Result<bool> {
    let Some(path) = std::env::var_os(ENV_LOG) else {
        return Ok(false);
    };
    init_file(Path::new(&path), filter_from_env())?;
    Ok(true)
}
