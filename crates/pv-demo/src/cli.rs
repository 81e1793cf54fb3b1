#![forbid(unsafe_code)]

//! Command-line argument parsing for the viewer.
//!
//! Parses args by hand; `PROTOVIEW_*` environment variables are read by the
//! layout and view configs themselves.

use std::path::PathBuf;

use pv_layout::Axis;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
protoview: terminal viewer for protocol block graphs

USAGE:
    protoview [OPTIONS] [PROTOCOL.json]

Without a file the bundled sample protocol is shown.

OPTIONS:
    --location=PATH      Execution location JSON to highlight running blocks
    --axis=AXIS          Flow direction: 'vertical' (default) or 'horizontal'
    --mono               Monochrome theme
    --no-mouse           Disable mouse capture
    --dump-nodes         Print node positions as JSON lines and exit
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Arrows          Move the selection
    Esc             Clear the selection
    Home            Scroll back to the start
    Wheel / drag    Pan (Shift+wheel pans sideways)
    q / Ctrl+C      Quit

ENVIRONMENT VARIABLES:
    PROTOVIEW_LOG             Write logs to this file
    PROTOVIEW_LOG_LEVEL       Log filter (default: info)
    PROTOVIEW_AXIS, PROTOVIEW_GAP, PROTOVIEW_MARGIN, ...  Layout and view tuning";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Protocol document; `None` shows the bundled sample.
    pub protocol: Option<PathBuf>,
    pub location: Option<PathBuf>,
    /// Overrides the configured axis.
    pub axis: Option<Axis>,
    pub monochrome: bool,
    pub mouse: bool,
    /// Lay out once and print node positions instead of opening the viewer.
    pub dump_nodes: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            protocol: None,
            location: None,
            axis: None,
            monochrome: false,
            mouse: true,
            dump_nodes: false,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Parse arguments (without the program name).
pub fn parse<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = Opts::default();
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-mouse" => opts.mouse = false,
            "--mono" => opts.monochrome = true,
            "--dump-nodes" => opts.dump_nodes = true,
            other => {
                if let Some(val) = other.strip_prefix("--location=") {
                    opts.location = Some(PathBuf::from(val));
                } else if let Some(val) = other.strip_prefix("--axis=") {
                    match val.parse::<Axis>() {
                        Ok(axis) => opts.axis = Some(axis),
                        Err(_) => return Err(format!("Invalid --axis value: {val}")),
                    }
                } else if other.starts_with('-') {
                    return Err(format!("Unknown argument: {other}"));
                } else if opts.protocol.is_none() {
                    opts.protocol = Some(PathBuf::from(other));
                } else {
                    return Err(format!("Unexpected extra file: {other}"));
                }
            }
        }
    }
    Ok(Command::Run(opts))
}
