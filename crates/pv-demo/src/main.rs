#![forbid(unsafe_code)]

//! Protoview viewer binary entry point.

use std::process;

use pv_demo::{app, cli, logging};

fn main() {
    let command = match cli::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Run with --help for usage information.");
            process::exit(2);
        }
    };

    let opts = match command {
        cli::Command::Help => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        cli::Command::Version => {
            println!("protoview {}", cli::VERSION);
            return;
        }
        cli::Command::Run(opts) => opts,
    };

    if let Err(e) = logging::init_from_env() {
        eprintln!("Failed to open log file: {e}");
    }

    let result = if opts.dump_nodes {
        app::dump_nodes(&opts, &mut std::io::stdout().lock())
    } else {
        app::run(&opts)
    };
    if let Err(e) = result {
        eprintln!("protoview: {e}");
        process::exit(1);
    }
}
