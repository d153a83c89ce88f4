//! yash - yet another shell
//!
//! Takes no arguments: starts the interactive prompt loop and exits 0 on
//! end of input. Diagnostics are opt-in via `RUST_LOG` and go to stderr so
//! shell output stays clean.

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yash::{Repl, Shell};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let shell = match Shell::new() {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("-yash: {err}");
            return ExitCode::FAILURE;
        }
    };

    match Repl::new(shell).and_then(|mut repl| repl.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("-yash: {err}");
            ExitCode::FAILURE
        }
    }
}
