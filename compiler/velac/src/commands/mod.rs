//! Command handlers for the `vela` binary.
//!
//! Each handler reports failures as rendered diagnostics on stderr and
//! exits with status 1.

use velac::ScriptError;

mod check;
mod debug;
mod run;

pub use check::check_file;
pub use debug::{lex_file, parse_file};
pub use run::{run_file, RunArgs};

fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => fail(&ScriptError::from(err), "", path),
    }
}

/// Print `err` against `source` and exit.
fn fail(err: &ScriptError, source: &str, origin: &str) -> ! {
    eprintln!("{origin}:");
    eprint!("{}", vela_diagnostic::render(&err.to_diagnostic(), source));
    std::process::exit(1);
}
