//! Entry point for the `bridge` line-mode client.
//!
//! Delegates to [`bridge_cli::run`] with the process arguments, the current
//! directory and locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    bridge_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
