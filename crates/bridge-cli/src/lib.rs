//! Line-mode client for the message bridge.
//!
//! `bridge <name> [args...] [--file]` sends one `RUN` request to the bridge's
//! TCP service and prints whatever comes back. The reply is passed through
//! untouched, so error envelopes from the bridge reach the caller verbatim.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod errors;
mod request;
mod transport;

pub use cli::{DEFAULT_HOST, DEFAULT_PORT};
use cli::Cli;
pub(crate) use errors::AppError;
use request::build_request;

/// File written instead of stdout when `--file` is given.
pub const RESPONSE_FILE: &str = "response.txt";

/// Runs the client against the current working directory.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    match env::current_dir() {
        Ok(cwd) => run_in(args, &cwd, stdout, stderr),
        Err(error) => {
            let _ = writeln!(stderr, "failed to resolve working directory: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the client with `cwd` as the base for `prompt.txt`, message files
/// and `response.txt`.
#[must_use]
pub fn run_in<I, W, E>(args: I, cwd: &Path, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli, cwd, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(cli: &Cli, cwd: &Path, stdout: &mut W) -> Result<(), AppError> {
    let request = build_request(&cli.name, &cli.arguments, cwd)?;
    let payload = serde_json::to_vec(&request).map_err(AppError::SerialiseRequest)?;
    let stream = transport::connect(&cli.host, cli.port)?;
    let response = transport::exchange(stream, &payload)?;

    if cli.file {
        let path = cwd.join(RESPONSE_FILE);
        return fs::write(&path, &response)
            .map_err(|source| AppError::WriteResponse { path, source });
    }
    stdout
        .write_all(&response)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .map_err(AppError::EmitResponse)
}
