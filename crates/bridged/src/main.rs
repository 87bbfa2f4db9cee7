use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match bridged::run_bridge() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr();
            let _ = writeln!(stderr, "bridged: {error}");
            ExitCode::FAILURE
        }
    }
}
