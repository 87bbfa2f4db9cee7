//! Error types for the client runtime.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("no message given and {} was not found", path.display())]
    MissingPrompt { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    ReadMessage { path: PathBuf, source: io::Error },
    #[error("the tab number must be an integer, got {value:?}")]
    InvalidTabNumber { value: String },
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to resolve bridge address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to bridge at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[error("failed to send request to bridge: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from bridge: {0}")]
    ReadResponse(io::Error),
    #[error("failed to write {}: {source}", path.display())]
    WriteResponse { path: PathBuf, source: io::Error },
    #[error("failed to print response: {0}")]
    EmitResponse(io::Error),
}
