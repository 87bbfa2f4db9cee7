//! Error types for the correlation table.

use thiserror::Error;

use crate::envelope::RequestId;

/// Errors raised while registering a request.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// Another request with the same id is still in flight.
    #[error("request id already in flight: {id}")]
    Conflict { id: RequestId },
}
