//! Error types for connection handling.

use std::io;

use thiserror::Error;

use crate::correlation::CorrelationError;

const INTERNAL_ERROR: &str = "internal bridge error; see logs";

/// Failures that end a single client exchange.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Reading the client request failed.
    #[error("failed to read client request: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
    /// The client sent more than the configured limit.
    #[error("request too large: {size} bytes exceeds {max} byte limit")]
    RequestTooLarge { size: usize, max: usize },
    /// The request was not a JSON object.
    #[error("invalid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    /// Writing the response failed.
    #[error("failed to write response: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
    /// The response could not be serialised.
    #[error("failed to encode response: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// The request id could not be registered.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

impl HandlerError {
    /// Text placed in the `error` field of the reply sent to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Parse { .. } | Self::RequestTooLarge { .. } => self.to_string(),
            Self::Correlation(CorrelationError::Conflict { .. }) => {
                "request id already in flight".to_owned()
            }
            Self::Read { .. } | Self::Write { .. } | Self::Encode { .. } => {
                INTERNAL_ERROR.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::RequestId;

    #[test]
    fn conflicts_use_a_fixed_message() {
        let error = HandlerError::from(CorrelationError::Conflict {
            id: RequestId::from("A"),
        });
        assert_eq!(error.client_message(), "request id already in flight");
    }

    #[test]
    fn transport_failures_hide_details() {
        let error = HandlerError::Write {
            source: io::Error::new(io::ErrorKind::BrokenPipe, "gone"),
        };
        assert_eq!(error.client_message(), INTERNAL_ERROR);
    }

    #[test]
    fn parse_failures_explain_the_problem() {
        let source = serde_json::from_slice::<serde_json::Value>(b"{").expect_err("eof");
        let message = HandlerError::Parse { source }.client_message();
        assert!(message.starts_with("invalid JSON: "), "{message}");
    }
}
