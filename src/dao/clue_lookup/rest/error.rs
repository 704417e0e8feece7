//! Error types of the REST clue lookup.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::clue_lookup::LookupError;

/// Convenient result alias returning [`RestLookupError`] failures.
pub type RestResult<T> = Result<T, RestLookupError>;

/// Failures that can occur while querying the clue table.
#[derive(Debug, Error)]
pub enum RestLookupError {
    /// Required environment variable is missing.
    #[error("missing clue lookup environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build clue lookup client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("failed to send clue lookup request for `{clue_id}`")]
    RequestSend {
        clue_id: String,
        #[source]
        source: reqwest::Error,
    },
    /// The table endpoint answered with an unexpected status.
    #[error("unexpected clue lookup response status {status} for `{clue_id}`")]
    RequestStatus { clue_id: String, status: StatusCode },
    /// Response payload could not be decoded.
    #[error("failed to decode clue lookup response for `{clue_id}`")]
    DecodeResponse {
        clue_id: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<RestLookupError> for LookupError {
    fn from(err: RestLookupError) -> Self {
        LookupError::unavailable(err.to_string(), err)
    }
}
