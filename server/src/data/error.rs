//! Upstream collaborator errors
//!
//! Failure kinds are kept distinct so the API layer can map them to the
//! right status codes: a timeout is not a connect failure is not a
//! malformed body.

use thiserror::Error;

/// Errors from the generation pipeline
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The pipeline could not be reached (DNS, refused connection, TLS)
    #[error("failed to connect to the generation pipeline: {0}")]
    Connect(reqwest::Error),

    /// The pipeline did not answer within the configured deadline
    #[error("generation pipeline request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The pipeline answered with a non-success status
    #[error("generation pipeline returned {status}: {preview}")]
    Status { status: u16, preview: String },

    /// The pipeline answered 2xx but the body was not the expected shape
    #[error("invalid pipeline response: {reason}")]
    MalformedResponse { reason: String },
}

impl UpstreamError {
    /// Classify a reqwest send error into timeout vs. connectivity
    pub fn from_send(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::Connect(e)
        }
    }
}

/// Errors from the learner profile store.
///
/// These are always recovered by the lesson/quiz flows (personalization is
/// best-effort); only the explicit personalization endpoints surface them.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile store request failed: {0}")]
    Request(reqwest::Error),

    #[error("profile store returned {status}: {preview}")]
    Status { status: u16, preview: String },

    #[error("invalid profile store response: {0}")]
    Malformed(String),
}
