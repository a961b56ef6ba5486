//! Error taxonomy for the ledger boundary.

use std::time::Duration;

use thiserror::Error;

/// Failures talking to the ledger node.
///
/// All variants are transient from the engine's point of view: a failed query
/// skips the affected user for the current cycle, a failed submission skips
/// the candidate until the next poll. None of them terminate the process.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request did not complete within the configured per-request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure (connection refused, TLS, malformed HTTP).
    #[error("transport error: {0}")]
    Http(#[source] reqwest::Error),

    /// The node accepted the request and returned an error object.
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    /// The node's response did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}
