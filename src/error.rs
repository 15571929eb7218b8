//! Error types for resolution and status queries

use std::time::Duration;

/// Startup failure: no endpoint could be resolved, so nothing can be polled.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("failed to look up {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no address found for {host}")]
    NoAddress { host: String },

    #[error("no ports configured for {host}")]
    NoPorts { host: String },
}

/// Failure of a single status query.
///
/// Recovered per endpoint by substituting the placeholder status.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl QueryError {
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        QueryError::Malformed(msg.to_string())
    }
}
