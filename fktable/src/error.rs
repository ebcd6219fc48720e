//! Error types of this crate.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A structural or dimensional invariant is violated: zero counts, malformed flavour maps,
    /// empty datapoint masks, indices out of range or failed allocations.
    #[error("range error: {0}")]
    Range(String),
    /// Reading from or writing to a file or stream failed.
    #[error("file error: {0}")]
    File(String),
    /// An operation was called on a table of the wrong topology.
    #[error("evaluation error: {0}")]
    Evaluation(String),
    /// A header or data line could not be parsed.
    #[error("format error: {0}")]
    Format(String),
}

/// Type alias for the results of this crate.
pub type Result<T> = std::result::Result<T, Error>;
