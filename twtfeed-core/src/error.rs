/// Structured error types for the twtfeed-core library.
///
/// Uses `thiserror` for a closed set of error kinds that callers can match
/// on directly. The CLI binary wraps these in `anyhow` for convenience;
/// library consumers get structured, composable errors.

use std::io;
use thiserror::Error;

/// Main error type for twtfeed-core operations
#[derive(Error, Debug)]
pub enum FeedError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// A feed line is structurally malformed or carries an unparseable
    /// timestamp. Recoverable during full-feed scans, fatal for
    /// single-line operations.
    #[error("invalid twt line parsed")]
    InvalidLine,

    /// Every line of a scanned feed failed to parse
    #[error("erroneous feed detected ({errors}/{lines} lines failed)")]
    InvalidFeed { lines: usize, errors: usize },

    /// Timestamp token matched none of the supported layouts
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Attempt to post empty or whitespace-only text
    #[error("refusing to twt empty text, or only spaces")]
    EmptyTwt,

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for twtfeed-core operations
pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// True when the underlying cause is a missing file or directory.
    /// Feed non-existence is not treated as a failure by existence probes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source } if source.kind() == io::ErrorKind::NotFound)
    }
}
