//! Error types for blogo.

use thiserror::Error;

/// Common error type for blogo.
#[derive(Error, Debug)]
pub enum BlogoError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (bad config file, bad interval).
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A command needs a logged-in user or a known user name.
    #[error("authentication error: {0}")]
    Auth(String),

    /// No feeds are registered, so there is nothing to poll.
    #[error("no feeds to fetch")]
    NoFeeds,

    /// Transport failure while fetching a feed.
    #[error("network error: {0}")]
    Network(String),

    /// The fetched document is not a valid feed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<sqlx::Error> for BlogoError {
    fn from(e: sqlx::Error) -> Self {
        BlogoError::Database(e.to_string())
    }
}

/// Result type alias for blogo operations.
pub type Result<T> = std::result::Result<T, BlogoError>;
