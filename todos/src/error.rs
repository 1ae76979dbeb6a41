//! Error types for the todo store.
//!
//! Local mutations are total and have no error type. The only runtime
//! failure is the seed fetch; its `Display` text is what ends up in
//! `TodoState::error`.

use thiserror::Error;

/// Errors that can occur while fetching seed todos
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The source answered with a non-success status
    #[error("Seed source returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not the expected JSON array
    #[error("Could not decode seed todos: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed
    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

/// Errors raised while loading [`Config`](crate::config::Config)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value `{value}` for {var}: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A `.env` file exists but could not be read
    #[error("Could not read env file: {0}")]
    File(String),

    /// The values parsed but do not make sense together
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}
