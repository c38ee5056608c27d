//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Failures while resolving an entity against the Open5e API.
///
/// Every variant keeps the literal query URL so it can be shown back to
/// the user for diagnosis.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The API answered with something other than 200.
    #[error("API request failed with status {status}: {query}")]
    Transport { status: u16, query: String },

    /// No response was received at all.
    #[error("API request could not be sent: {query}: {message}")]
    Connection { query: String, message: String },

    /// The body was not a JSON document with a `results` array.
    #[error("Unexpected API response for {query}: {message}")]
    Decode { query: String, message: String },

    /// A broad search hit did not say which category it belongs to.
    #[error("Search result '{label}' has no route: {query}")]
    MissingRoute { label: String, query: String },
}

impl ResolveError {
    /// The query that failed.
    pub fn query(&self) -> &str {
        match self {
            ResolveError::Transport { query, .. }
            | ResolveError::Connection { query, .. }
            | ResolveError::Decode { query, .. }
            | ResolveError::MissingRoute { query, .. } => query,
        }
    }

    /// HTTP status code if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResolveError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Dice calculation errors. Each one is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiceError {
    #[error("The `{0}` operator cannot be the first character")]
    OperatorFirst(String),

    #[error("Unrecognised numeric operator `{0}`")]
    UnknownOperator(String),

    #[error("Invalid argument supplied: {0}")]
    InvalidArgument(String),

    #[error("Value {0} is too big or too small")]
    InvalidSize(String),

    #[error("Cannot divide by zero")]
    DivideByZero,

    #[error("Nothing to calculate")]
    Empty,
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Failed to send message: {message}")]
    SendFailed { message: String },

    #[error("Command registration failed: {message}")]
    RegistrationFailed { message: String },

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Result type alias for Open5e operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
