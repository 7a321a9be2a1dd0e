use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(shiftsync::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(shiftsync::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(shiftsync::google_calendar))]
    GoogleCalendar(String),

    #[error("Schedule error: {0}")]
    #[diagnostic(code(shiftsync::schedule))]
    Schedule(String),

    #[error("Feed error: {0}")]
    #[diagnostic(code(shiftsync::feed))]
    Feed(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(shiftsync::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(shiftsync::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shiftsync::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(shiftsync::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Schedule(format!("Failed to read CSV: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create schedule errors
pub fn schedule_error(message: &str) -> Error {
    Error::Schedule(message.to_string())
}

/// Helper to create feed errors
pub fn feed_error(message: &str) -> Error {
    Error::Feed(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
