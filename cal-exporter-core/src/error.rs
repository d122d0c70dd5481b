//! Error types for cal-exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by adapter errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A `-d/--date` expression that matches none of the accepted grammars.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date filter '{offending}' in '{input}': {reason}")]
pub struct DateParseError {
    /// The full expression as given.
    pub input: String,
    /// The part of the expression that failed to parse.
    pub offending: String,
    pub reason: String,
}

impl DateParseError {
    pub(crate) fn new(input: &str, offending: &str, reason: impl Into<String>) -> Self {
        DateParseError {
            input: input.to_string(),
            offending: offending.to_string(),
            reason: reason.into(),
        }
    }
}

/// A malformed `-s/--search` token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hashtag '{token}': {reason}")]
pub struct FilterSyntaxError {
    pub token: String,
    pub reason: String,
}

/// Violations of the event normalization contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event '{0}' ends before it starts")]
    EndBeforeStart(String),
}

/// Errors raised while producing events from a calendar source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("iCal file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File must have .ics extension: {}", .0.display())]
    NotIcs(PathBuf),

    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Authentication failed: {message}")]
    Auth {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Failed to parse calendar data: {0}")]
    Parse(String),
}
