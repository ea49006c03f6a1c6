//! Error types for SheetChat
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling, and the rule that turns
//! any failure into the single line of text shown in the transcript.

use thiserror::Error;

/// Main error type for SheetChat operations
///
/// Covers configuration loading, client-side validation, backend HTTP
/// failures and local I/O.
#[derive(Error, Debug)]
pub enum SheetchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more files failed the spreadsheet extension gate
    #[error("Invalid file type(s): {0}. Only .xlsx and .xls files are allowed.")]
    InvalidFileType(String),

    /// An upload was attempted with no files
    #[error("No files provided")]
    EmptyUpload,

    /// The backend answered with a non-success status
    ///
    /// `detail` carries the backend's structured `detail` message when the
    /// body had one.
    #[error("Request failed with status code {status}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// The `detail` field of the error body, if present
        detail: Option<String>,
    },

    /// Connection or decoding failure talking to the backend
    #[error("{0}")]
    Transport(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SheetchatError {
    /// The backend-provided detail message, if this error carries one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }
}

/// Result type alias for SheetChat operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// [`SheetchatError`] stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

/// Text shown to the user for a failed backend interaction
///
/// Preference order: the backend's `detail` message, then the error's own
/// message, then `fallback`.
///
/// # Examples
///
/// ```
/// use sheetchat::error::{failure_message, SheetchatError};
///
/// let err = anyhow::Error::from(SheetchatError::Api {
///     status: 400,
///     detail: Some("No data uploaded for this session.".to_string()),
/// });
/// assert_eq!(
///     failure_message(&err, "fallback"),
///     "No data uploaded for this session."
/// );
/// ```
pub fn failure_message(err: &anyhow::Error, fallback: &str) -> String {
    if let Some(detail) = err
        .downcast_ref::<SheetchatError>()
        .and_then(SheetchatError::detail)
    {
        return detail.to_string();
    }

    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
