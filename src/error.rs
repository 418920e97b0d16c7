//! Application error types.
//!
//! These errors are serializable so any front end can render them as
//! structured JSON, and their `Display` text is what lands in result logs.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors returned by the console engine.
///
/// All variants serialize to a structured JSON object for frontend consumption.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Missing or rejected credentials.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// A gated call came back with a non-success status.
    #[error("Request failed: {message}")]
    Request {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },

    /// Network request failed before a status was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A stage of the upload pipeline failed.
    #[error("Pipeline failed while {stage}: {message}")]
    Pipeline { stage: String, message: String },

    /// The batch mutation call itself failed.
    #[error("Batch error: {message}")]
    Batch { message: String },

    /// A second submission arrived while one is still in flight.
    #[error("{operation} is already in progress")]
    Busy { operation: String },

    /// Credential storage operation failed.
    #[error("Credential storage error: {message}")]
    CredentialStorage { message: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create a request error with status code and endpoint.
    pub fn request_full(
        message: impl Into<String>,
        status_code: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::Request {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a pipeline error for the named stage.
    pub fn pipeline(stage: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.to_string(),
            message: message.into(),
        }
    }

    /// Create a batch error.
    pub fn batch(message: impl Into<String>) -> Self {
        Self::Batch {
            message: message.into(),
        }
    }

    /// Create a busy error.
    pub fn busy(operation: impl Into<String>) -> Self {
        Self::Busy {
            operation: operation.into(),
        }
    }

    /// Create a credential storage error.
    pub fn credential_storage(message: impl Into<String>) -> Self {
        Self::CredentialStorage {
            message: message.into(),
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the server rejected the held credential.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// HTTP status attached to a request error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// The underlying detail without the variant prefix.
    ///
    /// Used when an error is folded into a stage or batch message so the
    /// operator does not see nested "error: error:" prefixes.
    pub fn detail(&self) -> String {
        match self {
            Self::Authentication { message }
            | Self::Request { message, .. }
            | Self::Network { message }
            | Self::Batch { message }
            | Self::CredentialStorage { message }
            | Self::InvalidInput { message, .. }
            | Self::Internal { message } => message.clone(),
            Self::Pipeline { message, .. } => message.clone(),
            Self::Busy { .. } => self.to_string(),
        }
    }
}

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_status() {
            Self::request(format!("HTTP error: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {}", err))
    }
}
