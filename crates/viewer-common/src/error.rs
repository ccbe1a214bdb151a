//! Error types for the product viewer.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Every failure the viewer can surface to the user.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Fetch Errors ===
    /// The request could not be sent or its status could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Product service returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed product response: {0}")]
    Parse(String),

    // === Empty Results ===
    #[error("No frames available for realtime product '{field}'; check the product feed")]
    EmptyResultRealtime { field: String },

    #[error("No data for '{field}' ending {end_time}; returning to realtime")]
    EmptyResultArchive { field: String, end_time: String },

    // === Cross-section rendering ===
    #[error("Timed out after {waited:?} waiting for {}", path.display())]
    RenderTimeout { path: PathBuf, waited: Duration },

    #[error("Operation cancelled")]
    Cancelled,

    // === Request Validation ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    /// Short machine-readable code used in XML error documents.
    pub fn code(&self) -> &'static str {
        match self {
            ViewerError::Transport(_) => "TransportError",
            ViewerError::Http { .. } => "HttpError",
            ViewerError::Parse(_) => "ParseError",
            ViewerError::EmptyResultRealtime { .. } => "EmptyResultRealtime",
            ViewerError::EmptyResultArchive { .. } => "EmptyResultArchive",
            ViewerError::RenderTimeout { .. } => "RenderTimeout",
            ViewerError::Cancelled => "Cancelled",
            ViewerError::MissingParameter(_) => "MissingParameterValue",
            ViewerError::InvalidParameter { .. } => "InvalidParameterValue",
            ViewerError::UnknownProduct(_) => "UnknownProduct",
            ViewerError::Io(_) => "IoError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ViewerError::MissingParameter(_) | ViewerError::InvalidParameter { .. } => 400,
            ViewerError::UnknownProduct(_) => 404,
            ViewerError::RenderTimeout { .. } => 504,
            ViewerError::Http { status } => *status,
            _ => 500,
        }
    }

    pub(crate) fn invalid(param: &str, message: impl Into<String>) -> Self {
        ViewerError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}
