//! Error types for eventcal.

use thiserror::Error;

/// Errors that can occur while harvesting, storing or exporting events.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Could not parse date text '{0}'")]
    DateParse(String),

    #[error("Expected element not found: {0}")]
    MissingElement(String),

    #[error("Store error: {0}")]
    Store(#[from] csv::Error),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for eventcal operations.
pub type HarvestResult<T> = Result<T, HarvestError>;
