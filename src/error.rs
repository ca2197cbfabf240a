use thiserror::Error;

/// Fatal errors that abort an export run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to {operation}: HTTP {status} {body}")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Failed to {operation} after {attempts} attempts: read operation timed out")]
    Timeout { operation: String, attempts: u32 },

    #[error("Deck '{0}' not found")]
    DeckNotFound(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single card is dropped by the parser. Never fatal.
#[derive(Error, Debug, PartialEq)]
pub enum CardParseError {
    #[error("expected '{0}' to be an object")]
    NotAnObject(String),

    #[error("expected '{0}' to be a string")]
    NotAString(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}
