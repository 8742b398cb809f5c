//! Error types for mood-menu

use thiserror::Error;

/// Main error type for mood-menu operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Projection error: {0}")]
    Projection(String),

    /// Network or HTTP-layer failure talking to an upstream service
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Well-formed upstream response that lacks the fields we need
    #[error("Upstream data missing: {0}")]
    UpstreamDataMissing(String),

    /// Upstream answered successfully but reported an error in the body
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Rejected user input (e.g. submitting without a mood)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A recommendation request is already in flight")]
    SubmissionInFlight,

    #[error("Ambient context has not been loaded yet")]
    ContextNotLoaded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for mood-menu operations
pub type Result<T> = std::result::Result<T, Error>;
