//! Error types for vidgraph.

use serde::Serialize;
use thiserror::Error;

/// Library-level error type for vidgraph operations.
#[derive(Error, Debug)]
pub enum VidgraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    /// The provider refused the request (bad key, bad model, bad request).
    #[error("Generation rejected: {0}")]
    GenerationRejected(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Graph store error: {0}")]
    GraphStore(String),

    #[error("Speech service error: {0}")]
    Speech(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Coarse error category reported to callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TranscriptUnavailable,
    GenerationFailure,
    NotFound,
    InvalidInput,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::TranscriptUnavailable => "transcript_unavailable",
            ErrorKind::GenerationFailure => "generation_failure",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

impl VidgraphError {
    /// The category this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidgraphError::TranscriptUnavailable(_) => ErrorKind::TranscriptUnavailable,
            VidgraphError::Generation(_) | VidgraphError::GenerationRejected(_) => {
                ErrorKind::GenerationFailure
            }
            VidgraphError::NotFound(_) => ErrorKind::NotFound,
            VidgraphError::InvalidInput(_) => ErrorKind::InvalidInput,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether a retry of the same model call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, VidgraphError::Generation(_))
    }
}

/// Result type alias for vidgraph operations.
pub type Result<T> = std::result::Result<T, VidgraphError>;
