use thiserror::Error;

/// Main error type for Tripgraph
#[derive(Error, Debug)]
pub enum TripgraphError {
    /// Graph store (sqlite backend) errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failures (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from an upstream service
    #[error("{service} request failed. Received: {status} {reason}")]
    Upstream {
        service: String,
        status: u16,
        reason: String,
    },

    /// Text generation errors (missing credential, unusable payload)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse errors on generation output that are not recovered
    #[error("Parse error: {0}")]
    Parse(String),

    /// Graph store contract violations
    #[error("Graph error: {0}")]
    Graph(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TripgraphError {
    /// Build an upstream error from a non-success response status.
    pub fn upstream(service: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        let reason = if body.is_empty() {
            reason.to_string()
        } else {
            format!("{} - {}", reason, body)
        };
        TripgraphError::Upstream {
            service: service.to_string(),
            status: status.as_u16(),
            reason,
        }
    }
}

/// Convenient Result type using TripgraphError
pub type Result<T> = std::result::Result<T, TripgraphError>;
