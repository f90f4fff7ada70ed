use thiserror::Error;

/// Errors returned by the catalog client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request failed or the server answered with an error status.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response or a stored preference was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The preferences file could not be read or written.
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The base URL cannot carry catalog paths.
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// The response was valid JSON of the wrong kind.
    #[error("expected a JSON array, got {0}")]
    UnexpectedShape(&'static str),
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
