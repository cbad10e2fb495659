use thiserror::Error;

/// The two ways a catalog call can go wrong, as far as fetch state is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    UnexpectedShape,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected catalog response: {0}")]
    UnexpectedShape(String),

    #[error("catalog is not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Network(_)
            | CatalogError::Status { .. }
            | CatalogError::Decode(_)
            | CatalogError::NotConfigured(_) => ErrorKind::NetworkFailure,
            CatalogError::UnexpectedShape(_) => ErrorKind::UnexpectedShape,
        }
    }
}
