use crate::server_fn::InputValidationError;
use cache_system::CacheError;
use thiserror::Error;

/// Failure of a query or mutation issued through the query client
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid input: {0}")]
    Validation(InputValidationError),

    #[error("{0}")]
    Server(String),

    #[error("Unknown server function: {0}")]
    UnknownFunction(String),

    #[error("Unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
