use thiserror::Error;

/// Failure of a cache backend or of (de)serializing a cached value
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cached value could not be encoded or decoded: {0}")]
    Encoding(#[from] serde_json::Error),
}
