//! Error types for the StableHaus crate
//!
//! This module contains the errors returned while wiring up and running the
//! coordinator. Per-request failures travel as `StoreError` inside server
//! function responses instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StableHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Store object not found: {0}")]
    StoreNotFound(String),

    #[error("Store object already registered: {0}")]
    StoreAlreadyRegistered(String),

    #[error("Store error: {0}")]
    Store(#[from] store_object::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),
}
