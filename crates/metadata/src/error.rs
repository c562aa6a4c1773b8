//! Metadata store error types.

use thiserror::Error;

/// Metadata store operation errors.
///
/// These surface only from infrastructure operations (construction,
/// migration, health checks). Repository operations catch persistence
/// failures at the store boundary and degrade to benign results instead.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
