//! Shared configuration types for quarry.
//!
//! quarry is the repository-metadata service of a code-search web
//! application. This crate defines the configuration model consumed by the
//! metadata store and the HTTP server.

pub mod config;

pub use config::{AppConfig, CacheConfig, MetadataConfig, PgSslMode, ServerConfig};
