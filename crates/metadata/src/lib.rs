//! Metadata store abstraction and implementations for quarry.
//!
//! This crate provides the repository-metadata data model:
//! - The `repo` table row type and embedded schema
//! - A process-wide read-through cache with prefixed key namespaces
//! - Repository save/delete/lookup operations with upsert-by-url semantics
//! - SQLite and PostgreSQL store implementations

pub mod cache;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repos;
pub mod store;

pub use cache::{CacheEntry, CacheLookup, RepoCache};
pub use error::{MetadataError, MetadataResult};
pub use postgres::PostgresStore;
pub use repos::RepoStore;
pub use store::{MetadataStore, SqliteStore};

use quarry_core::config::{CacheConfig, MetadataConfig};
use std::sync::Arc;

/// Create a metadata store from configuration.
///
/// Builds the repository cache from `cache` and injects it into the selected
/// backend; `cache.invalidate_on_write` selects the write-invalidation mode.
pub async fn from_config(
    metadata: &MetadataConfig,
    cache: &CacheConfig,
) -> MetadataResult<Arc<dyn MetadataStore>> {
    let repo_cache = RepoCache::from_config(cache);

    match metadata {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path, repo_cache)
                .await?
                .with_write_invalidation(cache.invalidate_on_write);
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
        MetadataConfig::Postgres {
            url,
            host,
            port,
            username,
            password,
            database,
            ssl_mode,
            max_connections,
            statement_timeout_ms,
        } => {
            let store = if let Some(url) = url {
                // URL takes precedence for backward compatibility
                tracing::info!("Connecting to PostgreSQL using connection URL");
                PostgresStore::from_url(url, repo_cache, *max_connections, *statement_timeout_ms)
                    .await?
            } else if let (Some(host), Some(database)) = (host.as_ref(), database.as_ref()) {
                // Use individual parameters
                PostgresStore::from_params(
                    host,
                    port.unwrap_or(5432),
                    username.as_deref(),
                    password.as_deref(),
                    database,
                    *ssl_mode,
                    repo_cache,
                    *max_connections,
                    *statement_timeout_ms,
                )
                .await?
            } else {
                return Err(MetadataError::Config(
                    "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                ));
            };
            let store = store.with_write_invalidation(cache.invalidate_on_write);
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
