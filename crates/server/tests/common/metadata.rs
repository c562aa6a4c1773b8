//! Metadata store test utilities.

use quarry_metadata::{MetadataResult, MetadataStore, RepoCache, SqliteStore};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tempfile::TempDir;

/// A test metadata store wrapper that cleans up on drop.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestMetadata {
    pub store: Arc<dyn MetadataStore>,
    /// Handle to the same cache the store consults; clones share state.
    pub cache: RepoCache,
    pub(crate) sqlite_store: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestMetadata {
    /// Create a new test store with the default no-invalidation contract.
    pub async fn new() -> MetadataResult<Self> {
        Self::build(false).await
    }

    /// Create a test store with write invalidation enabled.
    pub async fn with_invalidation() -> MetadataResult<Self> {
        Self::build(true).await
    }

    async fn build(invalidate_on_write: bool) -> MetadataResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let cache = RepoCache::default();

        let store = SqliteStore::new(&db_path, cache.clone())
            .await?
            .with_write_invalidation(invalidate_on_write);
        let arc_store = Arc::new(store);

        Ok(Self {
            store: arc_store.clone(),
            cache,
            sqlite_store: arc_store,
            _temp_dir: temp_dir,
        })
    }

    /// Get a reference to the metadata store.
    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }

    /// Get a reference to the SQLite connection pool for raw queries.
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite_store.pool()
    }
}
