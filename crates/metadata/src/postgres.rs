//! PostgreSQL-based metadata store implementation.

use crate::cache::{CacheEntry, CacheLookup, RepoCache, repo_id_key, repo_url_key};
use crate::error::MetadataResult;
use crate::models::RepoRow;
use crate::repos::RepoStore;
use crate::store::MetadataStore;
use async_trait::async_trait;
use quarry_core::config::PgSslMode;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
    cache: RepoCache,
    invalidate_on_write: bool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        cache: RepoCache,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, cache, max_connections, statement_timeout_ms).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows credentials to be passed separately, enabling better
    /// secret management (e.g., passwords via environment variables).
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        cache: RepoCache,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, cache, max_connections, statement_timeout_ms).await
    }

    /// Internal: Connect to PostgreSQL with the given options.
    async fn connect(
        mut opts: PgConnectOptions,
        cache: RepoCache,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        // Set statement_timeout if configured so a hung query cannot hang the
        // invoking request thread forever.
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            cache,
            invalidate_on_write: false,
        };
        store.migrate().await?;

        Ok(store)
    }

    /// Toggle cache invalidation on save/delete.
    pub fn with_write_invalidation(mut self, enabled: bool) -> Self {
        self.invalidate_on_write = enabled;
        self
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared
        // statement, so the schema is split and executed statement by statement.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RepoStore for PostgresStore {
    async fn save_repo(&self, repo: &RepoRow) -> bool {
        let existing = self.get_repo_by_url(&repo.url).await;
        let is_new = existing.is_none();

        let outcome: MetadataResult<()> = async {
            let mut conn = self.pool.acquire().await?;
            match existing.as_ref() {
                Some(current) => {
                    // Keyed by the identity of the row the url lookup found.
                    // Auxiliary fields are reset to empty defaults on every write.
                    sqlx::query(
                        "UPDATE repo SET name = $1, scm = $2, url = $3, suggestedname = $4, \
                         sourceurl = $5, instructions = $6, sourceid = $7, spdx = $8, \
                         username = $9 WHERE id = $10",
                    )
                    .bind(&repo.name)
                    .bind(&repo.scm)
                    .bind(&repo.url)
                    .bind("")
                    .bind("")
                    .bind("")
                    .bind(1_i64)
                    .bind("")
                    .bind("")
                    .bind(current.row_id)
                    .execute(&mut *conn)
                    .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO repo (name, scm, url, suggestedname, sourceurl, \
                         instructions, sourceid, spdx, username) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                    )
                    .bind(&repo.name)
                    .bind(&repo.scm)
                    .bind(&repo.url)
                    .bind("")
                    .bind("")
                    .bind("")
                    .bind(1_i64)
                    .bind("")
                    .bind("")
                    .execute(&mut *conn)
                    .await?;
                }
            }
            Ok(())
        }
        .await;

        if let Err(err) = outcome {
            tracing::error!(
                repo_name = %repo.name,
                repo_url = %repo.url,
                error = %err,
                "72e4c9d3: unable to save repository"
            );
            return false;
        }

        if self.invalidate_on_write {
            self.cache.invalidate(&repo_url_key(&repo.url));
            if let Some(current) = existing.as_ref() {
                self.cache.invalidate(&repo_id_key(current.row_id));
            }
        }

        is_new
    }

    async fn delete_repo_by_id(&self, repo_id: i64) -> bool {
        let outcome: MetadataResult<()> = async {
            let mut conn = self.pool.acquire().await?;
            sqlx::query("DELETE FROM repo WHERE id = $1")
                .bind(repo_id)
                .execute(&mut *conn)
                .await?;
            Ok(())
        }
        .await;

        if let Err(err) = outcome {
            tracing::error!(
                repo_id,
                error = %err,
                "0b86f5aa: unable to delete repository by id"
            );
            return false;
        }

        if self.invalidate_on_write {
            self.cache.invalidate(&repo_id_key(repo_id));
        }

        true
    }

    async fn delete_repo_by_name(&self, _repo_name: &str) {}

    async fn get_repo_by_id(&self, repo_id: i64) -> Option<RepoRow> {
        let key = repo_id_key(repo_id);
        match self.cache.peek(&key) {
            CacheLookup::Hit(repo) => return Some(repo),
            CacheLookup::HitAbsent => return None,
            CacheLookup::Miss => {}
        }

        let outcome: MetadataResult<Option<RepoRow>> = async {
            let mut conn = self.pool.acquire().await?;
            let rows = sqlx::query_as::<_, RepoRow>("SELECT * FROM repo WHERE id = $1")
                .bind(repo_id)
                .fetch_all(&mut *conn)
                .await?;
            // Last row wins if more than one matches.
            Ok(rows.into_iter().last())
        }
        .await;

        match outcome {
            Ok(result) => {
                if let Some(repo) = result.as_ref() {
                    self.cache.put(key, CacheEntry::Present(repo.clone()));
                }
                result
            }
            Err(err) => {
                tracing::error!(
                    repo_id,
                    error = %err,
                    "c57d1e88: unable to get repository by id"
                );
                None
            }
        }
    }

    async fn get_repo_by_url(&self, repo_url: &str) -> Option<RepoRow> {
        if repo_url.is_empty() {
            return None;
        }

        let key = repo_url_key(repo_url);
        match self.cache.peek(&key) {
            CacheLookup::Hit(repo) => return Some(repo),
            CacheLookup::HitAbsent => return None,
            CacheLookup::Miss => {}
        }

        let outcome: MetadataResult<Option<RepoRow>> = async {
            let mut conn = self.pool.acquire().await?;
            let rows = sqlx::query_as::<_, RepoRow>("SELECT * FROM repo WHERE url = $1")
                .bind(repo_url)
                .fetch_all(&mut *conn)
                .await?;
            // Last row wins if more than one matches.
            Ok(rows.into_iter().last())
        }
        .await;

        match outcome {
            Ok(result) => {
                if let Some(repo) = result.as_ref() {
                    self.cache.put(key, CacheEntry::Present(repo.clone()));
                }
                result
            }
            Err(err) => {
                tracing::error!(
                    repo_url,
                    error = %err,
                    "29a0d6bf: unable to get repository by url"
                );
                None
            }
        }
    }

    async fn get_repo_by_name(&self, _repo_name: &str) -> Option<RepoRow> {
        None
    }

    async fn get_repo_count(&self) -> i64 {
        0
    }

    async fn get_paged_repo(&self, _offset: i64, _page_size: i64) -> Vec<RepoRow> {
        Vec::new()
    }

    async fn search_repo(&self, _search_terms: &str) -> Vec<RepoRow> {
        Vec::new()
    }

    async fn get_all_repo(&self) -> Vec<RepoRow> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_executable_statements() {
        let statements = postgres_schema_statements(POSTGRES_SCHEMA);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS repo"));
        assert!(statements[1].contains("idx_repo_url"));
    }
}
