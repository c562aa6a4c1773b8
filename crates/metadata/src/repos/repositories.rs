//! Repository store trait for indexed-repository metadata.

use crate::models::RepoRow;
use async_trait::async_trait;

/// Persistence operations over repository metadata.
///
/// Lookups consult the process-wide cache before the database and populate
/// it after a read that found a row. Persistence failures never propagate:
/// every operation logs the error once, with a unique diagnostic tag, and
/// returns a benign result (`None`, `false`, or "not new").
#[async_trait]
pub trait RepoStore: Send + Sync {
    /// Insert or update a repository, keyed by its url.
    ///
    /// Looks up an existing row by url (through the cache-consulting url
    /// path). A match is updated in place, keyed by the matched row's
    /// identity; otherwise a new row is inserted and the store assigns the
    /// identity. Either way the auxiliary descriptive fields are reset to
    /// their empty defaults. Returns whether a new row was created; a
    /// persistence failure reports `false`.
    ///
    /// The lookup and the write are not atomic: two concurrent saves of the
    /// same new url can both insert.
    async fn save_repo(&self, repo: &RepoRow) -> bool;

    /// Delete the row with the given identity.
    ///
    /// Returns `true` on successful execution (even when no row matched),
    /// `false` if the database reports an error.
    async fn delete_repo_by_id(&self, repo_id: i64) -> bool;

    /// Deliberately unimplemented; callers must not rely on it.
    async fn delete_repo_by_name(&self, repo_name: &str);

    /// Look up a repository by identity, cache first.
    async fn get_repo_by_id(&self, repo_id: i64) -> Option<RepoRow>;

    /// Look up a repository by url, cache first.
    ///
    /// An empty url never matches a row and short-circuits without touching
    /// the cache or the database.
    async fn get_repo_by_url(&self, repo_url: &str) -> Option<RepoRow>;

    /// Declared for callers that probe the capability; currently a stub.
    async fn get_repo_by_name(&self, repo_name: &str) -> Option<RepoRow>;

    /// Declared for callers that probe the capability; currently a stub.
    async fn get_repo_count(&self) -> i64;

    /// Declared for callers that probe the capability; currently a stub.
    async fn get_paged_repo(&self, offset: i64, page_size: i64) -> Vec<RepoRow>;

    /// Declared for callers that probe the capability; currently a stub.
    async fn search_repo(&self, search_terms: &str) -> Vec<RepoRow>;

    /// Declared for callers that probe the capability; currently a stub.
    async fn get_all_repo(&self) -> Vec<RepoRow>;
}
