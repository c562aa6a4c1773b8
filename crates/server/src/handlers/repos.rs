//! Repository lookup endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use quarry_metadata::models::RepoRow;
use serde::Deserialize;

/// GET /api/repository/{repo_id} - Look up a repository by identity.
///
/// An empty result renders as 404; lookup failures inside the store degrade
/// to the same response.
pub async fn get_repo(
    State(state): State<AppState>,
    Path(repo_id): Path<i64>,
) -> ApiResult<Json<RepoRow>> {
    state
        .metadata
        .get_repo_by_id(repo_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("repository {repo_id} not found")))
}

/// Query parameters for url lookups.
#[derive(Debug, Deserialize)]
pub struct ByUrlParams {
    pub url: String,
}

/// GET /api/repository/by-url?url=... - Look up a repository by url.
pub async fn get_repo_by_url(
    State(state): State<AppState>,
    Query(params): Query<ByUrlParams>,
) -> ApiResult<Json<RepoRow>> {
    state
        .metadata
        .get_repo_by_url(&params.url)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("repository {} not found", params.url)))
}
