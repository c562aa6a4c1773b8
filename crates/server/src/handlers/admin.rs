//! Health and repository-administration endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use quarry_metadata::models::RepoRow;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /healthcheck (and /health-check) - Health check.
///
/// Intentionally unauthenticated to support load balancer and Kubernetes
/// probes. Returns only non-sensitive information.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    // Check metadata store connectivity
    state.metadata.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Request body for saving a repository.
#[derive(Debug, Deserialize)]
pub struct SaveRepoRequest {
    pub name: String,
    pub scm: String,
    pub url: String,
}

/// Response for a save operation.
#[derive(Debug, Serialize)]
pub struct SaveRepoResponse {
    /// Whether a new row was created (false for updates and for failed saves).
    pub created: bool,
}

/// POST /api/repository - Insert or update a repository, keyed by url.
pub async fn save_repo(
    State(state): State<AppState>,
    Json(request): Json<SaveRepoRequest>,
) -> ApiResult<Json<SaveRepoResponse>> {
    if request.url.is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }

    let repo = RepoRow::new(request.name, request.scm, request.url);
    let created = state.metadata.save_repo(&repo).await;

    Ok(Json(SaveRepoResponse { created }))
}

/// Response for a delete operation.
#[derive(Debug, Serialize)]
pub struct DeleteRepoResponse {
    /// Whether the delete statement executed successfully.
    pub deleted: bool,
}

/// DELETE /api/repository/{repo_id} - Delete a repository by identity.
pub async fn delete_repo(
    State(state): State<AppState>,
    Path(repo_id): Path<i64>,
) -> Json<DeleteRepoResponse> {
    let deleted = state.metadata.delete_repo_by_id(repo_id).await;
    Json(DeleteRepoResponse { deleted })
}
