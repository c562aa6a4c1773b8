//! HTTP API server for the quarry repository-metadata service.
//!
//! This crate provides the JSON control plane:
//! - Repository save (upsert by url), lookup, and delete endpoints
//! - Health-check endpoints for load balancers and probes

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
