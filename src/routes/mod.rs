pub mod health;
pub mod jobs;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/jobs/search", get(jobs::search_jobs))
        .route("/api/jobs/match", post(jobs::match_candidate))
        .route("/api/jobs/insights", post(jobs::job_insights))
        .route("/api/jobs/providers", get(jobs::provider_stats))
        .with_state(state)
}
