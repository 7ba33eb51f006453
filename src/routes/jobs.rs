use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use tracing::{error, info};
use validator::Validate;

use crate::{
    dto::job_dto::{
        InsightsRequest, JobSearchQuery, JobSearchResponse, MatchRequest, MatchResponse,
        ProvidersResponse, DEFAULT_MATCH_LIMIT, DEFAULT_SEARCH_LIMIT, STORED_POOL_SIZE,
    },
    error::{Error, Result},
    models::job::{JobPosting, Region},
    services::{
        acquisition_service::FALLBACK_SOURCE,
        insights_service::market_insights,
        match_service::{match_jobs, DEFAULT_MIN_SCORE},
        normalizer::normalize_all,
        profile_service::extract_profile,
    },
    AppState,
};

const NO_MATCHES_MESSAGE: &str =
    "No jobs matched your profile above the minimum score. Try broadening the search or adding skills.";

/// Live jobs are stored on a best-effort basis; placeholder listings are not.
async fn persist(state: &AppState, provider: &str, jobs: &[JobPosting]) {
    if provider == FALLBACK_SOURCE || jobs.is_empty() {
        return;
    }
    if let Err(e) = state.job_store.upsert_jobs(jobs).await {
        error!(error = %e, count = jobs.len(), "Failed to persist fetched jobs");
    }
}

async fn acquire_pool(
    state: &AppState,
    query: &str,
    location: &str,
    limit: usize,
) -> (String, bool, Vec<JobPosting>) {
    let acquired = state
        .acquisition
        .lock()
        .await
        .acquire_detailed(query, location, limit)
        .await;
    let jobs = normalize_all(acquired.jobs);
    (acquired.provider, acquired.from_cache, jobs)
}

#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchQuery>,
) -> Result<impl IntoResponse> {
    params.validate()?;
    let location = params.location.as_deref().unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let (provider, from_cache, jobs) = acquire_pool(&state, &params.query, location, limit).await;
    if !from_cache {
        persist(&state, &provider, &jobs).await;
    }

    Ok(Json(JobSearchResponse {
        provider,
        from_cache,
        count: jobs.len(),
        jobs,
    }))
}

#[axum::debug_handler]
pub async fn match_candidate(
    State(state): State<AppState>,
    Json(payload): Json<MatchRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = extract_profile(&payload.resume);
    let limit = payload.limit.unwrap_or(DEFAULT_MATCH_LIMIT);
    let min_score = payload.min_score.unwrap_or(DEFAULT_MIN_SCORE);

    let (provider, pool) = match (payload.jobs, payload.query.as_deref()) {
        (Some(jobs), _) => (None, normalize_all(jobs)),
        (None, Some(query)) => {
            let location = payload
                .location
                .as_deref()
                .unwrap_or(candidate.location.as_str());
            let (provider, from_cache, jobs) =
                acquire_pool(&state, query, location, DEFAULT_SEARCH_LIMIT).await;
            if !from_cache {
                persist(&state, &provider, &jobs).await;
            }
            (Some(provider), jobs)
        }
        (None, None) => (None, state.job_store.list_jobs(None, STORED_POOL_SIZE).await?),
    };

    let matches = match_jobs(&candidate, &pool, limit, min_score);
    info!(
        pool = pool.len(),
        matches = matches.len(),
        min_score,
        "Matched candidate against job pool"
    );

    let message = matches.is_empty().then(|| NO_MATCHES_MESSAGE.to_string());
    Ok(Json(MatchResponse {
        candidate,
        pool_size: pool.len(),
        total: matches.len(),
        matches,
        provider,
        message,
    }))
}

#[axum::debug_handler]
pub async fn job_insights(
    State(state): State<AppState>,
    Json(payload): Json<InsightsRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let region = payload
        .region
        .as_deref()
        .map(|r| Region::parse(r).ok_or_else(|| Error::BadRequest(format!("Unknown region: {}", r))))
        .transpose()?;

    let pool = match payload.jobs {
        Some(jobs) => normalize_all(jobs),
        None => state.job_store.list_jobs(region, STORED_POOL_SIZE).await?,
    };

    Ok(Json(market_insights(&pool, region)))
}

#[axum::debug_handler]
pub async fn provider_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let controller = state.acquisition.lock().await;
    Ok(Json(ProvidersResponse {
        providers: controller.provider_names(),
        stats: controller.stats(),
    }))
}
