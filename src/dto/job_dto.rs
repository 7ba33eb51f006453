use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::{CandidateProfile, ResumeData};
use crate::models::job::{JobPosting, RawJob};
use crate::models::match_result::MatchResult;
use crate::services::acquisition_service::AcquisitionStats;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_MATCH_LIMIT: usize = 10;
pub const STORED_POOL_SIZE: i64 = 500;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JobSearchQuery {
    #[validate(length(min = 1, max = 200))]
    pub query: String,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSearchResponse {
    pub provider: String,
    pub from_cache: bool,
    pub count: usize,
    pub jobs: Vec<JobPosting>,
}

/// Pool selection: `jobs` when given, else a live search for `query`,
/// else the stored jobs.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchRequest {
    #[serde(default)]
    pub resume: ResumeData,
    pub jobs: Option<Vec<RawJob>>,
    #[validate(length(min = 1, max = 200))]
    pub query: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    #[validate(range(max = 100))]
    pub min_score: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub candidate: CandidateProfile,
    pub pool_size: usize,
    pub total: usize,
    pub matches: Vec<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InsightsRequest {
    pub jobs: Option<Vec<RawJob>>,
    #[validate(length(min = 1, max = 32))]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<&'static str>,
    pub stats: AcquisitionStats,
}
