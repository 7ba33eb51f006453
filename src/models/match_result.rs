use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobPosting;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobPosting,
    pub overall_score: u8,
    pub skill_score: u8,
    pub location_score: u8,
    pub experience_score: u8,
    pub title_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub matched_at: DateTime<Utc>,
}
