use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::serde_flex::{
    deserialize_bool_flexible, deserialize_datetime_flexible, deserialize_f64_flexible,
    deserialize_flag_flexible, deserialize_id_flexible, deserialize_string_flexible,
    deserialize_strings_flexible,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Mena,
    SubSaharanAfrica,
    Other,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Mena => "MENA",
            Region::SubSaharanAfrica => "SUB_SAHARAN_AFRICA",
            Region::Other => "OTHER",
        }
    }

    pub fn is_african(&self) -> bool {
        matches!(self, Region::Mena | Region::SubSaharanAfrica)
    }

    /// Lenient parse used for stored rows and query strings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "MENA" => Some(Region::Mena),
            "SUB_SAHARAN_AFRICA" | "SSA" => Some(Region::SubSaharanAfrica),
            "OTHER" => Some(Region::Other),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ExperienceLevel {
    Junior,
    #[default]
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 3] = [
        ExperienceLevel::Junior,
        ExperienceLevel::MidLevel,
        ExperienceLevel::Senior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "junior" => Some(ExperienceLevel::Junior),
            "mid-level" | "mid level" | "mid" => Some(ExperienceLevel::MidLevel),
            "senior" => Some(ExperienceLevel::Senior),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SalaryRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Canonical job record. Only the normalizer builds these from provider data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub region: Region,
    pub job_type: String,
    pub experience_level: ExperienceLevel,
    pub description: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub salary_range: Option<SalaryRange>,
    pub remote: bool,
    pub posted_date: Option<String>,
    pub url: String,
    #[serde(default)]
    pub url_is_synthetic: bool,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

/// Provider record after adapter-level extraction, before normalization.
/// Every field is optional because upstream APIs omit or mangle any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawJob {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    pub id: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub company: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub job_type: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_strings_flexible")]
    pub required_skills: Vec<String>,
    #[serde(deserialize_with = "deserialize_strings_flexible")]
    pub preferred_skills: Vec<String>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub salary_min: Option<f64>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub salary_max: Option<f64>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub salary_currency: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub salary_text: Option<String>,
    #[serde(deserialize_with = "deserialize_bool_flexible")]
    pub remote: Option<bool>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub posted_date: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_flag_flexible")]
    pub url_is_synthetic: bool,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    pub source: Option<String>,
    #[serde(deserialize_with = "deserialize_datetime_flexible")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl From<JobPosting> for RawJob {
    fn from(job: JobPosting) -> Self {
        let (salary_min, salary_max, salary_currency, salary_text) = match job.salary_range {
            Some(salary) => (
                Some(salary.min),
                Some(salary.max),
                Some(salary.currency),
                salary.text,
            ),
            None => (None, None, None, None),
        };

        Self {
            id: Some(job.id),
            title: Some(job.title),
            company: Some(job.company),
            location: Some(job.location),
            job_type: Some(job.job_type),
            description: Some(job.description),
            required_skills: job.required_skills,
            preferred_skills: job.preferred_skills,
            salary_min,
            salary_max,
            salary_currency,
            salary_text,
            remote: Some(job.remote),
            posted_date: job.posted_date,
            url: Some(job.url),
            url_is_synthetic: job.url_is_synthetic,
            source: Some(job.source),
            fetched_at: Some(job.fetched_at),
        }
    }
}
