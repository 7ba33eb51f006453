use serde::{Deserialize, Serialize};

use crate::models::job::ExperienceLevel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub location: Option<String>,
}

/// Structured output of the resume parsing pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    pub skills: Vec<String>,
    pub raw_text: String,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub location: String,
}
