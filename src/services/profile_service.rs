use std::sync::OnceLock;

use regex::Regex;

use crate::models::candidate::{CandidateProfile, ResumeData};
use crate::models::job::ExperienceLevel;
use crate::utils::text::non_empty;

const SENIOR_YEAR_TOKENS: usize = 6;
const MID_YEAR_TOKENS: usize = 4;

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"))
}

/// Counts 4-digit years (1900-2099) as a rough proxy for career length.
///
/// Known limitation: graduation, certification and unrelated dates count the
/// same as employment years, so short resumes with many dated entries skew
/// senior. Bucket boundaries are pinned by the tests below.
pub fn infer_resume_experience(raw_text: &str) -> ExperienceLevel {
    let years = year_regex().find_iter(raw_text).count();
    if years >= SENIOR_YEAR_TOKENS {
        ExperienceLevel::Senior
    } else if years >= MID_YEAR_TOKENS {
        ExperienceLevel::MidLevel
    } else {
        ExperienceLevel::Junior
    }
}

pub fn extract_profile(resume: &ResumeData) -> CandidateProfile {
    let skills = resume
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let location = non_empty(resume.contact_info.location.as_deref())
        .unwrap_or_default()
        .to_string();

    CandidateProfile {
        skills,
        experience_level: infer_resume_experience(&resume.raw_text),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::ContactInfo;

    #[test]
    fn year_buckets() {
        assert_eq!(infer_resume_experience(""), ExperienceLevel::Junior);
        assert_eq!(
            infer_resume_experience("2019 2020 2021"),
            ExperienceLevel::Junior
        );
        assert_eq!(
            infer_resume_experience("Acme 2016-2018, Beta 2018-2021"),
            ExperienceLevel::MidLevel
        );
        assert_eq!(
            infer_resume_experience("1999 2003 2005 2010 2014 2020"),
            ExperienceLevel::Senior
        );
    }

    #[test]
    fn only_plausible_years_count() {
        // 1850, 2150, 120000 and phone digits are ignored
        assert_eq!(
            infer_resume_experience("1850 2150 120000 +216 20123456 2020 2021 2022"),
            ExperienceLevel::Junior
        );
    }

    #[test]
    fn profile_lowercases_and_trims_skills() {
        let resume = ResumeData {
            skills: vec![" Python ".into(), "React".into(), "".into()],
            raw_text: "2018 2019 2020 2021".into(),
            contact_info: ContactInfo {
                location: Some("  Tunis ".into()),
            },
        };

        let profile = extract_profile(&resume);

        assert_eq!(profile.skills, vec!["python", "react"]);
        assert_eq!(profile.experience_level, ExperienceLevel::MidLevel);
        assert_eq!(profile.location, "Tunis");
    }

    #[test]
    fn missing_location_is_empty() {
        let profile = extract_profile(&ResumeData::default());
        assert_eq!(profile.location, "");
        assert!(profile.skills.is_empty());
        assert_eq!(profile.experience_level, ExperienceLevel::Junior);
    }
}
