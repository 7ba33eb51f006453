use std::collections::HashSet;

use crate::models::candidate::CandidateProfile;
use crate::models::job::{ExperienceLevel, JobPosting, Region};
use crate::models::match_result::MatchResult;
use crate::services::normalizer::{is_location_agnostic, region_of};
use crate::utils::time::now;

pub const DEFAULT_MIN_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub title: f64,
}

pub const WEIGHTS: Weights = Weights {
    skills: 0.50,
    experience: 0.25,
    location: 0.15,
    title: 0.10,
};

/// Lower-case and strip `.`, `-`, `_` so "Node.js" and "nodejs" compare equal.
pub fn normalize_skill(skill: &str) -> String {
    skill
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Substring either way, or any shared whitespace-separated word.
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_skill(a), normalize_skill(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    let words: HashSet<&str> = a.split_whitespace().collect();
    b.split_whitespace().any(|w| words.contains(w))
}

fn matches_any(skill: &str, pool: &[String]) -> bool {
    pool.iter().any(|other| fuzzy_match(skill, other))
}

fn percent_covered(job_skills: &[String], candidate: &[String], when_empty: f64) -> f64 {
    if job_skills.is_empty() {
        return when_empty;
    }
    let matched = job_skills
        .iter()
        .filter(|skill| matches_any(skill, candidate))
        .count();
    matched as f64 / job_skills.len() as f64 * 100.0
}

pub fn skill_score(candidate_skills: &[String], job: &JobPosting) -> f64 {
    let required_pct = percent_covered(&job.required_skills, candidate_skills, 100.0);
    let preferred_pct = percent_covered(&job.preferred_skills, candidate_skills, 50.0);
    let mut score = required_pct * 0.75 + preferred_pct * 0.25;

    let listed = job.required_skills.len() + job.preferred_skills.len();
    if candidate_skills.len() > listed {
        let surplus = candidate_skills.len() - listed;
        score += (surplus / 2).min(10) as f64;
    }

    score.clamp(0.0, 100.0)
}

/// Ordinal seniority: intern 0, entry/junior 1, mid 2, senior 3, lead 4,
/// principal/staff/expert 5. Unrecognized labels count as mid.
pub fn level_rank(level: &str) -> u8 {
    const LADDER: &[(&str, u8)] = &[
        ("intern", 0),
        ("entry", 1),
        ("junior", 1),
        ("mid", 2),
        ("senior", 3),
        ("lead", 4),
        ("principal", 5),
        ("staff", 5),
        ("expert", 5),
    ];
    let level = level.to_lowercase();
    LADDER
        .iter()
        .find(|(label, _)| level.contains(label))
        .map(|(_, rank)| *rank)
        .unwrap_or(2)
}

pub fn experience_score(candidate: ExperienceLevel, job: ExperienceLevel) -> f64 {
    let candidate = level_rank(candidate.as_str());
    let job = level_rank(job.as_str());
    let overqualified = candidate > job;

    match (candidate.abs_diff(job), overqualified) {
        (0, _) => 100.0,
        (1, true) => 90.0,
        (1, false) => 70.0,
        (2, true) => 70.0,
        (2, false) => 50.0,
        (_, true) => 50.0,
        (_, false) => 30.0,
    }
}

/// A posting whose location says "remote" is scored as remote even when the
/// provider's flag is false.
pub fn location_score(candidate_location: &str, job: &JobPosting) -> f64 {
    let candidate = candidate_location.trim().to_lowercase();
    let job_location = job.location.trim().to_lowercase();

    if job.remote || job_location.contains("remote") {
        return 100.0;
    }

    if !candidate.is_empty()
        && !job_location.is_empty()
        && (job_location.contains(&candidate) || candidate.contains(&job_location))
    {
        return 100.0;
    }

    let candidate_region = region_of(&candidate);
    if candidate_region != Region::Other && candidate_region == job.region {
        return 75.0;
    }
    if candidate_region.is_african() && job_location.contains("africa") {
        return 60.0;
    }
    if is_location_agnostic(&job_location) || job_location.contains("international") {
        return 90.0;
    }

    40.0
}

fn title_tokens(title: &str) -> Vec<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

pub fn title_score(candidate_skills: &[String], title: &str) -> f64 {
    let tokens = title_tokens(title);
    if tokens.is_empty() {
        return 50.0;
    }

    let matches = candidate_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|skill| {
            !skill.is_empty()
                && tokens
                    .iter()
                    .any(|t| t.contains(skill.as_str()) || skill.contains(t.as_str()))
        })
        .count();

    let denominator = (tokens.len() / 2).max(3);
    (matches as f64 / denominator as f64 * 100.0).min(100.0)
}

fn skill_breakdown(candidate_skills: &[String], job: &JobPosting) -> (Vec<String>, Vec<String>) {
    let listed: Vec<String> = job
        .required_skills
        .iter()
        .chain(job.preferred_skills.iter())
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let matched = candidate_skills
        .iter()
        .filter(|skill| matches_any(skill, &listed))
        .filter(|skill| seen.insert(normalize_skill(skill)))
        .cloned()
        .collect();

    let missing = job
        .required_skills
        .iter()
        .filter(|skill| !matches_any(skill, candidate_skills))
        .cloned()
        .collect();

    (matched, missing)
}

fn to_percent(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

pub fn score(candidate: &CandidateProfile, job: &JobPosting) -> MatchResult {
    let skills = skill_score(&candidate.skills, job);
    let experience = experience_score(candidate.experience_level, job.experience_level);
    let location = location_score(&candidate.location, job);
    let title = title_score(&candidate.skills, &job.title);

    let overall = skills * WEIGHTS.skills
        + experience * WEIGHTS.experience
        + location * WEIGHTS.location
        + title * WEIGHTS.title;

    let (matched_skills, missing_skills) = skill_breakdown(&candidate.skills, job);

    MatchResult {
        job: job.clone(),
        overall_score: overall.clamp(0.0, 100.0) as u8,
        skill_score: to_percent(skills),
        location_score: to_percent(location),
        experience_score: to_percent(experience),
        title_score: to_percent(title),
        matched_skills,
        missing_skills,
        matched_at: now(),
    }
}

/// Scores the whole pool, keeps results at or above `min_score`, and orders
/// them best first. Equal scores keep pool order.
pub fn match_jobs(
    candidate: &CandidateProfile,
    pool: &[JobPosting],
    limit: usize,
    min_score: u8,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = pool
        .iter()
        .map(|job| score(candidate, job))
        .filter(|result| result.overall_score >= min_score)
        .collect();

    results.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
    results.truncate(limit);

    tracing::debug!(
        pool = pool.len(),
        kept = results.len(),
        min_score,
        "Ranked job matches"
    );
    results
}
