use std::collections::HashMap;

use serde::Serialize;

use crate::models::job::{ExperienceLevel, JobPosting, Region};

pub const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBand {
    pub experience_level: ExperienceLevel,
    pub average_midpoint: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInsights {
    pub region: Option<Region>,
    pub total_jobs: usize,
    pub top_skills: Vec<SkillCount>,
    pub average_salaries: Vec<SalaryBand>,
    pub remote_percentage: f64,
}

/// Skill frequency across required and preferred skills. Counting is
/// case-insensitive; the first spelling seen is the one reported.
fn top_skills<'a>(jobs: impl Iterator<Item = &'a JobPosting>) -> Vec<SkillCount> {
    let mut counts: Vec<SkillCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for job in jobs {
        for skill in job.required_skills.iter().chain(&job.preferred_skills) {
            let display = skill.trim();
            if display.is_empty() {
                continue;
            }
            match index.get(&display.to_lowercase()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(display.to_lowercase(), counts.len());
                    counts.push(SkillCount {
                        skill: display.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_SKILLS);
    counts
}

/// Salaries are averaged as reported; mixed currencies are not converted.
fn salary_bands<'a>(jobs: impl Iterator<Item = &'a JobPosting>) -> Vec<SalaryBand> {
    let mut sums: HashMap<ExperienceLevel, (f64, usize)> = HashMap::new();
    for job in jobs {
        if let Some(salary) = &job.salary_range {
            let entry = sums.entry(job.experience_level).or_default();
            entry.0 += salary.midpoint();
            entry.1 += 1;
        }
    }

    ExperienceLevel::ALL
        .iter()
        .filter_map(|level| {
            sums.get(level).map(|(total, n)| SalaryBand {
                experience_level: *level,
                average_midpoint: (total / *n as f64).round(),
                sample_size: *n,
            })
        })
        .collect()
}

pub fn market_insights(jobs: &[JobPosting], region: Option<Region>) -> MarketInsights {
    let in_region = || {
        jobs.iter()
            .filter(move |job| region.map_or(true, |r| job.region == r))
    };

    let total_jobs = in_region().count();
    let remote = in_region().filter(|job| job.remote).count();
    let remote_percentage = if total_jobs == 0 {
        0.0
    } else {
        (remote as f64 / total_jobs as f64 * 1000.0).round() / 10.0
    };

    MarketInsights {
        region,
        total_jobs,
        top_skills: top_skills(in_region()),
        average_salaries: salary_bands(in_region()),
        remote_percentage,
    }
}
