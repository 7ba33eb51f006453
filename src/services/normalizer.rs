use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::job::{ExperienceLevel, JobPosting, RawJob, Region, SalaryRange};
use crate::utils::text::{contains_term, non_empty, slugify};
use crate::utils::time::{now, to_iso_date};

const MISSING: &str = "N/A";
const DEFAULT_JOB_TYPE: &str = "Full-time";
const DEFAULT_CURRENCY: &str = "USD";
const MAX_EXTRACTED_SKILLS: usize = 10;

pub const MENA_KEYWORDS: &[&str] = &[
    "tunisia", "tunis", "sfax", "sousse", "egypt", "cairo", "alexandria", "giza", "morocco",
    "casablanca", "rabat", "marrakech", "tangier", "algeria", "algiers", "oran", "libya",
    "tripoli", "benghazi", "uae", "united arab emirates", "dubai", "abu dhabi", "sharjah",
    "saudi arabia", "saudi", "ksa", "riyadh", "jeddah", "dammam", "qatar", "doha", "kuwait",
    "bahrain", "manama", "oman", "muscat", "jordan", "amman", "lebanon", "beirut", "iraq",
    "baghdad", "erbil", "syria", "damascus", "palestine", "ramallah", "israel", "tel aviv",
    "iran", "tehran", "yemen", "sanaa", "mena", "middle east", "north africa",
];

pub const SSA_KEYWORDS: &[&str] = &[
    "nigeria", "lagos", "abuja", "ibadan", "kenya", "nairobi", "mombasa", "south africa",
    "johannesburg", "cape town", "durban", "pretoria", "ghana", "accra", "kumasi", "ethiopia",
    "addis ababa", "rwanda", "kigali", "uganda", "kampala", "tanzania", "dar es salaam",
    "senegal", "dakar", "ivory coast", "cote d'ivoire", "côte d'ivoire", "abidjan", "cameroon",
    "douala", "yaounde", "zambia", "lusaka", "zimbabwe", "harare", "botswana", "gaborone",
    "namibia", "windhoek", "mozambique", "maputo", "angola", "luanda", "mali", "bamako",
    "burkina faso", "ouagadougou", "benin", "cotonou", "togo", "lome", "malawi", "lilongwe",
    "sub-saharan", "west africa", "east africa",
];

pub const AGNOSTIC_KEYWORDS: &[&str] = &["remote", "anywhere", "global", "worldwide"];

const SENIOR_MARKERS: &[&str] = &["senior", "lead", "principal", "architect", "5+ years", "7+ years"];
const JUNIOR_MARKERS: &[&str] = &["junior", "entry", "graduate", "0-2 years", "recent graduate"];

/// Vocabulary scanned when a provider ships no structured skills. Order is
/// the output order.
pub const SKILL_VOCABULARY: &[&str] = &[
    "Python", "JavaScript", "TypeScript", "Java", "C#", "C++", "Go", "Rust", "PHP", "Ruby",
    "Kotlin", "Swift", "SQL", "React", "Angular", "Vue", "Node.js", "Django", "Flask", "Spring",
    ".NET", "PostgreSQL", "MySQL", "MongoDB", "Redis", "AWS", "Azure", "GCP", "Docker",
    "Kubernetes", "Git", "REST API", "GraphQL", "Machine Learning", "TensorFlow",
];

pub fn region_of(location: &str) -> Region {
    let location = location.to_lowercase();
    if MENA_KEYWORDS.iter().any(|k| contains_term(&location, k)) {
        Region::Mena
    } else if SSA_KEYWORDS.iter().any(|k| contains_term(&location, k)) {
        Region::SubSaharanAfrica
    } else {
        Region::Other
    }
}

/// Remote / worldwide postings where the candidate's location is irrelevant.
pub fn is_location_agnostic(location: &str) -> bool {
    let location = location.to_lowercase();
    AGNOSTIC_KEYWORDS.iter().any(|k| location.contains(k))
}

pub fn infer_experience_level(title: &str, description: &str) -> ExperienceLevel {
    let text = format!("{} {}", title, description).to_lowercase();
    if SENIOR_MARKERS.iter().any(|m| text.contains(m)) {
        ExperienceLevel::Senior
    } else if JUNIOR_MARKERS.iter().any(|m| text.contains(m)) {
        ExperienceLevel::Junior
    } else {
        ExperienceLevel::MidLevel
    }
}

pub fn extract_skills(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_term(&text, &skill.to_lowercase()))
        .take(MAX_EXTRACTED_SKILLS)
        .map(|skill| skill.to_string())
        .collect()
}

/// Last-resort apply link: a web search for the posting.
pub fn search_url(title: &str, company: &str, location: &str) -> String {
    let mut terms: Vec<&str> = [title, company, location]
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != MISSING)
        .collect();
    terms.push("jobs");
    let query = terms.join(" ");
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.google.com/search?q={}", encoded)
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling seen.
pub fn dedupe_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter_map(|s| {
            let trimmed = s.as_ref().trim();
            (!trimmed.is_empty() && seen.insert(trimmed.to_lowercase())).then(|| trimmed.to_string())
        })
        .collect()
}

fn normalize_job_type(raw: Option<&str>) -> String {
    let Some(value) = non_empty(raw) else {
        return DEFAULT_JOB_TYPE.to_string();
    };
    let key: String = value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    match key.as_str() {
        "fulltime" | "permanent" => DEFAULT_JOB_TYPE.to_string(),
        "parttime" => "Part-time".to_string(),
        "contract" | "contractor" => "Contract".to_string(),
        "intern" | "internship" => "Internship".to_string(),
        "temporary" | "temp" => "Temporary".to_string(),
        _ => value.to_string(),
    }
}

fn salary_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*([kK])?").expect("valid salary regex"))
}

fn parse_salary_text(text: &str) -> Vec<f64> {
    salary_number_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
            let multiplier = if caps.get(2).is_some() { 1000.0 } else { 1.0 };
            Some(number * multiplier)
        })
        .filter(|n| *n > 0.0)
        .take(2)
        .collect()
}

fn currency_from_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if lower.contains('€') || contains_term(&lower, "eur") {
        Some("EUR")
    } else if lower.contains('£') || contains_term(&lower, "gbp") {
        Some("GBP")
    } else if contains_term(&lower, "tnd") {
        Some("TND")
    } else if contains_term(&lower, "ngn") || lower.contains('₦') {
        Some("NGN")
    } else if lower.contains('$') || contains_term(&lower, "usd") {
        Some("USD")
    } else {
        None
    }
}

fn normalize_salary(raw: &RawJob) -> Option<SalaryRange> {
    let valid = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0);
    let text = non_empty(raw.salary_text.as_deref()).map(str::to_string);

    let (mut min, mut max) = (valid(raw.salary_min), valid(raw.salary_max));
    if min.is_none() && max.is_none() {
        if let Some(text) = &text {
            let numbers = parse_salary_text(text);
            min = numbers.first().copied();
            max = numbers.get(1).copied();
        }
    }

    let (min, max) = match (min, max) {
        (Some(a), Some(b)) if a > b => (b, a),
        (Some(a), Some(b)) => (a, b),
        (Some(a), None) | (None, Some(a)) => (a, a),
        (None, None) => return None,
    };

    let currency = non_empty(raw.salary_currency.as_deref())
        .map(str::to_uppercase)
        .or_else(|| text.as_deref().and_then(currency_from_text).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Some(SalaryRange {
        min,
        max,
        currency,
        text,
    })
}

fn synthesize_id(source: &str, title: &str, company: &str, location: &str) -> String {
    let prefix = match slugify(source) {
        s if s.is_empty() => "job".to_string(),
        s => s,
    };
    let slug: String = slugify(&format!("{} {} {}", title, company, location))
        .chars()
        .take(80)
        .collect();
    format!("{}_{}", prefix, slug)
}

/// Builds the canonical record. Never fails: each malformed field falls back
/// to its own default. Feeding the output back in (via `RawJob::from`) yields
/// the same posting.
pub fn normalize(raw: RawJob) -> JobPosting {
    let title = non_empty(raw.title.as_deref()).unwrap_or(MISSING).to_string();
    let company = non_empty(raw.company.as_deref()).unwrap_or(MISSING).to_string();
    let location = non_empty(raw.location.as_deref()).unwrap_or(MISSING).to_string();
    let description = non_empty(raw.description.as_deref()).unwrap_or("").to_string();
    let source = non_empty(raw.source.as_deref()).unwrap_or("Unknown").to_string();

    let id = non_empty(raw.id.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| synthesize_id(&source, &title, &company, &location));

    let mut required_skills = dedupe_skills(&raw.required_skills);
    if required_skills.is_empty() {
        required_skills = extract_skills(&description);
    }
    let preferred_skills = dedupe_skills(&raw.preferred_skills);

    let (url, url_is_synthetic) = match non_empty(raw.url.as_deref()) {
        Some(url) => (url.to_string(), raw.url_is_synthetic),
        None => (search_url(&title, &company, &location), true),
    };

    let remote = raw
        .remote
        .unwrap_or_else(|| location.to_lowercase().contains("remote"));

    JobPosting {
        region: region_of(&location),
        experience_level: infer_experience_level(&title, &description),
        job_type: normalize_job_type(raw.job_type.as_deref()),
        salary_range: normalize_salary(&raw),
        posted_date: raw.posted_date.as_deref().and_then(to_iso_date),
        fetched_at: raw.fetched_at.unwrap_or_else(now),
        id,
        title,
        company,
        location,
        description,
        required_skills,
        preferred_skills,
        remote,
        url,
        url_is_synthetic,
        source,
    }
}

pub fn normalize_all(raws: Vec<RawJob>) -> Vec<JobPosting> {
    raws.into_iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, location: &str, description: &str) -> RawJob {
        RawJob {
            title: Some(title.to_string()),
            company: Some("Acme".to_string()),
            location: Some(location.to_string()),
            description: Some(description.to_string()),
            source: Some("JSearch".to_string()),
            ..RawJob::default()
        }
    }

    #[test]
    fn regions_resolve_from_free_text() {
        assert_eq!(region_of("Tunis, Tunisia"), Region::Mena);
        assert_eq!(region_of("Lagos, Nigeria"), Region::SubSaharanAfrica);
        assert_eq!(region_of("Berlin, Germany"), Region::Other);
        assert_eq!(region_of("Dubai - UAE"), Region::Mena);
        assert_eq!(region_of("Cape Town"), Region::SubSaharanAfrica);
        assert_eq!(region_of("Bucharest, Romania"), Region::Other);
        assert_eq!(region_of("Remote"), Region::Other);
    }

    #[test]
    fn mena_wins_over_ssa() {
        assert_eq!(region_of("Cairo or Nairobi"), Region::Mena);
    }

    #[test]
    fn remote_locations_are_agnostic_but_other() {
        assert!(is_location_agnostic("Remote - Worldwide"));
        assert!(is_location_agnostic("Anywhere"));
        assert!(!is_location_agnostic("Tunis"));
        assert_eq!(region_of("Worldwide"), Region::Other);
        assert_eq!(region_of("Remote (Nigeria)"), Region::SubSaharanAfrica);
    }

    #[test]
    fn experience_rules_apply_in_order() {
        assert_eq!(
            infer_experience_level("Lead Engineer", "junior devs welcome"),
            ExperienceLevel::Senior
        );
        assert_eq!(
            infer_experience_level("Backend Engineer", "Requires 5+ years of Go"),
            ExperienceLevel::Senior
        );
        assert_eq!(
            infer_experience_level("Graduate Developer", ""),
            ExperienceLevel::Junior
        );
        assert_eq!(
            infer_experience_level("Backend Engineer", "0-2 years"),
            ExperienceLevel::Junior
        );
        assert_eq!(
            infer_experience_level("Backend Engineer", "Build APIs"),
            ExperienceLevel::MidLevel
        );
    }

    #[test]
    fn skills_come_out_in_vocabulary_order_and_capped() {
        let skills = extract_skills("We use docker, PYTHON and react with a REST API. JavaScript too.");
        assert_eq!(skills, vec!["Python", "JavaScript", "React", "Docker", "REST API"]);

        let everything = SKILL_VOCABULARY.join(" ");
        assert_eq!(extract_skills(&everything).len(), MAX_EXTRACTED_SKILLS);
    }

    #[test]
    fn java_is_not_found_inside_javascript() {
        assert_eq!(extract_skills("Modern JavaScript stack"), vec!["JavaScript"]);
    }

    // Term boundaries cut both ways: demonyms and dotted compounds don't match.
    #[test]
    fn demonyms_do_not_resolve_a_region() {
        assert_eq!(region_of("Egyptian engineer"), Region::Other);
        assert_eq!(region_of("Nigerian company"), Region::Other);
        assert_eq!(region_of("Egyptian company, Cairo"), Region::Mena);
    }

    #[test]
    fn dotnet_is_not_found_inside_asp_net() {
        assert!(extract_skills("ASP.NET Core services").is_empty());
        assert_eq!(extract_skills("C# and .NET 8"), vec!["C#", ".NET"]);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let job = normalize(RawJob::default());
        assert_eq!(job.title, "N/A");
        assert_eq!(job.company, "N/A");
        assert_eq!(job.location, "N/A");
        assert_eq!(job.job_type, "Full-time");
        assert_eq!(job.experience_level, ExperienceLevel::MidLevel);
        assert_eq!(job.region, Region::Other);
        assert_eq!(job.source, "Unknown");
        assert!(!job.url.is_empty());
        assert!(job.url_is_synthetic);
        assert!(job.id.starts_with("unknown_"));
    }

    #[test]
    fn missing_url_becomes_search_link() {
        let job = normalize(raw("Data Engineer", "Tunis, Tunisia", ""));
        assert!(job.url.starts_with("https://www.google.com/search?q="));
        assert!(job.url.contains("Data+Engineer"));
        assert!(job.url_is_synthetic);
    }

    #[test]
    fn provided_url_is_kept() {
        let mut input = raw("Data Engineer", "Tunis", "");
        input.url = Some(" https://jobs.example.com/1 ".to_string());
        let job = normalize(input);
        assert_eq!(job.url, "https://jobs.example.com/1");
        assert!(!job.url_is_synthetic);
    }

    #[test]
    fn structured_skills_are_deduped_case_insensitively() {
        let mut input = raw("Dev", "Tunis", "python and docker");
        input.required_skills = vec!["Python".into(), "python ".into(), "  ".into(), "Docker".into()];
        let job = normalize(input);
        assert_eq!(job.required_skills, vec!["Python", "Docker"]);
    }

    #[test]
    fn skills_fall_back_to_description() {
        let job = normalize(raw("Dev", "Tunis", "Kubernetes and AWS experience"));
        assert_eq!(job.required_skills, vec!["AWS", "Kubernetes"]);
    }

    #[test]
    fn salary_text_is_parsed() {
        let mut input = raw("Dev", "Tunis", "");
        input.salary_text = Some("$50k - $70k per year".into());
        let salary = normalize(input).salary_range.expect("salary parsed");
        assert_eq!(salary.min, 50_000.0);
        assert_eq!(salary.max, 70_000.0);
        assert_eq!(salary.currency, "USD");
    }

    #[test]
    fn salary_bounds_fill_in_and_swap() {
        let mut input = raw("Dev", "Tunis", "");
        input.salary_min = Some(90_000.0);
        input.salary_max = Some(60_000.0);
        input.salary_currency = Some("eur".into());
        let salary = normalize(input).salary_range.expect("salary");
        assert_eq!((salary.min, salary.max), (60_000.0, 90_000.0));
        assert_eq!(salary.currency, "EUR");

        let mut only_max = raw("Dev", "Tunis", "");
        only_max.salary_max = Some(40_000.0);
        only_max.salary_min = Some(f64::NAN);
        let salary = normalize(only_max).salary_range.expect("salary");
        assert_eq!((salary.min, salary.max), (40_000.0, 40_000.0));
    }

    #[test]
    fn job_types_are_canonicalized() {
        let mut input = raw("Dev", "Tunis", "");
        input.job_type = Some("FULLTIME".into());
        assert_eq!(normalize(input.clone()).job_type, "Full-time");
        input.job_type = Some("part_time".into());
        assert_eq!(normalize(input.clone()).job_type, "Part-time");
        input.job_type = Some("Freelance".into());
        assert_eq!(normalize(input).job_type, "Freelance");
    }

    #[test]
    fn remote_is_inferred_from_location_when_unknown() {
        assert!(normalize(raw("Dev", "Remote", "")).remote);
        let mut onsite = raw("Dev", "Remote-friendly office", "");
        onsite.remote = Some(false);
        assert!(!normalize(onsite).remote);
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut input = raw("Senior Backend Engineer", "Lagos, Nigeria", "Go, Docker and AWS");
        input.salary_text = Some("45,000-60,000 EUR".into());
        input.posted_date = Some("2024-03-02T09:00:00Z".into());
        input.job_type = Some("CONTRACTOR".into());
        let samples = vec![input, RawJob::default(), raw("", "", "")];

        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(RawJob::from(once.clone()));
            assert_eq!(once, twice);
        }
    }
}
