use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};

use crate::error::Result;
use crate::models::job::{JobPosting, RawJob, Region};
use crate::services::normalizer::normalize;

/// A stored `jobs` row. Skill and salary columns are JSON and may hold
/// whatever an older writer put there, so they are decoded leniently.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub required_skills: Option<Value>,
    pub preferred_skills: Option<Value>,
    pub salary: Option<Value>,
    pub remote: bool,
    pub posted_date: Option<String>,
    pub url: String,
    pub url_is_synthetic: bool,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

fn decode_skills(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(inner @ Value::Array(_)) => decode_skills(Some(inner)),
            _ => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        },
        _ => Vec::new(),
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

struct StoredSalary {
    min: Option<f64>,
    max: Option<f64>,
    currency: Option<String>,
    text: Option<String>,
}

fn decode_salary(value: Option<Value>) -> Option<StoredSalary> {
    match value? {
        Value::Object(map) => Some(StoredSalary {
            min: number(map.get("min")),
            max: number(map.get("max")),
            currency: text(map.get("currency")),
            text: text(map.get("text")),
        }),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(inner @ Value::Object(_)) => decode_salary(Some(inner)),
            _ => Some(StoredSalary {
                min: None,
                max: None,
                currency: None,
                text: Some(raw),
            }),
        },
        _ => None,
    }
}

impl From<JobRow> for RawJob {
    fn from(row: JobRow) -> Self {
        let salary = decode_salary(row.salary);
        RawJob {
            id: Some(row.id),
            title: Some(row.title),
            company: Some(row.company),
            location: Some(row.location),
            job_type: Some(row.job_type),
            description: Some(row.description),
            required_skills: decode_skills(row.required_skills),
            preferred_skills: decode_skills(row.preferred_skills),
            salary_min: salary.as_ref().and_then(|s| s.min),
            salary_max: salary.as_ref().and_then(|s| s.max),
            salary_currency: salary.as_ref().and_then(|s| s.currency.clone()),
            salary_text: salary.and_then(|s| s.text),
            remote: Some(row.remote),
            posted_date: row.posted_date,
            url: Some(row.url),
            url_is_synthetic: row.url_is_synthetic,
            source: Some(row.source),
            fetched_at: Some(row.fetched_at),
        }
    }
}

#[derive(Clone)]
pub struct JobStoreService {
    pool: PgPool,
}

impl JobStoreService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts new postings and refreshes existing ones with the same id.
    pub async fn upsert_jobs(&self, jobs: &[JobPosting]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for job in jobs {
            let result = sqlx::query(
                r#"
                INSERT INTO jobs (
                    id, title, company, location, region, job_type, experience_level,
                    description, required_skills, preferred_skills, salary, remote,
                    posted_date, url, url_is_synthetic, source, fetched_at
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7,
                    $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17
                )
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    company = EXCLUDED.company,
                    location = EXCLUDED.location,
                    region = EXCLUDED.region,
                    job_type = EXCLUDED.job_type,
                    experience_level = EXCLUDED.experience_level,
                    description = EXCLUDED.description,
                    required_skills = EXCLUDED.required_skills,
                    preferred_skills = EXCLUDED.preferred_skills,
                    salary = EXCLUDED.salary,
                    remote = EXCLUDED.remote,
                    posted_date = EXCLUDED.posted_date,
                    url = EXCLUDED.url,
                    url_is_synthetic = EXCLUDED.url_is_synthetic,
                    source = EXCLUDED.source,
                    fetched_at = EXCLUDED.fetched_at,
                    updated_at = NOW()
                "#,
            )
            .bind(&job.id)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(job.region.as_str())
            .bind(&job.job_type)
            .bind(job.experience_level.as_str())
            .bind(&job.description)
            .bind(Json(&job.required_skills))
            .bind(Json(&job.preferred_skills))
            .bind(job.salary_range.as_ref().map(Json))
            .bind(job.remote)
            .bind(&job.posted_date)
            .bind(&job.url)
            .bind(job.url_is_synthetic)
            .bind(&job.source)
            .bind(job.fetched_at)
            .execute(&mut *tx)
            .await?;

            affected += result.rows_affected();
        }

        tx.commit().await?;
        tracing::info!(count = jobs.len(), affected, "Upserted jobs");
        Ok(affected)
    }

    /// Most recently fetched jobs, re-normalized into the canonical shape.
    pub async fn list_jobs(&self, region: Option<Region>, limit: i64) -> Result<Vec<JobPosting>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, title, company, location, job_type, description,
                   required_skills, preferred_skills, salary, remote,
                   posted_date, url, url_is_synthetic, source, fetched_at
            FROM jobs
            WHERE ($1::text IS NULL OR region = $1)
            ORDER BY fetched_at DESC
            LIMIT $2
            "#,
        )
        .bind(region.map(|r| r.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| normalize(RawJob::from(row)))
            .collect())
    }
}
