use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{
    deserialize_bool_flexible, deserialize_f64_flexible, deserialize_id_flexible,
    deserialize_string_flexible, deserialize_strings_flexible, pick_apply_url, prefixed_id,
    read_json, JobSource, SourceError,
};
use crate::error::Result;
use crate::models::job::RawJob;

const PROVIDER: &str = "JSearch";
const BASE_URL: &str = "https://jsearch.p.rapidapi.com/search";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const RESULTS_PER_PAGE: usize = 10;
const MAX_PAGES: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchResponse {
    data: Vec<JSearchJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchApplyOption {
    #[serde(deserialize_with = "deserialize_string_flexible")]
    apply_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JSearchJob {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    job_id: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_title: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    employer_name: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_city: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_state: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_country: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_description: Option<String>,
    #[serde(deserialize_with = "deserialize_bool_flexible")]
    job_is_remote: Option<bool>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_employment_type: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_apply_link: Option<String>,
    apply_options: Option<Vec<JSearchApplyOption>>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_google_link: Option<String>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    job_min_salary: Option<f64>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    job_max_salary: Option<f64>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_salary_currency: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    job_posted_at_datetime_utc: Option<String>,
    #[serde(deserialize_with = "deserialize_strings_flexible")]
    job_required_skills: Vec<String>,
}

impl JSearchJob {
    fn location(&self) -> String {
        let parts: Vec<&str> = [&self.job_city, &self.job_state, &self.job_country]
            .into_iter()
            .filter_map(|p| p.as_deref().map(str::trim))
            .filter(|p| !p.is_empty())
            .collect();

        match (parts.is_empty(), self.job_is_remote) {
            (true, Some(true)) => "Remote".to_string(),
            _ => parts.join(", "),
        }
    }

    fn into_raw(self) -> RawJob {
        let title = self.job_title.clone().unwrap_or_default();
        let company = self.employer_name.clone().unwrap_or_default();
        let location = self.location();

        let first_option = self
            .apply_options
            .as_ref()
            .and_then(|options| options.iter().find_map(|o| o.apply_link.as_deref()));
        let (url, url_is_synthetic) = pick_apply_url(
            [
                self.job_apply_link.as_deref(),
                first_option,
                self.job_google_link.as_deref(),
            ],
            &title,
            &company,
            &location,
        );

        RawJob {
            id: prefixed_id("jsearch", self.job_id),
            title: self.job_title,
            company: self.employer_name,
            location: Some(location),
            job_type: self.job_employment_type,
            description: self.job_description,
            required_skills: self.job_required_skills,
            salary_min: self.job_min_salary,
            salary_max: self.job_max_salary,
            salary_currency: self.job_salary_currency,
            remote: self.job_is_remote,
            posted_date: self.job_posted_at_datetime_utc,
            url: Some(url),
            url_is_synthetic,
            source: Some(PROVIDER.to_string()),
            ..RawJob::default()
        }
    }
}

/// RapidAPI-hosted aggregator; authenticates with `X-RapidAPI-Key`.
#[derive(Clone)]
pub struct JSearchSource {
    client: Client,
    api_key: String,
    base_url: String,
}

impl JSearchSource {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    fn parse(body: JSearchResponse, limit: usize) -> Vec<RawJob> {
        body.data
            .into_iter()
            .take(limit)
            .map(JSearchJob::into_raw)
            .collect()
    }
}

#[async_trait]
impl JobSource for JSearchSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RawJob>, SourceError> {
        let search = if location.trim().is_empty() {
            query.to_string()
        } else {
            format!("{} in {}", query, location)
        };
        let pages = limit.div_ceil(RESULTS_PER_PAGE).clamp(1, MAX_PAGES).to_string();

        tracing::debug!(%search, pages = %pages, "Querying JSearch");
        let response = self
            .client
            .get(&self.base_url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[("query", search.as_str()), ("page", "1"), ("num_pages", pages.as_str())])
            .send()
            .await
            .map_err(|source| SourceError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body: JSearchResponse = read_json(PROVIDER, response).await?;
        Ok(Self::parse(body, limit))
    }
}
