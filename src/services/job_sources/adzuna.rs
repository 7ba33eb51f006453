use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{
    deserialize_f64_flexible, deserialize_id_flexible, deserialize_string_flexible,
    pick_apply_url, prefixed_id, read_json, JobSource, SourceError,
};
use crate::error::Result;
use crate::models::job::RawJob;

const PROVIDER: &str = "Adzuna";
const BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs";
const MAX_RESULTS_PER_PAGE: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdzunaResponse {
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DisplayName {
    #[serde(deserialize_with = "deserialize_string_flexible")]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdzunaJob {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    id: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    title: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    description: Option<String>,
    company: Option<DisplayName>,
    location: Option<DisplayName>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    redirect_url: Option<String>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    salary_min: Option<f64>,
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    salary_max: Option<f64>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    created: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    contract_time: Option<String>,
}

impl AdzunaJob {
    fn into_raw(self, currency: &str) -> RawJob {
        let company = self.company.and_then(|c| c.display_name);
        let location = self.location.and_then(|l| l.display_name);
        let (url, url_is_synthetic) = pick_apply_url(
            [self.redirect_url.as_deref()],
            self.title.as_deref().unwrap_or_default(),
            company.as_deref().unwrap_or_default(),
            location.as_deref().unwrap_or_default(),
        );
        let has_salary = self.salary_min.is_some() || self.salary_max.is_some();

        RawJob {
            id: prefixed_id("adzuna", self.id),
            title: self.title,
            company,
            location,
            job_type: self.contract_time,
            description: self.description,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: has_salary.then(|| currency.to_string()),
            posted_date: self.created,
            url: Some(url),
            url_is_synthetic,
            source: Some(PROVIDER.to_string()),
            ..RawJob::default()
        }
    }
}

/// Adzuna salaries are reported in the currency of the searched country.
fn currency_for_country(country: &str) -> &'static str {
    match country {
        "gb" => "GBP",
        "za" => "ZAR",
        "in" => "INR",
        "au" => "AUD",
        "ca" => "CAD",
        "br" => "BRL",
        "pl" => "PLN",
        "sg" => "SGD",
        "nz" => "NZD",
        "mx" => "MXN",
        "ch" => "CHF",
        "de" | "fr" | "es" | "it" | "nl" | "at" | "be" => "EUR",
        _ => "USD",
    }
}

/// Credentials travel as `app_id` / `app_key` query parameters.
#[derive(Clone)]
pub struct AdzunaSource {
    client: Client,
    app_id: String,
    app_key: String,
    country: String,
}

impl AdzunaSource {
    pub fn new(app_id: String, app_key: String, country: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            app_id,
            app_key,
            country: country.trim().to_lowercase(),
        })
    }

    fn parse(&self, body: AdzunaResponse, limit: usize) -> Vec<RawJob> {
        let currency = currency_for_country(&self.country);
        body.results
            .into_iter()
            .take(limit)
            .map(|job| job.into_raw(currency))
            .collect()
    }
}

#[async_trait]
impl JobSource for AdzunaSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RawJob>, SourceError> {
        let url = format!("{}/{}/search/1", BASE_URL, self.country);
        let per_page = limit.clamp(1, MAX_RESULTS_PER_PAGE).to_string();

        let mut params = vec![
            ("app_id", self.app_id.as_str()),
            ("app_key", self.app_key.as_str()),
            ("what", query),
            ("results_per_page", per_page.as_str()),
            ("content-type", "application/json"),
        ];
        if !location.trim().is_empty() {
            params.push(("where", location));
        }

        tracing::debug!(country = %self.country, query, location, "Querying Adzuna");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body: AdzunaResponse = read_json(PROVIDER, response).await?;
        Ok(self.parse(body, limit))
    }
}
