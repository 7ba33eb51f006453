use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    deserialize_id_flexible, deserialize_string_flexible, pick_apply_url, prefixed_id, read_json,
    JobSource, SourceError,
};
use crate::error::Result;
use crate::models::job::RawJob;

const PROVIDER: &str = "Jooble";
const BASE_URL: &str = "https://jooble.org/api";

#[derive(Debug, Serialize)]
struct JoobleRequest<'a> {
    keywords: &'a str,
    location: &'a str,
    page: &'a str,
    #[serde(rename = "ResultOnPage")]
    result_on_page: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JoobleResponse {
    jobs: Vec<JoobleJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JoobleJob {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    id: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    title: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    company: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    location: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    snippet: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    salary: Option<String>,
    #[serde(rename = "type", deserialize_with = "deserialize_string_flexible")]
    job_type: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    link: Option<String>,
    #[serde(deserialize_with = "deserialize_string_flexible")]
    updated: Option<String>,
}

fn strip_markup(snippet: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
    tags.replace_all(snippet, "")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

impl JoobleJob {
    fn into_raw(self) -> RawJob {
        let (url, url_is_synthetic) = pick_apply_url(
            [self.link.as_deref()],
            self.title.as_deref().unwrap_or_default(),
            self.company.as_deref().unwrap_or_default(),
            self.location.as_deref().unwrap_or_default(),
        );
        let remote = self
            .location
            .as_deref()
            .map(|l| l.to_lowercase().contains("remote"));

        RawJob {
            id: prefixed_id("jooble", self.id),
            title: self.title,
            company: self.company,
            location: self.location,
            job_type: self.job_type,
            description: self.snippet.as_deref().map(strip_markup),
            salary_text: self.salary,
            remote,
            posted_date: self.updated,
            url: Some(url),
            url_is_synthetic,
            source: Some(PROVIDER.to_string()),
            ..RawJob::default()
        }
    }
}

/// The API key is part of the request path; searches are POSTed as JSON.
#[derive(Clone)]
pub struct JoobleSource {
    client: Client,
    api_key: String,
}

impl JoobleSource {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }

    fn parse(body: JoobleResponse, limit: usize) -> Vec<RawJob> {
        body.jobs
            .into_iter()
            .take(limit)
            .map(JoobleJob::into_raw)
            .collect()
    }
}

#[async_trait]
impl JobSource for JoobleSource {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RawJob>, SourceError> {
        let url = format!("{}/{}", BASE_URL, self.api_key);
        let request = JoobleRequest {
            keywords: query,
            location,
            page: "1",
            result_on_page: limit.max(1),
        };

        tracing::debug!(query, location, "Querying Jooble");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                provider: PROVIDER,
                source,
            })?;

        let body: JoobleResponse = read_json(PROVIDER, response).await?;
        Ok(Self::parse(body, limit))
    }
}
