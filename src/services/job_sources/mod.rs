pub mod adzuna;
pub mod jooble;
pub mod jsearch;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::models::job::RawJob;
use crate::services::normalizer::search_url;

pub(crate) use crate::utils::serde_flex::{
    deserialize_bool_flexible, deserialize_f64_flexible, deserialize_id_flexible,
    deserialize_string_flexible, deserialize_strings_flexible,
};

pub use adzuna::AdzunaSource;
pub use jooble::JoobleSource;
pub use jsearch::JSearchSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{provider} rate limited the request")]
    RateLimited { provider: &'static str },

    #[error("{provider} returned status {status}")]
    Status {
        provider: &'static str,
        status: StatusCode,
    },

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl SourceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited { .. })
    }
}

/// One upstream job-search provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<RawJob>, SourceError>;
}

/// Turns a provider response into its JSON body, separating 429s from other
/// failures so the controller can fail over immediately.
pub(crate) async fn read_json<T>(provider: &'static str, response: Response) -> Result<T, SourceError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited { provider });
    }
    if !status.is_success() {
        return Err(SourceError::Status { provider, status });
    }

    let body = response
        .text()
        .await
        .map_err(|source| SourceError::Http { provider, source })?;
    serde_json::from_str(&body).map_err(|e| SourceError::Decode {
        provider,
        message: e.to_string(),
    })
}

/// Walks the apply-link priority chain. Falls back to a web search for the
/// posting; the flag reports whether that happened.
pub(crate) fn pick_apply_url<'a, I>(
    candidates: I,
    title: &str,
    company: &str,
    location: &str,
) -> (String, bool)
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(|url| (url.to_string(), false))
        .unwrap_or_else(|| (search_url(title, company, location), true))
}

pub(crate) fn prefixed_id(prefix: &str, native: Option<String>) -> Option<String> {
    native.map(|id| format!("{}_{}", prefix, id))
}
