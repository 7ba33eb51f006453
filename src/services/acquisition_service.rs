use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::models::job::RawJob;
use crate::services::job_sources::JobSource;
use crate::utils::time::now;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const FALLBACK_SOURCE: &str = "Fallback";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    location: String,
    limit: usize,
}

impl CacheKey {
    fn new(query: &str, location: &str, limit: usize) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            location: location.trim().to_lowercase(),
            limit,
        }
    }
}

struct CacheEntry {
    stored_at: Instant,
    provider: &'static str,
    jobs: Vec<RawJob>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AcquisitionStats {
    pub last_provider: Option<String>,
    pub cache_size: usize,
    pub provider_count: usize,
    pub requests: u64,
    pub cache_hits: u64,
    pub fallback_responses: u64,
}

#[derive(Debug, Clone)]
pub struct Acquired {
    pub provider: String,
    pub from_cache: bool,
    pub jobs: Vec<RawJob>,
}

/// Tries providers one at a time in priority order. Never fans out: a single
/// logical query must not burn several providers' quotas at once.
pub struct AcquisitionController {
    sources: Vec<Arc<dyn JobSource>>,
    cache: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    stats: AcquisitionStats,
}

impl AcquisitionController {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, ttl: Duration) -> Self {
        let stats = AcquisitionStats {
            provider_count: sources.len(),
            ..AcquisitionStats::default()
        };
        Self {
            sources,
            cache: HashMap::new(),
            ttl,
            stats,
        }
    }

    pub fn stats(&self) -> AcquisitionStats {
        let live = self
            .cache
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count();
        AcquisitionStats {
            cache_size: live,
            ..self.stats.clone()
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn last_provider(&self) -> Option<&str> {
        self.stats.last_provider.as_deref()
    }

    pub async fn acquire(&mut self, query: &str, location: &str, limit: usize) -> Vec<RawJob> {
        self.acquire_detailed(query, location, limit).await.jobs
    }

    pub async fn acquire_detailed(&mut self, query: &str, location: &str, limit: usize) -> Acquired {
        self.stats.requests += 1;
        self.evict_expired();
        let key = CacheKey::new(query, location, limit);

        if let Some(hit) = self.cached(&key) {
            self.stats.cache_hits += 1;
            info!(query, location, provider = %hit.provider, "Serving jobs from cache");
            return hit;
        }

        let mut any_responded = false;
        for source in &self.sources {
            let provider = source.name();
            match source.search(query, location, limit).await {
                Ok(jobs) if !jobs.is_empty() => {
                    info!(provider, count = jobs.len(), query, location, "Provider served jobs");
                    self.cache.insert(
                        key,
                        CacheEntry {
                            stored_at: Instant::now(),
                            provider,
                            jobs: jobs.clone(),
                        },
                    );
                    self.stats.last_provider = Some(provider.to_string());
                    return Acquired {
                        provider: provider.to_string(),
                        from_cache: false,
                        jobs,
                    };
                }
                Ok(_) => {
                    any_responded = true;
                    info!(provider, query, location, "Provider returned no jobs, trying next");
                }
                Err(err) if err.is_rate_limited() => {
                    warn!(provider, "Provider rate limited, failing over");
                }
                Err(err) => {
                    warn!(provider, error = %err, "Provider failed, failing over");
                }
            }
        }

        if any_responded {
            info!(query, location, "No provider has jobs for this query");
            return Acquired {
                provider: String::new(),
                from_cache: false,
                jobs: Vec::new(),
            };
        }

        warn!(
            query,
            location,
            providers = self.sources.len(),
            "All job providers failed, serving placeholder listings"
        );
        self.stats.fallback_responses += 1;
        self.stats.last_provider = Some(FALLBACK_SOURCE.to_string());
        Acquired {
            provider: FALLBACK_SOURCE.to_string(),
            from_cache: false,
            jobs: placeholder_jobs(query, location, limit),
        }
    }

    fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.cache.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    fn cached(&mut self, key: &CacheKey) -> Option<Acquired> {
        let fresh = self
            .cache
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;

        if !fresh {
            self.cache.remove(key);
            return None;
        }

        self.cache.get(key).map(|entry| Acquired {
            provider: entry.provider.to_string(),
            from_cache: true,
            jobs: entry.jobs.clone(),
        })
    }
}

/// Clearly labelled stand-ins returned when every provider is down.
pub fn placeholder_jobs(query: &str, location: &str, limit: usize) -> Vec<RawJob> {
    let query = match query.trim() {
        "" => "Software Engineer",
        q => q,
    };
    let location = match location.trim() {
        "" => "Remote",
        l => l,
    };
    let fetched_at = now();

    [
        ("", "Mid-level position"),
        ("Junior ", "Entry level position for recent graduate profiles"),
        ("Senior ", "Senior position, 5+ years of experience"),
    ]
    .into_iter()
    .take(limit)
    .enumerate()
    .map(|(idx, (prefix, blurb))| RawJob {
        id: Some(format!("fallback_{}", idx + 1)),
        title: Some(format!("{}{}", prefix, query)),
        company: Some("Sample listing".to_string()),
        location: Some(location.to_string()),
        description: Some(format!(
            "{}. Placeholder listing shown while live job providers are unavailable.",
            blurb
        )),
        source: Some(FALLBACK_SOURCE.to_string()),
        fetched_at: Some(fetched_at),
        ..RawJob::default()
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::job_sources::{MockJobSource, SourceError};

    fn job(id: &str) -> RawJob {
        RawJob {
            id: Some(id.to_string()),
            title: Some("Engineer".to_string()),
            ..RawJob::default()
        }
    }

    fn failing(name: &'static str) -> MockJobSource {
        let mut mock = MockJobSource::new();
        mock.expect_name().return_const(name);
        mock.expect_search().times(1).returning(move |_, _, _| {
            Err(SourceError::Decode {
                provider: name,
                message: "boom".into(),
            })
        });
        mock
    }

    fn serving(name: &'static str, ids: &'static [&'static str]) -> MockJobSource {
        let mut mock = MockJobSource::new();
        mock.expect_name().return_const(name);
        mock.expect_search()
            .returning(move |_, _, _| Ok(ids.iter().map(|id| job(id)).collect()));
        mock
    }

    fn controller(sources: Vec<MockJobSource>) -> AcquisitionController {
        let sources = sources
            .into_iter()
            .map(|s| Arc::new(s) as Arc<dyn JobSource>)
            .collect();
        AcquisitionController::new(sources, DEFAULT_CACHE_TTL)
    }

    #[tokio::test]
    async fn falls_through_to_first_working_provider() {
        let mut ctl = controller(vec![
            failing("first"),
            failing("second"),
            serving("third", &["a", "b"]),
        ]);

        let jobs = ctl.acquire("rust", "Tunis", 10).await;

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id.as_deref(), Some("a"));
        assert_eq!(ctl.last_provider(), Some("third"));
    }

    #[tokio::test]
    async fn rate_limited_provider_is_skipped_without_retry() {
        let mut limited = MockJobSource::new();
        limited.expect_name().return_const("limited");
        limited
            .expect_search()
            .times(1)
            .returning(|_, _, _| Err(SourceError::RateLimited { provider: "limited" }));

        let mut ctl = controller(vec![limited, serving("backup", &["x"])]);
        let acquired = ctl.acquire_detailed("go", "", 5).await;

        assert_eq!(acquired.provider, "backup");
        assert_eq!(acquired.jobs.len(), 1);
    }

    #[tokio::test]
    async fn later_providers_are_not_called_after_success() {
        let mut unused = MockJobSource::new();
        unused.expect_name().return_const("unused");
        unused.expect_search().times(0);

        let mut ctl = controller(vec![serving("primary", &["p"]), unused]);
        let jobs = ctl.acquire("go", "", 5).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(ctl.last_provider(), Some("primary"));
    }

    #[tokio::test]
    async fn cache_hit_skips_providers() {
        let mut once = MockJobSource::new();
        once.expect_name().return_const("once");
        once.expect_search()
            .times(1)
            .returning(|_, _, _| Ok(vec![job("cached")]));

        let mut ctl = controller(vec![once]);
        let first = ctl.acquire_detailed("Python", "Tunis", 10).await;
        let second = ctl.acquire_detailed("python ", "tunis", 10).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.jobs, first.jobs);

        let stats = ctl.stats();
        assert_eq!(stats.cache_size, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.provider_count, 1);
    }

    #[tokio::test]
    async fn cache_key_includes_limit() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("src");
        source
            .expect_search()
            .times(2)
            .returning(|_, _, _| Ok(vec![job("j")]));

        let mut ctl = controller(vec![source]);
        ctl.acquire("python", "tunis", 10).await;
        ctl.acquire("python", "tunis", 20).await;

        assert_eq!(ctl.stats().cache_size, 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("src");
        source
            .expect_search()
            .times(2)
            .returning(|_, _, _| Ok(vec![job("j")]));

        let sources: Vec<Arc<dyn JobSource>> = vec![Arc::new(source)];
        let mut ctl = AcquisitionController::new(sources, Duration::ZERO);
        ctl.acquire("python", "tunis", 10).await;
        let again = ctl.acquire_detailed("python", "tunis", 10).await;

        assert!(!again.from_cache);
    }

    #[tokio::test]
    async fn total_outage_serves_placeholders_uncached() {
        let mut ctl = controller(vec![failing("a"), failing("b")]);

        let jobs = ctl.acquire("Data Analyst", "Lagos", 10).await;

        assert!(!jobs.is_empty());
        assert!(jobs
            .iter()
            .all(|j| j.source.as_deref() == Some(FALLBACK_SOURCE)));
        assert_eq!(ctl.last_provider(), Some(FALLBACK_SOURCE));
        assert_eq!(ctl.stats().cache_size, 0);
        assert_eq!(ctl.stats().fallback_responses, 1);
    }

    #[tokio::test]
    async fn no_providers_configured_serves_placeholders() {
        let mut ctl = AcquisitionController::new(Vec::new(), DEFAULT_CACHE_TTL);
        let jobs = ctl.acquire("", "", 10).await;
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].title.as_deref(), Some("Software Engineer"));
    }

    #[tokio::test]
    async fn expired_entries_leave_the_cache() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("src");
        source
            .expect_search()
            .returning(|_, _, _| Ok(vec![job("j")]));

        let sources: Vec<Arc<dyn JobSource>> = vec![Arc::new(source)];
        let mut ctl = AcquisitionController::new(sources, Duration::ZERO);
        for i in 0..50 {
            ctl.acquire(&format!("query {}", i), "Tunis", 10).await;
        }

        assert_eq!(ctl.stats().cache_size, 0);
        assert!(ctl.cache.len() <= 1);
    }

    #[tokio::test]
    async fn fresh_entries_survive_eviction() {
        let mut ctl = controller(vec![serving("src", &["a"])]);
        ctl.acquire("python", "Tunis", 10).await;
        ctl.acquire("java", "Tunis", 10).await;

        assert_eq!(ctl.stats().cache_size, 2);
        assert!(ctl.acquire_detailed("python", "tunis", 10).await.from_cache);
    }

    #[tokio::test]
    async fn placeholders_respect_limit() {
        let mut ctl = controller(vec![failing("down")]);
        let jobs = ctl.acquire("rust", "", 1).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id.as_deref(), Some("fallback_1"));
        assert!(placeholder_jobs("rust", "", 0).is_empty());
    }

    #[tokio::test]
    async fn genuine_empty_result_is_not_masked() {
        let mut empty = MockJobSource::new();
        empty.expect_name().return_const("empty");
        empty.expect_search().returning(|_, _, _| Ok(Vec::new()));

        let mut ctl = controller(vec![failing("down"), empty]);
        let jobs = ctl.acquire("cobol", "Kigali", 10).await;

        assert!(jobs.is_empty());
        assert_eq!(ctl.stats().fallback_responses, 0);
    }
}
