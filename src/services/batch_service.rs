use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::Result;
use crate::models::job::JobPosting;
use crate::services::acquisition_service::{AcquisitionController, FALLBACK_SOURCE};
use crate::services::job_store_service::JobStoreService;
use crate::services::normalizer::normalize_all;

pub const DEFAULT_BATCH_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub combinations: usize,
    pub collected: usize,
    pub stored: u64,
}

/// Periodic sweep over a fixed set of query/location pairs. Combinations run
/// one after another with a pause in between to stay under provider quotas.
#[derive(Clone)]
pub struct BatchService {
    controller: Arc<Mutex<AcquisitionController>>,
    queries: Vec<String>,
    locations: Vec<String>,
    delay: Duration,
    limit: usize,
}

impl BatchService {
    pub fn new(
        controller: Arc<Mutex<AcquisitionController>>,
        queries: Vec<String>,
        locations: Vec<String>,
        delay: Duration,
    ) -> Self {
        Self {
            controller,
            queries,
            locations,
            delay,
            limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn combinations(&self) -> Vec<(&str, &str)> {
        self.locations
            .iter()
            .flat_map(|location| {
                self.queries
                    .iter()
                    .map(move |query| (query.as_str(), location.as_str()))
            })
            .collect()
    }

    /// Placeholder listings are never collected.
    pub async fn collect(&self) -> Vec<JobPosting> {
        let combinations = self.combinations();
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();

        for (idx, (query, location)) in combinations.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let acquired = self
                .controller
                .lock()
                .await
                .acquire_detailed(query, location, self.limit)
                .await;
            if acquired.provider == FALLBACK_SOURCE {
                continue;
            }

            for job in normalize_all(acquired.jobs) {
                if seen.insert(job.id.clone()) {
                    jobs.push(job);
                }
            }
        }

        jobs
    }

    pub async fn run(&self, store: &JobStoreService) -> Result<BatchReport> {
        let run_id = Uuid::new_v4();
        let combinations = self.combinations().len();
        info!(%run_id, combinations, "Starting job collection batch");

        let jobs = self.collect().await;
        let stored = if jobs.is_empty() {
            0
        } else {
            store.upsert_jobs(&jobs).await.map_err(|e| {
                error!(%run_id, error = %e, "Failed to store collected jobs");
                e
            })?
        };

        info!(%run_id, collected = jobs.len(), stored, "Job collection batch finished");
        Ok(BatchReport {
            run_id,
            combinations,
            collected: jobs.len(),
            stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::RawJob;
    use crate::services::acquisition_service::DEFAULT_CACHE_TTL;
    use crate::services::job_sources::{JobSource, MockJobSource, SourceError};

    fn service(source: MockJobSource, queries: &[&str], locations: &[&str]) -> BatchService {
        let sources: Vec<Arc<dyn JobSource>> = vec![Arc::new(source)];
        let controller = AcquisitionController::new(sources, DEFAULT_CACHE_TTL);
        BatchService::new(
            Arc::new(Mutex::new(controller)),
            queries.iter().map(|s| s.to_string()).collect(),
            locations.iter().map(|s| s.to_string()).collect(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn collect_visits_every_combination_and_dedupes() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("src");
        source.expect_search().times(4).returning(|query, location, _| {
            Ok(vec![
                RawJob {
                    id: Some("shared".into()),
                    title: Some("Shared".into()),
                    ..RawJob::default()
                },
                RawJob {
                    id: Some(format!("{}_{}", query, location)),
                    title: Some(query.to_string()),
                    location: Some(location.to_string()),
                    ..RawJob::default()
                },
            ])
        });

        let batch = service(source, &["python", "java"], &["Cairo", "Lagos"]);
        let jobs = batch.collect().await;

        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["shared", "python_Cairo", "java_Cairo", "python_Lagos", "java_Lagos"]
        );
    }

    #[tokio::test]
    async fn outage_collects_nothing() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("down");
        source.expect_search().returning(|_, _, _| {
            Err(SourceError::RateLimited { provider: "down" })
        });

        let batch = service(source, &["python"], &["Tunis"]);
        assert!(batch.collect().await.is_empty());
    }

    #[tokio::test]
    async fn no_combinations_without_locations() {
        let mut source = MockJobSource::new();
        source.expect_name().return_const("src");
        source.expect_search().times(0);

        let batch = service(source, &["python"], &[]);
        assert!(batch.collect().await.is_empty());
    }
}
