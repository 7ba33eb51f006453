pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    acquisition_service::AcquisitionController,
    job_sources::{AdzunaSource, JSearchSource, JobSource, JoobleSource},
    job_store_service::JobStoreService,
};
use sqlx::PgPool;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub job_store: JobStoreService,
    pub acquisition: Arc<Mutex<AcquisitionController>>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let sources = configured_sources(config)?;
        tracing::info!(
            providers = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "Job providers configured"
        );
        Ok(Self::with_sources(pool, sources, config.cache_ttl()))
    }

    pub fn with_sources(pool: PgPool, sources: Vec<Arc<dyn JobSource>>, cache_ttl: Duration) -> Self {
        Self {
            job_store: JobStoreService::new(pool),
            acquisition: Arc::new(Mutex::new(AcquisitionController::new(sources, cache_ttl))),
        }
    }
}

/// Providers in priority order. A provider without credentials is skipped.
pub fn configured_sources(config: &Config) -> Result<Vec<Arc<dyn JobSource>>> {
    let timeout = config.provider_timeout();
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();

    if let Some(key) = &config.jsearch_api_key {
        sources.push(Arc::new(JSearchSource::new(key.clone(), timeout)?));
    }
    if let (Some(app_id), Some(app_key)) = (&config.adzuna_app_id, &config.adzuna_app_key) {
        sources.push(Arc::new(AdzunaSource::new(
            app_id.clone(),
            app_key.clone(),
            config.adzuna_country.clone(),
            timeout,
        )?));
    }
    if let Some(key) = &config.jooble_api_key {
        sources.push(Arc::new(JoobleSource::new(key.clone(), timeout)?));
    }

    Ok(sources)
}
