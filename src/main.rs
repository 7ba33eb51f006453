use std::net::SocketAddr;

use anyhow::anyhow;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use utopiahire_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes,
    services::batch_service::BatchService,
    AppState,
};

async fn schedule_batch(state: &AppState, schedule: &str) -> anyhow::Result<JobScheduler> {
    let config = get_config();
    let batch = BatchService::new(
        state.acquisition.clone(),
        config.batch_queries.clone(),
        config.batch_locations.clone(),
        config.batch_delay(),
    );
    let store = state.job_store.clone();

    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow!("Failed to create scheduler: {:?}", e))?;

    let job = Job::new_async(schedule, move |_id, _lock| {
        let batch = batch.clone();
        let store = store.clone();
        Box::pin(async move {
            if let Err(e) = batch.run(&store).await {
                error!(error = %e, "Scheduled job collection failed");
            }
        })
    })
    .map_err(|e| anyhow!("Invalid BATCH_SCHEDULE {:?}: {:?}", schedule, e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| anyhow!("Failed to add batch job: {:?}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow!("Failed to start scheduler: {:?}", e))?;

    info!(schedule, "Job collection batch scheduled");
    Ok(scheduler)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool)?;

    let _scheduler = match config.batch_schedule.as_deref() {
        Some(schedule) => Some(schedule_batch(&app_state, schedule).await?),
        None => None,
    };

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
