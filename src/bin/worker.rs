use hemolab::agents::DoctorPipeline;
use hemolab::config::Config;
use hemolab::queue::{JobQueue, Worker};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hemolab=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.worker);

    // Connect to database
    let pool = hemolab::db::create_pool(&config.database).await?;

    // Migrations are idempotent; running them here too lets the worker
    // start before the API server on a fresh database.
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    // Connect to the job queue broker
    let queue = JobQueue::connect(&config.redis).await?;

    let pipeline = Arc::new(DoctorPipeline::new(&config.llm)?);
    let worker = Worker::new(pool, queue, pipeline, &config.worker);

    worker.run().await?;

    Ok(())
}
