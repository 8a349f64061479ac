use crate::config::Config;
use crate::queue::JobQueue;
use crate::types::JobStatus;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub queue: JobQueue,
    pub config: Config,
}

/// The sole persisted entity: one row per submitted analysis job.
///
/// `job_id` is generated by the API layer before the row exists; `result`
/// stays empty until the worker writes a terminal status.
// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct AnalysisJob {
    pub job_id: String,
    pub filename: String,
    pub query: String,
    pub status: JobStatus,
    pub result: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct QueuedResponse {
    pub status: String,
    pub job_id: String,
}

#[derive(Debug, serde::Serialize)]
pub struct JobResultResponse {
    pub status: JobStatus,
    pub query: String,
    pub filename: String,
    pub result: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AnalysisJob> for JobResultResponse {
    fn from(job: AnalysisJob) -> Self {
        Self {
            status: job.status,
            query: job.query,
            filename: job.filename,
            result: job.result,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RootResponse {
    pub message: String,
}
