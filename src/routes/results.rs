use crate::db::JobStore;
use crate::models::{AppState, JobResultResponse};
use crate::types::AppError;
use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/result/{job_id}", get(get_result))
        .with_state(state)
}

/// Return the full status/result record, or 404 for an unknown job.
async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResultResponse>, AppError> {
    let mut conn = state.pool.acquire().await?;
    let job = JobStore::get(&mut conn, &job_id)
        .await?
        .ok_or(AppError::NotFound(job_id))?;

    Ok(Json(JobResultResponse::from(job)))
}
