use crate::db::JobStore;
use crate::models::{AppState, QueuedResponse};
use crate::queue::AnalysisTask;
use crate::types::AppError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{routing::post, Json, Router};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Applied when the submitter leaves the query field out or blank.
const DEFAULT_QUERY: &str = "Summarise my Blood Test Report";

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Accept a report upload, create the PENDING record, queue the job.
///
/// Any failure surfaces as a 500 with a descriptive message; partial
/// state (an orphaned file or row) is deliberately not cleaned up.
async fn analyze_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<QueuedResponse>, AppError> {
    let mut file_bytes = None;
    let mut filename = String::from("report.pdf");
    let mut raw_query = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if let Some(original) = field.file_name() {
                    filename = original.to_string();
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("could not read upload: {e}")))?;
                file_bytes = Some(bytes);
            }
            "query" => {
                raw_query = field
                    .text()
                    .await
                    .map_err(|e| AppError::Upload(format!("could not read query field: {e}")))?;
            }
            _ => {}
        }
    }

    let data =
        file_bytes.ok_or_else(|| AppError::Upload("missing `file` field".to_string()))?;
    let query = effective_query(&raw_query);

    let job_id = Uuid::new_v4().to_string();
    let file_path = upload_path(&state.config.upload.dir, Uuid::new_v4());

    tokio::fs::create_dir_all(&state.config.upload.dir)
        .await
        .map_err(|e| AppError::Upload(format!("could not create upload directory: {e}")))?;
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| AppError::Upload(format!("could not persist upload: {e}")))?;

    let mut conn = state.pool.acquire().await?;
    JobStore::create(&mut conn, &job_id, &filename, &query).await?;
    drop(conn);

    let task = AnalysisTask::new(query, file_path.to_string_lossy(), job_id.clone());
    state.queue.submit(&task).await?;

    info!(job_id = %job_id, filename = %filename, "Analysis job queued");

    Ok(Json(QueuedResponse {
        status: "queued".to_string(),
        job_id,
    }))
}

/// Trim the submitted query; fall back to the canned instruction when
/// the field was missing or blank.
fn effective_query(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Unique on-disk destination for one upload, under the configured dir.
fn upload_path(dir: &str, file_id: Uuid) -> PathBuf {
    Path::new(dir).join(format!("blood_test_report_{file_id}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_fall_back_to_the_default() {
        assert_eq!(effective_query(""), DEFAULT_QUERY);
        assert_eq!(effective_query("   \n\t"), DEFAULT_QUERY);
    }

    #[test]
    fn queries_are_trimmed_at_creation() {
        assert_eq!(effective_query("  explain my CBC  "), "explain my CBC");
    }

    #[test]
    fn upload_paths_are_unique_and_land_under_the_dir() {
        let a = upload_path("data", Uuid::new_v4());
        let b = upload_path("data", Uuid::new_v4());
        assert_ne!(a, b);
        assert!(a.starts_with("data"));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("pdf"));
    }
}
