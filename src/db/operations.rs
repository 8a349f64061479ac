use crate::models::AnalysisJob;
use crate::types::{AppError, AppResult, JobStatus};
use sqlx::PgConnection;

/// Row operations for `analysis_jobs`.
///
/// Every operation takes an explicit connection so callers decide the
/// scope: request handlers and worker invocations each check one out of
/// the pool and release it on every exit path via drop.
pub struct JobStore;

impl JobStore {
    /// Insert the PENDING row for a freshly submitted job.
    ///
    /// `job_id` is assigned by the caller exactly once, before the row
    /// exists; re-using an id is rejected rather than overwritten.
    pub async fn create(
        conn: &mut PgConnection,
        job_id: &str,
        filename: &str,
        query: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO analysis_jobs (job_id, filename, query, status)
            VALUES ($1, $2, $3, 'PENDING')
            "#,
        )
        .bind(job_id)
        .bind(filename)
        .bind(query)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateJob(job_id.to_string())
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    pub async fn get(conn: &mut PgConnection, job_id: &str) -> AppResult<Option<AnalysisJob>> {
        let job = sqlx::query_as::<_, AnalysisJob>(
            r#"
            SELECT job_id, filename, query, status, result, created_at
            FROM analysis_jobs
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(job)
    }

    /// Record a successful pipeline run.
    pub async fn complete(
        conn: &mut PgConnection,
        job_id: &str,
        result_text: &str,
    ) -> AppResult<()> {
        Self::update_terminal(conn, job_id, JobStatus::Completed, result_text).await
    }

    /// Record a failed pipeline run with a human-readable description.
    pub async fn fail(conn: &mut PgConnection, job_id: &str, error_text: &str) -> AppResult<()> {
        Self::update_terminal(conn, job_id, JobStatus::Failed, error_text).await
    }

    /// Guarded compare-and-set terminal write: only a PENDING row is
    /// updated, so a redelivered job can never clobber an earlier result.
    /// Zero rows affected is disambiguated by a follow-up read: a missing
    /// row is `NotFound` (the update-path orphan condition, distinct from
    /// read-path not-found), an existing row is `InvalidTransition`.
    async fn update_terminal(
        conn: &mut PgConnection,
        job_id: &str,
        status: JobStatus,
        result_text: &str,
    ) -> AppResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE analysis_jobs
            SET status = $2, result = $3
            WHERE job_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(job_id)
        .bind(status)
        .bind(result_text)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 1 {
            return Ok(());
        }

        match Self::get(conn, job_id).await? {
            None => Err(AppError::NotFound(job_id.to_string())),
            Some(job) => Err(AppError::InvalidTransition {
                job_id: job_id.to_string(),
                from: job.status,
            }),
        }
    }
}
