//! Analysis worker
//!
//! Consumes queued tasks and drives each one through the agent pipeline,
//! then writes the terminal status. All pipeline failures are absorbed
//! here and become FAILED records; nothing re-raises past the poll loop,
//! so a bad job never takes the worker process down with it.

use crate::agents::AnalysisPipeline;
use crate::config::WorkerConfig;
use crate::queue::{AnalysisTask, JobQueue};
use crate::db::JobStore;
use crate::types::{AppError, AppResult};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct Worker {
    pool: PgPool,
    queue: JobQueue,
    pipeline: Arc<dyn AnalysisPipeline>,
    pipeline_timeout: Duration,
    poll_timeout: Duration,
}

impl Worker {
    pub fn new(
        pool: PgPool,
        queue: JobQueue,
        pipeline: Arc<dyn AnalysisPipeline>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            pool,
            queue,
            pipeline,
            pipeline_timeout: Duration::from_secs(config.pipeline_timeout_secs),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }

    /// Poll loop. Runs until ctrl-c; a broker hiccup backs off briefly
    /// instead of exiting.
    pub async fn run(&self) -> AppResult<()> {
        info!("Worker started, waiting for jobs");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping worker");
                    break;
                }
                popped = self.queue.pop(self.poll_timeout) => {
                    match popped {
                        Ok(Some(task)) => {
                            let job_id = task.job_id.clone();
                            if let Err(e) = self.process(task).await {
                                error!(job_id = %job_id, error = %e, "Job left no terminal record");
                            }
                        }
                        Ok(None) => {} // poll timed out, nothing queued
                        Err(e) => {
                            error!(error = %e, "Queue poll failed");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Process one accepted task.
    ///
    /// The connection is checked out once per invocation and released on
    /// every exit path by drop. Errors returned from here mean the job
    /// could not be given a terminal record (orphan row or a store that
    /// refused both writes) — the loop logs them and moves on.
    pub async fn process(&self, task: AnalysisTask) -> AppResult<()> {
        info!(job_id = %task.job_id, query = %task.query, "Processing analysis job");
        let mut conn = self.pool.acquire().await?;

        let outcome = run_with_timeout(
            self.pipeline.as_ref(),
            &task.query,
            Path::new(&task.file_path),
            self.pipeline_timeout,
        )
        .await;

        match outcome {
            Ok(text) => match JobStore::complete(&mut conn, &task.job_id, &text).await {
                Ok(()) => {
                    info!(job_id = %task.job_id, result_len = text.len(), "Job completed");
                    Ok(())
                }
                Err(AppError::NotFound(_)) => {
                    // The row vanished between submission and completion.
                    error!(job_id = %task.job_id, "Job row disappeared before completion");
                    Err(AppError::NotFound(task.job_id))
                }
                Err(AppError::InvalidTransition { from, .. }) => {
                    warn!(job_id = %task.job_id, status = %from, "Duplicate delivery, keeping earlier terminal result");
                    Ok(())
                }
                Err(e) => {
                    let description = describe_failure(&e);
                    self.record_failure(&mut conn, &task.job_id, &description).await
                }
            },
            Err(e) => {
                warn!(job_id = %task.job_id, error = %e, "Pipeline run failed");
                let description = describe_failure(&e);
                self.record_failure(&mut conn, &task.job_id, &description).await
            }
        }
    }

    async fn record_failure(
        &self,
        conn: &mut sqlx::PgConnection,
        job_id: &str,
        description: &str,
    ) -> AppResult<()> {
        match JobStore::fail(conn, job_id, description).await {
            Ok(()) => {
                info!(job_id = %job_id, "Job marked FAILED");
                Ok(())
            }
            Err(AppError::NotFound(_)) => {
                // Nothing to update; the failure is only visible here.
                warn!(job_id = %job_id, "No job row to mark FAILED");
                Ok(())
            }
            Err(AppError::InvalidTransition { from, .. }) => {
                warn!(job_id = %job_id, status = %from, "Job already terminal, failure not recorded");
                Ok(())
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Could not record job failure");
                Err(e)
            }
        }
    }
}

/// Run the pipeline under a wall-clock bound. Expiry is reported as a
/// `PipelineTimeout` and ends up as a FAILED record like any other
/// pipeline error.
pub async fn run_with_timeout(
    pipeline: &dyn AnalysisPipeline,
    query: &str,
    file_path: &Path,
    limit: Duration,
) -> AppResult<String> {
    match tokio::time::timeout(limit, pipeline.run(query, file_path)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::PipelineTimeout {
            secs: limit.as_secs(),
        }),
    }
}

/// Human-readable failure text stored on the job row.
pub fn describe_failure(error: &AppError) -> String {
    format!("Error during analysis: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticPipeline(&'static str);

    #[async_trait]
    impl AnalysisPipeline for StaticPipeline {
        async fn run(&self, _query: &str, _file_path: &Path) -> AppResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingPipeline(&'static str);

    #[async_trait]
    impl AnalysisPipeline for FailingPipeline {
        async fn run(&self, _query: &str, _file_path: &Path) -> AppResult<String> {
            Err(AppError::Pipeline(self.0.to_string()))
        }
    }

    struct HangingPipeline;

    #[async_trait]
    impl AnalysisPipeline for HangingPipeline {
        async fn run(&self, _query: &str, _file_path: &Path) -> AppResult<String> {
            tokio::time::sleep(Duration::from_secs(86_400)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn successful_runs_pass_their_output_through() {
        let pipeline = StaticPipeline("Hemoglobin normal");
        let out = run_with_timeout(
            &pipeline,
            "Summarise",
            Path::new("data/report.pdf"),
            Duration::from_secs(10),
        )
        .await
        .unwrap();
        assert_eq!(out, "Hemoglobin normal");
    }

    #[tokio::test]
    async fn failure_descriptions_carry_the_pipeline_error() {
        let pipeline = FailingPipeline("pipeline hung");
        let err = run_with_timeout(
            &pipeline,
            "Summarise",
            Path::new("data/report.pdf"),
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();

        let description = describe_failure(&err);
        assert!(description.contains("pipeline hung"));
        assert!(description.starts_with("Error during analysis:"));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_pipelines_are_bounded_by_the_timeout() {
        let err = run_with_timeout(
            &HangingPipeline,
            "Summarise",
            Path::new("data/report.pdf"),
            Duration::from_secs(300),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::PipelineTimeout { secs: 300 }));
        assert!(describe_failure(&err).contains("timed out after 300s"));
    }
}
