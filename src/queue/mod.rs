//! Job queue
//!
//! Producer/consumer plumbing over a Redis list. The API server LPUSHes
//! accepted work items; worker processes BRPOP them. Delivery is
//! at-least-once: a worker crash between pop and terminal write loses or
//! redelivers the item depending on timing, and the store's guarded
//! terminal update keeps redelivery harmless.

pub mod jobs;
pub mod workers;

pub use jobs::AnalysisTask;
pub use workers::Worker;

use crate::config::RedisConfig;
use crate::types::AppResult;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct JobQueue {
    conn: ConnectionManager,
    queue_key: String,
}

impl JobQueue {
    pub async fn connect(config: &RedisConfig) -> AppResult<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        info!(queue_key = %config.queue_key, "Connected to job queue broker");

        Ok(Self {
            conn,
            queue_key: config.queue_key.clone(),
        })
    }

    /// Enqueue a work item. Returns once the broker has accepted it, not
    /// when processing completes.
    pub async fn submit(&self, task: &AnalysisTask) -> AppResult<()> {
        let payload = task
            .to_wire()
            .map_err(|e| crate::types::AppError::Queue(format!("could not encode task: {e}")))?;

        let mut conn = self.conn.clone();
        let _: i64 = conn.lpush(&self.queue_key, payload).await?;

        debug!(job_id = %task.job_id, "Task accepted by broker");
        Ok(())
    }

    /// Blocking pop with a bounded wait so consumers stay responsive to
    /// shutdown. `None` means the wait timed out with nothing queued.
    pub async fn pop(&self, timeout: Duration) -> AppResult<Option<AnalysisTask>> {
        let mut conn = self.conn.clone();
        let reply: Option<(String, String)> = conn
            .brpop(&self.queue_key, timeout.as_secs_f64())
            .await?;

        match reply {
            Some((_, raw)) => {
                let task = AnalysisTask::from_wire(&raw).map_err(|e| {
                    crate::types::AppError::Queue(format!("malformed task payload: {e}"))
                })?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }
}
