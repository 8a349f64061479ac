//! Agent System
//!
//! The analysis pipeline run by the worker for each queued job:
//!
//! ```text
//! Queued Job (query, file_path)
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Report    │  → Extracts the report text from the PDF
//! │  Extraction │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Doctor    │  → Reviews the report against the query
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//!  Terminal record (COMPLETED text / FAILED description)
//! ```
//!
//! The worker depends only on the `AnalysisPipeline` trait, so the
//! pipeline stays swappable (and mockable in tests).

pub mod doctor;

pub use doctor::DoctorPipeline;

use crate::types::AppResult;
use async_trait::async_trait;
use std::path::Path;

/// The black-box capability the worker invokes once per job: free-text
/// query plus report path in, textual verdict out. May take seconds to
/// minutes; the worker bounds it with a timeout.
#[async_trait]
pub trait AnalysisPipeline: Send + Sync {
    async fn run(&self, query: &str, file_path: &Path) -> AppResult<String>;
}
