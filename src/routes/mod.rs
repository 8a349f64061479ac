//! API Routes
//!
//! HTTP surface of the service:
//! - `GET /` - liveness acknowledgement
//! - `POST /analyze` - upload a report and queue an analysis job
//! - `GET /result/{job_id}` - poll a job's status/result record

pub mod analyze;
pub mod health;
pub mod results;

use crate::middleware::apply_cors;
use crate::models::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(health::router())
        .merge(analyze::router(state.clone()))
        .merge(results::router(state))
        .layer(TraceLayer::new_for_http());

    apply_cors(router)
}
