use crate::models::RootResponse;
use axum::{routing::get, Json, Router};

pub fn router() -> Router {
    Router::new().route("/", get(root))
}

/// Liveness probe; always succeeds.
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Blood test report analysis service is running".to_string(),
    })
}
