pub mod handlers;

pub use handlers::{batch_match, batch_match_csv, health_check, AppState, BatchMatchRequest, BatchMatchResponse};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/match/batch", post(batch_match))
        .route("/api/match/batch/csv", post(batch_match_csv))
        .with_state(Arc::new(state))
        .layer(ServiceBuilder::new())
}
