use crate::export;
use crate::models::{LineItem, MatchResult, UnmatchedRecord};
use crate::service::{EnrichReport, MatchingEngine};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// 共享状态: 只读匹配引擎 + 未匹配日志路径
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub unmatched_log: Option<PathBuf>,
}

/// 请求体: 见积明细列表
#[derive(Debug, Deserialize)]
pub struct BatchMatchRequest {
    pub line_items: Vec<LineItem>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub success: bool,
    pub message: String,
    pub results: Option<Vec<MatchResult>>,
    pub unmatched: Option<Vec<UnmatchedRecord>>,
}

impl BatchMatchResponse {
    fn error(message: String) -> Self {
        Self {
            success: false,
            message,
            results: None,
            unmatched: None,
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 在阻塞线程上执行匹配 (纯计算, 不占用异步运行时)
async fn run_enrich(state: &AppState, line_items: Vec<LineItem>) -> Result<EnrichReport, String> {
    let engine = Arc::clone(&state.engine);
    let log_path = state.unmatched_log.clone();

    tokio::task::spawn_blocking(move || {
        let mut items = line_items;
        let report = engine.enrich(&mut items);
        if let Some(path) = log_path {
            if let Err(e) = export::append_unmatched_log(&path, &report.unmatched) {
                tracing::error!("Failed to write unmatched log {:?}: {}", path, e);
            }
        }
        report
    })
    .await
    .map_err(|e| format!("matching task failed: {e}"))
}

/// 批量匹配接口
pub async fn batch_match(State(state): State<Arc<AppState>>, Json(req): Json<BatchMatchRequest>) -> Response {
    let submitted = req.line_items.len();
    match run_enrich(&state, req.line_items).await {
        Ok(report) => {
            let response = BatchMatchResponse {
                success: true,
                message: format!(
                    "Matched {}/{} priceable items ({} line items), {} downgraded, {} unmatched",
                    report.stats.accepted,
                    report.stats.total,
                    submitted,
                    report.stats.downgraded,
                    report.stats.unmatched
                ),
                results: Some(report.results),
                unmatched: Some(report.unmatched),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("Batch match failed: {}", e);
            let response = BatchMatchResponse::error(format!("Error: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// 批量匹配接口 (CSV 输出)
pub async fn batch_match_csv(State(state): State<Arc<AppState>>, Json(req): Json<BatchMatchRequest>) -> Response {
    let csv = match run_enrich(&state, req.line_items).await {
        Ok(report) => export::results_to_csv(&report.results).map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };

    match csv {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response(),
        Err(e) => {
            tracing::error!("Batch match (csv) failed: {}", e);
            let response = BatchMatchResponse::error(format!("Error: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
