use std::path::PathBuf;

/// 匹配引擎错误 (仅包含致命错误; 单条明细的匹配失败以 `RejectionReason` 表示)
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    /// 知识库为空或全部条目无效, 无法进行任何匹配
    #[error("knowledge base is empty: {0}")]
    EmptyCorpus(String),

    #[error("failed to load knowledge base from {path:?}: {message}")]
    KbLoad { path: PathBuf, message: String },

    #[error("unsupported knowledge base format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("invalid matching rules: {0}")]
    InvalidRules(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl MatcherError {
    pub fn invalid_rules(msg: impl Into<String>) -> Self {
        Self::InvalidRules(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MatcherError>;
