//! 匹配流水线: 规范化 -> 类义扩展 -> 兼容性过滤 -> 评分 -> 选择 -> 单价校验

pub mod engine;
pub mod filter;
pub mod normalizer;
pub mod prepare;
pub mod scorer;
pub mod selector;
pub mod validator;

pub use engine::{unmatched_log, BatchStats, EnrichReport, MatchingEngine};
pub use normalizer::{normalize, NormalizedText, SizeToken, SizeUnit};
pub use prepare::PreparedItem;
pub use scorer::{score, NameMatch, ScoreBreakdown};
pub use selector::{is_accepted, select, ScoredCandidate, Selection};
