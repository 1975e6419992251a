use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单条明细的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// 采用单价
    Accepted,
    /// 评分通过但单价不合理, 单价不采用
    Downgraded,
    /// 没有可接受的候选
    Unmatched,
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// 兼容性过滤后无候选
    #[serde(rename = "no compatible candidate")]
    NoCandidate,
    /// 最优候选未达到任一阈值
    #[serde(rename = "below acceptance threshold")]
    BelowThreshold,
    #[serde(rename = "implausible price for category")]
    PriceImplausible,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCandidate => "no compatible candidate",
            Self::BelowThreshold => "below acceptance threshold",
            Self::PriceImplausible => "implausible price for category",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 匹配结果 (每条提交的明细一条, 顺序与输入一致)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub line_item_id: String,
    pub matched_kb_id: Option<String>,
    pub matched_unit_price: Option<BigDecimal>,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub accepted: bool,
    pub confidence: f64,
    pub outcome: MatchOutcome,
    pub rejection_reason: Option<RejectionReason>,
}

impl MatchResult {
    /// 兼容性过滤后没有任何候选
    pub fn no_candidate(line_item_id: impl Into<String>) -> Self {
        Self {
            line_item_id: line_item_id.into(),
            matched_kb_id: None,
            matched_unit_price: None,
            raw_score: 0.0,
            normalized_score: 0.0,
            accepted: false,
            confidence: 0.0,
            outcome: MatchOutcome::Unmatched,
            rejection_reason: Some(RejectionReason::NoCandidate),
        }
    }

    pub fn is_priced(&self) -> bool {
        self.outcome == MatchOutcome::Accepted && self.matched_unit_price.is_some()
    }
}

/// 未匹配/降级明细记录 (供外部收集, 用于扩充知识库与类义词典)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedRecord {
    pub line_item_id: String,
    pub name: String,
    pub specification: Option<String>,
    pub discipline: String,
    pub reason: Option<RejectionReason>,
}
