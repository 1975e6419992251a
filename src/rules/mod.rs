//! 匹配规则: 版本化的静态配置数据 (类义词典、评分权重、阈值、价格边界)
//!
//! 启动时加载一次, 以不可变值传入引擎。

pub mod category;
pub mod price_bounds;
pub mod synonyms;

pub use category::Category;
pub use price_bounds::{PriceBound, PriceBounds};
pub use synonyms::SynonymDict;

use crate::error::{MatcherError, Result};
use serde::Deserialize;
use std::path::Path;

/// 内置规则 (随代码发布)
const BUILTIN_RULES: &str = include_str!("../../data/matching_rules.json");

/// 各信号的加分
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub name_exact: f64,
    pub name_synonym: f64,
    pub name_partial: f64,
    pub category: f64,
    pub specification_exact: f64,
    pub size_token: f64,
    pub unit: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name_exact: 2.0,
            name_synonym: 1.8,
            name_partial: 1.5,
            category: 1.0,
            specification_exact: 1.5,
            size_token: 1.2,
            unit: 0.5,
        }
    }
}

impl ScoreWeights {
    fn all(&self) -> [(&'static str, f64); 7] {
        [
            ("name_exact", self.name_exact),
            ("name_synonym", self.name_synonym),
            ("name_partial", self.name_partial),
            ("category", self.category),
            ("specification_exact", self.specification_exact),
            ("size_token", self.size_token),
            ("unit", self.unit),
        ]
    }

    /// 名称信号的最高分 (三者互斥, 取最高级别)
    pub fn name_max(&self) -> f64 {
        self.name_exact.max(self.name_synonym).max(self.name_partial)
    }
}

/// 采用阈值: raw >= min_raw_score 或 normalized >= min_normalized_score 即采用
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub min_raw_score: f64,
    pub min_normalized_score: f64,
    /// 降级时置信度的缩减系数
    pub downgrade_factor: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_raw_score: 1.0,
            min_normalized_score: 0.50,
            downgrade_factor: 0.5,
        }
    }
}

/// 匹配规则
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingRules {
    pub version: String,
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub synonyms: SynonymDict,
    #[serde(default)]
    pub price_bounds: PriceBounds,
}

impl MatchingRules {
    /// 内置规则
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// 从外部 JSON 文件加载 (无需重新部署即可更新词典/阈值)
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json(&json)?;
        tracing::info!(
            "Loaded matching rules v{} from {:?}: {} synonym groups",
            rules.version,
            path,
            rules.synonyms.len()
        );
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.weights.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatcherError::invalid_rules(format!(
                    "weight '{name}' must be a non-negative number, got {weight}"
                )));
            }
        }

        let t = &self.thresholds;
        if !t.min_raw_score.is_finite() || t.min_raw_score < 0.0 {
            return Err(MatcherError::invalid_rules("min_raw_score must be >= 0"));
        }
        if !(0.0..=1.0).contains(&t.min_normalized_score) {
            return Err(MatcherError::invalid_rules("min_normalized_score must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&t.downgrade_factor) {
            return Err(MatcherError::invalid_rules("downgrade_factor must be within [0, 1]"));
        }

        self.synonyms.validate().map_err(MatcherError::InvalidRules)?;
        self.price_bounds.validate().map_err(MatcherError::InvalidRules)
    }
}
