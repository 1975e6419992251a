use super::{Discipline, MatchResult, Unit};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 费用区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostType {
    #[serde(rename = "材料費", alias = "material")]
    Material,
    #[serde(rename = "労務費", alias = "labor")]
    Labor,
    #[serde(rename = "施工費", alias = "construction")]
    Construction,
    #[serde(rename = "諸経費", alias = "overhead")]
    Overhead,
    #[serde(rename = "一式", alias = "lump_sum")]
    LumpSum,
    #[serde(rename = "機器費", alias = "equipment")]
    Equipment,
    #[serde(rename = "解体費", alias = "demolition")]
    Demolition,
    #[serde(rename = "掘削・埋戻し", alias = "excavation")]
    Excavation,
    #[serde(rename = "復旧費", alias = "restoration")]
    Restoration,
}

/// 见积明细行 (由上游生成, 引擎只写入 matched_price / matched_kb_id / confidence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specification: Option<String>,
    pub discipline: Discipline,
    pub unit: Unit,
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
    /// 层级: 0 = 章节标题, >0 = 可计价明细
    pub level: u8,
    /// 父项ID (仅用于汇总)
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub cost_type: Option<CostType>,
    #[serde(default)]
    pub matched_price: Option<BigDecimal>,
    #[serde(default)]
    pub matched_kb_id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// 金额 (由下游汇总写入)
    #[serde(default)]
    pub amount: Option<BigDecimal>,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, discipline: &str, unit: &str, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specification: None,
            discipline: Discipline::parse(discipline),
            unit: Unit::parse(unit),
            quantity: None,
            level,
            parent_id: None,
            cost_type: None,
            matched_price: None,
            matched_kb_id: None,
            confidence: None,
            amount: None,
        }
    }

    pub fn with_specification(mut self, spec: impl Into<String>) -> Self {
        self.specification = Some(spec.into());
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<BigDecimal>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_cost_type(mut self, cost_type: CostType) -> Self {
        self.cost_type = Some(cost_type);
        self
    }

    /// 是否提交给匹配引擎: 非标题行且有数量
    pub fn is_priceable(&self) -> bool {
        self.level > 0 && self.quantity.is_some()
    }

    /// 写入匹配结果; 降级/未匹配时单价保持为空
    pub fn apply_match(&mut self, result: &MatchResult) {
        self.matched_price = result.matched_unit_price.clone();
        self.matched_kb_id = result.matched_kb_id.clone();
        self.confidence = Some(result.confidence);
    }
}
