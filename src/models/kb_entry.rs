use super::{Discipline, Unit};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// 知识库单价条目 (加载后不可变)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntry {
    pub item_id: String,
    pub description: String,
    pub discipline: Discipline,
    pub unit: Unit,
    pub unit_price: BigDecimal,
    #[serde(default)]
    pub features: EntryFeatures,
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub source_project: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFeatures {
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
}

/// 原始知识库行 (字段均可缺失, 由 `KbEntry::try_from` 校验)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawKbRecord {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_price: Option<BigDecimal>,
    #[serde(default)]
    pub features: RawFeatures,
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub source_project: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantity: Option<BigDecimal>,
}

/// 必填字段缺失
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

impl TryFrom<RawKbRecord> for KbEntry {
    type Error = MissingField;

    fn try_from(raw: RawKbRecord) -> Result<Self, Self::Error> {
        let item_id = non_blank(raw.item_id).ok_or(MissingField("item_id"))?;
        let description = non_blank(raw.description).ok_or(MissingField("description"))?;
        let discipline = non_blank(raw.discipline).ok_or(MissingField("discipline"))?;
        let unit = non_blank(raw.unit).ok_or(MissingField("unit"))?;
        let unit_price = raw.unit_price.ok_or(MissingField("unit_price"))?;

        Ok(Self {
            item_id,
            description,
            discipline: Discipline::parse(&discipline),
            unit: Unit::parse(&unit),
            unit_price,
            features: EntryFeatures {
                specification: non_blank(raw.features.specification),
                quantity: raw.features.quantity,
            },
            context_tags: raw.context_tags,
            vendor: non_blank(raw.vendor),
            valid_from: raw.valid_from.as_deref().and_then(parse_date),
            source_project: non_blank(raw.source_project),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// 解析金额文本: 去除千分位逗号与货币符号 ("¥8,990" / "8990円")
pub fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '，' | '¥' | '￥' | '円' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(&cleaned).ok()
}

/// 宽松的十进制反序列化: 数字或文本均可, 无法解析时为 None
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => BigDecimal::from_str(&n.to_string()).ok(),
        Some(serde_json::Value::String(s)) => parse_decimal(&s),
        _ => None,
    })
}
