//! 知识库行修复: 「同上」「〃」行继承上一条有效行的名称、工种与单位

use crate::models::{RawKbRecord, Unit};
use crate::service::normalizer::canonicalize;
use bigdecimal::BigDecimal;
use serde::Serialize;

/// 「同上」标记 (行首匹配, 其后的文字作为后缀保留)
const DITTO_MARKERS: &[&str] = &["〃", "同上", "上記と同じ", "上記同", "″"];

/// 高额一式条目阈值 (仅统计)
const HIGH_VALUE_LUMP_SUM: i64 = 5_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairStats {
    pub descriptions_inherited: usize,
    pub units_inherited: usize,
    pub high_value_lump_sums: usize,
}

fn ditto_marker(desc: &str) -> Option<&'static str> {
    DITTO_MARKERS.iter().copied().find(|m| desc.starts_with(m))
}

/// 按语料顺序解析「同上」行; 前面没有有效行时保持原样
pub fn resolve_ditto_rows(mut rows: Vec<RawKbRecord>) -> (Vec<RawKbRecord>, RepairStats) {
    let mut stats = RepairStats::default();
    let mut last_description: Option<String> = None;
    let mut last_discipline: Option<String> = None;
    let mut last_unit: Option<String> = None;
    let high_value = BigDecimal::from(HIGH_VALUE_LUMP_SUM);

    for row in rows.iter_mut() {
        let desc = row.description.as_deref().unwrap_or("").trim().to_string();
        let marker = ditto_marker(&desc);

        if desc.is_empty() || marker.is_some() {
            if let Some(parent) = &last_description {
                let suffix = marker.map(|m| desc[m.len()..].trim()).unwrap_or("");
                row.description = Some(format!("{parent}{suffix}"));
                if row.discipline.as_deref().map_or(true, |d| d.trim().is_empty()) {
                    row.discipline = last_discipline.clone();
                }
                stats.descriptions_inherited += 1;
            }
        } else if desc.chars().count() > 1 {
            last_description = Some(desc);
            last_discipline = row.discipline.clone().filter(|d| !d.trim().is_empty());
        }

        let unit = row.unit.as_deref().map(|u| u.trim().to_string());
        match unit.as_deref() {
            Some(u) if ditto_marker(u).is_some() => {
                if let Some(prev) = &last_unit {
                    row.unit = Some(prev.clone());
                    stats.units_inherited += 1;
                }
            }
            Some(u) if !u.is_empty() => {
                let unit = canonicalize(u);
                last_unit = Some(unit.clone());
                row.unit = Some(unit);
            }
            _ => {}
        }

        let lump_sum = row.unit.as_deref().is_some_and(|u| Unit::parse(u).is_lump_sum());
        if lump_sum && row.unit_price.as_ref().is_some_and(|p| *p > high_value) {
            stats.high_value_lump_sums += 1;
        }
    }

    tracing::info!(
        "「同上」行修复: 名称继承 {}, 单位继承 {}, 高额一式 {}",
        stats.descriptions_inherited,
        stats.units_inherited,
        stats.high_value_lump_sums
    );
    (rows, stats)
}
