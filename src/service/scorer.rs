//! 评分 (流水线第 4 阶段)
//!
//! 各信号独立加分; 名称三级 (完全/类义/部分) 只取最高一级。
//! normalized = raw / 本次比较中适用信号的满分之和。

use crate::kb::IndexedEntry;
use crate::rules::ScoreWeights;
use crate::service::prepare::PreparedItem;
use serde::Serialize;

/// 名称信号级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    Exact,
    Synonym,
    Partial,
}

/// 单次比较的评分明细
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub name: Option<NameMatch>,
    pub category: bool,
    pub specification: bool,
    pub size: bool,
    pub unit: bool,
    pub raw: f64,
    pub max_possible: f64,
}

impl ScoreBreakdown {
    pub fn normalized(&self) -> f64 {
        if self.max_possible > 0.0 {
            self.raw / self.max_possible
        } else {
            0.0
        }
    }
}

fn name_match(item: &PreparedItem<'_>, entry: &IndexedEntry, weights: &ScoreWeights) -> Option<(NameMatch, f64)> {
    let a = item.name.stem.as_str();
    let b = entry.description.stem.as_str();
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let mut levels = Vec::with_capacity(3);
    if a == b {
        levels.push((NameMatch::Exact, weights.name_exact));
    }
    if item.synonyms.contains(b) || entry.synonyms.contains(a) {
        levels.push((NameMatch::Synonym, weights.name_synonym));
    }
    if a.contains(b) || b.contains(a) {
        levels.push((NameMatch::Partial, weights.name_partial));
    }

    // 权重相同时保留靠前 (更严格) 的级别
    levels
        .into_iter()
        .fold(None, |best: Option<(NameMatch, f64)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })
}

pub fn score(item: &PreparedItem<'_>, entry: &IndexedEntry, weights: &ScoreWeights) -> ScoreBreakdown {
    let mut raw = 0.0;
    let mut max_possible = weights.name_max() + weights.unit;

    let name = name_match(item, entry, weights).map(|(level, points)| {
        raw += points;
        level
    });

    let category = match item.category {
        Some(c) => {
            max_possible += weights.category;
            entry.category == Some(c)
        }
        None => false,
    };
    if category {
        raw += weights.category;
    }

    let specification = match &item.specification {
        Some(spec) => {
            max_possible += weights.specification_exact;
            entry.specification.as_ref().is_some_and(|s| s.text == spec.text)
        }
        None => false,
    };
    if specification {
        raw += weights.specification_exact;
    }

    let size = match &item.size {
        Some(token) => {
            max_possible += weights.size_token;
            entry.size.as_ref() == Some(token)
        }
        None => false,
    };
    if size {
        raw += weights.size_token;
    }

    let unit = item.item.unit.label() == entry.entry.unit.label();
    if unit {
        raw += weights.unit;
    }

    ScoreBreakdown {
        name,
        category,
        specification,
        size,
        unit,
        raw,
        max_possible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KbIndex;
    use crate::models::{EntryFeatures, KbEntry, LineItem};
    use crate::rules::MatchingRules;
    use bigdecimal::BigDecimal;

    fn index(desc: &str, unit: &str, spec: Option<&str>) -> (KbIndex, MatchingRules) {
        let rules = MatchingRules::builtin().unwrap();
        let entry = KbEntry {
            item_id: "KB-1".into(),
            description: desc.into(),
            discipline: "ガス設備工事".to_string().into(),
            unit: unit.to_string().into(),
            unit_price: BigDecimal::from(8990),
            features: EntryFeatures {
                specification: spec.map(String::from),
                quantity: None,
            },
            context_tags: Vec::new(),
            vendor: None,
            valid_from: None,
            source_project: None,
        };
        (KbIndex::from_entries(vec![entry], &rules).unwrap(), rules)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn full_agreement_scores_max() {
        let (idx, rules) = index("白ガス管", "m", Some("15A"));
        let item = LineItem::new("1", "白ガス管", "ガス設備工事", "m", 2).with_specification("15A");
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);

        assert_eq!(s.name, Some(NameMatch::Exact));
        assert!(s.category && s.specification && s.size && s.unit);
        assert!(close(s.raw, 6.2));
        assert!(close(s.normalized(), 1.0));
    }

    #[test]
    fn synonym_and_partial_levels() {
        let (idx, rules) = index("SGP", "m", None);
        let item = LineItem::new("1", "白ガス管", "ガス設備工事", "m", 2);
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);
        assert_eq!(s.name, Some(NameMatch::Synonym));
        assert!(s.category);

        let (idx, rules) = index("ガスコンセント 露出型", "個", None);
        let item = LineItem::new("1", "ガスコンセント", "ガス設備工事", "個", 2);
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);
        assert_eq!(s.name, Some(NameMatch::Partial));
    }

    #[test]
    fn inapplicable_signals_leave_the_denominator() {
        let (idx, rules) = index("ネジコック", "個", Some("15A"));
        let item = LineItem::new("1", "ネジコック", "ガス設備工事", "個", 2);
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);

        // name 2.0 + unit 0.5 + category 1.0 (item maps to a category)
        assert!(close(s.max_possible, 3.5));
        assert!(close(s.raw, 3.5));
        assert!(!s.specification && !s.size);
    }

    #[test]
    fn size_mismatch_scores_zero_for_size() {
        let (idx, rules) = index("白ガス管", "m", Some("20A"));
        let item = LineItem::new("1", "白ガス管", "ガス設備工事", "m", 2).with_specification("15A");
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);
        assert!(!s.size);
        assert!(!s.specification);
        assert!(close(s.max_possible, 6.2));
    }

    #[test]
    fn compatible_but_different_unit_gets_no_unit_points() {
        let (idx, rules) = index("ネジコック", "セット", None);
        let item = LineItem::new("1", "ネジコック", "ガス設備工事", "個", 2);
        let s = score(&PreparedItem::new(&item, &rules), &idx.entries()[0], &rules.weights);
        assert!(!s.unit);
        assert!(close(s.raw, 3.0));
    }
}
