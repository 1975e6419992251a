//! 兼容性过滤 (流水线第 3 阶段)
//!
//! 工种与单位都兼容、且尺寸标记不冲突的条目才进入评分。

use crate::kb::{IndexedEntry, KbIndex};
use crate::service::prepare::PreparedItem;

/// 不兼容的原因 (仅用于调试日志)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    Discipline,
    Unit,
    Size,
}

/// 单个条目的兼容性检查
pub fn compatibility(item: &PreparedItem<'_>, entry: &IndexedEntry) -> Result<(), Incompatibility> {
    if !item.item.discipline.is_compatible_with(&entry.entry.discipline) {
        return Err(Incompatibility::Discipline);
    }
    if !item.item.unit.is_compatible_with(&entry.entry.unit) {
        return Err(Incompatibility::Unit);
    }
    if let (Some(a), Some(b)) = (&item.size, &entry.size) {
        if a != b {
            return Err(Incompatibility::Size);
        }
    }
    Ok(())
}

/// 候选条目 (语料顺序)
pub fn filter<'k>(item: &PreparedItem<'_>, index: &'k KbIndex) -> Vec<&'k IndexedEntry> {
    let mut candidates = Vec::new();
    for entry in index.entries_in_unit_class(&item.item.unit) {
        match compatibility(item, entry) {
            Ok(()) => candidates.push(entry),
            Err(reason) => tracing::trace!(
                "{} x {}: incompatible ({:?})",
                item.item.id,
                entry.entry.item_id,
                reason
            ),
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KbEntry, LineItem};
    use crate::rules::MatchingRules;
    use bigdecimal::BigDecimal;

    fn entry(id: &str, desc: &str, discipline: &str, unit: &str, spec: Option<&str>) -> KbEntry {
        KbEntry {
            item_id: id.into(),
            description: desc.into(),
            discipline: discipline.to_string().into(),
            unit: unit.to_string().into(),
            unit_price: BigDecimal::from(1000),
            features: crate::models::EntryFeatures {
                specification: spec.map(String::from),
                quantity: None,
            },
            context_tags: Vec::new(),
            vendor: None,
            valid_from: None,
            source_project: None,
        }
    }

    fn index(entries: Vec<KbEntry>) -> (KbIndex, MatchingRules) {
        let rules = MatchingRules::builtin().unwrap();
        (KbIndex::from_entries(entries, &rules).unwrap(), rules)
    }

    fn ids(candidates: &[&IndexedEntry]) -> Vec<String> {
        candidates.iter().map(|e| e.entry.item_id.clone()).collect()
    }

    #[test]
    fn unit_classes_never_cross() {
        let (idx, rules) = index(vec![
            entry("M", "ガスコンセント", "ガス設備工事", "m", None),
            entry("P", "ガスコンセント", "ガス設備工事", "個", None),
            entry("L", "ガスコンセント", "ガス設備工事", "式", None),
        ]);
        let item = LineItem::new("1", "ガスコンセント", "ガス設備工事", "個", 2);
        let prepared = PreparedItem::new(&item, &rules);
        assert_eq!(ids(&filter(&prepared, &idx)), vec!["P"]);
    }

    #[test]
    fn compatible_units_in_same_class() {
        let (idx, rules) = index(vec![entry("S", "ネジコック", "ガス設備工事", "セット", None)]);
        let item = LineItem::new("1", "ネジコック", "ガス設備工事", "個", 2);
        let prepared = PreparedItem::new(&item, &rules);
        assert_eq!(filter(&prepared, &idx).len(), 1);
    }

    #[test]
    fn discipline_classes() {
        let (idx, rules) = index(vec![
            entry("EQ", "分電盤", "電気設備", "面", None),
            entry("ME", "分電盤", "機械設備工事", "面", None),
        ]);
        let item = LineItem::new("1", "分電盤", "電気設備工事", "面", 2);
        let prepared = PreparedItem::new(&item, &rules);
        assert_eq!(ids(&filter(&prepared, &idx)), vec!["EQ"]);
    }

    #[test]
    fn size_mismatch_is_filtered() {
        let (idx, rules) = index(vec![
            entry("15", "白ガス管", "ガス設備工事", "m", Some("15A")),
            entry("20", "白ガス管", "ガス設備工事", "m", Some("20A")),
            entry("NA", "白ガス管", "ガス設備工事", "m", None),
        ]);
        let item = LineItem::new("1", "白ガス管", "ガス設備工事", "m", 2).with_specification("20A");
        let prepared = PreparedItem::new(&item, &rules);
        assert_eq!(ids(&filter(&prepared, &idx)), vec!["20", "NA"]);

        let first = &idx.entries()[0];
        assert_eq!(compatibility(&prepared, first), Err(Incompatibility::Size));
    }
}
