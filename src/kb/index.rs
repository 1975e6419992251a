use crate::error::{MatcherError, Result};
use crate::models::{KbEntry, RawKbRecord, Unit, UnitClass};
use crate::rules::{Category, MatchingRules};
use crate::service::normalizer::{normalize, record_size, NormalizedText, SizeToken};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// 预处理后的知识库条目 (规范化文本、尺寸、品类、类义扩展均在构建时计算)
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub entry: KbEntry,
    /// 在语料中的位置 (最终的排序兜底)
    pub position: usize,
    pub description: NormalizedText,
    pub specification: Option<NormalizedText>,
    pub size: Option<SizeToken>,
    pub category: Option<Category>,
    pub synonyms: IndexSet<String>,
}

impl IndexedEntry {
    fn new(entry: KbEntry, position: usize, rules: &MatchingRules) -> Self {
        let description = normalize(&entry.description);
        let specification = entry
            .features
            .specification
            .as_deref()
            .map(normalize)
            .filter(|s| !s.is_empty());
        let size = record_size(&description, specification.as_ref());
        let category = Category::of(&description.text);
        let synonyms = if description.stem.is_empty() {
            IndexSet::new()
        } else {
            rules.synonyms.expand(&description.stem)
        };

        Self {
            entry,
            position,
            description,
            specification,
            size,
            category,
            synonyms,
        }
    }
}

/// 知识库加载统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct KbSummary {
    pub entries: usize,
    pub skipped: usize,
    pub by_discipline: IndexMap<String, usize>,
}

/// 只读知识库索引 (构建后在各匹配线程间共享, 无需加锁)
#[derive(Debug, Clone)]
pub struct KbIndex {
    entries: Vec<IndexedEntry>,
    by_unit_class: IndexMap<UnitClass, Vec<usize>>,
    summary: KbSummary,
}

impl KbIndex {
    /// 从原始行构建索引; 缺少必填字段的行跳过并告警, 无有效条目时返回致命错误
    pub fn build(records: Vec<RawKbRecord>, rules: &MatchingRules) -> Result<Self> {
        let total = records.len();
        let mut entries = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for (row, raw) in records.into_iter().enumerate() {
            let label = raw.item_id.clone().unwrap_or_else(|| format!("row {}", row + 1));
            match KbEntry::try_from(raw) {
                Ok(entry) => entries.push(entry),
                Err(missing) => {
                    skipped += 1;
                    tracing::warn!("Skipping malformed KB entry {}: missing {}", label, missing.0);
                }
            }
        }

        if entries.is_empty() {
            return Err(MatcherError::EmptyCorpus(format!(
                "no valid entries among {total} rows ({skipped} malformed)"
            )));
        }

        let mut index = Self::from_entries(entries, rules)?;
        index.summary.skipped = skipped;
        Ok(index)
    }

    pub fn from_entries(entries: Vec<KbEntry>, rules: &MatchingRules) -> Result<Self> {
        if entries.is_empty() {
            return Err(MatcherError::EmptyCorpus("no entries supplied".to_string()));
        }

        let mut indexed = Vec::with_capacity(entries.len());
        let mut by_unit_class: IndexMap<UnitClass, Vec<usize>> = IndexMap::new();
        let mut summary = KbSummary::default();

        for (position, entry) in entries.into_iter().enumerate() {
            by_unit_class.entry(entry.unit.class()).or_default().push(position);
            *summary
                .by_discipline
                .entry(entry.discipline.label().to_string())
                .or_insert(0) += 1;
            indexed.push(IndexedEntry::new(entry, position, rules));
        }
        summary.entries = indexed.len();

        tracing::info!(
            "KB index built: {} entries, {} unit classes, {} disciplines",
            summary.entries,
            by_unit_class.len(),
            summary.by_discipline.len()
        );

        Ok(Self {
            entries: indexed,
            by_unit_class,
            summary,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &KbSummary {
        &self.summary
    }

    /// 与给定单位同一兼容类的条目 (语料顺序)
    pub fn entries_in_unit_class<'a>(&'a self, unit: &Unit) -> impl Iterator<Item = &'a IndexedEntry> + 'a {
        self.by_unit_class
            .get(&unit.class())
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Discipline;

    fn raw(id: &str, desc: &str, unit: &str, price: i64) -> RawKbRecord {
        RawKbRecord {
            item_id: Some(id.into()),
            description: Some(desc.into()),
            discipline: Some("ガス設備工事".into()),
            unit: Some(unit.into()),
            unit_price: Some(price.into()),
            ..Default::default()
        }
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rules = MatchingRules::builtin().unwrap();
        let mut broken = raw("KB-X", "白ガス管", "m", 100);
        broken.unit_price = None;

        let index = KbIndex::build(vec![raw("KB-1", "白ガス管", "m", 8990), broken], &rules).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.summary().skipped, 1);
        assert_eq!(index.summary().by_discipline.get("ガス設備工事"), Some(&1));
    }

    #[test]
    fn empty_corpus_is_fatal() {
        let rules = MatchingRules::builtin().unwrap();
        let err = KbIndex::build(Vec::new(), &rules).unwrap_err();
        assert!(matches!(err, MatcherError::EmptyCorpus(_)));

        let err = KbIndex::build(vec![RawKbRecord::default()], &rules).unwrap_err();
        assert!(matches!(err, MatcherError::EmptyCorpus(_)));
    }

    #[test]
    fn entries_are_prepared() {
        let rules = MatchingRules::builtin().unwrap();
        let mut record = raw("KB-1", "白ガス管", "m", 8990);
        record.features.specification = Some("15A".into());
        let index = KbIndex::build(vec![record], &rules).unwrap();

        let e = &index.entries()[0];
        assert_eq!(e.entry.discipline, Discipline::GasWorks);
        assert_eq!(e.size.as_ref().map(ToString::to_string).as_deref(), Some("15A"));
        assert_eq!(e.category, Some(Category::WhiteGasPipe));
        assert!(e.synonyms.contains("sgp"));
    }

    #[test]
    fn unit_class_buckets() {
        let rules = MatchingRules::builtin().unwrap();
        let index = KbIndex::build(
            vec![raw("A", "白ガス管", "m", 1), raw("B", "ガスコンセント", "個", 1), raw("C", "ネジコック", "セット", 1)],
            &rules,
        )
        .unwrap();

        let pieces: Vec<_> = index
            .entries_in_unit_class(&Unit::parse("箇所"))
            .map(|e| e.entry.item_id.as_str())
            .collect();
        assert_eq!(pieces, vec!["B", "C"]);
        assert_eq!(index.entries_in_unit_class(&Unit::parse("式")).count(), 0);
    }
}
