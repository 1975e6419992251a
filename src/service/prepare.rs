use crate::models::LineItem;
use crate::rules::{Category, MatchingRules};
use crate::service::normalizer::{normalize, record_size, NormalizedText, SizeToken};
use indexmap::IndexSet;

/// 规范化后的明细 (每条明细只计算一次, 与所有候选比较)
#[derive(Debug, Clone)]
pub struct PreparedItem<'a> {
    pub item: &'a LineItem,
    pub name: NormalizedText,
    pub specification: Option<NormalizedText>,
    pub size: Option<SizeToken>,
    pub category: Option<Category>,
    pub synonyms: IndexSet<String>,
}

impl<'a> PreparedItem<'a> {
    pub fn new(item: &'a LineItem, rules: &MatchingRules) -> Self {
        let name = normalize(&item.name);
        let specification = item
            .specification
            .as_deref()
            .map(normalize)
            .filter(|s| !s.is_empty());
        let size = record_size(&name, specification.as_ref());
        let category = Category::of(&name.text);
        let synonyms = if name.stem.is_empty() {
            IndexSet::new()
        } else {
            rules.synonyms.expand(&name.stem)
        };

        Self {
            item,
            name,
            specification,
            size,
            category,
            synonyms,
        }
    }
}
