//! 类义词扩展 (流水线第 2 阶段)
//!
//! 每个词典条目 (标准词 + 同义写法) 构成一个封闭的等价组。
//! 扩展只合并直接包含该词的组, 不跨组传递 (A→B→C)。

use crate::service::normalizer::canonicalize;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::collections::HashMap;

/// 类义词典 (不可变, 加载后传入引擎)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "IndexMap<String, Vec<String>>")]
pub struct SynonymDict {
    /// 规范化后的等价组, 标准词在首位
    groups: Vec<Vec<String>>,
    /// 规范化词 -> 所属组下标 (升序)
    membership: HashMap<String, Vec<usize>>,
    /// 没有任何同义写法的条目 (原始标准词)
    empty_groups: Vec<String>,
}

impl SynonymDict {
    pub fn new<K, V, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, Vec<V>)>,
    {
        let mut dict = Self::default();
        for (canonical, forms) in entries {
            if forms.iter().all(|f| canonicalize(f.as_ref()).is_empty()) {
                dict.empty_groups.push(canonical.as_ref().to_string());
            }

            let mut group: IndexSet<String> = IndexSet::new();
            group.insert(canonicalize(canonical.as_ref()));
            for form in &forms {
                group.insert(canonicalize(form.as_ref()));
            }
            group.retain(|term| !term.is_empty());
            if group.is_empty() {
                continue;
            }

            let idx = dict.groups.len();
            for term in &group {
                dict.membership.entry(term.clone()).or_default().push(idx);
            }
            dict.groups.push(group.into_iter().collect());
        }
        dict
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 每个条目至少要有一个非空的同义写法
    pub fn validate(&self) -> Result<(), String> {
        match self.empty_groups.first() {
            Some(term) => Err(format!("synonym group '{term}' has no synonyms")),
            None => Ok(()),
        }
    }

    /// 扩展为等价词集合 (总是包含规范化后的原词; 未收录时返回单元素集合)
    pub fn expand(&self, term: &str) -> IndexSet<String> {
        let term = canonicalize(term);
        let mut expanded = IndexSet::new();
        expanded.insert(term.clone());

        if let Some(group_ids) = self.membership.get(&term) {
            for &idx in group_ids {
                expanded.extend(self.groups[idx].iter().cloned());
            }
        }
        expanded
    }

    /// 两个词是否属于同一个等价组
    pub fn are_synonyms(&self, a: &str, b: &str) -> bool {
        let b = canonicalize(b);
        self.expand(a).contains(&b)
    }
}

impl From<IndexMap<String, Vec<String>>> for SynonymDict {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        Self::new(map)
    }
}
