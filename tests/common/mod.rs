#![allow(dead_code)]

use bigdecimal::BigDecimal;
use kb_price_matcher::models::{EntryFeatures, KbEntry, LineItem};
use kb_price_matcher::{KbIndex, MatchingEngine, MatchingRules};

pub fn kb(id: &str, desc: &str, discipline: &str, unit: &str, spec: Option<&str>, price: i64) -> KbEntry {
    KbEntry {
        item_id: id.into(),
        description: desc.into(),
        discipline: discipline.to_string().into(),
        unit: unit.to_string().into(),
        unit_price: BigDecimal::from(price),
        features: EntryFeatures {
            specification: spec.map(String::from),
            quantity: None,
        },
        context_tags: Vec::new(),
        vendor: None,
        valid_from: None,
        source_project: None,
    }
}

/// 小型燃气/电气知识库
pub fn sample_corpus() -> Vec<KbEntry> {
    vec![
        kb("GAS-015", "白ガス管", "ガス設備工事", "m", Some("15A"), 8990),
        kb("GAS-020", "白ガス管", "ガス設備工事", "m", Some("20A"), 12500),
        kb("GAS-PE50", "PE管", "ガス設備工事", "m", Some("φ50"), 6200),
        kb("GAS-GC", "ガスコンセント", "ガス設備工事", "個", None, 4500),
        kb("GAS-NC", "ネジコック", "ガス設備工事", "個", None, 3800),
        kb("GAS-MTR", "ガスメーター取付", "ガス設備工事", "台", None, 18000),
        kb("ELE-CUB", "キュービクル", "電気設備工事", "式", None, 800_000),
        kb("ELE-CON", "コンセント", "電気設備工事", "個", None, 2800),
    ]
}

pub fn engine_with(entries: Vec<KbEntry>, rules: MatchingRules, workers: Option<usize>) -> MatchingEngine {
    let index = KbIndex::from_entries(entries, &rules).unwrap();
    MatchingEngine::new(index, rules, workers).unwrap()
}

pub fn sample_engine() -> MatchingEngine {
    engine_with(sample_corpus(), MatchingRules::builtin().unwrap(), None)
}

pub fn item(id: &str, name: &str, discipline: &str, unit: &str) -> LineItem {
    LineItem::new(id, name, discipline, unit, 2).with_quantity(1)
}
