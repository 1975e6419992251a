//! 最优候选选择 (流水线第 5 阶段)

use crate::kb::IndexedEntry;
use crate::models::{MatchOutcome, MatchResult, RejectionReason};
use crate::rules::Thresholds;
use crate::service::scorer::ScoreBreakdown;
use std::cmp::Ordering;

/// 已评分的候选
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'k> {
    pub entry: &'k IndexedEntry,
    pub breakdown: ScoreBreakdown,
}

/// 选择结果; 采用时附带被选中的条目 (供单价校验使用)
#[derive(Debug, Clone)]
pub struct Selection<'k> {
    pub result: MatchResult,
    pub entry: Option<&'k IndexedEntry>,
}

/// 双阈值: 任一通过即采用
pub fn is_accepted(raw: f64, normalized: f64, thresholds: &Thresholds) -> bool {
    raw >= thresholds.min_raw_score || normalized >= thresholds.min_normalized_score
}

/// 候选的全序: raw 降序, normalized 降序, 有效日期新者优先 (无日期排后),
/// 描述字数少者优先, 描述字典序, item_id 字典序, 语料位置
pub fn compare(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.breakdown
        .raw
        .total_cmp(&a.breakdown.raw)
        .then_with(|| b.breakdown.normalized().total_cmp(&a.breakdown.normalized()))
        .then_with(|| match (&a.entry.entry.valid_from, &b.entry.entry.valid_from) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            a.entry
                .description
                .text
                .chars()
                .count()
                .cmp(&b.entry.description.text.chars().count())
        })
        .then_with(|| a.entry.description.text.cmp(&b.entry.description.text))
        .then_with(|| a.entry.entry.item_id.cmp(&b.entry.entry.item_id))
        .then_with(|| a.entry.position.cmp(&b.entry.position))
}

pub fn select<'k>(line_item_id: &str, candidates: Vec<ScoredCandidate<'k>>, thresholds: &Thresholds) -> Selection<'k> {
    let Some(best) = candidates.into_iter().min_by(compare) else {
        return Selection {
            result: MatchResult::no_candidate(line_item_id),
            entry: None,
        };
    };

    let raw = best.breakdown.raw;
    let normalized = best.breakdown.normalized();

    if is_accepted(raw, normalized, thresholds) {
        Selection {
            result: MatchResult {
                line_item_id: line_item_id.to_string(),
                matched_kb_id: Some(best.entry.entry.item_id.clone()),
                matched_unit_price: Some(best.entry.entry.unit_price.clone()),
                raw_score: raw,
                normalized_score: normalized,
                accepted: true,
                confidence: normalized,
                outcome: MatchOutcome::Accepted,
                rejection_reason: None,
            },
            entry: Some(best.entry),
        }
    } else {
        Selection {
            result: MatchResult {
                line_item_id: line_item_id.to_string(),
                matched_kb_id: None,
                matched_unit_price: None,
                raw_score: raw,
                normalized_score: normalized,
                accepted: false,
                confidence: normalized,
                outcome: MatchOutcome::Unmatched,
                rejection_reason: Some(RejectionReason::BelowThreshold),
            },
            entry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KbIndex;
    use crate::models::{EntryFeatures, KbEntry};
    use crate::rules::MatchingRules;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn kb_entry(id: &str, desc: &str, valid_from: Option<NaiveDate>) -> KbEntry {
        KbEntry {
            item_id: id.into(),
            description: desc.into(),
            discipline: "ガス設備工事".to_string().into(),
            unit: "m".to_string().into(),
            unit_price: BigDecimal::from(100),
            features: EntryFeatures::default(),
            context_tags: Vec::new(),
            vendor: None,
            valid_from,
            source_project: None,
        }
    }

    fn breakdown(raw: f64, max_possible: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            name: None,
            category: false,
            specification: false,
            size: false,
            unit: false,
            raw,
            max_possible,
        }
    }

    #[test]
    fn threshold_boundary() {
        let t = Thresholds::default();
        assert!(is_accepted(1.0, 0.2, &t));
        assert!(is_accepted(0.5, 0.5, &t));
        assert!(!is_accepted(0.99, 0.49, &t));
    }

    #[test]
    fn empty_candidates_is_no_candidate() {
        let s = select("L1", Vec::new(), &Thresholds::default());
        assert_eq!(s.result.rejection_reason, Some(RejectionReason::NoCandidate));
        assert_eq!(s.result.confidence, 0.0);
        assert!(s.entry.is_none());
    }

    #[test]
    fn below_threshold_has_no_kb_id() {
        let rules = MatchingRules::builtin().unwrap();
        let idx = KbIndex::from_entries(vec![kb_entry("A", "白ガス管", None)], &rules).unwrap();
        let candidates = vec![ScoredCandidate {
            entry: &idx.entries()[0],
            breakdown: breakdown(0.99, 2.02),
        }];
        let s = select("L1", candidates, &Thresholds::default());
        assert!(!s.result.accepted);
        assert_eq!(s.result.outcome, MatchOutcome::Unmatched);
        assert_eq!(s.result.rejection_reason, Some(RejectionReason::BelowThreshold));
        assert!(s.result.matched_kb_id.is_none());
        assert!(s.result.matched_unit_price.is_none());
    }

    #[test]
    fn tie_break_order() {
        let rules = MatchingRules::builtin().unwrap();
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd);
        let idx = KbIndex::from_entries(
            vec![
                kb_entry("old", "白ガス管", d(2020, 1, 1)),
                kb_entry("undated", "白ガス管", None),
                kb_entry("new-long", "白ガス管 ねじ", d(2024, 1, 1)),
                kb_entry("new-b", "白ガス管", d(2024, 1, 1)),
                kb_entry("new-a", "白ガス管", d(2024, 1, 1)),
            ],
            &rules,
        )
        .unwrap();

        let mut candidates: Vec<_> = idx
            .entries()
            .iter()
            .map(|e| ScoredCandidate {
                entry: e,
                breakdown: breakdown(2.5, 3.5),
            })
            .collect();
        candidates.sort_by(compare);
        let order: Vec<_> = candidates.iter().map(|c| c.entry.entry.item_id.as_str()).collect();
        assert_eq!(order, vec!["new-a", "new-b", "new-long", "old", "undated"]);

        // raw dominates everything else
        candidates[4].breakdown = breakdown(3.0, 3.5);
        let s = select("L1", candidates, &Thresholds::default());
        assert_eq!(s.result.matched_kb_id.as_deref(), Some("undated"));
    }
}
