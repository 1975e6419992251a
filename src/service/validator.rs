//! 单价合理性校验 (流水线第 6 阶段)
//!
//! 一式条目: 低于品类最低价时降级。启用 `enforce_ceilings` 时, 其他单位高于品类单价上限也降级。
//! 降级后 accepted = false, 单价不采用, 置信度按系数缩减。

use crate::models::{MatchOutcome, MatchResult, RejectionReason};
use crate::rules::{PriceBound, PriceBounds, Thresholds};
use crate::service::prepare::PreparedItem;
use crate::service::selector::Selection;

/// 违反的边界
#[derive(Debug, Clone, PartialEq)]
pub enum Violation<'a> {
    BelowFloor(PriceBound<'a>),
    AboveCeiling(PriceBound<'a>),
}

/// 检查被采用条目的单价
pub fn check<'a>(item: &PreparedItem<'_>, selection: &Selection<'_>, bounds: &'a PriceBounds) -> Option<Violation<'a>> {
    let entry = selection.entry?;
    let price = &entry.entry.unit_price;
    let name = item.name.text.as_str();

    if entry.entry.unit.is_lump_sum() {
        bounds
            .floor_for(name)
            .filter(|floor| price < floor.price)
            .map(Violation::BelowFloor)
    } else if bounds.enforces_ceilings() {
        bounds
            .ceiling_for(name)
            .filter(|ceiling| price > ceiling.price)
            .map(Violation::AboveCeiling)
    } else {
        None
    }
}

pub fn validate(
    item: &PreparedItem<'_>,
    selection: Selection<'_>,
    bounds: &PriceBounds,
    thresholds: &Thresholds,
) -> MatchResult {
    let Some(violation) = check(item, &selection, bounds) else {
        return selection.result;
    };

    let mut result = selection.result;
    match &violation {
        Violation::BelowFloor(floor) => tracing::warn!(
            "⚠ {} 「{}」: 一式単価 ¥{} < 下限 ¥{} ({}), downgraded",
            result.line_item_id,
            item.item.name,
            result.matched_unit_price.as_ref().map(ToString::to_string).unwrap_or_default(),
            floor.price,
            floor.keyword
        ),
        Violation::AboveCeiling(ceiling) => tracing::warn!(
            "⚠ {} 「{}」: 単価 ¥{} > 上限 ¥{} ({}), downgraded",
            result.line_item_id,
            item.item.name,
            result.matched_unit_price.as_ref().map(ToString::to_string).unwrap_or_default(),
            ceiling.price,
            ceiling.keyword
        ),
    }

    result.accepted = false;
    result.matched_unit_price = None;
    result.confidence = result.normalized_score * thresholds.downgrade_factor;
    result.outcome = MatchOutcome::Downgraded;
    result.rejection_reason = Some(RejectionReason::PriceImplausible);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KbIndex;
    use crate::models::{EntryFeatures, KbEntry, LineItem};
    use crate::rules::MatchingRules;
    use crate::service::selector::{select, ScoredCandidate};
    use crate::service::scorer::score;
    use bigdecimal::BigDecimal;

    fn run(name: &str, kb_desc: &str, unit: &str, price: i64) -> MatchResult {
        run_with(MatchingRules::builtin().unwrap(), name, kb_desc, unit, price)
    }

    fn run_with(rules: MatchingRules, name: &str, kb_desc: &str, unit: &str, price: i64) -> MatchResult {
        let entry = KbEntry {
            item_id: "KB-1".into(),
            description: kb_desc.into(),
            discipline: "電気設備工事".to_string().into(),
            unit: unit.to_string().into(),
            unit_price: BigDecimal::from(price),
            features: EntryFeatures::default(),
            context_tags: Vec::new(),
            vendor: None,
            valid_from: None,
            source_project: None,
        };
        let idx = KbIndex::from_entries(vec![entry], &rules).unwrap();
        let item = LineItem::new("L1", name, "電気設備工事", unit, 2);
        let prepared = PreparedItem::new(&item, &rules);
        let candidates = idx
            .entries()
            .iter()
            .map(|e| ScoredCandidate {
                entry: e,
                breakdown: score(&prepared, e, &rules.weights),
            })
            .collect();
        let selection = select(&item.id, candidates, &rules.thresholds);
        validate(&prepared, selection, &rules.price_bounds, &rules.thresholds)
    }

    #[test]
    fn cheap_cubicle_is_downgraded() {
        let r = run("キュービクル", "キュービクル", "式", 150_000);
        assert!(!r.accepted);
        assert_eq!(r.outcome, MatchOutcome::Downgraded);
        assert_eq!(r.rejection_reason, Some(RejectionReason::PriceImplausible));
        assert_eq!(r.matched_kb_id.as_deref(), Some("KB-1"));
        assert!(r.matched_unit_price.is_none());
        assert!((r.confidence - r.normalized_score * 0.5).abs() < 1e-9);
    }

    #[test]
    fn plausible_cubicle_is_kept() {
        let r = run("キュービクル", "キュービクル", "式", 4_500_000);
        assert!(r.accepted);
        assert_eq!(r.matched_unit_price, Some(BigDecimal::from(4_500_000)));
    }

    #[test]
    fn exempt_and_unlisted_names_pass() {
        assert!(run("キュービクル点検", "キュービクル点検", "式", 30_000).accepted);
        assert!(run("幹線設備", "幹線設備", "式", 10_000).accepted);
    }

    #[test]
    fn per_unit_rates_are_not_checked_by_default() {
        let r = run("コンセント", "コンセント", "個", 250_000);
        assert!(r.accepted);
        assert_eq!(r.outcome, MatchOutcome::Accepted);
        assert_eq!(r.matched_unit_price, Some(BigDecimal::from(250_000)));
    }

    #[test]
    fn enabled_ceiling_applies_to_per_unit_rates() {
        let mut rules = MatchingRules::builtin().unwrap();
        rules.price_bounds = rules.price_bounds.enforcing_ceilings(true);

        let r = run_with(rules.clone(), "コンセント", "コンセント", "個", 250_000);
        assert_eq!(r.outcome, MatchOutcome::Downgraded);
        assert_eq!(r.rejection_reason, Some(RejectionReason::PriceImplausible));

        let r = run_with(rules.clone(), "コンセント", "コンセント", "個", 3_000);
        assert!(r.accepted);

        // lump sums stay governed by the floors only
        assert!(run_with(rules, "コンセント", "コンセント", "式", 250_000).accepted);
    }
}
