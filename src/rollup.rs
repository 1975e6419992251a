//! 金额汇总 (匹配之后的下游处理)
//!
//! 明细金额 = 采用单价 × 数量; 父项金额 = 直接子项之和; 法定福利费 = 労務費 × 16.07%

use crate::models::{CostType, LineItem};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;

/// 法定福利费率 (万分比)
const WELFARE_RATE_BP: i64 = 1607;

/// 已定价明细写入金额, 返回写入条数
pub fn apply_leaf_amounts(items: &mut [LineItem]) -> usize {
    let mut count = 0;
    for item in items.iter_mut() {
        if let (Some(price), Some(qty)) = (&item.matched_price, &item.quantity) {
            item.amount = Some(price * qty);
            count += 1;
        }
    }
    count
}

/// 按工事区分分组, 从深层到浅层把直接子项金额汇总到父项
pub fn calculate_parent_amounts(items: &mut [LineItem]) {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, item) in items.iter().enumerate() {
        groups
            .entry(item.discipline.label().to_string())
            .or_default()
            .push(i);
    }

    for (discipline, members) in &groups {
        let Some(max_level) = members.iter().map(|&i| items[i].level).max() else {
            continue;
        };

        for target in (0..max_level).rev() {
            for (pos, &i) in members.iter().enumerate() {
                if items[i].level != target {
                    continue;
                }

                let mut sum = BigDecimal::zero();
                let mut has_children = false;
                for &j in &members[pos + 1..] {
                    let child = &items[j];
                    if child.level <= target {
                        break;
                    }
                    if child.level == target + 1 {
                        has_children = true;
                        if let Some(amount) = &child.amount {
                            sum += amount;
                        }
                    }
                }

                if has_children && sum > BigDecimal::zero() {
                    tracing::debug!("  {} L{} 「{}」: ¥{}", discipline, target, items[i].name, sum);
                    items[i].amount = Some(sum);
                    items[i].matched_price = None;
                }
            }
        }

        let total = members
            .iter()
            .filter(|&&i| items[i].level == 0)
            .filter_map(|&i| items[i].amount.as_ref())
            .fold(BigDecimal::zero(), |acc, a| acc + a);
        tracing::info!("工事区分 '{}' 合計: ¥{}", discipline, total);
    }
}

/// 法定福利费: 労務費金额合计 × 16.07%, 四舍五入到円
pub fn statutory_welfare(items: &[LineItem]) -> BigDecimal {
    let labor = items
        .iter()
        .filter(|item| item.cost_type == Some(CostType::Labor))
        .filter_map(|item| item.amount.as_ref())
        .fold(BigDecimal::zero(), |acc, a| acc + a);

    (labor * BigDecimal::from(WELFARE_RATE_BP) / BigDecimal::from(10_000)).round(0)
}
