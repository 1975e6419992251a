use crate::error::Result;
use crate::kb::KbIndex;
use crate::models::{LineItem, MatchOutcome, MatchResult, UnmatchedRecord};
use crate::rules::MatchingRules;
use crate::service::filter::filter;
use crate::service::prepare::PreparedItem;
use crate::service::scorer::score;
use crate::service::selector::{select, ScoredCandidate};
use crate::service::validator::validate;
use rayon::prelude::*;
use serde::Serialize;

/// 批次统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub accepted: usize,
    pub downgraded: usize,
    pub unmatched: usize,
}

impl BatchStats {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.outcome {
                MatchOutcome::Accepted => stats.accepted += 1,
                MatchOutcome::Downgraded => stats.downgraded += 1,
                MatchOutcome::Unmatched => stats.unmatched += 1,
            }
        }
        stats
    }
}

/// `enrich` 的结果: 提交明细的匹配结果 (输入顺序) + 未匹配日志
#[derive(Debug, Clone, Serialize)]
pub struct EnrichReport {
    pub results: Vec<MatchResult>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub stats: BatchStats,
}

/// 匹配引擎: 持有只读索引与规则, 可在多个线程间共享
#[derive(Debug)]
pub struct MatchingEngine {
    index: KbIndex,
    rules: MatchingRules,
    pool: Option<rayon::ThreadPool>,
}

impl MatchingEngine {
    /// `worker_threads` 为 None 时使用 rayon 全局线程池
    pub fn new(index: KbIndex, rules: MatchingRules, worker_threads: Option<usize>) -> Result<Self> {
        let pool = match worker_threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };
        tracing::info!(
            "MatchingEngine ready: {} KB entries, rules v{}, workers {}",
            index.len(),
            rules.version,
            worker_threads.map_or_else(|| "global".to_string(), |n| n.to_string())
        );
        Ok(Self { index, rules, pool })
    }

    pub fn index(&self) -> &KbIndex {
        &self.index
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// 单条明细: 规范化 -> 过滤 -> 评分 -> 选择 -> 单价校验
    pub fn match_item(&self, item: &LineItem) -> MatchResult {
        let prepared = PreparedItem::new(item, &self.rules);

        let candidates: Vec<ScoredCandidate<'_>> = filter(&prepared, &self.index)
            .into_iter()
            .map(|entry| {
                let breakdown = score(&prepared, entry, &self.rules.weights);
                tracing::debug!(
                    "{} x {}: raw={:.2} normalized={:.3} ({:?})",
                    item.id,
                    entry.entry.item_id,
                    breakdown.raw,
                    breakdown.normalized(),
                    breakdown.name
                );
                ScoredCandidate { entry, breakdown }
            })
            .collect();

        let selection = select(&item.id, candidates, &self.rules.thresholds);
        let result = validate(&prepared, selection, &self.rules.price_bounds, &self.rules.thresholds);

        match result.outcome {
            MatchOutcome::Accepted => tracing::info!(
                "✓ {} 「{}」 -> {} ¥{} (score {:.2}/{:.3})",
                item.id,
                item.name,
                result.matched_kb_id.as_deref().unwrap_or_default(),
                result.matched_unit_price.as_ref().map(ToString::to_string).unwrap_or_default(),
                result.raw_score,
                result.normalized_score
            ),
            MatchOutcome::Unmatched => tracing::warn!(
                "✗ {} 「{}」 unmatched: {}",
                item.id,
                item.name,
                result.rejection_reason.map(|r| r.as_str()).unwrap_or_default()
            ),
            // 降级已在校验阶段记录
            MatchOutcome::Downgraded => {}
        }
        result
    }

    fn run<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// 批量匹配; 并行执行, 结果顺序与输入一致
    pub fn match_batch(&self, items: &[LineItem]) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = self.run(|| items.par_iter().map(|item| self.match_item(item)).collect());
        log_summary(&BatchStats::from_results(&results));
        results
    }

    /// 只提交可计价明细 (level > 0 且有数量), 并把结果写回明细
    pub fn enrich(&self, items: &mut [LineItem]) -> EnrichReport {
        let submitted: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_priceable())
            .map(|(i, _)| i)
            .collect();

        let results: Vec<MatchResult> = {
            let items: &[LineItem] = items;
            self.run(|| {
                submitted
                    .par_iter()
                    .map(|&i| self.match_item(&items[i]))
                    .collect()
            })
        };

        for (&i, result) in submitted.iter().zip(&results) {
            items[i].apply_match(result);
        }

        let unmatched: Vec<UnmatchedRecord> = submitted
            .iter()
            .zip(&results)
            .filter_map(|(&i, result)| unmatched_record(&items[i], result))
            .collect();
        let stats = BatchStats::from_results(&results);
        log_summary(&stats);
        if submitted.len() < items.len() {
            tracing::info!("跳过 {} 条标题/无数量明细", items.len() - submitted.len());
        }

        EnrichReport {
            results,
            unmatched,
            stats,
        }
    }
}

fn log_summary(stats: &BatchStats) {
    let rate = if stats.total > 0 {
        stats.accepted as f64 / stats.total as f64 * 100.0
    } else {
        0.0
    };
    tracing::info!(
        "匹配完成: matched {}/{} ({:.1}%), downgraded {}, unmatched {}",
        stats.accepted,
        stats.total,
        rate,
        stats.downgraded,
        stats.unmatched
    );
}

/// 未匹配/降级明细记录 (结果顺序)
///
/// `items` 为提交匹配的明细, 与 `results` 按位置一一对应 (即 `match_batch` 的输入)。
pub fn unmatched_log(items: &[LineItem], results: &[MatchResult]) -> Vec<UnmatchedRecord> {
    items
        .iter()
        .zip(results)
        .filter_map(|(item, result)| unmatched_record(item, result))
        .collect()
}

fn unmatched_record(item: &LineItem, result: &MatchResult) -> Option<UnmatchedRecord> {
    if result.outcome == MatchOutcome::Accepted {
        return None;
    }
    Some(UnmatchedRecord {
        line_item_id: result.line_item_id.clone(),
        name: item.name.clone(),
        specification: item.specification.clone(),
        discipline: item.discipline.label().to_string(),
        reason: result.rejection_reason,
    })
}
