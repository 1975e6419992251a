//! 单价知识库: 读取、「同上」修复、构建只读索引

pub mod index;
pub mod loader;
pub mod repair;

pub use index::{IndexedEntry, KbIndex, KbSummary};
pub use loader::{load_corpus, read_csv, read_json};
pub use repair::{resolve_ditto_rows, RepairStats};

use crate::error::Result;
use crate::rules::MatchingRules;
use std::path::Path;

/// 读取文件并构建索引 (启动时调用一次)
pub fn load_index(path: &Path, repair_ditto: bool, rules: &MatchingRules) -> Result<KbIndex> {
    let mut rows = load_corpus(path)?;
    if repair_ditto {
        rows = resolve_ditto_rows(rows).0;
    }
    KbIndex::build(rows, rules)
}
