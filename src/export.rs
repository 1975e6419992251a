use crate::error::Result;
use crate::models::{MatchOutcome, MatchResult, UnmatchedRecord};
use csv::Writer;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const RESULT_HEADER: [&str; 9] = [
    "line_item_id",
    "matched_kb_id",
    "matched_unit_price",
    "raw_score",
    "normalized_score",
    "accepted",
    "confidence",
    "outcome",
    "rejection_reason",
];

const UNMATCHED_HEADER: [&str; 5] = ["line_item_id", "name", "specification", "discipline", "reason"];

fn option_to_csv<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn outcome_label(result: &MatchResult) -> &'static str {
    match result.outcome {
        MatchOutcome::Accepted => "accepted",
        MatchOutcome::Downgraded => "downgraded",
        MatchOutcome::Unmatched => "unmatched",
    }
}

/// 匹配结果写为 CSV (含表头)
pub fn write_results<W: Write>(results: &[MatchResult], out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(RESULT_HEADER)?;

    for result in results {
        writer.write_record(&[
            result.line_item_id.clone(),
            option_to_csv(&result.matched_kb_id),
            option_to_csv(&result.matched_unit_price),
            format!("{:.4}", result.raw_score),
            format!("{:.4}", result.normalized_score),
            result.accepted.to_string(),
            format!("{:.4}", result.confidence),
            outcome_label(result).to_string(),
            option_to_csv(&result.rejection_reason),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn results_to_csv(results: &[MatchResult]) -> Result<String> {
    let mut buf = Vec::new();
    write_results(results, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 未匹配日志写为 CSV
pub fn write_unmatched<W: Write>(records: &[UnmatchedRecord], out: W, with_header: bool) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    if with_header {
        writer.write_record(UNMATCHED_HEADER)?;
    }

    for record in records {
        writer.write_record(&[
            record.line_item_id.clone(),
            record.name.clone(),
            option_to_csv(&record.specification),
            record.discipline.clone(),
            option_to_csv(&record.reason),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 追加到未匹配日志文件; 新文件 (或空文件) 先写表头
pub fn append_unmatched_log(path: &Path, records: &[UnmatchedRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;
    write_unmatched(records, file, is_new)?;
    tracing::info!("Appended {} unmatched items to {:?}", records.len(), path);
    Ok(())
}
