use crate::error::{MatcherError, Result};
use crate::models::{parse_decimal, RawFeatures, RawKbRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// 按扩展名读取知识库文件 (.json 数组 / .csv)
pub fn load_corpus(path: &Path) -> Result<Vec<RawKbRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let file = File::open(path).map_err(|e| MatcherError::KbLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let reader = BufReader::new(file);

    let records = match ext.as_deref() {
        Some("json") => read_json(reader),
        Some("csv") => read_csv(reader),
        _ => return Err(MatcherError::UnsupportedFormat(path.to_path_buf())),
    }
    .map_err(|e| MatcherError::KbLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!("Read {} KB rows from {:?}", records.len(), path);
    Ok(records)
}

/// JSON 数组; 无法解析为对象的元素跳过
pub fn read_json<R: Read>(reader: R) -> Result<Vec<RawKbRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut records = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawKbRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping unreadable KB row {}: {}", i + 1, e),
        }
    }
    Ok(records)
}

/// CSV 平铺行 (context_tags 以 ';' 分隔)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvKbRow {
    item_id: Option<String>,
    description: Option<String>,
    discipline: Option<String>,
    unit: Option<String>,
    unit_price: Option<String>,
    specification: Option<String>,
    quantity: Option<String>,
    context_tags: Option<String>,
    vendor: Option<String>,
    valid_from: Option<String>,
    source_project: Option<String>,
}

impl From<CsvKbRow> for RawKbRecord {
    fn from(row: CsvKbRow) -> Self {
        Self {
            item_id: row.item_id,
            description: row.description,
            discipline: row.discipline,
            unit: row.unit,
            unit_price: row.unit_price.as_deref().and_then(parse_decimal),
            features: RawFeatures {
                specification: row.specification,
                quantity: row.quantity.as_deref().and_then(parse_decimal),
            },
            context_tags: row
                .context_tags
                .map(|tags| {
                    tags.split(';')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            vendor: row.vendor,
            valid_from: row.valid_from,
            source_project: row.source_project,
        }
    }
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawKbRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<CsvKbRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into()),
            Err(e) => tracing::warn!("Skipping unreadable KB row {}: {}", i + 2, e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::io::Write;

    #[test]
    fn reads_csv_rows() {
        let data = "\
item_id,description,discipline,unit,unit_price,specification,quantity,context_tags,vendor,valid_from,source_project
KB-1,白ガス管,ガス設備工事,m,\"8,990\",15A,12,屋外;露出,東邦,2024-04-01,A邸
KB-2,ガスコンセント,ガス設備工事,個,¥4500,,,,,,
";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].unit_price, Some(BigDecimal::from(8990)));
        assert_eq!(rows[0].features.specification.as_deref(), Some("15A"));
        assert_eq!(rows[0].context_tags, vec!["屋外", "露出"]);
        assert_eq!(rows[1].unit_price, Some(BigDecimal::from(4500)));
        assert!(rows[1].context_tags.is_empty());
    }

    #[test]
    fn csv_with_missing_columns_still_loads() {
        let data = "item_id,description,discipline,unit,unit_price\nKB-1,キュービクル,電気設備工事,式,1200000\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].vendor.is_none());
    }

    #[test]
    fn json_skips_non_object_rows() {
        let data = r#"[{"item_id": "KB-1", "unit_price": 100}, 42, {"item_id": "KB-2"}]"#;
        let rows = read_json(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"item_id": "KB-1", "description": "白ガス管"}}]"#).unwrap();
        assert_eq!(load_corpus(file.path()).unwrap().len(), 1);

        let other = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(load_corpus(other.path()), Err(MatcherError::UnsupportedFormat(_))));

        assert!(matches!(
            load_corpus(Path::new("/nonexistent/kb.json")),
            Err(MatcherError::KbLoad { .. })
        ));
    }
}
