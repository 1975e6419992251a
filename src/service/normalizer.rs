//! 文本规范化 (流水线第 1 阶段)
//!
//! 全角/半角折叠、编码残留替换、符号去除以及规格尺寸 (15A, φ50 等) 提取。
//! 纯函数, 不依赖知识库或词典, 且幂等: `normalize(normalize(x).text) == normalize(x)`。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// 固定的编码残留/缩写替换表 (NFKC 之后应用)
const ARTIFACTS: &[(&str, &str)] = &[
    ("ヶ所", "箇所"),
    ("ケ所", "箇所"),
    ("カ所", "箇所"),
    ("ヵ所", "箇所"),
    ("個所", "箇所"),
    ("ø", "φ"),
    ("⌀", "φ"),
];

/// 直接删除的连接符号 (SUS-304 -> sus304)
const JOINERS: &[char] = &[
    '・', '/', '\\', '-', '_', '‐', '‑', '‒', '–', '—', '―', '~', '〜', '*', '#', '\'', '"', '`',
];

/// 替换为空格的分隔符号
const SEPARATORS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '<', '>', '「', '」', '『', '』', '【', '】', '〔', '〕', ',', '、',
    '。', ';', ':', '!', '?', '※', '+', '=', '|',
];

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"φ\s*(\d+(?:\.\d+)?)|(\d+(?:\.\d+)?)\s*(kva|mm|cm|sq|a)").expect("valid size pattern")
});

/// 尺寸单位后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    /// 公称口径 (15A)
    Nominal,
    /// 外径 (φ50)
    Diameter,
    Millimetre,
    Centimetre,
    /// 电缆截面积 (5.5sq)
    SquareMillimetre,
    KiloVoltAmpere,
}

/// 规格尺寸标记: 数值 + 单位后缀
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeToken {
    pub magnitude: String,
    pub unit: SizeUnit,
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            SizeUnit::Nominal => write!(f, "{}A", self.magnitude),
            SizeUnit::Diameter => write!(f, "φ{}", self.magnitude),
            SizeUnit::Millimetre => write!(f, "{}mm", self.magnitude),
            SizeUnit::Centimetre => write!(f, "{}cm", self.magnitude),
            SizeUnit::SquareMillimetre => write!(f, "{}sq", self.magnitude),
            SizeUnit::KiloVoltAmpere => write!(f, "{}kVA", self.magnitude),
        }
    }
}

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedText {
    /// 规范化后的完整文本
    pub text: String,
    /// 去除尺寸标记后的文本 (用于名称比较)
    pub stem: String,
    /// 第一个尺寸标记
    pub size: Option<SizeToken>,
}

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// 规范化文本并提取尺寸标记
pub fn normalize(text: &str) -> NormalizedText {
    let text = canonicalize(text);
    let (stem, size) = split_size(&text);
    NormalizedText { text, stem, size }
}

/// 仅做字符层面的规范化 (不提取尺寸)
///
/// 折叠 -> 去符号 -> 再折叠 -> 残留替换。去掉连接符后相邻字符可能重新组合
/// (`ｶ-ﾞ` -> `ガ`) 或拼出新的残留 (`ヶ・所` -> `箇所`), 因此重复执行直到文本不再变化。
pub fn canonicalize(text: &str) -> String {
    let mut current = canonical_pass(text);
    for _ in 0..MAX_PASSES {
        let next = canonical_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

const MAX_PASSES: usize = 4;

fn fold(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase().nfkc().collect()
}

fn canonical_pass(text: &str) -> String {
    let stripped: String = fold(text)
        .chars()
        .filter(|c| !JOINERS.contains(c))
        .map(|c| if SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();

    let mut replaced = fold(&stripped);
    for (from, to) in ARTIFACTS {
        if replaced.contains(from) {
            replaced = replaced.replace(from, to);
        }
    }

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 在已规范化的文本中查找所有尺寸标记及其字节区间
fn find_sizes(text: &str) -> Vec<(std::ops::Range<usize>, SizeToken)> {
    let mut found = Vec::new();
    for caps in SIZE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        // 后缀后紧跟字母时不是尺寸 (例如 "10amp")
        if text[whole.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        {
            continue;
        }

        let token = if let Some(m) = caps.get(1) {
            SizeToken {
                magnitude: m.as_str().to_string(),
                unit: SizeUnit::Diameter,
            }
        } else {
            let (Some(m), Some(suffix)) = (caps.get(2), caps.get(3)) else {
                continue;
            };
            let unit = match suffix.as_str() {
                "kva" => SizeUnit::KiloVoltAmpere,
                "mm" => SizeUnit::Millimetre,
                "cm" => SizeUnit::Centimetre,
                "sq" => SizeUnit::SquareMillimetre,
                _ => SizeUnit::Nominal,
            };
            SizeToken {
                magnitude: m.as_str().to_string(),
                unit,
            }
        };
        found.push((whole.range(), token));
    }
    found
}

fn split_size(text: &str) -> (String, Option<SizeToken>) {
    let sizes = find_sizes(text);
    if sizes.is_empty() {
        return (text.to_string(), None);
    }

    let mut stem = String::with_capacity(text.len());
    let mut last = 0;
    for (range, _) in &sizes {
        stem.push_str(&text[last..range.start]);
        stem.push(' ');
        last = range.end;
    }
    stem.push_str(&text[last..]);

    let stem = stem.split_whitespace().collect::<Vec<_>>().join(" ");
    let first = sizes.into_iter().next().map(|(_, token)| token);
    (stem, first)
}

/// 记录的尺寸标记: 优先取规格, 其次取名称
pub fn record_size(name: &NormalizedText, spec: Option<&NormalizedText>) -> Option<SizeToken> {
    spec.and_then(|s| s.size.clone()).or_else(|| name.size.clone())
}
