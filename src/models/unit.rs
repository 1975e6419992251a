use crate::service::normalizer::canonicalize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单位的兼容类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitClass {
    Length,
    Area,
    Volume,
    Weight,
    /// 个数类 (個, 本, 箇所, 組, セット ...)
    Piece,
    /// 机器类 (台, 基, 面)
    Equipment,
    /// 一式
    LumpSum,
    Labor,
    Other,
}

/// (别名, 标准单位, 类别); 别名为规范化后的形式
const UNIT_TABLE: &[(&str, &str, UnitClass)] = &[
    ("m", "m", UnitClass::Length),
    ("メートル", "m", UnitClass::Length),
    ("米", "m", UnitClass::Length),
    ("m2", "m2", UnitClass::Area),
    ("平米", "m2", UnitClass::Area),
    ("m3", "m3", UnitClass::Volume),
    ("立米", "m3", UnitClass::Volume),
    ("kg", "kg", UnitClass::Weight),
    ("t", "t", UnitClass::Weight),
    ("トン", "t", UnitClass::Weight),
    ("個", "個", UnitClass::Piece),
    ("ヶ", "個", UnitClass::Piece),
    ("本", "本", UnitClass::Piece),
    ("箇所", "箇所", UnitClass::Piece),
    ("点", "点", UnitClass::Piece),
    ("口", "口", UnitClass::Piece),
    ("枚", "枚", UnitClass::Piece),
    ("灯", "灯", UnitClass::Piece),
    ("組", "組", UnitClass::Piece),
    ("セット", "組", UnitClass::Piece),
    ("set", "組", UnitClass::Piece),
    ("台", "台", UnitClass::Equipment),
    ("基", "基", UnitClass::Equipment),
    ("面", "面", UnitClass::Equipment),
    ("ユニット", "台", UnitClass::Equipment),
    ("式", "式", UnitClass::LumpSum),
    ("一式", "式", UnitClass::LumpSum),
    ("人工", "人工", UnitClass::Labor),
    ("人日", "人工", UnitClass::Labor),
];

/// 计量单位 (标准名称 + 兼容类)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Unit {
    label: String,
    class: UnitClass,
}

impl Unit {
    pub fn parse(raw: &str) -> Self {
        let norm = canonicalize(raw);
        match UNIT_TABLE.iter().find(|(alias, _, _)| *alias == norm) {
            Some((_, label, class)) => Self {
                label: (*label).to_string(),
                class: *class,
            },
            None => Self {
                label: norm,
                class: UnitClass::Other,
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn class(&self) -> UnitClass {
        self.class
    }

    pub fn is_lump_sum(&self) -> bool {
        self.class == UnitClass::LumpSum
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// 单位兼容: 标准名称相同, 或同属一个 (非 Other) 兼容类
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.label == other.label || (self.class == other.class && self.class != UnitClass::Other)
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Unit> for String {
    fn from(u: Unit) -> Self {
        u.label
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
