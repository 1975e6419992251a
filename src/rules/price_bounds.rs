use crate::service::normalizer::canonicalize;
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use serde::Deserialize;

/// 单价合理性边界: 高额一式品类的最低价, 豁免关键词, 一般品类的单价上限
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawPriceBounds")]
pub struct PriceBounds {
    floors: Vec<(String, BigDecimal)>,
    exemptions: Vec<String>,
    ceilings: Vec<(String, BigDecimal)>,
    /// 非一式条目是否检查单价上限 (默认关闭)
    enforce_ceilings: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPriceBounds {
    #[serde(default)]
    floors: IndexMap<String, BigDecimal>,
    #[serde(default)]
    floor_exemptions: Vec<String>,
    #[serde(default)]
    ceilings: IndexMap<String, BigDecimal>,
    #[serde(default)]
    enforce_ceilings: bool,
}

impl From<RawPriceBounds> for PriceBounds {
    fn from(raw: RawPriceBounds) -> Self {
        Self::new(raw.floors, raw.floor_exemptions, raw.ceilings).enforcing_ceilings(raw.enforce_ceilings)
    }
}

/// 命中的价格边界 (关键词 + 金额)
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBound<'a> {
    pub keyword: &'a str,
    pub price: &'a BigDecimal,
}

impl PriceBounds {
    pub fn new<F, E, C>(floors: F, exemptions: E, ceilings: C) -> Self
    where
        F: IntoIterator<Item = (String, BigDecimal)>,
        E: IntoIterator<Item = String>,
        C: IntoIterator<Item = (String, BigDecimal)>,
    {
        let normalize_keys = |items: Vec<(String, BigDecimal)>| {
            items
                .into_iter()
                .map(|(k, v)| (canonicalize(&k), v))
                .filter(|(k, _)| !k.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            floors: normalize_keys(floors.into_iter().collect()),
            exemptions: exemptions
                .into_iter()
                .map(|e| canonicalize(&e))
                .filter(|e| !e.is_empty())
                .collect(),
            ceilings: normalize_keys(ceilings.into_iter().collect()),
            enforce_ceilings: false,
        }
    }

    pub fn enforcing_ceilings(mut self, enforce: bool) -> Self {
        self.enforce_ceilings = enforce;
        self
    }

    pub fn enforces_ceilings(&self) -> bool {
        self.enforce_ceilings
    }

    /// 名称包含豁免关键词 (点検, 保守, 配管 ...) 时不做最低价检查
    pub fn is_exempt(&self, normalized_name: &str) -> bool {
        self.exemptions.iter().any(|kw| normalized_name.contains(kw.as_str()))
    }

    /// 适用的最低价: 命中关键词中最高的一个; 豁免或未收录时为 None
    pub fn floor_for(&self, normalized_name: &str) -> Option<PriceBound<'_>> {
        if self.is_exempt(normalized_name) {
            return None;
        }
        self.floors
            .iter()
            .filter(|(kw, _)| normalized_name.contains(kw.as_str()))
            .fold(None, |best: Option<&(String, BigDecimal)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(keyword, price)| PriceBound { keyword, price })
    }

    /// 适用的单价上限: 命中关键词中最低的一个
    pub fn ceiling_for(&self, normalized_name: &str) -> Option<PriceBound<'_>> {
        self.ceilings
            .iter()
            .filter(|(kw, _)| normalized_name.contains(kw.as_str()))
            .fold(None, |best: Option<&(String, BigDecimal)>, cur| match best {
                Some(b) if b.1 <= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(keyword, price)| PriceBound { keyword, price })
    }

    pub fn validate(&self) -> Result<(), String> {
        for (kw, price) in self.floors.iter().chain(self.ceilings.iter()) {
            if *price <= BigDecimal::zero() {
                return Err(format!("price bound for '{kw}' must be positive, got {price}"));
            }
        }
        Ok(())
    }
}
