use crate::service::normalizer::canonicalize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 工事区分
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Discipline {
    ElectricalWorks,
    ElectricalEquipment,
    MechanicalWorks,
    Hvac,
    Plumbing,
    GasWorks,
    FireProtection,
    Building,
    /// 「設備工事」: 所有设备类工事的总称
    GeneralFacilities,
    Other(String),
}

/// 工事区分的兼容类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisciplineClass {
    Electrical,
    Mechanical,
    Gas,
    Fire,
    Building,
    General,
}

/// 跨类兼容关系 (对称, 双向查询)
const COMPATIBLE_CLASSES: &[(DisciplineClass, DisciplineClass)] = &[
    (DisciplineClass::General, DisciplineClass::Electrical),
    (DisciplineClass::General, DisciplineClass::Mechanical),
    (DisciplineClass::General, DisciplineClass::Gas),
    (DisciplineClass::General, DisciplineClass::Fire),
];

/// 别名表 (规范化后比较)
const ALIASES: &[(&str, Discipline)] = &[
    ("電気設備工事", Discipline::ElectricalWorks),
    ("電気工事", Discipline::ElectricalWorks),
    ("電気設備", Discipline::ElectricalEquipment),
    ("電気", Discipline::ElectricalEquipment),
    ("機械設備工事", Discipline::MechanicalWorks),
    ("機械設備", Discipline::MechanicalWorks),
    ("機械", Discipline::MechanicalWorks),
    ("空調設備工事", Discipline::Hvac),
    ("空調設備", Discipline::Hvac),
    ("空調", Discipline::Hvac),
    ("衛生設備工事", Discipline::Plumbing),
    ("給排水衛生設備工事", Discipline::Plumbing),
    ("衛生設備", Discipline::Plumbing),
    ("衛生", Discipline::Plumbing),
    ("ガス設備工事", Discipline::GasWorks),
    ("ガス工事", Discipline::GasWorks),
    ("ガス設備", Discipline::GasWorks),
    ("ガス", Discipline::GasWorks),
    ("消防設備工事", Discipline::FireProtection),
    ("消防設備", Discipline::FireProtection),
    ("消防", Discipline::FireProtection),
    ("建築工事", Discipline::Building),
    ("建築", Discipline::Building),
    ("設備工事", Discipline::GeneralFacilities),
    ("設備", Discipline::GeneralFacilities),
];

impl Discipline {
    pub fn parse(raw: &str) -> Self {
        let norm = canonicalize(raw);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == norm)
            .map(|(_, d)| d.clone())
            .unwrap_or(Self::Other(norm))
    }

    /// 标准名称
    pub fn label(&self) -> &str {
        match self {
            Self::ElectricalWorks => "電気設備工事",
            Self::ElectricalEquipment => "電気設備",
            Self::MechanicalWorks => "機械設備工事",
            Self::Hvac => "空調設備工事",
            Self::Plumbing => "衛生設備工事",
            Self::GasWorks => "ガス設備工事",
            Self::FireProtection => "消防設備工事",
            Self::Building => "建築工事",
            Self::GeneralFacilities => "設備工事",
            Self::Other(s) => s,
        }
    }

    pub fn class(&self) -> Option<DisciplineClass> {
        match self {
            Self::ElectricalWorks | Self::ElectricalEquipment => Some(DisciplineClass::Electrical),
            Self::MechanicalWorks | Self::Hvac | Self::Plumbing => Some(DisciplineClass::Mechanical),
            Self::GasWorks => Some(DisciplineClass::Gas),
            Self::FireProtection => Some(DisciplineClass::Fire),
            Self::Building => Some(DisciplineClass::Building),
            Self::GeneralFacilities => Some(DisciplineClass::General),
            Self::Other(_) => None,
        }
    }

    /// 工事区分兼容: 相同, 同类, 或存在跨类兼容关系
    pub fn is_compatible_with(&self, other: &Discipline) -> bool {
        if self == other {
            return true;
        }
        match (self.class(), other.class()) {
            (Some(a), Some(b)) => {
                a == b
                    || COMPATIBLE_CLASSES
                        .iter()
                        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
            }
            _ => false,
        }
    }
}

impl From<String> for Discipline {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Discipline> for String {
    fn from(d: Discipline) -> Self {
        d.label().to_string()
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
