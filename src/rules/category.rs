use serde::{Deserialize, Serialize};

/// 粗粒度品类 (名称中包含的关键词)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WhiteGasPipe,
    CoatedSteelPipe,
    PePipe,
    ExposedJoint,
    GasOutlet,
    ScrewCock,
    BranchCock,
    BallSlideJoint,
    GasMeter,
    PipeSupport,
    Drilling,
    Backfill,
    Concrete,
    AerialWorkPlatform,
    Transport,
    Overhead,
    Testing,
    Inspection,
    Removal,
}

/// 按顺序匹配, 取第一个命中的品类; 关键词均为规范化后的形式
const KEYWORDS: &[(&str, Category)] = &[
    ("白ガス管", Category::WhiteGasPipe),
    ("白管", Category::WhiteGasPipe),
    ("sgp", Category::WhiteGasPipe),
    ("カラー鋼管", Category::CoatedSteelPipe),
    ("pe管", Category::PePipe),
    ("ポリエチレン管", Category::PePipe),
    ("露出結び", Category::ExposedJoint),
    ("ガスコンセント", Category::GasOutlet),
    ("ネジコック", Category::ScrewCock),
    ("分岐コック", Category::BranchCock),
    ("ボールスライドジョイント", Category::BallSlideJoint),
    ("ガスメーター", Category::GasMeter),
    ("配管支持金具", Category::PipeSupport),
    ("配管支持金物", Category::PipeSupport),
    ("穴あけ", Category::Drilling),
    ("埋戻し", Category::Backfill),
    ("コンクリート", Category::Concrete),
    ("高所作業車", Category::AerialWorkPlatform),
    ("運搬", Category::Transport),
    ("諸経費", Category::Overhead),
    ("試験", Category::Testing),
    ("検査", Category::Inspection),
    ("撤去", Category::Removal),
];

impl Category {
    /// 从规范化文本中识别品类
    pub fn of(normalized: &str) -> Option<Self> {
        if normalized.is_empty() {
            return None;
        }
        KEYWORDS
            .iter()
            .find(|(kw, _)| normalized.contains(kw))
            .map(|&(_, category)| category)
    }
}
