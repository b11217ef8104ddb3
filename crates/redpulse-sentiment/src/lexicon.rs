//! Static weighted word tables for the sentiment scorer.
//!
//! The lexicon is data, not logic: a flat table of `(term, polarity,
//! weight-class)` entries plus negation markers and tiered intensity
//! modifiers. It is assembled once at first use and shared read-only by all
//! scoring calls.

use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClass {
    Strong,
    Medium,
    Weak,
}

impl WeightClass {
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            WeightClass::Strong => 3.0,
            WeightClass::Medium => 2.0,
            WeightClass::Weak => 1.0,
        }
    }
}

/// One lexicon row. Terms are lowercase; matching is by substring occurrence.
#[derive(Debug, Clone, Copy)]
pub struct LexiconEntry {
    pub term: &'static str,
    pub polarity: Polarity,
    pub class: WeightClass,
}

/// An intensity-modifier tier. The first tier with any marker present in a
/// segment wins; its multiplier applies to every term hit in that segment.
#[derive(Debug, Clone, Copy)]
pub struct IntensityTier {
    pub markers: &'static [&'static str],
    pub multiplier: f64,
}

/// The full scoring table: term entries, negation markers, intensity tiers.
#[derive(Debug)]
pub struct Lexicon {
    pub entries: Vec<LexiconEntry>,
    pub negation_markers: &'static [&'static str],
    pub intensity_tiers: &'static [IntensityTier],
}

// Strongly positive terms, much of it platform slang ("yyds", 种草, 回购).
const POSITIVE_STRONG: &[&str] = &[
    "完美",
    "惊艳",
    "超级推荐",
    "极致",
    "真香",
    "yyds",
    "绝绝子",
    "神作",
    "天花板",
    "顶级",
    "极品",
    "满分",
    "强烈推荐",
    "太爱了",
    "宝藏",
    "神器",
    "必入",
    "回购",
    "无限回购",
    "一生推",
    "吹爆",
    "强推",
    "绝了",
    "太棒了",
    "种草",
    "安利",
    "买它",
    "拿捏",
    "入股不亏",
    "爱了爱了",
    "力荐",
    "值得拥有",
    "永远的神",
    "神仙好物",
];

const POSITIVE_MEDIUM: &[&str] = &[
    "好",
    "棒",
    "满意",
    "推荐",
    "喜欢",
    "不错",
    "优秀",
    "出色",
    "值得",
    "划算",
    "实惠",
    "便宜",
    "超值",
    "性价比高",
    "好用",
    "实用",
    "方便",
    "舒适",
    "美观",
    "漂亮",
    "好看",
    "时尚",
    "高级",
    "有质感",
    "精致",
    "专业",
    "靠谱",
    "放心",
    "开心",
    "快乐",
    "惊喜",
    "感动",
    "温暖",
    "贴心",
    "周到",
    "给力",
    "舒服",
    "适合",
    "改善",
    "提升",
];

const POSITIVE_WEAK: &[&str] = &[
    "还行", "可以", "凑合", "还好", "不差", "尚可", "能接受", "还成", "ok",
];

const NEGATIVE_STRONG: &[&str] = &[
    "垃圾",
    "糟糕",
    "极度失望",
    "避坑",
    "翻车",
    "踩雷",
    "巨坑",
    "骗人",
    "虚假",
    "诈骗",
    "骗子",
    "黑心",
    "无良",
    "无耻",
    "恶心",
    "讨厌",
    "愤怒",
    "崩溃",
    "绝望",
    "浪费",
    "后悔",
    "退货",
    "退款",
    "投诉",
    "举报",
    "拉黑",
    "取关",
    "卸载",
    "废物",
    "避雷",
    "拔草",
    "劝退",
    "别买",
    "慎买",
    "千万别买",
    "差评",
    "拉胯",
    "坑爹",
    "坑人",
    "白花钱",
];

const NEGATIVE_MEDIUM: &[&str] = &[
    "差",
    "不好",
    "失望",
    "不值",
    "问题",
    "缺陷",
    "故障",
    "损坏",
    "破损",
    "残次",
    "次品",
    "假货",
    "水货",
    "山寨",
    "劣质",
    "粗糙",
    "简陋",
    "廉价",
    "低质",
    "难用",
    "麻烦",
    "复杂",
    "繁琐",
    "不实用",
    "无效",
    "没用",
    "没效果",
    "不满",
    "不爽",
    "难受",
    "痛苦",
    "煎熬",
    "折磨",
    "困扰",
    "差劲",
    "毛病",
    "瑕疵",
    "不划算",
];

const NEGATIVE_WEAK: &[&str] = &[
    "一般",
    "普通",
    "平平",
    "马马虎虎",
    "将就",
    "勉强",
    "不推荐",
    "不建议",
    "算了",
    "就那样",
    "平平无奇",
    "普普通通",
    "一般般",
];

/// Negation markers. Presence anywhere in a segment sets a boolean flag;
/// position relative to the sentiment term is not tracked.
const NEGATION_MARKERS: &[&str] = &[
    "不",
    "不是",
    "没",
    "没有",
    "非",
    "无",
    "别",
    "莫",
    "未",
    "不用",
    "不必",
    "未必",
    "毫不",
    "并非",
    "绝不",
    "并不",
    "一点都不",
];

/// Intensity tiers, checked strong → medium → weak; first match wins.
const INTENSITY_TIERS: &[IntensityTier] = &[
    IntensityTier {
        markers: &["非常", "极其", "超级", "特别", "十分", "万分", "格外"],
        multiplier: 1.5,
    },
    IntensityTier {
        markers: &["比较", "相当", "蛮", "挺", "还算"],
        multiplier: 1.2,
    },
    IntensityTier {
        markers: &["有点", "稍微", "略"],
        multiplier: 0.7,
    },
];

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(Lexicon::from_tables);

impl Lexicon {
    /// The built-in Chinese social-media lexicon, assembled once.
    #[must_use]
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    fn from_tables() -> Self {
        let mut entries = Vec::new();
        let tiers: [(&[&str], Polarity, WeightClass); 6] = [
            (POSITIVE_STRONG, Polarity::Positive, WeightClass::Strong),
            (POSITIVE_MEDIUM, Polarity::Positive, WeightClass::Medium),
            (POSITIVE_WEAK, Polarity::Positive, WeightClass::Weak),
            (NEGATIVE_STRONG, Polarity::Negative, WeightClass::Strong),
            (NEGATIVE_MEDIUM, Polarity::Negative, WeightClass::Medium),
            (NEGATIVE_WEAK, Polarity::Negative, WeightClass::Weak),
        ];
        for (terms, polarity, class) in tiers {
            entries.extend(terms.iter().map(|&term| LexiconEntry {
                term,
                polarity,
                class,
            }));
        }
        Lexicon {
            entries,
            negation_markers: NEGATION_MARKERS,
            intensity_tiers: INTENSITY_TIERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_nonempty_and_lowercase() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.entries.len() > 100);
        for entry in &lexicon.entries {
            assert_eq!(
                entry.term,
                entry.term.to_lowercase(),
                "lexicon terms must be lowercase: {}",
                entry.term
            );
        }
    }

    #[test]
    fn no_term_appears_with_both_polarities() {
        let lexicon = Lexicon::builtin();
        for entry in &lexicon.entries {
            let conflicting = lexicon
                .entries
                .iter()
                .any(|other| other.term == entry.term && other.polarity != entry.polarity);
            assert!(
                !conflicting,
                "term {} appears with both polarities",
                entry.term
            );
        }
    }

    #[test]
    fn weight_classes_are_ordered() {
        assert!(WeightClass::Strong.weight() > WeightClass::Medium.weight());
        assert!(WeightClass::Medium.weight() > WeightClass::Weak.weight());
    }

    #[test]
    fn intensity_tiers_run_strong_to_weak() {
        let tiers = Lexicon::builtin().intensity_tiers;
        assert_eq!(tiers.len(), 3);
        assert!(tiers[0].multiplier > tiers[1].multiplier);
        assert!(tiers[1].multiplier > tiers[2].multiplier);
    }
}
