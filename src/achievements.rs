// Achievement catalog and evaluation. Evaluation is pure: it only reports what was newly earned.

use serde::{Deserialize, Serialize};

use crate::lexicon::{find_pack, CORE_LEXICON_ID};
use crate::types::{PromptType, Rarity, SignatureRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementCategory {
    Standard,
    Skill,
    Rarity,
    Narrative,
}

/// What must hold for an achievement to be earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// History length at least `threshold`.
    Count { threshold: usize },
    /// The new signature's consistency at least `threshold`.
    Consistency { threshold: u32 },
    Rarity { target: Rarity },
    Type { target: PromptType },
    /// Pack id present in the unlocked set.
    LexiconUnlock { target: &'static str },
    /// Two or more catalog packs unlocked besides the core lexicon. "core" never
    /// counts, so this first fires at the second pack (15 signatures), not the first.
    LexiconMix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub condition: Condition,
}

/// An achievement the user holds. Appended once, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub id: String,
    pub earned_at_ms: u64,
}

impl EarnedAchievement {
    pub fn definition(&self) -> Option<&'static Achievement> {
        find_achievement(&self.id)
    }
}

pub const ACHIEVEMENTS: [Achievement; 13] = [
    Achievement {
        id: "first_mark",
        name: "The First Mark",
        description: "Begin your journey with a single signature.",
        icon: "PenTool",
        category: AchievementCategory::Standard,
        condition: Condition::Count { threshold: 1 },
    },
    Achievement {
        id: "prolific_scribe",
        name: "Prolific Scribe",
        description: "Reach 50 signatures in your ledger.",
        icon: "Scroll",
        category: AchievementCategory::Standard,
        condition: Condition::Count { threshold: 50 },
    },
    Achievement {
        id: "century_keeper",
        name: "Century Keeper",
        description: "Complete 100 signatures.",
        icon: "Book",
        category: AchievementCategory::Standard,
        condition: Condition::Count { threshold: 100 },
    },
    Achievement {
        id: "steady_hand",
        name: "Steady Hand",
        description: "Achieve a consistency score of 90% or higher.",
        icon: "Activity",
        category: AchievementCategory::Skill,
        condition: Condition::Consistency { threshold: 90 },
    },
    Achievement {
        id: "iron_grip",
        name: "Iron Grip",
        description: "Achieve a consistency score of 95% or higher.",
        icon: "Target",
        category: AchievementCategory::Skill,
        condition: Condition::Consistency { threshold: 95 },
    },
    Achievement {
        id: "perfectionist",
        name: "The Perfectionist",
        description: "Achieve a perfect 100% consistency score.",
        icon: "Award",
        category: AchievementCategory::Skill,
        condition: Condition::Consistency { threshold: 100 },
    },
    Achievement {
        id: "diamond_rough",
        name: "Diamond in the Rough",
        description: "Receive a Rare prompt.",
        icon: "Gem",
        category: AchievementCategory::Rarity,
        condition: Condition::Rarity {
            target: Rarity::Rare,
        },
    },
    Achievement {
        id: "legacy_touched",
        name: "Legacy Touched",
        description: "Encounter a Fixed Legacy prompt.",
        icon: "Crown",
        category: AchievementCategory::Rarity,
        condition: Condition::Type {
            target: PromptType::FixedLegacy,
        },
    },
    Achievement {
        id: "mythic_collector",
        name: "Mythic Collector",
        description: "Sign a Mythic rarity prompt.",
        icon: "Sparkles",
        category: AchievementCategory::Rarity,
        condition: Condition::Rarity {
            target: Rarity::Mythic,
        },
    },
    Achievement {
        id: "weaver",
        name: "The Weaver",
        description: "Use words from multiple unlocked lexicons.",
        icon: "Feather",
        category: AchievementCategory::Narrative,
        condition: Condition::LexiconMix,
    },
    Achievement {
        id: "natures_child",
        name: "Nature's Child",
        description: "Unlock the Forest lexicon.",
        icon: "Leaf",
        category: AchievementCategory::Narrative,
        condition: Condition::LexiconUnlock { target: "forest" },
    },
    Achievement {
        id: "industrial_heart",
        name: "Industrial Heart",
        description: "Unlock the Industrial lexicon.",
        icon: "Hammer",
        category: AchievementCategory::Narrative,
        condition: Condition::LexiconUnlock {
            target: "industrial",
        },
    },
    Achievement {
        id: "ethereal_dreamer",
        name: "Ethereal Dreamer",
        description: "Unlock the Ethereal lexicon.",
        icon: "Moon",
        category: AchievementCategory::Narrative,
        condition: Condition::LexiconUnlock { target: "ethereal" },
    },
];

pub fn find_achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

impl Condition {
    /// `history` already contains `signature`.
    pub fn is_met(
        &self,
        signature: &SignatureRecord,
        history: &[SignatureRecord],
        unlocked_lexicons: &[String],
    ) -> bool {
        match *self {
            Condition::Count { threshold } => history.len() >= threshold,
            Condition::Consistency { threshold } => signature.consistency >= threshold,
            Condition::Rarity { target } => signature.rarity() == Some(target),
            Condition::Type { target } => signature.prompt_type() == Some(target),
            Condition::LexiconUnlock { target } => unlocked_lexicons.iter().any(|id| id == target),
            Condition::LexiconMix => {
                unlocked_lexicons
                    .iter()
                    .filter(|id| id.as_str() != CORE_LEXICON_ID && find_pack(id).is_some())
                    .count()
                    >= 2
            }
        }
    }
}

/// Achievements newly earned by `signature`, in catalog order, stamped `now_ms`.
pub fn evaluate_achievements(
    signature: &SignatureRecord,
    history: &[SignatureRecord],
    unlocked_lexicons: &[String],
    earned: &[EarnedAchievement],
    now_ms: u64,
) -> Vec<EarnedAchievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !earned.iter().any(|e| e.id == a.id))
        .filter(|a| a.condition.is_met(signature, history, unlocked_lexicons))
        .map(|a| EarnedAchievement {
            id: a.id.to_string(),
            earned_at_ms: now_ms,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sentiment::SentimentScores;
    use crate::types::{
        BoundingBox, Placement, PrimaryStyle, PromptCategory, PromptComponents, PromptMetadata,
        Scale, SentimentData, SignatureMetrics,
    };

    pub(crate) fn record(id: u64, consistency: u32, rarity: Option<Rarity>) -> SignatureRecord {
        SignatureRecord {
            id,
            svg_path: "M 0 0 L 10 0".to_string(),
            ink_color: "#1a1a1a".to_string(),
            prompt_title: "Walks path quietly".to_string(),
            style_tag: "Fluid Monastic".to_string(),
            primary_style: PrimaryStyle::Monastic,
            secondary_style_label: None,
            metrics: SignatureMetrics {
                path_length: 100.0,
                bounding_box: BoundingBox::new(0.0, 0.0, 100.0, 20.0),
                average_velocity: 0.2,
                complexity: 10,
                density: 2.2,
                curvature: 0.0,
                pen_lifts: 0,
                continuity_ratio: 100.0,
                consistency_angles: 1.0,
                velocity_variance: 0.0,
                scale: Scale::Small,
                placement: Placement::Centered,
                style_confidence: 80,
            },
            consistency,
            timestamp_ms: id,
            thread_id: None,
            used_tags: Vec::new(),
            seal_color: "#455a64".to_string(),
            sentiment_data: SentimentData {
                scores: SentimentScores::default(),
                intensity: 50,
                dominant_color: "Contemplative".to_string(),
            },
            prompt_metadata: rarity.map(|rarity| PromptMetadata {
                category: PromptCategory::Legacy,
                rarity,
                prompt_type: if rarity == Rarity::Mythic {
                    PromptType::FixedLegacy
                } else {
                    PromptType::Template
                },
                thread_id: None,
                used_tags: Vec::new(),
                style_influence: None,
                scale_influence: None,
                components: PromptComponents::default(),
            }),
        }
    }

    fn ids(earned: &[EarnedAchievement]) -> Vec<&str> {
        earned.iter().map(|e| e.id.as_str()).collect()
    }

    fn core() -> Vec<String> {
        vec!["core".to_string()]
    }

    #[test]
    fn first_signature_earns_first_mark() {
        let sig = record(1, 100, None);
        let history = vec![sig.clone()];
        let earned = evaluate_achievements(&sig, &history, &core(), &[], 42);
        assert_eq!(
            ids(&earned),
            vec!["first_mark", "steady_hand", "iron_grip", "perfectionist"]
        );
        assert!(earned.iter().all(|e| e.earned_at_ms == 42));
    }

    #[test]
    fn already_earned_is_skipped() {
        let sig = record(2, 92, None);
        let history = vec![record(1, 100, None), sig.clone()];
        let held = vec![EarnedAchievement {
            id: "first_mark".to_string(),
            earned_at_ms: 1,
        }];
        let earned = evaluate_achievements(&sig, &history, &core(), &held, 2);
        assert_eq!(ids(&earned), vec!["steady_hand"]);
    }

    #[test]
    fn rarity_and_type_match_metadata() {
        let sig = record(1, 10, Some(Rarity::Mythic));
        let earned = evaluate_achievements(&sig, &[sig.clone()], &core(), &[], 0);
        assert!(ids(&earned).contains(&"legacy_touched"));
        assert!(ids(&earned).contains(&"mythic_collector"));
        assert!(!ids(&earned).contains(&"diamond_rough"));
    }

    #[test]
    fn lexicon_mix_ignores_core() {
        let sig = record(1, 10, None);
        let one_pack = vec!["core".to_string(), "celestial".to_string()];
        let earned = evaluate_achievements(&sig, &[sig.clone()], &one_pack, &[], 0);
        assert!(!ids(&earned).contains(&"weaver"));

        let unknown = vec!["core".to_string(), "celestial".to_string(), "bogus".to_string()];
        let earned = evaluate_achievements(&sig, &[sig.clone()], &unknown, &[], 0);
        assert!(!ids(&earned).contains(&"weaver"));

        let two_packs = vec![
            "core".to_string(),
            "celestial".to_string(),
            "forest".to_string(),
        ];
        let earned = evaluate_achievements(&sig, &[sig.clone()], &two_packs, &[], 0);
        assert!(ids(&earned).contains(&"weaver"));
        assert!(ids(&earned).contains(&"natures_child"));
    }

    #[test]
    fn definitions_are_unique_and_resolvable() {
        for (i, a) in ACHIEVEMENTS.iter().enumerate() {
            assert!(ACHIEVEMENTS[i + 1..].iter().all(|b| b.id != a.id));
            if let Condition::LexiconUnlock { target } = a.condition {
                assert!(find_pack(target).is_some(), "{target}");
            }
        }
        let earned = EarnedAchievement {
            id: "iron_grip".to_string(),
            earned_at_ms: 0,
        };
        assert_eq!(earned.definition().map(|a| a.name), Some("Iron Grip"));
    }
}
