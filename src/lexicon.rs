// Lexicon catalog and prompt sentence assembly.
// Packs unlock at cumulative signature counts; unlocked status is always derivable from the count.

use serde::Serialize;

use crate::random::RandomSource;
use crate::types::PromptComponents;

/// Vocabulary for one lexicon.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WordSet {
    pub nouns: &'static [&'static str],
    pub verbs: &'static [&'static str],
    pub sentiments: &'static [&'static str],
}

impl WordSet {
    pub fn words(&self, kind: WordKind) -> &'static [&'static str] {
        match kind {
            WordKind::Noun => self.nouns,
            WordKind::Verb => self.verbs,
            WordKind::Sentiment => self.sentiments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Noun,
    Verb,
    Sentiment,
}

/// A themed vocabulary bundle gated by signature count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LexiconPack {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked_at: u32,
    pub words: WordSet,
}

pub const CORE_LEXICON_ID: &str = "core";

pub const CORE_LEXICON: WordSet = WordSet {
    nouns: &[
        "path", "stone", "river", "tree", "mountain", "wind", "shadow", "light", "voice", "hand",
        "door", "fire", "water", "home", "heart", "breath", "sky", "earth", "sun", "moon",
        "star", "night", "day", "ocean", "forest", "desert", "rain", "snow", "ice", "dust",
        "sand", "rock", "cliff", "valley", "hill", "field", "garden", "flower", "leaf", "root",
        "seed", "fruit", "bird", "wing", "feather", "claw", "tooth", "bone", "blood", "tear",
        "smile", "gaze", "touch", "step", "journey", "memory", "dream", "thought", "word",
        "silence", "sound", "echo", "whisper", "song", "note", "rhythm", "time", "moment",
        "hour", "year", "age", "past", "future", "present", "beginning", "end", "middle",
        "center", "edge", "boundary", "wall", "window", "roof", "floor", "bridge", "road",
        "gate", "key", "lock", "chain", "anchor", "sail", "ship", "boat", "wave", "tide",
        "storm", "cloud", "mist", "fog", "island", "shore", "beach", "cavern", "cave", "tunnel",
        "mirror", "glass", "iron", "gold", "silver", "copper", "clay", "wood", "ash", "smoke",
        "spark", "flame", "ember", "coal",
    ],
    verbs: &[
        "walks", "stands", "flows", "grows", "rises", "blows", "falls", "shines", "speaks",
        "holds", "sees", "touches", "drifts", "fades", "blooms", "breaks", "mends", "whispers",
        "echoes", "runs", "sleeps", "wakes", "dreams", "remembers", "forgets", "loses", "finds",
        "seeks", "hides", "shows", "opens", "closes", "locks", "unlocks", "builds", "destroys",
        "burns", "freezes", "melts", "shatters", "bends", "twists", "turns", "stops", "begins",
        "ends", "waits", "listens", "watches", "calls", "answers", "asks", "knows", "learns",
        "teaches", "writes", "reads", "paints", "draws", "sings", "dances", "flies", "swims",
        "sails", "rows", "climbs", "digs", "plants", "harvests", "eats", "drinks", "breathes",
        "lives", "dies", "fights", "surrenders", "gives", "takes", "keeps", "shares", "loves",
        "hates", "fears", "hopes", "wishes", "prays", "believes", "doubts", "trusts",
        "betrays", "protects", "attacks", "defends", "heals", "hurts", "helps", "hinders",
        "changes", "stays", "leaves", "arrives", "departs", "returns", "wanders", "travels",
        "follows", "leads", "guides", "misleads",
    ],
    sentiments: &[
        "quietly", "steadily", "softly", "brightly", "calmly", "slowly", "firmly", "loudly",
        "quickly", "harshly", "gently", "fiercely", "wildly", "tame", "bravely", "fearfully",
        "joyfully", "sadly", "angrily", "peacefully", "patiently", "eagerly", "reluctantly",
        "willingly", "freely", "bound", "lost", "found", "broken", "whole", "empty", "full",
        "heavy", "light", "dark", "warm", "cold", "hot", "dry", "wet", "smooth", "rough",
        "sharp", "dull", "hard", "soft", "sweet", "bitter", "sour", "salty", "clear", "cloudy",
        "hazy", "foggy", "misty", "sunny", "rainy", "stormy", "windy", "still", "silent",
        "noisy", "old", "new", "young", "ancient", "modern", "future", "past", "present",
        "high", "low", "deep", "shallow", "wide", "narrow", "long", "short", "big", "small",
        "vast", "tiny", "infinite", "finite", "eternal", "temporary", "fleeting", "lasting",
        "constant", "changing",
    ],
};

/// Unlockable packs in catalog order (ascending threshold).
pub const UNLOCKABLE_PACKS: [LexiconPack; 6] = [
    LexiconPack {
        id: "celestial",
        name: "Celestial Pack",
        description: "Words from the heavens above.",
        unlocked_at: 10,
        words: WordSet {
            nouns: &[
                "comet", "orbit", "nebula", "constellation", "eclipse", "horizon", "zenith",
                "stardust", "void", "nova",
            ],
            verbs: &[
                "ascends", "descends", "aligns", "collides", "shimmers", "orbits", "eclipses",
                "illuminates", "gravitates", "expands",
            ],
            sentiments: &[
                "infinitely", "cosmically", "radiantly", "distantly", "universally", "stellarly",
                "celestially",
            ],
        },
    },
    LexiconPack {
        id: "forest",
        name: "Forest Pack",
        description: "Whispers from the deep woods.",
        unlocked_at: 15,
        words: WordSet {
            nouns: &[
                "canopy", "fern", "moss", "thicket", "grove", "bark", "sap", "mycelium",
                "undergrowth", "hollow",
            ],
            verbs: &[
                "rustles", "roots", "sprouts", "decays", "shelters", "entangles", "flourishes",
                "withers", "branches", "shades",
            ],
            sentiments: &[
                "wildly", "naturally", "densely", "quietly", "organically", "primitively",
                "serenely",
            ],
        },
    },
    LexiconPack {
        id: "obsidian",
        name: "Obsidian Pack",
        description: "Sharp, dark, and reflective words.",
        unlocked_at: 30,
        words: WordSet {
            nouns: &[
                "shard", "blade", "volcano", "glass", "nightmare", "abyss", "edge", "shadow",
                "reflection", "darkness",
            ],
            verbs: &[
                "cuts", "bleeds", "reflects", "shatters", "pierces", "darkens", "slices",
                "erupts", "solidifies", "fractures",
            ],
            sentiments: &[
                "sharply", "darkly", "coldly", "brittly", "intensely", "dangerously",
                "mysteriously",
            ],
        },
    },
    LexiconPack {
        id: "amber",
        name: "Amber Pack",
        description: "Preserved memories and golden light.",
        unlocked_at: 40,
        words: WordSet {
            nouns: &[
                "resin", "fossil", "honey", "sunset", "glow", "time", "capsule", "warmth", "gold",
                "preservation",
            ],
            verbs: &[
                "traps", "preserves", "glows", "hardens", "melts", "encapsulates", "remembers",
                "lingers", "shines", "suspends",
            ],
            sentiments: &[
                "warmly", "timelessly", "sweetly", "viscously", "goldenly", "eternally", "softly",
            ],
        },
    },
    LexiconPack {
        id: "industrial",
        name: "Industrial Pack",
        description: "Steel, steam, and structure.",
        unlocked_at: 50,
        words: WordSet {
            nouns: &[
                "gear", "piston", "factory", "smoke", "steel", "engine", "clock", "mechanism",
                "grid", "metal",
            ],
            verbs: &[
                "grinds", "pumps", "churns", "builds", "forges", "mechanizes", "assembles",
                "constructs", "drives", "fuels",
            ],
            sentiments: &[
                "mechanically", "precisely", "relentlessly", "powerfully", "rhythmically",
                "structurally", "efficiently",
            ],
        },
    },
    LexiconPack {
        id: "ethereal",
        name: "Ethereal Pack",
        description: "Dreams, spirits, and the unknown.",
        unlocked_at: 60,
        words: WordSet {
            nouns: &[
                "spirit", "ghost", "wraith", "phantom", "illusion", "mirage", "vapor", "essence",
                "aura", "soul",
            ],
            verbs: &[
                "haunts", "vanishes", "appears", "floats", "drifts", "transcends", "fades",
                "manifests", "dissolves", "evaporates",
            ],
            sentiments: &[
                "spookily", "ethereally", "ghostly", "insubstantially", "mysteriously",
                "spiritually", "transiently",
            ],
        },
    },
];

/// Sentence shapes. Each contains every placeholder exactly once.
pub const PROMPT_TEMPLATES: [&str; 6] = [
    "{verb} {noun} {sentiment}",
    "The {noun} {verb} {sentiment}",
    "{sentiment}, the {noun} {verb}",
    "Where the {noun} {verb} {sentiment}",
    "Sign as the {noun} {verb} {sentiment}",
    "A {noun} that {verb} {sentiment}",
];

/// An assembled prompt sentence and the words it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptWords {
    pub text: String,
    pub noun: String,
    pub verb: String,
    pub sentiment: String,
}

impl PromptWords {
    pub fn components(&self) -> PromptComponents {
        PromptComponents {
            action: self.verb.clone(),
            object: self.noun.clone(),
            sentiment: self.sentiment.clone(),
        }
    }
}

/// Packs whose threshold has been reached.
pub fn unlocked_packs(signature_count: u32) -> Vec<&'static LexiconPack> {
    UNLOCKABLE_PACKS
        .iter()
        .filter(|pack| signature_count >= pack.unlocked_at)
        .collect()
}

/// "core" followed by every unlocked pack id.
pub fn unlocked_lexicon_ids(signature_count: u32) -> Vec<String> {
    std::iter::once(CORE_LEXICON_ID)
        .chain(unlocked_packs(signature_count).into_iter().map(|p| p.id))
        .map(str::to_string)
        .collect()
}

pub fn find_pack(id: &str) -> Option<&'static LexiconPack> {
    UNLOCKABLE_PACKS.iter().find(|pack| pack.id == id)
}

/// Core words plus every unlocked pack's words, deduplicated, core first.
pub fn available_words(signature_count: u32, kind: WordKind) -> Vec<&'static str> {
    let mut words: Vec<&'static str> = Vec::new();
    let sources = std::iter::once(CORE_LEXICON.words(kind))
        .chain(unlocked_packs(signature_count).into_iter().map(|p| p.words.words(kind)));
    for source in sources {
        for word in source {
            if !words.contains(word) {
                words.push(word);
            }
        }
    }
    words
}

/// Pick a noun, verb and sentiment and fill a random template.
///
/// Each word independently comes from a random unlocked pack with probability
/// `pack_probability`; otherwise, or when no pack is unlocked, from the core lexicon.
pub fn select_prompt_words<R: RandomSource>(
    signature_count: u32,
    pack_probability: f64,
    rng: &mut R,
) -> PromptWords {
    let packs = unlocked_packs(signature_count);

    let mut pick = |kind: WordKind| -> &'static str {
        if !packs.is_empty() && rng.chance(pack_probability) {
            let pack = packs[rng.pick_index(packs.len())];
            if let Some(word) = rng.pick(pack.words.words(kind)) {
                return word;
            }
        }
        rng.pick(CORE_LEXICON.words(kind)).copied().unwrap_or("something")
    };

    let noun = pick(WordKind::Noun);
    let verb = pick(WordKind::Verb);
    let sentiment = pick(WordKind::Sentiment);

    let template = PROMPT_TEMPLATES[rng.pick_index(PROMPT_TEMPLATES.len())];
    PromptWords {
        text: fill_template(template, noun, verb, sentiment),
        noun: noun.to_string(),
        verb: verb.to_string(),
        sentiment: sentiment.to_string(),
    }
}

/// Substitute each placeholder once and capitalise the first letter.
pub fn fill_template(template: &str, noun: &str, verb: &str, sentiment: &str) -> String {
    let filled = template
        .replacen("{noun}", noun, 1)
        .replacen("{verb}", verb, 1)
        .replacen("{sentiment}", sentiment, 1);
    capitalize(&filled)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The pack whose threshold was crossed going from `previous_count` to `current_count`.
///
/// Only the first crossed pack in catalog order is returned; a jump that crosses two
/// thresholds at once reports just the lower one.
pub fn check_new_unlock(previous_count: u32, current_count: u32) -> Option<&'static LexiconPack> {
    UNLOCKABLE_PACKS
        .iter()
        .find(|pack| previous_count < pack.unlocked_at && current_count >= pack.unlocked_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{seeded, ScriptedRandom};
    use proptest::prelude::*;

    #[test]
    fn packs_unlock_by_threshold() {
        assert!(unlocked_packs(9).is_empty());
        let ids: Vec<_> = unlocked_packs(15).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["celestial", "forest"]);
        assert_eq!(unlocked_packs(100).len(), UNLOCKABLE_PACKS.len());
        assert_eq!(unlocked_lexicon_ids(10), vec!["core", "celestial"]);
    }

    #[test]
    fn check_new_unlock_window() {
        assert_eq!(check_new_unlock(9, 10).map(|p| p.id), Some("celestial"));
        assert!(check_new_unlock(10, 10).is_none());
        assert!(check_new_unlock(10, 11).is_none());
        // Crossing two thresholds reports the first only.
        assert_eq!(check_new_unlock(0, 20).map(|p| p.id), Some("celestial"));
    }

    #[test]
    fn available_words_dedupes() {
        let sentiments = available_words(15, WordKind::Sentiment);
        let quietly = sentiments.iter().filter(|w| **w == "quietly").count();
        assert_eq!(quietly, 1);
        assert!(sentiments.contains(&"serenely"));
        assert!(!available_words(0, WordKind::Noun).contains(&"comet"));
    }

    #[test]
    fn no_packs_always_uses_core() {
        let mut rng = ScriptedRandom::constant(0.0);
        let words = select_prompt_words(0, 1.0, &mut rng);
        assert_eq!(words.noun, "path");
        assert_eq!(words.verb, "walks");
        assert_eq!(words.sentiment, "quietly");
        assert_eq!(words.text, "Walks path quietly");
    }

    #[test]
    fn pack_word_when_roll_is_low() {
        // chance roll 0.0 < 0.3, pack index 0 (celestial), word index 0.
        let mut rng = ScriptedRandom::constant(0.0);
        let words = select_prompt_words(10, 0.3, &mut rng);
        assert_eq!(words.noun, "comet");
        assert_eq!(words.verb, "ascends");
        assert_eq!(words.sentiment, "infinitely");
    }

    #[test]
    fn core_word_when_roll_is_high() {
        // every sample lands on the last item of each list
        let mut rng = ScriptedRandom::constant(0.999_999);
        let words = select_prompt_words(60, 0.3, &mut rng);
        assert_eq!(words.noun, *CORE_LEXICON.nouns.last().unwrap());
        assert_eq!(words.text, "A coal that misleads changing");
    }

    #[test]
    fn every_template_resolves() {
        for template in PROMPT_TEMPLATES {
            for pack in std::iter::once(&CORE_LEXICON).chain(UNLOCKABLE_PACKS.iter().map(|p| &p.words)) {
                for ((noun, verb), sentiment) in pack
                    .nouns
                    .iter()
                    .zip(pack.verbs.iter())
                    .zip(pack.sentiments.iter())
                {
                    let text = fill_template(template, noun, verb, sentiment);
                    assert!(!text.contains('{') && !text.contains('}'), "{text}");
                    assert!(text.to_lowercase().contains(noun));
                    assert!(text.to_lowercase().contains(verb));
                    assert!(text.to_lowercase().contains(sentiment));
                }
            }
            for placeholder in ["{noun}", "{verb}", "{sentiment}"] {
                assert_eq!(template.matches(placeholder).count(), 1, "{template}");
            }
        }
    }

    proptest! {
        #[test]
        fn generated_prompts_have_no_placeholders(
            seed in any::<u64>(),
            count in 0u32..100,
            probability in 0.0f64..=1.0,
        ) {
            let mut rng = seeded(seed);
            let words = select_prompt_words(count, probability, &mut rng);
            let unresolved = words.text.contains(['{', '}']);
            prop_assert!(!unresolved, "unresolved placeholder in {:?}", words.text);
            prop_assert!(!words.text.is_empty());
        }
    }
}
