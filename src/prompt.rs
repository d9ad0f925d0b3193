// Adaptive prompt engine.
// Thread continuation, then a rare fixed legacy prompt, then a style-weighted category template.

use log::debug;

use crate::config::EngineConfig;
use crate::lexicon::select_prompt_words;
use crate::random::RandomSource;
use crate::threads::{detect_thread, random_followup};
use crate::types::{
    PrimaryStyle, PromptCategory, PromptComponents, PromptData, PromptMetadata, PromptType,
    Rarity, Scale, ThreadId, VibeTier,
};

/// Mythic one-off prompts that bypass the lexicon.
pub const FIXED_LEGACY_PROMPTS: [&str; 45] = [
    // single words
    "Forgive",
    "Persist",
    "Bloom",
    "Shatter",
    "Ascend",
    "Dissolve",
    "Resurrect",
    "Surrender",
    "Claim",
    "Witness",
    "Endure",
    "Grieve",
    "Celebrate",
    "Mourn",
    "Transcend",
    // questions
    "What are you becoming?",
    "What will you leave behind?",
    "Who do you choose to be?",
    "What are you protecting?",
    "What are you refusing?",
    "What will you remember?",
    "What are you learning?",
    "What do you need to say?",
    "What are you building?",
    "What are you grieving?",
    // fragments
    "The space between",
    "What remains",
    "The threshold",
    "The echo",
    "The weight",
    "The silence",
    "The light",
    "The shadow",
    "The beginning",
    "The end",
    // imperatives
    "Mark it",
    "Hold it",
    "Release it",
    "Claim it",
    "Bury it",
    "Resurrect it",
    "Transform it",
    "Transcend it",
    "Anchor it",
    "Dissolve it",
];

/// Category weights for a primary style, in category declaration order.
pub fn category_weights(style: PrimaryStyle) -> &'static [(PromptCategory, u32)] {
    use PromptCategory::*;
    match style {
        PrimaryStyle::Whispered => &[(Nostalgia, 40), (Solitude, 60)],
        PrimaryStyle::Architectural => &[(Ambition, 50), (Creation, 50)],
        PrimaryStyle::Flourished => &[(Ambition, 40), (Domesticity, 20), (Creation, 40)],
        PrimaryStyle::Staccato => &[(Solitude, 50), (Creation, 50)],
        PrimaryStyle::Monastic => &[(Nostalgia, 30), (Domesticity, 20), (Solitude, 50)],
    }
}

/// Weighted pick. Falls back to the first entry if the weights are exhausted.
pub fn pick_category<R: RandomSource>(style: PrimaryStyle, rng: &mut R) -> PromptCategory {
    let weights = category_weights(style);
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.next_unit() * total as f64;

    for (category, weight) in weights {
        roll -= *weight as f64;
        if roll < 0.0 {
            return *category;
        }
    }
    weights
        .last()
        .map(|(category, _)| *category)
        .unwrap_or(PromptCategory::Solitude)
}

/// Everything the engine needs to know about the last seal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptRequest {
    pub primary_style: PrimaryStyle,
    pub consistency: u32,
    pub signature_count: u32,
    pub active_thread: Option<ThreadId>,
    /// Vibe of the prompt being replaced; thread follow-ups keep it.
    pub previous_vibe: VibeTier,
    pub scale: Scale,
}

impl PromptRequest {
    /// The first prompt of a session.
    pub fn initial() -> Self {
        PromptRequest {
            primary_style: PrimaryStyle::Monastic,
            consistency: 50,
            signature_count: 0,
            active_thread: None,
            previous_vibe: VibeTier::Methodical,
            scale: Scale::Medium,
        }
    }
}

/// Which branch of the state machine produced a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPath {
    ThreadContinuation,
    Legacy,
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptEngine {
    pub pack_word_probability: f64,
    pub legacy_prompt_probability: f64,
    pub thread_continuation_bonus: f64,
}

impl Default for PromptEngine {
    fn default() -> Self {
        PromptEngine::from_config(&EngineConfig::default())
    }
}

impl PromptEngine {
    pub fn from_config(config: &EngineConfig) -> Self {
        PromptEngine {
            pack_word_probability: config.pack_word_probability,
            legacy_prompt_probability: config.legacy_prompt_probability,
            thread_continuation_bonus: config.thread_continuation_bonus,
        }
    }

    /// Chance that an active thread continues at this consistency.
    pub fn continuation_probability(&self, consistency: u32) -> f64 {
        (consistency as f64 / 100.0 + self.thread_continuation_bonus).min(1.0)
    }

    pub fn next_prompt<R: RandomSource>(&self, request: &PromptRequest, rng: &mut R) -> PromptData {
        self.next_prompt_traced(request, rng).0
    }

    /// Like `next_prompt`, also reporting the branch taken.
    pub fn next_prompt_traced<R: RandomSource>(
        &self,
        request: &PromptRequest,
        rng: &mut R,
    ) -> (PromptData, PromptPath) {
        if let Some(thread) = request.active_thread {
            if rng.chance(self.continuation_probability(request.consistency)) {
                debug!("continuing thread {}", thread.name());
                return (
                    thread_followup(thread, request.previous_vibe, rng),
                    PromptPath::ThreadContinuation,
                );
            }
        }

        if rng.chance(self.legacy_prompt_probability) {
            debug!("fixed legacy prompt");
            return (legacy_prompt(rng), PromptPath::Legacy);
        }

        let category = pick_category(request.primary_style, rng);
        let words = select_prompt_words(request.signature_count, self.pack_word_probability, rng);
        let thread_id = detect_thread(&words.text);
        debug!(
            "template prompt: category {:?}, thread {:?}",
            category, thread_id
        );

        let data = PromptData {
            vibe_tier: category.vibe_tier(),
            metadata: PromptMetadata {
                category,
                rarity: Rarity::Common,
                prompt_type: PromptType::Template,
                thread_id,
                used_tags: Vec::new(),
                style_influence: Some(request.primary_style),
                scale_influence: Some(request.scale),
                components: words.components(),
            },
            prompt: words.text,
        };
        (data, PromptPath::Template)
    }

    /// Prompt shown before anything has been sealed.
    pub fn initial_prompt<R: RandomSource>(&self, rng: &mut R) -> PromptData {
        self.next_prompt(&PromptRequest::initial(), rng)
    }
}

fn thread_followup<R: RandomSource>(thread: ThreadId, vibe: VibeTier, rng: &mut R) -> PromptData {
    PromptData {
        prompt: random_followup(thread, rng).to_string(),
        vibe_tier: vibe,
        metadata: PromptMetadata {
            category: PromptCategory::Thread,
            rarity: Rarity::Rare,
            prompt_type: PromptType::ThreadFollowup,
            thread_id: Some(thread),
            used_tags: Vec::new(),
            style_influence: None,
            scale_influence: None,
            components: PromptComponents {
                action: "Thread".to_string(),
                object: "Followup".to_string(),
                sentiment: thread.name().to_string(),
            },
        },
    }
}

fn legacy_prompt<R: RandomSource>(rng: &mut R) -> PromptData {
    let text = FIXED_LEGACY_PROMPTS[rng.pick_index(FIXED_LEGACY_PROMPTS.len())];
    PromptData {
        prompt: text.to_string(),
        vibe_tier: VibeTier::Raw,
        metadata: PromptMetadata {
            category: PromptCategory::Legacy,
            rarity: Rarity::Mythic,
            prompt_type: PromptType::FixedLegacy,
            thread_id: None,
            used_tags: Vec::new(),
            style_influence: None,
            scale_influence: None,
            components: PromptComponents::default(),
        },
    }
}
