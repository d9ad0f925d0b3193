// Narrative threads: keyword detection, follow-up phrases, and the active-thread state.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::types::ThreadId;

/// Threads in detection order.
pub const THREAD_ORDER: [ThreadId; 10] = [
    ThreadId::Grief,
    ThreadId::Joy,
    ThreadId::Transformation,
    ThreadId::Resistance,
    ThreadId::Homecoming,
    ThreadId::Becoming,
    ThreadId::Reckoning,
    ThreadId::Creation,
    ThreadId::Solitude,
    ThreadId::Ambition,
];

/// Maximum entries kept in `ThreadState::history`.
pub const THREAD_HISTORY_CAP: usize = 3;

impl ThreadId {
    /// Substrings that mark a prompt as belonging to this thread.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ThreadId::Grief => &["loss", "gone", "missing", "weight", "silence", "carry", "goodbye"],
            ThreadId::Joy => &["celebrate", "light", "warmth", "grace", "yes", "expand", "grateful"],
            ThreadId::Transformation => {
                &["becoming", "shedding", "bridge", "threshold", "emerge", "chrysalis"]
            }
            ThreadId::Resistance => {
                &["refuse", "stand", "protect", "boundary", "fight", "defiance", "no"]
            }
            ThreadId::Homecoming => {
                &["return", "belong", "home", "welcome", "anchor", "arrival", "place"]
            }
            ThreadId::Becoming => {
                &["step into", "claim", "earn", "emerge", "announce", "future", "version"]
            }
            ThreadId::Reckoning => {
                &["face", "truth", "accountable", "debt", "learn", "growth", "witness"]
            }
            ThreadId::Creation => &["make", "build", "birth", "craft", "create", "vision", "bless"],
            ThreadId::Solitude => &[
                "alone",
                "quiet",
                "conversation with yourself",
                "only you",
                "discover",
                "truth",
            ],
            ThreadId::Ambition => &[
                "claim",
                "dream",
                "build toward",
                "legacy",
                "outlive",
                "future",
                "announce",
            ],
        }
    }

    /// Phrases offered when the thread continues.
    pub fn followups(&self) -> &'static [&'static str] {
        match self {
            ThreadId::Grief => &[
                "to honor what's gone",
                "the space where they were",
                "what you're learning to carry",
                "the weight that won't lift",
                "to say goodbye again",
                "the silence they left",
                "what you're grieving in yourself",
                "to mark the threshold of loss",
            ],
            ThreadId::Joy => &[
                "to hold this moment",
                "to let it expand",
                "what you're celebrating",
                "the light that found you",
                "to say yes again",
                "the warmth that stays",
                "what you're grateful for",
                "to mark the threshold of grace",
            ],
            ThreadId::Transformation => &[
                "what you're shedding",
                "what you're becoming",
                "the bridge between selves",
                "the version you're leaving behind",
                "to mark the threshold of change",
                "what's emerging",
                "the chrysalis you're in",
                "to witness your own becoming",
            ],
            ThreadId::Resistance => &[
                "what you refuse",
                "the line you won't cross",
                "to stand firm",
                "what you're protecting",
                "the boundary you're claiming",
                "to say no with your whole body",
                "what you're fighting for",
                "to mark the threshold of defiance",
            ],
            ThreadId::Homecoming => &[
                "what you've returned to",
                "the threshold you've crossed",
                "what feels like home now",
                "the place you belong",
                "to mark your arrival",
                "what welcomed you back",
                "the anchor you've found",
                "to say: I'm home",
            ],
            ThreadId::Becoming => &[
                "what you're stepping into",
                "the version you're claiming",
                "the name you're earning",
                "what's emerging in you",
                "to mark the threshold of becoming",
                "what you're no longer afraid of",
                "the future you're building",
                "to announce yourself",
            ],
            ThreadId::Reckoning => &[
                "what you're facing",
                "the truth you're naming",
                "to hold yourself accountable",
                "what you're making right",
                "the debt you're paying",
                "to mark the threshold of reckoning",
                "what you're learning from",
                "to witness your own growth",
            ],
            ThreadId::Creation => &[
                "what you're making next",
                "the vision that's emerging",
                "to bless what you've created",
                "what's being born",
                "to mark the threshold of creation",
                "the work that sustains you",
                "what only you can make",
                "to announce your making",
            ],
            ThreadId::Solitude => &[
                "what you're learning alone",
                "the conversation with yourself",
                "what only you will know",
                "to honor your own company",
                "to mark the threshold of solitude",
                "what you're discovering in the quiet",
                "the truth you're facing",
                "to witness yourself",
            ],
            ThreadId::Ambition => &[
                "what you're claiming next",
                "the dream you're stepping into",
                "to announce your intention",
                "what you're building toward",
                "to mark the threshold of ambition",
                "the legacy you're creating",
                "what will outlive you",
                "to write yourself into the future",
            ],
        }
    }
}

/// First thread (in table order) with a keyword contained in the lower-cased text.
pub fn detect_thread(text: &str) -> Option<ThreadId> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    THREAD_ORDER
        .into_iter()
        .find(|thread| thread.keywords().iter().any(|k| lowered.contains(k)))
}

pub fn random_followup<R: RandomSource>(thread: ThreadId, rng: &mut R) -> &'static str {
    let followups = thread.followups();
    followups[rng.pick_index(followups.len())]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadVisit {
    pub id: ThreadId,
    pub timestamp_ms: u64,
}

/// The currently active thread and the last few threads entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThreadState {
    pub current: Option<ThreadId>,
    pub history: Vec<ThreadVisit>,
}

impl ThreadState {
    /// Record the thread carried by the latest signature. Returns true when the active thread changed.
    pub fn observe(&mut self, thread: Option<ThreadId>, now_ms: u64) -> bool {
        let Some(id) = thread else {
            return false;
        };
        if self.current == Some(id) {
            return false;
        }

        self.current = Some(id);
        self.history.push(ThreadVisit {
            id,
            timestamp_ms: now_ms,
        });
        if self.history.len() > THREAD_HISTORY_CAP {
            let excess = self.history.len() - THREAD_HISTORY_CAP;
            self.history.drain(..excess);
        }
        true
    }

    pub fn is_active(&self, thread: ThreadId) -> bool {
        self.current == Some(thread)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn detects_in_table_order() {
        assert_eq!(detect_thread("The weight of LOSS"), Some(ThreadId::Grief));
        // "truth" is both Reckoning and Solitude; Reckoning comes first.
        assert_eq!(detect_thread("a hidden truth"), Some(ThreadId::Reckoning));
        assert_eq!(detect_thread("Legacy of stars"), Some(ThreadId::Ambition));
        assert_eq!(detect_thread(""), None);
        assert_eq!(detect_thread("Walks path quietly"), Some(ThreadId::Solitude));
        assert_eq!(detect_thread("Rivers drift"), None);
    }

    #[test]
    fn every_thread_has_followups() {
        for thread in THREAD_ORDER {
            assert_eq!(thread.followups().len(), 8, "{}", thread.name());
            assert!(!thread.keywords().is_empty());
        }
    }

    #[test]
    fn followup_pick_uses_rng() {
        let mut first = ScriptedRandom::constant(0.0);
        assert_eq!(random_followup(ThreadId::Joy, &mut first), "to hold this moment");
        let mut last = ScriptedRandom::constant(0.99);
        assert_eq!(
            random_followup(ThreadId::Joy, &mut last),
            "to mark the threshold of grace"
        );
    }

    #[test]
    fn state_keeps_last_three_changes() {
        let mut state = ThreadState::default();
        assert!(!state.observe(None, 1));
        assert!(state.observe(Some(ThreadId::Grief), 2));
        assert!(!state.observe(Some(ThreadId::Grief), 3));
        assert!(state.observe(Some(ThreadId::Joy), 4));
        assert!(state.observe(Some(ThreadId::Becoming), 5));
        assert!(state.observe(Some(ThreadId::Grief), 6));

        assert!(state.is_active(ThreadId::Grief));
        let ids: Vec<_> = state.history.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![ThreadId::Joy, ThreadId::Becoming, ThreadId::Grief]);
        assert_eq!(state.history[2].timestamp_ms, 6);

        state.clear();
        assert_eq!(state, ThreadState::default());
    }
}
