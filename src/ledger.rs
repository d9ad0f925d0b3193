// Ledger: the signature history and everything derived from it (unlocks, achievements,
// mastery, threads, report flag), plus persistence through an opaque key-value store.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::achievements::{evaluate_achievements, EarnedAchievement};
use crate::classifier::display_style;
use crate::config::EngineConfig;
use crate::consistency::{score_against_history, Footprint};
use crate::error::ArchivistError;
use crate::lexicon::{check_new_unlock, unlocked_lexicon_ids, LexiconPack, CORE_LEXICON_ID};
use crate::mastery::{recent_mastery, MasterySummary};
use crate::random::RandomSource;
use crate::report::report_due;
use crate::sentiment::{analyze_sentiment, determine_seal_color, sentiment_intensity};
use crate::threads::ThreadState;
use crate::types::{
    PrimaryStyle, PromptMetadata, SecondaryStyle, SentimentData, SignatureMetrics,
    SignatureRecord,
};

pub const KEY_SIGNATURE_HISTORY: &str = "signature_history";
pub const KEY_UNLOCKED_LEXICONS: &str = "unlocked_lexicons";
pub const KEY_ACHIEVEMENTS: &str = "achievements";
pub const KEY_MASTERY_HISTORY: &str = "mastery_history";
pub const KEY_REPORT_GENERATED: &str = "report_generated";

pub const LEDGER_KEYS: [&str; 5] = [
    KEY_SIGNATURE_HISTORY,
    KEY_UNLOCKED_LEXICONS,
    KEY_ACHIEVEMENTS,
    KEY_MASTERY_HISTORY,
    KEY_REPORT_GENERATED,
];

/// String key-value persistence. The host decides where the entries live.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process store. Also the JSON object exchanged with the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ArchivistError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ArchivistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// A signature ready to be sealed: geometry and scores are already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct SealDraft {
    pub svg_path: String,
    pub ink_color: String,
    pub prompt_title: String,
    pub primary_style: PrimaryStyle,
    pub metrics: SignatureMetrics,
    pub consistency: u32,
    pub prompt_metadata: Option<PromptMetadata>,
    /// Wax colour picked in the UI; computed from the prompt text when absent.
    pub seal_color: Option<String>,
}

/// Everything that changed because of one seal.
#[derive(Debug, Clone, Serialize)]
pub struct SealOutcome {
    pub record: SignatureRecord,
    pub unlocked_pack: Option<LexiconPack>,
    pub new_achievements: Vec<EarnedAchievement>,
    pub mastery: u32,
    pub thread_changed: bool,
    pub report_due: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LedgerSettings {
    consistency_window: usize,
    mastery_window: usize,
    mastery_history_cap: usize,
    report_milestone: usize,
}

impl From<&EngineConfig> for LedgerSettings {
    fn from(config: &EngineConfig) -> Self {
        LedgerSettings {
            consistency_window: config.consistency_window,
            mastery_window: config.mastery_window,
            mastery_history_cap: config.mastery_history_cap,
            report_milestone: config.report_milestone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    history: Vec<SignatureRecord>,
    unlocked_lexicons: Vec<String>,
    achievements: Vec<EarnedAchievement>,
    mastery_history: Vec<u32>,
    threads: ThreadState,
    report_generated: bool,
    settings: LedgerSettings,
}

impl Ledger {
    pub fn new(config: &EngineConfig) -> Self {
        Ledger {
            history: Vec::new(),
            unlocked_lexicons: vec![CORE_LEXICON_ID.to_string()],
            achievements: Vec::new(),
            mastery_history: Vec::new(),
            threads: ThreadState::default(),
            report_generated: false,
            settings: LedgerSettings::from(config),
        }
    }

    pub fn history(&self) -> &[SignatureRecord] {
        &self.history
    }

    pub fn signature_count(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn unlocked_lexicons(&self) -> &[String] {
        &self.unlocked_lexicons
    }

    pub fn achievements(&self) -> &[EarnedAchievement] {
        &self.achievements
    }

    pub fn mastery_history(&self) -> &[u32] {
        &self.mastery_history
    }

    pub fn threads(&self) -> &ThreadState {
        &self.threads
    }

    pub fn report_generated(&self) -> bool {
        self.report_generated
    }

    pub fn mark_report_generated(&mut self) {
        self.report_generated = true;
    }

    pub fn last(&self) -> Option<&SignatureRecord> {
        self.history.last()
    }

    /// Consistency of a new signature against the recent window.
    pub fn consistency_for(&self, metrics: &SignatureMetrics) -> u32 {
        score_against_history(
            &Footprint::from(metrics),
            &self.history,
            self.settings.consistency_window,
        )
    }

    pub fn mastery_summary(&self) -> MasterySummary {
        MasterySummary::new(
            &self.history,
            self.settings.mastery_window,
            &self.mastery_history,
        )
    }

    /// Append a record built from `draft` and update every derived piece of state.
    pub fn seal<R: RandomSource>(&mut self, draft: SealDraft, now_ms: u64, rng: &mut R) -> SealOutcome {
        let secondary = SecondaryStyle::from_continuity(draft.metrics.continuity_ratio);
        let scores = analyze_sentiment(&draft.prompt_title);
        let dominant = determine_seal_color(&scores, rng);
        let intensity = sentiment_intensity(&draft.prompt_title);

        let id = match self.history.last() {
            Some(last) => now_ms.max(last.id + 1),
            None => now_ms,
        };
        let (thread_id, used_tags) = match &draft.prompt_metadata {
            Some(meta) => (meta.thread_id, meta.used_tags.clone()),
            None => (None, Vec::new()),
        };

        let record = SignatureRecord {
            id,
            svg_path: draft.svg_path,
            ink_color: draft.ink_color,
            style_tag: display_style(draft.primary_style, secondary),
            primary_style: draft.primary_style,
            secondary_style_label: secondary,
            metrics: draft.metrics,
            consistency: draft.consistency,
            timestamp_ms: now_ms,
            thread_id,
            used_tags,
            seal_color: draft.seal_color.unwrap_or_else(|| dominant.hex.clone()),
            sentiment_data: SentimentData {
                scores,
                intensity,
                dominant_color: dominant.name,
            },
            prompt_metadata: draft.prompt_metadata,
            prompt_title: draft.prompt_title,
        };

        let previous_count = self.history.len() as u32;
        self.history.push(record.clone());
        let current_count = self.history.len() as u32;

        let unlocked_pack = check_new_unlock(previous_count, current_count).copied();
        if let Some(pack) = &unlocked_pack {
            if !self.unlocked_lexicons.iter().any(|id| id == pack.id) {
                info!("lexicon unlocked: {}", pack.name);
                self.unlocked_lexicons.push(pack.id.to_string());
            }
        }

        let new_achievements = evaluate_achievements(
            &record,
            &self.history,
            &self.unlocked_lexicons,
            &self.achievements,
            now_ms,
        );
        for earned in &new_achievements {
            info!("achievement earned: {}", earned.id);
        }
        self.achievements.extend(new_achievements.iter().cloned());

        let mastery = recent_mastery(&self.history, self.settings.mastery_window);
        self.mastery_history.push(mastery);
        trim_front(&mut self.mastery_history, self.settings.mastery_history_cap);

        let thread_changed = self.threads.observe(record.thread_id, now_ms);
        if thread_changed {
            debug!("thread now {:?}", self.threads.current);
        }

        let due = report_due(self.history.len(), self.settings.report_milestone);
        if due {
            info!("telemetry report due at {} signatures", self.history.len());
            self.report_generated = false;
        }

        SealOutcome {
            record,
            unlocked_pack,
            new_achievements,
            mastery,
            thread_changed,
            report_due: due,
        }
    }

    /// Forget everything, keeping only the core lexicon.
    pub fn clear(&mut self) {
        let settings = self.settings;
        *self = Ledger {
            settings,
            ..Ledger::new(&EngineConfig::default())
        };
    }

    /// Write every entry as a JSON string.
    pub fn persist<S: KeyValueStore>(&self, store: &mut S) -> Result<(), ArchivistError> {
        store.set(KEY_SIGNATURE_HISTORY, serde_json::to_string(&self.history)?);
        store.set(KEY_UNLOCKED_LEXICONS, serde_json::to_string(&self.unlocked_lexicons)?);
        store.set(KEY_ACHIEVEMENTS, serde_json::to_string(&self.achievements)?);
        store.set(KEY_MASTERY_HISTORY, serde_json::to_string(&self.mastery_history)?);
        store.set(KEY_REPORT_GENERATED, self.report_generated.to_string());
        Ok(())
    }

    /// Rebuild from a store. Missing keys fall back to a fresh ledger's values.
    pub fn restore<S: KeyValueStore>(config: &EngineConfig, store: &S) -> Result<Self, ArchivistError> {
        let mut ledger = Ledger::new(config);

        if let Some(history) = read_entry::<Vec<SignatureRecord>, _>(store, KEY_SIGNATURE_HISTORY)? {
            ledger.history = history;
        }
        if let Some(unlocked) = read_entry::<Vec<String>, _>(store, KEY_UNLOCKED_LEXICONS)? {
            ledger.unlocked_lexicons = unlocked;
        }
        if let Some(achievements) = read_entry(store, KEY_ACHIEVEMENTS)? {
            ledger.achievements = achievements;
        }
        if let Some(mastery) = read_entry(store, KEY_MASTERY_HISTORY)? {
            ledger.mastery_history = mastery;
        }
        ledger.report_generated = store
            .get(KEY_REPORT_GENERATED)
            .map(|v| v == "true")
            .unwrap_or(false);

        for id in unlocked_lexicon_ids(ledger.signature_count()) {
            if !ledger.unlocked_lexicons.contains(&id) {
                ledger.unlocked_lexicons.push(id);
            }
        }
        trim_front(&mut ledger.mastery_history, ledger.settings.mastery_history_cap);
        for record in &ledger.history {
            ledger.threads.observe(record.thread_id, record.timestamp_ms);
        }

        info!(
            "ledger restored: {} signatures, {} achievements",
            ledger.history.len(),
            ledger.achievements.len()
        );
        Ok(ledger)
    }
}

/// Remove every ledger key from a store.
pub fn clear_persisted<S: KeyValueStore>(store: &mut S) {
    for key in LEDGER_KEYS {
        store.remove(key);
    }
}

fn read_entry<T: DeserializeOwned, S: KeyValueStore>(
    store: &S,
    key: &str,
) -> Result<Option<T>, ArchivistError> {
    match store.get(key) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ArchivistError::Persistence {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

fn trim_front<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}
