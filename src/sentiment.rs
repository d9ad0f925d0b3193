// Sentiment scoring of prompt text into six mood buckets, and the wax seal colour they imply.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Mood buckets in table order. Order matters for seal tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Red,
    Blue,
    Gold,
    Purple,
    Green,
    Gray,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Red,
        Mood::Blue,
        Mood::Gold,
        Mood::Purple,
        Mood::Green,
        Mood::Gray,
    ];

    pub fn seal(&self) -> SealColor {
        let (hex, name) = match self {
            Mood::Red => ("#b71c1c", "Passionate"),
            Mood::Blue => ("#1a237e", "Melancholy"),
            Mood::Gold => ("#ffb300", "Hopeful"),
            Mood::Purple => ("#4a148c", "Mystical"),
            Mood::Green => ("#1b5e20", "Natural"),
            Mood::Gray => ("#455a64", "Contemplative"),
        };
        SealColor {
            mood: *self,
            hex: hex.to_string(),
            name: name.to_string(),
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Red => &[
                "fire", "burn", "blood", "fierce", "wild", "sharp", "rage", "love", "heat",
                "intense", "fast", "scream", "anger", "brave", "fight", "war",
            ],
            Mood::Blue => &[
                "sad", "tear", "rain", "lost", "cold", "blue", "fading", "whisper", "grief",
                "alone", "silent", "deep", "ocean", "river", "drift", "cry",
            ],
            Mood::Gold => &[
                "sun", "light", "bright", "gold", "shine", "hope", "joy", "smile", "warm", "day",
                "dawn", "rise", "glow", "laugh", "peace", "glory",
            ],
            Mood::Purple => &[
                "dream", "night", "star", "void", "magic", "soul", "spirit", "purple", "dark",
                "mystery", "shadow", "moon", "vision", "secret", "ether", "phantom",
            ],
            Mood::Green => &[
                "tree", "leaf", "root", "grow", "earth", "green", "forest", "life", "bloom",
                "seed", "moss", "nature", "heal", "spring", "garden", "wild",
            ],
            Mood::Gray => &[
                "stone", "gray", "fog", "mist", "still", "calm", "quiet", "dust", "ash", "old",
                "ancient", "wait", "time", "rock", "iron", "neutral",
            ],
        }
    }
}

/// Wax colour chosen for a seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealColor {
    pub mood: Mood,
    pub hex: String,
    pub name: String,
}

/// Keyword hit counts per mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SentimentScores {
    pub red: u32,
    pub blue: u32,
    pub gold: u32,
    pub purple: u32,
    pub green: u32,
    pub gray: u32,
}

impl SentimentScores {
    pub fn get(&self, mood: Mood) -> u32 {
        match mood {
            Mood::Red => self.red,
            Mood::Blue => self.blue,
            Mood::Gold => self.gold,
            Mood::Purple => self.purple,
            Mood::Green => self.green,
            Mood::Gray => self.gray,
        }
    }

    fn bump(&mut self, mood: Mood) {
        let slot = match mood {
            Mood::Red => &mut self.red,
            Mood::Blue => &mut self.blue,
            Mood::Gold => &mut self.gold,
            Mood::Purple => &mut self.purple,
            Mood::Green => &mut self.green,
            Mood::Gray => &mut self.gray,
        };
        *slot += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mood, u32)> + '_ {
        Mood::ALL.into_iter().map(move |mood| (mood, self.get(mood)))
    }

    pub fn max(&self) -> u32 {
        self.iter().map(|(_, score)| score).max().unwrap_or(0)
    }
}

/// Score free text. Words are lower-cased and split on whitespace.
pub fn analyze_sentiment(text: &str) -> SentimentScores {
    let lowered = text.to_lowercase();
    analyze_words(lowered.split_whitespace())
}

/// Score pre-tokenized words: each word counts once for every mood it contains a keyword of.
pub fn analyze_words<'a, I>(words: I) -> SentimentScores
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scores = SentimentScores::default();
    for word in words {
        let word = word.to_lowercase();
        for mood in Mood::ALL {
            if mood.keywords().iter().any(|k| word.contains(k)) {
                scores.bump(mood);
            }
        }
    }
    scores
}

/// Pick the seal colour for a set of scores.
///
/// A strictly higher score takes the lead. An equal positive score from a non-gray
/// mood takes the lead on a coin flip, so gray never wins a tie. With no keyword
/// hits at all the colour is uniformly random.
pub fn determine_seal_color<R: RandomSource>(scores: &SentimentScores, rng: &mut R) -> SealColor {
    let mut max_score = 0;
    let mut best = Mood::Gray;

    for (mood, score) in scores.iter() {
        if score > max_score {
            max_score = score;
            best = mood;
        } else if score == max_score && max_score > 0 && mood != Mood::Gray && rng.next_unit() > 0.5
        {
            best = mood;
        }
    }

    if max_score == 0 {
        let idx = rng.pick_index(Mood::ALL.len());
        return Mood::ALL[idx].seal();
    }

    best.seal()
}

const INTENSE_WORDS: [&str; 9] = [
    "wild", "fierce", "burn", "scream", "forever", "never", "always", "broken", "shatter",
];

/// 0-100 emotional intensity: base 50, +20 for "!", +10 per intense word.
pub fn sentiment_intensity(text: &str) -> u8 {
    let mut intensity: i32 = 50;

    if text.contains('!') {
        intensity += 20;
    }

    for word in text.split(' ') {
        let word = word.to_lowercase();
        if INTENSE_WORDS.iter().any(|iw| word.contains(iw)) {
            intensity += 10;
        }
    }

    intensity.clamp(0, 100) as u8
}
