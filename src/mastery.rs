// Mastery: rolling mean of recent consistency, its trend, and the ink level it earns.

use serde::{Deserialize, Serialize};

use crate::types::SignatureRecord;

pub const DEFAULT_MASTERY_WINDOW: usize = 10;

/// Trend threshold in consistency points.
const TREND_MARGIN: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTrend {
    Improving,
    Stable,
    Declining,
}

/// Rounded mean consistency of the last `window` records; 0 for an empty history.
pub fn recent_mastery(history: &[SignatureRecord], window: usize) -> u32 {
    let recent = tail(history, window);
    if recent.is_empty() {
        return 0;
    }
    let sum: u64 = recent.iter().map(|r| r.consistency as u64).sum();
    (sum as f64 / recent.len() as f64).round() as u32
}

pub fn mastery_trend(history: &[SignatureRecord], window: usize) -> MasteryTrend {
    let values: Vec<u32> = tail(history, window).iter().map(|r| r.consistency).collect();
    trend_of(&values)
}

/// Compare the mean of the first half (floor(n/2) samples) against the rest.
/// Fewer than two samples is stable.
pub fn trend_of(values: &[u32]) -> MasteryTrend {
    if values.len() < 2 {
        return MasteryTrend::Stable;
    }
    let mid = values.len() / 2;
    let (first, second) = values.split_at(mid);
    let first_avg = mean(first);
    let second_avg = mean(second);

    if second_avg > first_avg + TREND_MARGIN {
        MasteryTrend::Improving
    } else if second_avg < first_avg - TREND_MARGIN {
        MasteryTrend::Declining
    } else {
        MasteryTrend::Stable
    }
}

fn mean(values: &[u32]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn tail<T>(items: &[T], window: usize) -> &[T] {
    &items[items.len().saturating_sub(window)..]
}

/// Ink grade shown on the mastery meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasteryLevel {
    Gold,
    Silver,
    Ink,
    Muddy,
}

impl MasteryLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => MasteryLevel::Gold,
            70..=89 => MasteryLevel::Silver,
            40..=69 => MasteryLevel::Ink,
            _ => MasteryLevel::Muddy,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MasteryLevel::Gold => "#FFD700",
            MasteryLevel::Silver => "#C0C0C0",
            MasteryLevel::Ink => "#000000",
            MasteryLevel::Muddy => "#5d4037",
        }
    }
}

/// Snapshot handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterySummary {
    pub score: u32,
    pub trend: MasteryTrend,
    pub level: MasteryLevel,
    pub color: String,
    /// Score after each of the recent seals, oldest first.
    pub history: Vec<u32>,
}

impl MasterySummary {
    pub fn new(records: &[SignatureRecord], window: usize, history: &[u32]) -> Self {
        let score = recent_mastery(records, window);
        let level = MasteryLevel::from_score(score);
        MasterySummary {
            score,
            trend: mastery_trend(records, window),
            level,
            color: level.color().to_string(),
            history: history.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::tests::record;

    fn history(scores: &[u32]) -> Vec<SignatureRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &c)| record(i as u64 + 1, c, None))
            .collect()
    }

    #[test]
    fn empty_history_is_zero_and_stable() {
        assert_eq!(recent_mastery(&[], DEFAULT_MASTERY_WINDOW), 0);
        assert_eq!(mastery_trend(&[], DEFAULT_MASTERY_WINDOW), MasteryTrend::Stable);
    }

    #[test]
    fn mastery_uses_last_window() {
        let mut scores = vec![0u32; 5];
        scores.extend([80, 90, 100, 70, 60, 80, 90, 100, 70, 60]);
        assert_eq!(recent_mastery(&history(&scores), 10), 80);
        assert_eq!(recent_mastery(&history(&[33, 34]), 10), 34);
    }

    #[test]
    fn rising_scores_improve() {
        let records = history(&[50, 60, 70, 80, 90]);
        // first half [50, 60] vs [70, 80, 90]
        assert_eq!(mastery_trend(&records, 10), MasteryTrend::Improving);
    }

    #[test]
    fn trend_thresholds() {
        assert_eq!(trend_of(&[80]), MasteryTrend::Stable);
        assert_eq!(trend_of(&[80, 83]), MasteryTrend::Stable);
        assert_eq!(trend_of(&[80, 84]), MasteryTrend::Improving);
        assert_eq!(trend_of(&[90, 80, 70, 60]), MasteryTrend::Declining);
    }

    #[test]
    fn levels_and_colors() {
        assert_eq!(MasteryLevel::from_score(95), MasteryLevel::Gold);
        assert_eq!(MasteryLevel::from_score(90), MasteryLevel::Gold);
        assert_eq!(MasteryLevel::from_score(70), MasteryLevel::Silver);
        assert_eq!(MasteryLevel::from_score(40), MasteryLevel::Ink);
        assert_eq!(MasteryLevel::from_score(39), MasteryLevel::Muddy);
        assert_eq!(MasteryLevel::Muddy.color(), "#5d4037");
    }

    #[test]
    fn summary_bundles_score_and_level() {
        let records = history(&[50, 60, 70, 80, 90]);
        let summary = MasterySummary::new(&records, 10, &[50, 55, 60, 65, 70]);
        assert_eq!(summary.score, 70);
        assert_eq!(summary.level, MasteryLevel::Silver);
        assert_eq!(summary.trend, MasteryTrend::Improving);
        assert_eq!(summary.history.len(), 5);
    }
}
