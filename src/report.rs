// Milestone telemetry report: pick up to three standout marks, derive per-mark telemetry,
// compare first and last, and phrase the result.

use serde::{Deserialize, Serialize};

use crate::types::{PromptType, Rarity, SignatureRecord};

const LEGACY_MARK_COUNT: usize = 3;
const TREND_THRESHOLD: i64 = 5;
const MAX_INSIGHTS: usize = 5;

/// Telemetry axes, each rounded to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkTelemetry {
    pub consistency: i64,
    pub pressure_variation: i64,
    pub speed_fluidity: i64,
    pub complexity_score: i64,
    pub confidence_level: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

impl Trend {
    fn between(start: i64, end: i64) -> Self {
        let diff = end - start;
        if diff > TREND_THRESHOLD {
            Trend::Increasing
        } else if diff < -TREND_THRESHOLD {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionMetrics {
    pub consistency_trend: Trend,
    pub pressure_trend: Trend,
    pub speed_trend: Trend,
    pub complexity_trend: Trend,
}

impl Default for EvolutionMetrics {
    fn default() -> Self {
        EvolutionMetrics {
            consistency_trend: Trend::Stable,
            pressure_trend: Trend::Stable,
            speed_trend: Trend::Stable,
            complexity_trend: Trend::Stable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSummary {
    pub id: u64,
    pub title: String,
    #[serde(flatten)]
    pub telemetry: MarkTelemetry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    pub selected_marks: Vec<SignatureRecord>,
    pub mark_telemetry: Vec<MarkSummary>,
    pub evolution_metrics: EvolutionMetrics,
    pub insights: Vec<String>,
    pub summary: String,
    pub timestamp_ms: u64,
}

fn legacy_score(record: &SignatureRecord) -> u32 {
    let mut score = record.consistency;
    if record.rarity() == Some(Rarity::Mythic) {
        score += 1000;
    }
    if record.prompt_type() == Some(PromptType::FixedLegacy) {
        score += 500;
    }
    if record.consistency > 85 {
        score += 100;
    }
    score
}

/// Up to three highest-scoring records, returned oldest first.
pub fn select_legacy_marks(records: &[SignatureRecord]) -> Vec<SignatureRecord> {
    let mut candidates: Vec<&SignatureRecord> = records.iter().collect();
    candidates.sort_by(|a, b| legacy_score(b).cmp(&legacy_score(a)));
    candidates.truncate(LEGACY_MARK_COUNT);
    candidates.sort_by_key(|r| r.id);
    candidates.into_iter().cloned().collect()
}

pub fn mark_telemetry(record: &SignatureRecord) -> MarkTelemetry {
    let m = &record.metrics;
    let consistency = record.consistency as f64;
    let pressure = (m.velocity_variance * 1000.0 + (1.0 - m.average_velocity) * 20.0).clamp(0.0, 100.0);
    let speed = (m.average_velocity * 100.0).min(100.0);
    let complexity = (m.complexity as f64 * 2.0).min(100.0);
    let confidence = consistency * 0.4 + speed * 0.3 + m.continuity_ratio * 0.3
        - m.pen_lifts as f64 * 2.0;

    MarkTelemetry {
        consistency: consistency.round() as i64,
        pressure_variation: pressure.round() as i64,
        speed_fluidity: speed.round() as i64,
        complexity_score: complexity.round() as i64,
        confidence_level: confidence.clamp(0.0, 100.0).round() as i64,
    }
}

/// First mark against last mark, per axis.
pub fn analyze_trends(marks: &[SignatureRecord]) -> EvolutionMetrics {
    let (Some(first), Some(last)) = (marks.first(), marks.last()) else {
        return EvolutionMetrics::default();
    };
    if marks.len() < 2 {
        return EvolutionMetrics::default();
    }
    let first = mark_telemetry(first);
    let last = mark_telemetry(last);

    EvolutionMetrics {
        consistency_trend: Trend::between(first.consistency, last.consistency),
        pressure_trend: Trend::between(first.pressure_variation, last.pressure_variation),
        speed_trend: Trend::between(first.speed_fluidity, last.speed_fluidity),
        complexity_trend: Trend::between(first.complexity_score, last.complexity_score),
    }
}

/// Between one and five sentences about the latest mark and the trends.
pub fn generate_insights(marks: &[SignatureRecord], trends: &EvolutionMetrics) -> Vec<String> {
    let (Some(first), Some(last)) = (marks.first(), marks.last()) else {
        return Vec::new();
    };
    let first = mark_telemetry(first);
    let latest = mark_telemetry(last);
    let mut insights = Vec::new();

    if trends.consistency_trend == Trend::Increasing {
        insights.push(format!(
            "Your muscle memory is locking in. Consistency has improved by {}% across these marks.",
            latest.consistency - first.consistency
        ));
    } else if latest.consistency > 85 {
        insights.push(format!(
            "You have achieved a Master's stability. Your consistency remains exceptionally high at {}%.",
            latest.consistency
        ));
    } else {
        insights.push(
            "Your hand is still searching for its true form. Variation remains high.".to_string(),
        );
    }

    if trends.speed_trend == Trend::Increasing && latest.confidence_level > 70 {
        insights.push(
            "You are trusting your reflexes more. Velocity has increased, signaling growing confidence."
                .to_string(),
        );
    } else if latest.speed_fluidity < 30 {
        insights.push(
            "You are drawing with deliberation and weight, prioritizing precision over speed."
                .to_string(),
        );
    }

    if trends.complexity_trend == Trend::Decreasing {
        insights.push(
            "You are simplifying. Unnecessary flourishes are being shed in favor of efficiency."
                .to_string(),
        );
    } else if latest.complexity_score > 70 {
        insights.push(
            "Your signature is evolving into an intricate seal, rich with detail and structure."
                .to_string(),
        );
    }

    if trends.pressure_trend == Trend::Increasing {
        insights.push(
            "Your strokes are becoming more dynamic, showing a wider range of pressure and emphasis."
                .to_string(),
        );
    }

    if insights.len() < 3 {
        let presence = if latest.confidence_level > 80 {
            "commanding"
        } else {
            "fluid"
        };
        insights.push(format!(
            "Your mark has established a distinct {presence} presence on the page."
        ));
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

/// Full report over the whole history. `None` when nothing has been sealed.
pub fn generate_report(records: &[SignatureRecord], now_ms: u64) -> Option<TelemetryReport> {
    if records.is_empty() {
        return None;
    }

    let selected_marks = select_legacy_marks(records);
    let trends = analyze_trends(&selected_marks);
    let insights = generate_insights(&selected_marks, &trends);
    let mark_telemetry = selected_marks
        .iter()
        .map(|r| MarkSummary {
            id: r.id,
            title: r.prompt_title.clone(),
            telemetry: mark_telemetry(r),
        })
        .collect();

    let pace = if trends.speed_trend == Trend::Increasing {
        "accelerating"
    } else {
        "settling"
    };
    let structure = match trends.complexity_trend {
        Trend::Increasing => "growing",
        Trend::Decreasing => "refining",
        Trend::Stable => "holding steady",
    };
    let summary = format!(
        "Analysis of {} signatures reveals a {} consistency trend. Your hand is {}, while the structural complexity of your mark is {}.",
        records.len(),
        trend_word(trends.consistency_trend),
        pace,
        structure
    );

    Some(TelemetryReport {
        selected_marks,
        mark_telemetry,
        evolution_metrics: trends,
        insights,
        summary,
        timestamp_ms: now_ms,
    })
}

fn trend_word(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "increasing",
        Trend::Stable => "stable",
        Trend::Decreasing => "decreasing",
    }
}

/// True when the history length has just reached a report milestone.
pub fn report_due(history_len: usize, milestone: usize) -> bool {
    milestone > 0 && history_len > 0 && history_len % milestone == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::tests::record;

    #[test]
    fn legacy_marks_prefer_mythic_then_consistency() {
        let records = vec![
            record(1, 99, None),
            record(2, 10, Some(Rarity::Mythic)),
            record(3, 50, None),
            record(4, 86, None),
            record(5, 80, None),
        ];
        let ids: Vec<u64> = select_legacy_marks(&records).iter().map(|r| r.id).collect();
        // scores: 199, 1510, 50, 186, 80
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn telemetry_axes() {
        let mut r = record(1, 80, None);
        r.metrics.average_velocity = 0.5;
        r.metrics.velocity_variance = 0.02;
        r.metrics.complexity = 60;
        r.metrics.continuity_ratio = 100.0;
        r.metrics.pen_lifts = 2;
        let t = mark_telemetry(&r);
        assert_eq!(t.consistency, 80);
        assert_eq!(t.pressure_variation, 30); // 20 + 10
        assert_eq!(t.speed_fluidity, 50);
        assert_eq!(t.complexity_score, 100);
        assert_eq!(t.confidence_level, 73); // 32 + 15 + 30 - 4 = 73
    }

    #[test]
    fn single_mark_is_stable() {
        let trends = analyze_trends(&[record(1, 10, None)]);
        assert_eq!(trends, EvolutionMetrics::default());
    }

    #[test]
    fn rising_consistency_is_reported() {
        let marks = vec![record(1, 60, None), record(2, 70, None), record(3, 90, None)];
        let trends = analyze_trends(&marks);
        assert_eq!(trends.consistency_trend, Trend::Increasing);
        let insights = generate_insights(&marks, &trends);
        assert!(insights[0].contains("improved by 30%"));
        assert!(insights.len() >= 3 && insights.len() <= 5);
    }

    #[test]
    fn report_summary_and_milestones() {
        assert!(generate_report(&[], 0).is_none());
        let records: Vec<_> = (1..=4).map(|i| record(i, 50, None)).collect();
        let report = generate_report(&records, 1234).unwrap();
        assert_eq!(report.selected_marks.len(), 3);
        assert_eq!(report.mark_telemetry.len(), 3);
        assert_eq!(report.timestamp_ms, 1234);
        assert!(report.summary.starts_with("Analysis of 4 signatures reveals a stable"));
        assert!(report.summary.ends_with("holding steady."));

        assert!(report_due(30, 30));
        assert!(report_due(60, 30));
        assert!(!report_due(31, 30));
        assert!(!report_due(0, 30));
    }
}
