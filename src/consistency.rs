// Consistency scoring: how closely a new signature's size matches the recent ones.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, SignatureMetrics, SignatureRecord};

/// The aggregate a signature is compared on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub path_length: f64,
    pub bounding_box: BoundingBox,
}

impl From<&SignatureMetrics> for Footprint {
    fn from(m: &SignatureMetrics) -> Self {
        Footprint {
            path_length: m.path_length,
            bounding_box: m.bounding_box,
        }
    }
}

/// 0-100 similarity to the average of `prior`. 100 when there is nothing to compare against.
pub fn score_consistency(current: &Footprint, prior: &[Footprint]) -> u32 {
    if prior.is_empty() {
        return 100;
    }

    let count = prior.len() as f64;
    let avg_length = prior.iter().map(|f| f.path_length).sum::<f64>() / count;
    let avg_area = prior.iter().map(|f| f.bounding_box.area()).sum::<f64>() / count;

    let length_ratio = similarity(current.path_length, avg_length);
    let area_ratio = similarity(current.bounding_box.area(), avg_area);

    (((length_ratio + area_ratio) / 2.0) * 100.0).round() as u32
}

/// Score against the last `window` records of a history.
pub fn score_against_history(
    current: &Footprint,
    history: &[SignatureRecord],
    window: usize,
) -> u32 {
    let start = history.len().saturating_sub(window);
    let prior: Vec<Footprint> = history[start..]
        .iter()
        .map(|record| Footprint::from(&record.metrics))
        .collect();
    score_consistency(current, &prior)
}

/// min/max of two non-negative magnitudes; two zeros are identical.
fn similarity(a: f64, b: f64) -> f64 {
    let hi = a.max(b);
    if hi <= 0.0 {
        return 1.0;
    }
    (a.min(b) / hi).clamp(0.0, 1.0)
}
