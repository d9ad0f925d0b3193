// Style classification: each style accumulates points from independent threshold rules.
// Highest score wins; ties go to the first-declared style.

use serde::{Deserialize, Serialize};

use crate::types::{PrimaryStyle, SecondaryStyle, SignatureMetrics, StyleAssessment};

/// The metric vector the classifier scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StyleInputs {
    pub velocity: f64,
    pub complexity: u32,
    pub density: f64,
    pub curvature: f64,
    pub pen_lifts: u32,
    pub consistency_angles: f64,
    pub velocity_variance: f64,
}

impl From<&SignatureMetrics> for StyleInputs {
    fn from(m: &SignatureMetrics) -> Self {
        StyleInputs {
            velocity: m.average_velocity,
            complexity: m.complexity,
            density: m.density,
            curvature: m.curvature,
            pen_lifts: m.pen_lifts,
            consistency_angles: m.consistency_angles,
            velocity_variance: m.velocity_variance,
        }
    }
}

/// Raw points for one style.
pub fn style_score(style: PrimaryStyle, m: &StyleInputs) -> u32 {
    let rules: Vec<(bool, u32)> = match style {
        PrimaryStyle::Whispered => vec![
            (m.velocity < 0.4, 30),
            (m.complexity < 15, 30),
            (m.density < 0.3, 40),
        ],
        PrimaryStyle::Architectural => vec![
            ((0.4..=0.7).contains(&m.velocity), 20),
            ((20..=40).contains(&m.complexity), 20),
            (m.density > 0.6, 30),
            (m.consistency_angles > 0.8, 30),
        ],
        PrimaryStyle::Flourished => vec![
            (m.velocity > 0.5 && m.velocity < 0.9, 20),
            (m.complexity > 35, 30),
            (m.curvature > 60.0, 50),
        ],
        PrimaryStyle::Staccato => vec![
            (m.pen_lifts > 5, 60),
            (m.velocity_variance > 0.2, 40),
            (m.complexity > 10, 10),
        ],
        PrimaryStyle::Monastic => vec![
            (m.velocity < 0.5, 30),
            (m.complexity < 20, 20),
            (m.density < 0.4, 20),
            (m.density < 0.5, 30),
        ],
    };

    rules
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, points)| points)
        .sum()
}

/// Pick the primary style and a confidence in 20..=100.
pub fn classify_style(m: &StyleInputs) -> StyleAssessment {
    let mut best = PrimaryStyle::Monastic;
    let mut max_score = 0u32;
    let mut any = false;

    for style in PrimaryStyle::ALL {
        let score = style_score(style, m);
        if !any || score > max_score {
            best = style;
            max_score = score;
            any = true;
        }
    }

    if max_score == 0 {
        best = if m.velocity > 0.8 {
            PrimaryStyle::Flourished
        } else {
            PrimaryStyle::Monastic
        };
    }

    StyleAssessment {
        primary_style: best,
        style_confidence: max_score.clamp(20, 100) as u8,
    }
}

impl SecondaryStyle {
    /// Fluid above 80% continuity, Fragmented below 40%.
    pub fn from_continuity(continuity_ratio: f64) -> Option<SecondaryStyle> {
        if continuity_ratio > 80.0 {
            Some(SecondaryStyle::Fluid)
        } else if continuity_ratio < 40.0 {
            Some(SecondaryStyle::Fragmented)
        } else {
            None
        }
    }
}

/// "{secondary} {primary}", or the primary alone.
pub fn display_style(primary: PrimaryStyle, secondary: Option<SecondaryStyle>) -> String {
    match secondary {
        Some(s) => format!("{} {}", s.name(), primary.name()),
        None => primary.name().to_string(),
    }
}
