// Live ink behaviour while drawing: stroke width and the blur/opacity flow filter.

use serde::{Deserialize, Serialize};

use crate::types::StrokePoint;

/// Below this pointer speed (px/ms) the ink pools.
const SOAK_VELOCITY: f64 = 0.05;
/// Above this pointer speed the ink thins out.
const FLOW_VELOCITY: f64 = 0.15;
const DEFAULT_STROKE_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkEffect {
    Soaking,
    Balanced,
    Flowing,
}

/// Filter parameters for the stroke being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkFlow {
    pub blur: f64,
    pub opacity: f64,
    pub effect: InkEffect,
    pub tapering: bool,
}

pub fn ink_flow(velocity: f64) -> InkFlow {
    if velocity < SOAK_VELOCITY {
        InkFlow {
            blur: 2.5,
            opacity: 1.1,
            effect: InkEffect::Soaking,
            tapering: false,
        }
    } else if velocity > FLOW_VELOCITY {
        InkFlow {
            blur: 0.5,
            opacity: 0.95,
            effect: InkEffect::Flowing,
            tapering: true,
        }
    } else {
        InkFlow {
            blur: 1.0,
            opacity: 1.0,
            effect: InkEffect::Balanced,
            tapering: false,
        }
    }
}

/// Speed between two consecutive samples, px/ms. A zero time delta counts as 1ms.
pub fn pointer_velocity(from: &StrokePoint, to: &StrokePoint) -> f64 {
    let dt = to.time.saturating_sub(from.time).max(1);
    from.distance_to(to) / dt as f64
}

/// Rendered width of a finished stroke: slow strokes pool wide, fast strokes taper.
pub fn stroke_width(points: &[StrokePoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return DEFAULT_STROKE_WIDTH;
    };
    if points.len() < 2 {
        return DEFAULT_STROKE_WIDTH;
    }

    let distance: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
    let elapsed = last.time.saturating_sub(first.time).max(1);
    let velocity = distance / elapsed as f64;

    if velocity > FLOW_VELOCITY {
        (3.0 - velocity * 8.0).max(0.5)
    } else if velocity < SOAK_VELOCITY {
        (4.0 + 1.0 / (velocity + 0.1)).min(8.0)
    } else {
        (8.0 - velocity * 5.0).clamp(1.0, 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(step: f64, dt: u64, n: usize) -> Vec<StrokePoint> {
        (0..n)
            .map(|i| StrokePoint::new(i as f64 * step, 0.0, i as u64 * dt))
            .collect()
    }

    #[test]
    fn flow_bands() {
        assert_eq!(ink_flow(0.01).effect, InkEffect::Soaking);
        assert_eq!(ink_flow(0.05).effect, InkEffect::Balanced);
        assert_eq!(ink_flow(0.15).effect, InkEffect::Balanced);
        let fast = ink_flow(0.5);
        assert_eq!(fast.effect, InkEffect::Flowing);
        assert!(fast.tapering);
    }

    #[test]
    fn widths() {
        assert_eq!(stroke_width(&[]), 3.0);
        assert_eq!(stroke_width(&line(1.0, 1, 1)), 3.0);
        // 1 px/ms tapers to the floor
        assert_eq!(stroke_width(&line(1.0, 1, 5)), 0.5);
        // 0.1 px/ms sits in the balanced band: 8 - 0.5 capped at 6
        assert_eq!(stroke_width(&line(1.0, 10, 5)), 6.0);
        // stationary pen pools: 4 + 1/0.1 capped at 8
        assert_eq!(stroke_width(&line(0.0, 10, 5)), 8.0);
    }

    #[test]
    fn velocity_guards_zero_delta() {
        let a = StrokePoint::new(0.0, 0.0, 5);
        let b = StrokePoint::new(3.0, 4.0, 5);
        assert_eq!(pointer_velocity(&a, &b), 5.0);
        let c = StrokePoint::new(3.0, 4.0, 15);
        assert!((pointer_velocity(&a, &c) - 0.5).abs() < 1e-12);
    }
}
