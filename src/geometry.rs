// Geometry & metrics: smoothed path construction and the handwriting measures.
// All functions are total: empty or single-point input yields a neutral default, never NaN.

use std::f64::consts::PI;

use crate::classifier::{classify_style, StyleInputs};
use crate::error::ArchivistError;
use crate::types::*;

/// Chords per quadratic segment when measuring curve length.
const CURVE_FLATTEN_STEPS: usize = 16;

/// Curvature is average turning angle per point, scaled by this factor.
const CURVATURE_SCALE: f64 = 500.0;

/// Largest accepted coordinate magnitude, in canvas pixels. Keeps areas and lengths finite.
pub const MAX_COORDINATE: f64 = 1.0e6;

/// One drawing command of the smoothed signature path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(StrokePoint),
    QuadTo {
        control: StrokePoint,
        end: StrokePoint,
    },
    LineTo(StrokePoint),
}

/// Smooth a stroke into quadratic segments through point midpoints.
/// Strokes with fewer than two points produce no segments.
pub fn smoothed_segments(points: &[StrokePoint]) -> Vec<PathSegment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(PathSegment::MoveTo(points[0]));

    for i in 1..points.len() - 1 {
        let current = points[i];
        let next = points[i + 1];
        let mid = StrokePoint::new(
            (current.x + next.x) / 2.0,
            (current.y + next.y) / 2.0,
            current.time,
        );
        segments.push(PathSegment::QuadTo {
            control: current,
            end: mid,
        });
    }

    segments.push(PathSegment::LineTo(points[points.len() - 1]));
    segments
}

/// SVG path data for all strokes, joined by a space.
pub fn svg_path(strokes: &[Stroke]) -> String {
    strokes
        .iter()
        .map(|stroke| stroke_path_data(&stroke.points))
        .collect::<Vec<_>>()
        .join(" ")
}

fn stroke_path_data(points: &[StrokePoint]) -> String {
    let mut data = String::new();
    for segment in smoothed_segments(points) {
        let part = match segment {
            PathSegment::MoveTo(p) => format!("M {} {}", p.x, p.y),
            PathSegment::QuadTo { control, end } => {
                format!(" Q {} {} {} {}", control.x, control.y, end.x, end.y)
            }
            PathSegment::LineTo(p) => format!(" L {} {}", p.x, p.y),
        };
        data.push_str(&part);
    }
    data
}

/// Total geometric length of the smoothed path. Degenerate paths report 1.
pub fn path_length(strokes: &[Stroke]) -> f64 {
    let total: f64 = strokes
        .iter()
        .map(|stroke| segments_length(&smoothed_segments(&stroke.points)))
        .sum();

    if total > 0.0 && total.is_finite() {
        total
    } else {
        1.0
    }
}

fn segments_length(segments: &[PathSegment]) -> f64 {
    let mut length = 0.0;
    let mut cursor: Option<StrokePoint> = None;

    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => cursor = Some(p),
            PathSegment::LineTo(p) => {
                if let Some(from) = cursor {
                    length += from.distance_to(&p);
                }
                cursor = Some(p);
            }
            PathSegment::QuadTo { control, end } => {
                if let Some(from) = cursor {
                    length += quad_length(from, control, end);
                }
                cursor = Some(end);
            }
        }
    }

    length
}

fn quad_length(start: StrokePoint, control: StrokePoint, end: StrokePoint) -> f64 {
    let at = |t: f64| {
        let u = 1.0 - t;
        (
            u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
            u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
        )
    };

    let mut length = 0.0;
    let mut prev = (start.x, start.y);
    for step in 1..=CURVE_FLATTEN_STEPS {
        let point = at(step as f64 / CURVE_FLATTEN_STEPS as f64);
        length += (point.0 - prev.0).hypot(point.1 - prev.1);
        prev = point;
    }
    length
}

/// Number of quadratic and line segments in the smoothed path.
pub fn complexity(strokes: &[Stroke]) -> u32 {
    strokes
        .iter()
        .flat_map(|stroke| smoothed_segments(&stroke.points))
        .filter(|segment| !matches!(segment, PathSegment::MoveTo(_)))
        .count() as u32
}

/// Count of curve and line markers in serialized path data.
pub fn complexity_of_path_data(path_data: &str) -> u32 {
    path_data.chars().filter(|c| *c == 'Q' || *c == 'L').count() as u32
}

/// Pixels per millisecond.
pub fn velocity(path_length: f64, time_taken_ms: u64) -> f64 {
    path_length / time_taken_ms.max(1) as f64
}

/// Path length per unit of bounding-box side. 0 for a flat box.
pub fn density(path_length: f64, bbox: &BoundingBox) -> f64 {
    let area = bbox.area();
    if area <= 0.0 {
        return 0.0;
    }
    path_length / area.sqrt()
}

/// Average turning angle per point, scaled into 0..=100.
pub fn curvature(strokes: &[Stroke]) -> f64 {
    let mut total_turn = 0.0;
    let mut total_points = 0usize;

    for stroke in strokes {
        let points = &stroke.points;
        if points.len() < 3 {
            continue;
        }

        for triplet in points.windows(3) {
            let a1 = (triplet[1].y - triplet[0].y).atan2(triplet[1].x - triplet[0].x);
            let a2 = (triplet[2].y - triplet[1].y).atan2(triplet[2].x - triplet[1].x);
            let mut diff = (a2 - a1).abs();
            if diff > PI {
                diff = 2.0 * PI - diff;
            }
            total_turn += diff;
        }
        total_points += points.len();
    }

    if total_points == 0 {
        return 0.0;
    }
    ((total_turn / total_points as f64) * CURVATURE_SCALE).min(100.0)
}

pub fn pen_lifts(strokes: &[Stroke]) -> u32 {
    strokes.len().saturating_sub(1) as u32
}

/// Percentage of travelled distance spent with the pen down. 100 for a single stroke.
pub fn continuity_ratio(strokes: &[Stroke]) -> f64 {
    if strokes.len() <= 1 {
        return 100.0;
    }

    let stroke_len: f64 = strokes.iter().map(Stroke::polyline_length).sum();

    let gap_len: f64 = strokes
        .windows(2)
        .filter_map(|pair| {
            let end = pair[0].points.last()?;
            let start = pair[1].points.first()?;
            Some(end.distance_to(start))
        })
        .sum();

    let total = stroke_len + gap_len;
    if total <= 0.0 {
        return 100.0;
    }
    stroke_len / total * 100.0
}

/// How similar the strokes' overall slants are. 1.0 is perfectly consistent.
pub fn consistency_angles(strokes: &[Stroke]) -> f64 {
    let angles: Vec<f64> = strokes
        .iter()
        .filter(|s| s.points.len() >= 2)
        .map(|s| {
            let start = s.points[0];
            let end = s.points[s.points.len() - 1];
            (end.y - start.y).atan2(end.x - start.x)
        })
        .collect();

    if angles.len() < 2 {
        return 1.0;
    }

    let variance = population_variance(&angles);
    1.0 / (1.0 + variance * 10.0)
}

/// Standard deviation of per-stroke average velocity.
pub fn velocity_variance(strokes: &[Stroke]) -> f64 {
    if strokes.len() < 2 {
        return 0.0;
    }

    let velocities: Vec<f64> = strokes
        .iter()
        .map(|stroke| {
            let time = stroke.duration_ms();
            if time > 0 {
                stroke.polyline_length() / time as f64
            } else {
                0.0
            }
        })
        .collect();

    population_variance(&velocities).sqrt()
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

pub fn scale(bbox: &BoundingBox, canvas: &CanvasSize) -> Scale {
    let canvas_area = canvas.area();
    if canvas.width <= 0.0 || canvas_area <= 0.0 {
        return Scale::Medium;
    }

    let ratio = bbox.area() / canvas_area;
    if ratio < 0.05 {
        Scale::Small
    } else if ratio > 0.25 {
        Scale::Large
    } else {
        Scale::Medium
    }
}

pub fn placement(bbox: &BoundingBox, canvas: &CanvasSize) -> Placement {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return Placement::Centered;
    }

    let (cx, cy) = bbox.center();
    let x_diff = (cx - canvas.width / 2.0) / canvas.width;
    let y_diff = (cy - canvas.height / 2.0) / canvas.height;

    let top = y_diff < -0.15;
    let bottom = y_diff > 0.15;
    let left = x_diff < -0.15;
    let right = x_diff > 0.15;

    match (top, bottom, left, right) {
        (true, _, true, _) => Placement::TopLeft,
        (true, _, _, true) => Placement::TopRight,
        (true, _, _, _) => Placement::Top,
        (_, true, true, _) => Placement::BottomLeft,
        (_, true, _, true) => Placement::BottomRight,
        (_, true, _, _) => Placement::Bottom,
        (_, _, true, _) => Placement::Left,
        (_, _, _, true) => Placement::Right,
        _ => Placement::Centered,
    }
}

/// Reject non-finite or out-of-range coordinates before they reach the metrics.
pub fn validate_strokes(strokes: &[Stroke]) -> Result<(), ArchivistError> {
    if strokes.iter().all(|s| s.points.is_empty()) {
        return Err(ArchivistError::EmptySignature);
    }

    for (stroke_index, stroke) in strokes.iter().enumerate() {
        if let Some(p) = stroke.points.iter().find(|p| !p.is_finite()) {
            return Err(ArchivistError::InvalidStroke {
                stroke_index,
                message: format!("non-finite coordinate ({}, {})", p.x, p.y),
            });
        }
        if let Some(p) = stroke
            .points
            .iter()
            .find(|p| p.x.abs() > MAX_COORDINATE || p.y.abs() > MAX_COORDINATE)
        {
            return Err(ArchivistError::InvalidStroke {
                stroke_index,
                message: format!("coordinate out of range ({}, {})", p.x, p.y),
            });
        }
    }

    Ok(())
}

/// Compute every metric for a finished signature.
pub fn compute_signature_metrics(
    strokes: &[Stroke],
    time_taken_ms: u64,
    canvas: &CanvasSize,
) -> SignatureMetrics {
    let path_length = path_length(strokes);
    let bounding_box = BoundingBox::from_strokes(strokes);

    let average_velocity = velocity(path_length, time_taken_ms);
    let complexity = complexity(strokes);
    let density = density(path_length, &bounding_box);
    let curvature = curvature(strokes);
    let pen_lifts = pen_lifts(strokes);
    let consistency_angles = consistency_angles(strokes);
    let velocity_variance = velocity_variance(strokes);

    let style = classify_style(&StyleInputs {
        velocity: average_velocity,
        complexity,
        density,
        curvature,
        pen_lifts,
        consistency_angles,
        velocity_variance,
    });

    SignatureMetrics {
        path_length,
        bounding_box,
        average_velocity,
        complexity,
        density,
        curvature,
        pen_lifts,
        continuity_ratio: continuity_ratio(strokes),
        consistency_angles,
        velocity_variance,
        scale: scale(&bounding_box, canvas),
        placement: placement(&bounding_box, canvas),
        style_confidence: style.style_confidence,
    }
}
