// Strong typing over strings. Stroke geometry, signature records, and prompt payloads.
// Everything here crosses the JS boundary as JSON.

use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentScores;

/// A single sampled pointer position. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Capture time in milliseconds.
    pub time: u64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, time: u64) -> Self {
        StrokePoint { x, y, time }
    }

    pub fn distance_to(&self, other: &StrokePoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One pointer-down to pointer-up motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Stroke {
    pub points: Vec<StrokePoint>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub width: f64,
}

impl Stroke {
    pub fn new(points: Vec<StrokePoint>) -> Self {
        Stroke {
            points,
            color: String::new(),
            width: 0.0,
        }
    }

    /// Sum of straight segment lengths between consecutive points.
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Milliseconds between first and last point.
    pub fn duration_ms(&self) -> u64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.time.saturating_sub(first.time),
            _ => 0,
        }
    }
}

/// Axis-aligned bounds of a signature, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds of every point across all strokes. Zero box when there are no points.
    pub fn from_strokes(strokes: &[Stroke]) -> Self {
        let mut points = strokes.iter().flat_map(|s| s.points.iter());
        let Some(first) = points.next() else {
            return BoundingBox::default();
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Drawing surface size used to normalise scale and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        CanvasSize { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize::new(800.0, 600.0)
    }
}

/// Signature footprint relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Scale {
    Small,
    #[default]
    Medium,
    Large,
}

/// Where the signature sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Placement {
    #[default]
    Centered,
    Left,
    Right,
    Top,
    Bottom,
    #[serde(rename = "Top Left")]
    TopLeft,
    #[serde(rename = "Top Right")]
    TopRight,
    #[serde(rename = "Bottom Left")]
    BottomLeft,
    #[serde(rename = "Bottom Right")]
    BottomRight,
}

impl Placement {
    pub fn label(&self) -> &'static str {
        match self {
            Placement::Centered => "Centered",
            Placement::Left => "Left",
            Placement::Right => "Right",
            Placement::Top => "Top",
            Placement::Bottom => "Bottom",
            Placement::TopLeft => "Top Left",
            Placement::TopRight => "Top Right",
            Placement::BottomLeft => "Bottom Left",
            Placement::BottomRight => "Bottom Right",
        }
    }
}

/// The five handwriting styles. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryStyle {
    Whispered,
    Architectural,
    Flourished,
    Staccato,
    Monastic,
}

impl PrimaryStyle {
    pub const ALL: [PrimaryStyle; 5] = [
        PrimaryStyle::Whispered,
        PrimaryStyle::Architectural,
        PrimaryStyle::Flourished,
        PrimaryStyle::Staccato,
        PrimaryStyle::Monastic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimaryStyle::Whispered => "Whispered",
            PrimaryStyle::Architectural => "Architectural",
            PrimaryStyle::Flourished => "Flourished",
            PrimaryStyle::Staccato => "Staccato",
            PrimaryStyle::Monastic => "Monastic",
        }
    }
}

/// Continuity decoration shown before the primary style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryStyle {
    Fluid,
    Fragmented,
}

impl SecondaryStyle {
    pub fn name(&self) -> &'static str {
        match self {
            SecondaryStyle::Fluid => "Fluid",
            SecondaryStyle::Fragmented => "Fragmented",
        }
    }
}

/// Classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleAssessment {
    pub primary_style: PrimaryStyle,
    /// Winning raw score clamped to 20..=100.
    pub style_confidence: u8,
}

/// Derived handwriting metrics, computed once per sealed signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureMetrics {
    /// Never 0; degenerate paths are stored as 1.
    pub path_length: f64,
    pub bounding_box: BoundingBox,
    pub average_velocity: f64,
    pub complexity: u32,
    #[serde(default)]
    pub density: f64,
    pub curvature: f64,
    pub pen_lifts: u32,
    pub continuity_ratio: f64,
    #[serde(default = "default_consistency_angles")]
    pub consistency_angles: f64,
    pub velocity_variance: f64,
    pub scale: Scale,
    pub placement: Placement,
    pub style_confidence: u8,
}

fn default_consistency_angles() -> f64 {
    1.0
}

/// Coarse mood of a prompt. Drives the atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VibeTier {
    #[default]
    Methodical,
    Raw,
    Aspirational,
}

/// Narrative category a prompt was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptCategory {
    Nostalgia,
    Ambition,
    Domesticity,
    Solitude,
    Creation,
    Thread,
    Legacy,
}

impl PromptCategory {
    pub fn vibe_tier(&self) -> VibeTier {
        match self {
            PromptCategory::Nostalgia | PromptCategory::Domesticity => VibeTier::Methodical,
            PromptCategory::Ambition | PromptCategory::Creation => VibeTier::Aspirational,
            PromptCategory::Solitude | PromptCategory::Thread | PromptCategory::Legacy => {
                VibeTier::Raw
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Mythic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    #[default]
    Template,
    ThreadFollowup,
    FixedLegacy,
}

/// Narrative motif a prompt can fall into. Table order matters for detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadId {
    Grief,
    Joy,
    Transformation,
    Resistance,
    Homecoming,
    Becoming,
    Reckoning,
    Creation,
    Solitude,
    Ambition,
}

impl ThreadId {
    pub fn name(&self) -> &'static str {
        match self {
            ThreadId::Grief => "Grief",
            ThreadId::Joy => "Joy",
            ThreadId::Transformation => "Transformation",
            ThreadId::Resistance => "Resistance",
            ThreadId::Homecoming => "Homecoming",
            ThreadId::Becoming => "Becoming",
            ThreadId::Reckoning => "Reckoning",
            ThreadId::Creation => "Creation",
            ThreadId::Solitude => "Solitude",
            ThreadId::Ambition => "Ambition",
        }
    }
}

/// The words a prompt was assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PromptComponents {
    pub action: String,
    pub object: String,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub category: PromptCategory,
    pub rarity: Rarity,
    #[serde(rename = "type")]
    pub prompt_type: PromptType,
    #[serde(default)]
    pub thread_id: Option<ThreadId>,
    #[serde(default)]
    pub used_tags: Vec<String>,
    #[serde(default)]
    pub style_influence: Option<PrimaryStyle>,
    #[serde(default)]
    pub scale_influence: Option<Scale>,
    #[serde(default)]
    pub components: PromptComponents,
}

/// A generated prompt. Replaced after every seal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptData {
    pub prompt: String,
    pub vibe_tier: VibeTier,
    pub metadata: PromptMetadata,
}

/// Sentiment snapshot stored with a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentData {
    pub scores: SentimentScores,
    pub intensity: u8,
    pub dominant_color: String,
}

/// A sealed signature in the ledger. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub id: u64,
    pub svg_path: String,
    pub ink_color: String,
    pub prompt_title: String,
    /// Secondary-decorated style, e.g. "Fluid Monastic".
    pub style_tag: String,
    pub primary_style: PrimaryStyle,
    #[serde(default)]
    pub secondary_style_label: Option<SecondaryStyle>,
    pub metrics: SignatureMetrics,
    pub consistency: u32,
    pub timestamp_ms: u64,
    #[serde(default)]
    pub thread_id: Option<ThreadId>,
    #[serde(default)]
    pub used_tags: Vec<String>,
    pub seal_color: String,
    pub sentiment_data: SentimentData,
    #[serde(default)]
    pub prompt_metadata: Option<PromptMetadata>,
}

impl SignatureRecord {
    pub fn rarity(&self) -> Option<Rarity> {
        self.prompt_metadata.as_ref().map(|m| m.rarity)
    }

    pub fn prompt_type(&self) -> Option<PromptType> {
        self.prompt_metadata.as_ref().map(|m| m.prompt_type)
    }
}
