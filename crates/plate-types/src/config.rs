//! Declarative nameplate configuration.
//!
//! These are value objects owned by the caller. The composition engine reads
//! them and never mutates them. Every struct deserializes from partial JSON,
//! falling back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;

/// The complete description of one nameplate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NameplateConfig {
    pub plate: PlateConfig,
    pub border: BorderConfig,
    pub text: TextBlock,
    pub mount: MountConfig,
    pub artwork: Vec<ArtworkElement>,
}

// ── Plate ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateShape {
    Rectangle,
    #[default]
    Rounded,
    Oval,
    Chamfered,
    Hexagon,
    Octagon,
    /// An arched band whose centre line follows a circle of `sweep_radius`.
    Sweep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    pub shape: PlateShape,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub corner_radius: f64,
    pub chamfer: f64,
    pub sweep_radius: f64,
    /// Derive the width from the laid-out text plus padding.
    pub auto_width: bool,
    /// Derive the height from the laid-out text plus padding.
    pub auto_height: bool,
    pub padding: Padding,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            shape: PlateShape::default(),
            width: 100.0,
            height: 30.0,
            thickness: 3.0,
            corner_radius: 5.0,
            chamfer: 3.0,
            sweep_radius: 80.0,
            auto_width: false,
            auto_height: false,
            padding: Padding::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 5.0,
            bottom: 5.0,
            left: 10.0,
            right: 10.0,
        }
    }
}

// ── Border ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Raised,
    Inset,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerStyle {
    Square,
    #[default]
    Rounded,
    Chamfered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub style: BorderStyle,
    /// Width of the frame band.
    pub width: f64,
    /// Raise above (or recess below) the top surface.
    pub height: f64,
    /// Distance from the plate edge to the outside of the frame.
    pub offset: f64,
    pub corner_style: CornerStyle,
    pub corner_radius: f64,
    pub double_gap: f64,
    pub double_inner_width: f64,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            style: BorderStyle::None,
            width: 3.0,
            height: 1.5,
            offset: 2.0,
            corner_style: CornerStyle::Rounded,
            corner_radius: 3.0,
            double_gap: 2.0,
            double_inner_width: 1.5,
        }
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

/// How a text line or artwork element meets the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Raised,
    Engraved,
    Cutout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrientation {
    #[default]
    Horizontal,
    /// The laid-out block is rotated 90° counter-clockwise.
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLineConfig {
    pub content: String,
    /// Font name looked up in the caller's glyph source.
    pub font: String,
    /// Em size in millimetres.
    pub size: f64,
    pub style: Style,
    /// Raised height or cut depth.
    pub depth: f64,
    /// Offset of this line from its laid-out position.
    pub offset: Point2,
    /// Rotation in degrees about the line's centre.
    pub rotation: f64,
    /// Extra advance per character, in percent of `size` (-50..=100).
    pub letter_spacing: f64,
}

impl Default for TextLineConfig {
    fn default() -> Self {
        Self {
            content: String::new(),
            font: String::new(),
            size: 12.0,
            style: Style::Raised,
            depth: 2.0,
            offset: [0.0, 0.0],
            rotation: 0.0,
            letter_spacing: 0.0,
        }
    }
}

/// Ordered text lines. Order is z-order only, not a geometric dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub lines: Vec<TextLineConfig>,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Line pitch as a multiple of the mean font size.
    pub line_spacing: f64,
    pub offset: Point2,
    pub orientation: TextOrientation,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            halign: HAlign::Center,
            valign: VAlign::Center,
            line_spacing: 1.2,
            offset: [0.0, 0.0],
            orientation: TextOrientation::Horizontal,
        }
    }
}

// ── Mounts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountKind {
    #[default]
    None,
    DeskStand,
    ScrewHoles,
    Keyhole,
    MagnetPocket,
    HangingHole,
    AdhesiveRecess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolePattern {
    #[default]
    TwoTop,
    TwoSides,
    FourCorners,
    CenterTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangingPosition {
    #[default]
    TopCenter,
    Corners,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    pub kind: MountKind,
    /// Explicit cutter centres. When empty the pattern/count rules apply.
    pub positions: Vec<Point2>,

    pub hole_pattern: HolePattern,
    pub hole_diameter: f64,
    pub counterbore: bool,
    pub counterbore_diameter: f64,
    pub counterbore_depth: f64,
    pub edge_distance: f64,

    pub keyhole_large_diameter: f64,
    pub keyhole_small_diameter: f64,
    pub keyhole_length: f64,

    pub magnet_diameter: f64,
    pub magnet_height: f64,
    pub magnet_tolerance: f64,
    pub magnet_count: u32,
    pub magnet_edge_distance: f64,

    pub hanging_diameter: f64,
    pub hanging_position: HangingPosition,
    /// Vertical slot length; zero gives a round hole.
    pub hanging_slot_length: f64,

    pub stand_angle: f64,
    pub stand_depth: f64,
    pub stand_steps: u32,
    pub stand_width_ratio: f64,

    pub recess_width_ratio: f64,
    pub recess_height: f64,
    pub recess_depth: f64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            kind: MountKind::None,
            positions: Vec::new(),
            hole_pattern: HolePattern::TwoTop,
            hole_diameter: 4.0,
            counterbore: true,
            counterbore_diameter: 8.0,
            counterbore_depth: 2.0,
            edge_distance: 8.0,
            keyhole_large_diameter: 10.0,
            keyhole_small_diameter: 5.0,
            keyhole_length: 12.0,
            magnet_diameter: 8.0,
            magnet_height: 3.0,
            magnet_tolerance: 0.2,
            magnet_count: 2,
            magnet_edge_distance: 10.0,
            hanging_diameter: 5.0,
            hanging_position: HangingPosition::TopCenter,
            hanging_slot_length: 0.0,
            stand_angle: 25.0,
            stand_depth: 30.0,
            stand_steps: 4,
            stand_width_ratio: 0.8,
            recess_width_ratio: 0.7,
            recess_height: 15.0,
            recess_depth: 1.0,
        }
    }
}

// ── Artwork ─────────────────────────────────────────────────────────────────

/// SVG basic shapes, already extracted from the document by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BasicShape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Polygon {
        points: Vec<Point2>,
    },
    Polyline {
        points: Vec<Point2>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtworkSource {
    /// A single icon glyph outline in Y-up path coordinates.
    Icon { path: String },
    /// Path data and basic shapes from an SVG document (Y-down).
    Svg {
        #[serde(default)]
        paths: Vec<String>,
        #[serde(default)]
        shapes: Vec<BasicShape>,
        /// min-x, min-y, width, height
        #[serde(default)]
        view_box: Option<[f64; 4]>,
    },
}

impl Default for ArtworkSource {
    fn default() -> Self {
        ArtworkSource::Svg {
            paths: Vec::new(),
            shapes: Vec::new(),
            view_box: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkElement {
    pub name: String,
    pub source: ArtworkSource,
    pub style: Style,
    /// Centre of the placed artwork on the plate.
    pub position: Point2,
    pub rotation: f64,
    pub scale: f64,
    /// The larger side of the artwork bounds is scaled to this size.
    pub target_size: f64,
    pub depth: f64,
}

impl Default for ArtworkElement {
    fn default() -> Self {
        Self {
            name: String::new(),
            source: ArtworkSource::default(),
            style: Style::Raised,
            position: [0.0, 0.0],
            rotation: 0.0,
            scale: 1.0,
            target_size: 20.0,
            depth: 2.0,
        }
    }
}
