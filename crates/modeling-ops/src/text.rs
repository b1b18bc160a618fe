//! Text block layout: glyph outlines to placed, styled line profiles.
//!
//! Lines are laid out in block coordinates first (block centred on the
//! origin), then the whole block is aligned inside the padded plate area.
//! Auto-sized plates are measured from the block before placement.

use path_interpreter::{interpret, FlattenOptions};
use plate_types::{
    BuildOptions, Bounds2, ConfigurationError, FeatureLabel, GlyphSource, HAlign, Padding, Profile,
    TextBlock, TextLineConfig, TextOrientation, Transform2, VAlign,
};
use profile_builder::{layout_run, CharacterOutline};
use tracing::debug;

use crate::style::styled_feature;
use crate::types::{FeatureSolid, OpError};

/// Advance, in em, of a whitespace character the font has no glyph for.
pub const FALLBACK_SPACE_ADVANCE: f64 = 0.3;

/// One laid-out line in block coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLine {
    /// Index into `TextBlock::lines`.
    pub index: usize,
    pub profiles: Vec<Profile>,
}

/// The text block, centred on the origin before placement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub lines: Vec<LaidOutLine>,
    /// Ink bounds of every line; None when nothing was laid out.
    pub bounds: Option<Bounds2>,
}

struct MeasuredLine {
    index: usize,
    size: f64,
    profiles: Vec<Profile>,
    ink: Bounds2,
}

fn profile_bounds<'a>(profiles: impl IntoIterator<Item = &'a Profile>) -> Option<Bounds2> {
    profiles
        .into_iter()
        .filter_map(Profile::bounds)
        .reduce(|a, b| a.union(&b))
}

/// Look up and flatten the glyphs of one line.
fn line_outlines(
    line: &TextLineConfig,
    field: &str,
    glyphs: &dyn GlyphSource,
    options: &BuildOptions,
) -> Result<Vec<CharacterOutline>, OpError> {
    // Glyphs are in em units, so the tolerance shrinks with the text size.
    let flatten = FlattenOptions::with_tolerance(options.flatten_tolerance / line.size);
    let mut outlines = Vec::with_capacity(line.content.chars().count());
    for ch in line.content.chars() {
        match glyphs.glyph(&line.font, ch) {
            Some(glyph) => outlines.push(CharacterOutline {
                ch,
                rings: interpret(&glyph.path, &flatten)?,
                advance: glyph.advance,
            }),
            None if ch.is_whitespace() => outlines.push(CharacterOutline {
                ch,
                rings: Vec::new(),
                advance: FALLBACK_SPACE_ADVANCE,
            }),
            None => {
                return Err(ConfigurationError::MissingGlyph {
                    field: format!("{}.content", field),
                    font: line.font.clone(),
                    ch,
                }
                .into())
            }
        }
    }
    Ok(outlines)
}

pub fn text_label(index: usize, line: &TextLineConfig) -> FeatureLabel {
    FeatureLabel::new(format!("text[{}] '{}'", index, line.content))
}

/// Glyph profiles and ink bounds of one line at the origin. Blank lines
/// and lines without ink measure as None.
fn measure_line(
    index: usize,
    line: &TextLineConfig,
    glyphs: &dyn GlyphSource,
    options: &BuildOptions,
) -> Result<Option<MeasuredLine>, OpError> {
    if line.content.trim().is_empty() {
        return Ok(None);
    }
    let field = format!("text.lines[{}]", index);
    let run = line_outlines(line, &field, glyphs, options)
        .and_then(|outlines| Ok(layout_run(&outlines, line.size, line.letter_spacing)?))
        .map_err(|e| e.in_feature(&text_label(index, line)))?;
    let profiles: Vec<Profile> = run.profiles().cloned().collect();
    Ok(profile_bounds(&profiles).map(|ink| MeasuredLine {
        index,
        size: line.size,
        profiles,
        ink,
    }))
}

/// Lay out every non-blank line of `block`. The first failing line aborts
/// the layout.
pub fn layout_text(block: &TextBlock, glyphs: &dyn GlyphSource, options: &BuildOptions) -> Result<TextLayout, OpError> {
    let mut measured = Vec::new();
    for (index, line) in block.lines.iter().enumerate() {
        measured.extend(measure_line(index, line, glyphs, options)?);
    }
    Ok(stack(block, measured))
}

/// Like [`layout_text`], but lines that fail are left out and returned
/// alongside the layout of the rest.
pub fn layout_text_partial(
    block: &TextBlock,
    glyphs: &dyn GlyphSource,
    options: &BuildOptions,
) -> (TextLayout, Vec<OpError>) {
    let mut measured = Vec::new();
    let mut failures = Vec::new();
    for (index, line) in block.lines.iter().enumerate() {
        match measure_line(index, line, glyphs, options) {
            Ok(line) => measured.extend(line),
            Err(e) => failures.push(e),
        }
    }
    (stack(block, measured), failures)
}

/// Stack measured lines top to bottom, align them within the block and
/// apply per-line and block transforms.
fn stack(block: &TextBlock, measured: Vec<MeasuredLine>) -> TextLayout {
    let block_width = measured.iter().map(|l| l.ink.width()).fold(0.0, f64::max);
    let mut cursor = 0.0;
    let mut stacked = Vec::with_capacity(measured.len());
    for (k, line) in measured.iter().enumerate() {
        if k > 0 {
            let mean = (measured[k - 1].size + line.size) / 2.0;
            cursor -= mean * (block.line_spacing - 1.0);
        }
        let dx = match block.halign {
            HAlign::Left => -block_width / 2.0 - line.ink.min[0],
            HAlign::Center => -line.ink.center()[0],
            HAlign::Right => block_width / 2.0 - line.ink.max[0],
        };
        let dy = cursor - line.ink.max[1];
        cursor -= line.ink.height();
        stacked.push((dx, dy));
    }
    let half_height = -cursor / 2.0;

    let orientation = match block.orientation {
        TextOrientation::Horizontal => Transform2::identity(),
        TextOrientation::Vertical => Transform2::rotate_degrees(90.0),
    };

    let mut lines = Vec::with_capacity(measured.len());
    for (line, (dx, dy)) in measured.into_iter().zip(stacked) {
        let config = &block.lines[line.index];
        let align = Transform2::translate(dx, dy + half_height);
        let centre = align.apply(line.ink.center());
        let transform = align
            .then(&Transform2::translate(-centre[0], -centre[1]))
            .then(&Transform2::rotate_degrees(config.rotation))
            .then(&Transform2::translate(
                centre[0] + config.offset[0],
                centre[1] + config.offset[1],
            ))
            .then(&orientation);
        lines.push(LaidOutLine {
            index: line.index,
            profiles: line.profiles.iter().map(|p| p.transformed(&transform)).collect(),
        });
    }

    let bounds = profile_bounds(lines.iter().flat_map(|l| l.profiles.iter()));
    debug!(lines = lines.len(), ?bounds, "laid out text block");
    TextLayout { lines, bounds }
}

/// The area text is aligned in: the plate box minus padding.
pub fn text_area(width: f64, height: f64, padding: &Padding) -> Bounds2 {
    Bounds2 {
        min: [-width / 2.0 + padding.left, -height / 2.0 + padding.bottom],
        max: [width / 2.0 - padding.right, height / 2.0 - padding.top],
    }
}

/// Plate size that fits the block plus padding.
pub fn fitted_size(layout: &TextLayout, padding: &Padding) -> Option<(f64, f64)> {
    let b = layout.bounds?;
    Some((
        b.width() + padding.left + padding.right,
        b.height() + padding.top + padding.bottom,
    ))
}

impl TextLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Translation that aligns the block inside `area` and applies the
    /// block offset.
    pub fn placement(&self, block: &TextBlock, area: &Bounds2) -> Transform2 {
        let Some(b) = self.bounds else {
            return Transform2::identity();
        };
        let dx = match block.halign {
            HAlign::Left => area.min[0] - b.min[0],
            HAlign::Center => area.center()[0] - b.center()[0],
            HAlign::Right => area.max[0] - b.max[0],
        };
        let dy = match block.valign {
            VAlign::Top => area.max[1] - b.max[1],
            VAlign::Center => area.center()[1] - b.center()[1],
            VAlign::Bottom => area.min[1] - b.min[1],
        };
        Transform2::translate(dx + block.offset[0], dy + block.offset[1])
    }

    /// One styled feature per laid-out line, placed inside `area`.
    pub fn features(&self, block: &TextBlock, area: &Bounds2) -> Vec<FeatureSolid> {
        let place = self.placement(block, area);
        self.lines
            .iter()
            .map(|line| {
                let config = &block.lines[line.index];
                let label = text_label(line.index, config);
                let profiles = line.profiles.iter().map(|p| p.transformed(&place)).collect();
                styled_feature(label, config.style, config.depth, profiles)
            })
            .collect()
    }
}
