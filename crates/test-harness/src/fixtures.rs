//! A small block font whose glyph areas are known independently of the
//! path interpreter.
//!
//! Glyphs are straight-edged rings in em units (Y-up, baseline at 0, cap
//! height 0.7). Each ring is written both as path data for the build and
//! kept as points so tests can compute the exact area with the shoelace
//! formula. Spaces are left to the layout's whitespace advance.

use plate_types::{FontLibrary, Glyph, GlyphTable};

use crate::helpers::{ring_area, HarnessError};

/// Font name the fixture registers itself under.
pub const FIXTURE_FONT: &str = "block";

/// Cap height of every fixture glyph, in em.
pub const CAP_HEIGHT: f64 = 0.7;

struct BlockGlyph {
    ch: char,
    advance: f64,
    rings: &'static [&'static [[f64; 2]]],
}

const A_OUTER: &[[f64; 2]] = &[
    [0.0, 0.0],
    [0.15, 0.0],
    [0.2, 0.2],
    [0.4, 0.2],
    [0.45, 0.0],
    [0.6, 0.0],
    [0.4, 0.7],
    [0.2, 0.7],
];
const A_COUNTER: &[[f64; 2]] = &[[0.25, 0.35], [0.3, 0.55], [0.35, 0.35]];

const E_OUTER: &[[f64; 2]] = &[
    [0.0, 0.0],
    [0.5, 0.0],
    [0.5, 0.13],
    [0.15, 0.13],
    [0.15, 0.285],
    [0.4, 0.285],
    [0.4, 0.415],
    [0.15, 0.415],
    [0.15, 0.57],
    [0.5, 0.57],
    [0.5, 0.7],
    [0.0, 0.7],
];

const H_OUTER: &[[f64; 2]] = &[
    [0.0, 0.0],
    [0.15, 0.0],
    [0.15, 0.3],
    [0.45, 0.3],
    [0.45, 0.0],
    [0.6, 0.0],
    [0.6, 0.7],
    [0.45, 0.7],
    [0.45, 0.42],
    [0.15, 0.42],
    [0.15, 0.7],
    [0.0, 0.7],
];

const I_OUTER: &[[f64; 2]] = &[[0.0, 0.0], [0.15, 0.0], [0.15, 0.7], [0.0, 0.7]];

const L_OUTER: &[[f64; 2]] = &[
    [0.0, 0.0],
    [0.5, 0.0],
    [0.5, 0.15],
    [0.15, 0.15],
    [0.15, 0.7],
    [0.0, 0.7],
];

const O_OUTER: &[[f64; 2]] = &[[0.0, 0.0], [0.6, 0.0], [0.6, 0.7], [0.0, 0.7]];
const O_COUNTER: &[[f64; 2]] = &[[0.15, 0.15], [0.15, 0.55], [0.45, 0.55], [0.45, 0.15]];

const T_OUTER: &[[f64; 2]] = &[
    [0.225, 0.0],
    [0.375, 0.0],
    [0.375, 0.55],
    [0.6, 0.55],
    [0.6, 0.7],
    [0.0, 0.7],
    [0.0, 0.55],
    [0.225, 0.55],
];

const BLOCK_GLYPHS: &[BlockGlyph] = &[
    BlockGlyph { ch: 'A', advance: 0.75, rings: &[A_OUTER, A_COUNTER] },
    BlockGlyph { ch: 'E', advance: 0.65, rings: &[E_OUTER] },
    BlockGlyph { ch: 'H', advance: 0.75, rings: &[H_OUTER] },
    BlockGlyph { ch: 'I', advance: 0.3, rings: &[I_OUTER] },
    BlockGlyph { ch: 'L', advance: 0.6, rings: &[L_OUTER] },
    BlockGlyph { ch: 'O', advance: 0.75, rings: &[O_OUTER, O_COUNTER] },
    BlockGlyph { ch: 'T', advance: 0.7, rings: &[T_OUTER] },
];

fn lookup(ch: char) -> Result<&'static BlockGlyph, HarnessError> {
    BLOCK_GLYPHS
        .iter()
        .find(|g| g.ch == ch)
        .ok_or(HarnessError::UnknownGlyph { ch })
}

fn ring_path(ring: &[[f64; 2]]) -> String {
    let mut d = String::new();
    for (i, [x, y]) in ring.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{} {} {} ", cmd, x, y));
    }
    d.push('Z');
    d
}

/// Path data for one fixture glyph.
pub fn glyph_path(ch: char) -> Result<String, HarnessError> {
    let glyph = lookup(ch)?;
    Ok(glyph.rings.iter().map(|r| ring_path(r)).collect::<Vec<_>>().join(" "))
}

/// The fixture glyphs as a font library, registered as both the default
/// font and [`FIXTURE_FONT`].
pub fn block_font() -> FontLibrary {
    let mut table = GlyphTable::new();
    for g in BLOCK_GLYPHS {
        let path = g.rings.iter().map(|r| ring_path(r)).collect::<Vec<_>>().join(" ");
        table.insert(g.ch, Glyph::new(path, g.advance));
    }
    FontLibrary::new(FIXTURE_FONT).with_font(FIXTURE_FONT, table)
}

/// Filled area of `ch` at `size` mm per em: outer rings minus counters.
/// Whitespace has none.
pub fn glyph_area(ch: char, size: f64) -> Result<f64, HarnessError> {
    if ch.is_whitespace() {
        return Ok(0.0);
    }
    let glyph = lookup(ch)?;
    let em_area: f64 = glyph.rings.iter().map(|r| ring_area(r)).sum();
    Ok(em_area.abs() * size * size)
}

/// Summed glyph area of a whole string.
pub fn text_area(content: &str, size: f64) -> Result<f64, HarnessError> {
    content.chars().map(|ch| glyph_area(ch, size)).sum()
}

/// Footprint of `ch` in em units, as `[min, max]` corners.
pub fn glyph_extent(ch: char) -> Result<[[f64; 2]; 2], HarnessError> {
    let glyph = lookup(ch)?;
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for [x, y] in glyph.rings.iter().flat_map(|r| r.iter()) {
        min = [min[0].min(*x), min[1].min(*y)];
        max = [max[0].max(*x), max[1].max(*y)];
    }
    Ok([min, max])
}
