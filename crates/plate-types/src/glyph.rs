//! Glyph outlines supplied by the caller.
//!
//! Font file parsing happens outside the engine. A [`GlyphSource`] hands back
//! outline path data per character in em units with Y pointing up, and the
//! engine scales it to the requested text size.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One character outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Path data in em units, Y up, baseline at y = 0.
    pub path: String,
    /// Horizontal advance in em units.
    pub advance: f64,
}

impl Glyph {
    pub fn new(path: impl Into<String>, advance: f64) -> Self {
        Self {
            path: path.into(),
            advance,
        }
    }
}

/// Lookup of glyph outlines by font name and character.
pub trait GlyphSource: Send + Sync {
    fn glyph(&self, font: &str, ch: char) -> Option<&Glyph>;

    /// Stable identity of the glyph data, mixed into cache keys so that
    /// swapping fonts invalidates cached results.
    fn fingerprint(&self) -> u64;
}

/// The glyphs of a single font.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphTable {
    pub glyphs: BTreeMap<char, Glyph>,
}

impl GlyphTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.insert(ch, glyph);
    }

    pub fn with(mut self, ch: char, glyph: Glyph) -> Self {
        self.insert(ch, glyph);
        self
    }

    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }
}

/// Named glyph tables. An empty font name in a text line selects the
/// default font.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontLibrary {
    pub fonts: BTreeMap<String, GlyphTable>,
    pub default_font: String,
}

impl FontLibrary {
    pub fn new(default_font: impl Into<String>) -> Self {
        Self {
            fonts: BTreeMap::new(),
            default_font: default_font.into(),
        }
    }

    pub fn with_font(mut self, name: impl Into<String>, table: GlyphTable) -> Self {
        self.fonts.insert(name.into(), table);
        self
    }

    fn resolve(&self, font: &str) -> Option<&GlyphTable> {
        let name = if font.is_empty() {
            self.default_font.as_str()
        } else {
            font
        };
        self.fonts.get(name)
    }
}

impl GlyphSource for FontLibrary {
    fn glyph(&self, font: &str, ch: char) -> Option<&Glyph> {
        self.resolve(font)?.get(ch)
    }

    fn fingerprint(&self) -> u64 {
        // FNV-1a over the font contents in key order.
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut feed = |bytes: &[u8]| {
            for b in bytes {
                h ^= u64::from(*b);
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        feed(self.default_font.as_bytes());
        for (name, table) in &self.fonts {
            feed(name.as_bytes());
            for (ch, glyph) in &table.glyphs {
                feed(&(*ch as u32).to_le_bytes());
                feed(glyph.path.as_bytes());
                feed(&glyph.advance.to_bits().to_le_bytes());
            }
        }
        h
    }
}
