//! Placing character outlines along a line with letter spacing.

use plate_types::{Polygon, Profile, Transform2};

use crate::error::DegenerateProfileError;
use crate::{build_profiles, HoleRule};

/// One character's outline in em units (Y up, baseline at 0).
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterOutline {
    pub ch: char,
    pub rings: Vec<Polygon>,
    /// Horizontal advance in em units.
    pub advance: f64,
}

/// The profiles of one placed character.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCharacter {
    pub ch: char,
    pub index: usize,
    /// Left edge of the character cell in line coordinates.
    pub x: f64,
    pub profiles: Vec<Profile>,
}

/// A single line of placed characters, origin at the left end of the
/// baseline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterRun {
    pub characters: Vec<PlacedCharacter>,
    /// Pen travel from the first cell to the end of the last advance,
    /// without trailing letter spacing.
    pub advance_width: f64,
}

impl CharacterRun {
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.characters.iter().flat_map(|c| c.profiles.iter())
    }

    pub fn profile_count(&self) -> usize {
        self.characters.iter().map(|c| c.profiles.len()).sum()
    }
}

/// Extra pen advance between characters for a spacing percentage.
pub fn spacing_offset(size: f64, letter_spacing_pct: f64) -> f64 {
    size * letter_spacing_pct / 100.0
}

/// Scale each outline to `size`, place it at the running pen position and
/// build its profiles. Characters without rings (spaces) only advance.
pub fn layout_run(
    outlines: &[CharacterOutline],
    size: f64,
    letter_spacing_pct: f64,
) -> Result<CharacterRun, DegenerateProfileError> {
    let extra = spacing_offset(size, letter_spacing_pct);
    let mut pen = 0.0;
    let mut characters = Vec::with_capacity(outlines.len());

    for (index, outline) in outlines.iter().enumerate() {
        let place = Transform2::scale(size, size).then(&Transform2::translate(pen, 0.0));
        let rings: Vec<Polygon> = outline.rings.iter().map(|r| r.transformed(&place)).collect();
        let profiles = build_profiles(&rings, HoleRule::OppositeWinding)
            .map_err(|e| e.in_character(outline.ch, index))?;
        characters.push(PlacedCharacter {
            ch: outline.ch,
            index,
            x: pen,
            profiles,
        });
        pen += outline.advance * size;
        if index + 1 < outlines.len() {
            pen += extra;
        }
    }

    Ok(CharacterRun {
        characters,
        advance_width: pen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ch: char) -> CharacterOutline {
        CharacterOutline {
            ch,
            rings: vec![Polygon::new(vec![[0.0, 0.0], [0.2, 0.0], [0.2, 0.7], [0.0, 0.7]])],
            advance: 0.3,
        }
    }

    #[test]
    fn spacing_is_percent_of_size() {
        let run = layout_run(&[bar('I'), bar('I'), bar('I')], 10.0, 50.0).unwrap();
        let xs: Vec<f64> = run.characters.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![0.0, 8.0, 16.0]);
        assert!((run.advance_width - 19.0).abs() < 1e-12);
    }

    #[test]
    fn negative_spacing_tightens() {
        let run = layout_run(&[bar('I'), bar('I')], 10.0, -50.0).unwrap();
        assert!((run.characters[1].x + 2.0).abs() < 1e-12);
        assert!((run.advance_width - 1.0).abs() < 1e-12);
    }

    #[test]
    fn blank_character_only_advances() {
        let space = CharacterOutline {
            ch: ' ',
            rings: Vec::new(),
            advance: 0.3,
        };
        let run = layout_run(&[bar('I'), space, bar('I')], 10.0, 0.0).unwrap();
        assert_eq!(run.profile_count(), 2);
        assert_eq!(run.characters[2].x, 6.0);
    }

    #[test]
    fn degenerate_glyph_names_character() {
        let broken = CharacterOutline {
            ch: 'X',
            rings: vec![Polygon::new(vec![[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0]])],
            advance: 1.0,
        };
        let err = layout_run(&[bar('I'), broken], 10.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            DegenerateProfileError::Character { ch: 'X', index: 1, .. }
        ));
    }
}
