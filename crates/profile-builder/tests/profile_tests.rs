use approx::assert_relative_eq;

use path_interpreter::{interpret, FlattenOptions};
use profile_builder::*;

fn rings(d: &str) -> Vec<plate_types::Polygon> {
    interpret(d, &FlattenOptions::default()).unwrap()
}

// ── Glyph outlines ──────────────────────────────────────────────────────────

#[test]
fn letter_o_has_one_counter() {
    // Outer counter-clockwise, counter clockwise-wound inside it.
    let o = rings("M0 0 L6 0 L6 10 L0 10 Z M2 2 L2 8 L4 8 L4 2 Z");
    let profiles = build_profiles(&o, HoleRule::OppositeWinding).unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].holes.len(), 1);
    assert_relative_eq!(profiles[0].area(), 60.0 - 12.0);
    assert!(profiles[0].outer.is_ccw());
    assert!(!profiles[0].holes[0].is_ccw());
}

#[test]
fn clockwise_font_outlines_are_reoriented() {
    // Some fonts wind outers clockwise and counters counter-clockwise.
    let o = rings("M0 0 L0 10 L6 10 L6 0 Z M2 2 L4 2 L4 8 L2 8 Z");
    let profiles = build_profiles(&o, HoleRule::OppositeWinding).unwrap();
    assert_eq!(profiles.len(), 1);
    assert!(profiles[0].outer.is_ccw());
    assert!(!profiles[0].holes[0].is_ccw());
}

#[test]
fn disjoint_glyphs_are_not_merged() {
    let two = rings("M0 0 L2 0 L2 2 L0 2 Z M5 0 L7 0 L7 2 L5 2 Z");
    assert_eq!(build_profiles(&two, HoleRule::OppositeWinding).unwrap().len(), 2);
}

#[test]
fn collapsed_subpath_is_degenerate() {
    let stray = rings("M0 0 L2 0 L2 2 L0 2 Z M5 0 L5 0 Z");
    assert!(matches!(
        build_profiles(&stray, HoleRule::OppositeWinding),
        Err(DegenerateProfileError::TooFewVertices { ring: 0, distinct: 1 })
    ));
}

#[test]
fn duplicate_vertices_do_not_count() {
    let sliver = rings("M0 0 L5 0 L5 0 L0 0 Z");
    assert!(matches!(
        build_profiles(&sliver, HoleRule::OppositeWinding),
        Err(DegenerateProfileError::TooFewVertices { distinct: 2, .. })
    ));
}

// ── Artwork ─────────────────────────────────────────────────────────────────

#[test]
fn target_icon_alternates_by_depth() {
    // Three same-winding squares: ring, hole, bullseye.
    let target = rings(
        "M0 0 L12 0 L12 12 L0 12 Z M2 2 L10 2 L10 10 L2 10 Z M4 4 L8 4 L8 8 L4 8 Z",
    );
    let profiles = build_profiles(&target, HoleRule::NestingParity).unwrap();
    assert_eq!(profiles.len(), 2);
    let total: f64 = profiles.iter().map(|p| p.area()).sum();
    assert_relative_eq!(total, 144.0 - 64.0 + 16.0);
}

#[test]
fn self_intersecting_artwork_is_rejected() {
    let bow = rings("M0 0 L4 4 L4 0 L0 4 Z");
    assert!(matches!(
        build_profiles(&bow, HoleRule::NestingParity),
        Err(DegenerateProfileError::SelfIntersecting { .. })
    ));
}

// ── Character runs ──────────────────────────────────────────────────────────

#[test]
fn run_places_characters_with_spacing() {
    let i = CharacterOutline {
        ch: 'I',
        rings: rings("M0 0 L0.2 0 L0.2 0.7 L0 0.7 Z"),
        advance: 0.4,
    };
    let run = layout_run(&[i.clone(), i.clone(), i], 10.0, 25.0).unwrap();
    assert_eq!(run.profile_count(), 3);
    let second = run.characters[1].profiles[0].bounds().unwrap();
    assert_relative_eq!(second.min[0], 4.0 + 2.5, epsilon = 1e-9);
    assert_relative_eq!(run.advance_width, 3.0 * 4.0 + 2.0 * 2.5, epsilon = 1e-9);
}
