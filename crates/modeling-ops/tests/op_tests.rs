use approx::assert_relative_eq;

use modeling_ops::boolean::{execute_boolean, BooleanKind};
use modeling_ops::extrude::execute_extrude;
use modeling_ops::types::{Extent, FeatureRole, FeatureSolid, OpError, PlateFrame};
use modeling_ops::{mount_cutters, plate_outline, styled_feature, MountSurface};
use plate_kernel::{KernelIntrospect, SlabKernel};
use plate_types::{
    BuildOptions, FeatureLabel, HolePattern, MountConfig, MountKind, PlateConfig, PlateShape, Polygon, Profile, Style,
};

fn plate(shape: PlateShape) -> PlateConfig {
    PlateConfig {
        shape,
        width: 80.0,
        height: 40.0,
        ..Default::default()
    }
}

fn square(cx: f64, cy: f64, size: f64) -> Profile {
    let h = size / 2.0;
    Profile::solid(Polygon::new(vec![
        [cx - h, cy - h],
        [cx + h, cy - h],
        [cx + h, cy + h],
        [cx - h, cy + h],
    ]))
}

fn base(kernel: &mut SlabKernel, options: &BuildOptions) -> plate_kernel::KernelSolidHandle {
    let outline = plate_outline(&plate(PlateShape::Rectangle), options);
    let feature = FeatureSolid::new(
        FeatureLabel::new("plate"),
        FeatureRole::Structural,
        Extent::Span {
            bottom: 0.0,
            top: 3.0,
        },
        vec![outline],
    );
    execute_extrude(kernel, &feature, &PlateFrame::new(3.0), options)
        .unwrap()
        .handle
}

// ── Plate Outline Tests ─────────────────────────────────────────────────────

#[test]
fn every_plate_shape_is_a_ccw_simple_outline() {
    let options = BuildOptions::default();
    for shape in [
        PlateShape::Rectangle,
        PlateShape::Rounded,
        PlateShape::Oval,
        PlateShape::Chamfered,
        PlateShape::Hexagon,
        PlateShape::Octagon,
        PlateShape::Sweep,
    ] {
        let profile = plate_outline(&plate(shape), &options);
        assert!(profile.holes.is_empty());
        assert!(profile.outer.is_ccw(), "{:?} outline is clockwise", shape);
        assert!(profile.area() > 0.0);
        assert!(profile.area() <= 80.0 * 40.0 + 1e-9, "{:?} outgrew its box", shape);
        assert!(profile.contains([0.0, 0.0]), "{:?} misses its centre", shape);
    }
}

#[test]
fn known_shape_areas() {
    let options = BuildOptions::default();
    assert_relative_eq!(plate_outline(&plate(PlateShape::Rectangle), &options).area(), 3200.0);
    // Four corner triangles of leg 3.
    assert_relative_eq!(
        plate_outline(&plate(PlateShape::Chamfered), &options).area(),
        3200.0 - 2.0 * 9.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        plate_outline(&plate(PlateShape::Oval), &options).area(),
        std::f64::consts::PI * 40.0 * 20.0,
        max_relative = 5e-3
    );
}

// ── Extrude Tests ───────────────────────────────────────────────────────────

#[test]
fn extrude_unions_every_profile() {
    let mut kernel = SlabKernel::new();
    let options = BuildOptions::default();
    let feature = styled_feature(
        FeatureLabel::new("text[0] 'II'"),
        Style::Raised,
        2.0,
        vec![square(-5.0, 0.0, 4.0), square(5.0, 0.0, 4.0)],
    );
    let result = execute_extrude(&mut kernel, &feature, &PlateFrame::new(3.0), &options).unwrap();
    let volume = kernel.volume(&result.handle).unwrap();
    assert_relative_eq!(volume, 2.0 * 16.0 * 2.01, epsilon = 1e-9);
    // Intermediate pieces are released.
    assert_eq!(kernel.live_solids(), 1);
}

#[test]
fn extrude_without_profiles_fails() {
    let mut kernel = SlabKernel::new();
    let feature = styled_feature(FeatureLabel::new("text[3] ' '"), Style::Raised, 2.0, Vec::new());
    let err = execute_extrude(&mut kernel, &feature, &PlateFrame::new(3.0), &BuildOptions::default())
        .unwrap_err();
    match err {
        OpError::NoProfiles { label } => assert_eq!(label.as_str(), "text[3] ' '"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn subtractive_span_is_refused() {
    let mut kernel = SlabKernel::new();
    let feature = FeatureSolid::new(
        FeatureLabel::new("mount shallow"),
        FeatureRole::Subtractive,
        Extent::Span {
            bottom: 1.0,
            top: 3.0,
        },
        vec![square(0.0, 0.0, 4.0)],
    );
    let err = execute_extrude(&mut kernel, &feature, &PlateFrame::new(3.0), &BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, OpError::Clearance { .. }));
}

// ── Boolean Tests ───────────────────────────────────────────────────────────

#[test]
fn engraving_removes_footprint_times_depth() {
    let mut kernel = SlabKernel::new();
    let options = BuildOptions::default();
    let plate = base(&mut kernel, &options);
    let engraving = styled_feature(
        FeatureLabel::new("text[0] 'O'"),
        Style::Engraved,
        1.0,
        vec![square(0.0, 0.0, 10.0)],
    );
    let tool = execute_extrude(&mut kernel, &engraving, &PlateFrame::new(3.0), &options).unwrap();
    let result = execute_boolean(&mut kernel, &plate, &tool.handle, BooleanKind::Subtract).unwrap();
    assert_relative_eq!(kernel.volume(&result.handle).unwrap(), 9600.0 - 100.0, epsilon = 1e-6);
    assert!(kernel.contains_point(&result.handle, [0.0, 0.0, 1.5]).unwrap());
    assert!(!kernel.contains_point(&result.handle, [0.0, 0.0, 2.5]).unwrap());
}

#[test]
fn sweep_corner_holes_cut_their_full_depth() {
    let mut kernel = SlabKernel::new();
    let options = BuildOptions::default();
    let frame = PlateFrame::new(3.0);
    let config = PlateConfig {
        shape: PlateShape::Sweep,
        width: 100.0,
        height: 30.0,
        sweep_radius: 80.0,
        ..Default::default()
    };
    let band = FeatureSolid::new(
        FeatureLabel::new("plate"),
        FeatureRole::Structural,
        Extent::Span {
            bottom: 0.0,
            top: 3.0,
        },
        vec![plate_outline(&config, &options)],
    );
    let mut body = execute_extrude(&mut kernel, &band, &frame, &options).unwrap().handle;
    let before = kernel.volume(&body).unwrap();

    let mount = MountConfig {
        kind: MountKind::ScrewHoles,
        hole_pattern: HolePattern::FourCorners,
        hole_diameter: 4.0,
        counterbore: false,
        ..Default::default()
    };
    let surface = MountSurface::for_plate(&config, 100.0, 30.0);
    let cutters = mount_cutters(&mount, &surface, &frame, &options);
    assert_eq!(cutters.len(), 4);
    let expected: f64 = cutters.iter().map(|c| c.area() * 3.0).sum();
    for cutter in &cutters {
        let hole = execute_extrude(&mut kernel, cutter, &frame, &options).unwrap();
        body = execute_boolean(&mut kernel, &body, &hole.handle, BooleanKind::Subtract).unwrap().handle;
    }
    let removed = before - kernel.volume(&body).unwrap();
    // Four Ø4 holes through 3 mm is about 150.8 mm³.
    assert_relative_eq!(removed, expected, max_relative = 1e-2);
    assert!(removed > 145.0, "removed {}", removed);
}

#[test]
fn screw_hole_opens_through_a_raised_feature() {
    let mut kernel = SlabKernel::new();
    let options = BuildOptions::default();
    let frame = PlateFrame::new(3.0);
    let plate = base(&mut kernel, &options);

    // A raised pad over the whole top, then a hole through both.
    let pad = FeatureSolid::new(
        FeatureLabel::new("border"),
        FeatureRole::Structural,
        Extent::Raised { height: 1.0 },
        vec![square(0.0, 0.0, 30.0)],
    );
    let pad = execute_extrude(&mut kernel, &pad, &frame, &options).unwrap();
    let body = execute_boolean(&mut kernel, &plate, &pad.handle, BooleanKind::Union).unwrap();

    let mount = MountConfig {
        kind: MountKind::ScrewHoles,
        counterbore: false,
        positions: vec![[0.0, 0.0]],
        ..Default::default()
    };
    let cutters = mount_cutters(&mount, &MountSurface::flat(80.0, 40.0), &frame, &options);
    let hole = execute_extrude(&mut kernel, &cutters[0], &frame, &options).unwrap();
    let result = execute_boolean(&mut kernel, &body.handle, &hole.handle, BooleanKind::Subtract).unwrap();

    for z in [0.1, 1.5, 2.9, 3.5] {
        assert!(!kernel.contains_point(&result.handle, [0.0, 0.0, z]).unwrap(), "material at z={}", z);
    }
    assert!(kernel.contains_point(&result.handle, [5.0, 0.0, 3.5]).unwrap());
}
