//! Property-based tests for slab kernel invariants using the `proptest` crate.

use proptest::prelude::*;

use plate_kernel::*;
use plate_types::{Polygon, Profile};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Axis-aligned box on the 0.01 mm grid: (x0, y0, x1, y1, z0, z1).
fn arb_box() -> impl Strategy<Value = (f64, f64, f64, f64, f64, f64)> {
    (0i32..4000, 0i32..3000, 10i32..3000, 10i32..2000, -200i32..400, 10i32..600).prop_map(
        |(x, y, w, h, z, d)| {
            let c = |v: i32| v as f64 / 100.0;
            (c(x), c(y), c(x + w), c(y + h), c(z), c(z + d))
        },
    )
}

fn extrude(kernel: &mut SlabKernel, b: (f64, f64, f64, f64, f64, f64)) -> KernelSolidHandle {
    let (x0, y0, x1, y1, z0, z1) = b;
    let outer = Polygon::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]);
    kernel.extrude_profile(&Profile::solid(outer), z0, z1).unwrap()
}

fn overlap(a: (f64, f64, f64, f64, f64, f64), b: (f64, f64, f64, f64, f64, f64)) -> f64 {
    let span = |lo0: f64, hi0: f64, lo1: f64, hi1: f64| (hi0.min(hi1) - lo0.max(lo1)).max(0.0);
    span(a.0, a.2, b.0, b.2) * span(a.1, a.3, b.1, b.3) * span(a.4, a.5, b.4, b.5)
}

fn box_volume(b: (f64, f64, f64, f64, f64, f64)) -> f64 {
    (b.2 - b.0) * (b.3 - b.1) * (b.5 - b.4)
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Inclusion-exclusion: vol(a ∪ b) = vol(a) + vol(b) - vol(a ∩ b)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn union_volume_inclusion_exclusion(a in arb_box(), b in arb_box()) {
        let mut kernel = SlabKernel::new();
        let ha = extrude(&mut kernel, a);
        let hb = extrude(&mut kernel, b);
        let u = kernel.boolean_union(&ha, &hb).unwrap();
        let expected = box_volume(a) + box_volume(b) - overlap(a, b);
        let got = kernel.volume(&u).unwrap();
        prop_assert!((got - expected).abs() < TOL * expected.max(1.0),
            "union volume {} != {}", got, expected);
    }
}

// ---------------------------------------------------------------------------
// 2. Subtraction removes exactly the overlap
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn subtract_removes_overlap(a in arb_box(), b in arb_box()) {
        let mut kernel = SlabKernel::new();
        let ha = extrude(&mut kernel, a);
        let hb = extrude(&mut kernel, b);
        let d = kernel.boolean_subtract(&ha, &hb).unwrap();
        let expected = box_volume(a) - overlap(a, b);
        let got = kernel.volume(&d).unwrap();
        prop_assert!((got - expected).abs() < TOL * box_volume(a).max(1.0),
            "difference volume {} != {}", got, expected);
        prop_assert_eq!(kernel.is_empty(&d).unwrap(), expected <= 0.0);
    }
}

// ---------------------------------------------------------------------------
// 3. Meshes of subtracted solids are closed and enclose the solid's volume
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn pocketed_plate_mesh_is_watertight(pocket in arb_box()) {
        let plate = (0.0, 0.0, 60.0, 40.0, 0.0, 3.0);
        let mut kernel = SlabKernel::new();
        let hp = extrude(&mut kernel, plate);
        let hk = extrude(&mut kernel, pocket);
        let d = kernel.boolean_subtract(&hp, &hk).unwrap();
        prop_assume!(!kernel.is_empty(&d).unwrap());

        let mesh = kernel.tessellate(&d, &Tessellation::default()).unwrap();
        prop_assert!(mesh_is_closed(&mesh), "mesh has unpaired edges");
        let solid = kernel.volume(&d).unwrap();
        prop_assert!((mesh_volume(&mesh) - solid).abs() < 1e-3 * solid.max(1.0),
            "mesh volume {} != solid volume {}", mesh_volume(&mesh), solid);
    }
}

// ---------------------------------------------------------------------------
// 4. Union contains both operands' interior points
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn union_contains_operand_centres(a in arb_box(), b in arb_box()) {
        let mut kernel = SlabKernel::new();
        let ha = extrude(&mut kernel, a);
        let hb = extrude(&mut kernel, b);
        let u = kernel.boolean_union(&ha, &hb).unwrap();
        for bx in [a, b] {
            let centre = [(bx.0 + bx.2) / 2.0, (bx.1 + bx.3) / 2.0, (bx.4 + bx.5) / 2.0];
            prop_assert!(kernel.contains_point(&u, centre).unwrap());
        }
    }
}
