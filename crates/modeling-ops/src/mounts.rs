//! Mount cutters and the desk stand.
//!
//! Cutters carry their vertical extent as an [`Extent`], so they keep
//! clearing the plate whatever its thickness.

use plate_types::validate::MIN_POCKET_FLOOR;
use plate_types::{
    BuildOptions, FeatureLabel, HangingPosition, HolePattern, MountConfig, MountKind, PlateConfig,
    PlateShape, Point2, Polygon, Profile,
};

use crate::plate::{capsule, circle};
use crate::types::{Extent, FeatureRole, FeatureSolid, PlateFrame};

/// The face mounts are laid out on: the plate's resolved footprint, and
/// the centre-line radius when the plate is an arched band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountSurface {
    pub width: f64,
    pub height: f64,
    pub sweep_radius: Option<f64>,
}

impl MountSurface {
    pub fn flat(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            sweep_radius: None,
        }
    }

    pub fn for_plate(plate: &PlateConfig, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            sweep_radius: (plate.shape == PlateShape::Sweep).then_some(plate.sweep_radius),
        }
    }

    /// Map a point given in the unrolled `width` × `height` frame onto the
    /// plate. On a sweep, x is arc length along the centre line and y is
    /// the radial offset from it.
    pub fn place(&self, p: Point2) -> Point2 {
        match self.sweep_radius {
            None => p,
            Some(radius) => {
                let angle = p[0] / radius;
                let r = radius + p[1];
                [r * angle.sin(), r * angle.cos() - radius]
            }
        }
    }

    /// Unit vector pointing "down" the plate at `p`: toward the sweep
    /// centre on a band, −Y otherwise.
    pub fn down(&self, p: Point2) -> Point2 {
        match self.sweep_radius {
            None => [0.0, -1.0],
            Some(radius) => {
                let (dx, dy) = (-p[0], -radius - p[1]);
                let len = (dx * dx + dy * dy).sqrt();
                if len < 1e-12 {
                    [0.0, -1.0]
                } else {
                    [dx / len, dy / len]
                }
            }
        }
    }
}

/// Default cutter centres for a mount on `surface`. Explicit positions in
/// the config replace these and are taken as plate coordinates.
pub fn mount_positions(mount: &MountConfig, surface: &MountSurface) -> Vec<Point2> {
    if !mount.positions.is_empty() {
        return mount.positions.clone();
    }
    let (width, hw, hh) = (surface.width, surface.width / 2.0, surface.height / 2.0);
    let e = mount.edge_distance;
    let corners = |d: f64| vec![[-hw + d, hh - d], [hw - d, hh - d], [-hw + d, -hh + d], [hw - d, -hh + d]];
    let unrolled = match mount.kind {
        MountKind::ScrewHoles => match mount.hole_pattern {
            HolePattern::TwoTop => vec![[-hw + e, hh - e], [hw - e, hh - e]],
            HolePattern::TwoSides => vec![[-hw + e, 0.0], [hw - e, 0.0]],
            HolePattern::FourCorners => corners(e),
            HolePattern::CenterTop => vec![[0.0, hh - e]],
        },
        MountKind::Keyhole => vec![[-width / 4.0, hh - e], [width / 4.0, hh - e]],
        MountKind::MagnetPocket => {
            let d = mount.magnet_edge_distance;
            if mount.magnet_count == 4 {
                corners(d)
            } else {
                vec![[-hw + d, 0.0], [hw - d, 0.0]]
            }
        }
        MountKind::HangingHole => match mount.hanging_position {
            HangingPosition::TopCenter => vec![[0.0, hh - e]],
            HangingPosition::Corners => vec![[-hw + e, hh - e], [hw - e, hh - e]],
        },
        MountKind::AdhesiveRecess => vec![[0.0, 0.0]],
        MountKind::None | MountKind::DeskStand => Vec::new(),
    };
    unrolled.into_iter().map(|p| surface.place(p)).collect()
}

fn offset(p: Point2, dir: Point2, distance: f64) -> Point2 {
    [p[0] + dir[0] * distance, p[1] + dir[1] * distance]
}

fn label(name: &str, index: usize) -> FeatureLabel {
    FeatureLabel::new(format!("mount {}[{}]", name, index))
}

fn cutter(name: &str, index: usize, extent: Extent, ring: Polygon) -> FeatureSolid {
    FeatureSolid::new(
        label(name, index),
        FeatureRole::Subtractive,
        extent,
        vec![Profile::solid(ring).oriented()],
    )
}

/// Subtractive mount features in placement order. Holes and back pockets
/// are marked as keep-out; counterbores are not, since they only widen a
/// hole that already stays open.
///
/// Slots run "down" the surface, so on a sweep they point at its centre.
pub fn mount_cutters(
    mount: &MountConfig,
    surface: &MountSurface,
    frame: &PlateFrame,
    options: &BuildOptions,
) -> Vec<FeatureSolid> {
    let segments = options.circle_segments();
    let quarter = options.arc_segments_per_quarter as usize;
    let positions = mount_positions(mount, surface);
    let mut out = Vec::new();

    match mount.kind {
        MountKind::None | MountKind::DeskStand => {}
        MountKind::ScrewHoles => {
            for (i, &p) in positions.iter().enumerate() {
                let hole = circle(p, mount.hole_diameter / 2.0, segments);
                out.push(cutter("screw_hole", i, Extent::Through, hole).with_keep_out());
                if mount.counterbore {
                    let bore = circle(p, mount.counterbore_diameter / 2.0, segments);
                    let extent = Extent::Engraved {
                        depth: mount.counterbore_depth,
                    };
                    out.push(cutter("counterbore", i, extent, bore));
                }
            }
        }
        MountKind::Keyhole => {
            for (i, &p) in positions.iter().enumerate() {
                let bottom = offset(p, surface.down(p), mount.keyhole_length);
                let slot = capsule(p, bottom, mount.keyhole_small_diameter / 2.0, quarter);
                out.push(cutter("keyhole_slot", i, Extent::Through, slot).with_keep_out());
                let entry = circle(p, mount.keyhole_large_diameter / 2.0, segments);
                let extent = Extent::FromBack {
                    depth: frame.thickness() / 2.0,
                };
                out.push(cutter("keyhole_entry", i, extent, entry).with_keep_out());
            }
        }
        MountKind::MagnetPocket => {
            let diameter = mount.magnet_diameter + mount.magnet_tolerance;
            let depth = (mount.magnet_height + mount.magnet_tolerance).min(frame.thickness() - MIN_POCKET_FLOOR);
            for (i, &p) in positions.iter().enumerate() {
                let pocket = circle(p, diameter / 2.0, segments);
                out.push(cutter("magnet_pocket", i, Extent::FromBack { depth }, pocket).with_keep_out());
            }
        }
        MountKind::HangingHole => {
            let half = mount.hanging_slot_length / 2.0;
            for (i, &p) in positions.iter().enumerate() {
                let down = surface.down(p);
                let hole = capsule(
                    offset(p, down, -half),
                    offset(p, down, half),
                    mount.hanging_diameter / 2.0,
                    quarter,
                );
                out.push(cutter("hanging_hole", i, Extent::Through, hole).with_keep_out());
            }
        }
        MountKind::AdhesiveRecess => {
            let w = surface.width * mount.recess_width_ratio;
            for (i, &p) in positions.iter().enumerate() {
                let ring = Polygon::new(vec![
                    [p[0] - w / 2.0, p[1] - mount.recess_height / 2.0],
                    [p[0] + w / 2.0, p[1] - mount.recess_height / 2.0],
                    [p[0] + w / 2.0, p[1] + mount.recess_height / 2.0],
                    [p[0] - w / 2.0, p[1] + mount.recess_height / 2.0],
                ]);
                let extent = Extent::FromBack {
                    depth: mount.recess_depth,
                };
                out.push(cutter("adhesive_recess", i, extent, ring).with_keep_out());
            }
        }
    }
    out
}

/// Rise and run of the stand wedge. The run never reaches past the
/// plate's far edge.
pub fn stand_dimensions(mount: &MountConfig, height: f64) -> (f64, f64) {
    let angle = mount.stand_angle.to_radians();
    let run = (mount.stand_depth * angle.cos()).min(height);
    let rise = mount.stand_depth * angle.sin();
    (rise, run)
}

/// Lowest point of the stand, or 0 without one.
pub fn stand_floor(mount: &MountConfig, height: f64) -> f64 {
    if mount.kind == MountKind::DeskStand {
        -stand_dimensions(mount, height).0
    } else {
        0.0
    }
}

/// The desk stand as a staircase of prisms under the back (−Y) edge,
/// approximating a wedge that is deepest at the edge and tapers toward the
/// front. The top step overlaps the plate by the coplanar epsilon.
pub fn stand_features(mount: &MountConfig, width: f64, height: f64, options: &BuildOptions) -> Vec<FeatureSolid> {
    if mount.kind != MountKind::DeskStand {
        return Vec::new();
    }
    let (rise, run) = stand_dimensions(mount, height);
    let n = mount.stand_steps.max(1) as usize;
    let half_w = width * mount.stand_width_ratio / 2.0;
    let back = -height / 2.0;

    (0..n)
        .map(|k| {
            let z_top = if k == 0 {
                options.coplanar_epsilon
            } else {
                -rise * k as f64 / n as f64
            };
            let z_bottom = -rise * (k + 1) as f64 / n as f64;
            let front = back + run * (1.0 - k as f64 / n as f64);
            let ring = Polygon::new(vec![[-half_w, back], [half_w, back], [half_w, front], [-half_w, front]]);
            FeatureSolid::new(
                label("stand", k),
                FeatureRole::Structural,
                Extent::Span {
                    bottom: z_bottom,
                    top: z_top,
                },
                vec![Profile::solid(ring)],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> MountSurface {
        MountSurface::flat(100.0, 30.0)
    }

    fn sweep() -> MountSurface {
        MountSurface {
            width: 100.0,
            height: 30.0,
            sweep_radius: Some(80.0),
        }
    }

    fn screws(pattern: HolePattern) -> MountConfig {
        MountConfig {
            kind: MountKind::ScrewHoles,
            hole_pattern: pattern,
            ..Default::default()
        }
    }

    #[test]
    fn hole_patterns_follow_edge_distance() {
        assert_eq!(
            mount_positions(&screws(HolePattern::TwoTop), &flat()),
            vec![[-42.0, 7.0], [42.0, 7.0]]
        );
        assert_eq!(
            mount_positions(&screws(HolePattern::TwoSides), &flat()),
            vec![[-42.0, 0.0], [42.0, 0.0]]
        );
        assert_eq!(mount_positions(&screws(HolePattern::FourCorners), &flat()).len(), 4);
        assert_eq!(
            mount_positions(&screws(HolePattern::CenterTop), &flat()),
            vec![[0.0, 7.0]]
        );
    }

    #[test]
    fn sweep_corners_follow_the_band() {
        let surface = sweep();
        let outline = crate::plate::sweep_band(100.0, 30.0, 80.0, 64);
        for p in mount_positions(&screws(HolePattern::FourCorners), &surface) {
            assert!(outline.contains(p), "{:?} is off the band", p);
            // Edge distance holds radially: 8 mm in from the band's rim.
            let r = (p[0] * p[0] + (p[1] + 80.0).powi(2)).sqrt();
            assert!((r - 87.0).abs() < 1e-9 || (r - 73.0).abs() < 1e-9, "r = {}", r);
        }
    }

    #[test]
    fn sweep_apex_is_unchanged() {
        let surface = sweep();
        let top = mount_positions(&screws(HolePattern::CenterTop), &surface);
        assert_eq!(top.len(), 1);
        assert!((top[0][0]).abs() < 1e-12);
        assert!((top[0][1] - 7.0).abs() < 1e-12);
    }

    #[test]
    fn sweep_slots_point_at_the_centre() {
        let mount = MountConfig {
            kind: MountKind::HangingHole,
            hanging_position: HangingPosition::Corners,
            ..Default::default()
        };
        let surface = sweep();
        let p = mount_positions(&mount, &surface)[1];
        let down = surface.down(p);
        let towards = [-p[0], -80.0 - p[1]];
        let len = (towards[0] * towards[0] + towards[1] * towards[1]).sqrt();
        assert!((down[0] - towards[0] / len).abs() < 1e-12);
        assert!((down[1] - towards[1] / len).abs() < 1e-12);
    }

    #[test]
    fn explicit_positions_win() {
        let mut mount = screws(HolePattern::FourCorners);
        mount.positions = vec![[1.0, 2.0]];
        assert_eq!(mount_positions(&mount, &flat()), vec![[1.0, 2.0]]);
    }

    #[test]
    fn counterbored_screw_hole_has_two_cutters() {
        let frame = PlateFrame::new(3.0);
        let cutters = mount_cutters(
            &screws(HolePattern::CenterTop),
            &flat(),
            &frame,
            &BuildOptions::default(),
        );
        assert_eq!(cutters.len(), 2);
        assert_eq!(cutters[0].extent, Extent::Through);
        assert!(cutters[0].keep_out);
        assert_eq!(cutters[1].extent, Extent::Engraved { depth: 2.0 });
        assert!(!cutters[1].keep_out);
    }

    #[test]
    fn magnet_pocket_depth_leaves_a_floor() {
        let mount = MountConfig {
            kind: MountKind::MagnetPocket,
            magnet_height: 5.0,
            ..Default::default()
        };
        let cutters = mount_cutters(&mount, &flat(), &PlateFrame::new(3.0), &BuildOptions::default());
        assert_eq!(cutters.len(), 2);
        assert_eq!(cutters[0].extent, Extent::FromBack { depth: 2.5 });
    }

    #[test]
    fn stand_steps_taper_toward_the_front() {
        let mount = MountConfig {
            kind: MountKind::DeskStand,
            ..Default::default()
        };
        let steps = stand_features(&mount, 100.0, 30.0, &BuildOptions::default());
        assert_eq!(steps.len(), 4);
        let areas: Vec<f64> = steps.iter().map(FeatureSolid::area).collect();
        assert!(areas.windows(2).all(|w| w[0] > w[1]));
        let floor = stand_floor(&mount, 30.0);
        match steps[3].extent {
            Extent::Span { bottom, .. } => assert!((bottom - floor).abs() < 1e-12),
            other => panic!("unexpected extent {:?}", other),
        }
    }
}
