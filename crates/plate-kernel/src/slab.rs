//! Stacked-slab solids: the exact representation for shapes built only
//! from vertical extrusions.
//!
//! A [`SlabSolid`] is a list of horizontal slabs ordered by height. Each
//! slab is a planar [`Region`] swept between two heights. Booleans merge the
//! operands' height breakpoints and combine regions interval by interval,
//! so the result is exact up to the region grid.

use plate_types::Profile;

use crate::region::Region;
use crate::types::{BoundingBox, KernelError};

/// Heights snap to a micrometre so that equal levels compare bit for bit.
fn snap_z(z: f64) -> f64 {
    (z * 1e6).round() / 1e6
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slab {
    pub z0: f64,
    pub z1: f64,
    pub region: Region,
}

impl Slab {
    pub fn height(&self) -> f64 {
        self.z1 - self.z0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlabOp {
    Union,
    Subtract,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlabSolid {
    slabs: Vec<Slab>,
}

impl SlabSolid {
    pub fn extrude(profile: &Profile, z_bottom: f64, z_top: f64) -> Result<SlabSolid, KernelError> {
        let (z0, z1) = (snap_z(z_bottom), snap_z(z_top));
        if !z0.is_finite() || !z1.is_finite() || z1 <= z0 {
            return Err(KernelError::InvalidProfile {
                reason: format!("extrusion heights {z_bottom}..{z_top} enclose no volume"),
            });
        }
        let region = Region::from_profile(profile);
        if region.is_empty() {
            return Err(KernelError::InvalidProfile {
                reason: "profile collapses to nothing on the region grid".to_string(),
            });
        }
        Ok(SlabSolid {
            slabs: vec![Slab { z0, z1, region }],
        })
    }

    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    pub fn volume(&self) -> f64 {
        self.slabs.iter().map(|s| s.region.area() * s.height()).sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for slab in &self.slabs {
            let Some(b) = slab.region.bounds() else {
                continue;
            };
            let lo = [b.min[0], b.min[1], slab.z0];
            let hi = [b.max[0], b.max[1], slab.z1];
            match bbox.as_mut() {
                Some(acc) => {
                    acc.include(lo);
                    acc.include(hi);
                }
                None => bbox = Some(BoundingBox { min: lo, max: hi }),
            }
        }
        bbox
    }

    /// Interior test. A point on a level between two slabs is inside when
    /// both of them cover its XY position.
    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        let xy = [p[0], p[1]];
        if self
            .slabs
            .iter()
            .any(|s| p[2] > s.z0 && p[2] < s.z1 && s.region.contains(xy))
        {
            return true;
        }
        let z = snap_z(p[2]);
        let below = self.slabs.iter().any(|s| s.z1 == z && s.region.contains(xy));
        below && self.slabs.iter().any(|s| s.z0 == z && s.region.contains(xy))
    }

    /// Every slab carries positive area and no slab region has touching
    /// boundary rings. Rings meeting at a vertex sweep into a vertical
    /// edge shared by four faces.
    pub fn is_manifold(&self) -> bool {
        !self.slabs.is_empty()
            && self
                .slabs
                .iter()
                .all(|s| s.region.area() > 0.0 && !s.region.is_pinched())
    }

    pub(crate) fn combine(&self, other: &SlabSolid, op: SlabOp) -> Result<SlabSolid, KernelError> {
        let mut levels: Vec<f64> = self
            .slabs
            .iter()
            .chain(other.slabs.iter())
            .flat_map(|s| [s.z0, s.z1])
            .collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup();

        let mut slabs: Vec<Slab> = Vec::new();
        for w in levels.windows(2) {
            let (lo, hi) = (w[0], w[1]);
            let mid = (lo + hi) / 2.0;
            let region = match (op, self.region_at(mid), other.region_at(mid)) {
                (SlabOp::Union, Some(a), Some(b)) => a.union(b)?,
                (SlabOp::Union, Some(a), None) => a.clone(),
                (SlabOp::Union, None, Some(b)) => b.clone(),
                (SlabOp::Subtract, Some(a), Some(b)) => a.difference(b)?,
                (SlabOp::Subtract, Some(a), None) => a.clone(),
                _ => continue,
            };
            if region.is_empty() {
                continue;
            }
            match slabs.last_mut() {
                Some(prev) if prev.z1 == lo && prev.region.same_shape(&region) => prev.z1 = hi,
                _ => slabs.push(Slab { z0: lo, z1: hi, region }),
            }
        }
        Ok(SlabSolid { slabs })
    }

    fn region_at(&self, z: f64) -> Option<&Region> {
        self.slabs
            .iter()
            .find(|s| z > s.z0 && z < s.z1)
            .map(|s| &s.region)
    }
}
