//! Point-in-solid sampling.
//!
//! A column is a vertical segment at a fixed `(x, y)`. Sample heights sit at
//! the centres of `samples` equal slices of `(z_min, z_max)`, so no sample
//! lands exactly on a face at either end.

use plate_kernel::SolidBody;

/// One sample along a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSample {
    pub z: f64,
    pub inside: bool,
}

/// Sample `solid` at `samples` heights between `z_min` and `z_max`.
pub fn sample_column(
    solid: &dyn SolidBody,
    xy: [f64; 2],
    z_min: f64,
    z_max: f64,
    samples: usize,
) -> Vec<ColumnSample> {
    let n = samples.max(1);
    let step = (z_max - z_min) / n as f64;
    (0..n)
        .map(|i| {
            let z = z_min + (i as f64 + 0.5) * step;
            ColumnSample {
                z,
                inside: solid.contains_point([xy[0], xy[1], z]),
            }
        })
        .collect()
}

/// Heights in the column where `solid` has material.
pub fn filled_heights(solid: &dyn SolidBody, xy: [f64; 2], z_min: f64, z_max: f64, samples: usize) -> Vec<f64> {
    sample_column(solid, xy, z_min, z_max, samples)
        .into_iter()
        .filter(|s| s.inside)
        .map(|s| s.z)
        .collect()
}

/// No sample in the column hits material.
pub fn column_is_open(solid: &dyn SolidBody, xy: [f64; 2], z_min: f64, z_max: f64) -> bool {
    filled_heights(solid, xy, z_min, z_max, 16).is_empty()
}

/// Every sample in the column hits material.
pub fn column_is_filled(solid: &dyn SolidBody, xy: [f64; 2], z_min: f64, z_max: f64) -> bool {
    sample_column(solid, xy, z_min, z_max, 16).iter().all(|s| s.inside)
}
