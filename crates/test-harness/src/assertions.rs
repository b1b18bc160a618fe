//! Assertion helpers with diagnostic output.
//!
//! Every failure states expected vs actual, and where it helps, the
//! pipeline that produced the solid.

use plate_kernel::{BoundingBox, SolidBody};

use crate::helpers::HarnessError;
use crate::oracle::{check_filled_column, check_open_column, OracleVerdict};
use crate::scenario::BuiltPlate;

fn failed(ctx: &str, detail: String) -> HarnessError {
    HarnessError::AssertionFailed {
        detail: format!("[{}] {}", ctx, detail),
    }
}

/// Assert `actual` is within `rel_tol` of `expected`.
pub fn assert_volume_near(actual: f64, expected: f64, rel_tol: f64, ctx: &str) -> Result<(), HarnessError> {
    let err = ((actual - expected) / expected).abs();
    if err <= rel_tol {
        Ok(())
    } else {
        Err(failed(
            ctx,
            format!(
                "volume {:.3}, expected {:.3} (off by {:.2}%, tol {:.2}%)",
                actual,
                expected,
                err * 100.0,
                rel_tol * 100.0
            ),
        ))
    }
}

/// Assert the bounding box matches expected values within tolerance.
pub fn assert_bounding_box(
    bb: &BoundingBox,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    for i in 0..3 {
        if (bb.min[i] - expected_min[i]).abs() > tol {
            return Err(failed(
                ctx,
                format!(
                    "bounding box min[{}]: expected {:.3}, got {:.3} (tol={})",
                    i, expected_min[i], bb.min[i], tol,
                ),
            ));
        }
        if (bb.max[i] - expected_max[i]).abs() > tol {
            return Err(failed(
                ctx,
                format!(
                    "bounding box max[{}]: expected {:.3}, got {:.3} (tol={})",
                    i, expected_max[i], bb.max[i], tol,
                ),
            ));
        }
    }
    Ok(())
}

fn verdict(v: OracleVerdict, ctx: &str) -> Result<(), HarnessError> {
    if v.passed {
        Ok(())
    } else {
        Err(failed(ctx, v.detail))
    }
}

/// Assert no material anywhere in the column at `xy` between the heights.
pub fn assert_open_column(
    solid: &dyn SolidBody,
    xy: [f64; 2],
    z_min: f64,
    z_max: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    verdict(check_open_column(solid, xy, z_min, z_max), ctx)
}

/// Assert material everywhere in the column at `xy` between the heights.
pub fn assert_filled_column(
    solid: &dyn SolidBody,
    xy: [f64; 2],
    z_min: f64,
    z_max: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    verdict(check_filled_column(solid, xy, z_min, z_max), ctx)
}

/// Assert the pipeline applied exactly these step labels, in order.
pub fn assert_steps(built: &BuiltPlate, expected: &[&str]) -> Result<(), HarnessError> {
    let actual = built.step_labels();
    if actual.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "pipeline mismatch.\nExpected: {:?}\nActual:   {:?}\nFailures: {:?}",
                expected, actual, built.result.diagnostics.failures
            ),
        })
    }
}

/// Assert every verdict passed, listing all that did not.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failures: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("  {}: {}", v.oracle_name, v.detail))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failed(ctx, format!("{} oracle failures:\n{}", failures.len(), failures.join("\n"))))
    }
}
