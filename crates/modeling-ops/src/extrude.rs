use std::time::Instant;

use plate_kernel::{KernelBundle, KernelSolidHandle};
use plate_types::BuildOptions;
use tracing::trace;

use crate::types::{Diagnostics, FeatureSolid, OpError, OpResult, PlateFrame};

/// Execute an extrude operation.
///
/// Extrudes every profile of `feature` over its vertical extent and unions
/// the pieces into one tool solid. Subtractive features are refused unless
/// they clear the surfaces they open.
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    feature: &FeatureSolid,
    frame: &PlateFrame,
    options: &BuildOptions,
) -> Result<OpResult, OpError> {
    if feature.profiles.is_empty() {
        return Err(OpError::NoProfiles {
            label: feature.label.clone(),
        });
    }
    let (z_bottom, z_top) = feature.z_range(frame, options);
    if !feature.clears(frame, options) {
        return Err(OpError::Clearance {
            label: feature.label.clone(),
            z_bottom,
            z_top,
        });
    }

    let start = Instant::now();
    let mut tool: Option<KernelSolidHandle> = None;
    for profile in &feature.profiles {
        let piece = match kb.extrude_profile(profile, z_bottom, z_top) {
            Ok(piece) => piece,
            Err(err) => {
                if let Some(acc) = &tool {
                    kb.release(acc);
                }
                return Err(err.into());
            }
        };
        tool = Some(match tool {
            None => piece,
            Some(acc) => {
                let merged = kb.boolean_union(&acc, &piece);
                kb.release(&acc);
                kb.release(&piece);
                merged?
            }
        });
    }
    let handle = tool.ok_or_else(|| OpError::NoProfiles {
        label: feature.label.clone(),
    })?;

    trace!(label = %feature.label, profiles = feature.profiles.len(), z_bottom, z_top, "extruded feature");
    Ok(OpResult {
        handle,
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            kernel_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    })
}
