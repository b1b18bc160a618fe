use std::time::Instant;

use plate_kernel::{KernelBundle, KernelSolidHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Diagnostics, FeatureRole, OpError, OpResult};

/// How a feature solid is combined with the plate body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanKind {
    Union,
    Subtract,
}

impl BooleanKind {
    /// Structural and additive features are fused on; subtractive ones are cut.
    pub fn for_role(role: FeatureRole) -> Self {
        match role {
            FeatureRole::Subtractive => BooleanKind::Subtract,
            FeatureRole::Structural | FeatureRole::Additive => BooleanKind::Union,
        }
    }
}

/// Combine `tool` into `body`. Neither operand is released here; the
/// pipeline owns both and frees whichever it no longer needs.
pub fn execute_boolean(
    kb: &mut dyn KernelBundle,
    body: &KernelSolidHandle,
    tool: &KernelSolidHandle,
    kind: BooleanKind,
) -> Result<OpResult, OpError> {
    let start = Instant::now();
    let handle = match kind {
        BooleanKind::Union => kb.boolean_union(body, tool)?,
        BooleanKind::Subtract => kb.boolean_subtract(body, tool)?,
    };
    let kernel_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(?kind, kernel_time_ms, "boolean applied");
    Ok(OpResult {
        handle,
        diagnostics: Diagnostics { warnings: Vec::new(), kernel_time_ms },
    })
}
