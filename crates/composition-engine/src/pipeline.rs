//! The ordered boolean pipeline.
//!
//! base plate → structural unions → subtractions → keep-out trimmed
//! additive unions. Each step replaces the accumulated solid and is checked
//! for emptiness and manifoldness before the next one runs.

use modeling_ops::{execute_boolean, execute_extrude, BooleanKind, FeatureRole, FeatureSolid, OpError, PlateFrame};
use plate_kernel::{KernelBundle, KernelError, KernelSolidHandle};
use plate_types::{BuildOptions, FeatureLabel};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::plan::BuildPlan;
use crate::types::{BuildDiagnostics, BuildError, BuildStep, CompositionError, FeatureFailure};

fn kernel_error(label: &FeatureLabel, err: KernelError) -> BuildError {
    BuildError::from_op(label, OpError::Kernel(err))
}

struct Pipeline<'a> {
    kb: &'a mut dyn KernelBundle,
    frame: PlateFrame,
    options: &'a BuildOptions,
    cancel: &'a CancellationToken,
    body: KernelSolidHandle,
    /// Union of the mount cutters already cut, kept to trim raised tools.
    keep_out: Option<KernelSolidHandle>,
    diagnostics: BuildDiagnostics,
}

/// Run `plan` through the kernel. Returns the handle of the finished solid
/// together with the build diagnostics.
///
/// The base plate always aborts the build on failure. Other features abort
/// it too unless `options.partial` is set, in which case the failing step is
/// recorded and the previous solid carries on.
pub fn compose(
    kb: &mut dyn KernelBundle,
    plan: &BuildPlan,
    options: &BuildOptions,
    cancel: &CancellationToken,
) -> Result<(KernelSolidHandle, BuildDiagnostics), BuildError> {
    cancel.check()?;
    let base = execute_extrude(kb, &plan.base, &plan.frame, options).map_err(|e| BuildError::from_op(&plan.base.label, e))?;
    let empty = kb.is_empty(&base.handle);
    if !matches!(empty, Ok(false)) {
        kb.release(&base.handle);
    }
    if empty.map_err(|e| kernel_error(&plan.base.label, e))? {
        return Err(CompositionError::EmptyResult {
            label: plan.base.label.clone(),
            kind: BooleanKind::Union,
        }
        .into());
    }

    let mut pipeline = Pipeline {
        kb,
        frame: plan.frame,
        options,
        cancel,
        body: base.handle,
        keep_out: None,
        diagnostics: BuildDiagnostics {
            failures: plan.failures.clone(),
            kernel_time_ms: base.diagnostics.kernel_time_ms,
            ..Default::default()
        },
    };

    for feature in plan.structural.iter().chain(&plan.subtractive).chain(&plan.additive) {
        if let Err(err) = pipeline.step(feature) {
            pipeline.abandon();
            return Err(err);
        }
    }

    if let Some(keep_out) = pipeline.keep_out.take() {
        pipeline.kb.release(&keep_out);
    }
    Ok((pipeline.body, pipeline.diagnostics))
}

impl Pipeline<'_> {
    /// Release every solid the pipeline still owns. A failed build leaves
    /// nothing behind in the caller's kernel session.
    fn abandon(mut self) {
        if let Some(keep_out) = self.keep_out.take() {
            self.kb.release(&keep_out);
        }
        self.kb.release(&self.body);
        debug!(failures = self.diagnostics.failures.len(), "build abandoned");
    }

    fn step(&mut self, feature: &FeatureSolid) -> Result<(), BuildError> {
        self.cancel.check()?;
        match self.apply(feature, BooleanKind::for_role(feature.role)) {
            Ok(()) => Ok(()),
            Err(err) if self.options.partial => {
                warn!(label = %feature.label, error = %err, "feature skipped");
                self.diagnostics.failures.push(FeatureFailure {
                    label: err.label().cloned().unwrap_or_else(|| feature.label.clone()),
                    message: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn apply(&mut self, feature: &FeatureSolid, kind: BooleanKind) -> Result<(), BuildError> {
        let label = &feature.label;
        let tool = execute_extrude(&mut *self.kb, feature, &self.frame, self.options)
            .map_err(|e| BuildError::from_op(label, e))?;
        self.diagnostics.kernel_time_ms += tool.diagnostics.kernel_time_ms;

        let tool = if feature.role == FeatureRole::Additive {
            match self.trim(label, tool.handle)? {
                Some(trimmed) => trimmed,
                None => return Ok(()),
            }
        } else {
            tool.handle
        };

        let result = match execute_boolean(&mut *self.kb, &self.body, &tool, kind) {
            Ok(result) => result,
            Err(e) => {
                self.kb.release(&tool);
                return Err(BuildError::from_op(label, e));
            }
        };
        self.diagnostics.kernel_time_ms += result.diagnostics.kernel_time_ms;
        if let Err(e) = self.check(label, kind, &result.handle) {
            self.kb.release(&result.handle);
            self.kb.release(&tool);
            return Err(e);
        }

        self.kb.release(&self.body);
        self.body = result.handle;

        debug!(label = %label, role = ?feature.role, ?kind, "applied feature");
        self.diagnostics.steps.push(BuildStep {
            label: label.clone(),
            role: feature.role,
            kind,
        });

        if feature.keep_out {
            self.keep(label, tool)
        } else {
            self.kb.release(&tool);
            Ok(())
        }
    }

    /// Cut the mount keep-out from a raised tool. None when nothing of the
    /// tool survives.
    fn trim(&mut self, label: &FeatureLabel, tool: KernelSolidHandle) -> Result<Option<KernelSolidHandle>, BuildError> {
        let Some(keep_out) = &self.keep_out else {
            return Ok(Some(tool));
        };
        let trimmed = execute_boolean(&mut *self.kb, &tool, keep_out, BooleanKind::Subtract);
        self.kb.release(&tool);
        let trimmed = trimmed.map_err(|e| BuildError::from_op(label, e))?;
        self.diagnostics.kernel_time_ms += trimmed.diagnostics.kernel_time_ms;

        let empty = self.kb.is_empty(&trimmed.handle);
        if empty.is_err() {
            self.kb.release(&trimmed.handle);
        }
        if empty.map_err(|e| kernel_error(label, e))? {
            self.kb.release(&trimmed.handle);
            warn!(label = %label, "raised feature lies entirely inside a mount opening");
            self.diagnostics
                .warnings
                .push(format!("{}: swallowed by mount keep-out", label));
            return Ok(None);
        }
        Ok(Some(trimmed.handle))
    }

    fn keep(&mut self, label: &FeatureLabel, tool: KernelSolidHandle) -> Result<(), BuildError> {
        let merged = match self.keep_out.take() {
            None => tool,
            Some(acc) => {
                let merged = self.kb.boolean_union(&acc, &tool);
                self.kb.release(&acc);
                self.kb.release(&tool);
                merged.map_err(|e| kernel_error(label, e))?
            }
        };
        self.keep_out = Some(merged);
        Ok(())
    }

    fn check(&self, label: &FeatureLabel, kind: BooleanKind, solid: &KernelSolidHandle) -> Result<(), BuildError> {
        let kb = self.kb.as_introspect();
        if kb.is_empty(solid).map_err(|e| kernel_error(label, e))? {
            return Err(CompositionError::EmptyResult {
                label: label.clone(),
                kind,
            }
            .into());
        }
        if !kb.is_manifold(solid).map_err(|e| kernel_error(label, e))? {
            return Err(CompositionError::NonManifold {
                label: label.clone(),
                kind,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_build;
    use approx::assert_relative_eq;
    use modeling_ops::Extent;
    use plate_kernel::{KernelIntrospect, SlabKernel};
    use plate_types::{FontLibrary, MountKind, NameplateConfig, PlateShape, Polygon, Profile};

    fn rect_plate() -> NameplateConfig {
        let mut config = NameplateConfig::default();
        config.plate.shape = PlateShape::Rectangle;
        config.plate.width = 80.0;
        config.plate.height = 40.0;
        config
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

    #[test]
    fn bare_plate_is_one_extrusion() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions::default();
        let plan = plan_build(&rect_plate(), &FontLibrary::default(), &options).unwrap();
        let (body, diagnostics) = compose(&mut kernel, &plan, &options, &CancellationToken::new()).unwrap();
        assert_relative_eq!(kernel.volume(&body).unwrap(), 80.0 * 40.0 * 3.0, epsilon = 1e-6);
        assert!(diagnostics.steps.is_empty());
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn raised_feature_over_a_hole_is_trimmed() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions::default();
        let mut config = rect_plate();
        config.mount.kind = MountKind::ScrewHoles;
        config.mount.counterbore = false;
        config.mount.positions = vec![[0.0, 0.0]];
        let mut plan = plan_build(&config, &FontLibrary::default(), &options).unwrap();
        plan.additive.push(FeatureSolid::new(
            FeatureLabel::new("pad"),
            FeatureRole::Additive,
            Extent::Raised { height: 1.0 },
            vec![square(0.0, 0.0, 20.0)],
        ));

        let (body, diagnostics) = compose(&mut kernel, &plan, &options, &CancellationToken::new()).unwrap();
        for z in [0.5, 2.5, 3.5] {
            assert!(!kernel.contains_point(&body, [0.0, 0.0, z]).unwrap(), "material at z={}", z);
        }
        assert!(kernel.contains_point(&body, [5.0, 0.0, 3.5]).unwrap());
        let labels: Vec<&str> = diagnostics.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["mount screw_hole[0]", "pad"]);
        // The keep-out solid is released at the end.
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn swallowed_feature_warns() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions::default();
        let mut config = rect_plate();
        config.mount.kind = MountKind::ScrewHoles;
        config.mount.counterbore = false;
        config.mount.hole_diameter = 6.0;
        config.mount.positions = vec![[0.0, 0.0]];
        let mut plan = plan_build(&config, &FontLibrary::default(), &options).unwrap();
        plan.additive.push(FeatureSolid::new(
            FeatureLabel::new("dot"),
            FeatureRole::Additive,
            Extent::Raised { height: 1.0 },
            vec![square(0.0, 0.0, 2.0)],
        ));

        let (_, diagnostics) = compose(&mut kernel, &plan, &options, &CancellationToken::new()).unwrap();
        assert_eq!(diagnostics.steps.len(), 1);
        assert_eq!(diagnostics.warnings, vec!["dot: swallowed by mount keep-out".to_string()]);
        assert!(diagnostics.is_complete());
    }

    #[test]
    fn emptying_cut_is_a_composition_error() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions::default();
        let mut plan = plan_build(&rect_plate(), &FontLibrary::default(), &options).unwrap();
        plan.subtractive.push(FeatureSolid::new(
            FeatureLabel::new("everything"),
            FeatureRole::Subtractive,
            Extent::Through,
            vec![square(0.0, 0.0, 200.0)],
        ));

        let err = compose(&mut kernel, &plan, &options, &CancellationToken::new()).unwrap_err();
        match err {
            BuildError::Composition(CompositionError::EmptyResult { label, kind }) => {
                assert_eq!(label.as_str(), "everything");
                assert_eq!(kind, BooleanKind::Subtract);
            }
            other => panic!("unexpected error {:?}", other),
        }

        let partial = BuildOptions {
            partial: true,
            ..Default::default()
        };
        let (body, diagnostics) = compose(&mut kernel, &plan, &partial, &CancellationToken::new()).unwrap();
        assert_relative_eq!(kernel.volume(&body).unwrap(), 9600.0, epsilon = 1e-6);
        assert_eq!(diagnostics.failures.len(), 1);
        assert_eq!(diagnostics.failures[0].label.as_str(), "everything");
    }

    #[test]
    fn failed_step_releases_every_solid() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions::default();
        let mut config = rect_plate();
        config.mount.kind = MountKind::ScrewHoles;
        config.mount.counterbore = false;
        config.mount.positions = vec![[-30.0, 10.0]];
        let mut plan = plan_build(&config, &FontLibrary::default(), &options).unwrap();
        plan.subtractive.push(FeatureSolid::new(
            FeatureLabel::new("everything"),
            FeatureRole::Subtractive,
            Extent::Through,
            vec![square(0.0, 0.0, 200.0)],
        ));

        // The screw hole is cut first, so both the body and the keep-out
        // are live when the emptying cut fails.
        let err = compose(&mut kernel, &plan, &options, &CancellationToken::new()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Composition(CompositionError::EmptyResult { .. })
        ));
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn cancelled_token_stops_before_the_base() {
        let mut kernel = SlabKernel::new();
        let options = BuildOptions {
            partial: true,
            ..Default::default()
        };
        let plan = plan_build(&rect_plate(), &FontLibrary::default(), &options).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = compose(&mut kernel, &plan, &options, &cancel).unwrap_err();
        assert!(matches!(err, BuildError::Cancelled));
        assert_eq!(kernel.live_solids(), 0);
    }
}
