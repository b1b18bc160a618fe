//! The nameplate composition engine.
//!
//! Turns a [`NameplateConfig`] into one finished solid by running a fixed
//! sequence of extrusions and booleans, and caches finished results by a
//! hash of their inputs.

pub mod cache;
pub mod cancel;
pub mod pipeline;
pub mod plan;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use plate_kernel::{KernelBundle, SlabKernel, TruckKernel};
use plate_types::{BuildOptions, GlyphSource, NameplateConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub use crate::cache::{CacheKey, ResultCache, DEFAULT_CACHE_CAPACITY};
pub use crate::cancel::CancellationToken;
pub use crate::pipeline::compose;
pub use crate::plan::{plan_build, BuildPlan};
pub use crate::types::*;

/// Which solid kernel a build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelChoice {
    /// Exact 2.5D slabs. Robust on the coplanar faces nameplates are made of.
    #[default]
    Slab,
    /// BREP solids with STEP export.
    Truck,
}

impl KernelChoice {
    /// A fresh kernel session. Every build owns its own.
    pub fn new_session(self) -> Box<dyn KernelBundle> {
        match self {
            KernelChoice::Slab => Box::new(SlabKernel::new()),
            KernelChoice::Truck => Box::new(TruckKernel::new()),
        }
    }
}

/// Build one nameplate on the kernel session `kb`.
///
/// Checks `cancel` between pipeline steps. The returned solid is detached
/// from `kb`, which holds no solids of this build afterwards.
#[instrument(skip_all, fields(lines = config.text.lines.len(), artwork = config.artwork.len(), mount = ?config.mount.kind))]
pub fn build_nameplate(
    kb: &mut dyn KernelBundle,
    config: &NameplateConfig,
    glyphs: &dyn GlyphSource,
    options: &BuildOptions,
    cancel: &CancellationToken,
) -> Result<NameplateResult, BuildError> {
    let start = Instant::now();
    cancel.check()?;
    let plan = plan_build(config, glyphs, options)?;
    info!(features = plan.feature_count(), partial = options.partial, "building nameplate");

    let (handle, diagnostics) = compose(kb, &plan, options, cancel)?;
    let detached = kb.detach(&handle);
    kb.release(&handle);
    let solid = detached.map_err(|e| BuildError::from_op(&plan.base.label, e.into()))?;
    let bounding_box = solid.bounding_box().ok_or_else(|| CompositionError::EmptyResult {
        label: plan.base.label.clone(),
        kind: modeling_ops::BooleanKind::Union,
    })?;
    let volume = solid.volume();

    info!(
        volume,
        steps = diagnostics.steps.len(),
        failures = diagnostics.failures.len(),
        warnings = diagnostics.warnings.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "nameplate built"
    );
    Ok(NameplateResult {
        solid,
        bounding_box,
        volume,
        plate: plan.plate,
        build_id: Uuid::new_v4(),
        diagnostics,
    })
}

/// Builds nameplates and caches the results.
///
/// Safe to share between threads. Each build runs on its own kernel
/// session; only the cache is shared.
#[derive(Debug, Default)]
pub struct Engine {
    cache: ResultCache,
    kernel: KernelChoice,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kernel(kernel: KernelChoice) -> Self {
        Self {
            cache: ResultCache::new(),
            kernel,
        }
    }

    /// Keep at most `capacity` finished results. Zero turns caching off.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ResultCache::with_capacity(capacity);
        self
    }

    pub fn kernel(&self) -> KernelChoice {
        self.kernel
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_key(
        &self,
        config: &NameplateConfig,
        glyphs: &dyn GlyphSource,
        options: &BuildOptions,
    ) -> Result<CacheKey, BuildError> {
        Ok(CacheKey::compute(config, options, glyphs.fingerprint(), self.kernel)?)
    }

    /// Build `config`, or return the cached result of an identical build.
    pub fn build(
        &self,
        config: &NameplateConfig,
        glyphs: &dyn GlyphSource,
        options: &BuildOptions,
    ) -> Result<Arc<NameplateResult>, BuildError> {
        self.build_cancellable(config, glyphs, options, &CancellationToken::new())
    }

    /// Like [`Engine::build`], stopping with [`BuildError::Cancelled`] at the
    /// next step boundary once `cancel` is set. Failed and cancelled builds
    /// are never cached.
    pub fn build_cancellable(
        &self,
        config: &NameplateConfig,
        glyphs: &dyn GlyphSource,
        options: &BuildOptions,
        cancel: &CancellationToken,
    ) -> Result<Arc<NameplateResult>, BuildError> {
        let key = self.cache_key(config, glyphs, options)?;
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }
        let mut session = self.kernel.new_session();
        let result = Arc::new(build_nameplate(session.as_mut(), config, glyphs, options, cancel)?);
        self.cache.put(key, Arc::clone(&result));
        Ok(result)
    }
}
