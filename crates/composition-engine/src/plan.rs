//! Turning a configuration into the ordered list of tool solids.
//!
//! Planning does all the 2D work (outlines, text layout, artwork placement,
//! mount cutters) before the kernel sees anything, so a bad configuration
//! fails without touching a solid.

use modeling_ops::{
    artwork_feature, artwork_label, border_features, fitted_size, layout_text, layout_text_partial, mount_cutters,
    plate_outline, stand_features, stand_floor, text_area, Extent, FeatureRole, FeatureSolid, MountSurface, PlateFrame,
    TextLayout,
};
use plate_types::{BuildOptions, ConfigurationError, FeatureLabel, GlyphSource, NameplateConfig, PlateConfig};
use tracing::{debug, warn};

use crate::types::{BuildError, FeatureFailure, PlateDims};

/// Every tool solid of one build, grouped by the pipeline stage that
/// consumes it. Within a group the order is declaration order.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub plate: PlateDims,
    pub frame: PlateFrame,
    pub base: FeatureSolid,
    /// Stand steps, then raised or double border rings.
    pub structural: Vec<FeatureSolid>,
    /// Mount cutters, inset border, engraved and cutout text, then artwork.
    pub subtractive: Vec<FeatureSolid>,
    /// Raised text, then raised artwork.
    pub additive: Vec<FeatureSolid>,
    /// Features dropped while planning a partial build.
    pub failures: Vec<FeatureFailure>,
}

impl BuildPlan {
    pub fn feature_count(&self) -> usize {
        1 + self.structural.len() + self.subtractive.len() + self.additive.len()
    }

    fn route(&mut self, feature: FeatureSolid) {
        match feature.role {
            FeatureRole::Structural => self.structural.push(feature),
            FeatureRole::Subtractive => self.subtractive.push(feature),
            FeatureRole::Additive => self.additive.push(feature),
        }
    }
}

/// Validate `config`, resolve auto sizing and generate every feature.
///
/// In partial mode a text line or artwork element that cannot be built is
/// recorded in [`BuildPlan::failures`] and left out. Configuration errors
/// always abort.
pub fn plan_build(
    config: &NameplateConfig,
    glyphs: &dyn GlyphSource,
    options: &BuildOptions,
) -> Result<BuildPlan, BuildError> {
    options.validate()?;
    config.validate()?;

    let mut failures = Vec::new();
    let text_feature = FeatureLabel::new("text");
    let layout = if options.partial {
        let (layout, errors) = layout_text_partial(&config.text, glyphs, options);
        for err in errors {
            let failure = FeatureFailure::from_op(&text_feature, err);
            warn!(label = %failure.label, error = %failure.message, "text line skipped");
            failures.push(failure);
        }
        layout
    } else {
        layout_text(&config.text, glyphs, options).map_err(|e| BuildError::from_op(&text_feature, e))?
    };

    let plate = resolve_plate(config, &layout)?;
    let dims = PlateDims {
        width: plate.width,
        height: plate.height,
        thickness: plate.thickness,
    };
    let frame = PlateFrame::new(plate.thickness).with_floor(stand_floor(&config.mount, plate.height));

    let base = FeatureSolid::new(
        FeatureLabel::new("plate"),
        FeatureRole::Structural,
        Extent::Span {
            bottom: frame.bottom,
            top: frame.top,
        },
        vec![plate_outline(&plate, options)],
    );

    let mut plan = BuildPlan {
        plate: dims,
        frame,
        base,
        structural: Vec::new(),
        subtractive: Vec::new(),
        additive: Vec::new(),
        failures,
    };

    for feature in stand_features(&config.mount, dims.width, dims.height, options) {
        plan.route(feature);
    }
    // Mount cutters come before the border so the inset frame lands after
    // them among the subtractions.
    let surface = MountSurface::for_plate(&plate, dims.width, dims.height);
    let cutters = mount_cutters(&config.mount, &surface, &frame, options);
    let borders = border_features(&config.border, dims.width, dims.height, options);
    for feature in cutters.into_iter().chain(borders) {
        plan.route(feature);
    }

    let area = text_area(dims.width, dims.height, &plate.padding);
    for feature in layout.features(&config.text, &area) {
        plan.route(feature);
    }

    for (index, element) in config.artwork.iter().enumerate() {
        match artwork_feature(index, element, options) {
            Ok(feature) => plan.route(feature),
            Err(err) if options.partial => {
                let failure = FeatureFailure::from_op(&artwork_label(index, element), err);
                warn!(label = %failure.label, error = %failure.message, "artwork skipped");
                plan.failures.push(failure);
            }
            Err(err) => return Err(BuildError::from_op(&artwork_label(index, element), err)),
        }
    }

    debug!(
        width = dims.width,
        height = dims.height,
        structural = plan.structural.len(),
        subtractive = plan.subtractive.len(),
        additive = plan.additive.len(),
        "planned build"
    );
    Ok(plan)
}

/// Fix the plate size, deriving auto dimensions from the text block, and
/// re-check everything that depends on it.
fn resolve_plate(config: &NameplateConfig, layout: &TextLayout) -> Result<PlateConfig, BuildError> {
    let mut plate = config.plate.clone();
    if !(plate.auto_width || plate.auto_height) {
        return Ok(plate);
    }
    let field = if plate.auto_width {
        "plate.auto_width"
    } else {
        "plate.auto_height"
    };
    let (width, height) = fitted_size(layout, &plate.padding)
        .ok_or_else(|| ConfigurationError::contradictory(field, "auto sizing needs at least one line of text"))?;
    if plate.auto_width {
        plate.width = width;
    }
    if plate.auto_height {
        plate.height = height;
    }
    plate.auto_width = false;
    plate.auto_height = false;

    let resolved = NameplateConfig {
        plate: plate.clone(),
        ..config.clone()
    };
    resolved.validate()?;
    debug!(width, height, "auto-sized plate");
    Ok(plate)
}
