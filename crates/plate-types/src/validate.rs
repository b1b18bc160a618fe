//! Structural validation of a [`NameplateConfig`].
//!
//! Checks here need no geometry: signs, ranges, and combinations that cannot
//! possibly produce a plate. Glyph availability is checked during text layout,
//! where the glyph source is known.

use crate::config::*;
use crate::error::ConfigurationError;

pub const LETTER_SPACING_MIN: f64 = -50.0;
pub const LETTER_SPACING_MAX: f64 = 100.0;

/// Thinnest floor a back pocket may leave under the top surface.
pub const MIN_POCKET_FLOOR: f64 = 0.5;

fn positive(field: &str, value: f64) -> Result<(), ConfigurationError> {
    // NaN fails this check too.
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::not_positive(field, value))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::OutOfRange {
            field: field.into(),
            value,
            min: 0.0,
            max: f64::INFINITY,
        })
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::Unsupported {
            field: field.into(),
            value: value.to_string(),
        })
    }
}

impl NameplateConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.plate.validate()?;
        self.border.validate(&self.plate)?;
        self.text.validate(&self.plate)?;
        self.mount.validate(&self.plate)?;
        for (i, element) in self.artwork.iter().enumerate() {
            element.validate(&format!("artwork[{}]", i), &self.plate)?;
        }
        Ok(())
    }
}

impl PlateConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.auto_width {
            positive("plate.width", self.width)?;
        }
        if !self.auto_height {
            positive("plate.height", self.height)?;
        }
        positive("plate.thickness", self.thickness)?;
        non_negative("plate.corner_radius", self.corner_radius)?;
        non_negative("plate.chamfer", self.chamfer)?;
        non_negative("plate.padding.top", self.padding.top)?;
        non_negative("plate.padding.bottom", self.padding.bottom)?;
        non_negative("plate.padding.left", self.padding.left)?;
        non_negative("plate.padding.right", self.padding.right)?;

        // Dimension-dependent checks only apply once the size is fixed.
        if self.auto_width || self.auto_height {
            return Ok(());
        }
        let short = self.width.min(self.height);
        match self.shape {
            PlateShape::Chamfered if self.chamfer * 2.0 >= short => {
                Err(ConfigurationError::contradictory(
                    "plate.chamfer",
                    format!("chamfer {} leaves no edge on a {} side", self.chamfer, short),
                ))
            }
            PlateShape::Hexagon if self.height / 2.0 * 30f64.to_radians().tan() * 2.0 >= self.width => {
                Err(ConfigurationError::contradictory(
                    "plate.width",
                    "hexagon too narrow for its height",
                ))
            }
            PlateShape::Sweep => {
                positive("plate.sweep_radius", self.sweep_radius)?;
                if self.sweep_radius <= self.height / 2.0 {
                    return Err(ConfigurationError::contradictory(
                        "plate.sweep_radius",
                        format!(
                            "sweep radius {} must exceed half the height {}",
                            self.sweep_radius,
                            self.height / 2.0
                        ),
                    ));
                }
                if self.width / self.sweep_radius >= std::f64::consts::TAU {
                    return Err(ConfigurationError::contradictory(
                        "plate.width",
                        "swept band would wrap past a full circle",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl BorderConfig {
    pub fn validate(&self, plate: &PlateConfig) -> Result<(), ConfigurationError> {
        if self.style == BorderStyle::None {
            return Ok(());
        }
        positive("border.width", self.width)?;
        positive("border.height", self.height)?;
        non_negative("border.offset", self.offset)?;
        non_negative("border.corner_radius", self.corner_radius)?;
        if self.style == BorderStyle::Inset && self.height >= plate.thickness {
            return Err(ConfigurationError::contradictory(
                "border.height",
                format!(
                    "inset depth {} would cut through a {} plate",
                    self.height, plate.thickness
                ),
            ));
        }
        let mut band = self.offset + self.width;
        if self.style == BorderStyle::Double {
            positive("border.double_gap", self.double_gap)?;
            positive("border.double_inner_width", self.double_inner_width)?;
            band += self.double_gap + self.double_inner_width;
        }
        if !(plate.auto_width || plate.auto_height) && band * 2.0 >= plate.width.min(plate.height) {
            return Err(ConfigurationError::contradictory(
                "border.width",
                "border does not fit inside the plate",
            ));
        }
        Ok(())
    }
}

impl TextBlock {
    pub fn validate(&self, plate: &PlateConfig) -> Result<(), ConfigurationError> {
        positive("text.line_spacing", self.line_spacing)?;
        finite("text.offset.x", self.offset[0])?;
        finite("text.offset.y", self.offset[1])?;
        for (i, line) in self.lines.iter().enumerate() {
            line.validate(&format!("text.lines[{}]", i), plate)?;
        }
        Ok(())
    }
}

impl TextLineConfig {
    pub fn validate(&self, field: &str, plate: &PlateConfig) -> Result<(), ConfigurationError> {
        positive(&format!("{}.size", field), self.size)?;
        positive(&format!("{}.depth", field), self.depth)?;
        finite(&format!("{}.rotation", field), self.rotation)?;
        if !(LETTER_SPACING_MIN..=LETTER_SPACING_MAX).contains(&self.letter_spacing) {
            return Err(ConfigurationError::OutOfRange {
                field: format!("{}.letter_spacing", field),
                value: self.letter_spacing,
                min: LETTER_SPACING_MIN,
                max: LETTER_SPACING_MAX,
            });
        }
        check_engrave_depth(field, self.style, self.depth, plate)
    }
}

impl ArtworkElement {
    pub fn validate(&self, field: &str, plate: &PlateConfig) -> Result<(), ConfigurationError> {
        positive(&format!("{}.scale", field), self.scale)?;
        positive(&format!("{}.target_size", field), self.target_size)?;
        positive(&format!("{}.depth", field), self.depth)?;
        finite(&format!("{}.rotation", field), self.rotation)?;
        if let ArtworkSource::Svg {
            view_box: Some(vb), ..
        } = &self.source
        {
            if !(vb[2] > 0.0 && vb[3] > 0.0) {
                return Err(ConfigurationError::Unsupported {
                    field: format!("{}.source.view_box", field),
                    value: format!("{:?}", vb),
                });
            }
        }
        check_engrave_depth(field, self.style, self.depth, plate)
    }
}

/// An engraving as deep as the plate is a cutout in disguise.
fn check_engrave_depth(
    field: &str,
    style: Style,
    depth: f64,
    plate: &PlateConfig,
) -> Result<(), ConfigurationError> {
    if style == Style::Engraved && depth >= plate.thickness {
        return Err(ConfigurationError::contradictory(
            format!("{}.depth", field),
            format!(
                "engrave depth {} reaches through a {} plate; use the cutout style",
                depth, plate.thickness
            ),
        ));
    }
    Ok(())
}

impl MountConfig {
    pub fn validate(&self, plate: &PlateConfig) -> Result<(), ConfigurationError> {
        for (i, p) in self.positions.iter().enumerate() {
            finite(&format!("mount.positions[{}].x", i), p[0])?;
            finite(&format!("mount.positions[{}].y", i), p[1])?;
        }
        match self.kind {
            MountKind::None => Ok(()),
            MountKind::ScrewHoles => {
                positive("mount.hole_diameter", self.hole_diameter)?;
                non_negative("mount.edge_distance", self.edge_distance)?;
                if self.counterbore {
                    positive("mount.counterbore_depth", self.counterbore_depth)?;
                    if self.counterbore_diameter <= self.hole_diameter {
                        return Err(ConfigurationError::contradictory(
                            "mount.counterbore_diameter",
                            "counterbore must be wider than the hole",
                        ));
                    }
                    if self.counterbore_depth >= plate.thickness {
                        return Err(ConfigurationError::contradictory(
                            "mount.counterbore_depth",
                            "counterbore reaches through the plate",
                        ));
                    }
                }
                Ok(())
            }
            MountKind::Keyhole => {
                positive("mount.keyhole_large_diameter", self.keyhole_large_diameter)?;
                positive("mount.keyhole_small_diameter", self.keyhole_small_diameter)?;
                positive("mount.keyhole_length", self.keyhole_length)?;
                if self.keyhole_small_diameter >= self.keyhole_large_diameter {
                    return Err(ConfigurationError::contradictory(
                        "mount.keyhole_small_diameter",
                        "slot must be narrower than the entry hole",
                    ));
                }
                Ok(())
            }
            MountKind::MagnetPocket => {
                positive("mount.magnet_diameter", self.magnet_diameter)?;
                positive("mount.magnet_height", self.magnet_height)?;
                non_negative("mount.magnet_tolerance", self.magnet_tolerance)?;
                if self.magnet_count != 2 && self.magnet_count != 4 {
                    return Err(ConfigurationError::OutOfRange {
                        field: "mount.magnet_count".into(),
                        value: f64::from(self.magnet_count),
                        min: 2.0,
                        max: 4.0,
                    });
                }
                if plate.thickness <= MIN_POCKET_FLOOR {
                    return Err(ConfigurationError::contradictory(
                        "plate.thickness",
                        "plate too thin for magnet pockets",
                    ));
                }
                Ok(())
            }
            MountKind::HangingHole => {
                positive("mount.hanging_diameter", self.hanging_diameter)?;
                non_negative("mount.hanging_slot_length", self.hanging_slot_length)
            }
            MountKind::DeskStand => {
                positive("mount.stand_depth", self.stand_depth)?;
                if !(self.stand_angle > 0.0 && self.stand_angle < 90.0) {
                    return Err(ConfigurationError::OutOfRange {
                        field: "mount.stand_angle".into(),
                        value: self.stand_angle,
                        min: 0.0,
                        max: 90.0,
                    });
                }
                if self.stand_steps == 0 {
                    return Err(ConfigurationError::not_positive("mount.stand_steps", 0.0));
                }
                if !(self.stand_width_ratio > 0.0 && self.stand_width_ratio <= 1.0) {
                    return Err(ConfigurationError::OutOfRange {
                        field: "mount.stand_width_ratio".into(),
                        value: self.stand_width_ratio,
                        min: 0.0,
                        max: 1.0,
                    });
                }
                Ok(())
            }
            MountKind::AdhesiveRecess => {
                positive("mount.recess_height", self.recess_height)?;
                positive("mount.recess_depth", self.recess_depth)?;
                if !(self.recess_width_ratio > 0.0 && self.recess_width_ratio < 1.0) {
                    return Err(ConfigurationError::OutOfRange {
                        field: "mount.recess_width_ratio".into(),
                        value: self.recess_width_ratio,
                        min: 0.0,
                        max: 1.0,
                    });
                }
                if self.recess_depth >= plate.thickness - MIN_POCKET_FLOOR {
                    return Err(ConfigurationError::contradictory(
                        "mount.recess_depth",
                        "recess leaves no floor under the top surface",
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(NameplateConfig::default().validate(), Ok(()));
    }

    #[test]
    fn negative_thickness_names_field() {
        let mut config = NameplateConfig::default();
        config.plate.thickness = -1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), "plate.thickness");
    }

    #[test]
    fn text_line_errors_carry_index() {
        let mut config = NameplateConfig::default();
        config.text.lines = vec![
            TextLineConfig {
                content: "OK".into(),
                ..Default::default()
            },
            TextLineConfig {
                content: "BAD".into(),
                depth: 0.0,
                ..Default::default()
            },
        ];
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), "text.lines[1].depth");
    }

    #[test]
    fn letter_spacing_range_is_inclusive() {
        let plate = PlateConfig::default();
        for spacing in [-50.0, 0.0, 100.0] {
            let line = TextLineConfig {
                letter_spacing: spacing,
                ..Default::default()
            };
            assert!(line.validate("l", &plate).is_ok());
        }
        for spacing in [-50.1, 100.5] {
            let line = TextLineConfig {
                letter_spacing: spacing,
                ..Default::default()
            };
            assert!(matches!(
                line.validate("l", &plate),
                Err(ConfigurationError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn engraving_through_plate_is_contradictory() {
        let plate = PlateConfig::default();
        let line = TextLineConfig {
            style: Style::Engraved,
            depth: plate.thickness,
            ..Default::default()
        };
        assert!(matches!(
            line.validate("text.lines[0]", &plate),
            Err(ConfigurationError::Contradictory { .. })
        ));
        // The same depth is fine for raised text.
        let raised = TextLineConfig {
            depth: plate.thickness,
            ..Default::default()
        };
        assert!(raised.validate("text.lines[0]", &plate).is_ok());
    }

    #[test]
    fn sweep_radius_must_clear_half_height() {
        let mut plate = PlateConfig {
            shape: PlateShape::Sweep,
            height: 30.0,
            sweep_radius: 15.0,
            ..Default::default()
        };
        assert!(plate.validate().is_err());
        plate.sweep_radius = 80.0;
        assert!(plate.validate().is_ok());
    }

    #[test]
    fn magnet_count_must_be_two_or_four() {
        let plate = PlateConfig::default();
        let mount = MountConfig {
            kind: MountKind::MagnetPocket,
            magnet_count: 3,
            ..Default::default()
        };
        assert_eq!(mount.validate(&plate).unwrap_err().field(), "mount.magnet_count");
    }

    #[test]
    fn oversized_border_is_rejected() {
        let plate = PlateConfig {
            height: 10.0,
            ..Default::default()
        };
        let border = BorderConfig {
            style: BorderStyle::Raised,
            width: 4.0,
            offset: 2.0,
            ..Default::default()
        };
        assert!(border.validate(&plate).is_err());
    }
}
