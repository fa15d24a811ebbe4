use serde::{Deserialize, Serialize};

use crate::error::{GraticuleError, Result};
use crate::grid::labels::AngleFormat;

/// Camera altitudes (meters) at or below which each GARS band is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GarsThresholds {
    pub thirty_minute: f64,
    pub fifteen_minute: f64,
    pub five_minute: f64,
}

impl Default for GarsThresholds {
    fn default() -> Self {
        Self {
            thirty_minute: 1_200_000.0,
            fifteen_minute: 600_000.0,
            five_minute: 180_000.0,
        }
    }
}

/// Screen-space placement of metric ruler labels relative to the look-at
/// point, as fractions of the viewport size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleLabelOffset {
    pub x: f64,
    pub y: f64,
}

impl Default for ScaleLabelOffset {
    fn default() -> Self {
        Self { x: -0.25, y: -0.4 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraticuleConfig {
    /// Smallest on-screen cell, in pixels, worth subdividing into.
    pub min_cell_size_pixels: f64,
    pub angle_format: AngleFormat,
    pub gars_thresholds: GarsThresholds,
    /// Above this camera altitude MGRS draws the zone overview instead of
    /// grid zones.
    pub mgrs_zone_max_altitude: f64,
    /// Finest metric line spacing in meters; a power of ten.
    pub max_resolution: f64,
    pub scale_label_offset: ScaleLabelOffset,
}

impl Default for GraticuleConfig {
    fn default() -> Self {
        Self {
            min_cell_size_pixels: 40.0,
            angle_format: AngleFormat::Dd,
            gars_thresholds: GarsThresholds::default(),
            mgrs_zone_max_altitude: 5_000_000.0,
            max_resolution: 1.0,
            scale_label_offset: ScaleLabelOffset::default(),
        }
    }
}

impl GraticuleConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_cell_size_pixels.is_finite() && self.min_cell_size_pixels > 0.0) {
            return Err(GraticuleError::InvalidConfig(format!(
                "min_cell_size_pixels must be positive, got {}",
                self.min_cell_size_pixels
            )));
        }
        let t = &self.gars_thresholds;
        if !(t.thirty_minute > t.fifteen_minute && t.fifteen_minute > t.five_minute && t.five_minute > 0.0) {
            return Err(GraticuleError::InvalidConfig(format!(
                "gars thresholds must decrease from 30' to 5' and stay positive, got {} / {} / {}",
                t.thirty_minute, t.fifteen_minute, t.five_minute
            )));
        }
        if !(self.mgrs_zone_max_altitude.is_finite() && self.mgrs_zone_max_altitude > 0.0) {
            return Err(GraticuleError::InvalidConfig(format!(
                "mgrs_zone_max_altitude must be positive, got {}",
                self.mgrs_zone_max_altitude
            )));
        }
        let exp = self.max_resolution.log10();
        if !(1.0..=100_000.0).contains(&self.max_resolution) || (exp - exp.round()).abs() > 1e-9 {
            return Err(GraticuleError::InvalidConfig(format!(
                "max_resolution must be a power of ten between 1 and 100000, got {}",
                self.max_resolution
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GraticuleConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            GraticuleConfig { min_cell_size_pixels: 0.0, ..Default::default() },
            GraticuleConfig { max_resolution: 50.0, ..Default::default() },
            GraticuleConfig { max_resolution: 0.1, ..Default::default() },
            GraticuleConfig {
                gars_thresholds: GarsThresholds { thirty_minute: 100.0, ..Default::default() },
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(GraticuleError::InvalidConfig(_))), "{cfg:?}");
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: GraticuleConfig = toml::from_str(
            r#"
            angle_format = "dms"
            [gars_thresholds]
            five_minute = 100000.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.angle_format, AngleFormat::Dms);
        assert_eq!(cfg.gars_thresholds.five_minute, 100_000.0);
        assert_eq!(cfg.gars_thresholds.thirty_minute, 1_200_000.0);
        assert_eq!(cfg.min_cell_size_pixels, 40.0);
    }
}
