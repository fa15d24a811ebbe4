//! Angle label text and per-rebuild label de-duplication.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleFormat {
    /// Decimal degrees
    #[default]
    Dd,
    /// Degrees and minutes
    Dm,
    /// Degrees, minutes and seconds
    Dms,
}

impl AngleFormat {
    pub fn next(self) -> Self {
        match self {
            AngleFormat::Dd => AngleFormat::Dm,
            AngleFormat::Dm => AngleFormat::Dms,
            AngleFormat::Dms => AngleFormat::Dd,
        }
    }

    /// Sexagesimal formats split degrees and minutes into sixths.
    pub fn is_sexagesimal(self) -> bool {
        !matches!(self, AngleFormat::Dd)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Whole degrees, whole minutes and seconds (rounded to hundredths) of
/// `|value|`. Rounding up to 60 carries into the next unit.
pub fn to_dms(value: f64) -> (u32, u32, f64) {
    let abs = value.abs();
    let mut deg = abs.floor();
    let minutes = (abs - deg) * 60.0;
    let mut min = minutes.floor();
    let mut sec = ((minutes - min) * 60.0 * 100.0).round() / 100.0;
    if sec >= 60.0 {
        sec -= 60.0;
        min += 1.0;
    }
    if min >= 60.0 {
        min -= 60.0;
        deg += 1.0;
    }
    (deg as u32, min as u32, sec)
}

fn hemisphere(value: f64, axis: Axis) -> &'static str {
    match axis {
        _ if value == 0.0 => "",
        Axis::Latitude if value > 0.0 => "N",
        Axis::Latitude => "S",
        Axis::Longitude if value > 0.0 => "E",
        Axis::Longitude => "W",
    }
}

/// Label text for a line at `value` degrees drawn with `resolution` degree
/// spacing. Precision follows the resolution.
pub fn format_angle(value: f64, resolution: f64, format: AngleFormat, axis: Axis) -> String {
    const EPS: f64 = 1e-9;
    let value = if value.abs() < EPS { 0.0 } else { value };
    let hemi = hemisphere(value, axis);
    let abs = value.abs();

    match format {
        AngleFormat::Dd => {
            let decimals = if resolution >= 1.0 - EPS {
                0
            } else {
                ((-resolution.log10()).round().max(0.0) as usize).min(4)
            };
            format!("{abs:.decimals$}°{hemi}")
        }
        _ if resolution >= 1.0 - EPS => format!("{}°{hemi}", abs.round() as u32),
        _ if resolution >= 1.0 / 60.0 - EPS => {
            let total = (abs * 60.0).round() as u32;
            format!("{}°{:02}′{hemi}", total / 60, total % 60)
        }
        AngleFormat::Dm => {
            let mut deg = abs.floor() as u32;
            let mut min = ((abs - abs.floor()) * 60.0 * 100.0).round() / 100.0;
            if min >= 60.0 {
                min -= 60.0;
                deg += 1;
            }
            format!("{deg}°{min:05.2}′{hemi}")
        }
        AngleFormat::Dms => {
            let (d, m, s) = to_dms(abs);
            if resolution >= 1.0 / 3600.0 - EPS {
                // Whole seconds; 59.995 and up already carried in to_dms.
                let mut s = s.round() as u32;
                let (mut m, mut d) = (m, d);
                if s == 60 {
                    s = 0;
                    m += 1;
                }
                if m == 60 {
                    m = 0;
                    d += 1;
                }
                format!("{d}°{m:02}′{s:02}″{hemi}")
            } else {
                format!("{d}°{m:02}′{s:05.2}″{hemi}")
            }
        }
    }
}

#[inline(always)]
fn key(value: f64) -> i64 {
    (value * 1e9).round() as i64
}

/// Latitudes and longitudes already labelled during the current rebuild.
#[derive(Debug, Default)]
pub struct LabelDedup {
    latitudes: HashSet<i64>,
    longitudes: HashSet<i64>,
}

impl LabelDedup {
    /// True the first time a value is offered for its axis.
    pub fn insert(&mut self, axis: Axis, value: f64) -> bool {
        match axis {
            Axis::Latitude => self.latitudes.insert(key(value)),
            Axis::Longitude => self.longitudes.insert(key(value)),
        }
    }

    pub fn clear(&mut self) {
        self.latitudes.clear();
        self.longitudes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_carries_rounded_seconds() {
        // 59.999 seconds rounds to 60.00 and carries into the minute.
        let v = 10.0 + 29.0 / 60.0 + 59.999 / 3600.0;
        assert_eq!(to_dms(v), (10, 30, 0.0));
        let v = 10.0 + 59.0 / 60.0 + 59.999 / 3600.0;
        assert_eq!(to_dms(v), (11, 0, 0.0));
    }

    #[test]
    fn decimal_precision_follows_resolution() {
        assert_eq!(format_angle(40.0, 10.0, AngleFormat::Dd, Axis::Latitude), "40°N");
        assert_eq!(format_angle(-3.0, 1.0, AngleFormat::Dd, Axis::Longitude), "3°W");
        assert_eq!(format_angle(12.3, 0.1, AngleFormat::Dd, Axis::Latitude), "12.3°N");
        assert_eq!(format_angle(12.3456, 0.0001, AngleFormat::Dd, Axis::Longitude), "12.3456°E");
        assert_eq!(format_angle(0.0, 1.0, AngleFormat::Dd, Axis::Latitude), "0°");
    }

    #[test]
    fn sexagesimal_labels() {
        assert_eq!(format_angle(45.5, 1.0 / 6.0, AngleFormat::Dm, Axis::Latitude), "45°30′N");
        assert_eq!(
            format_angle(-(45.0 + 30.0 / 60.0 + 10.0 / 3600.0), 10.0 / 3600.0, AngleFormat::Dms, Axis::Longitude),
            "45°30′10″W"
        );
        assert_eq!(
            format_angle(45.0 + 59.5 / 60.0, 0.001, AngleFormat::Dm, Axis::Latitude),
            "45°59.50′N"
        );
    }

    #[test]
    fn dedup_per_axis() {
        let mut d = LabelDedup::default();
        assert!(d.insert(Axis::Latitude, 10.0));
        assert!(!d.insert(Axis::Latitude, 10.0 + 1e-12));
        assert!(d.insert(Axis::Longitude, 10.0));
        d.clear();
        assert!(d.insert(Axis::Latitude, 10.0));
    }
}
