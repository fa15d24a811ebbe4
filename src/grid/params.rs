//! Graticule types and their rendering parameters.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GraticuleError;

/// Style tag of a renderable. One per resolution band of each grid system;
/// the UPS layer shares the UTM metric types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraticuleType {
    LatLon10Deg,
    LatLon1Deg,
    LatLon0_1Deg,
    LatLon0_01Deg,
    LatLon0_001Deg,
    LatLon0_0001Deg,
    Gars10Deg,
    Gars30Min,
    Gars15Min,
    Gars5Min,
    GarsFine,
    UtmZone,
    Utm100Km,
    Utm10Km,
    Utm1Km,
    Utm100M,
    Utm10M,
    Utm1M,
    MgrsOverview,
    MgrsGridZone,
    Mgrs100Km,
    Mgrs10Km,
    Mgrs1Km,
    Mgrs100M,
    Mgrs10M,
    Mgrs1M,
}

/// Which metric type table a projected layer draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Utm,
    Mgrs,
}

use GraticuleType::*;

impl GraticuleType {
    pub const ALL: [GraticuleType; 26] = [
        LatLon10Deg, LatLon1Deg, LatLon0_1Deg, LatLon0_01Deg, LatLon0_001Deg, LatLon0_0001Deg,
        Gars10Deg, Gars30Min, Gars15Min, Gars5Min, GarsFine,
        UtmZone, Utm100Km, Utm10Km, Utm1Km, Utm100M, Utm10M, Utm1M,
        MgrsOverview, MgrsGridZone, Mgrs100Km, Mgrs10Km, Mgrs1Km, Mgrs100M, Mgrs10M, Mgrs1M,
    ];

    /// LatLon types, coarse to fine.
    pub const LAT_LON: [GraticuleType; 6] = [
        LatLon10Deg, LatLon1Deg, LatLon0_1Deg, LatLon0_01Deg, LatLon0_001Deg, LatLon0_0001Deg,
    ];

    pub const GARS: [GraticuleType; 5] = [Gars10Deg, Gars30Min, Gars15Min, Gars5Min, GarsFine];

    pub const UTM: [GraticuleType; 7] = [UtmZone, Utm100Km, Utm10Km, Utm1Km, Utm100M, Utm10M, Utm1M];

    pub const MGRS: [GraticuleType; 8] = [
        MgrsOverview, MgrsGridZone, Mgrs100Km, Mgrs10Km, Mgrs1Km, Mgrs100M, Mgrs10M, Mgrs1M,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LatLon10Deg => "latlon_10deg",
            LatLon1Deg => "latlon_1deg",
            LatLon0_1Deg => "latlon_0_1deg",
            LatLon0_01Deg => "latlon_0_01deg",
            LatLon0_001Deg => "latlon_0_001deg",
            LatLon0_0001Deg => "latlon_0_0001deg",
            Gars10Deg => "gars_10deg",
            Gars30Min => "gars_30min",
            Gars15Min => "gars_15min",
            Gars5Min => "gars_5min",
            GarsFine => "gars_fine",
            UtmZone => "utm_zone",
            Utm100Km => "utm_100km",
            Utm10Km => "utm_10km",
            Utm1Km => "utm_1km",
            Utm100M => "utm_100m",
            Utm10M => "utm_10m",
            Utm1M => "utm_1m",
            MgrsOverview => "mgrs_overview",
            MgrsGridZone => "mgrs_grid_zone",
            Mgrs100Km => "mgrs_100km",
            Mgrs10Km => "mgrs_10km",
            Mgrs1Km => "mgrs_1km",
            Mgrs100M => "mgrs_100m",
            Mgrs10M => "mgrs_10m",
            Mgrs1M => "mgrs_1m",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// LatLon type for a tile level (0 = 10°).
    pub fn lat_lon_level(level: usize) -> Option<Self> {
        Self::LAT_LON.get(level).copied()
    }

    /// Metric type for a line spacing in meters (1..=100 000).
    pub fn metric(family: MetricFamily, spacing: f64) -> Option<Self> {
        let table: &[GraticuleType] = match family {
            MetricFamily::Utm => &Self::UTM[1..],
            MetricFamily::Mgrs => &Self::MGRS[2..],
        };
        let index = 5 - spacing.log10().round() as i64;
        usize::try_from(index).ok().and_then(|i| table.get(i).copied())
    }
}

impl fmt::Display for GraticuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RGB color written as `#rrggbb` in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = GraticuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| GraticuleError::InvalidConfig(format!("color {s:?} is not #rrggbb")))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| GraticuleError::InvalidConfig(format!("color {s:?} is not #rrggbb")))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = GraticuleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderingParams {
    pub draw_lines: bool,
    pub line_color: Color,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub draw_labels: bool,
    pub label_color: Color,
    pub label_font: String,
    pub label_size: f64,
}

impl RenderingParams {
    pub fn new(line_color: Color, line_width: f64, label_size: f64) -> Self {
        Self {
            draw_lines: true,
            line_color,
            line_width,
            line_style: LineStyle::Solid,
            draw_labels: true,
            label_color: line_color,
            label_font: "Arial".to_string(),
            label_size,
        }
    }

    /// Overlay every field the override sets.
    pub fn apply(&mut self, o: &StyleOverride) {
        if let Some(v) = o.draw_lines {
            self.draw_lines = v;
        }
        if let Some(v) = o.line_color {
            self.line_color = v;
        }
        if let Some(v) = o.line_width {
            self.line_width = v;
        }
        if let Some(v) = o.line_style {
            self.line_style = v;
        }
        if let Some(v) = o.draw_labels {
            self.draw_labels = v;
        }
        if let Some(v) = o.label_color {
            self.label_color = v;
        }
        if let Some(v) = &o.label_font {
            self.label_font.clone_from(v);
        }
        if let Some(v) = o.label_size {
            self.label_size = v;
        }
    }
}

/// Partial [`RenderingParams`], as read from `[styles.<type>]` tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverride {
    pub draw_lines: Option<bool>,
    pub line_color: Option<Color>,
    pub line_width: Option<f64>,
    pub line_style: Option<LineStyle>,
    pub draw_labels: Option<bool>,
    pub label_color: Option<Color>,
    pub label_font: Option<String>,
    pub label_size: Option<f64>,
}

/// Per-type parameter bundles, created on first reference from the grid
/// system's defaults and then overlaid with the shared override and the
/// per-type override.
pub struct StyleRegistry {
    defaults: fn(GraticuleType) -> RenderingParams,
    shared: Option<StyleOverride>,
    overrides: HashMap<GraticuleType, StyleOverride>,
    params: HashMap<GraticuleType, RenderingParams>,
}

impl StyleRegistry {
    pub fn new(defaults: fn(GraticuleType) -> RenderingParams) -> Self {
        Self {
            defaults,
            shared: None,
            overrides: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// Shared bundle for every type. Bundles already created take it too,
    /// with their per-type override reapplied on top.
    pub fn set_shared_override(&mut self, shared: StyleOverride) {
        for (ty, p) in self.params.iter_mut() {
            p.apply(&shared);
            if let Some(o) = self.overrides.get(ty) {
                p.apply(o);
            }
        }
        self.shared = Some(shared);
    }

    /// Load `[styles]` tables keyed by type name. Unknown names are skipped.
    pub fn load_overrides<'a>(&mut self, styles: impl IntoIterator<Item = (&'a String, &'a StyleOverride)>) {
        for (name, o) in styles {
            match GraticuleType::from_name(name) {
                Some(ty) => {
                    if let Some(p) = self.params.get_mut(&ty) {
                        p.apply(o);
                    }
                    self.overrides.insert(ty, o.clone());
                }
                None => warn!(name = %name, "ignoring style for unknown graticule type"),
            }
        }
    }

    pub fn get(&mut self, ty: GraticuleType) -> &RenderingParams {
        self.get_mut(ty)
    }

    /// Parameters already created for `ty`, without creating them.
    pub fn peek(&self, ty: GraticuleType) -> Option<&RenderingParams> {
        self.params.get(&ty)
    }

    pub fn get_mut(&mut self, ty: GraticuleType) -> &mut RenderingParams {
        let defaults = self.defaults;
        let shared = self.shared.as_ref();
        let overrides = &self.overrides;
        self.params.entry(ty).or_insert_with(|| {
            let mut p = defaults(ty);
            if let Some(s) = shared {
                p.apply(s);
            }
            if let Some(o) = overrides.get(&ty) {
                p.apply(o);
            }
            p
        })
    }

    pub fn set_draw_lines(&mut self, ty: GraticuleType, on: bool) {
        self.get_mut(ty).draw_lines = on;
    }

    pub fn set_line_color(&mut self, ty: GraticuleType, color: Color) {
        self.get_mut(ty).line_color = color;
    }

    pub fn set_line_width(&mut self, ty: GraticuleType, width: f64) {
        self.get_mut(ty).line_width = width;
    }

    pub fn set_line_style(&mut self, ty: GraticuleType, style: LineStyle) {
        self.get_mut(ty).line_style = style;
    }

    pub fn set_draw_labels(&mut self, ty: GraticuleType, on: bool) {
        self.get_mut(ty).draw_labels = on;
    }

    pub fn set_label_color(&mut self, ty: GraticuleType, color: Color) {
        self.get_mut(ty).label_color = color;
    }

    pub fn set_label_font(&mut self, ty: GraticuleType, font: impl Into<String>) {
        self.get_mut(ty).label_font = font.into();
    }

    pub fn set_label_size(&mut self, ty: GraticuleType, size: f64) {
        self.get_mut(ty).label_size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(_ty: GraticuleType) -> RenderingParams {
        RenderingParams::new(Color::WHITE, 1.0, 12.0)
    }

    #[test]
    fn names_round_trip() {
        for ty in GraticuleType::ALL {
            assert_eq!(GraticuleType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(GraticuleType::from_name("nope"), None);
    }

    #[test]
    fn metric_types_by_spacing() {
        assert_eq!(GraticuleType::metric(MetricFamily::Utm, 100_000.0), Some(Utm100Km));
        assert_eq!(GraticuleType::metric(MetricFamily::Utm, 1.0), Some(Utm1M));
        assert_eq!(GraticuleType::metric(MetricFamily::Mgrs, 10_000.0), Some(Mgrs10Km));
        assert_eq!(GraticuleType::metric(MetricFamily::Mgrs, 0.1), None);
        assert_eq!(GraticuleType::metric(MetricFamily::Utm, 1_000_000.0), None);
    }

    #[test]
    fn color_parsing() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
        assert!("ff8000".parse::<Color>().is_err());
        assert!("#ff80".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert_eq!(Color::rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn registry_layers_overrides() {
        let mut reg = StyleRegistry::new(defaults);
        reg.set_shared_override(StyleOverride {
            label_size: Some(20.0),
            ..Default::default()
        });
        let styles: HashMap<String, StyleOverride> = [(
            "utm_1km".to_string(),
            StyleOverride {
                draw_labels: Some(false),
                ..Default::default()
            },
        )]
        .into_iter()
        .collect();
        reg.load_overrides(&styles);

        let p = reg.get(Utm1Km).clone();
        assert_eq!(p.label_size, 20.0);
        assert!(!p.draw_labels);
        assert!(reg.get(Utm10Km).draw_labels);

        reg.set_line_width(Utm1Km, 3.0);
        assert_eq!(reg.get(Utm1Km).line_width, 3.0);
    }

    #[test]
    fn shared_override_reaches_existing_bundles() {
        let mut reg = StyleRegistry::new(defaults);
        let styles: HashMap<String, StyleOverride> = [(
            "utm_1km".to_string(),
            StyleOverride {
                line_width: Some(4.0),
                ..Default::default()
            },
        )]
        .into_iter()
        .collect();
        reg.load_overrides(&styles);
        reg.get(Utm1Km);
        reg.get(Utm10Km);

        reg.set_shared_override(StyleOverride {
            line_width: Some(2.0),
            label_size: Some(20.0),
            ..Default::default()
        });
        assert_eq!(reg.get(Utm10Km).line_width, 2.0);
        assert_eq!(reg.get(Utm10Km).label_size, 20.0);
        // The per-type override still wins.
        assert_eq!(reg.get(Utm1Km).line_width, 4.0);
        assert_eq!(reg.get(Utm1Km).label_size, 20.0);
        assert_eq!(reg.get(Utm100M).line_width, 2.0);
    }
}
