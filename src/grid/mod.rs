//! The adaptive graticule engine: tiles, passes and per-system strategies.

pub mod clip;
pub mod config;
pub mod element;
pub mod frame;
pub mod labels;
pub mod layer;
pub mod output;
pub mod params;
pub mod scale;
pub mod systems;
pub mod tile;
pub mod tiles_support;
pub mod trigger;

pub use config::{GarsThresholds, GraticuleConfig, ScaleLabelOffset};
pub use frame::DrawContext;
pub use labels::AngleFormat;
pub use layer::{GraticuleLayer, GridSystem};
pub use params::{Color, GraticuleType, RenderingParams, StyleOverride};
pub use systems::{GarsGrid, LatLonGrid, MgrsGrid, UpsGrid, UtmGrid};

pub type LatLonLayer = GraticuleLayer<LatLonGrid>;
pub type GarsLayer = GraticuleLayer<GarsGrid>;
pub type UtmLayer = GraticuleLayer<UtmGrid>;
pub type UpsLayer = GraticuleLayer<UpsGrid>;
pub type MgrsLayer = GraticuleLayer<MgrsGrid>;
