//! Adaptive graticule grids for a 3D globe view.
//!
//! A [`grid::GraticuleLayer`] re-selects, every time the camera moves far
//! enough, which grid lines and labels of one coordinate system are worth
//! drawing. Geometry goes through a [`shapes::ShapeFactory`]; the layer keeps
//! only handles and their style types.

pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod geo;
pub mod grid;
pub mod sector;
pub mod shapes;
pub mod view;

pub use error::{GraticuleError, Result};
