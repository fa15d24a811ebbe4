use crate::sector::Sector;

/// Terrain heights in meters. `timestamp` changes whenever the model's data
/// changes so cached tile extents can be refreshed.
pub trait ElevationModel {
    /// Lowest and highest height inside the sector.
    fn min_max(&self, sector: &Sector) -> (f64, f64);

    fn height_at(&self, lat: f64, lon: f64) -> f64;

    fn timestamp(&self) -> u64;
}

/// Terrain at a constant height everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
    pub height: f64,
    pub timestamp: u64,
}

impl FlatTerrain {
    pub fn new(height: f64) -> Self {
        Self { height, timestamp: 0 }
    }

    /// Move the whole surface, bumping the timestamp.
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.timestamp += 1;
    }
}

impl ElevationModel for FlatTerrain {
    fn min_max(&self, _sector: &Sector) -> (f64, f64) {
        (self.height, self.height)
    }

    fn height_at(&self, _lat: f64, _lon: f64) -> f64 {
        self.height
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
