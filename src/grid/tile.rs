//! Grid tiles and the arena that owns them.

use std::collections::HashMap;

use tracing::trace;

use crate::coords::ZoneId;
use crate::geo::{self, LatLon};
use crate::grid::element::GridElement;
use crate::grid::frame::FrameState;
use crate::sector::Sector;
use crate::shapes::ShapeFactory;
use crate::view::{BoundingSphere, ElevationModel};

/// A projected root tile: a UTM zone or UPS cap, or an MGRS grid zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootKey {
    Zone(ZoneId),
    /// MGRS grid zone; `band` indexes the C..X latitude bands.
    GridZone { zone: u8, band: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridKey {
    /// Row/column cell at the tile's level, counted from the south-west.
    Cell { row: u32, col: u32 },
    Overview,
    Root(RootKey),
    /// Metric square, by the easting/northing of its south-west corner.
    Square { root: RootKey, easting: i64, northing: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub grid: GridKey,
    pub level: u8,
}

impl TileKey {
    pub const fn new(grid: GridKey, level: u8) -> Self {
        Self { grid, level }
    }
}

#[derive(Clone, Copy, Debug)]
struct CachedExtent {
    timestamp: u64,
    exaggeration: f64,
    sphere: BoundingSphere,
}

/// Recursive spatial node. `elements` is `None` while collapsed.
#[derive(Debug)]
pub struct GridTile<D> {
    pub sector: Sector,
    pub divisions: u32,
    pub level: u8,
    /// Characteristic size in meters.
    pub size: f64,
    pub desc: D,
    pub elements: Option<Vec<GridElement>>,
    pub children: Option<Vec<TileKey>>,
    extent: Option<CachedExtent>,
}

impl<D> GridTile<D> {
    pub fn new(sector: Sector, divisions: u32, level: u8, size: f64, desc: D) -> Self {
        Self {
            sector,
            divisions,
            level,
            size,
            desc,
            elements: None,
            children: None,
            extent: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.elements.is_some()
    }

    /// Bounding sphere of the sector between its terrain extremes,
    /// recomputed only when terrain or exaggeration changed.
    pub fn extent(&mut self, frame: &FrameState, elevation: &dyn ElevationModel) -> BoundingSphere {
        if let Some(cached) = self.extent {
            if cached.timestamp == frame.elevation_timestamp
                && cached.exaggeration == frame.vertical_exaggeration
            {
                return cached.sphere;
            }
        }
        let sphere = compute_extent(&self.sector, frame, elevation);
        self.extent = Some(CachedExtent {
            timestamp: frame.elevation_timestamp,
            exaggeration: frame.vertical_exaggeration,
            sphere,
        });
        sphere
    }

    pub fn is_in_view(&mut self, frame: &FrameState, elevation: &dyn ElevationModel) -> bool {
        if self.sector.is_empty() || !frame.visible.intersects(&self.sector) {
            return false;
        }
        let sphere = self.extent(frame, elevation);
        frame.view.frustum.intersects_sphere(&sphere)
    }

    pub fn size_in_pixels(&self, frame: &FrameState) -> f64 {
        frame.size_in_pixels(self.size, self.sector.centroid())
    }
}

fn compute_extent(sector: &Sector, frame: &FrameState, elevation: &dyn ElevationModel) -> BoundingSphere {
    let radius = frame.view.radius;
    let (min_h, max_h) = elevation.min_max(sector);
    let min_h = min_h * frame.vertical_exaggeration;
    let max_h = max_h * frame.vertical_exaggeration;

    if sector.delta_lon >= 180.0 || sector.delta_lat >= 90.0 {
        return BoundingSphere {
            center: glam::DVec3::ZERO,
            radius: radius + max_h.max(0.0),
        };
    }

    let c = sector.centroid();
    let center = geo::surface_point(c.lat, c.lon, (min_h + max_h) / 2.0, radius);
    let mut samples = Vec::with_capacity(18);
    for i in 0..3 {
        for j in 0..3 {
            let lat = sector.min_lat + sector.delta_lat * i as f64 / 2.0;
            let lon = sector.min_lon + sector.delta_lon * j as f64 / 2.0;
            samples.push(geo::surface_point(lat, lon, min_h, radius));
            samples.push(geo::surface_point(lat, lon, max_h, radius));
        }
    }
    let sphere = BoundingSphere::around(center, samples);

    // The surface bulges between samples; pad by the sagitta of the diagonal.
    let diagonal = LatLon::new(sector.min_lat, sector.min_lon)
        .angular_distance(LatLon::new(sector.max_lat(), sector.max_lon()));
    let sagitta = (radius + max_h) * (1.0 - (diagonal / 2.0).cos());
    BoundingSphere {
        center: sphere.center,
        radius: sphere.radius + sagitta,
    }
}

/// Owner of every materialized tile. Parents and neighbours refer to tiles
/// by key.
#[derive(Debug)]
pub struct TileArena<D> {
    tiles: HashMap<TileKey, GridTile<D>>,
}

impl<D> Default for TileArena<D> {
    fn default() -> Self {
        Self {
            tiles: HashMap::new(),
        }
    }
}

impl<D> TileArena<D> {
    #[inline(always)]
    pub fn get(&self, key: &TileKey) -> Option<&GridTile<D>> {
        self.tiles.get(key)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, key: &TileKey) -> Option<&mut GridTile<D>> {
        self.tiles.get_mut(key)
    }

    pub fn insert(&mut self, key: TileKey, tile: GridTile<D>) {
        self.tiles.insert(key, tile);
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    /// Number of materialized tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.tiles.keys()
    }

    /// View test through the arena; unknown keys are not in view.
    pub fn is_in_view(&mut self, key: &TileKey, frame: &FrameState, elevation: &dyn ElevationModel) -> bool {
        self.tiles
            .get_mut(key)
            .map_or(false, |t| t.is_in_view(frame, elevation))
    }

    /// Drop a tile's elements and its whole subtree, keeping the tile itself.
    pub fn collapse(&mut self, key: &TileKey, factory: &mut dyn ShapeFactory) {
        let Some(tile) = self.tiles.get_mut(key) else {
            return;
        };
        let had_elements = tile.elements.is_some();
        if let Some(elements) = tile.elements.take() {
            for e in elements {
                factory.release(e.renderable);
            }
        }
        let children = tile.children.take();
        if had_elements {
            trace!(?key, "collapse tile");
        }
        for child in children.into_iter().flatten() {
            self.remove(&child, factory);
        }
    }

    /// Drop only the subtree below a tile.
    pub fn drop_children(&mut self, key: &TileKey, factory: &mut dyn ShapeFactory) {
        let children = self.tiles.get_mut(key).and_then(|t| t.children.take());
        for child in children.into_iter().flatten() {
            self.remove(&child, factory);
        }
    }

    /// Collapse and forget a tile.
    pub fn remove(&mut self, key: &TileKey, factory: &mut dyn ShapeFactory) {
        self.collapse(key, factory);
        self.tiles.remove(key);
    }

    /// Collapse and forget everything.
    pub fn clear(&mut self, factory: &mut dyn ShapeFactory) {
        for (_, tile) in self.tiles.drain() {
            for e in tile.elements.into_iter().flatten() {
                factory.release(e.renderable);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Position;
    use crate::grid::element::ElementKind;
    use crate::grid::frame::DrawContext;
    use crate::grid::params::GraticuleType;
    use crate::shapes::{PathType, ShapeStore};
    use crate::view::{Camera, FlatTerrain, Globe};

    fn key(row: u32, col: u32, level: u8) -> TileKey {
        TileKey::new(GridKey::Cell { row, col }, level)
    }

    fn tile_with_line(store: &mut ShapeStore, sector: Sector, level: u8) -> GridTile<()> {
        let mut t = GridTile::new(sector, 10, level, 1.0, ());
        let h = store.create_line(vec![Position::default(); 2], PathType::Linear);
        t.elements = Some(vec![GridElement::new(sector, h, ElementKind::Line, GraticuleType::LatLon1Deg, 0.0)]);
        t
    }

    #[test]
    fn remove_drops_subtree_and_releases_handles() {
        let mut store = ShapeStore::new();
        let mut arena = TileArena::default();
        let parent = key(0, 0, 0);
        let child = key(0, 0, 1);
        let grandchild = key(0, 0, 2);

        let mut p = tile_with_line(&mut store, Sector::new(0.0, 0.0, 10.0, 10.0), 0);
        p.children = Some(vec![child]);
        let mut c = tile_with_line(&mut store, Sector::new(0.0, 0.0, 1.0, 1.0), 1);
        c.children = Some(vec![grandchild]);
        let g = tile_with_line(&mut store, Sector::new(0.0, 0.0, 0.1, 0.1), 2);
        arena.insert(parent, p);
        arena.insert(child, c);
        arena.insert(grandchild, g);
        assert_eq!(store.len(), 3);

        arena.collapse(&parent, &mut store);
        assert_eq!(arena.len(), 1);
        assert!(!arena.get(&parent).unwrap().is_expanded());
        assert!(store.is_empty());

        arena.remove(&parent, &mut store);
        assert!(arena.is_empty());
    }

    #[test]
    fn extent_is_cached_until_terrain_changes() {
        let camera = Camera { lat: 5.0, lon: 5.0, altitude: 2_000_000.0, ..Camera::default() };
        let globe = Globe::default();
        let mut terrain = FlatTerrain::default();
        let mut tile: GridTile<()> = GridTile::new(Sector::new(0.0, 0.0, 10.0, 10.0), 10, 0, 1.0, ());

        let frame = FrameState::compute(&DrawContext { frame_id: 0, camera: &camera, globe: &globe, elevation: &terrain });
        let a = tile.extent(&frame, &terrain);
        assert!(tile.is_in_view(&frame, &terrain));

        terrain.set_height(5_000.0);
        // Same frame state: cached sphere still returned.
        assert_eq!(tile.extent(&frame, &terrain), a);

        let frame = FrameState::compute(&DrawContext { frame_id: 1, camera: &camera, globe: &globe, elevation: &terrain });
        let b = tile.extent(&frame, &terrain);
        assert!(b.center.length() > a.center.length());
    }

    #[test]
    fn extent_contains_the_sector_surface() {
        let camera = Camera::default();
        let globe = Globe::default();
        let terrain = FlatTerrain::default();
        let frame = FrameState::compute(&DrawContext { frame_id: 0, camera: &camera, globe: &globe, elevation: &terrain });
        let mut tile: GridTile<()> = GridTile::new(Sector::new(0.0, 0.0, 40.0, 60.0), 10, 0, 1.0, ());
        let s = tile.extent(&frame, &terrain);
        for i in 0..=10 {
            for j in 0..=10 {
                let p = geo::surface_point(4.0 * i as f64, 6.0 * j as f64, 0.0, globe.radius);
                assert!(p.distance(s.center) <= s.radius + 1e-6);
            }
        }
    }
}
