//! UTM zones cut into metric squares.

use crate::coords::{Hemisphere, ZoneId};
use crate::grid::config::GraticuleConfig;
use crate::grid::element::GridElement;
use crate::grid::frame::PassContext;
use crate::grid::layer::{GridSystem, NeighbourView};
use crate::grid::params::{Color, GraticuleType, MetricFamily, RenderingParams};
use crate::grid::systems::projected::{zone_tile, Edges, ProjectedGrid, ProjectedTile, ZoneTile};
use crate::grid::tile::{GridKey, GridTile, RootKey, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};

const GRID: ProjectedGrid = ProjectedGrid {
    family: MetricFamily::Utm,
    zone_type: GraticuleType::UtmZone,
    square_labels: false,
};

/// Default styles shared with the UPS layer.
pub(crate) fn utm_params(ty: GraticuleType) -> RenderingParams {
    match ty {
        GraticuleType::UtmZone => RenderingParams::new(Color::WHITE, 1.0, 16.0),
        GraticuleType::Utm100Km => RenderingParams::new(Color::rgb(0, 255, 0), 1.0, 14.0),
        GraticuleType::Utm10Km => RenderingParams::new(Color::rgb(0, 102, 255), 1.0, 14.0),
        GraticuleType::Utm1Km => RenderingParams::new(Color::rgb(0, 255, 255), 1.0, 12.0),
        GraticuleType::Utm100M => RenderingParams::new(Color::rgb(0, 153, 153), 1.0, 12.0),
        _ => RenderingParams::new(Color::rgb(102, 255, 204), 1.0, 10.0),
    }
}

/// Root key of a UTM zone.
pub fn zone_key(zone: u8, hemisphere: Hemisphere) -> TileKey {
    TileKey::new(GridKey::Root(RootKey::Zone(ZoneId::Utm { zone, hemisphere })), 0)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UtmGrid;

impl GridSystem for UtmGrid {
    type Desc = ProjectedTile;

    fn name(&self) -> &'static str {
        "UTM"
    }

    fn types(&self) -> &'static [GraticuleType] {
        &GraticuleType::UTM
    }

    fn default_params(ty: GraticuleType) -> RenderingParams {
        utm_params(ty)
    }

    /// Row 0 is the southern hemisphere, column `zone - 1`.
    fn root_layout(&self) -> GridTilesSupport {
        let mut slots = Vec::with_capacity(120);
        for (row, hemisphere) in [Hemisphere::South, Hemisphere::North].into_iter().enumerate() {
            for zone in 1..=60u8 {
                let id = ZoneId::Utm { zone, hemisphere };
                slots.push(RootSlot {
                    row,
                    col: zone as usize - 1,
                    key: zone_key(zone, hemisphere),
                    sector: id.sector(),
                });
            }
        }
        GridTilesSupport::new(2, 60, slots)
    }

    fn make_root(&self, slot: &RootSlot, _config: &GraticuleConfig) -> Option<GridTile<ProjectedTile>> {
        let GridKey::Root(root @ RootKey::Zone(id)) = slot.key.grid else {
            return None;
        };
        let ZoneId::Utm { zone, hemisphere } = id else {
            return None;
        };
        Some(zone_tile(ZoneTile {
            id,
            root,
            clip: slot.sector,
            edges: Edges {
                west: true,
                south: true,
                north: hemisphere == Hemisphere::North,
            },
            label: Some(format!("{zone}{}", hemisphere.letter())),
        }))
    }

    fn build_elements(&self, tile: &GridTile<ProjectedTile>, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        GRID.build_elements(tile, pass)
    }

    fn can_descend(&self, tile: &GridTile<ProjectedTile>, pass: &PassContext<'_>) -> bool {
        GRID.can_descend(tile, pass)
    }

    fn make_children(
        &self,
        _key: &TileKey,
        tile: &GridTile<ProjectedTile>,
        pass: &PassContext<'_>,
    ) -> Vec<(TileKey, GridTile<ProjectedTile>)> {
        GRID.make_children(tile, pass.coords)
    }

    fn neighbours(&self, tile: &GridTile<ProjectedTile>) -> [Option<TileKey>; 2] {
        GRID.neighbours(tile)
    }

    fn accept(
        &self,
        _tile: &GridTile<ProjectedTile>,
        element: &GridElement,
        neighbours: NeighbourView,
        _pass: &PassContext<'_>,
    ) -> bool {
        GRID.accept(element, neighbours)
    }

    fn on_selected(&self, tile: &GridTile<ProjectedTile>, element: &GridElement, pass: &mut PassContext<'_>) {
        GRID.observe(tile, element, pass);
    }

    fn metric_family(&self) -> Option<MetricFamily> {
        Some(MetricFamily::Utm)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::coords::{CoordinateService, MgrsCoord, UpsCoord, UtmCoord, Wgs84Coordinates};
    use crate::geo::LatLon;
    use crate::grid::element::ElementKind;
    use crate::grid::frame::DrawContext;
    use crate::grid::layer::GraticuleLayer;
    use crate::grid::systems::fixture::Fixture;
    use crate::shapes::{Shape, ShapeStore};
    use crate::view::{Camera, FlatTerrain, Globe};

    fn render(camera: Camera) -> (GraticuleLayer<UtmGrid>, ShapeStore) {
        render_with(camera, Box::new(Wgs84Coordinates))
    }

    fn render_with(camera: Camera, coords: Box<dyn CoordinateService>) -> (GraticuleLayer<UtmGrid>, ShapeStore) {
        let mut store = ShapeStore::new();
        let mut layer = GraticuleLayer::new(UtmGrid).with_coordinates(coords);
        let terrain = FlatTerrain::default();
        let dc = DrawContext { frame_id: 0, camera: &camera, globe: &Globe::default(), elevation: &terrain };
        layer.render(&dc, &mut store);
        (layer, store)
    }

    fn line_bits(store: &ShapeStore, layer: &GraticuleLayer<UtmGrid>, ty: GraticuleType) -> Vec<Vec<(u64, u64)>> {
        layer
            .renderables()
            .filter(|(_, t)| *t == ty)
            .filter_map(|(h, _)| match store.get(h) {
                Some(Shape::Line { positions, .. }) => {
                    Some(positions.iter().map(|p| (p.lat.to_bits(), p.lon.to_bits())).collect())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn layout_covers_both_hemispheres() {
        let support = UtmGrid.root_layout();
        assert_eq!(support.slots().len(), 120);
        let south = support.slot(0, 30).unwrap();
        assert_eq!(south.sector.min_lat, -80.0);
        assert_eq!(south.sector.min_lon, 0.0);
        let north = support.slot(1, 59).unwrap();
        assert_eq!(north.sector.max_lat(), 84.0);
        assert_eq!(north.sector.max_lon(), 180.0);
    }

    #[test]
    fn zone_tiles_own_west_and_south_edges() {
        let mut fx = Fixture::new(Camera::default(), GraticuleConfig::default());
        let support = UtmGrid.root_layout();

        let north = UtmGrid.make_root(support.slot(1, 30).unwrap(), &fx.config).unwrap();
        let kinds: Vec<ElementKind> = UtmGrid.build_elements(&north, &mut fx.pass()).iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ElementKind::LineWest));
        assert!(kinds.contains(&ElementKind::LineNorth));
        // The northern tile owns the equator.
        assert!(kinds.contains(&ElementKind::LineSouth));
        assert!(kinds.contains(&ElementKind::GridZoneLabel));

        let south = UtmGrid.make_root(support.slot(0, 30).unwrap(), &fx.config).unwrap();
        let kinds: Vec<ElementKind> = UtmGrid.build_elements(&south, &mut fx.pass()).iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ElementKind::LineSouth));
        assert!(!kinds.contains(&ElementKind::LineNorth));
        assert_eq!(north.divisions, 5);
    }

    #[test]
    fn shared_square_edges_are_drawn_once() {
        let camera = Camera { lat: 45.0, lon: 3.0, altitude: 300_000.0, ..Camera::default() };
        let (layer, store) = render(camera);
        let lines = line_bits(&store, &layer, GraticuleType::Utm100Km);
        assert!(lines.len() > 4, "{}", lines.len());
        let unique: HashSet<_> = lines.iter().collect();
        assert_eq!(unique.len(), lines.len());
        assert!(layer.output().count(GraticuleType::Utm10Km) > 0);
        assert_eq!(layer.output().count(GraticuleType::Utm1Km), 0);
    }

    #[test]
    fn far_camera_draws_zone_edges_only() {
        let (layer, _) = render(Camera { lat: 20.0, lon: 10.0, altitude: 20_000_000.0, ..Camera::default() });
        assert!(layer.output().count(GraticuleType::UtmZone) > 0);
        assert_eq!(layer.output().count(GraticuleType::Utm100Km), 0);
    }

    #[test]
    fn active_zone_gets_ruler_labels() {
        let camera = Camera { lat: 45.0, lon: 3.0, altitude: 300_000.0, ..Camera::default() };
        let (layer, store) = render(camera);
        let metric_labels = layer
            .renderables()
            .filter(|(_, ty)| *ty == GraticuleType::Utm10Km)
            .filter(|(h, _)| matches!(store.get(*h), Some(Shape::Text { .. })))
            .count();
        assert!(metric_labels > 0);
    }

    #[test]
    fn adjacent_zones_share_one_boundary_line() {
        let camera = Camera { lat: 45.0, lon: 6.0, altitude: 1_500_000.0, ..Camera::default() };
        let (layer, store) = render(camera);
        let zone_labels: Vec<String> = layer
            .renderables()
            .filter_map(|(h, _)| match store.get(h) {
                Some(Shape::Text { text, .. }) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert!(zone_labels.iter().any(|t| t == "31N"));
        assert!(zone_labels.iter().any(|t| t == "32N"));

        let boundary: Vec<_> = line_bits(&store, &layer, GraticuleType::UtmZone)
            .into_iter()
            .filter(|l| {
                l.iter().all(|&(lat, lon)| f64::from_bits(lon) == 6.0 && f64::from_bits(lat) >= 0.0)
            })
            .collect();
        assert_eq!(boundary.len(), 1, "{boundary:?}");
    }

    /// Answers nothing, like a service with no coverage here.
    struct Refusing;

    impl CoordinateService for Refusing {
        fn geo_to_utm(&self, _lat: f64, _lon: f64) -> Option<UtmCoord> {
            None
        }
        fn geo_to_utm_zone(&self, _lat: f64, _lon: f64, _zone: u8) -> Option<UtmCoord> {
            None
        }
        fn utm_to_geo(&self, _utm: &UtmCoord) -> Option<LatLon> {
            None
        }
        fn geo_to_ups(&self, _lat: f64, _lon: f64) -> Option<UpsCoord> {
            None
        }
        fn ups_to_geo(&self, _ups: &UpsCoord) -> Option<LatLon> {
            None
        }
        fn geo_to_mgrs(&self, _lat: f64, _lon: f64) -> Option<MgrsCoord> {
            None
        }
        fn mgrs_to_geo(&self, _mgrs: &str) -> Option<LatLon> {
            None
        }
        fn mgrs_square_id(&self, _zone: ZoneId, _easting: f64, _northing: f64) -> Option<String> {
            None
        }
    }

    /// WGS84, counting the UTM conversions it is asked for.
    #[derive(Default)]
    struct Counting {
        calls: Rc<Cell<usize>>,
    }

    impl Counting {
        fn hit(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl CoordinateService for Counting {
        fn geo_to_utm(&self, lat: f64, lon: f64) -> Option<UtmCoord> {
            self.hit();
            Wgs84Coordinates.geo_to_utm(lat, lon)
        }
        fn geo_to_utm_zone(&self, lat: f64, lon: f64, zone: u8) -> Option<UtmCoord> {
            self.hit();
            Wgs84Coordinates.geo_to_utm_zone(lat, lon, zone)
        }
        fn utm_to_geo(&self, utm: &UtmCoord) -> Option<LatLon> {
            self.hit();
            Wgs84Coordinates.utm_to_geo(utm)
        }
        fn geo_to_ups(&self, lat: f64, lon: f64) -> Option<UpsCoord> {
            Wgs84Coordinates.geo_to_ups(lat, lon)
        }
        fn ups_to_geo(&self, ups: &UpsCoord) -> Option<LatLon> {
            Wgs84Coordinates.ups_to_geo(ups)
        }
        fn geo_to_mgrs(&self, lat: f64, lon: f64) -> Option<MgrsCoord> {
            Wgs84Coordinates.geo_to_mgrs(lat, lon)
        }
        fn mgrs_to_geo(&self, mgrs: &str) -> Option<LatLon> {
            Wgs84Coordinates.mgrs_to_geo(mgrs)
        }
        fn mgrs_square_id(&self, zone: ZoneId, easting: f64, northing: f64) -> Option<String> {
            Wgs84Coordinates.mgrs_square_id(zone, easting, northing)
        }
    }

    #[test]
    fn geometry_comes_from_the_coordinate_service() {
        let camera = Camera { lat: 45.0, lon: 9.0, altitude: 300_000.0, ..Camera::default() };

        let (layer, store) = render_with(camera, Box::new(Refusing));
        assert_eq!(layer.output().len(), 0);
        assert!(store.is_empty());

        let counting = Counting::default();
        let calls = Rc::clone(&counting.calls);
        let (layer, _) = render_with(camera, Box::new(counting));
        let (reference, _) = render(camera);
        assert!(calls.get() > 0);
        assert_eq!(layer.output().len(), reference.output().len());
        assert!(layer.output().count(GraticuleType::Utm100Km) > 0);
    }
}
