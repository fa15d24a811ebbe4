//! UPS polar caps cut into metric squares.

use crate::coords::{PolarCap, ZoneId};
use crate::grid::config::GraticuleConfig;
use crate::grid::element::GridElement;
use crate::grid::frame::PassContext;
use crate::grid::layer::{GridSystem, NeighbourView};
use crate::grid::params::{GraticuleType, MetricFamily, RenderingParams};
use crate::grid::systems::projected::{zone_tile, Edges, ProjectedGrid, ProjectedTile, ZoneTile};
use crate::grid::systems::utm::utm_params;
use crate::grid::tile::{GridKey, GridTile, RootKey, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};

const GRID: ProjectedGrid = ProjectedGrid {
    family: MetricFamily::Utm,
    zone_type: GraticuleType::UtmZone,
    square_labels: false,
};

pub fn cap_key(cap: PolarCap) -> TileKey {
    TileKey::new(GridKey::Root(RootKey::Zone(ZoneId::Ups(cap))), 0)
}

/// Zone tile of a cap. The caps draw the ±80°/84° parallel facing UTM and
/// their western meridian.
pub(crate) fn cap_tile(cap: PolarCap, label: bool) -> GridTile<ProjectedTile> {
    let id = ZoneId::Ups(cap);
    let south_cap = matches!(cap, PolarCap::A | PolarCap::B);
    zone_tile(ZoneTile {
        id,
        root: RootKey::Zone(id),
        clip: cap.sector(),
        edges: Edges { west: true, south: !south_cap, north: south_cap },
        label: label.then(|| cap.letter().to_string()),
    })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UpsGrid;

impl GridSystem for UpsGrid {
    type Desc = ProjectedTile;

    fn name(&self) -> &'static str {
        "UPS"
    }

    fn types(&self) -> &'static [GraticuleType] {
        &GraticuleType::UTM
    }

    fn default_params(ty: GraticuleType) -> RenderingParams {
        utm_params(ty)
    }

    /// Row 0 holds A/B, row 1 holds Y/Z.
    fn root_layout(&self) -> GridTilesSupport {
        let slots = PolarCap::ALL
            .into_iter()
            .enumerate()
            .map(|(i, cap)| RootSlot {
                row: i / 2,
                col: i % 2,
                key: cap_key(cap),
                sector: cap.sector(),
            })
            .collect();
        GridTilesSupport::new(2, 2, slots)
    }

    fn make_root(&self, slot: &RootSlot, _config: &GraticuleConfig) -> Option<GridTile<ProjectedTile>> {
        match slot.key.grid {
            GridKey::Root(RootKey::Zone(ZoneId::Ups(cap))) => Some(cap_tile(cap, true)),
            _ => None,
        }
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
}
