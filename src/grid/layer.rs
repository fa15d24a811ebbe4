//! The generic graticule layer and the strategy trait each grid system
//! implements.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::coords::{CoordinateService, Wgs84Coordinates};
use crate::error::Result;
use crate::grid::config::{GarsThresholds, GraticuleConfig, ScaleLabelOffset};
use crate::grid::element::GridElement;
use crate::grid::frame::{DrawContext, FrameMemo, PassContext};
use crate::grid::labels::{AngleFormat, LabelDedup};
use crate::grid::output::RenderableSet;
use crate::grid::params::{GraticuleType, MetricFamily, RenderingParams, StyleOverride, StyleRegistry};
use crate::grid::scale::MetricScaleSupport;
use crate::grid::tile::{GridTile, TileArena, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};
use crate::grid::trigger::UpdateTrigger;
use crate::shapes::{RenderableHandle, ShapeFactory, ShapeKind};

/// Whether a tile's north and east neighbours are in view this pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighbourView {
    pub north: bool,
    pub east: bool,
}

/// Per-system strategy driving a [`GraticuleLayer`].
pub trait GridSystem {
    /// Per-tile description cached on the tile (zone identity, cell id, ...).
    type Desc;

    fn name(&self) -> &'static str;

    /// Every type this system may tag a renderable with.
    fn types(&self) -> &'static [GraticuleType];

    fn default_params(ty: GraticuleType) -> RenderingParams;

    fn root_layout(&self) -> GridTilesSupport;

    /// Build the top-level tile for a slot, `None` if the slot has no tile.
    fn make_root(&self, slot: &RootSlot, config: &GraticuleConfig) -> Option<GridTile<Self::Desc>>;

    /// Whether a root takes part in this pass at all.
    fn root_enabled(&self, _key: &TileKey, _pass: &PassContext<'_>) -> bool {
        true
    }

    fn build_elements(&self, tile: &GridTile<Self::Desc>, pass: &mut PassContext<'_>) -> Vec<GridElement>;

    /// Extra descent condition on top of the pixel-size test.
    fn can_descend(&self, _tile: &GridTile<Self::Desc>, _pass: &PassContext<'_>) -> bool {
        true
    }

    fn make_children(
        &self,
        key: &TileKey,
        tile: &GridTile<Self::Desc>,
        pass: &PassContext<'_>,
    ) -> Vec<(TileKey, GridTile<Self::Desc>)>;

    /// North and east neighbour keys, for systems that share edges.
    fn neighbours(&self, _tile: &GridTile<Self::Desc>) -> [Option<TileKey>; 2] {
        [None, None]
    }

    /// Final say on forwarding an in-view element.
    fn accept(
        &self,
        _tile: &GridTile<Self::Desc>,
        _element: &GridElement,
        _neighbours: NeighbourView,
        _pass: &PassContext<'_>,
    ) -> bool {
        true
    }

    /// Called for every element forwarded to the output.
    fn on_selected(&self, _tile: &GridTile<Self::Desc>, _element: &GridElement, _pass: &mut PassContext<'_>) {}

    /// Systems with metric grids get ruler labels along the active zone.
    fn metric_family(&self) -> Option<MetricFamily> {
        None
    }
}

/// One recursive selection pass over the tile arena.
struct Walker<'w, 'p, S: GridSystem> {
    system: &'w S,
    arena: &'w mut TileArena<S::Desc>,
    pass: &'w mut PassContext<'p>,
}

impl<S: GridSystem> Walker<'_, '_, S> {
    fn select(&mut self, key: TileKey) {
        let Some(tile) = self.arena.get(&key) else {
            return;
        };
        if !tile.is_expanded() {
            let elements = self.system.build_elements(tile, self.pass);
            trace!(?key, count = elements.len(), "expand tile");
            if let Some(tile) = self.arena.get_mut(&key) {
                tile.elements = Some(elements);
            }
        }

        let [north, east] = self
            .arena
            .get(&key)
            .map_or([None, None], |t| self.system.neighbours(t));
        let frame = self.pass.frame;
        let elevation = self.pass.elevation;
        let neighbours = NeighbourView {
            north: north.is_some_and(|k| self.arena.is_in_view(&k, frame, elevation)),
            east: east.is_some_and(|k| self.arena.is_in_view(&k, frame, elevation)),
        };

        let Some(tile) = self.arena.get(&key) else {
            return;
        };
        let min_cell = self.pass.config.min_cell_size_pixels;
        let cell_px = tile.size_in_pixels(frame) / tile.divisions.max(1) as f64;
        // Interior lines fade in a little before the cells are big enough
        // to subdivide.
        let interior_visible = cell_px >= min_cell / 5.0;

        for element in tile.elements.iter().flatten() {
            if !element.is_in_view(&frame.visible) {
                continue;
            }
            if element.kind.is_interior_line() && !interior_visible {
                continue;
            }
            if !self.system.accept(tile, element, neighbours, self.pass) {
                continue;
            }
            self.pass.output.add(element.renderable, element.ty);
            self.system.on_selected(tile, element, self.pass);
        }

        let descend = cell_px >= min_cell && self.system.can_descend(tile, self.pass);
        if !descend {
            self.arena.drop_children(&key, self.pass.factory);
            return;
        }

        let existing = tile.children.clone();
        let children = match existing {
            Some(children) => children,
            None => {
                let built = self.system.make_children(&key, tile, self.pass);
                let keys: Vec<TileKey> = built.iter().map(|(k, _)| *k).collect();
                for (k, child) in built {
                    self.arena.insert(k, child);
                }
                if let Some(tile) = self.arena.get_mut(&key) {
                    tile.children = Some(keys.clone());
                }
                keys
            }
        };

        for child in children {
            if self.arena.is_in_view(&child, frame, elevation) {
                self.select(child);
            } else {
                self.arena.collapse(&child, self.pass.factory);
            }
        }
    }
}

/// A graticule overlay: top-level tiles of one grid system, selected and
/// refined against the camera on every pass that needs it.
pub struct GraticuleLayer<S: GridSystem> {
    system: S,
    config: GraticuleConfig,
    styles: StyleRegistry,
    coords: Box<dyn CoordinateService>,
    support: GridTilesSupport,
    arena: TileArena<S::Desc>,
    roots: BTreeSet<TileKey>,
    output: RenderableSet,
    dedup: LabelDedup,
    scale: Option<MetricScaleSupport>,
    trigger: UpdateTrigger,
    memo: FrameMemo,
    /// Tiles were built with settings that changed since.
    stale_tiles: bool,
}

impl<S: GridSystem> GraticuleLayer<S> {
    pub fn new(system: S) -> Self {
        let support = system.root_layout();
        let scale = system.metric_family().map(MetricScaleSupport::new);
        Self {
            system,
            config: GraticuleConfig::default(),
            styles: StyleRegistry::new(S::default_params),
            coords: Box::new(Wgs84Coordinates),
            support,
            arena: TileArena::default(),
            roots: BTreeSet::new(),
            output: RenderableSet::new(),
            dedup: LabelDedup::default(),
            scale,
            trigger: UpdateTrigger::default(),
            memo: FrameMemo::default(),
            stale_tiles: false,
        }
    }

    pub fn with_config(system: S, config: GraticuleConfig) -> Result<Self> {
        config.validate()?;
        let mut layer = Self::new(system);
        layer.config = config;
        Ok(layer)
    }

    /// Swap the coordinate conversion service.
    pub fn with_coordinates(mut self, coords: Box<dyn CoordinateService>) -> Self {
        self.coords = coords;
        self.invalidate_tiles();
        self
    }

    pub fn name(&self) -> &'static str {
        self.system.name()
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn config(&self) -> &GraticuleConfig {
        &self.config
    }

    /// Number of materialized tiles
    pub fn tile_count(&self) -> usize {
        self.arena.len()
    }

    /// Run a pass if the view changed enough. Returns whether the output was
    /// rebuilt.
    pub fn render(&mut self, dc: &DrawContext<'_>, factory: &mut dyn ShapeFactory) -> bool {
        let frame = self.memo.get(dc);
        let Some(reason) = self.trigger.check(frame) else {
            return false;
        };
        debug!(system = self.system.name(), %reason, "rebuilding graticule");

        if self.stale_tiles {
            self.arena.clear(factory);
            self.roots.clear();
            self.stale_tiles = false;
        }
        self.output.clear(factory);
        self.dedup.clear();
        if let Some(scale) = self.scale.as_mut() {
            scale.begin(frame.active_zone(self.coords.as_ref()));
        }

        let mut pass = PassContext {
            frame,
            config: &self.config,
            coords: self.coords.as_ref(),
            elevation: dc.elevation,
            factory,
            output: &mut self.output,
            dedup: &mut self.dedup,
            scale: self.scale.as_mut(),
        };

        let mut selected = BTreeSet::new();
        for slot in self.support.candidates(&frame.visible) {
            if !self.system.root_enabled(&slot.key, &pass) {
                continue;
            }
            if !self.arena.contains(&slot.key) {
                let Some(tile) = self.system.make_root(&slot, &self.config) else {
                    continue;
                };
                self.arena.insert(slot.key, tile);
                self.roots.insert(slot.key);
            }
            if self.arena.is_in_view(&slot.key, frame, dc.elevation) {
                let mut walker = Walker {
                    system: &self.system,
                    arena: &mut self.arena,
                    pass: &mut pass,
                };
                walker.select(slot.key);
                selected.insert(slot.key);
            }
        }

        let gone: Vec<TileKey> = self.roots.difference(&selected).copied().collect();
        for key in gone {
            self.arena.remove(&key, pass.factory);
            self.roots.remove(&key);
        }

        if let Some(scale) = pass.scale.as_deref() {
            let offset = self.config.scale_label_offset;
            for label in scale.labels(frame, (offset.x, offset.y), pass.coords) {
                let handle = pass.factory.create_text(label.position, label.text, label.priority);
                pass.output.add_transient(handle, label.ty);
            }
        }
        true
    }

    /// Renderables selected by the last pass with their style types.
    pub fn renderables(&self) -> impl Iterator<Item = (RenderableHandle, GraticuleType)> + '_ {
        self.output.iter()
    }

    pub fn output(&self) -> &RenderableSet {
        &self.output
    }

    /// Selected renderables with their parameters, dropping lines of types
    /// whose lines are off and text of types whose labels are off.
    pub fn styled(&mut self) -> Vec<(RenderableHandle, GraticuleType, &RenderingParams)> {
        for (_, ty) in self.output.iter() {
            self.styles.get_mut(ty);
        }
        let styles = &self.styles;
        self.output
            .iter()
            .filter_map(|(handle, ty)| {
                let params = styles.peek(ty)?;
                let shown = match handle.kind {
                    ShapeKind::Line => params.draw_lines,
                    ShapeKind::Text => params.draw_labels,
                };
                shown.then_some((handle, ty, params))
            })
            .collect()
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleRegistry {
        &mut self.styles
    }

    /// Apply a shared bundle first, then per-type tables keyed by type name.
    pub fn apply_styles<'a>(
        &mut self,
        shared: Option<StyleOverride>,
        per_type: impl IntoIterator<Item = (&'a String, &'a StyleOverride)>,
    ) {
        if let Some(shared) = shared {
            self.styles.set_shared_override(shared);
        }
        self.styles.load_overrides(per_type);
    }

    /// Force the next pass to rebuild.
    pub fn invalidate(&mut self) {
        self.trigger.invalidate();
    }

    fn invalidate_tiles(&mut self) {
        self.stale_tiles = true;
        self.trigger.invalidate();
    }

    pub fn set_config(&mut self, config: GraticuleConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.invalidate_tiles();
        Ok(())
    }

    pub fn set_angle_format(&mut self, format: AngleFormat) {
        if self.config.angle_format != format {
            self.config.angle_format = format;
            self.invalidate_tiles();
        }
    }

    pub fn set_min_cell_size_pixels(&mut self, pixels: f64) -> Result<()> {
        let config = GraticuleConfig { min_cell_size_pixels: pixels, ..self.config.clone() };
        config.validate()?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    pub fn set_gars_thresholds(&mut self, thresholds: GarsThresholds) -> Result<()> {
        let config = GraticuleConfig { gars_thresholds: thresholds, ..self.config.clone() };
        config.validate()?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    pub fn set_mgrs_zone_max_altitude(&mut self, altitude: f64) -> Result<()> {
        let config = GraticuleConfig { mgrs_zone_max_altitude: altitude, ..self.config.clone() };
        config.validate()?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    pub fn set_max_resolution(&mut self, meters: f64) -> Result<()> {
        let config = GraticuleConfig { max_resolution: meters, ..self.config.clone() };
        config.validate()?;
        self.config = config;
        self.invalidate_tiles();
        Ok(())
    }

    pub fn set_scale_label_offset(&mut self, offset: ScaleLabelOffset) {
        self.config.scale_label_offset = offset;
        self.invalidate();
    }

    /// Release every handle the layer holds.
    pub fn release(&mut self, factory: &mut dyn ShapeFactory) {
        self.output.clear(factory);
        self.arena.clear(factory);
        self.roots.clear();
        self.dedup.clear();
        self.memo.clear();
        self.trigger.invalidate();
    }
}
