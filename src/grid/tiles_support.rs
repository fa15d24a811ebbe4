use std::collections::HashMap;

use crate::grid::tile::TileKey;
use crate::sector::Sector;

/// Cell size of the lookup hash, in degrees.
const CELL_SIZE: f64 = 10.0;

/// One top-level tile position of a row/column layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootSlot {
    pub row: usize,
    pub col: usize,
    pub key: TileKey,
    pub sector: Sector,
}

/// Row/column registry of a grid system's top-level tiles.
///
/// Each slot's sector is indexed into every hash cell it overlaps, so a
/// visible-sector query never misses a slot and may return extra ones for
/// the caller's precise tests to drop.
#[derive(Debug)]
pub struct GridTilesSupport {
    rows: usize,
    cols: usize,
    slots: Vec<RootSlot>,
    by_position: HashMap<(usize, usize), usize>,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl GridTilesSupport {
    pub fn new(rows: usize, cols: usize, slots: Vec<RootSlot>) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        let mut by_position = HashMap::with_capacity(slots.len());
        for (idx, slot) in slots.iter().enumerate() {
            by_position.insert((slot.row, slot.col), idx);
            if slot.sector.is_empty() {
                continue;
            }
            let (x0, y0) = to_cell(slot.sector.min_lon, slot.sector.min_lat);
            let (x1, y1) = to_cell(slot.sector.max_lon(), slot.sector.max_lat());
            for y in y0..=y1 {
                for x in x0..=x1 {
                    cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        Self {
            rows,
            cols,
            slots,
            by_position,
            cells,
        }
    }

    /// Regular layout of `rows` × `cols` equal cells covering `bounds`.
    pub fn regular(rows: usize, cols: usize, bounds: Sector, key: impl Fn(usize, usize) -> TileKey) -> Self {
        let dlat = bounds.delta_lat / rows as f64;
        let dlon = bounds.delta_lon / cols as f64;
        let mut slots = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let min_lat = bounds.min_lat + dlat * row as f64;
                let min_lon = bounds.min_lon + dlon * col as f64;
                let max_lat = if row + 1 == rows { bounds.max_lat() } else { min_lat + dlat };
                let max_lon = if col + 1 == cols { bounds.max_lon() } else { min_lon + dlon };
                slots.push(RootSlot {
                    row,
                    col,
                    key: key(row, col),
                    sector: Sector::from_bounds(min_lat, max_lat, min_lon, max_lon),
                });
            }
        }
        Self::new(rows, cols, slots)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<&RootSlot> {
        self.by_position.get(&(row, col)).map(|&i| &self.slots[i])
    }

    pub fn slots(&self) -> &[RootSlot] {
        &self.slots
    }

    /// Slots whose sector intersects `visible`, in row-major order.
    pub fn candidates(&self, visible: &Sector) -> Vec<RootSlot> {
        if visible.is_empty() {
            return Vec::new();
        }
        let (x0, y0) = to_cell(visible.min_lon, visible.min_lat);
        let (x1, y1) = to_cell(visible.max_lon(), visible.max_lat());
        let mut hits = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    hits.extend_from_slice(indices);
                }
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter()
            .map(|i| self.slots[i])
            .filter(|s| s.sector.intersects(visible))
            .collect()
    }
}

#[inline(always)]
fn to_cell(lon: f64, lat: f64) -> (i32, i32) {
    let x = (lon / CELL_SIZE).floor() as i32;
    let y = (lat / CELL_SIZE).floor() as i32;
    (x, y)
}
