//! Reference-counted occupancy maps and footprint projection.
//!
//! One primitive serves both resolutions: the coarse build grid and the finer
//! pathfinding grid each own an independent [`OccupancyMap`]. Counts are
//! reference counts, never booleans, because footprints from different
//! entities may legitimately claim the same cell.

use std::collections::BTreeMap;

use crownhold_core::{CellCoord, MapDefinition, WorldPoint};

/// World-unit radius of the pathfinding footprint around a unit's center.
pub(crate) const UNIT_FOOTPRINT_RADIUS: f32 = 10.0;

/// Sparse reference-counted cell occupancy at a single grid resolution.
///
/// Absent keys mean a count of zero; a zero count is never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct OccupancyMap {
    counts: BTreeMap<CellCoord, u32>,
}

impl OccupancyMap {
    /// Creates an empty occupancy map.
    pub(crate) fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Adds one reference to every cell in the provided footprint.
    pub(crate) fn increment(&mut self, cells: &[CellCoord]) {
        for &cell in cells {
            *self.counts.entry(cell).or_insert(0) += 1;
        }
    }

    /// Removes one reference from every cell in the provided footprint.
    ///
    /// A cell whose count reaches zero is removed outright so the map never
    /// stores zero entries. Decrementing a vacant cell is an invariant
    /// violation upstream; it is ignored here rather than raised.
    pub(crate) fn decrement(&mut self, cells: &[CellCoord]) {
        for &cell in cells {
            match self.counts.get_mut(&cell) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    let _ = self.counts.remove(&cell);
                }
                None => debug_assert!(false, "decrement of vacant cell {cell:?}"),
            }
        }
    }

    /// Reports whether any footprint currently claims the cell.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.counts.contains_key(&cell)
    }

    /// Reference count recorded for the cell; zero when absent.
    pub(crate) fn count(&self, cell: CellCoord) -> u32 {
        self.counts.get(&cell).copied().unwrap_or(0)
    }

    /// Cells with a positive count, in coordinate order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        self.counts.iter().map(|(cell, count)| (*cell, *count))
    }

    /// Number of cells currently holding a positive count.
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}

/// Build-grid cells covered by a building footprint.
pub(crate) fn building_build_cells(origin: CellCoord, side: u32) -> Vec<CellCoord> {
    square_cells(origin, side as i32)
}

/// Build-grid cells covered by a footprint grown by the spacing border.
pub(crate) fn spaced_build_cells(origin: CellCoord, side: u32, spacing: i32) -> Vec<CellCoord> {
    square_cells(
        origin.offset(-spacing, -spacing),
        side as i32 + 2 * spacing,
    )
}

/// Pathfinding-grid cells the building's world rectangle projects onto.
pub(crate) fn building_path_cells(
    map: &MapDefinition,
    origin: CellCoord,
    side: u32,
) -> Vec<CellCoord> {
    let build = i64::from(map.build_cell());
    let path = i64::from(map.path_cell());
    let x0 = i64::from(origin.x()) * build;
    let y0 = i64::from(origin.y()) * build;
    let x1 = x0 + i64::from(side) * build;
    let y1 = y0 + i64::from(side) * build;

    let mut cells = Vec::new();
    for y in y0.div_euclid(path)..=(y1 - 1).div_euclid(path) {
        for x in x0.div_euclid(path)..=(x1 - 1).div_euclid(path) {
            cells.push(CellCoord::new(x as i32, y as i32));
        }
    }
    cells
}

/// Pathfinding-grid cells a unit's circular footprint straddles.
pub(crate) fn unit_path_cells(map: &MapDefinition, center: WorldPoint) -> Vec<CellCoord> {
    let min = map.world_to_path_cell(WorldPoint::new(
        center.x() - UNIT_FOOTPRINT_RADIUS,
        center.y() - UNIT_FOOTPRINT_RADIUS,
    ));
    let max = map.world_to_path_cell(WorldPoint::new(
        center.x() + UNIT_FOOTPRINT_RADIUS,
        center.y() + UNIT_FOOTPRINT_RADIUS,
    ));

    let mut cells = Vec::new();
    for y in min.y()..=max.y() {
        for x in min.x()..=max.x() {
            cells.push(CellCoord::new(x, y));
        }
    }
    cells
}

fn square_cells(origin: CellCoord, side: i32) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    for dy in 0..side {
        for dx in 0..side {
            cells.push(origin.offset(dx, dy));
        }
    }
    cells
}
