//! Pure placement validation over the build grid.
//!
//! Validity is a function of the candidate, the map, the build occupancy and
//! the existing buildings only; gold is the caller's concern so resubmitting
//! an identical request always produces an identical verdict.

use std::collections::BTreeMap;

use crownhold_core::{BuildingId, BuildingKind, CellCoord, MapDefinition, PlacementError, PlayerId};

use crate::buildings::{self, Building};
use crate::occupancy::{self, OccupancyMap};

/// Width of the empty border required around every footprint, in build cells.
pub(crate) const SPACING_CELLS: i32 = 1;

/// Validates a placement candidate against bounds, spacing and search area.
///
/// The rules, in rejection order: the footprint grown by the spacing border
/// must lie within map bounds; no cell of that spaced footprint may be
/// occupied; and at least half of the footprint's own cells must fall inside
/// the city search area, the union of search-radius disks around same-owner
/// buildings. The very first building a player places is exempt from the
/// search-area rule, which would otherwise be unsatisfiable.
pub(crate) fn validate(
    map: &MapDefinition,
    build_occupancy: &OccupancyMap,
    buildings: &BTreeMap<BuildingId, Building>,
    owner: PlayerId,
    kind: BuildingKind,
    origin: CellCoord,
) -> Result<(), PlacementError> {
    let side = buildings::size_for(kind).cells_per_side();
    let spaced = occupancy::spaced_build_cells(origin, side, SPACING_CELLS);

    for &cell in &spaced {
        if !map.build_cell_in_bounds(cell) {
            return Err(PlacementError::OutOfBounds);
        }
    }
    for &cell in &spaced {
        if build_occupancy.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }
    }

    let owned: Vec<&Building> = buildings
        .values()
        .filter(|building| building.owner == owner)
        .collect();
    if owned.is_empty() {
        return Ok(());
    }

    let footprint = occupancy::building_build_cells(origin, side);
    let covered = footprint
        .iter()
        .filter(|&&cell| within_search_area(map, &owned, cell))
        .count();
    if covered * 2 < footprint.len() {
        return Err(PlacementError::OutsideSearchArea);
    }

    Ok(())
}

fn within_search_area(map: &MapDefinition, owned: &[&Building], cell: CellCoord) -> bool {
    let point = map.build_cell_center(cell);
    owned.iter().any(|building| {
        let radius = building.search_radius_cells as f32 * map.build_cell() as f32;
        building.center(map).distance_to(point) <= radius
    })
}
