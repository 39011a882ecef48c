#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over the pathfinding grid.
//!
//! The world supplies walkability as a closure over its occupancy state; this
//! crate owns only the search itself. Failure is silent by design: callers
//! receive an empty path and treat it as "hold position, retry later".

use std::collections::{HashMap, HashSet};

use crownhold_core::{CellCoord, MapDefinition};

/// Cost of a cardinal step between adjacent cells.
const CARDINAL_COST: f32 = 1.0;
/// Cost of a diagonal step between adjacent cells.
const DIAGONAL_COST: f32 = 1.414;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Search bookkeeping for a single visited cell.
#[derive(Clone, Copy, Debug)]
struct PathNode {
    g_cost: f32,
    h_cost: f32,
    parent: Option<CellCoord>,
}

impl PathNode {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

/// Computes an ordered cell route from `start` to `goal`.
///
/// The returned sequence excludes `start` and includes `goal`. It is empty
/// when `start == goal`, when the goal is unwalkable, or when no route
/// exists. A cell is traversable when its projected world footprint lies
/// within map bounds and `is_walkable` reports it free.
///
/// The frontier is scanned linearly for the lowest f-cost node, taking the
/// first match on ties; once a cell is expanded it is never reopened, even if
/// a cheaper route to it is discovered later. Both are deliberate fidelity
/// choices, not guarantees worth relying on.
#[must_use]
pub fn find_path<F>(
    map: &MapDefinition,
    start: CellCoord,
    goal: CellCoord,
    is_walkable: F,
) -> Vec<CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    if start == goal {
        return Vec::new();
    }
    if !map.path_cell_in_bounds(goal) || !is_walkable(goal) {
        return Vec::new();
    }

    let mut nodes: HashMap<CellCoord, PathNode> = HashMap::new();
    let mut open: Vec<CellCoord> = Vec::new();
    let mut closed: HashSet<CellCoord> = HashSet::new();

    let _ = nodes.insert(
        start,
        PathNode {
            g_cost: 0.0,
            h_cost: octile_distance(start, goal),
            parent: None,
        },
    );
    open.push(start);

    while !open.is_empty() {
        let current = open.remove(lowest_f_index(&open, &nodes));
        if current == goal {
            return reconstruct(&nodes, start, goal);
        }
        let _ = closed.insert(current);

        let current_g = match nodes.get(&current) {
            Some(node) => node.g_cost,
            None => continue,
        };

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let neighbor = current.offset(dx, dy);
            if closed.contains(&neighbor) {
                continue;
            }
            if !map.path_cell_in_bounds(neighbor) || !is_walkable(neighbor) {
                continue;
            }

            let step_cost = if dx != 0 && dy != 0 {
                DIAGONAL_COST
            } else {
                CARDINAL_COST
            };
            let tentative = current_g + step_cost;

            match nodes.get_mut(&neighbor) {
                None => {
                    let _ = nodes.insert(
                        neighbor,
                        PathNode {
                            g_cost: tentative,
                            h_cost: octile_distance(neighbor, goal),
                            parent: Some(current),
                        },
                    );
                    open.push(neighbor);
                }
                Some(node) => {
                    if tentative < node.g_cost {
                        node.g_cost = tentative;
                        node.parent = Some(current);
                    }
                }
            }
        }
    }

    Vec::new()
}

/// Octile distance between two cells, matching the step-cost model.
#[must_use]
pub fn octile_distance(from: CellCoord, to: CellCoord) -> f32 {
    let dx = from.x().abs_diff(to.x()) as f32;
    let dy = from.y().abs_diff(to.y()) as f32;
    CARDINAL_COST * (dx + dy) + (DIAGONAL_COST - 2.0 * CARDINAL_COST) * dx.min(dy)
}

fn lowest_f_index(open: &[CellCoord], nodes: &HashMap<CellCoord, PathNode>) -> usize {
    let mut best_index = 0;
    let mut best_f = f32::INFINITY;
    for (index, cell) in open.iter().enumerate() {
        let f = nodes.get(cell).map_or(f32::INFINITY, PathNode::f_cost);
        if f < best_f {
            best_f = f;
            best_index = index;
        }
    }
    best_index
}

fn reconstruct(
    nodes: &HashMap<CellCoord, PathNode>,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        path.push(cursor);
        let Some(node) = nodes.get(&cursor) else {
            return Vec::new();
        };
        let Some(parent) = node.parent else {
            return Vec::new();
        };
        cursor = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octile_distance_mixes_cardinal_and_diagonal_costs() {
        let origin = CellCoord::new(0, 0);
        assert!((octile_distance(origin, CellCoord::new(5, 0)) - 5.0).abs() < 1e-6);
        assert!((octile_distance(origin, CellCoord::new(3, 3)) - 3.0 * 1.414).abs() < 1e-6);
        let mixed = octile_distance(origin, CellCoord::new(5, 2));
        assert!((mixed - (3.0 + 2.0 * 1.414)).abs() < 1e-6);
    }

    #[test]
    fn octile_distance_is_symmetric() {
        let a = CellCoord::new(-2, 4);
        let b = CellCoord::new(7, -1);
        assert_eq!(octile_distance(a, b), octile_distance(b, a));
    }
}
