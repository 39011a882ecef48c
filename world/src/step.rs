//! Per-tick orchestration of one simulation step.
//!
//! A step is run-to-completion and strictly ordered: units, then buildings,
//! then spawn resolution, then batched path recomputation against post-step
//! occupancy, then repair aggregation, then the loss check. The world is the
//! sole mutator throughout.

use std::collections::BTreeMap;
use std::time::Duration;

use crownhold_core::{
    BuildingBehavior, BuildingId, BuildingKind, CellCoord, EntityTag, Event, GameState,
    PathDirective, PlayerId, UnitBehavior, UnitId, UnitLocation, UnitType, SIMULATION_STEP,
};
use crownhold_system_pathfinding as pathfinding;

use crate::buildings::{self, Building};
use crate::units::{self, RepairContribution};
use crate::{occupancy, placement, spawn_garrisoned_unit, World};

pub(crate) fn execute(world: &mut World, out_events: &mut Vec<Event>) {
    let dt = SIMULATION_STEP;
    let map = world.map;
    out_events.push(Event::TimeAdvanced { dt });

    // (a) Units: lift the old footprint, run behavior then movement, lay the
    // new footprint, and collect route requests for the batch at (e).
    let mut path_requests: Vec<(UnitId, CellCoord)> = Vec::new();
    let mut repairs: Vec<RepairContribution> = Vec::new();
    let unit_ids: Vec<UnitId> = world.units.keys().copied().collect();
    for unit_id in unit_ids {
        let Some(unit) = world.units.get_mut(&unit_id) else {
            continue;
        };
        if let UnitLocation::OnMap(position) = unit.location {
            let cells = occupancy::unit_path_cells(&map, position);
            world.path_occupancy.decrement(&cells);
        }

        let directive = units::update_behavior(
            unit,
            &world.buildings,
            &map,
            dt,
            &mut repairs,
            out_events,
        )
        .or(units::update_movement(unit, &map, dt, |cell| {
            world.path_occupancy.is_occupied(cell)
        }));

        if let UnitLocation::OnMap(position) = unit.location {
            let cells = occupancy::unit_path_cells(&map, position);
            world.path_occupancy.increment(&cells);
        }
        if let PathDirective::Request(goal) = directive {
            path_requests.push((unit_id, goal));
        }
    }

    // (b) Buildings: behavior cadences and garrison spawn timers.
    let mut house_requests: Vec<BuildingId> = Vec::new();
    let mut unit_spawns: Vec<(BuildingId, UnitType)> = Vec::new();
    let building_ids: Vec<BuildingId> = world.buildings.keys().copied().collect();
    for building_id in building_ids {
        let Some(building) = world.buildings.get_mut(&building_id) else {
            continue;
        };
        buildings::update_behavior(building, dt, &mut house_requests, out_events);
        buildings::update_garrison(building, dt, &mut unit_spawns);
    }

    // (c) House seeding: one new house per requesting castle, id-sequenced.
    for castle_id in house_requests {
        let Some(castle) = world.buildings.get(&castle_id) else {
            continue;
        };
        let owner = castle.owner;
        let Some(origin) = find_house_site(world, owner) else {
            continue;
        };
        let house_id = world.allocate_building_id();
        let house = Building::new(house_id, owner, BuildingKind::House, origin, world.seed);
        world
            .build_occupancy
            .increment(&occupancy::building_build_cells(origin, house.side()));
        world
            .path_occupancy
            .increment(&occupancy::building_path_cells(&map, origin, house.side()));
        let _ = world.buildings.insert(house_id, house);
        out_events.push(Event::HouseSpawned {
            castle: castle_id,
            house: house_id,
            origin,
        });
    }

    // (d) Garrison spawn requests become newly housed units.
    for (building_id, unit_type) in unit_spawns {
        spawn_garrisoned_unit(world, building_id, unit_type, out_events);
    }

    // (e) Batched path recomputation against post-step occupancy. The
    // requesting unit's own footprint is lifted for the duration of its
    // search so it never walls itself in mid-cell.
    for (unit_id, goal) in path_requests {
        let Some(unit) = world.units.get_mut(&unit_id) else {
            continue;
        };
        if matches!(unit.behavior, UnitBehavior::Dead) {
            continue;
        }
        let UnitLocation::OnMap(position) = unit.location else {
            continue;
        };

        let own_cells = occupancy::unit_path_cells(&map, position);
        world.path_occupancy.decrement(&own_cells);
        let start = map.world_to_path_cell(position);
        let route = pathfinding::find_path(&map, start, goal, |cell| {
            !world.path_occupancy.is_occupied(cell)
        });
        world.path_occupancy.increment(&own_cells);

        unit.path = route.into();
        unit.target_destination = Some(goal);
    }

    // (f) Repair aggregation, applied per building after all units ran.
    let mut totals: BTreeMap<BuildingId, f32> = BTreeMap::new();
    for contribution in repairs {
        *totals.entry(contribution.building).or_insert(0.0) += contribution.amount;
    }
    for (building_id, amount) in totals {
        let Some(building) = world.buildings.get_mut(&building_id) else {
            continue;
        };
        if !building.is_damaged() {
            continue;
        }
        building.hp = (building.hp + amount).min(building.max_hp);
        if building.hp >= building.max_hp
            && building.behavior == BuildingBehavior::UnderConstruction
        {
            out_events.push(Event::ConstructionCompleted {
                building: building_id,
            });
            if let Some(next) = buildings::completed_behavior(building.kind) {
                let cadence = building.roll_gold_cadence();
                building.behavior = next;
                building.behavior_timer = Duration::ZERO;
                building.behavior_duration = cadence;
            }
        }
    }

    // (g) Loss evaluation.
    let mut fallen: Option<BuildingId> = None;
    for building in world.buildings.values() {
        if building.tags.contains(&EntityTag::Objective) && building.hp <= 0.0 {
            fallen = Some(building.id);
            break;
        }
    }
    if let Some(building) = fallen {
        world.game = GameState::GameOver;
        out_events.push(Event::GameEnded { building });
    }
}

/// First valid house origin on the rings around existing buildings.
fn find_house_site(world: &World, owner: PlayerId) -> Option<CellCoord> {
    for building in world.buildings.values() {
        let side = building.side() as i32;
        for ring in 2..=3 {
            for candidate in ring_origins(building.origin, side, ring) {
                if placement::validate(
                    &world.map,
                    &world.build_occupancy,
                    &world.buildings,
                    owner,
                    BuildingKind::House,
                    candidate,
                )
                .is_ok()
                {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

fn ring_origins(origin: CellCoord, side: i32, ring: i32) -> Vec<CellCoord> {
    let min_x = origin.x() - ring;
    let min_y = origin.y() - ring;
    let max_x = origin.x() + side - 1 + ring;
    let max_y = origin.y() + side - 1 + ring;

    let mut cells = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if x == min_x || x == max_x || y == min_y || y == max_y {
                cells.push(CellCoord::new(x, y));
            }
        }
    }
    cells
}
