//! Unit entities, the unit behavior engine, and the movement step.
//!
//! One match-based function advances the behavior machine; a second,
//! type-independent function advances movement along the queued path. Both
//! return a [`PathDirective`] instead of touching the pathfinder so the
//! orchestrator can batch searches against post-step occupancy.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use crownhold_core::{
    BuildingId, CellCoord, EntityTag, Event, MapDefinition, PathDirective, PlayerId, UnitBehavior,
    UnitId, UnitKind, UnitLocation, UnitType, WorldPoint,
};

use crate::buildings::Building;

/// World-unit radius around the home exit that counts as arrival.
pub(crate) const ARRIVAL_RADIUS: f32 = 32.0;
/// Minimum in-range time between successive repair contributions.
const REPAIR_INTERVAL: Duration = Duration::from_millis(150);
/// Hit points contributed per repair tick.
const REPAIR_AMOUNT: f32 = 5.0;
/// Time a garrisoned sleeper rests before looking for work again.
const SLEEP_DURATION: Duration = Duration::from_secs(1);
/// Fraction of max hp restored per second of sleep.
const SLEEP_HEAL_PER_SECOND: f32 = 0.1;

/// A mobile inhabitant of the city.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) owner: PlayerId,
    pub(crate) kind: UnitKind,
    pub(crate) unit_type: UnitType,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) movement_speed: f32,
    pub(crate) location: UnitLocation,
    pub(crate) path: VecDeque<CellCoord>,
    pub(crate) target_destination: Option<CellCoord>,
    pub(crate) behavior: UnitBehavior,
    pub(crate) behavior_timer: Duration,
    pub(crate) behavior_duration: Duration,
    pub(crate) home_building: Option<BuildingId>,
    pub(crate) tags: BTreeSet<EntityTag>,
}

impl Unit {
    /// Creates a freshly spawned unit housed inside its home building.
    pub(crate) fn new_garrisoned(
        id: UnitId,
        owner: PlayerId,
        unit_type: UnitType,
        home: BuildingId,
    ) -> Self {
        let max_hp = max_hp_for(unit_type);
        Self {
            id,
            owner,
            kind: unit_type.kind(),
            unit_type,
            hp: max_hp,
            max_hp,
            movement_speed: movement_speed_for(unit_type),
            location: UnitLocation::Garrisoned(home),
            path: VecDeque::new(),
            target_destination: None,
            behavior: UnitBehavior::LookingForTask,
            behavior_timer: Duration::ZERO,
            behavior_duration: Duration::ZERO,
            home_building: Some(home),
            tags: tags_for(unit_type),
        }
    }
}

/// A pending hit-point donation toward one building.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RepairContribution {
    pub(crate) building: BuildingId,
    pub(crate) amount: f32,
}

/// Advances the unit's behavior machine by one simulation step.
pub(crate) fn update_behavior(
    unit: &mut Unit,
    buildings: &BTreeMap<BuildingId, Building>,
    map: &MapDefinition,
    dt: Duration,
    repairs: &mut Vec<RepairContribution>,
    out_events: &mut Vec<Event>,
) -> PathDirective {
    match unit.behavior.clone() {
        UnitBehavior::Dead | UnitBehavior::DebugError(_) => PathDirective::None,
        UnitBehavior::WithoutHome => without_home(unit, dt, out_events),
        UnitBehavior::LookingForTask => looking_for_task(unit),
        UnitBehavior::GoingToSleep => going_to_sleep(unit, buildings, map),
        UnitBehavior::Sleeping => sleeping(unit, dt),
        UnitBehavior::LookForBuildRepairTarget => look_for_repair_target(unit, buildings, map),
        UnitBehavior::MovingToBuildRepairTarget(target) => {
            moving_to_repair_target(unit, buildings, map, target)
        }
        UnitBehavior::Repairing(target) => repairing(unit, buildings, map, dt, target, repairs),
    }
}

fn without_home(unit: &mut Unit, dt: Duration, out_events: &mut Vec<Event>) -> PathDirective {
    if unit.home_building.is_some() {
        enter(unit, UnitBehavior::LookingForTask, Duration::ZERO);
        return PathDirective::None;
    }

    unit.behavior_timer = unit.behavior_timer.saturating_add(dt);
    if unit.behavior_timer >= unit.behavior_duration {
        unit.hp = 0.0;
        unit.path.clear();
        unit.target_destination = None;
        enter(unit, UnitBehavior::Dead, Duration::ZERO);
        out_events.push(Event::UnitDied { unit: unit.id });
    }
    PathDirective::None
}

fn looking_for_task(unit: &mut Unit) -> PathDirective {
    match unit.unit_type {
        UnitType::Peasant => enter(unit, UnitBehavior::LookForBuildRepairTarget, Duration::ZERO),
        // Tax collection route not built yet; collectors rest instead.
        UnitType::TaxCollector => enter(unit, UnitBehavior::GoingToSleep, Duration::ZERO),
        UnitType::CastleGuard | UnitType::Warrior => {
            enter(unit, UnitBehavior::GoingToSleep, Duration::ZERO)
        }
    }
    PathDirective::None
}

fn going_to_sleep(
    unit: &mut Unit,
    buildings: &BTreeMap<BuildingId, Building>,
    map: &MapDefinition,
) -> PathDirective {
    match unit.location {
        UnitLocation::Garrisoned(_) => {
            enter(unit, UnitBehavior::Sleeping, SLEEP_DURATION);
            PathDirective::None
        }
        UnitLocation::OnMap(position) => {
            let Some(home_id) = unit.home_building else {
                let decay = without_home_duration(unit.id);
                enter(unit, UnitBehavior::WithoutHome, decay);
                return PathDirective::None;
            };
            let Some(home) = buildings.get(&home_id) else {
                debug_error(unit, "home building missing while walking home");
                return PathDirective::None;
            };

            let exit = home.exit_cell(map);
            if position.distance_to(map.path_cell_center(exit)) <= ARRIVAL_RADIUS {
                unit.location = UnitLocation::Garrisoned(home_id);
                unit.path.clear();
                unit.target_destination = None;
                return PathDirective::None;
            }

            if unit.target_destination != Some(exit) {
                return PathDirective::Request(exit);
            }
            PathDirective::None
        }
    }
}

fn sleeping(unit: &mut Unit, dt: Duration) -> PathDirective {
    let heal = unit.max_hp * SLEEP_HEAL_PER_SECOND * dt.as_secs_f32();
    unit.hp = (unit.hp + heal).min(unit.max_hp);
    unit.behavior_timer = unit.behavior_timer.saturating_add(dt);
    if unit.behavior_timer >= unit.behavior_duration {
        enter(unit, UnitBehavior::LookingForTask, Duration::ZERO);
    }
    PathDirective::None
}

fn look_for_repair_target(
    unit: &mut Unit,
    buildings: &BTreeMap<BuildingId, Building>,
    map: &MapDefinition,
) -> PathDirective {
    if let UnitLocation::Garrisoned(host_id) = unit.location {
        let Some(host) = buildings.get(&host_id) else {
            debug_error(unit, "home building vanished while garrisoned");
            return PathDirective::None;
        };
        unit.location = UnitLocation::OnMap(map.path_cell_center(host.exit_cell(map)));
    }
    let UnitLocation::OnMap(position) = unit.location else {
        return PathDirective::None;
    };

    let target = buildings
        .values()
        .filter(|building| building.owner == unit.owner && building.is_damaged())
        .min_by(|a, b| {
            let da = a.center(map).distance_to(position);
            let db = b.center(map).distance_to(position);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        });

    match target {
        Some(target) => {
            let goal = map.world_to_path_cell(target.center(map));
            enter(
                unit,
                UnitBehavior::MovingToBuildRepairTarget(target.id),
                Duration::ZERO,
            );
            PathDirective::Request(goal)
        }
        None => {
            enter(unit, UnitBehavior::GoingToSleep, Duration::ZERO);
            PathDirective::None
        }
    }
}

fn moving_to_repair_target(
    unit: &mut Unit,
    buildings: &BTreeMap<BuildingId, Building>,
    map: &MapDefinition,
    target_id: BuildingId,
) -> PathDirective {
    let Some(target) = buildings.get(&target_id) else {
        enter(unit, UnitBehavior::LookForBuildRepairTarget, Duration::ZERO);
        return PathDirective::None;
    };
    if !target.is_damaged() {
        enter(unit, UnitBehavior::LookForBuildRepairTarget, Duration::ZERO);
        return PathDirective::None;
    }

    let UnitLocation::OnMap(position) = unit.location else {
        debug_error(unit, "movement requested while garrisoned");
        return PathDirective::None;
    };

    if target
        .world_rect(map)
        .expanded(target.active_radius)
        .contains(position)
    {
        unit.path.clear();
        unit.target_destination = None;
        enter(unit, UnitBehavior::Repairing(target_id), REPAIR_INTERVAL);
        return PathDirective::None;
    }

    if unit.path.is_empty() {
        return PathDirective::Request(map.world_to_path_cell(target.center(map)));
    }
    PathDirective::None
}

fn repairing(
    unit: &mut Unit,
    buildings: &BTreeMap<BuildingId, Building>,
    map: &MapDefinition,
    dt: Duration,
    target_id: BuildingId,
    repairs: &mut Vec<RepairContribution>,
) -> PathDirective {
    let Some(target) = buildings.get(&target_id) else {
        enter(unit, UnitBehavior::LookForBuildRepairTarget, Duration::ZERO);
        return PathDirective::None;
    };
    if !target.is_damaged() {
        enter(unit, UnitBehavior::LookForBuildRepairTarget, Duration::ZERO);
        return PathDirective::None;
    }

    let UnitLocation::OnMap(position) = unit.location else {
        debug_error(unit, "movement requested while garrisoned");
        return PathDirective::None;
    };

    if !target
        .world_rect(map)
        .expanded(target.active_radius)
        .contains(position)
    {
        enter(
            unit,
            UnitBehavior::MovingToBuildRepairTarget(target_id),
            Duration::ZERO,
        );
        return PathDirective::None;
    }

    unit.behavior_timer = unit.behavior_timer.saturating_add(dt);
    if unit.behavior_timer >= unit.behavior_duration {
        unit.behavior_timer -= unit.behavior_duration;
        repairs.push(RepairContribution {
            building: target_id,
            amount: REPAIR_AMOUNT,
        });
    }
    PathDirective::None
}

/// Advances the unit along its queued path by one simulation step.
///
/// The unit walks toward the head cell's center at `movement_speed ×
/// pathfinding cell size` world units per second, snapping onto each center
/// it reaches and popping the cell; a generous budget may consume several
/// cells in one step. A queued route is never assumed valid across ticks:
/// when the head cell has become blocked the path is dropped and a fresh one
/// requested, and when the queue drains with a longer-range destination
/// still standing, a fresh route is requested from the new position.
pub(crate) fn update_movement<F>(
    unit: &mut Unit,
    map: &MapDefinition,
    dt: Duration,
    is_blocked: F,
) -> PathDirective
where
    F: Fn(CellCoord) -> bool,
{
    match unit.location {
        UnitLocation::Garrisoned(_) => {
            if !unit.path.is_empty() {
                debug_error(unit, "movement requested while garrisoned");
            }
            PathDirective::None
        }
        UnitLocation::OnMap(start) => {
            let mut position = start;
            let mut budget = unit.movement_speed * map.path_cell() as f32 * dt.as_secs_f32();

            while budget > 0.0 {
                let Some(next) = unit.path.front().copied() else {
                    break;
                };
                if is_blocked(next) {
                    unit.path.clear();
                    break;
                }
                let center = map.path_cell_center(next);
                let distance = position.distance_to(center);
                if distance <= budget {
                    position = center;
                    let _ = unit.path.pop_front();
                    budget -= distance;
                } else {
                    let fraction = budget / distance;
                    position = WorldPoint::new(
                        position.x() + (center.x() - position.x()) * fraction,
                        position.y() + (center.y() - position.y()) * fraction,
                    );
                    budget = 0.0;
                }
            }

            unit.location = UnitLocation::OnMap(position);

            if unit.path.is_empty() {
                if let Some(destination) = unit.target_destination {
                    if map.world_to_path_cell(position) == destination {
                        unit.target_destination = None;
                    } else {
                        return PathDirective::Request(destination);
                    }
                }
            }
            PathDirective::None
        }
    }
}

/// Homeless decay duration, derived deterministically from the unit id.
pub(crate) fn without_home_duration(id: UnitId) -> Duration {
    Duration::from_secs(30 + u64::from(id.get() % 31))
}

/// Maximum hit points associated with a unit type.
pub(crate) fn max_hp_for(unit_type: UnitType) -> f32 {
    match unit_type {
        UnitType::Peasant | UnitType::TaxCollector => 60.0,
        UnitType::CastleGuard => 220.0,
        UnitType::Warrior => 160.0,
    }
}

/// Movement speed multiplier associated with a unit type.
pub(crate) fn movement_speed_for(unit_type: UnitType) -> f32 {
    match unit_type {
        UnitType::Peasant | UnitType::TaxCollector => 1.4,
        UnitType::CastleGuard => 0.9,
        UnitType::Warrior => 1.1,
    }
}

fn tags_for(unit_type: UnitType) -> BTreeSet<EntityTag> {
    let tag = match unit_type.kind() {
        UnitKind::Civilian => EntityTag::Civilian,
        UnitKind::Military => EntityTag::Military,
    };
    [tag].into_iter().collect()
}

fn enter(unit: &mut Unit, behavior: UnitBehavior, duration: Duration) {
    unit.behavior = behavior;
    unit.behavior_timer = Duration::ZERO;
    unit.behavior_duration = duration;
}

fn debug_error(unit: &mut Unit, message: &str) {
    unit.path.clear();
    unit.target_destination = None;
    enter(
        unit,
        UnitBehavior::DebugError(message.to_owned()),
        Duration::ZERO,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crownhold_core::{BuildingKind, SIMULATION_STEP};

    const SEED: u64 = 0x77aa_1204;

    fn map() -> MapDefinition {
        MapDefinition::new(4992, 4992, 64, 32)
    }

    fn city_with_castle() -> BTreeMap<BuildingId, Building> {
        let castle = Building::new(
            BuildingId::new(0),
            PlayerId::new(0),
            BuildingKind::Castle,
            CellCoord::new(30, 30),
            SEED,
        );
        let mut buildings = BTreeMap::new();
        let _ = buildings.insert(castle.id, castle);
        buildings
    }

    fn add_house(buildings: &mut BTreeMap<BuildingId, Building>, origin: CellCoord) -> BuildingId {
        let id = BuildingId::new(buildings.len() as u32);
        let house = Building::new(id, PlayerId::new(0), BuildingKind::House, origin, SEED);
        let _ = buildings.insert(id, house);
        id
    }

    fn peasant() -> Unit {
        Unit::new_garrisoned(
            UnitId::new(0),
            PlayerId::new(0),
            UnitType::Peasant,
            BuildingId::new(0),
        )
    }

    fn step_behavior(
        unit: &mut Unit,
        buildings: &BTreeMap<BuildingId, Building>,
        repairs: &mut Vec<RepairContribution>,
    ) -> PathDirective {
        let mut events = Vec::new();
        update_behavior(
            unit,
            buildings,
            &map(),
            SIMULATION_STEP,
            repairs,
            &mut events,
        )
    }

    #[test]
    fn peasants_dispatch_to_repair_seeking() {
        let buildings = city_with_castle();
        let mut unit = peasant();
        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());
        assert_eq!(unit.behavior, UnitBehavior::LookForBuildRepairTarget);
    }

    #[test]
    fn guards_and_collectors_dispatch_to_sleep() {
        let buildings = city_with_castle();
        for unit_type in [UnitType::CastleGuard, UnitType::TaxCollector] {
            let mut unit = Unit::new_garrisoned(
                UnitId::new(1),
                PlayerId::new(0),
                unit_type,
                BuildingId::new(0),
            );
            let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());
            assert_eq!(unit.behavior, UnitBehavior::GoingToSleep);
        }
    }

    #[test]
    fn garrisoned_sleeper_heals_and_wakes_after_one_second() {
        let buildings = city_with_castle();
        let mut unit = peasant();
        unit.hp = 30.0;
        unit.behavior = UnitBehavior::GoingToSleep;

        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());
        assert_eq!(unit.behavior, UnitBehavior::Sleeping);

        for _ in 0..20 {
            let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());
        }

        // 10% of 60 max hp over one simulated second.
        assert!((unit.hp - 36.0).abs() < 1e-3, "hp: {}", unit.hp);
        assert_eq!(unit.behavior, UnitBehavior::LookingForTask);
    }

    #[test]
    fn walking_sleeper_requests_route_to_home_exit() {
        let buildings = city_with_castle();
        let exit = buildings[&BuildingId::new(0)].exit_cell(&map());
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(WorldPoint::new(100.0, 100.0));
        unit.behavior = UnitBehavior::GoingToSleep;

        let directive = step_behavior(&mut unit, &buildings, &mut Vec::new());

        assert_eq!(directive, PathDirective::Request(exit));
        assert_eq!(unit.behavior, UnitBehavior::GoingToSleep);
    }

    #[test]
    fn sleeper_garrisons_within_arrival_radius() {
        let buildings = city_with_castle();
        let exit = buildings[&BuildingId::new(0)].exit_cell(&map());
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(map().path_cell_center(exit));
        unit.behavior = UnitBehavior::GoingToSleep;

        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());

        assert_eq!(unit.location, UnitLocation::Garrisoned(BuildingId::new(0)));
        assert!(unit.path.is_empty());
    }

    #[test]
    fn homeless_units_decay_to_dead_on_schedule() {
        let buildings = city_with_castle();
        let mut unit = peasant();
        unit.home_building = None;
        unit.location = UnitLocation::OnMap(WorldPoint::new(500.0, 500.0));
        unit.behavior = UnitBehavior::WithoutHome;
        unit.behavior_duration = without_home_duration(unit.id);

        let decay_ticks = without_home_duration(unit.id).as_millis() as usize / 50;
        let mut died = Vec::new();
        for _ in 0..decay_ticks {
            let mut events = Vec::new();
            let _ = update_behavior(
                &mut unit,
                &buildings,
                &map(),
                SIMULATION_STEP,
                &mut Vec::new(),
                &mut events,
            );
            died.extend(events);
        }

        assert_eq!(unit.behavior, UnitBehavior::Dead);
        assert_eq!(unit.hp, 0.0);
        assert_eq!(died, vec![Event::UnitDied { unit: unit.id }]);
    }

    #[test]
    fn peasant_exits_garrison_toward_nearest_damaged_building() {
        let mut buildings = city_with_castle();
        let house = add_house(&mut buildings, CellCoord::new(32, 35));
        let mut unit = peasant();
        unit.behavior = UnitBehavior::LookForBuildRepairTarget;

        let directive = step_behavior(&mut unit, &buildings, &mut Vec::new());

        let expected_goal = map().world_to_path_cell(buildings[&house].center(&map()));
        assert_eq!(unit.behavior, UnitBehavior::MovingToBuildRepairTarget(house));
        assert!(matches!(unit.location, UnitLocation::OnMap(_)));
        assert_eq!(directive, PathDirective::Request(expected_goal));
    }

    #[test]
    fn without_damaged_buildings_repair_seeker_goes_home() {
        let buildings = city_with_castle();
        let mut unit = peasant();
        unit.behavior = UnitBehavior::LookForBuildRepairTarget;

        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());

        assert_eq!(unit.behavior, UnitBehavior::GoingToSleep);
    }

    #[test]
    fn mover_switches_to_repairing_inside_expanded_bounds() {
        let mut buildings = city_with_castle();
        let house = add_house(&mut buildings, CellCoord::new(32, 35));
        let near = buildings[&house].world_rect(&map()).expanded(40.0).min();
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(near);
        unit.behavior = UnitBehavior::MovingToBuildRepairTarget(house);

        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());

        assert_eq!(unit.behavior, UnitBehavior::Repairing(house));
    }

    #[test]
    fn repairing_contributes_every_interval() {
        let mut buildings = city_with_castle();
        let house = add_house(&mut buildings, CellCoord::new(32, 35));
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(buildings[&house].center(&map()));
        unit.behavior = UnitBehavior::Repairing(house);
        unit.behavior_duration = Duration::from_millis(150);

        let mut repairs = Vec::new();
        for _ in 0..6 {
            let _ = step_behavior(&mut unit, &buildings, &mut repairs);
        }

        assert_eq!(
            repairs,
            vec![
                RepairContribution {
                    building: house,
                    amount: 5.0
                };
                2
            ]
        );
    }

    #[test]
    fn repairing_reselects_once_target_is_whole() {
        let mut buildings = city_with_castle();
        let house = add_house(&mut buildings, CellCoord::new(32, 35));
        if let Some(building) = buildings.get_mut(&house) {
            building.hp = building.max_hp;
        }
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(buildings[&house].center(&map()));
        unit.behavior = UnitBehavior::Repairing(house);

        let _ = step_behavior(&mut unit, &buildings, &mut Vec::new());

        assert_eq!(unit.behavior, UnitBehavior::LookForBuildRepairTarget);
    }

    #[test]
    fn movement_reaches_each_center_exactly_on_schedule() {
        let map = map();
        let mut unit = peasant();
        unit.movement_speed = 2.0;
        unit.location = UnitLocation::OnMap(WorldPoint::new(16.0, 16.0));
        unit.path = VecDeque::from(vec![
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ]);

        // 96 world units at 2.0 x 32 units/sec: 1.5 s, thirty 50 ms steps.
        for _ in 0..29 {
            let _ = update_movement(&mut unit, &map, SIMULATION_STEP, |_| false);
        }
        assert_ne!(
            unit.location,
            UnitLocation::OnMap(WorldPoint::new(112.0, 16.0))
        );

        let _ = update_movement(&mut unit, &map, SIMULATION_STEP, |_| false);
        assert_eq!(
            unit.location,
            UnitLocation::OnMap(WorldPoint::new(112.0, 16.0))
        );
        assert!(unit.path.is_empty());
    }

    #[test]
    fn drained_path_rederives_standing_destination() {
        let map = map();
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(WorldPoint::new(16.0, 16.0));
        unit.target_destination = Some(CellCoord::new(5, 5));

        let directive = update_movement(&mut unit, &map, SIMULATION_STEP, |_| false);

        assert_eq!(directive, PathDirective::Request(CellCoord::new(5, 5)));
    }

    #[test]
    fn blocked_head_cell_drops_the_stale_path() {
        let map = map();
        let mut unit = peasant();
        unit.location = UnitLocation::OnMap(WorldPoint::new(16.0, 16.0));
        unit.path = VecDeque::from(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        unit.target_destination = Some(CellCoord::new(2, 0));

        let directive = update_movement(&mut unit, &map, SIMULATION_STEP, |cell| {
            cell == CellCoord::new(1, 0)
        });

        assert!(unit.path.is_empty(), "a blocked route is never walked");
        assert_eq!(directive, PathDirective::Request(CellCoord::new(2, 0)));
        assert_eq!(
            unit.location,
            UnitLocation::OnMap(WorldPoint::new(16.0, 16.0))
        );
    }

    #[test]
    fn queued_path_while_garrisoned_trips_the_sentinel() {
        let map = map();
        let mut unit = peasant();
        unit.path = VecDeque::from(vec![CellCoord::new(1, 0)]);

        let _ = update_movement(&mut unit, &map, SIMULATION_STEP, |_| false);

        assert!(matches!(unit.behavior, UnitBehavior::DebugError(_)));
        assert!(unit.path.is_empty());
    }
}
