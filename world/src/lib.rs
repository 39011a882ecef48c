#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crownhold.
//!
//! All mutation flows through [`apply`]; all observation flows through
//! [`query`]. One call to [`apply`] with [`Command::Step`] executes exactly
//! one 50 ms simulation step, run to completion, with the world as the sole
//! mutator throughout.

mod buildings;
mod occupancy;
mod placement;
mod rng;
mod step;
mod units;

use std::collections::BTreeMap;

use crownhold_core::{
    BuildingId, BuildingKind, CellCoord, Command, Event, GameState, MapDefinition, PlacementError,
    PlayerId, SimSpeed, UnitId, UnitType,
};

use crate::buildings::Building;
use crate::occupancy::OccupancyMap;
use crate::units::Unit;

const DEFAULT_WORLD_SEED: u64 = 0x7c1e_55a0_93d2_4b11;

/// Represents the authoritative Crownhold world state.
#[derive(Debug)]
pub struct World {
    pub(crate) map: MapDefinition,
    pub(crate) seed: u64,
    pub(crate) speed: SimSpeed,
    pub(crate) game: GameState,
    pub(crate) gold: u32,
    pub(crate) buildings: BTreeMap<BuildingId, Building>,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) build_occupancy: OccupancyMap,
    pub(crate) path_occupancy: OccupancyMap,
    next_building_id: BuildingId,
    next_unit_id: UnitId,
    pub(crate) tick_index: u64,
}

impl World {
    /// Creates a new world over the provided map with the default seed.
    #[must_use]
    pub fn new(map: MapDefinition, starting_gold: u32) -> Self {
        Self::with_seed(map, starting_gold, DEFAULT_WORLD_SEED)
    }

    /// Creates a new world with an explicit seed for cadence derivation.
    #[must_use]
    pub fn with_seed(map: MapDefinition, starting_gold: u32, seed: u64) -> Self {
        Self {
            map,
            seed,
            speed: SimSpeed::Normal,
            game: GameState::PreGame,
            gold: starting_gold,
            buildings: BTreeMap::new(),
            units: BTreeMap::new(),
            build_occupancy: OccupancyMap::new(),
            path_occupancy: OccupancyMap::new(),
            next_building_id: BuildingId::new(0),
            next_unit_id: UnitId::new(0),
            tick_index: 0,
        }
    }

    pub(crate) fn allocate_building_id(&mut self) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get() + 1);
        id
    }

    pub(crate) fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get() + 1);
        id
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Step => {
            if world.game == GameState::GameOver {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            step::execute(world, out_events);
        }
        Command::SetSpeed { speed } => {
            world.speed = speed;
            out_events.push(Event::SpeedChanged { speed });
        }
        Command::PlaceBuilding {
            owner,
            kind,
            origin,
        } => place_building(world, owner, kind, origin, out_events),
    }
}

fn place_building(
    world: &mut World,
    owner: PlayerId,
    kind: BuildingKind,
    origin: CellCoord,
    out_events: &mut Vec<Event>,
) {
    if world.game == GameState::GameOver {
        out_events.push(Event::PlacementRejected {
            kind,
            origin,
            reason: PlacementError::GameOver,
        });
        return;
    }

    if let Err(reason) = placement::validate(
        &world.map,
        &world.build_occupancy,
        &world.buildings,
        owner,
        kind,
        origin,
    ) {
        out_events.push(Event::PlacementRejected {
            kind,
            origin,
            reason,
        });
        return;
    }

    let cost = buildings::cost_for(kind);
    if world.gold < cost {
        out_events.push(Event::PlacementRejected {
            kind,
            origin,
            reason: PlacementError::InsufficientGold,
        });
        return;
    }
    world.gold -= cost;

    let building_id = world.allocate_building_id();
    let building = Building::new(building_id, owner, kind, origin, world.seed);
    let side = building.side();
    world
        .build_occupancy
        .increment(&occupancy::building_build_cells(origin, side));
    world
        .path_occupancy
        .increment(&occupancy::building_path_cells(&world.map, origin, side));
    let complete = buildings::starts_complete(kind);
    let _ = world.buildings.insert(building_id, building);
    out_events.push(Event::BuildingPlaced {
        building: building_id,
        kind,
        origin,
    });

    if world.game == GameState::PreGame {
        world.game = GameState::Playing;
        out_events.push(Event::GameStarted);
    }

    // Kinds placed complete staff every garrison slot immediately; kinds
    // placed under construction fill through the spawn timers instead.
    if complete {
        let slot_types: Vec<UnitType> = match world.buildings.get_mut(&building_id) {
            Some(building) => {
                let types = building
                    .garrison
                    .iter_mut()
                    .map(|slot| {
                        slot.current_count = 1;
                        slot.unit_type
                    })
                    .collect();
                building.recompute_garrison_occupied();
                types
            }
            None => Vec::new(),
        };
        for unit_type in slot_types {
            spawn_garrisoned_unit(world, building_id, unit_type, out_events);
        }
    }
}

pub(crate) fn spawn_garrisoned_unit(
    world: &mut World,
    building_id: BuildingId,
    unit_type: UnitType,
    out_events: &mut Vec<Event>,
) {
    let Some(owner) = world.buildings.get(&building_id).map(|b| b.owner) else {
        return;
    };
    let unit_id = world.allocate_unit_id();
    let unit = Unit::new_garrisoned(unit_id, owner, unit_type, building_id);
    let _ = world.units.insert(unit_id, unit);
    out_events.push(Event::UnitSpawned {
        unit: unit_id,
        unit_type,
        building: building_id,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use crownhold_core::{
        BuildingBehavior, BuildingId, BuildingKind, CellCoord, EntityTag, GameState,
        MapDefinition, PlacementError, PlayerId, SimSpeed, SizeClass, UnitBehavior, UnitId,
        UnitKind, UnitLocation, UnitType, WorldPoint,
    };

    use super::{buildings, occupancy::OccupancyMap, placement, World};

    /// Map geometry the world simulates over.
    #[must_use]
    pub fn map(world: &World) -> MapDefinition {
        world.map
    }

    /// High-level phase the game session is in.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.game
    }

    /// Gold available to the player for placements.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Speed multiplier most recently adopted by the world.
    #[must_use]
    pub fn speed(world: &World) -> SimSpeed {
        world.speed
    }

    /// Number of simulation steps executed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Gold price charged when placing the provided kind.
    #[must_use]
    pub fn building_cost(kind: BuildingKind) -> u32 {
        buildings::cost_for(kind)
    }

    /// Validity verdict for a placement candidate, without side effects.
    ///
    /// Mirrors the placement rules exactly so input adapters can preview a
    /// candidate before submitting the command. Gold is not considered.
    pub fn placement_preview(
        world: &World,
        owner: PlayerId,
        kind: BuildingKind,
        origin: CellCoord,
    ) -> Result<(), PlacementError> {
        placement::validate(
            &world.map,
            &world.build_occupancy,
            &world.buildings,
            owner,
            kind,
            origin,
        )
    }

    /// Captures a read-only view of all buildings, sorted by id.
    #[must_use]
    pub fn building_view(world: &World) -> BuildingView {
        let snapshots = world
            .buildings
            .values()
            .map(|building| BuildingSnapshot {
                id: building.id,
                owner: building.owner,
                kind: building.kind,
                origin: building.origin,
                size: building.size,
                hp: building.hp,
                max_hp: building.max_hp,
                behavior: building.behavior,
                garrison_occupied: building.garrison_occupied,
                coffer: building.coffer,
                tags: building.tags.clone(),
                center: building.center(&world.map),
            })
            .collect();
        BuildingView { snapshots }
    }

    /// Captures a read-only view of all units, sorted by id.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        let snapshots = world
            .units
            .values()
            .map(|unit| UnitSnapshot {
                id: unit.id,
                owner: unit.owner,
                kind: unit.kind,
                unit_type: unit.unit_type,
                hp: unit.hp,
                max_hp: unit.max_hp,
                movement_speed: unit.movement_speed,
                location: unit.location,
                behavior: unit.behavior.clone(),
                next_hop: unit.path.front().copied(),
                target_destination: unit.target_destination,
                home_building: unit.home_building,
                tags: unit.tags.clone(),
            })
            .collect();
        UnitView { snapshots }
    }

    /// Exposes a read-only view of the coarse build-grid occupancy.
    #[must_use]
    pub fn build_occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            map: &world.build_occupancy,
        }
    }

    /// Exposes a read-only view of the fine pathfinding-grid occupancy.
    #[must_use]
    pub fn path_occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            map: &world.path_occupancy,
        }
    }

    /// Nearest building to the provided world position, by footprint center.
    #[must_use]
    pub fn nearest_building(world: &World, point: WorldPoint) -> Option<BuildingId> {
        world
            .buildings
            .values()
            .min_by(|a, b| {
                let da = a.center(&world.map).distance_to(point);
                let db = b.center(&world.map).distance_to(point);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|building| building.id)
    }

    /// Nearest on-map unit to the provided world position.
    ///
    /// Garrisoned units have no map position and are never returned.
    #[must_use]
    pub fn nearest_unit(world: &World, point: WorldPoint) -> Option<UnitId> {
        world
            .units
            .values()
            .filter_map(|unit| match unit.location {
                UnitLocation::OnMap(position) => Some((unit.id, position.distance_to(point))),
                UnitLocation::Garrisoned(_) => None,
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }

    /// Read-only snapshot describing all buildings in the world.
    #[derive(Clone, Debug)]
    pub struct BuildingView {
        snapshots: Vec<BuildingSnapshot>,
    }

    impl BuildingView {
        /// Iterator over the captured snapshots in id order.
        pub fn iter(&self) -> impl Iterator<Item = &BuildingSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<BuildingSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single building used for queries.
    #[derive(Clone, Debug)]
    pub struct BuildingSnapshot {
        /// Identifier allocated to the building by the world.
        pub id: BuildingId,
        /// Player that owns the building.
        pub owner: PlayerId,
        /// Kind of building that was constructed.
        pub kind: BuildingKind,
        /// Upper-left build-grid cell anchoring the footprint.
        pub origin: CellCoord,
        /// Footprint size class.
        pub size: SizeClass,
        /// Current hit points.
        pub hp: f32,
        /// Maximum hit points.
        pub max_hp: f32,
        /// Behavior state the building is in.
        pub behavior: BuildingBehavior,
        /// Sum of garrison slot counts.
        pub garrison_occupied: u32,
        /// Gold accumulated in the building's coffer.
        pub coffer: u32,
        /// Labels attached to the building.
        pub tags: BTreeSet<EntityTag>,
        /// World-space center of the footprint.
        pub center: WorldPoint,
    }

    /// Read-only snapshot describing all units in the world.
    #[derive(Clone, Debug)]
    pub struct UnitView {
        snapshots: Vec<UnitSnapshot>,
    }

    impl UnitView {
        /// Iterator over the captured snapshots in id order.
        pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<UnitSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single unit used for queries.
    #[derive(Clone, Debug)]
    pub struct UnitSnapshot {
        /// Unique identifier assigned to the unit.
        pub id: UnitId,
        /// Player that owns the unit.
        pub owner: PlayerId,
        /// Broad classification the unit belongs to.
        pub kind: UnitKind,
        /// Specific unit type.
        pub unit_type: UnitType,
        /// Current hit points.
        pub hp: f32,
        /// Maximum hit points.
        pub max_hp: f32,
        /// Movement speed multiplier.
        pub movement_speed: f32,
        /// Where the unit currently resides.
        pub location: UnitLocation,
        /// Behavior state the unit is in.
        pub behavior: UnitBehavior,
        /// Head of the queued path, if any.
        pub next_hop: Option<CellCoord>,
        /// Longer-range destination the unit is traveling toward.
        pub target_destination: Option<CellCoord>,
        /// Building the unit calls home, if any.
        pub home_building: Option<BuildingId>,
        /// Labels attached to the unit.
        pub tags: BTreeSet<EntityTag>,
    }

    /// Read-only view into one reference-counted occupancy map.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        map: &'a OccupancyMap,
    }

    impl OccupancyView<'_> {
        /// Reports whether any footprint currently claims the cell.
        #[must_use]
        pub fn is_occupied(&self, cell: CellCoord) -> bool {
            self.map.is_occupied(cell)
        }

        /// Reference count recorded for the cell; zero when absent.
        #[must_use]
        pub fn count(&self, cell: CellCoord) -> u32 {
            self.map.count(cell)
        }

        /// Number of cells holding a positive count.
        #[must_use]
        pub fn len(&self) -> usize {
            self.map.len()
        }

        /// Reports whether no cell holds a positive count.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.map.len() == 0
        }

        /// Occupied cells and their counts, in coordinate order.
        pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
            self.map.entries()
        }
    }
}
