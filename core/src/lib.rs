#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crownhold engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Crownhold.";

/// Fixed simulated timestep consumed by a single [`Command::Step`].
pub const SIMULATION_STEP: Duration = Duration::from_millis(50);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by exactly one fixed 50 ms step.
    Step,
    /// Requests placement of a building anchored at the provided origin cell.
    PlaceBuilding {
        /// Player submitting the placement request.
        owner: PlayerId,
        /// Kind of building to construct at the origin.
        kind: BuildingKind,
        /// Upper-left build-grid cell that anchors the footprint.
        origin: CellCoord,
    },
    /// Requests that the simulation adopt the provided speed multiplier.
    SetSpeed {
        /// Speed the simulation should activate.
        speed: SimSpeed,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one step.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the step.
        dt: Duration,
    },
    /// Announces that the simulation adopted a new speed multiplier.
    SpeedChanged {
        /// Speed that became active after processing commands.
        speed: SimSpeed,
    },
    /// Confirms that the first building was placed and play began.
    GameStarted,
    /// Reports that an objective building fell and the game is over.
    GameEnded {
        /// Objective building whose destruction ended the game.
        building: BuildingId,
    },
    /// Confirms that a building was placed into the world.
    BuildingPlaced {
        /// Identifier assigned to the building by the world.
        building: BuildingId,
        /// Kind of building that was placed.
        kind: BuildingKind,
        /// Upper-left build-grid cell anchoring the footprint.
        origin: CellCoord,
    },
    /// Reports that a building placement request was rejected.
    PlacementRejected {
        /// Kind of building requested for placement.
        kind: BuildingKind,
        /// Origin cell provided in the placement request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a building under construction reached full hit points.
    ConstructionCompleted {
        /// Building whose construction completed.
        building: BuildingId,
    },
    /// Confirms that a castle seeded a new house into the city.
    HouseSpawned {
        /// Castle that requested the house.
        castle: BuildingId,
        /// Identifier assigned to the new house.
        house: BuildingId,
        /// Upper-left build-grid cell anchoring the house.
        origin: CellCoord,
    },
    /// Confirms that a garrison slot produced a new unit.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Type of unit that was produced.
        unit_type: UnitType,
        /// Building whose garrison produced the unit.
        building: BuildingId,
    },
    /// Reports that a unit reached its terminal state.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
    },
    /// Reports that a building generated gold into its coffer.
    GoldCollected {
        /// Building whose coffer grew.
        building: BuildingId,
        /// Amount of gold added to the coffer.
        amount: u32,
    },
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as signed x and y indices.
///
/// Cell indices are signed because a unit's circular footprint near the map
/// edge may straddle into the fringe just outside the playable area; those
/// fringe cells carry occupancy but never pass walkability checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell offset by the provided deltas.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

/// Position expressed in continuous world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component measured in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component measured in world units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two world-space points.
    #[must_use]
    pub fn distance_to(&self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    min: WorldPoint,
    max: WorldPoint,
}

impl WorldRect {
    /// Constructs a rectangle from its minimum and maximum corners.
    #[must_use]
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    /// Minimum corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> WorldPoint {
        self.min
    }

    /// Maximum corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> WorldPoint {
        self.max
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Returns the rectangle grown by `margin` world units on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: WorldPoint::new(self.min.x - margin, self.min.y - margin),
            max: WorldPoint::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Reports whether the provided point lies within the rectangle.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Describes the dual-resolution grid layout of the map.
///
/// The coarse build grid governs building placement and spacing; the finer
/// pathfinding grid governs unit movement and walkability. Both subdivide the
/// same world-unit extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapDefinition {
    width: u32,
    height: u32,
    build_cell: u32,
    path_cell: u32,
}

impl MapDefinition {
    /// Creates a new map definition from world-unit dimensions and cell sizes.
    #[must_use]
    pub const fn new(width: u32, height: u32, build_cell: u32, path_cell: u32) -> Self {
        Self {
            width,
            height,
            build_cell,
            path_cell,
        }
    }

    /// Total width of the map measured in world units.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Total height of the map measured in world units.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a build-grid cell measured in world units.
    #[must_use]
    pub const fn build_cell(&self) -> u32 {
        self.build_cell
    }

    /// Side length of a pathfinding-grid cell measured in world units.
    #[must_use]
    pub const fn path_cell(&self) -> u32 {
        self.path_cell
    }

    /// Number of whole build-grid columns contained in the map.
    #[must_use]
    pub const fn build_columns(&self) -> u32 {
        self.width / self.build_cell
    }

    /// Number of whole build-grid rows contained in the map.
    #[must_use]
    pub const fn build_rows(&self) -> u32 {
        self.height / self.build_cell
    }

    /// World-space center of the provided build-grid cell.
    #[must_use]
    pub fn build_cell_center(&self, cell: CellCoord) -> WorldPoint {
        let size = self.build_cell as f32;
        WorldPoint::new(
            (cell.x() as f32 + 0.5) * size,
            (cell.y() as f32 + 0.5) * size,
        )
    }

    /// World-space center of the provided pathfinding-grid cell.
    #[must_use]
    pub fn path_cell_center(&self, cell: CellCoord) -> WorldPoint {
        let size = self.path_cell as f32;
        WorldPoint::new(
            (cell.x() as f32 + 0.5) * size,
            (cell.y() as f32 + 0.5) * size,
        )
    }

    /// Pathfinding-grid cell containing the provided world-space point.
    #[must_use]
    pub fn world_to_path_cell(&self, point: WorldPoint) -> CellCoord {
        let size = self.path_cell as f32;
        CellCoord::new(
            (point.x() / size).floor() as i32,
            (point.y() / size).floor() as i32,
        )
    }

    /// Reports whether a build-grid cell's footprint lies entirely in bounds.
    #[must_use]
    pub fn build_cell_in_bounds(&self, cell: CellCoord) -> bool {
        self.cell_in_bounds(cell, self.build_cell)
    }

    /// Reports whether a pathfinding cell's footprint lies entirely in bounds.
    #[must_use]
    pub fn path_cell_in_bounds(&self, cell: CellCoord) -> bool {
        self.cell_in_bounds(cell, self.path_cell)
    }

    /// World-space rectangle covered by a square of build-grid cells.
    #[must_use]
    pub fn build_rect(&self, origin: CellCoord, side: u32) -> WorldRect {
        let size = self.build_cell as f32;
        let min = WorldPoint::new(origin.x() as f32 * size, origin.y() as f32 * size);
        let extent = side as f32 * size;
        WorldRect::new(min, WorldPoint::new(min.x() + extent, min.y() + extent))
    }

    fn cell_in_bounds(&self, cell: CellCoord, cell_size: u32) -> bool {
        if cell.x() < 0 || cell.y() < 0 {
            return false;
        }
        let size = i64::from(cell_size);
        let right = (i64::from(cell.x()) + 1) * size;
        let bottom = (i64::from(cell.y()) + 1) * size;
        right <= i64::from(self.width) && bottom <= i64::from(self.height)
    }
}

/// Footprint side lengths available to buildings, in build-grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// One build-grid cell per side.
    Small,
    /// Two build-grid cells per side.
    Medium,
    /// Three build-grid cells per side.
    Large,
    /// Four build-grid cells per side.
    Huge,
}

impl SizeClass {
    /// Number of build-grid cells covered along each side of the footprint.
    #[must_use]
    pub const fn cells_per_side(self) -> u32 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
            Self::Huge => 4,
        }
    }
}

/// Types of buildings that can be constructed in the city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Seat of power; seeds houses and anchors the loss condition.
    Castle,
    /// Dwelling that generates modest gold once completed.
    House,
    /// Garrison hall that trains warriors and generates gold once completed.
    WarriorsGuild,
}

/// Broad classification a unit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Working population: builders, collectors.
    Civilian,
    /// Fighting population: guards, warriors.
    Military,
}

/// Types of units the simulation can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    /// Builder and repairer of the city's structures.
    Peasant,
    /// Collector of coffer gold (collection route not yet implemented).
    TaxCollector,
    /// Defender garrisoned in the castle.
    CastleGuard,
    /// Soldier trained by the warrior's guild.
    Warrior,
}

impl UnitType {
    /// Broad classification the unit type belongs to.
    #[must_use]
    pub const fn kind(self) -> UnitKind {
        match self {
            Self::Peasant | Self::TaxCollector => UnitKind::Civilian,
            Self::CastleGuard | Self::Warrior => UnitKind::Military,
        }
    }
}

/// Labels attached to buildings and units for rule dispatch and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityTag {
    /// Losing this entity ends the game.
    Objective,
    /// Dwelling that houses population.
    Residence,
    /// Belongs to the fighting arm of the city.
    Military,
    /// Belongs to the working population.
    Civilian,
}

/// Behavior states a building advances through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingBehavior {
    /// No scheduled activity.
    Idle,
    /// Waiting for repair contributions to reach full hit points.
    UnderConstruction,
    /// Castle activity: periodically seeds a new house.
    SpawnHouse,
    /// Periodically deposits gold into the building's coffer.
    GenerateGold,
    /// Terminal state entered when hit points reach zero.
    BuildingDead,
}

/// Behavior states a unit advances through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitBehavior {
    /// Terminal state; the unit remains in the collection as an inert record.
    Dead,
    /// Sentinel for conditions the state machine treats as unreachable.
    DebugError(String),
    /// Homeless decay; becomes [`UnitBehavior::Dead`] when the timer expires.
    WithoutHome,
    /// Dispatches the unit to its type-specific task.
    LookingForTask,
    /// Walking home to garrison, then sleep.
    GoingToSleep,
    /// Garrisoned recovery; heals a fraction of max hp per second.
    Sleeping,
    /// Scanning for the nearest damaged building to repair.
    LookForBuildRepairTarget,
    /// Traveling toward the selected repair target.
    MovingToBuildRepairTarget(BuildingId),
    /// In range of the target, contributing repair ticks.
    Repairing(BuildingId),
}

/// Where a unit currently resides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnitLocation {
    /// Present on the map at the provided world-space position.
    OnMap(WorldPoint),
    /// Housed inside the provided building, absent from the map.
    Garrisoned(BuildingId),
}

/// Path command returned by behavior and movement updates.
///
/// The orchestrator collects these and batches pathfinder invocations at the
/// end of the step instead of searching mid-update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathDirective {
    /// No route is required this tick.
    None,
    /// Requests a route to the provided pathfinding-grid cell.
    Request(CellCoord),
}

impl PathDirective {
    /// Returns `self` unless it is [`PathDirective::None`], then `other`.
    #[must_use]
    pub fn or(self, other: PathDirective) -> PathDirective {
        match self {
            Self::None => other,
            directive => directive,
        }
    }
}

/// Speed multipliers the simulation clock can adopt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimSpeed {
    /// Simulation time does not advance.
    Paused,
    /// Real time, 1×.
    Normal,
    /// Double speed, 2×.
    Double,
    /// Fast-forward, 10×.
    Fast,
    /// Maximum fast-forward, 100×.
    Fastest,
}

impl SimSpeed {
    /// Factor applied to real frame deltas before accumulation.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Paused => 0,
            Self::Normal => 1,
            Self::Double => 2,
            Self::Fast => 10,
            Self::Fastest => 100,
        }
    }
}

/// High-level phase the game session is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No building has been placed yet.
    PreGame,
    /// The city is alive and simulating.
    Playing,
    /// An objective building fell; the simulation holds its final state.
    GameOver,
}

/// Reasons a building placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The spaced footprint extends beyond the configured map bounds.
    OutOfBounds,
    /// The spaced footprint overlaps an occupied build-grid cell.
    Occupied,
    /// Less than half the footprint lies within the city search area.
    OutsideSearchArea,
    /// The player cannot afford the building's gold cost.
    InsufficientGold,
    /// The game has ended; no further placements are accepted.
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::{
        BuildingId, BuildingKind, CellCoord, MapDefinition, PathDirective, PlacementError,
        SimSpeed, SizeClass, UnitId, UnitKind, UnitType, WorldPoint,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn building_id_round_trips_through_bincode() {
        assert_round_trip(&BuildingId::new(42));
    }

    #[test]
    fn unit_id_round_trips_through_bincode() {
        assert_round_trip(&UnitId::new(7));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(-3, 17));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::OutsideSearchArea);
    }

    #[test]
    fn building_kind_round_trips_through_bincode() {
        assert_round_trip(&BuildingKind::WarriorsGuild);
    }

    #[test]
    fn unit_type_round_trips_through_bincode() {
        assert_round_trip(&UnitType::TaxCollector);
    }

    #[test]
    fn size_classes_scale_one_to_four() {
        assert_eq!(SizeClass::Small.cells_per_side(), 1);
        assert_eq!(SizeClass::Medium.cells_per_side(), 2);
        assert_eq!(SizeClass::Large.cells_per_side(), 3);
        assert_eq!(SizeClass::Huge.cells_per_side(), 4);
    }

    #[test]
    fn unit_types_classify_into_kinds() {
        assert_eq!(UnitType::Peasant.kind(), UnitKind::Civilian);
        assert_eq!(UnitType::TaxCollector.kind(), UnitKind::Civilian);
        assert_eq!(UnitType::CastleGuard.kind(), UnitKind::Military);
        assert_eq!(UnitType::Warrior.kind(), UnitKind::Military);
    }

    #[test]
    fn speed_multipliers_cover_pause_through_fastest() {
        assert_eq!(SimSpeed::Paused.multiplier(), 0);
        assert_eq!(SimSpeed::Normal.multiplier(), 1);
        assert_eq!(SimSpeed::Double.multiplier(), 2);
        assert_eq!(SimSpeed::Fast.multiplier(), 10);
        assert_eq!(SimSpeed::Fastest.multiplier(), 100);
    }

    #[test]
    fn path_cells_project_to_centers_and_back() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        let cell = CellCoord::new(5, 9);
        let center = map.path_cell_center(cell);
        assert_eq!(center, WorldPoint::new(176.0, 304.0));
        assert_eq!(map.world_to_path_cell(center), cell);
    }

    #[test]
    fn negative_world_points_map_to_fringe_cells() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        let fringe = map.world_to_path_cell(WorldPoint::new(-1.0, -1.0));
        assert_eq!(fringe, CellCoord::new(-1, -1));
        assert!(!map.path_cell_in_bounds(fringe));
    }

    #[test]
    fn boundary_cells_respect_world_extent() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        assert!(map.path_cell_in_bounds(CellCoord::new(155, 155)));
        assert!(!map.path_cell_in_bounds(CellCoord::new(156, 0)));
        assert!(map.build_cell_in_bounds(CellCoord::new(77, 77)));
        assert!(!map.build_cell_in_bounds(CellCoord::new(78, 0)));
    }

    #[test]
    fn build_rect_covers_footprint_extent() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        let rect = map.build_rect(CellCoord::new(2, 3), 4);
        assert_eq!(rect.min(), WorldPoint::new(128.0, 192.0));
        assert_eq!(rect.max(), WorldPoint::new(384.0, 448.0));
        assert_eq!(rect.center(), WorldPoint::new(256.0, 320.0));
    }

    #[test]
    fn expanded_rect_contains_margin_points() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        let rect = map.build_rect(CellCoord::new(0, 0), 1).expanded(48.0);
        assert!(rect.contains(WorldPoint::new(-40.0, -40.0)));
        assert!(rect.contains(WorldPoint::new(110.0, 110.0)));
        assert!(!rect.contains(WorldPoint::new(113.0, 0.0)));
    }

    #[test]
    fn directive_or_prefers_existing_request() {
        let request = PathDirective::Request(CellCoord::new(1, 1));
        let fallback = PathDirective::Request(CellCoord::new(2, 2));
        assert_eq!(request.or(fallback), request);
        assert_eq!(PathDirective::None.or(fallback), fallback);
    }
}
