//! Building entities, the kind table, and the building behavior engine.

use std::collections::BTreeSet;
use std::time::Duration;

use crownhold_core::{
    BuildingBehavior, BuildingId, BuildingKind, CellCoord, EntityTag, Event, MapDefinition,
    PlayerId, SizeClass, UnitType, WorldPoint, WorldRect,
};

use crate::rng::{derive_entity_seed, sample_uniform_inclusive, SplitMix64};

/// Accumulated time an unfilled garrison slot needs to produce a unit.
pub(crate) const GARRISON_SPAWN_INTERVAL: Duration = Duration::from_secs(30);

/// Build-cell radius of the search-area disk every building contributes.
pub(crate) const DEFAULT_SEARCH_RADIUS_CELLS: u32 = 6;
/// World-unit margin around a building's rectangle that counts as "at" it.
pub(crate) const DEFAULT_ACTIVE_RADIUS: f32 = 48.0;

/// Fraction of max hp a building placed under construction starts with.
const CONSTRUCTION_START_FRACTION: f32 = 0.1;

const HOUSE_SPAWN_CADENCE_MS: (u32, u32) = (30_000, 45_000);
const GOLD_CADENCE_MS: (u32, u32) = (15_000, 45_000);
const HOUSE_PAYOUT: (u32, u32) = (45, 90);
const DEFAULT_PAYOUT: (u32, u32) = (450, 900);

/// Production slot inside a building's garrison.
#[derive(Clone, Debug)]
pub(crate) struct GarrisonSlot {
    pub(crate) unit_type: UnitType,
    pub(crate) max_count: u32,
    pub(crate) current_count: u32,
    pub(crate) spawn_timer: Duration,
}

impl GarrisonSlot {
    fn new(unit_type: UnitType, max_count: u32) -> Self {
        Self {
            unit_type,
            max_count,
            current_count: 0,
            spawn_timer: Duration::ZERO,
        }
    }
}

/// A permanent structure on the build grid.
///
/// Buildings are never removed; reaching zero hit points is a state, not a
/// deletion, and their footprints stay on both occupancy grids for good.
#[derive(Clone, Debug)]
pub(crate) struct Building {
    pub(crate) id: BuildingId,
    pub(crate) owner: PlayerId,
    pub(crate) kind: BuildingKind,
    pub(crate) origin: CellCoord,
    pub(crate) size: SizeClass,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) behavior: BuildingBehavior,
    pub(crate) behavior_timer: Duration,
    pub(crate) behavior_duration: Duration,
    pub(crate) garrison: Vec<GarrisonSlot>,
    pub(crate) garrison_occupied: u32,
    pub(crate) tags: BTreeSet<EntityTag>,
    pub(crate) coffer: u32,
    pub(crate) search_radius_cells: u32,
    pub(crate) active_radius: f32,
    rng: SplitMix64,
}

impl Building {
    /// Creates a freshly placed building with kind-derived parameters.
    pub(crate) fn new(
        id: BuildingId,
        owner: PlayerId,
        kind: BuildingKind,
        origin: CellCoord,
        world_seed: u64,
    ) -> Self {
        let max_hp = max_hp_for(kind);
        let mut rng = SplitMix64::new(derive_entity_seed(world_seed, id.get(), "cadence"));
        let (hp, behavior, behavior_duration) = if starts_complete(kind) {
            let cadence = roll_ms(&mut rng, HOUSE_SPAWN_CADENCE_MS);
            (max_hp, BuildingBehavior::SpawnHouse, cadence)
        } else {
            (
                max_hp * CONSTRUCTION_START_FRACTION,
                BuildingBehavior::UnderConstruction,
                Duration::ZERO,
            )
        };

        Self {
            id,
            owner,
            kind,
            origin,
            size: size_for(kind),
            hp,
            max_hp,
            behavior,
            behavior_timer: Duration::ZERO,
            behavior_duration,
            garrison: garrison_template(kind),
            garrison_occupied: 0,
            tags: tags_for(kind),
            coffer: 0,
            search_radius_cells: DEFAULT_SEARCH_RADIUS_CELLS,
            active_radius: DEFAULT_ACTIVE_RADIUS,
            rng,
        }
    }

    /// Footprint side length in build-grid cells.
    pub(crate) fn side(&self) -> u32 {
        self.size.cells_per_side()
    }

    /// World-space rectangle covered by the footprint.
    pub(crate) fn world_rect(&self, map: &MapDefinition) -> WorldRect {
        map.build_rect(self.origin, self.side())
    }

    /// World-space center of the footprint.
    pub(crate) fn center(&self, map: &MapDefinition) -> WorldPoint {
        self.world_rect(map).center()
    }

    /// Pathfinding cell at the bottom-center of the footprint.
    pub(crate) fn entrance_cell(&self, map: &MapDefinition) -> CellCoord {
        let rect = self.world_rect(map);
        let half_cell = map.path_cell() as f32 / 2.0;
        map.world_to_path_cell(WorldPoint::new(
            rect.center().x(),
            rect.max().y() - half_cell,
        ))
    }

    /// Entrance cell offset by one row, just outside the footprint.
    pub(crate) fn exit_cell(&self, map: &MapDefinition) -> CellCoord {
        self.entrance_cell(map).offset(0, 1)
    }

    /// Reports whether repair work would still help this building.
    pub(crate) fn is_damaged(&self) -> bool {
        self.hp < self.max_hp
    }

    /// Recomputes the cached sum of garrison slot counts.
    pub(crate) fn recompute_garrison_occupied(&mut self) {
        self.garrison_occupied = self.garrison.iter().map(|slot| slot.current_count).sum();
    }

    /// Draws the next house-seeding cadence for this building's stream.
    pub(crate) fn roll_house_cadence(&mut self) -> Duration {
        roll_ms(&mut self.rng, HOUSE_SPAWN_CADENCE_MS)
    }

    /// Draws the next gold-generation cadence for this building's stream.
    pub(crate) fn roll_gold_cadence(&mut self) -> Duration {
        roll_ms(&mut self.rng, GOLD_CADENCE_MS)
    }

    /// Draws the next coffer payout amount for this building's stream.
    pub(crate) fn roll_payout(&mut self) -> u32 {
        let (min, max) = match self.kind {
            BuildingKind::House => HOUSE_PAYOUT,
            _ => DEFAULT_PAYOUT,
        };
        sample_uniform_inclusive(&mut self.rng, min, max)
    }
}

/// Advances the building's behavior state by one simulation step.
pub(crate) fn update_behavior(
    building: &mut Building,
    dt: Duration,
    house_requests: &mut Vec<BuildingId>,
    out_events: &mut Vec<Event>,
) {
    if building.hp <= 0.0 && building.behavior != BuildingBehavior::BuildingDead {
        building.behavior = BuildingBehavior::BuildingDead;
        building.behavior_timer = Duration::ZERO;
        building.behavior_duration = Duration::ZERO;
        return;
    }

    match building.behavior {
        BuildingBehavior::Idle
        | BuildingBehavior::UnderConstruction
        | BuildingBehavior::BuildingDead => {}
        BuildingBehavior::SpawnHouse => {
            building.behavior_timer = building.behavior_timer.saturating_add(dt);
            if building.behavior_timer >= building.behavior_duration {
                building.behavior_timer -= building.behavior_duration;
                building.behavior_duration = building.roll_house_cadence();
                house_requests.push(building.id);
            }
        }
        BuildingBehavior::GenerateGold => {
            building.behavior_timer = building.behavior_timer.saturating_add(dt);
            if building.behavior_timer >= building.behavior_duration {
                building.behavior_timer -= building.behavior_duration;
                building.behavior_duration = building.roll_gold_cadence();
                let amount = building.roll_payout();
                building.coffer = building.coffer.saturating_add(amount);
                out_events.push(Event::GoldCollected {
                    building: building.id,
                    amount,
                });
            }
        }
    }
}

/// Advances every garrison slot's spawn timer by one simulation step.
///
/// A full slot holds its timer at zero rather than banking time toward an
/// instant respawn. Emitted requests are resolved into garrisoned units by
/// the orchestrator.
pub(crate) fn update_garrison(
    building: &mut Building,
    dt: Duration,
    unit_spawns: &mut Vec<(BuildingId, UnitType)>,
) {
    let id = building.id;
    for slot in &mut building.garrison {
        if slot.current_count < slot.max_count {
            slot.spawn_timer = slot.spawn_timer.saturating_add(dt);
            if slot.spawn_timer >= GARRISON_SPAWN_INTERVAL {
                slot.spawn_timer -= GARRISON_SPAWN_INTERVAL;
                slot.current_count += 1;
                unit_spawns.push((id, slot.unit_type));
            }
        } else {
            slot.spawn_timer = Duration::ZERO;
        }
    }
    building.recompute_garrison_occupied();
}

/// Footprint size class associated with a building kind.
pub(crate) fn size_for(kind: BuildingKind) -> SizeClass {
    match kind {
        BuildingKind::Castle => SizeClass::Huge,
        BuildingKind::House => SizeClass::Small,
        BuildingKind::WarriorsGuild => SizeClass::Large,
    }
}

/// Maximum hit points associated with a building kind.
pub(crate) fn max_hp_for(kind: BuildingKind) -> f32 {
    match kind {
        BuildingKind::Castle => 5000.0,
        BuildingKind::House => 400.0,
        BuildingKind::WarriorsGuild => 1500.0,
    }
}

/// Gold price charged when a player places the kind.
pub(crate) fn cost_for(kind: BuildingKind) -> u32 {
    match kind {
        BuildingKind::Castle => 10_000,
        BuildingKind::House => 500,
        BuildingKind::WarriorsGuild => 1_500,
    }
}

/// Reports whether the kind is placed complete rather than under construction.
pub(crate) fn starts_complete(kind: BuildingKind) -> bool {
    matches!(kind, BuildingKind::Castle)
}

/// Behavior adopted when construction completes, if the kind changes at all.
pub(crate) fn completed_behavior(kind: BuildingKind) -> Option<BuildingBehavior> {
    match kind {
        BuildingKind::House | BuildingKind::WarriorsGuild => Some(BuildingBehavior::GenerateGold),
        BuildingKind::Castle => None,
    }
}

fn tags_for(kind: BuildingKind) -> BTreeSet<EntityTag> {
    let tags = match kind {
        BuildingKind::Castle => [EntityTag::Objective].as_slice(),
        BuildingKind::House => [EntityTag::Residence].as_slice(),
        BuildingKind::WarriorsGuild => [EntityTag::Military].as_slice(),
    };
    tags.iter().copied().collect()
}

fn garrison_template(kind: BuildingKind) -> Vec<GarrisonSlot> {
    match kind {
        BuildingKind::Castle => vec![
            GarrisonSlot::new(UnitType::CastleGuard, 1),
            GarrisonSlot::new(UnitType::TaxCollector, 1),
            GarrisonSlot::new(UnitType::Peasant, 3),
        ],
        BuildingKind::House => Vec::new(),
        BuildingKind::WarriorsGuild => vec![GarrisonSlot::new(UnitType::Warrior, 4)],
    }
}

fn roll_ms(rng: &mut SplitMix64, range: (u32, u32)) -> Duration {
    Duration::from_millis(u64::from(sample_uniform_inclusive(rng, range.0, range.1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crownhold_core::SIMULATION_STEP;

    const SEED: u64 = 0x51ab_0c44;

    fn castle() -> Building {
        Building::new(
            BuildingId::new(0),
            PlayerId::new(0),
            BuildingKind::Castle,
            CellCoord::new(30, 30),
            SEED,
        )
    }

    fn guild() -> Building {
        Building::new(
            BuildingId::new(1),
            PlayerId::new(0),
            BuildingKind::WarriorsGuild,
            CellCoord::new(40, 40),
            SEED,
        )
    }

    #[test]
    fn kind_table_matches_design() {
        assert_eq!(size_for(BuildingKind::Castle), SizeClass::Huge);
        assert_eq!(size_for(BuildingKind::House), SizeClass::Small);
        assert_eq!(size_for(BuildingKind::WarriorsGuild), SizeClass::Large);
        assert_eq!(cost_for(BuildingKind::Castle), 10_000);
        assert!(starts_complete(BuildingKind::Castle));
        assert!(!starts_complete(BuildingKind::House));
        assert_eq!(
            completed_behavior(BuildingKind::House),
            Some(BuildingBehavior::GenerateGold)
        );
        assert_eq!(completed_behavior(BuildingKind::Castle), None);
    }

    #[test]
    fn castle_is_placed_complete_and_seeding_houses() {
        let castle = castle();
        assert_eq!(castle.hp, castle.max_hp);
        assert_eq!(castle.behavior, BuildingBehavior::SpawnHouse);
        assert!(castle.tags.contains(&EntityTag::Objective));
        let cadence = castle.behavior_duration;
        assert!(cadence >= Duration::from_secs(30) && cadence <= Duration::from_secs(45));
    }

    #[test]
    fn guild_is_placed_under_construction_at_fraction() {
        let guild = guild();
        assert_eq!(guild.behavior, BuildingBehavior::UnderConstruction);
        assert!((guild.hp - guild.max_hp * 0.1).abs() < f32::EPSILON * guild.max_hp);
        assert!(guild.is_damaged());
    }

    #[test]
    fn entrance_sits_inside_footprint_exit_outside() {
        let map = MapDefinition::new(4992, 4992, 64, 32);
        let castle = castle();
        let entrance = castle.entrance_cell(&map);
        let exit = castle.exit_cell(&map);
        assert_eq!(entrance, CellCoord::new(64, 67));
        assert_eq!(exit, CellCoord::new(64, 68));
    }

    #[test]
    fn garrison_slot_fills_once_per_interval() {
        let mut guild = guild();
        let mut spawns = Vec::new();

        let ticks_per_interval = 30 * 20;
        for _ in 0..ticks_per_interval {
            update_garrison(&mut guild, SIMULATION_STEP, &mut spawns);
        }

        assert_eq!(spawns, vec![(guild.id, UnitType::Warrior)]);
        assert_eq!(guild.garrison_occupied, 1);
        assert_eq!(guild.garrison[0].current_count, 1);

        for _ in 0..ticks_per_interval {
            update_garrison(&mut guild, SIMULATION_STEP, &mut spawns);
        }
        assert_eq!(spawns.len(), 2);
        assert_eq!(guild.garrison_occupied, 2);
    }

    #[test]
    fn full_garrison_slot_holds_timer_at_zero() {
        let mut castle = castle();
        for slot in &mut castle.garrison {
            slot.current_count = slot.max_count;
        }
        let mut spawns = Vec::new();

        for _ in 0..100 {
            update_garrison(&mut castle, SIMULATION_STEP, &mut spawns);
        }

        assert!(spawns.is_empty());
        assert!(castle
            .garrison
            .iter()
            .all(|slot| slot.spawn_timer == Duration::ZERO));
    }

    #[test]
    fn spawn_house_cadence_emits_requests_in_range() {
        let mut castle = castle();
        let mut requests = Vec::new();
        let mut events = Vec::new();

        // 46 simulated seconds covers any cadence in the 30-45 s range.
        for _ in 0..(46 * 20) {
            update_behavior(&mut castle, SIMULATION_STEP, &mut requests, &mut events);
        }

        assert_eq!(requests, vec![castle.id]);
        let next = castle.behavior_duration;
        assert!(next >= Duration::from_secs(30) && next <= Duration::from_secs(45));
    }

    #[test]
    fn gold_generation_pays_into_the_coffer() {
        let mut house = Building::new(
            BuildingId::new(2),
            PlayerId::new(0),
            BuildingKind::House,
            CellCoord::new(10, 10),
            SEED,
        );
        house.hp = house.max_hp;
        house.behavior = BuildingBehavior::GenerateGold;
        house.behavior_duration = house.roll_gold_cadence();
        assert!(house.behavior_duration >= Duration::from_secs(15));
        assert!(house.behavior_duration <= Duration::from_secs(45));

        let mut requests = Vec::new();
        let mut events = Vec::new();
        for _ in 0..(46 * 20) {
            update_behavior(&mut house, SIMULATION_STEP, &mut requests, &mut events);
            if !events.is_empty() {
                break;
            }
        }

        assert!(requests.is_empty());
        assert!((45..=90).contains(&house.coffer), "coffer: {}", house.coffer);
        assert!(matches!(
            events.first(),
            Some(Event::GoldCollected { amount, .. }) if (45..=90).contains(amount)
        ));
    }

    #[test]
    fn zero_hp_buildings_become_dead_and_inert() {
        let mut castle = castle();
        castle.hp = 0.0;
        let mut requests = Vec::new();
        let mut events = Vec::new();

        update_behavior(&mut castle, SIMULATION_STEP, &mut requests, &mut events);

        assert_eq!(castle.behavior, BuildingBehavior::BuildingDead);
        update_behavior(&mut castle, SIMULATION_STEP, &mut requests, &mut events);
        assert!(requests.is_empty() && events.is_empty());
    }
}
