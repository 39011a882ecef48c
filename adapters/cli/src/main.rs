#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that drives the Crownhold simulation.
//!
//! This binary is the reference outer reducer: it assembles a scenario from
//! flags or a shared layout string, then alternates the scheduler system and
//! `world::apply` frame by frame, reporting notable events through `tracing`
//! and printing a final summary of the city.

mod scenario;

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use crownhold_core::{
    BuildingKind, CellCoord, Command, Event, GameState, MapDefinition, PlayerId, SimSpeed,
    UnitLocation, WELCOME_BANNER,
};
use crownhold_system_scheduler::Scheduler;
use crownhold_world::{apply, query, World};
use tracing::{debug, info, warn};

use crate::scenario::LayoutSnapshot;

/// Real-time delta delivered per reducer frame (twenty frames per second).
const FRAME_DT: Duration = Duration::from_millis(50);

const LOCAL_PLAYER: PlayerId = PlayerId::new(0);

#[derive(Debug, Parser)]
#[command(name = "crownhold", about = "Headless Crownhold simulation runner")]
struct Args {
    /// Map width and height in world units.
    #[arg(long, default_value_t = 4992)]
    map_size: u32,
    /// Build-grid cell size in world units.
    #[arg(long, default_value_t = 64)]
    build_cell: u32,
    /// Pathfinding-grid cell size in world units.
    #[arg(long, default_value_t = 32)]
    path_cell: u32,
    /// Gold the player starts with.
    #[arg(long, default_value_t = 50_000)]
    gold: u32,
    /// Seed for deterministic cadence derivation.
    #[arg(long)]
    seed: Option<u64>,
    /// Real seconds of frame time to deliver.
    #[arg(long, default_value_t = 120)]
    seconds: u64,
    /// Speed multiplier adopted before the first frame.
    #[arg(long, value_enum, default_value_t = SpeedArg::Normal)]
    speed: SpeedArg,
    /// Opening layout string (crownhold:v1:<WxH>:<payload>).
    #[arg(long)]
    layout: Option<String>,
    /// Log unit-level detail in addition to city-level events.
    #[arg(long, short)]
    verbose: bool,
}

/// Speed multiplier choices exposed on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpeedArg {
    /// Simulation time does not advance.
    Paused,
    /// Real time, 1x.
    Normal,
    /// Double speed, 2x.
    Double,
    /// Fast-forward, 10x.
    Fast,
    /// Maximum fast-forward, 100x.
    Fastest,
}

impl From<SpeedArg> for SimSpeed {
    fn from(value: SpeedArg) -> Self {
        match value {
            SpeedArg::Paused => SimSpeed::Paused,
            SpeedArg::Normal => SimSpeed::Normal,
            SpeedArg::Double => SimSpeed::Double,
            SpeedArg::Fast => SimSpeed::Fast,
            SpeedArg::Fastest => SimSpeed::Fastest,
        }
    }
}

/// Entry point for the Crownhold command-line runner.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    println!("{WELCOME_BANNER}");

    let (map, placements) = resolve_scenario(&args)?;
    if map.build_cell() == 0 || map.path_cell() == 0 {
        bail!("grid cell sizes must be positive");
    }

    let mut world = match args.seed {
        Some(seed) => World::with_seed(map, args.gold, seed),
        None => World::new(map, args.gold),
    };

    let mut events = Vec::new();
    for (kind, origin) in placements {
        apply(
            &mut world,
            Command::PlaceBuilding {
                owner: LOCAL_PLAYER,
                kind,
                origin,
            },
            &mut events,
        );
    }
    if query::game_state(&world) == GameState::PreGame {
        report_events(&events);
        bail!("no opening placement succeeded; the scenario never starts");
    }

    let speed = SimSpeed::from(args.speed);
    if speed != SimSpeed::Normal {
        apply(&mut world, Command::SetSpeed { speed }, &mut events);
    }
    report_events(&events);

    let mut scheduler = Scheduler::default();
    let frames = args.seconds.saturating_mul(20);
    for _ in 0..frames {
        let mut commands = Vec::new();
        scheduler.handle(FRAME_DT, &events, &mut commands);
        events.clear();

        for command in commands {
            apply(&mut world, command, &mut events);
        }
        report_events(&events);

        if query::game_state(&world) == GameState::GameOver {
            break;
        }
    }

    print_summary(&world);
    Ok(())
}

fn resolve_scenario(args: &Args) -> anyhow::Result<(MapDefinition, Vec<(BuildingKind, CellCoord)>)> {
    match &args.layout {
        Some(encoded) => {
            let layout = LayoutSnapshot::decode(encoded).context("invalid --layout string")?;
            let map = MapDefinition::new(
                layout.width,
                layout.height,
                layout.build_cell,
                layout.path_cell,
            );
            let placements = layout
                .placements
                .into_iter()
                .map(|placement| (placement.kind, placement.origin))
                .collect();
            Ok((map, placements))
        }
        None => {
            let map = MapDefinition::new(
                args.map_size,
                args.map_size,
                args.build_cell,
                args.path_cell,
            );
            let center = (map.build_columns() / 2) as i32 - 2;
            Ok((map, vec![(BuildingKind::Castle, CellCoord::new(center, center))]))
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn report_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } => {}
            Event::SpeedChanged { speed } => info!(?speed, "speed changed"),
            Event::GameStarted => info!("the city is founded"),
            Event::GameEnded { building } => {
                warn!(building = building.get(), "objective lost, game over");
            }
            Event::BuildingPlaced {
                building,
                kind,
                origin,
            } => info!(
                building = building.get(),
                ?kind,
                x = origin.x(),
                y = origin.y(),
                "building placed"
            ),
            Event::PlacementRejected {
                kind,
                origin,
                reason,
            } => warn!(
                ?kind,
                x = origin.x(),
                y = origin.y(),
                ?reason,
                "placement rejected"
            ),
            Event::ConstructionCompleted { building } => {
                info!(building = building.get(), "construction completed");
            }
            Event::HouseSpawned {
                castle,
                house,
                origin,
            } => info!(
                castle = castle.get(),
                house = house.get(),
                x = origin.x(),
                y = origin.y(),
                "castle seeded a house"
            ),
            Event::UnitSpawned {
                unit,
                unit_type,
                building,
            } => debug!(
                unit = unit.get(),
                ?unit_type,
                building = building.get(),
                "unit spawned"
            ),
            Event::UnitDied { unit } => debug!(unit = unit.get(), "unit died"),
            Event::GoldCollected { building, amount } => {
                debug!(building = building.get(), amount, "coffer gold generated");
            }
        }
    }
}

fn print_summary(world: &World) {
    let buildings = query::building_view(world).into_vec();
    let units = query::unit_view(world).into_vec();
    let coffers: u32 = buildings.iter().map(|building| building.coffer).sum();
    let garrisoned = units
        .iter()
        .filter(|unit| matches!(unit.location, UnitLocation::Garrisoned(_)))
        .count();

    println!("--- after {} ticks ---", query::tick_index(world));
    println!("state: {:?}", query::game_state(world));
    println!("player gold: {}", query::gold(world));
    println!("coffer gold: {coffers}");
    println!(
        "buildings: {} ({} houses)",
        buildings.len(),
        buildings
            .iter()
            .filter(|building| building.kind == BuildingKind::House)
            .count()
    );
    println!(
        "units: {} ({} garrisoned, {} afield)",
        units.len(),
        garrisoned,
        units.len() - garrisoned
    );
}
