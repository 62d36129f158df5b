//! Headless colony runner
//!
//! Builds a small demo colony, advances it a number of turns and prints the
//! end-of-turn reports.

use std::path::PathBuf;

use clap::Parser;
use colony_sim::city::{Mine, MineProductionRate, ProductType, StructureKind};
use colony_sim::core::{Difficulty, Result, SimulationConfig, StructureId, TileCoord};
use colony_sim::save;
use colony_sim::simulation::{
    Colony, FixedRouteCost, NoConnectorTiles, NotificationQueue, TurnEvent, TurnInput,
};

/// Headless colony simulation
#[derive(Parser, Debug)]
#[command(name = "colony_sim")]
#[command(about = "Advance a demo colony and print the turn reports")]
struct Args {
    /// Number of turns to run
    #[arg(long, default_value_t = 50)]
    turns: u32,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Beginner, Easy, Medium or Hard
    #[arg(long, default_value = "Medium")]
    difficulty: Difficulty,

    /// TOML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final colony to this save file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Route cost between the mine and the smelter
    #[arg(long, default_value_t = 2.0)]
    route_cost: f32,

    /// Flag the agridome for theft every N turns (0 disables crime)
    #[arg(long, default_value_t = 10)]
    crime_interval: u32,
}

/// Lay out a starting colony: command center, landers, a tube spine and a
/// row of production structures along it
fn build_demo_colony(colony: &mut Colony) -> Result<StructureId> {
    let command_center = colony.place_structure(StructureKind::CommandCenter, TileCoord::surface(0, 0))?;
    // Landers unload into the command center, so it starts out built
    while colony.manager().get(command_center)?.under_construction() {
        colony.manager_mut().get_mut(command_center)?.increment_age(0);
    }

    colony.place_structure(StructureKind::ColonistLander, TileCoord::surface(-1, 0))?;
    colony.place_structure(StructureKind::CargoLander, TileCoord::surface(0, -1))?;
    colony.place_structure(StructureKind::SeedLander, TileCoord::surface(-1, -1))?;

    for x in 1..=6 {
        colony.place_structure(StructureKind::Tube, TileCoord::surface(x, 0))?;
    }

    colony.place_structure(StructureKind::SeedPower, TileCoord::surface(1, 1))?;
    colony.place_structure(StructureKind::Chap, TileCoord::surface(2, 1))?;
    let agridome = colony.place_structure(StructureKind::Agridome, TileCoord::surface(3, 1))?;
    colony.place_structure(StructureKind::SeedSmelter, TileCoord::surface(4, 1))?;
    colony.place_structure(StructureKind::Warehouse, TileCoord::surface(5, 1))?;
    let factory = colony.place_structure(StructureKind::SeedFactory, TileCoord::surface(6, 1))?;
    colony.place_structure(StructureKind::Park, TileCoord::surface(1, -1))?;

    let config = colony.config().clone();
    colony.place_mine(
        TileCoord::surface(4, -1),
        Mine::new(MineProductionRate::Medium, &config),
    )?;
    colony.set_factory_product(factory, Some(ProductType::Truck))?;

    Ok(agridome)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("colony_sim=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };

    let mut colony = Colony::new(config, args.seed)?.with_difficulty(args.difficulty);
    let agridome = build_demo_colony(&mut colony)?;

    let routes = FixedRouteCost(args.route_cost);
    let mut notifications = NotificationQueue::new();

    println!("Colony Simulation");
    println!("=================");
    println!(
        "Seed {}, difficulty {}, {} turns",
        args.seed, args.difficulty, args.turns
    );
    println!();

    for turn in 1..=args.turns {
        let flagged = if args.crime_interval > 0 && turn % args.crime_interval == 0 {
            vec![Some(agridome)]
        } else {
            Vec::new()
        };

        let report = colony.advance_turn(TurnInput {
            routes: &routes,
            tiles: &NoConnectorTiles,
            notifications: &mut notifications,
            crime: &flagged,
        })?;

        println!(
            "Turn {:>3}: morale {:>4}  energy {:>4}/{:<4}  food {:>5}  refined {:?}",
            report.turn,
            report.morale,
            report.energy_used,
            report.energy_produced,
            report.food,
            report.refined.resources,
        );
        for event in &report.events {
            if !matches!(event, TurnEvent::Disabled { .. }) {
                println!("          {:?}", event);
            }
        }
        for note in notifications.drain() {
            println!("          [{:?}] {}: {}", note.severity, note.title, note.body);
        }
    }

    println!();
    println!("--- Colony Summary ---");
    println!(
        "Population: {} workers, {} scientists",
        colony.population().workers(),
        colony.population().scientists()
    );
    println!("Robots: {}", colony.robots().total());
    println!(
        "Trucks in storage: {}",
        colony.manager().product_count(ProductType::Truck)
    );
    println!(
        "Morale: {} ({})",
        colony.morale().value(),
        colony.morale().description()
    );

    if let Some(path) = &args.save {
        save::save(&colony, path)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
