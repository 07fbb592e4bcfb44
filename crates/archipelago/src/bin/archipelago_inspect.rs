//! # Archipelago Inspector
//!
//! Generates a world headlessly and prints what is on each island.
//!
//! ```bash
//! archipelago_inspect                      # defaults, seed 1337
//! archipelago_inspect world.toml           # config file
//! archipelago_inspect world.toml --seed 42 # override the seed
//! archipelago_inspect --seed 42 --next 3   # also show the next three worlds
//! ```
//!
//! Set `RUST_LOG=archipelago_procedural=debug` for per-island detail.

use archipelago::WorldSession;
use archipelago_procedural::{World, WorldConfig, WorldSeed};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: archipelago_inspect [config.toml] [--seed <n>] [--next <n>]");
        return;
    }

    let seed: Option<u32> = flag_value(&args, "--seed");
    let next: u32 = flag_value(&args, "--next").unwrap_or(0);
    let path = args
        .iter()
        .enumerate()
        .find(|(i, a)| !a.starts_with("--") && !is_flag_value(&args, *i))
        .map(|(_, a)| a.clone());

    let mut config = match path {
        Some(ref p) => match WorldConfig::from_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: could not load {p}: {e}");
                std::process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };
    if let Some(s) = seed {
        config.seed = WorldSeed::new(s);
    }

    let session = match WorldSession::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    print_world(&session.snapshot());
    for _ in 0..next {
        match session.regenerate() {
            Ok(world) => print_world(&world),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn is_flag_value(args: &[String], index: usize) -> bool {
    index > 0 && matches!(args[index - 1].as_str(), "--seed" | "--next")
}

fn print_world(world: &World) {
    let terrain = &world.config.terrain;
    println!();
    println!("┌─ WORLD seed={} ─────────────────────────────────────────", world.seed.value());
    println!(
        "│ islands: {}   grid: {}x{}   spacing: {}   sea level: {}",
        world.islands.len(),
        terrain.grid,
        terrain.grid,
        terrain.spacing,
        terrain.sea_level
    );
    if world.layout_relaxed > 0 {
        println!("│ relaxed layout: {} island(s) closer than min spacing", world.layout_relaxed);
    }
    println!("├──────────────────────────────────────────────────────────");

    for island in &world.islands {
        let (lo, hi) = island.field.height_range();
        let s = &island.stats;
        println!(
            "│ #{:<2} {:<9} at ({:>7.1}, {:>7.1})  height {:>5.2}..{:>5.2}",
            island.index, island.biome, island.center.x, island.center.y, lo, hi
        );
        println!(
            "│     trees {:>3}/{:<3}  houses {:>2}/{:<2}  rings {}/{}  lighthouse {}",
            s.trees.placed,
            s.trees.requested,
            s.houses.placed,
            s.houses.requested,
            s.rings.placed,
            s.rings.requested,
            if s.lighthouse { "yes" } else { "no" }
        );
    }
    println!("└──────────────────────────────────────────────────────────");
}
