use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;
use rayon::prelude::*;
use thiserror::Error;

use tankbot_shared::*;
use tankbot_sim::scenario::{duel_world, random_world};
use tankbot_sim::{decide, evade, run_episode, HoldPolicy, Policy, TacticalPolicy};

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("unknown policy '{0}'. Valid options: tactical, hold")]
    UnknownPolicy(String),
}

#[derive(Parser)]
#[command(name = "tankbot", about = "Tank bot decision engine CLI")]
struct Cli {
    /// Engine config JSON; missing fields fall back to defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make one decision for a world snapshot and print it as JSON
    Decide {
        /// Path to a world snapshot JSON
        #[arg(long)]
        world: PathBuf,
    },

    /// Play a world snapshot forward under a policy
    Run {
        #[arg(long)]
        world: PathBuf,

        #[arg(long, default_value_t = 300)]
        ticks: u32,

        /// Policy driving the controlled tank (tactical or hold)
        #[arg(long, default_value = "tactical")]
        policy: String,

        /// Output path for the episode report JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Time decisions over random worlds
    Bench {
        #[arg(long, default_value_t = 200)]
        worlds: u64,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Dodge a single shell fired at a tank in the corner
    Duel,
}

fn resolve_policy(name: &str, config: EngineConfig) -> Result<Box<dyn Policy>, CliError> {
    match name {
        "tactical" => Ok(Box::new(TacticalPolicy::new(config))),
        "hold" => Ok(Box::new(HoldPolicy)),
        other => Err(CliError::UnknownPolicy(other.to_string())),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let config = match path {
        Some(p) => read_json(p)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tankbot=info")).init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Decide { world } => cmd_decide(&world, &config),
        Commands::Run {
            world,
            ticks,
            policy,
            output,
        } => cmd_run(&world, ticks, &policy, output, &config),
        Commands::Bench { worlds, seed } => cmd_bench(worlds, seed, &config),
        Commands::Duel => cmd_duel(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_decide(world_path: &Path, config: &EngineConfig) -> Result<(), CliError> {
    let world: World = read_json(world_path)?;
    let decision = decide(&world, config);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn cmd_run(
    world_path: &Path,
    ticks: u32,
    policy_name: &str,
    output: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<(), CliError> {
    let world: World = read_json(world_path)?;
    let mut policy = resolve_policy(policy_name, *config)?;

    println!("Running {} for {} ticks from tick {}", policy.name(), ticks, world.tick);
    let report = run_episode(&world, policy.as_mut(), config, ticks);
    let stats = &report.stats;

    println!();
    println!("=== Episode Result ===");
    println!("Ticks:        {}", report.ticks);
    println!("Alive:        {}", report.final_world.me.is_alive());
    println!("Crew:         {:.1}", report.final_world.me.crew_health);
    println!("Hull:         {:.1}", report.final_world.me.hull_durability);
    println!();
    println!("--- Stats ---");
    println!("  Taken: hits={}, damage={:.2}", stats.hits_taken, stats.damage_taken);
    println!(
        "  Dealt: shots={}, hits={}, damage={:.2}",
        stats.shots_fired, stats.hits_dealt, stats.damage_dealt
    );

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx]
}

fn cmd_bench(worlds: u64, seed: u64, config: &EngineConfig) -> Result<(), CliError> {
    println!("Benchmarking {} random worlds from seed {}", worlds, seed);
    let started = Instant::now();

    // Each decision stays single-threaded; worlds are spread across the pool.
    let samples: Vec<(String, f64)> = (seed..seed + worlds)
        .into_par_iter()
        .map(|s| {
            let world = random_world(s);
            let t0 = Instant::now();
            let decision = decide(&world, config);
            let micros = t0.elapsed().as_secs_f64() * 1e6;
            (format!("{:?}", decision.drive), micros)
        })
        .collect();

    let mut times: Vec<f64> = samples.iter().map(|(_, t)| *t).collect();
    times.sort_by(|a, b| a.total_cmp(b));
    let mut tiers: BTreeMap<&str, u32> = BTreeMap::new();
    for (drive, _) in &samples {
        *tiers.entry(drive.as_str()).or_insert(0) += 1;
    }

    println!();
    println!("=== Decision Latency (us) ===");
    println!("{:<8} {:>10}", "p50", format!("{:.1}", percentile(&times, 0.5)));
    println!("{:<8} {:>10}", "p90", format!("{:.1}", percentile(&times, 0.9)));
    println!("{:<8} {:>10}", "p99", format!("{:.1}", percentile(&times, 0.99)));
    println!("{:<8} {:>10}", "max", format!("{:.1}", times.last().copied().unwrap_or(0.0)));
    println!();
    println!("=== Drive Tiers ===");
    for (drive, count) in &tiers {
        println!("{:<12} {:>6}", drive, count);
    }
    info!("bench finished in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn cmd_duel(config: &EngineConfig) -> Result<(), CliError> {
    let world = duel_world();
    let me = &world.me;
    let shell = &world.shells[0];
    println!(
        "Tank at ({:.0}, {:.0}), shell at ({:.0}, {:.0}) moving ({:.1}, {:.1})",
        me.position.x, me.position.y, shell.position.x, shell.position.y, shell.velocity.x, shell.velocity.y
    );

    let Some(evasion) = evade(&world, config) else {
        println!("Shell is not dangerous; nothing to dodge.");
        return Ok(());
    };

    println!();
    println!("{:<14} {:>10} {:>8}", "Maneuver", "Damage", "Impact");
    println!("{:-<14} {:-<10} {:-<8}", "", "", "");
    for c in &evasion.candidates {
        let impact = c.impact_tick.map_or_else(|| "-".to_string(), |t| t.to_string());
        println!(
            "{:<14} {:>10.3} {:>8}",
            format!("({:.1}, {:.1})", c.tracks.left, c.tracks.right),
            c.damage,
            impact
        );
    }
    println!();
    println!("Best: {}", serde_json::to_string(&evasion.best)?);
    Ok(())
}
