//! Hexfront command line
//!
//! `odds` prints the loss curves of a land attack; `simulate` resolves the
//! same attack many times and reports what happened on average.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use hexfront::combat::CombatResult;
use hexfront::core::config::RulesConfig;
use hexfront::core::error::Result;
use hexfront::map::Terrain;
use hexfront::scenario::LandScenario;

/// Hexfront - land combat odds and Monte Carlo runs
#[derive(Parser, Debug)]
#[command(name = "hexfront")]
#[command(about = "Inspect and simulate combat resolution")]
struct Args {
    /// Rules file (TOML); defaults are used for missing keys
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print loss and elimination probabilities
    Odds(BattleArgs),

    /// Resolve the attack repeatedly and report average outcomes
    Simulate {
        #[command(flatten)]
        battle: BattleArgs,

        /// Number of combats to resolve
        #[arg(long, default_value_t = 1000)]
        trials: u64,

        /// Random seed for deterministic runs
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
struct BattleArgs {
    /// Attacking land strength
    #[arg(long, default_value_t = 6)]
    attack: u32,

    /// Defending land strength
    #[arg(long, default_value_t = 3)]
    defense: u32,

    /// Terrain of the defended hex
    #[arg(long, value_enum, default_value_t = TerrainArg::Clear)]
    terrain: TerrainArg,

    /// The defended hex is fortified
    #[arg(long)]
    fortified: bool,

    /// The defender stands its ground instead of retreating
    #[arg(long)]
    no_retreat: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TerrainArg {
    Clear,
    Forest,
    Mountain,
    TallMountain,
}

impl From<TerrainArg> for Terrain {
    fn from(arg: TerrainArg) -> Self {
        match arg {
            TerrainArg::Clear => Terrain::Clear,
            TerrainArg::Forest => Terrain::Forest,
            TerrainArg::Mountain => Terrain::Mountain,
            TerrainArg::TallMountain => Terrain::TallMountain,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl BattleArgs {
    fn scenario(&self) -> LandScenario {
        LandScenario {
            attack: self.attack,
            defense: self.defense,
            terrain: self.terrain.into(),
            fortified: self.fortified,
            willing_to_retreat: !self.no_retreat,
        }
    }
}

/// Aggregated outcome of a simulation run
#[derive(Serialize, Debug, Default)]
struct SimulationSummary {
    trials: u64,
    seed: u64,
    mean_attacker_losses: f64,
    mean_defender_losses: f64,
    retreat_rate: f64,
    defender_eliminated_rate: f64,
}

#[derive(Default)]
struct TrialOutcome {
    attacker_losses: u32,
    defender_losses: u32,
    retreated: bool,
    defender_eliminated: bool,
}

fn run_trial(scenario: &LandScenario, rules: &RulesConfig, seed: u64) -> Result<TrialOutcome> {
    let mut built = scenario.build(rules.clone())?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let result = built.combat.inflict_damages(&mut built.world, &mut rng)?;
    let CombatResult::Land(land) = result else {
        return Ok(TrialOutcome::default());
    };
    Ok(TrialOutcome {
        attacker_losses: land.attacker_losses,
        defender_losses: land.defender_losses,
        retreated: land.retreat.is_some(),
        defender_eliminated: built.defenders.iter().all(|id| !built.world.is_alive(*id)),
    })
}

fn print_odds(scenario: &LandScenario, rules: RulesConfig) -> Result<()> {
    let max_attacker_loss = rules.max_attacker_loss;
    let built = scenario.build(rules)?;
    let (world, combat) = (&built.world, &built.combat);

    println!(
        "Attack {} ({:.1} modified) vs defense {} ({:.1} modified), ratio {:.2}",
        combat.unmodified_attack_strength(world),
        combat.modified_attack_strength(world),
        combat.unmodified_defense_strength(world),
        combat.modified_defense_strength(world),
        combat.ratio(world),
    );
    println!();
    println!("Defender loses at least:");
    for points in 1..=combat.unmodified_defense_strength(world) {
        println!("  {:>2} SP  {:>6.1}%", points, 100.0 * combat.defender_loss_probability(world, points));
    }
    println!("Attacker loses at least:");
    for points in 1..=max_attacker_loss.min(combat.unmodified_attack_strength(world)) {
        println!("  {:>2} SP  {:>6.1}%", points, 100.0 * combat.attacker_loss_probability(world, points));
    }
    println!();
    println!(
        "Retreat options: {}",
        combat.retreatable_hexes(world)?.len()
    );
    println!(
        "Attacker eliminated: {:.1}%",
        100.0 * combat.attacker_elimination_probability(world)
    );
    println!(
        "Defender eliminated: {:.1}%",
        100.0 * combat.defender_elimination_probability(world)?
    );
    Ok(())
}

fn simulate(scenario: &LandScenario, rules: RulesConfig, trials: u64, seed: u64) -> Result<SimulationSummary> {
    let outcomes: Vec<TrialOutcome> = (0..trials)
        .into_par_iter()
        .map(|i| run_trial(scenario, &rules, seed.wrapping_add(i)))
        .collect::<Result<_>>()?;

    let n = outcomes.len().max(1) as f64;
    let rate = |count: usize| count as f64 / n;
    Ok(SimulationSummary {
        trials,
        seed,
        mean_attacker_losses: outcomes.iter().map(|o| o.attacker_losses as f64).sum::<f64>() / n,
        mean_defender_losses: outcomes.iter().map(|o| o.defender_losses as f64).sum::<f64>() / n,
        retreat_rate: rate(outcomes.iter().filter(|o| o.retreated).count()),
        defender_eliminated_rate: rate(outcomes.iter().filter(|o| o.defender_eliminated).count()),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hexfront=info")),
        )
        .init();

    let args = Args::parse();
    let rules = match &args.rules {
        Some(path) => RulesConfig::load(path)?,
        None => RulesConfig::default(),
    };

    match args.command {
        Command::Odds(battle) => print_odds(&battle.scenario(), rules)?,
        Command::Simulate {
            battle,
            trials,
            seed,
            format,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::info!(trials, seed, "simulating land combat");
            let summary = simulate(&battle.scenario(), rules, trials, seed)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => {
                    println!("Trials:               {}", summary.trials);
                    println!("Seed:                 {}", summary.seed);
                    println!("Mean attacker losses: {:.2}", summary.mean_attacker_losses);
                    println!("Mean defender losses: {:.2}", summary.mean_defender_losses);
                    println!("Retreat rate:         {:.1}%", 100.0 * summary.retreat_rate);
                    println!("Defender eliminated:  {:.1}%", 100.0 * summary.defender_eliminated_rate);
                }
            }
        }
    }

    Ok(())
}
