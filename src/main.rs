//! Strategos - Entry Point
//!
//! Runs a seeded skirmish between AI factions and prints every decision and battle.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use strategos::combat::{BattleOutcome, BattleReport};
use strategos::core::config::FactionConfig;
use strategos::core::error::Result;
use strategos::skirmish::{Skirmish, TickSummary};

/// Strategos - AI factions compete in a seeded skirmish
#[derive(Parser, Debug)]
#[command(name = "strategos")]
#[command(about = "Run a skirmish between utility-scoring AI factions")]
struct Args {
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum ticks before the skirmish stops
    #[arg(long, default_value_t = 120)]
    turns: u64,

    /// Number of factions taking part
    #[arg(long, default_value_t = 2)]
    factions: u32,

    /// Faction configuration (TOML) shared by every faction
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print each tick as a JSON line instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strategos=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => FactionConfig::load_from_toml(path)?,
        None => FactionConfig::default(),
    };
    let configs: Vec<FactionConfig> = (1..=args.factions)
        .map(|i| FactionConfig {
            name: format!("{}-{}", base.name, i),
            ..base.clone()
        })
        .collect();

    tracing::info!(seed = args.seed, factions = args.factions, "starting skirmish");
    let mut skirmish = Skirmish::new(args.seed, configs)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    while skirmish.tick() < args.turns && !skirmish.is_over() {
        let summary = skirmish.step()?;
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&summary)?)?;
        } else {
            print_summary(&mut out, &summary)?;
        }
    }

    if !args.json {
        writeln!(out)?;
        writeln!(out, "=== RESULT after {} ticks ===", skirmish.tick())?;
        for (faction, ai) in skirmish.factions().iter().zip(skirmish.ais()) {
            let mode = ai.mode();
            writeln!(
                out,
                "{:<10} res {:>4}  food {:>4}  pop {:>3}/{:<3}  buildings {:>2}  armies {:>2}  {:?}/{:?}",
                ai.config().name,
                faction.resources,
                faction.food,
                faction.population,
                faction.population_limit,
                faction.buildings.iter().filter(|b| !b.is_destroyed()).count(),
                faction.armies.len(),
                mode.protocol,
                mode.posture,
            )?;
        }
        let survivors = skirmish.survivors();
        if survivors.len() == 1 {
            writeln!(out, "Winner: {}", survivors[0])?;
        } else {
            writeln!(out, "No winner, {} factions standing", survivors.len())?;
        }
    }
    Ok(())
}

fn print_summary(out: &mut impl Write, summary: &TickSummary) -> io::Result<()> {
    let actions: Vec<String> = summary
        .decisions
        .iter()
        .map(|d| format!("{}: {}", d.player, d.action))
        .collect();
    writeln!(out, "[tick {:>3}] {}", summary.tick, actions.join(" | "))?;
    for report in &summary.battles {
        print_battle(out, report)?;
    }
    Ok(())
}

fn print_battle(out: &mut impl Write, report: &BattleReport) -> io::Result<()> {
    let verdict = match report.outcome {
        BattleOutcome::AttackerWon => "attacker won",
        BattleOutcome::DefenderWon => "defender won",
        BattleOutcome::Draw => "draw",
    };
    write!(
        out,
        "    battle: {} ({}) vs {} ({}), {:.1} against {:.1}, {}; attacker lost {}",
        report.attacker_name,
        report.attacker_owner,
        report.defender_name,
        report.defender_owner,
        report.attack_value,
        report.defence_value,
        verdict,
        report.attacker_casualties(),
    )?;
    match report.defender_casualties() {
        Some(lost) => writeln!(out, ", defender lost {}", lost),
        None => writeln!(out),
    }
}
