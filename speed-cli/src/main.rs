//! spe_ed CLI - Command-line interface
//!
//! Commands:
//! - simulate: Play many episodes and report the win rate
//! - play: Play a single episode, optionally saving the replay

mod episode;
mod play_cmd;
mod simulate_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use play_cmd::PlayArgs;
use simulate_cmd::SimulateArgs;

#[derive(Parser)]
#[command(name = "speed")]
#[command(about = "spe_ed game simulator and search policies")]
struct Cli {
    /// Seed for board placement and policy randomness
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play many episodes against fixed opponents
    Simulate(SimulateArgs),
    /// Play a single episode
    Play(PlayArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate_cmd::run(args, cli.seed),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "speed",
            "simulate",
            "--episodes",
            "5",
            "--opponents",
            "spiral,maze_walker",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.episodes, 5);
                assert_eq!(args.game.opponents, vec!["spiral".to_string(), "maze_walker".to_string()]);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_parse_play_with_log() {
        let cli = Cli::try_parse_from(["speed", "play", "--policy", "maximin", "--log", "game.json"]).unwrap();
        match cli.command {
            Commands::Play(args) => {
                assert_eq!(args.game.policy, "maximin");
                assert_eq!(args.log.as_deref(), Some(std::path::Path::new("game.json")));
            }
            _ => panic!("expected play"),
        }
    }
}
