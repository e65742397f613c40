//! Play command - one episode with an optional JSON replay

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::episode::{self, GameArgs, Outcome};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Write the replay of the episode to this JSON file
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = episode::create_rng(seed);
    let mut agent = episode::load_policy(&args.game.policy)?;
    let (mut env, names) = episode::make_env(&args.game, &agent, episode::env_seed(&mut rng))?;

    tracing::info!("Playing {} on {}x{}", names.join(" vs "), args.game.width, args.game.height);

    let record = episode::play_episode(&mut env, &mut agent, args.game.time_budget(), &mut rng)?;
    let verdict = match record.outcome {
        Outcome::Win => "won",
        Outcome::Draw => "drew",
        Outcome::Loss => "lost",
    };
    println!("{} {} after {} rounds", agent, verdict, record.rounds);

    if let Some(path) = &args.log {
        episode::replay(&env, names)
            .save(path)
            .with_context(|| format!("Failed to write replay: {}", path.display()))?;
        tracing::info!("Replay written to {}", path.display());
    }

    Ok(())
}
