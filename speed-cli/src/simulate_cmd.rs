//! Simulate command - play many episodes and report the win rate
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_episodes(), report_results()
//! - Level 3: tally()

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use speed_search::AnyPolicy;

use crate::episode::{self, EpisodeRecord, GameArgs, Outcome};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub game: GameArgs,

    /// Number of episodes to play
    #[arg(long, default_value = "100")]
    pub episodes: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Win/draw/loss counts over all episodes
#[derive(Clone, Debug, Default, PartialEq)]
struct Tally {
    wins: usize,
    draws: usize,
    losses: usize,
    avg_rounds: f32,
}

impl Tally {
    fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    fn win_rate(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            n => self.wins as f32 / n as f32,
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let mut agent = episode::load_policy(&args.game.policy)?;
    tracing::info!(
        "Simulating {} episodes of {} vs [{}] on {}x{}",
        args.episodes,
        agent,
        args.game.opponents.join(", "),
        args.game.width,
        args.game.height
    );

    let records = play_episodes(&args, &mut agent, seed)?;
    report_results(&tally(&records), &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_episodes(args: &SimulateArgs, agent: &mut AnyPolicy, seed: Option<u64>) -> Result<Vec<EpisodeRecord>> {
    let mut rng = episode::create_rng(seed);
    let (mut env, _) = episode::make_env(&args.game, agent, episode::env_seed(&mut rng))?;

    let pb = ProgressBar::new(args.episodes as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut records = Vec::with_capacity(args.episodes);
    let mut wins = 0;
    for n in 0..args.episodes {
        let record = episode::play_episode(&mut env, agent, args.game.time_budget(), &mut rng)?;
        tracing::debug!("Episode {}: {:?} after {} rounds", n + 1, record.outcome, record.rounds);
        if record.outcome == Outcome::Win {
            wins += 1;
        }
        records.push(record);

        pb.set_message(format!("win rate {:.1}%", wins as f32 / (n + 1) as f32 * 100.0));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(records)
}

fn report_results(tally: &Tally, args: &SimulateArgs) {
    if args.json {
        #[derive(serde::Serialize)]
        struct JsonOutput {
            episodes: usize,
            wins: usize,
            draws: usize,
            losses: usize,
            win_rate: f32,
            avg_rounds: f32,
        }

        let output = JsonOutput {
            episodes: tally.total(),
            wins: tally.wins,
            draws: tally.draws,
            losses: tally.losses,
            win_rate: tally.win_rate(),
            avg_rounds: tally.avg_rounds,
        };
        if let Ok(json) = serde_json::to_string_pretty(&output) {
            println!("{}", json);
        }
        return;
    }

    println!("\n=== Simulation Results ===");
    println!("Episodes:    {}", tally.total());
    println!("Wins:        {}", tally.wins);
    println!("Draws:       {}", tally.draws);
    println!("Losses:      {}", tally.losses);
    println!("Win rate:    {:.1}%", tally.win_rate() * 100.0);
    println!("Avg rounds:  {:.1}", tally.avg_rounds);
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn tally(records: &[EpisodeRecord]) -> Tally {
    let count = |o: Outcome| records.iter().filter(|r| r.outcome == o).count();
    let total_rounds: u32 = records.iter().map(|r| r.rounds).sum();

    Tally {
        wins: count(Outcome::Win),
        draws: count(Outcome::Draw),
        losses: count(Outcome::Loss),
        avg_rounds: if records.is_empty() {
            0.0
        } else {
            total_rounds as f32 / records.len() as f32
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: Outcome, rounds: u32) -> EpisodeRecord {
        EpisodeRecord { outcome, rounds }
    }

    #[test]
    fn test_tally_empty() {
        let t = tally(&[]);
        assert_eq!(t, Tally::default());
        assert_eq!(t.win_rate(), 0.0);
    }

    #[test]
    fn test_tally() {
        let t = tally(&[
            record(Outcome::Win, 10),
            record(Outcome::Loss, 20),
            record(Outcome::Win, 30),
            record(Outcome::Draw, 40),
        ]);
        assert_eq!(t.wins, 2);
        assert_eq!(t.draws, 1);
        assert_eq!(t.losses, 1);
        assert_eq!(t.avg_rounds, 25.0);
        assert_eq!(t.win_rate(), 0.5);
    }
}
