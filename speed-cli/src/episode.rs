//! Shared episode setup and the outer `reset -> act -> step` loop

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use speed_core::{Policy, SavedGame, SimulatedEnv};
use speed_search::{AnyPolicy, PolicyConfig};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

/// Board and player options shared by every command
#[derive(Args, Clone, Debug)]
pub struct GameArgs {
    /// Board width
    #[arg(long, default_value = "40")]
    pub width: usize,

    /// Board height
    #[arg(long, default_value = "40")]
    pub height: usize,

    /// Controlled policy: a built-in name or a JSON policy file
    #[arg(long, default_value = "elspeth")]
    pub policy: String,

    /// Opponent policies, comma separated (names or JSON files)
    #[arg(long, value_delimiter = ',', default_value = "maze_walker,spiral")]
    pub opponents: Vec<String>,

    /// Wall-clock budget per decision of the controlled policy
    #[arg(long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,
}

impl GameArgs {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

/// Final result of one episode from the controlled player's side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn from_reward(reward: f64) -> Self {
        if reward > 0.0 {
            Outcome::Win
        } else if reward < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EpisodeRecord {
    pub outcome: Outcome,
    pub rounds: u32,
}

// ============================================================================
// SETUP
// ============================================================================

/// Resolve and build one policy by name or file
pub fn load_policy(source: &str) -> Result<AnyPolicy> {
    let config = PolicyConfig::resolve(source).with_context(|| format!("Failed to resolve policy: {}", source))?;
    config
        .build()
        .with_context(|| format!("Failed to build policy: {}", source))
}

/// Environment with the configured opponents; returns the display names of
/// all players in id order, controlled player first
pub fn make_env(args: &GameArgs, agent: &AnyPolicy, seed: u64) -> Result<(SimulatedEnv, Vec<String>)> {
    let mut names = vec![agent.to_string()];
    let mut opponents: Vec<Box<dyn Policy>> = Vec::with_capacity(args.opponents.len());
    for source in &args.opponents {
        let policy = load_policy(source)?;
        names.push(policy.to_string());
        opponents.push(Box::new(policy));
    }
    Ok((SimulatedEnv::new(args.width, args.height, opponents, seed), names))
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// EPISODE LOOP
// ============================================================================

/// Play one episode to the end
pub fn play_episode(
    env: &mut SimulatedEnv,
    agent: &mut dyn Policy,
    time_budget: Option<Duration>,
    rng: &mut ChaCha8Rng,
) -> Result<EpisodeRecord> {
    let mut obs = env.reset().context("Failed to reset environment")?;
    let mut rounds = 0;

    loop {
        if let Some(budget) = time_budget {
            obs = obs.with_deadline(Instant::now() + budget);
        }
        let action = agent.act(&obs, rng);
        let result = env
            .step(action)
            .with_context(|| format!("Step failed in round {}", rounds + 1))?;
        rounds += 1;

        if result.done {
            return Ok(EpisodeRecord {
                outcome: Outcome::from_reward(result.reward),
                rounds,
            });
        }
        obs = result.observation;
    }
}

/// Seed for the next environment, drawn from the driver RNG
pub fn env_seed(rng: &mut ChaCha8Rng) -> u64 {
    rng.gen()
}

/// Replay of the episode the environment last played
pub fn replay(env: &SimulatedEnv, names: Vec<String>) -> SavedGame {
    env.saved_game(names)
}
