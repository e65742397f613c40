//! Heuristic evaluation framework
//!
//! A heuristic scores a hypothetical state from one player's point of view.
//! Basic heuristics return values in `[0, 1]`; an inactive player scores 0
//! everywhere. Randomness only comes from the threaded RNG.

mod composite;
mod config;
mod occupancy;
mod opponent_distance;
mod path_length;
mod probing;
mod random;
mod region;

use std::fmt;

use speed_core::{Cells, GameRng, Observation, Player, PlayerId, Rules, Simulator};

pub use composite::CompositeHeuristic;
pub use config::{HeuristicConfig, WeightedHeuristic};
pub use occupancy::occupancy_map;
pub use opponent_distance::OpponentDistanceHeuristic;
pub use path_length::PathLengthHeuristic;
pub use probing::RandomProbingHeuristic;
pub use random::RandomHeuristic;
pub use region::{component, separated, RegionHeuristic};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// The state a heuristic looks at: a grid plus the scored player and the
/// other players on it
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    pub cells: &'a Cells,
    pub player: Player,
    pub opponents: Vec<Player>,
    pub round: u32,
    pub rules: Rules,
}

impl<'a> Snapshot<'a> {
    pub fn new(cells: &'a Cells, player: Player, opponents: Vec<Player>, round: u32, rules: Rules) -> Self {
        Self {
            cells,
            player,
            opponents,
            round,
            rules,
        }
    }

    pub fn from_observation(obs: &'a Observation) -> Self {
        Self::new(&obs.cells, obs.you, obs.opponents.clone(), obs.round, obs.rules)
    }

    /// Player `id` in a simulated state, with every other player as opponent
    pub fn of(sim: &'a Simulator, id: PlayerId) -> Option<Self> {
        let player = *sim.player(id)?;
        let opponents = sim.players().iter().filter(|p| p.id != id).copied().collect();
        Some(Self::new(sim.cells(), player, opponents, sim.round(), *sim.rules()))
    }

    pub fn active_opponents(&self) -> impl Iterator<Item = &Player> + '_ {
        self.opponents.iter().filter(|p| p.active)
    }
}

// ============================================================================
// HEURISTIC TRAIT
// ============================================================================

/// Pure scoring function over a snapshot
pub trait Heuristic: fmt::Display + Send + Sync {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64 {
        (**self).score(snapshot, rng)
    }
}
