//! Random tie-breaker

use std::fmt;

use rand::Rng;
use speed_core::GameRng;

use super::{Heuristic, Snapshot};

/// Uniform value in `[0, 1)` drawn from the threaded RNG. Meant to be added
/// with a negligible weight to break ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomHeuristic;

impl Heuristic for RandomHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64 {
        if !snapshot.player.active {
            return 0.0;
        }
        rng.gen::<f64>()
    }
}

impl fmt::Display for RandomHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Random")
    }
}
