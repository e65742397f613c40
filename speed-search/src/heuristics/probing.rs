//! Random probe runs through the forward model

use std::fmt;

use rand::seq::SliceRandom;
use speed_core::{Action, GameError, GameRng, Simulator};
use tracing::debug;

use super::{Heuristic, Snapshot};

/// Average outcome of `n_probes` random continuations of at most `n_steps`
/// rounds for the player alone (opponent trails are static obstacles).
///
/// A probe is worth its survival fraction, or with a delegate the mean of the
/// survival fraction and the delegate's score at the probe's final state.
pub struct RandomProbingHeuristic {
    delegate: Option<Box<dyn Heuristic>>,
    pub n_steps: u32,
    pub n_probes: u32,
}

impl RandomProbingHeuristic {
    pub fn new(n_steps: u32, n_probes: u32) -> Self {
        Self {
            delegate: None,
            n_steps,
            n_probes,
        }
    }

    pub fn with_delegate(mut self, delegate: Box<dyn Heuristic>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// One random continuation
    fn probe(&self, start: &Simulator, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> Result<f64, GameError> {
        let id = snapshot.player.id;
        let mut state = start.clone();
        let mut survived = 0;

        while survived < self.n_steps {
            let action = *Action::ALL.choose(rng).unwrap_or(&Action::ChangeNothing);
            state = state.step(&[action])?;
            if !state.is_active(id) {
                break;
            }
            survived += 1;
        }

        let survival = survived as f64 / self.n_steps as f64;
        let Some(delegate) = &self.delegate else {
            return Ok(survival);
        };

        let end = state
            .player(id)
            .copied()
            .ok_or_else(|| GameError::IllegalState(format!("probe lost player {}", id)))?;
        let end_snapshot = Snapshot::new(
            state.cells(),
            end,
            snapshot.opponents.clone(),
            state.round(),
            snapshot.rules,
        );
        Ok((survival + delegate.score(&end_snapshot, rng)) / 2.0)
    }
}

impl Heuristic for RandomProbingHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64 {
        if !snapshot.player.active || self.n_probes == 0 || self.n_steps == 0 {
            return 0.0;
        }

        let start = match Simulator::new(
            snapshot.cells.clone(),
            vec![snapshot.player],
            snapshot.round,
            snapshot.rules,
        ) {
            Ok(sim) => sim,
            Err(e) => {
                debug!(error = %e, "probe start rejected");
                return 0.0;
            }
        };

        let total: f64 = (0..self.n_probes)
            .map(|_| match self.probe(&start, snapshot, rng) {
                Ok(v) => v,
                Err(e) => {
                    debug!(error = %e, "probe diverged");
                    0.0
                }
            })
            .sum();
        total / self.n_probes as f64
    }
}

impl fmt::Display for RandomProbingHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.delegate {
            Some(d) => write!(f, "RandomProbing({}, steps={}, probes={})", d, self.n_steps, self.n_probes),
            None => write!(f, "RandomProbing(steps={}, probes={})", self.n_steps, self.n_probes),
        }
    }
}
