//! Survival by random probe runs
//!
//! For each candidate action, `n_probes` random continuations of at most
//! `n_steps` rounds are played for the player alone; the action with the
//! most rounds survived in total wins, ties going to enumeration order.

use std::fmt;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use speed_core::{Action, GameError, GameRng, Observation, PlayerId, Policy, Simulator};
use tracing::{debug, warn};

use crate::search::fallback_action;

/// Probe-based survival policy
#[derive(Clone, Debug)]
pub struct RandomProbingPolicy {
    pub n_steps: u32,
    pub n_probes: u32,
    /// Probe with all five actions instead of the three steering ones
    pub full_action_set: bool,
}

impl Default for RandomProbingPolicy {
    fn default() -> Self {
        Self {
            n_steps: 3,
            n_probes: 10,
            full_action_set: false,
        }
    }
}

impl RandomProbingPolicy {
    pub fn new(n_steps: u32, n_probes: u32) -> Self {
        Self {
            n_steps,
            n_probes,
            ..Default::default()
        }
    }

    pub fn with_full_action_set(mut self, full: bool) -> Self {
        self.full_action_set = full;
        self
    }

    pub fn actions(&self) -> &'static [Action] {
        if self.full_action_set {
            &Action::ALL
        } else {
            &Action::STEERING
        }
    }

    /// Random steps taken after `action`, the fatal one included; 0 when
    /// `action` itself is fatal
    fn probe(&self, start: &Simulator, id: PlayerId, action: Action, rng: &mut GameRng) -> Result<u32, GameError> {
        let mut state = start.step(&[action])?;
        let mut steps = 0;
        while state.is_active(id) && steps < self.n_steps {
            let next = *self.actions().choose(rng).unwrap_or(&Action::ChangeNothing);
            state = state.step(&[next])?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Total survived rounds over all probes of one root action
    fn total(&self, start: &Simulator, id: PlayerId, action: Action, seed: u64) -> u64 {
        let mut rng = GameRng::seed_from_u64(seed);
        (0..self.n_probes)
            .map(|_| match self.probe(start, id, action, &mut rng) {
                Ok(n) => n as u64,
                Err(e) => {
                    debug!(error = %e, ?action, "probe diverged");
                    0
                }
            })
            .sum()
    }

    /// Survival totals per candidate action, in enumeration order
    pub fn totals(&self, obs: &Observation, rng: &mut GameRng) -> Result<Vec<(Action, u64)>, GameError> {
        if self.n_steps == 0 || self.n_probes == 0 {
            return Err(GameError::InvalidConfig(format!(
                "probing needs positive steps and probes, got {} and {}",
                self.n_steps, self.n_probes
            )));
        }
        let id = obs.you.id;
        let start = obs.simulator()?.solo(id)?;
        let seeded: Vec<(Action, u64)> = self.actions().iter().map(|&a| (a, rng.gen())).collect();

        #[cfg(feature = "parallel")]
        let totals: Vec<(Action, u64)> = {
            use rayon::prelude::*;
            seeded
                .par_iter()
                .map(|&(a, seed)| {
                    let own = start.clone();
                    (a, self.total(&own, id, a, seed))
                })
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let totals: Vec<(Action, u64)> = seeded
            .iter()
            .map(|&(a, seed)| (a, self.total(&start, id, a, seed)))
            .collect();

        Ok(totals)
    }
}

impl Policy for RandomProbingPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        if !obs.you.active {
            return Action::ChangeNothing;
        }
        match self.totals(obs, rng) {
            Ok(totals) => {
                let mut best: Option<(Action, u64)> = None;
                for (a, total) in totals {
                    if best.map_or(true, |(_, b)| total > b) {
                        best = Some((a, total));
                    }
                }
                best.map_or(Action::ChangeNothing, |(a, _)| a)
            }
            Err(e) => {
                warn!(error = %e, "probing failed, falling back");
                obs.simulator()
                    .map(|sim| fallback_action(&sim, obs.you.id))
                    .unwrap_or(Action::ChangeNothing)
            }
        }
    }
}

impl fmt::Display for RandomProbingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomProbingPolicy(steps={}, probes={}, full={})",
            self.n_steps, self.n_probes, self.full_action_set
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::board;
    use speed_core::Direction;

    fn rng(seed: u64) -> GameRng {
        GameRng::seed_from_u64(seed)
    }

    #[test]
    fn test_avoids_wall() {
        let sim = board(6, 6, &[(0, 0, Direction::Up), (5, 5, Direction::Down)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut pol = RandomProbingPolicy::default();
        assert_eq!(pol.act(&obs, &mut rng(1)), Action::TurnRight);
    }

    #[test]
    fn test_totals_are_reproducible() {
        let sim = board(8, 8, &[(3, 3, Direction::Left), (6, 6, Direction::Up)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let pol = RandomProbingPolicy::new(4, 6).with_full_action_set(true);
        let a = pol.totals(&obs, &mut rng(7)).unwrap();
        let b = pol.totals(&obs, &mut rng(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert!(a.iter().all(|(_, t)| *t <= 4 * 6));
    }

    #[test]
    fn test_surviving_root_outscores_immediate_death() {
        // going straight survives one round, then every random step is fatal
        let sim = board(2, 1, &[(0, 0, Direction::Right)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let pol = RandomProbingPolicy::new(3, 5);
        let totals = pol.totals(&obs, &mut rng(3)).unwrap();
        assert_eq!(
            totals,
            vec![(Action::ChangeNothing, 5), (Action::TurnLeft, 0), (Action::TurnRight, 0)]
        );
    }

    #[test]
    fn test_picks_only_surviving_move_in_pocket() {
        // 1x2 grid: only turning right (up) stays on the board
        let sim = board(1, 2, &[(0, 1, Direction::Left)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut pol = RandomProbingPolicy::new(3, 5);
        let action = pol.act(&obs, &mut rng(4));
        assert_eq!(action, Action::TurnRight);
        assert!(sim.step(&[action]).unwrap().is_active(1));
    }

    #[test]
    fn test_zero_probes_fall_back_to_surviving_move() {
        let sim = board(6, 6, &[(0, 0, Direction::Up), (5, 5, Direction::Down)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut pol = RandomProbingPolicy::new(3, 0);
        assert!(matches!(pol.totals(&obs, &mut rng(1)), Err(GameError::InvalidConfig(_))));
        assert_eq!(pol.act(&obs, &mut rng(1)), Action::TurnRight);
    }

    #[test]
    fn test_open_space_survives_every_probe() {
        let sim = board(31, 31, &[(15, 15, Direction::Up)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let pol = RandomProbingPolicy::new(2, 4);
        let totals = pol.totals(&obs, &mut rng(2)).unwrap();
        assert!(totals.iter().all(|(_, t)| *t == 8));
    }
}
