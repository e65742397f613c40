//! One-ply greedy policy over a heuristic

use std::fmt;

use speed_core::{Action, GameError, GameRng, Observation, Policy, Simulator};
use tracing::warn;

use crate::heuristics::{occupancy_map, Heuristic, HeuristicConfig, Snapshot};
use crate::search::{fallback_action, select, LOSS_VALUE};

/// Plays the action whose resulting state the heuristic likes best.
///
/// With `occupancy_map_depth > 0` the lookahead grid marks every cell an
/// opponent could reach within that many rounds as occupied.
pub struct HeuristicPolicy {
    heuristic: Box<dyn Heuristic>,
    pub occupancy_map_depth: u32,
}

impl HeuristicPolicy {
    pub fn new(heuristic: Box<dyn Heuristic>) -> Self {
        Self {
            heuristic,
            occupancy_map_depth: 0,
        }
    }

    pub fn with_occupancy_map_depth(mut self, depth: u32) -> Self {
        self.occupancy_map_depth = depth;
        self
    }

    /// The tuned preset with a three-round occupancy map
    pub fn elspeth() -> Self {
        let heuristic = HeuristicConfig::elspeth().build_unchecked();
        Self::new(heuristic).with_occupancy_map_depth(3)
    }

    fn root(&self, obs: &Observation, inflate: bool) -> Result<Simulator, GameError> {
        let solo = obs.simulator()?.solo(obs.you.id)?;
        if !inflate || self.occupancy_map_depth == 0 {
            return Ok(solo);
        }
        let cells = occupancy_map(&obs.cells, &obs.opponents, self.occupancy_map_depth, &obs.rules)?;
        solo.with_cells(cells)
    }

    /// Heuristic value of every action on `root`, `LOSS_VALUE` where we die
    fn values(&self, root: &Simulator, obs: &Observation, rng: &mut GameRng) -> Result<Vec<(Action, f64)>, GameError> {
        let id = obs.you.id;
        let mut values = Vec::with_capacity(Action::ALL.len());
        for action in Action::ALL {
            let next = root.step(&[action])?;
            let value = match next.player(id) {
                Some(p) if p.active => {
                    let snapshot = Snapshot::new(next.cells(), *p, obs.opponents.clone(), next.round(), obs.rules);
                    self.heuristic.score(&snapshot, rng)
                }
                _ => LOSS_VALUE,
            };
            values.push((action, value));
        }
        Ok(values)
    }

    /// Best action with its value
    pub fn choose(&self, obs: &Observation, rng: &mut GameRng) -> Result<(Action, f64), GameError> {
        let mut root = self.root(obs, true)?;
        let mut values = self.values(&root, obs, rng)?;

        if self.occupancy_map_depth > 0 && values.iter().all(|(_, v)| *v <= LOSS_VALUE) {
            // too pessimistic: no move survives the inflated grid
            root = self.root(obs, false)?;
            values = self.values(&root, obs, rng)?;
        }

        select(&root, obs.you.id, &values).ok_or_else(|| GameError::IllegalState("no actions to choose from".into()))
    }
}

impl Policy for HeuristicPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        if !obs.you.active {
            return Action::ChangeNothing;
        }
        match self.choose(obs, rng) {
            Ok((action, _)) => action,
            Err(e) => {
                warn!(error = %e, "heuristic policy failed, falling back");
                obs.simulator()
                    .map(|sim| fallback_action(&sim, obs.you.id))
                    .unwrap_or(Action::ChangeNothing)
            }
        }
    }
}

impl fmt::Display for HeuristicPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeuristicPolicy({}, occupancy={})", self.heuristic, self.occupancy_map_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::board;
    use crate::heuristics::{PathLengthHeuristic, RegionHeuristic};
    use rand::SeedableRng;
    use speed_core::Direction;

    fn rng() -> GameRng {
        GameRng::seed_from_u64(1)
    }

    #[test]
    fn test_greedy_follows_heuristic() {
        let sim = board(12, 3, &[(1, 1, Direction::Right)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let pol = HeuristicPolicy::new(Box::new(PathLengthHeuristic::new(10)));
        let (action, value) = pol.choose(&obs, &mut rng()).unwrap();
        assert_eq!(action, Action::ChangeNothing);
        assert!((value - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_avoids_certain_death() {
        let sim = board(5, 5, &[(0, 0, Direction::Up), (4, 4, Direction::Left)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut pol = HeuristicPolicy::new(Box::new(RegionHeuristic::new(false)));
        assert_eq!(pol.act(&obs, &mut rng()), Action::TurnRight);
    }

    #[test]
    fn test_falls_back_to_plain_grid_when_map_blocks_everything() {
        // opponent right next to us sweeps every cell we could enter
        let sim = board(5, 5, &[(2, 2, Direction::Up), (2, 1, Direction::Down)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let pol = HeuristicPolicy::new(Box::new(RegionHeuristic::new(true))).with_occupancy_map_depth(3);
        let (_, value) = pol.choose(&obs, &mut rng()).unwrap();
        assert!(value > LOSS_VALUE);
    }

    #[test]
    fn test_elspeth_plays_legal_moves() {
        let sim = board(10, 10, &[(1, 1, Direction::Right), (8, 8, Direction::Left)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut pol = HeuristicPolicy::elspeth();
        let action = pol.act(&obs, &mut rng());
        let next = sim.step_with(&[(1, action)]).unwrap();
        assert!(next.is_active(1));
    }
}
