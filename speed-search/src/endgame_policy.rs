//! Space filling once our region is closed off

use std::fmt;

use speed_core::{Action, GameError, GameRng, Observation, Policy, Position, Simulator};
use tracing::warn;

use crate::heuristics::{component, separated};
use crate::search::fallback_action;

/// Fills the remaining region as tightly as possible.
///
/// Among the actions that survive the round it keeps the largest reachable
/// region, then the lowest speed, then the head with the most blocked
/// neighbours (wall hugging). Remaining ties go to enumeration order.
#[derive(Clone, Debug, Default)]
pub struct EndgamePolicy;

impl EndgamePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Whether no active opponent can reach our region any more
    pub fn is_endgame(obs: &Observation) -> bool {
        let heads: Vec<Position> = obs.active_opponents().map(|p| p.position).collect();
        separated(&obs.cells, obs.you.position, &heads)
    }

    /// Ranking key of the state after one of our moves, `None` if we died
    fn key(next: &Simulator, obs: &Observation) -> Option<(usize, i32, usize)> {
        let me = next.player(obs.you.id).filter(|p| p.active)?;
        let region = component(next.cells(), me.position).len();
        let blocked = me
            .position
            .neighbors()
            .iter()
            .filter(|&&n| !next.cells().is_free(n))
            .count();
        Some((region, -(me.speed as i32), blocked))
    }

    pub fn choose(&self, obs: &Observation) -> Result<Action, GameError> {
        let root = obs.simulator()?.solo(obs.you.id)?;

        let mut best: Option<(Action, (usize, i32, usize))> = None;
        for action in Action::ALL {
            let next = root.step(&[action])?;
            if let Some(key) = Self::key(&next, obs) {
                if best.map_or(true, |(_, b)| key > b) {
                    best = Some((action, key));
                }
            }
        }
        Ok(best.map_or_else(|| fallback_action(&root, obs.you.id), |(a, _)| a))
    }
}

impl Policy for EndgamePolicy {
    fn act(&mut self, obs: &Observation, _rng: &mut GameRng) -> Action {
        if !obs.you.active {
            return Action::ChangeNothing;
        }
        match self.choose(obs) {
            Ok(action) => action,
            Err(e) => {
                warn!(error = %e, "endgame policy failed, falling back");
                obs.simulator()
                    .map(|sim| fallback_action(&sim, obs.you.id))
                    .unwrap_or(Action::ChangeNothing)
            }
        }
    }
}

impl fmt::Display for EndgamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EndgamePolicy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::{board, wall};
    use rand::SeedableRng;
    use speed_core::{Direction, Player, Rules};

    fn rng() -> GameRng {
        GameRng::seed_from_u64(5)
    }

    #[test]
    fn test_slows_down_to_save_space() {
        let sim = Simulator::with_players(
            10,
            10,
            vec![Player::new(1, Position::new(5, 5), Direction::Right).with_speed(3)],
            Rules::default(),
        )
        .unwrap();
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        assert_eq!(EndgamePolicy::new().act(&obs, &mut rng()), Action::SlowDown);
    }

    #[test]
    fn test_takes_only_surviving_move() {
        let sim = board(4, 4, &[(0, 0, Direction::Up)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        assert_eq!(EndgamePolicy::new().act(&obs, &mut rng()), Action::TurnRight);
    }

    #[test]
    fn test_hugs_the_wall() {
        // straight up and right leave the same region at the same speed
        let sim = board(6, 6, &[(0, 2, Direction::Up)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        assert_eq!(EndgamePolicy::new().act(&obs, &mut rng()), Action::ChangeNothing);
    }

    #[test]
    fn test_detects_endgame() {
        let sim = board(5, 3, &[(0, 1, Direction::Right), (4, 1, Direction::Left)]);
        let open = Observation::from_simulator(&sim, 1).unwrap();
        assert!(!EndgamePolicy::is_endgame(&open));

        let split = wall(&sim, 2, &[(2, 0), (2, 1), (2, 2)]);
        let closed = Observation::from_simulator(&split, 1).unwrap();
        assert!(EndgamePolicy::is_endgame(&closed));
    }
}
