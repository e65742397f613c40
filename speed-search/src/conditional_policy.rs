//! Switch between two policies on a board condition

use std::fmt;

use serde::{Deserialize, Serialize};
use speed_core::{Action, GameRng, Observation, Policy};
use tracing::debug;

use crate::endgame_policy::EndgamePolicy;

/// Predicate over the current observation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// No active opponent can reach our region
    Separated,
    /// Some active opponent head is within this Manhattan distance
    OpponentWithin { distance: u32 },
}

impl Condition {
    pub fn holds(&self, obs: &Observation) -> bool {
        match *self {
            Condition::Separated => EndgamePolicy::is_endgame(obs),
            Condition::OpponentWithin { distance } => obs
                .active_opponents()
                .any(|p| obs.you.position.distance_to(p.position) <= distance as i32),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Separated => write!(f, "separated"),
            Condition::OpponentWithin { distance } => write!(f, "opponent_within({})", distance),
        }
    }
}

/// Delegates every round to `if_true` or `if_false` depending on `condition`
pub struct ConditionalPolicy {
    condition: Condition,
    if_true: Box<dyn Policy>,
    if_false: Box<dyn Policy>,
    last: Option<bool>,
}

impl ConditionalPolicy {
    pub fn new(condition: Condition, if_true: Box<dyn Policy>, if_false: Box<dyn Policy>) -> Self {
        Self {
            condition,
            if_true,
            if_false,
            last: None,
        }
    }
}

impl Policy for ConditionalPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        let holds = self.condition.holds(obs);
        if self.last != Some(holds) {
            let active = if holds { &self.if_true } else { &self.if_false };
            debug!(round = obs.round, condition = %self.condition, holds, policy = %active, "switching policy");
            self.last = Some(holds);
        }
        if holds {
            self.if_true.act(obs, rng)
        } else {
            self.if_false.act(obs, rng)
        }
    }
}

impl fmt::Display for ConditionalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConditionalPolicy({}, {}, {})", self.condition, self.if_true, self.if_false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::{board, wall};
    use rand::SeedableRng;
    use speed_core::{Direction, ScriptedPolicy};

    fn scripted(action: Action) -> Box<dyn Policy> {
        Box::new(ScriptedPolicy::new(vec![action; 4]))
    }

    fn separated_policy() -> ConditionalPolicy {
        ConditionalPolicy::new(Condition::Separated, scripted(Action::SpeedUp), scripted(Action::TurnLeft))
    }

    #[test]
    fn test_open_board_takes_false_branch() {
        let sim = board(5, 3, &[(0, 1, Direction::Right), (4, 1, Direction::Left)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        let mut rng = GameRng::seed_from_u64(0);
        assert_eq!(separated_policy().act(&obs, &mut rng), Action::TurnLeft);
    }

    #[test]
    fn test_switches_once_region_is_closed() {
        let sim = board(5, 3, &[(0, 1, Direction::Right), (4, 1, Direction::Left)]);
        let split = wall(&sim, 2, &[(2, 0), (2, 1), (2, 2)]);
        let mut policy = separated_policy();
        let mut rng = GameRng::seed_from_u64(0);

        let open = Observation::from_simulator(&sim, 1).unwrap();
        assert_eq!(policy.act(&open, &mut rng), Action::TurnLeft);
        let closed = Observation::from_simulator(&split, 1).unwrap();
        assert_eq!(policy.act(&closed, &mut rng), Action::SpeedUp);
        assert_eq!(policy.last, Some(true));
    }

    #[test]
    fn test_opponent_within() {
        let sim = board(10, 10, &[(0, 0, Direction::Right), (3, 4, Direction::Left)]);
        let obs = Observation::from_simulator(&sim, 1).unwrap();
        assert!(Condition::OpponentWithin { distance: 7 }.holds(&obs));
        assert!(!Condition::OpponentWithin { distance: 6 }.holds(&obs));
    }

    #[test]
    fn test_condition_json() {
        let c: Condition = serde_json::from_str(r#"{"kind": "opponent_within", "distance": 4}"#).unwrap();
        assert_eq!(c, Condition::OpponentWithin { distance: 4 });
        let s: Condition = serde_json::from_str(r#"{"kind": "separated"}"#).unwrap();
        assert_eq!(s, Condition::Separated);
    }
}
