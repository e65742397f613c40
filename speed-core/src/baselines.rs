//! Reactive baseline policies
//!
//! O(1) per decision. Used as opponents in the simulated environment and as
//! benchmarks for the search policies.

use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::action::Action;
use crate::error::GameError;
use crate::policy::{GameRng, Observation, Policy};
use crate::position::{Direction, Position};

// ============================================================================
// RANDOM
// ============================================================================

/// Uniform (or weighted) random action
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy {
    weights: Option<WeightedIndex<f64>>,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw actions with the given probabilities, in `Action::ALL` order
    pub fn with_probabilities(p: [f64; 5]) -> Result<Self, GameError> {
        let weights = WeightedIndex::new(p)
            .map_err(|e| GameError::InvalidConfig(format!("action probabilities {:?}: {}", p, e)))?;
        Ok(Self { weights: Some(weights) })
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _obs: &Observation, rng: &mut GameRng) -> Action {
        match &self.weights {
            Some(w) => Action::ALL[w.sample(rng)],
            None => *Action::ALL.choose(rng).unwrap_or(&Action::ChangeNothing),
        }
    }
}

impl fmt::Display for RandomPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomPolicy")
    }
}

// ============================================================================
// RELATIVE NEIGHBOURHOOD
// ============================================================================

/// Free-cell checks relative to the player's head and facing
struct Surroundings<'a> {
    obs: &'a Observation,
}

impl<'a> Surroundings<'a> {
    fn new(obs: &'a Observation) -> Self {
        Self { obs }
    }

    fn free_at(&self, direction: Direction, distance: i32) -> bool {
        let target: Position = self.obs.you.position.step(direction, distance);
        self.obs.is_free(target)
    }

    fn forward(&self, distance: i32) -> bool {
        self.free_at(self.obs.you.direction, distance)
    }

    fn left(&self) -> bool {
        self.free_at(self.obs.you.direction.turn_left(), 1)
    }

    fn right(&self) -> bool {
        self.free_at(self.obs.you.direction.turn_right(), 1)
    }
}

// ============================================================================
// SPIRAL
// ============================================================================

/// Goes straight while two cells ahead are free, otherwise turns in its
/// current rotational sense, flipping the sense when that side is blocked
#[derive(Clone, Debug)]
pub struct SpiralPolicy {
    clockwise: bool,
}

impl SpiralPolicy {
    pub fn new() -> Self {
        Self { clockwise: true }
    }
}

impl Default for SpiralPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for SpiralPolicy {
    fn act(&mut self, obs: &Observation, _rng: &mut GameRng) -> Action {
        let around = Surroundings::new(obs);

        if around.forward(1) && around.forward(2) {
            return Action::ChangeNothing;
        }

        if self.clockwise {
            if around.right() {
                return Action::TurnRight;
            }
            if around.left() {
                self.clockwise = false;
                return Action::TurnLeft;
            }
        } else {
            if around.left() {
                return Action::TurnLeft;
            }
            if around.right() {
                self.clockwise = true;
                return Action::TurnRight;
            }
        }

        // surrounded
        Action::ChangeNothing
    }
}

impl fmt::Display for SpiralPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpiralPolicy")
    }
}

// ============================================================================
// MAZE WALKER
// ============================================================================

/// Goes straight until it hits an obstacle, then turns right, or left if the
/// right side is blocked
#[derive(Clone, Debug, Default)]
pub struct MazeWalkerPolicy;

impl MazeWalkerPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for MazeWalkerPolicy {
    fn act(&mut self, obs: &Observation, _rng: &mut GameRng) -> Action {
        let around = Surroundings::new(obs);
        if around.forward(1) {
            Action::ChangeNothing
        } else if around.right() {
            Action::TurnRight
        } else if around.left() {
            Action::TurnLeft
        } else {
            Action::ChangeNothing
        }
    }
}

impl fmt::Display for MazeWalkerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MazeWalkerPolicy")
    }
}

// ============================================================================
// SCRIPTED
// ============================================================================

/// Replays a fixed action sequence, then keeps `change_nothing`
#[derive(Clone, Debug)]
pub struct ScriptedPolicy {
    script: Vec<Action>,
    next: usize,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Action>) -> Self {
        Self { script, next: 0 }
    }

    /// Parse the script from wire labels
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, GameError> {
        let script = labels
            .iter()
            .map(|l| l.as_ref().parse())
            .collect::<Result<Vec<Action>, _>>()?;
        Ok(Self::new(script))
    }
}

impl Policy for ScriptedPolicy {
    fn act(&mut self, _obs: &Observation, _rng: &mut GameRng) -> Action {
        let action = self.script.get(self.next).copied().unwrap_or(Action::ChangeNothing);
        self.next += 1;
        action
    }
}

impl fmt::Display for ScriptedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptedPolicy(len={})", self.script.len())
    }
}

// ============================================================================
// CIRCLE
// ============================================================================

/// Turns in one fixed rotational sense whenever that side is free, so the
/// trail winds inward; goes straight or turns the other way when blocked
#[derive(Clone, Debug)]
pub struct CirclePolicy {
    clockwise: bool,
}

impl CirclePolicy {
    pub fn new(clockwise: bool) -> Self {
        Self { clockwise }
    }
}

impl Default for CirclePolicy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Policy for CirclePolicy {
    fn act(&mut self, obs: &Observation, _rng: &mut GameRng) -> Action {
        let around = Surroundings::new(obs);
        let (turn, turn_free, other, other_free) = if self.clockwise {
            (Action::TurnRight, around.right(), Action::TurnLeft, around.left())
        } else {
            (Action::TurnLeft, around.left(), Action::TurnRight, around.right())
        };

        if turn_free {
            turn
        } else if around.forward(1) {
            Action::ChangeNothing
        } else if other_free {
            other
        } else {
            Action::ChangeNothing
        }
    }
}

impl fmt::Display for CirclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sense = if self.clockwise { "cw" } else { "ccw" };
        write!(f, "CirclePolicy({})", sense)
    }
}
