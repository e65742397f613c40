//! Player token state

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::position::{Direction, Position};
use crate::rules::Rules;

/// Player identifier, 1-based; `0` marks a free cell
pub type PlayerId = u8;

/// Most players in one game
pub const MAX_PLAYERS: usize = 6;

/// One player's token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub position: Position,
    pub direction: Direction,
    pub speed: u8,
    pub active: bool,
}

impl Player {
    /// Active player at speed 1
    pub fn new(id: PlayerId, position: Position, direction: Direction) -> Self {
        Self {
            id,
            position,
            direction,
            speed: 1,
            active: true,
        }
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    /// Apply an action to direction/speed. Speed is clamped to `[1, max_speed]`.
    pub fn apply(&mut self, action: Action, rules: &Rules) {
        match action {
            Action::ChangeNothing => {}
            Action::TurnLeft => self.direction = self.direction.turn_left(),
            Action::TurnRight => self.direction = self.direction.turn_right(),
            Action::SpeedUp => self.speed = self.speed.saturating_add(1).min(rules.max_speed),
            Action::SlowDown => self.speed = self.speed.saturating_sub(1).max(1),
        }
    }

    /// Head position after moving `speed` cells straight ahead
    pub fn destination(&self) -> Position {
        self.position.step(self.direction, self.speed as i32)
    }
}
