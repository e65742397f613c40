//! The five per-round actions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Action chosen by a player for one round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ChangeNothing,
    TurnLeft,
    TurnRight,
    SpeedUp,
    SlowDown,
}

impl Action {
    /// Canonical enumeration order (also the final tie-break order)
    pub const ALL: [Action; 5] = [
        Action::ChangeNothing,
        Action::TurnLeft,
        Action::TurnRight,
        Action::SpeedUp,
        Action::SlowDown,
    ];

    /// Actions that keep the current speed
    pub const STEERING: [Action; 3] = [Action::ChangeNothing, Action::TurnLeft, Action::TurnRight];

    /// Wire label used by the game server
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ChangeNothing => "change_nothing",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::SpeedUp => "speed_up",
            Action::SlowDown => "slow_down",
        }
    }

    /// Position in `Action::ALL`
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == label)
            .ok_or_else(|| GameError::InvalidAction(label.to_string()))
    }
}
