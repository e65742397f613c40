//! Game constants that parameterize the transition function

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Speed bound and jump-round parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Upper bound for a player's speed (lower bound is always 1)
    pub max_speed: u8,
    /// Every `jump_interval`-th round is a jump round
    pub jump_interval: u32,
    /// Minimum speed at which a player jumps on a jump round
    pub jump_speed_threshold: u8,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_speed: 10,
            jump_interval: 6,
            jump_speed_threshold: 3,
        }
    }
}

impl Rules {
    /// Whether `round` (the round being played, 1-based) is a jump round
    pub fn is_jump_round(&self, round: u32) -> bool {
        round % self.jump_interval == 0
    }

    /// Whether a player moving at `speed` in `round` only marks the ends of its path
    pub fn jumps(&self, round: u32, speed: u8) -> bool {
        self.is_jump_round(round) && speed >= self.jump_speed_threshold
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_speed == 0 {
            return Err(GameError::InvalidConfig("max_speed must be at least 1".into()));
        }
        if self.jump_interval == 0 {
            return Err(GameError::InvalidConfig("jump_interval must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = Rules::default();
        assert_eq!(rules.max_speed, 10);
        assert!(rules.is_jump_round(6));
        assert!(rules.is_jump_round(12));
        assert!(!rules.is_jump_round(5));
        assert!(rules.jumps(6, 3));
        assert!(!rules.jumps(6, 2));
        assert!(!rules.jumps(7, 10));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let rules: Rules = serde_json::from_str(r#"{"max_speed": 4}"#).unwrap();
        assert_eq!(rules.max_speed, 4);
        assert_eq!(rules.jump_interval, 6);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let rules = Rules { jump_interval: 0, ..Rules::default() };
        assert!(rules.validate().is_err());
    }
}
