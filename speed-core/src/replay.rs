//! Saved games: per-round snapshots serialized as JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cells::Cells;
use crate::error::ReplayError;
use crate::player::{Player, PlayerId};
use crate::simulator::Simulator;

/// Board state at the start of one round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round: u32,
    pub cells: Cells,
    pub players: Vec<Player>,
}

impl RoundSnapshot {
    pub fn of(sim: &Simulator) -> Self {
        Self {
            round: sim.round(),
            cells: sim.cells().clone(),
            players: sim.players().to_vec(),
        }
    }
}

/// A complete game, as written by the driver and read back for analysis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub width: usize,
    pub height: usize,
    /// Display names indexed by player id - 1
    pub names: Vec<String>,
    pub winner: Option<PlayerId>,
    /// Player controlled by the recording agent, if any
    pub you: Option<PlayerId>,
    pub rounds: Vec<RoundSnapshot>,
}

impl SavedGame {
    /// Number of rounds actually played
    pub fn len(&self) -> usize {
        self.rounds.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Final snapshot, if any round was recorded
    pub fn last(&self) -> Option<&RoundSnapshot> {
        self.rounds.last()
    }

    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        (id as usize)
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReplayError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
