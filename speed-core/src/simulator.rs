//! Forward model: a value-type game state that steps by returning copies

use rand::seq::index;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::action::Action;
use crate::cells::Cells;
use crate::error::GameError;
use crate::player::{Player, PlayerId, MAX_PLAYERS};
use crate::position::{Direction, Position};
use crate::rules::Rules;
use crate::simulate::{simulate, validate_players, Transition};

/// Complete game state usable as a clone-and-branch primitive.
///
/// `step` never mutates `self`; every call returns an independent simulator.
/// Untouched grid rows stay shared between the two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simulator {
    cells: Cells,
    players: Vec<Player>,
    round: u32,
    rules: Rules,
    eliminated: Vec<PlayerId>,
}

impl Simulator {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Wrap an existing state after checking its invariants
    pub fn new(cells: Cells, players: Vec<Player>, round: u32, rules: Rules) -> Result<Self, GameError> {
        rules.validate()?;
        validate_players(&cells, &players, &rules)?;
        Ok(Self {
            cells,
            players,
            round,
            rules,
            eliminated: Vec::new(),
        })
    }

    /// Fresh game on an empty grid; every head cell is marked
    pub fn with_players(width: usize, height: usize, players: Vec<Player>, rules: Rules) -> Result<Self, GameError> {
        let mut cells = Cells::new(width, height);
        for p in &players {
            cells.occupy(p.position, p.id)?;
        }
        Self::new(cells, players, 0, rules)
    }

    /// Fresh game with `n_players` at random distinct cells, random facing, speed 1
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        n_players: usize,
        rules: Rules,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if n_players == 0 || n_players > MAX_PLAYERS {
            return Err(GameError::InvalidConfig(format!(
                "player count {} outside [1, {}]",
                n_players, MAX_PLAYERS
            )));
        }
        if width * height < n_players {
            return Err(GameError::InvalidConfig(format!(
                "{}x{} grid cannot hold {} players",
                width, height, n_players
            )));
        }

        let players = index::sample(rng, width * height, n_players)
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let position = Position::new((cell % width) as i32, (cell / width) as i32);
                let direction = *Direction::ALL.choose(rng).unwrap_or(&Direction::Up);
                Player::new(i as PlayerId + 1, position, direction)
            })
            .collect();

        Self::with_players(width, height, players, rules)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Players eliminated by the step that produced this state
    pub fn eliminated(&self) -> &[PlayerId] {
        &self.eliminated
    }

    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.active).count()
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.player(id).map(|p| p.active).unwrap_or(false)
    }

    /// The game is over once at most one player is left
    pub fn is_over(&self) -> bool {
        self.active_count() <= 1
    }

    /// Sole surviving player, if the game ended with one
    pub fn winner(&self) -> Option<PlayerId> {
        let mut active = self.players.iter().filter(|p| p.active);
        match (active.next(), active.next()) {
            (Some(p), None) => Some(p.id),
            _ => None,
        }
    }

    /// Active players other than `id`
    pub fn opponents_of(&self, id: PlayerId) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(move |p| p.id != id && p.active)
    }

    // ========================================================================
    // STEPPING
    // ========================================================================

    /// One round with one action per *active* player, in player order
    pub fn step(&self, actions: &[Action]) -> Result<Simulator, GameError> {
        let active = self.active_count();
        if actions.len() != active {
            return Err(GameError::illegal(format!(
                "{} actions for {} active players",
                actions.len(),
                active
            )));
        }
        let mut given = actions.iter();
        let full: Vec<Action> = self
            .players
            .iter()
            .map(|p| {
                if p.active {
                    given.next().copied().unwrap_or(Action::ChangeNothing)
                } else {
                    Action::ChangeNothing
                }
            })
            .collect();
        self.step_all(&full)
    }

    /// One round with one action per player (inactive entries ignored)
    pub fn step_all(&self, actions: &[Action]) -> Result<Simulator, GameError> {
        let Transition {
            cells,
            players,
            round,
            eliminated,
        } = simulate(&self.cells, &self.players, self.round, actions, &self.rules)?;
        Ok(Simulator {
            cells,
            players,
            round,
            rules: self.rules,
            eliminated,
        })
    }

    /// One round where the listed players play the given actions and
    /// everyone else plays `change_nothing`
    pub fn step_with(&self, overrides: &[(PlayerId, Action)]) -> Result<Simulator, GameError> {
        let actions: Vec<Action> = self
            .players
            .iter()
            .map(|p| {
                overrides
                    .iter()
                    .find(|(id, _)| *id == p.id)
                    .map(|(_, a)| *a)
                    .unwrap_or(Action::ChangeNothing)
            })
            .collect();
        self.step_all(&actions)
    }

    /// Single-player view: only `id` moves, every other trail and head is a
    /// static obstacle
    pub fn solo(&self, id: PlayerId) -> Result<Simulator, GameError> {
        let player = self
            .player(id)
            .copied()
            .ok_or_else(|| GameError::illegal(format!("no player with id {}", id)))?;
        Ok(Simulator {
            cells: self.cells.clone(),
            players: vec![player],
            round: self.round,
            rules: self.rules,
            eliminated: Vec::new(),
        })
    }

    /// Replace the grid, e.g. with a pessimistic occupancy map
    pub fn with_cells(&self, cells: Cells) -> Result<Simulator, GameError> {
        if cells.width() != self.cells.width() || cells.height() != self.cells.height() {
            return Err(GameError::illegal(format!(
                "grid {}x{} does not match {}x{}",
                cells.width(),
                cells.height(),
                self.cells.width(),
                self.cells.height()
            )));
        }
        validate_players(&cells, &self.players, &self.rules)?;
        Ok(Simulator {
            cells,
            players: self.players.clone(),
            round: self.round,
            rules: self.rules,
            eliminated: Vec::new(),
        })
    }
}
