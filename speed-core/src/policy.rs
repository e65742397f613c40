//! Policy contract shared by every decision strategy

use std::fmt;
use std::time::{Duration, Instant};

use rand_chacha::ChaCha8Rng;

use crate::action::Action;
use crate::cells::Cells;
use crate::error::GameError;
use crate::player::{Player, PlayerId};
use crate::position::Position;
use crate::rules::Rules;
use crate::simulator::Simulator;

/// RNG handle threaded through every policy and heuristic call
pub type GameRng = ChaCha8Rng;

/// What a policy sees of the game for one decision
#[derive(Clone, Debug)]
pub struct Observation {
    pub cells: Cells,
    pub you: Player,
    /// All other players, active or not
    pub opponents: Vec<Player>,
    pub round: u32,
    pub rules: Rules,
    /// Wall-clock instant by which `act` must have returned
    pub deadline: Option<Instant>,
}

impl Observation {
    /// Observation of player `id` in a simulated game
    pub fn from_simulator(sim: &Simulator, id: PlayerId) -> Result<Self, GameError> {
        let you = sim
            .player(id)
            .copied()
            .ok_or_else(|| GameError::IllegalState(format!("no player with id {}", id)))?;
        Ok(Self {
            cells: sim.cells().clone(),
            you,
            opponents: sim.players().iter().filter(|p| p.id != id).copied().collect(),
            round: sim.round(),
            rules: *sim.rules(),
            deadline: None,
        })
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline from the observation, or `budget` from now if none was given
    pub fn deadline_or(&self, budget: Duration) -> Instant {
        self.deadline.unwrap_or_else(|| Instant::now() + budget)
    }

    pub fn is_free(&self, pos: Position) -> bool {
        self.cells.is_free(pos)
    }

    /// Only the opponents still in the game
    pub fn active_opponents(&self) -> impl Iterator<Item = &Player> + '_ {
        self.opponents.iter().filter(|p| p.active)
    }

    /// Rebuild a forward model containing every player, ordered by id
    pub fn simulator(&self) -> Result<Simulator, GameError> {
        let mut players: Vec<Player> = self.opponents.clone();
        players.push(self.you);
        players.sort_by_key(|p| p.id);
        Simulator::new(self.cells.clone(), players, self.round, self.rules)
    }
}

/// A decision strategy: one action per observation.
///
/// `act` is infallible. Policies that can fail internally (search, probing)
/// must fall back to a legal action themselves.
pub trait Policy: fmt::Display {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        (**self).act(obs, rng)
    }
}
