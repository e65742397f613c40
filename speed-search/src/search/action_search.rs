//! Single-player lookahead
//!
//! Opponents are frozen: their trails and heads are static obstacles,
//! optionally inflated by the occupancy map.

use std::fmt;
use std::time::Duration;

use speed_core::{Action, GameError, GameRng, Observation, Policy, Simulator};
use tracing::{debug, warn};

use super::{deepen, ordered_actions, select, Deadline, SearchOutcome, LOSS_VALUE};
use crate::error::SearchError;
use crate::heuristics::{occupancy_map, Heuristic, Snapshot};

/// Default wall-clock budget when the observation carries no deadline
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(500);

/// Depth-limited max search over our own action sequences
pub struct ActionSearchPolicy {
    heuristic: Box<dyn Heuristic>,
    pub depth: u32,
    pub time_budget: Duration,
    /// Rounds of opponent reach to mark as occupied, 0 to disable
    pub occupancy_map_depth: u32,
    previous: Option<Action>,
}

impl ActionSearchPolicy {
    pub fn new(heuristic: Box<dyn Heuristic>, depth: u32) -> Self {
        Self {
            heuristic,
            depth,
            time_budget: DEFAULT_TIME_BUDGET,
            occupancy_map_depth: 0,
            previous: None,
        }
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = time_budget;
        self
    }

    pub fn with_occupancy_map_depth(mut self, depth: u32) -> Self {
        self.occupancy_map_depth = depth;
        self
    }

    /// Lookahead model: only we move, on the (optionally inflated) grid
    fn root(&self, obs: &Observation, inflate: bool) -> Result<Simulator, GameError> {
        let solo = obs.simulator()?.solo(obs.you.id)?;
        if !inflate || self.occupancy_map_depth == 0 {
            return Ok(solo);
        }
        let cells = occupancy_map(&obs.cells, &obs.opponents, self.occupancy_map_depth, &obs.rules)?;
        solo.with_cells(cells)
    }

    /// Run iterative deepening and return the best completed iteration
    pub fn search(&self, obs: &Observation, rng: &mut GameRng) -> Result<SearchOutcome, SearchError> {
        let deadline = Deadline::at(obs.deadline_or(self.time_budget));
        let id = obs.you.id;

        let root = self.root(obs, true)?;
        let outcome = deepen(&root, id, self.depth, |d, best| {
            self.iteration(&root, obs, d, best.or(self.previous), deadline, rng)
        });

        let hopeless = outcome.value <= LOSS_VALUE + outcome.depth as f64;
        if hopeless && self.occupancy_map_depth > 0 {
            // the inflated grid may be too pessimistic; retry on the real one
            let plain = self.root(obs, false)?;
            let retry = deepen(&plain, id, self.depth, |d, best| {
                self.iteration(&plain, obs, d, best.or(self.previous), deadline, rng)
            });
            if retry.depth > 0 || outcome.depth == 0 {
                return Ok(retry);
            }
        }
        Ok(outcome)
    }

    fn iteration(
        &self,
        root: &Simulator,
        obs: &Observation,
        depth: u32,
        first: Option<Action>,
        deadline: Deadline,
        rng: &mut GameRng,
    ) -> Result<SearchOutcome, SearchError> {
        let id = obs.you.id;
        let mut values = Vec::with_capacity(Action::ALL.len());
        for action in ordered_actions(first) {
            deadline.check()?;
            let next = root.step(&[action])?;
            values.push((action, self.value(&next, obs, depth - 1, 1, deadline, rng)?));
        }

        let (action, value) = select(root, id, &values)
            .ok_or_else(|| GameError::IllegalState("no root actions".into()))?;
        Ok(SearchOutcome { action, value, depth })
    }

    /// Horizon value of `sim` reached after `ply` rounds
    fn value(
        &self,
        sim: &Simulator,
        obs: &Observation,
        remaining: u32,
        ply: u32,
        deadline: Deadline,
        rng: &mut GameRng,
    ) -> Result<f64, SearchError> {
        deadline.check()?;
        let player = *sim
            .player(obs.you.id)
            .ok_or_else(|| GameError::IllegalState(format!("player {} left the lookahead", obs.you.id)))?;

        if !player.active {
            return Ok(LOSS_VALUE + (ply - 1) as f64);
        }
        if remaining == 0 {
            let snapshot = Snapshot::new(sim.cells(), player, obs.opponents.clone(), sim.round(), obs.rules);
            return Ok(self.heuristic.score(&snapshot, rng));
        }

        let mut best = f64::NEG_INFINITY;
        for action in Action::ALL {
            let next = sim.step(&[action])?;
            best = best.max(self.value(&next, obs, remaining - 1, ply + 1, deadline, rng)?);
        }
        Ok(best)
    }
}

impl Policy for ActionSearchPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        if !obs.you.active {
            return Action::ChangeNothing;
        }
        match self.search(obs, rng) {
            Ok(outcome) => {
                debug!(
                    round = obs.round,
                    action = %outcome.action,
                    value = outcome.value,
                    depth = outcome.depth,
                    "action search"
                );
                self.previous = Some(outcome.action);
                outcome.action
            }
            Err(e) => {
                warn!(error = %e, "action search failed, falling back");
                obs.simulator()
                    .map(|sim| super::fallback_action(&sim, obs.you.id))
                    .unwrap_or(Action::ChangeNothing)
            }
        }
    }
}

impl fmt::Display for ActionSearchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionSearchPolicy(depth={}, {})", self.depth, self.heuristic)
    }
}
