//! Adversarial lookahead with alpha-beta pruning
//!
//! Our action is a max layer. The reply layer is a min layer over single
//! opponent deviations: one relevant opponent picks an action while every
//! other opponent plays `change_nothing`. With two players this is exact
//! maximin with the opponent replying to our choice.

use std::fmt;
use std::time::Duration;

use speed_core::{Action, GameError, GameRng, Observation, PlayerId, Policy, Simulator};
use tracing::{debug, warn};

use super::action_search::DEFAULT_TIME_BUDGET;
use super::{deepen, ordered_actions, select, Deadline, SearchOutcome, LOSS_VALUE, TIE_EPSILON, WIN_VALUE};
use crate::error::SearchError;
use crate::heuristics::{Heuristic, Snapshot};

/// Per-search context threaded through the recursion
struct Ctx<'a> {
    id: PlayerId,
    deadline: Deadline,
    rng: &'a mut GameRng,
}

/// Maximin search over our actions against single-opponent replies
pub struct MaximinPolicy {
    heuristic: Box<dyn Heuristic>,
    pub depth: u32,
    pub time_budget: Duration,
    /// Opponents farther than this (Manhattan, from our head) never deviate
    pub relevance_radius: Option<u32>,
    previous: Option<Action>,
}

impl MaximinPolicy {
    pub fn new(heuristic: Box<dyn Heuristic>, depth: u32) -> Self {
        Self {
            heuristic,
            depth,
            time_budget: DEFAULT_TIME_BUDGET,
            relevance_radius: None,
            previous: None,
        }
    }

    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = time_budget;
        self
    }

    pub fn with_relevance_radius(mut self, radius: u32) -> Self {
        self.relevance_radius = Some(radius);
        self
    }

    /// Run iterative deepening and return the best completed iteration
    pub fn search(&self, obs: &Observation, rng: &mut GameRng) -> Result<SearchOutcome, SearchError> {
        let root = obs.simulator()?;
        let mut ctx = Ctx {
            id: obs.you.id,
            deadline: Deadline::at(obs.deadline_or(self.time_budget)),
            rng,
        };
        Ok(deepen(&root, obs.you.id, self.depth, |d, best| {
            self.iteration(&root, d, best.or(self.previous), &mut ctx)
        }))
    }

    /// One fixed-depth search from the root
    pub fn search_depth(
        &self,
        root: &Simulator,
        id: PlayerId,
        depth: u32,
        deadline: Deadline,
        rng: &mut GameRng,
    ) -> Result<SearchOutcome, SearchError> {
        let mut ctx = Ctx { id, deadline, rng };
        self.iteration(root, depth.max(1), None, &mut ctx)
    }

    fn iteration(
        &self,
        root: &Simulator,
        depth: u32,
        first: Option<Action>,
        ctx: &mut Ctx<'_>,
    ) -> Result<SearchOutcome, SearchError> {
        let mut values = Vec::with_capacity(Action::ALL.len());
        let mut best = f64::NEG_INFINITY;

        for action in ordered_actions(first) {
            ctx.deadline.check()?;
            // values that fail low come back as bounds below `best - 2ε`,
            // so every tie within ε is exact
            let alpha = best - 2.0 * TIE_EPSILON;
            let v = self.reply(root, action, depth, 1, alpha, f64::INFINITY, ctx)?;
            best = best.max(v);
            values.push((action, v));
        }

        let (action, value) = select(root, ctx.id, &values)
            .ok_or_else(|| GameError::IllegalState("no root actions".into()))?;
        Ok(SearchOutcome { action, value, depth })
    }

    /// Opponents allowed to deviate from `change_nothing` at this node
    fn relevant(&self, sim: &Simulator, id: PlayerId) -> Vec<PlayerId> {
        let Some(me) = sim.player(id) else {
            return Vec::new();
        };
        sim.opponents_of(id)
            .filter(|p| {
                self.relevance_radius
                    .map_or(true, |r| me.position.distance_to(p.position) <= r as i32)
            })
            .map(|p| p.id)
            .collect()
    }

    /// Min layer: we committed to `action`; the worst single reply counts
    fn reply(
        &self,
        sim: &Simulator,
        action: Action,
        remaining: u32,
        ply: u32,
        alpha: f64,
        mut beta: f64,
        ctx: &mut Ctx<'_>,
    ) -> Result<f64, SearchError> {
        let id = ctx.id;

        // everyone idle first, then each relevant opponent's deviations
        let mut replies: Vec<Option<(PlayerId, Action)>> = vec![None];
        for opp in self.relevant(sim, id) {
            replies.extend(
                Action::ALL
                    .iter()
                    .filter(|&&b| b != Action::ChangeNothing)
                    .map(|&b| Some((opp, b))),
            );
        }

        let mut worst = f64::INFINITY;
        for reply in replies {
            ctx.deadline.check()?;
            let next = match reply {
                Some(deviation) => sim.step_with(&[(id, action), deviation])?,
                None => sim.step_with(&[(id, action)])?,
            };
            let v = self.node(&next, remaining - 1, ply, alpha, beta, ctx)?;
            worst = worst.min(v);
            beta = beta.min(worst);
            if worst <= alpha {
                break;
            }
        }
        Ok(worst)
    }

    /// Max layer at a state reached after `ply` rounds
    fn node(
        &self,
        sim: &Simulator,
        remaining: u32,
        ply: u32,
        mut alpha: f64,
        beta: f64,
        ctx: &mut Ctx<'_>,
    ) -> Result<f64, SearchError> {
        ctx.deadline.check()?;
        let id = ctx.id;

        if !sim.is_active(id) {
            return Ok(LOSS_VALUE + (ply - 1) as f64);
        }
        if sim.active_count() == 1 {
            return Ok(WIN_VALUE - ply as f64);
        }
        if remaining == 0 {
            let snapshot = Snapshot::of(sim, id)
                .ok_or_else(|| GameError::IllegalState(format!("player {} left the lookahead", id)))?;
            return Ok(self.heuristic.score(&snapshot, ctx.rng));
        }

        let mut best = f64::NEG_INFINITY;
        for action in Action::ALL {
            let v = self.reply(sim, action, remaining, ply + 1, alpha, beta, ctx)?;
            best = best.max(v);
            alpha = alpha.max(best);
            if best >= beta {
                break;
            }
        }
        Ok(best)
    }
}

impl Policy for MaximinPolicy {
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
                    "maximin search"
                );
                self.previous = Some(outcome.action);
                outcome.action
            }
            Err(e) => {
                warn!(error = %e, "maximin search failed, falling back");
                obs.simulator()
                    .map(|sim| super::fallback_action(&sim, obs.you.id))
                    .unwrap_or(Action::ChangeNothing)
            }
        }
    }
}

impl fmt::Display for MaximinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaximinPolicy(depth={}, {})", self.depth, self.heuristic)
    }
}
