//! Depth-limited search policies and their shared machinery
//!
//! Both searches run iterative deepening under a wall-clock deadline and
//! pick among equal-valued root actions with the same tie-break rule.

mod action_search;
mod maximin;

use std::time::Instant;

use speed_core::{Action, PlayerId, Simulator};
use tracing::warn;

use crate::error::SearchError;

pub use action_search::ActionSearchPolicy;
pub use maximin::MaximinPolicy;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Value of our own elimination, plus the number of plies survived
pub const LOSS_VALUE: f64 = -1_000_000.0;

/// Value of being the last player standing, minus the plies it took
pub const WIN_VALUE: f64 = 1_000_000.0;

/// Root values closer than this are ties
pub(crate) const TIE_EPSILON: f64 = 1e-9;

// ============================================================================
// DEADLINE
// ============================================================================

/// Wall-clock limit checked at every expanded node
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn check(&self) -> Result<(), SearchError> {
        if Instant::now() >= self.0 {
            Err(SearchError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

/// Best root action of one completed search iteration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOutcome {
    pub action: Action,
    pub value: f64,
    /// Iteration depth that produced the outcome
    pub depth: u32,
}

// ============================================================================
// TIE-BREAK AND FALLBACK
// ============================================================================

/// Number of actions that keep `id` alive for one more round after it plays
/// `action`, with everyone else playing `change_nothing`
pub fn flexibility(sim: &Simulator, id: PlayerId, action: Action) -> usize {
    let Ok(next) = sim.step_with(&[(id, action)]) else {
        return 0;
    };
    if !next.is_active(id) {
        return 0;
    }
    Action::ALL
        .iter()
        .filter(|&&follow| {
            next.step_with(&[(id, follow)])
                .map(|s| s.is_active(id))
                .unwrap_or(false)
        })
        .count()
}

/// Pick the best of `values`: highest value, then most follow-up actions
/// after one ply, then `Action::ALL` order
pub fn select(sim: &Simulator, id: PlayerId, values: &[(Action, f64)]) -> Option<(Action, f64)> {
    if values.is_empty() {
        return None;
    }
    let best = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

    let mut tied: Vec<(Action, f64)> = values
        .iter()
        .copied()
        .filter(|(_, v)| *v >= best - TIE_EPSILON)
        .collect();
    if tied.len() == 1 {
        return tied.pop();
    }

    tied.sort_by_key(|(a, _)| a.index());
    let mut chosen: Option<((Action, f64), usize)> = None;
    for candidate in tied {
        let flex = flexibility(sim, id, candidate.0);
        if chosen.map_or(true, |(_, best_flex)| flex > best_flex) {
            chosen = Some((candidate, flex));
        }
    }
    chosen.map(|(c, _)| c)
}

/// One-ply scan used when no search iteration completed: prefer actions
/// that survive, then flexibility, then enumeration order
pub fn fallback_action(sim: &Simulator, id: PlayerId) -> Action {
    let values: Vec<(Action, f64)> = Action::ALL
        .iter()
        .map(|&a| {
            let survives = sim
                .step_with(&[(id, a)])
                .map(|s| s.is_active(id))
                .unwrap_or(false);
            (a, if survives { 0.0 } else { LOSS_VALUE })
        })
        .collect();
    select(sim, id, &values).map_or(Action::ChangeNothing, |(a, _)| a)
}

/// Put `first` at the front, keeping the rest in enumeration order
pub(crate) fn ordered_actions(first: Option<Action>) -> Vec<Action> {
    let mut actions = Action::ALL.to_vec();
    if let Some(first) = first {
        if let Some(i) = actions.iter().position(|&a| a == first) {
            let a = actions.remove(i);
            actions.insert(0, a);
        }
    }
    actions
}

/// Outcome of an iterative-deepening loop: the deepest completed iteration,
/// or the fallback scan if none completed
pub(crate) fn deepen<F>(sim: &Simulator, id: PlayerId, depth: u32, mut iteration: F) -> SearchOutcome
where
    F: FnMut(u32, Option<Action>) -> Result<SearchOutcome, SearchError>,
{
    let mut completed: Option<SearchOutcome> = None;
    for d in 1..=depth.max(1) {
        match iteration(d, completed.map(|c| c.action)) {
            Ok(outcome) => {
                completed = Some(outcome);
                // a decided game cannot change with more depth
                if outcome.value <= LOSS_VALUE + d as f64 || outcome.value >= WIN_VALUE - d as f64 {
                    break;
                }
            }
            Err(SearchError::DeadlineExceeded) => break,
            Err(SearchError::Game(e)) => {
                warn!(error = %e, depth = d, "search aborted by forward model");
                break;
            }
        }
    }

    completed.unwrap_or_else(|| SearchOutcome {
        action: fallback_action(sim, id),
        value: f64::NAN,
        depth: 0,
    })
}
