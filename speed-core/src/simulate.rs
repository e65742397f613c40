//! The transition function
//!
//! `simulate` advances a game by one round. It is pure: the input grid and
//! players are never touched, the result owns fresh (copy-on-write) state,
//! and identical inputs always give identical outputs.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::action::Action;
use crate::cells::Cells;
use crate::error::GameError;
use crate::player::{Player, PlayerId};
use crate::position::Position;
use crate::rules::Rules;

// ============================================================================
// RESULT
// ============================================================================

/// Game state after one round
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub cells: Cells,
    pub players: Vec<Player>,
    pub round: u32,
    /// Players eliminated in this round, ascending id
    pub eliminated: Vec<PlayerId>,
}

// ============================================================================
// TRANSITION
// ============================================================================

/// Advance one round.
///
/// `actions[i]` belongs to `players[i]`; entries of inactive players are
/// ignored. All active players move simultaneously:
/// 1. actions update direction/speed,
/// 2. each player travels `speed` cells straight ahead,
/// 3. leaving the grid eliminates the player,
/// 4. touching a cell occupied before the round, or a cell another player
///    crosses in the same round, eliminates the player,
/// 5. survivors' path cells are written and their heads moved,
/// 6. the round counter increments.
///
/// On a jump round (see [`Rules::jumps`]) only the first and last cells of a
/// path are marked and checked.
pub fn simulate(
    cells: &Cells,
    players: &[Player],
    round: u32,
    actions: &[Action],
    rules: &Rules,
) -> Result<Transition, GameError> {
    if actions.len() != players.len() {
        return Err(GameError::illegal(format!(
            "{} actions for {} players",
            actions.len(),
            players.len()
        )));
    }
    validate_players(cells, players, rules)?;

    let played_round = round + 1;
    let mut next = players.to_vec();
    let mut eliminated = Vec::new();

    for (player, &action) in next.iter_mut().zip(actions) {
        if player.active {
            player.apply(action, rules);
        }
    }

    let mut paths: Vec<Option<Vec<Position>>> = next
        .iter_mut()
        .map(|player| {
            if !player.active {
                return None;
            }
            let path = marked_path(cells, player, played_round, rules);
            if path.is_none() {
                player.active = false;
                eliminated.push(player.id);
            }
            path
        })
        .collect();

    let mut claims: FxHashMap<Position, u8> = FxHashMap::default();
    for cell in paths.iter().flatten().flatten() {
        *claims.entry(*cell).or_insert(0) += 1;
    }

    for (player, path) in next.iter_mut().zip(paths.iter_mut()) {
        let crashed = match path {
            Some(cells_on_path) => cells_on_path
                .iter()
                .any(|c| !cells.is_free(*c) || claims.get(c).copied().unwrap_or(0) > 1),
            None => false,
        };
        if crashed {
            player.active = false;
            eliminated.push(player.id);
            *path = None;
        }
    }

    let mut new_cells = cells.clone();
    for (player, path) in next.iter_mut().zip(&paths) {
        if let Some(cells_on_path) = path {
            for &c in cells_on_path {
                new_cells.set(c, player.id);
            }
            player.position = player.destination();
        }
    }

    eliminated.sort_unstable();

    Ok(Transition {
        cells: new_cells,
        players: next,
        round: played_round,
        eliminated,
    })
}

/// Cells the player marks this round, `None` if the move leaves the grid.
///
/// The path never includes the current head. Its last cell is the new head.
pub fn marked_path(cells: &Cells, player: &Player, round: u32, rules: &Rules) -> Option<Vec<Position>> {
    let speed = player.speed as i32;
    if !cells.contains(player.destination()) {
        return None;
    }
    if rules.jumps(round, player.speed) && speed > 1 {
        return Some(vec![
            player.position.step(player.direction, 1),
            player.position.step(player.direction, speed),
        ]);
    }
    Some((1..=speed).map(|i| player.position.step(player.direction, i)).collect())
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Check the invariants the transition function relies on
pub fn validate_players(cells: &Cells, players: &[Player], rules: &Rules) -> Result<(), GameError> {
    let mut seen = FxHashSet::default();
    for player in players {
        if player.id == 0 {
            return Err(GameError::illegal("player id 0 is reserved for free cells"));
        }
        if !seen.insert(player.id) {
            return Err(GameError::illegal(format!("duplicate player id {}", player.id)));
        }
        if !player.active {
            continue;
        }
        if player.speed == 0 || player.speed > rules.max_speed {
            return Err(GameError::illegal(format!(
                "player {} has speed {} outside [1, {}]",
                player.id, player.speed, rules.max_speed
            )));
        }
        match cells.get(player.position) {
            None => {
                return Err(GameError::illegal(format!(
                    "player {} at ({}, {}) is outside the grid",
                    player.id, player.position.x, player.position.y
                )))
            }
            Some(owner) if owner != player.id => {
                return Err(GameError::illegal(format!(
                    "head cell of player {} is marked {} instead of its own id",
                    player.id, owner
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
