//! Pessimistic opponent reach

use rustc_hash::FxHashSet;
use speed_core::{Cells, Direction, GameError, Player, Position, Rules};

/// Copy of `cells` where every free cell an active opponent could sweep
/// within `depth` rounds is marked as occupied by that opponent.
///
/// Each round an opponent may keep its heading or turn left or right and
/// move up to `min(speed + 1, max_speed)` cells straight, stopping at the
/// first obstacle.
pub fn occupancy_map(cells: &Cells, opponents: &[Player], depth: u32, rules: &Rules) -> Result<Cells, GameError> {
    let mut map = cells.clone();
    if depth == 0 {
        return Ok(map);
    }

    for opponent in opponents.iter().filter(|p| p.active) {
        let reach = opponent.speed.saturating_add(1).min(rules.max_speed).max(1) as i32;
        let mut seen: FxHashSet<(Position, Direction)> = FxHashSet::default();
        let mut frontier = vec![(opponent.position, opponent.direction)];

        for _ in 0..depth {
            let mut next_frontier = Vec::new();
            for (pos, dir) in frontier {
                for heading in [dir, dir.turn_left(), dir.turn_right()] {
                    for k in 1..=reach {
                        let cell = pos.step(heading, k);
                        // only real obstacles block, swept cells do not
                        if !cells.is_free(cell) {
                            break;
                        }
                        if map.is_free(cell) {
                            map.occupy(cell, opponent.id)?;
                        }
                        if seen.insert((cell, heading)) {
                            next_frontier.push((cell, heading));
                        }
                    }
                }
            }
            frontier = next_frontier;
        }
    }
    Ok(map)
}
