//! Free run straight ahead

use std::fmt;

use speed_core::GameRng;

use super::{Heuristic, Snapshot};

/// Free cells straight ahead of the head until the first obstacle, capped at
/// `max_distance` and normalized to `[0, 1]`
#[derive(Clone, Debug)]
pub struct PathLengthHeuristic {
    pub max_distance: u32,
}

impl PathLengthHeuristic {
    pub fn new(max_distance: u32) -> Self {
        Self { max_distance }
    }

    /// Raw count of free cells ahead, capped
    pub fn path_length(&self, snapshot: &Snapshot<'_>) -> u32 {
        let player = &snapshot.player;
        (1..=self.max_distance)
            .take_while(|&k| snapshot.cells.is_free(player.position.step(player.direction, k as i32)))
            .count() as u32
    }
}

impl Heuristic for PathLengthHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, _rng: &mut GameRng) -> f64 {
        if !snapshot.player.active || self.max_distance == 0 {
            return 0.0;
        }
        self.path_length(snapshot) as f64 / self.max_distance as f64
    }
}

impl fmt::Display for PathLengthHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathLength({})", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::{board, wall};
    use rand::SeedableRng;
    use speed_core::Direction;

    #[test]
    fn test_counts_until_wall() {
        let sim = board(10, 3, &[(0, 1, Direction::Right)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        let h = PathLengthHeuristic::new(20);
        assert_eq!(h.path_length(&snap), 9);

        let sim = wall(&sim, 1, &[(4, 1)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        assert_eq!(h.path_length(&snap), 3);
        assert!((h.score(&snap, &mut GameRng::seed_from_u64(0)) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_capped_at_max_distance() {
        let sim = board(30, 1, &[(0, 0, Direction::Right)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        let h = PathLengthHeuristic::new(5);
        assert_eq!(h.score(&snap, &mut GameRng::seed_from_u64(0)), 1.0);
    }

    #[test]
    fn test_inactive_scores_zero() {
        let sim = board(10, 3, &[(0, 1, Direction::Right)]);
        let mut snap = Snapshot::of(&sim, 1).unwrap();
        snap.player.active = false;
        assert_eq!(PathLengthHeuristic::new(5).score(&snap, &mut GameRng::seed_from_u64(0)), 0.0);
    }
}
