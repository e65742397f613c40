//! Distance to the nearest opponent

use std::fmt;

use speed_core::GameRng;

use super::{Heuristic, Snapshot};

/// Manhattan distance to the nearest active opponent head.
///
/// Scores 1 when no opponent is within `dist_threshold`. Otherwise the gated
/// child is evaluated, or without a child `distance / dist_threshold`.
pub struct OpponentDistanceHeuristic {
    pub dist_threshold: u32,
    gated: Option<Box<dyn Heuristic>>,
}

impl OpponentDistanceHeuristic {
    pub fn new(dist_threshold: u32) -> Self {
        Self {
            dist_threshold,
            gated: None,
        }
    }

    /// Only evaluate `child` while an opponent is close
    pub fn gated(dist_threshold: u32, child: Box<dyn Heuristic>) -> Self {
        Self {
            dist_threshold,
            gated: Some(child),
        }
    }

    /// Distance to the closest active opponent head, if any
    pub fn nearest(snapshot: &Snapshot<'_>) -> Option<u32> {
        let head = snapshot.player.position;
        snapshot
            .active_opponents()
            .map(|p| head.distance_to(p.position) as u32)
            .min()
    }
}

impl Heuristic for OpponentDistanceHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64 {
        if !snapshot.player.active {
            return 0.0;
        }
        match Self::nearest(snapshot) {
            Some(d) if d <= self.dist_threshold => match &self.gated {
                Some(child) => child.score(snapshot, rng),
                None if self.dist_threshold == 0 => 0.0,
                None => d as f64 / self.dist_threshold as f64,
            },
            _ => 1.0,
        }
    }
}

impl fmt::Display for OpponentDistanceHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.gated {
            Some(child) => write!(f, "OpponentDistance({}, {})", self.dist_threshold, child),
            None => write!(f, "OpponentDistance({})", self.dist_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::board;
    use crate::heuristics::PathLengthHeuristic;
    use rand::SeedableRng;
    use speed_core::Direction;

    fn rng() -> GameRng {
        GameRng::seed_from_u64(0)
    }

    #[test]
    fn test_far_opponent_scores_one() {
        let sim = board(10, 10, &[(0, 0, Direction::Right), (9, 9, Direction::Left)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        assert_eq!(OpponentDistanceHeuristic::nearest(&snap), Some(18));
        assert_eq!(OpponentDistanceHeuristic::new(6).score(&snap, &mut rng()), 1.0);
    }

    #[test]
    fn test_near_opponent_scales_with_distance() {
        let sim = board(10, 10, &[(0, 0, Direction::Right), (2, 1, Direction::Left)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        assert!((OpponentDistanceHeuristic::new(6).score(&snap, &mut rng()) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gated_child_only_when_near() {
        let child = || Box::new(PathLengthHeuristic::new(4)) as Box<dyn Heuristic>;

        let near = board(10, 10, &[(0, 0, Direction::Right), (0, 2, Direction::Left)]);
        let snap = Snapshot::of(&near, 1).unwrap();
        assert_eq!(OpponentDistanceHeuristic::gated(6, child()).score(&snap, &mut rng()), 1.0);

        let near = board(10, 10, &[(0, 0, Direction::Down), (0, 3, Direction::Left)]);
        let snap = Snapshot::of(&near, 1).unwrap();
        assert!((OpponentDistanceHeuristic::gated(6, child()).score(&snap, &mut rng()) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_opponents_scores_one() {
        let sim = board(5, 5, &[(0, 0, Direction::Right)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        assert_eq!(OpponentDistanceHeuristic::new(3).score(&snap, &mut rng()), 1.0);
    }
}
