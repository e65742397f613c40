//! Weighted sum of heuristics

use std::fmt;

use speed_core::GameRng;

use super::{Heuristic, Snapshot};

/// Fixed-weight sum over `(weight, child)` pairs
#[derive(Default)]
pub struct CompositeHeuristic {
    children: Vec<(f64, Box<dyn Heuristic>)>,
}

impl CompositeHeuristic {
    pub fn new(children: Vec<(f64, Box<dyn Heuristic>)>) -> Self {
        Self { children }
    }

    /// Every child with weight 1
    pub fn uniform(children: Vec<Box<dyn Heuristic>>) -> Self {
        Self::new(children.into_iter().map(|h| (1.0, h)).collect())
    }

    pub fn with(mut self, weight: f64, child: Box<dyn Heuristic>) -> Self {
        self.children.push((weight, child));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Heuristic for CompositeHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, rng: &mut GameRng) -> f64 {
        self.children
            .iter()
            .map(|(w, h)| w * h.score(snapshot, rng))
            .sum()
    }
}

impl fmt::Display for CompositeHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Composite[")?;
        for (i, (w, h)) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}*{}", w, h)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::fixtures::board;
    use crate::heuristics::{PathLengthHeuristic, RegionHeuristic};
    use rand::SeedableRng;
    use speed_core::Direction;

    #[test]
    fn test_weighted_sum() {
        let sim = board(4, 4, &[(0, 0, Direction::Right)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        let h = CompositeHeuristic::default()
            .with(2.0, Box::new(PathLengthHeuristic::new(3)))
            .with(16.0, Box::new(RegionHeuristic::new(true)));
        let score = h.score(&snap, &mut GameRng::seed_from_u64(0));
        assert!((score - (2.0 + 15.0)).abs() < 1e-9);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_empty_composite_scores_zero() {
        let sim = board(4, 4, &[(0, 0, Direction::Right)]);
        let snap = Snapshot::of(&sim, 1).unwrap();
        assert_eq!(CompositeHeuristic::default().score(&snap, &mut GameRng::seed_from_u64(0)), 0.0);
    }

    #[test]
    fn test_display_lists_children() {
        let h = CompositeHeuristic::uniform(vec![Box::new(PathLengthHeuristic::new(3))]);
        assert_eq!(h.to_string(), "Composite[1*PathLength(3)]");
    }
}
