//! Reachable region and territory
//!
//! Flood fills over free cells starting at the head's neighbours.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use speed_core::{Cells, GameRng, Position};

use super::{Heuristic, Snapshot};

/// Size of the free region around the head, normalized by the grid area.
///
/// With `include_opponent_regions` every reachable cell counts. Without it,
/// only cells the player reaches strictly before any active opponent count
/// (territory by simultaneous BFS).
#[derive(Clone, Debug, Default)]
pub struct RegionHeuristic {
    pub include_opponent_regions: bool,
    /// Stop counting after this many cells
    pub max_cells: Option<usize>,
}

impl RegionHeuristic {
    pub fn new(include_opponent_regions: bool) -> Self {
        Self {
            include_opponent_regions,
            max_cells: None,
        }
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = Some(max_cells);
        self
    }

    /// Number of counted cells
    pub fn region_size(&self, snapshot: &Snapshot<'_>) -> usize {
        let limit = self.max_cells.unwrap_or(usize::MAX);
        if self.include_opponent_regions {
            reachable(snapshot.cells, snapshot.player.position, limit)
        } else {
            let heads: Vec<Position> = snapshot.active_opponents().map(|p| p.position).collect();
            territory(snapshot.cells, snapshot.player.position, &heads, limit)
        }
    }
}

impl Heuristic for RegionHeuristic {
    fn score(&self, snapshot: &Snapshot<'_>, _rng: &mut GameRng) -> f64 {
        if !snapshot.player.active {
            return 0.0;
        }
        self.region_size(snapshot) as f64 / snapshot.cells.area() as f64
    }
}

impl fmt::Display for RegionHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.include_opponent_regions {
            write!(f, "Region(all)")
        } else {
            write!(f, "Region(territory)")
        }
    }
}

// ============================================================================
// FLOOD FILLS
// ============================================================================

/// Free cells connected to `head`, excluding the head itself
pub fn reachable(cells: &Cells, head: Position, limit: usize) -> usize {
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(head);
    queue.push_back(head);

    let mut count = 0;
    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors() {
            if count >= limit {
                return count;
            }
            if cells.is_free(next) && visited.insert(next) {
                count += 1;
                queue.push_back(next);
            }
        }
    }
    count
}

/// Free cells connected to `head`, excluding the head itself
pub fn component(cells: &Cells, head: Position) -> FxHashSet<Position> {
    let mut visited: FxHashSet<Position> = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(head);

    while let Some(pos) = queue.pop_front() {
        for next in pos.neighbors() {
            if next != head && cells.is_free(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Whether no free cell reachable from `head` borders any opponent head,
/// i.e. nobody else can ever enter our region
pub fn separated(cells: &Cells, head: Position, opponents: &[Position]) -> bool {
    if opponents.is_empty() {
        return true;
    }
    let ours = component(cells, head);
    !opponents
        .iter()
        .flat_map(|p| p.neighbors())
        .any(|n| ours.contains(&n))
}

/// BFS distances over free cells from a set of sources
fn distances(cells: &Cells, sources: &[Position]) -> FxHashMap<Position, u32> {
    let mut dist: FxHashMap<Position, u32> = FxHashMap::default();
    let mut queue = VecDeque::new();
    for &s in sources {
        if dist.insert(s, 0).is_none() {
            queue.push_back(s);
        }
    }

    while let Some(pos) = queue.pop_front() {
        let d = dist[&pos];
        for next in pos.neighbors() {
            if cells.is_free(next) && !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Free cells `head` reaches strictly before every opponent head
pub fn territory(cells: &Cells, head: Position, opponents: &[Position], limit: usize) -> usize {
    let ours = distances(cells, &[head]);
    if opponents.is_empty() {
        return ours.len().saturating_sub(1).min(limit);
    }
    let theirs = distances(cells, opponents);

    ours.iter()
        .filter(|(pos, d)| **pos != head && theirs.get(*pos).map_or(true, |t| **d < *t))
        .take(limit)
        .count()
}
