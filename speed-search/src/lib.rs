//! spe_ed Search - Heuristics and lookahead policies
//!
//! This crate builds decision policies on top of the `speed-core` forward model:
//! - Composable heuristics (path length, region, opponent distance, probing)
//! - Greedy heuristic and random probing policies
//! - Space-filling endgame play and condition-switched policies
//! - Single-player action search and maximin search with alpha-beta pruning
//! - Serializable policy configuration

pub mod conditional_policy;
pub mod config;
pub mod endgame_policy;
pub mod error;
pub mod heuristic_policy;
pub mod heuristics;
pub mod probing_policy;
pub mod search;

// Re-exports for convenient access
pub use conditional_policy::{Condition, ConditionalPolicy};
pub use config::{AnyPolicy, PolicyConfig};
pub use endgame_policy::EndgamePolicy;
pub use error::{ConfigError, SearchError};
pub use heuristic_policy::HeuristicPolicy;
pub use heuristics::{
    occupancy_map, CompositeHeuristic, Heuristic, HeuristicConfig, OpponentDistanceHeuristic, PathLengthHeuristic,
    RandomHeuristic, RandomProbingHeuristic, RegionHeuristic, Snapshot, WeightedHeuristic,
};
pub use probing_policy::RandomProbingPolicy;
pub use search::{ActionSearchPolicy, Deadline, MaximinPolicy, SearchOutcome, LOSS_VALUE, WIN_VALUE};
