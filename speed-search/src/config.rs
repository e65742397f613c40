//! Policy configuration
//!
//! `PolicyConfig` is the serializable description of every policy the crate
//! knows; `build` turns it into an `AnyPolicy`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use speed_core::{
    Action, CirclePolicy, GameRng, MazeWalkerPolicy, Observation, Policy, RandomPolicy, ScriptedPolicy, SpiralPolicy,
};

use crate::conditional_policy::{Condition, ConditionalPolicy};
use crate::endgame_policy::EndgamePolicy;
use crate::error::ConfigError;
use crate::heuristic_policy::HeuristicPolicy;
use crate::heuristics::HeuristicConfig;
use crate::probing_policy::RandomProbingPolicy;
use crate::search::{ActionSearchPolicy, MaximinPolicy};

fn default_true() -> bool {
    true
}

fn default_time_budget_ms() -> u64 {
    500
}

fn default_search_depth() -> u32 {
    3
}

fn default_n_steps() -> u32 {
    3
}

fn default_n_probes() -> u32 {
    10
}

/// Description of a policy, loadable from JSON
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Random {
        /// Probabilities in `Action::ALL` order; uniform when absent
        #[serde(default)]
        probabilities: Option<[f64; 5]>,
    },
    Spiral,
    MazeWalker,
    Scripted {
        actions: Vec<Action>,
    },
    Circle {
        #[serde(default = "default_true")]
        clockwise: bool,
    },
    Heuristic {
        #[serde(default)]
        heuristic: HeuristicConfig,
        #[serde(default)]
        occupancy_map_depth: u32,
    },
    RandomProbing {
        #[serde(default = "default_n_steps")]
        n_steps: u32,
        #[serde(default = "default_n_probes")]
        n_probes: u32,
        #[serde(default)]
        full_action_set: bool,
    },
    ActionSearch {
        #[serde(default)]
        heuristic: HeuristicConfig,
        #[serde(default = "default_search_depth")]
        depth: u32,
        #[serde(default = "default_time_budget_ms")]
        time_budget_ms: u64,
        #[serde(default)]
        occupancy_map_depth: u32,
    },
    Maximin {
        #[serde(default)]
        heuristic: HeuristicConfig,
        #[serde(default = "default_search_depth")]
        depth: u32,
        #[serde(default = "default_time_budget_ms")]
        time_budget_ms: u64,
        #[serde(default)]
        relevance_radius: Option<u32>,
    },
    Endgame,
    Conditional {
        condition: Condition,
        if_true: Box<PolicyConfig>,
        if_false: Box<PolicyConfig>,
    },
}

impl PolicyConfig {
    /// Built-in policies by name
    pub fn named(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "random" => PolicyConfig::Random { probabilities: None },
            "spiral" => PolicyConfig::Spiral,
            "maze_walker" | "mazewalker" => PolicyConfig::MazeWalker,
            "circle" => PolicyConfig::Circle { clockwise: true },
            "random_probing" | "probing" => PolicyConfig::RandomProbing {
                n_steps: default_n_steps(),
                n_probes: default_n_probes(),
                full_action_set: false,
            },
            "elspeth" => PolicyConfig::Heuristic {
                heuristic: HeuristicConfig::elspeth(),
                occupancy_map_depth: 3,
            },
            "action_search" => PolicyConfig::ActionSearch {
                heuristic: HeuristicConfig::elspeth(),
                depth: default_search_depth(),
                time_budget_ms: default_time_budget_ms(),
                occupancy_map_depth: 0,
            },
            "maximin" => PolicyConfig::Maximin {
                heuristic: HeuristicConfig::elspeth(),
                depth: default_search_depth(),
                time_budget_ms: default_time_budget_ms(),
                relevance_radius: Some(10),
            },
            "endgame" => PolicyConfig::Endgame,
            "maximin_endgame" => PolicyConfig::Conditional {
                condition: Condition::Separated,
                if_true: Box::new(PolicyConfig::Endgame),
                if_false: Box::new(Self::named("maximin")?),
            },
            other => return Err(ConfigError::Invalid(format!("unknown policy name {:?}", other))),
        };
        Ok(config)
    }

    /// Read a JSON policy description
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// A built-in name, or else a path to a JSON file
    pub fn resolve(source: &str) -> Result<Self, ConfigError> {
        match Self::named(source) {
            Ok(config) => Ok(config),
            Err(_) if Path::new(source).exists() => Self::load(source),
            Err(e) => Err(e),
        }
    }

    pub fn build(&self) -> Result<AnyPolicy, ConfigError> {
        let policy = match self {
            PolicyConfig::Random { probabilities } => match probabilities {
                Some(p) => AnyPolicy::Random(RandomPolicy::with_probabilities(*p)?),
                None => AnyPolicy::Random(RandomPolicy::new()),
            },
            PolicyConfig::Spiral => AnyPolicy::Spiral(SpiralPolicy::new()),
            PolicyConfig::MazeWalker => AnyPolicy::MazeWalker(MazeWalkerPolicy::new()),
            PolicyConfig::Scripted { actions } => AnyPolicy::Scripted(ScriptedPolicy::new(actions.clone())),
            PolicyConfig::Circle { clockwise } => AnyPolicy::Circle(CirclePolicy::new(*clockwise)),
            PolicyConfig::Heuristic {
                heuristic,
                occupancy_map_depth,
            } => AnyPolicy::Heuristic(
                HeuristicPolicy::new(heuristic.build()?).with_occupancy_map_depth(*occupancy_map_depth),
            ),
            PolicyConfig::RandomProbing {
                n_steps,
                n_probes,
                full_action_set,
            } => {
                if *n_steps == 0 || *n_probes == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "random_probing needs positive steps and probes, got {} and {}",
                        n_steps, n_probes
                    )));
                }
                AnyPolicy::RandomProbing(
                    RandomProbingPolicy::new(*n_steps, *n_probes).with_full_action_set(*full_action_set),
                )
            }
            PolicyConfig::ActionSearch {
                heuristic,
                depth,
                time_budget_ms,
                occupancy_map_depth,
            } => {
                check_depth(*depth)?;
                AnyPolicy::ActionSearch(
                    ActionSearchPolicy::new(heuristic.build()?, *depth)
                        .with_time_budget(Duration::from_millis(*time_budget_ms))
                        .with_occupancy_map_depth(*occupancy_map_depth),
                )
            }
            PolicyConfig::Maximin {
                heuristic,
                depth,
                time_budget_ms,
                relevance_radius,
            } => {
                check_depth(*depth)?;
                let mut policy = MaximinPolicy::new(heuristic.build()?, *depth)
                    .with_time_budget(Duration::from_millis(*time_budget_ms));
                if let Some(r) = relevance_radius {
                    policy = policy.with_relevance_radius(*r);
                }
                AnyPolicy::Maximin(policy)
            }
            PolicyConfig::Endgame => AnyPolicy::Endgame(EndgamePolicy::new()),
            PolicyConfig::Conditional {
                condition,
                if_true,
                if_false,
            } => AnyPolicy::Conditional(ConditionalPolicy::new(
                *condition,
                Box::new(if_true.build()?),
                Box::new(if_false.build()?),
            )),
        };
        Ok(policy)
    }
}

fn check_depth(depth: u32) -> Result<(), ConfigError> {
    if depth == 0 {
        Err(ConfigError::Invalid("search depth must be positive".into()))
    } else {
        Ok(())
    }
}

// ============================================================================
// ANY POLICY
// ============================================================================

/// Every policy type, dispatched statically
pub enum AnyPolicy {
    Random(RandomPolicy),
    Spiral(SpiralPolicy),
    MazeWalker(MazeWalkerPolicy),
    Scripted(ScriptedPolicy),
    Circle(CirclePolicy),
    Heuristic(HeuristicPolicy),
    RandomProbing(RandomProbingPolicy),
    ActionSearch(ActionSearchPolicy),
    Maximin(MaximinPolicy),
    Endgame(EndgamePolicy),
    Conditional(ConditionalPolicy),
}

impl Policy for AnyPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut GameRng) -> Action {
        match self {
            AnyPolicy::Random(p) => p.act(obs, rng),
            AnyPolicy::Spiral(p) => p.act(obs, rng),
            AnyPolicy::MazeWalker(p) => p.act(obs, rng),
            AnyPolicy::Scripted(p) => p.act(obs, rng),
            AnyPolicy::Circle(p) => p.act(obs, rng),
            AnyPolicy::Heuristic(p) => p.act(obs, rng),
            AnyPolicy::RandomProbing(p) => p.act(obs, rng),
            AnyPolicy::ActionSearch(p) => p.act(obs, rng),
            AnyPolicy::Maximin(p) => p.act(obs, rng),
            AnyPolicy::Endgame(p) => p.act(obs, rng),
            AnyPolicy::Conditional(p) => p.act(obs, rng),
        }
    }
}

impl fmt::Display for AnyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyPolicy::Random(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Spiral(p) => fmt::Display::fmt(p, f),
            AnyPolicy::MazeWalker(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Scripted(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Circle(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Heuristic(p) => fmt::Display::fmt(p, f),
            AnyPolicy::RandomProbing(p) => fmt::Display::fmt(p, f),
            AnyPolicy::ActionSearch(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Maximin(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Endgame(p) => fmt::Display::fmt(p, f),
            AnyPolicy::Conditional(p) => fmt::Display::fmt(p, f),
        }
    }
}
