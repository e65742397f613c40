//! Serializable heuristic descriptions

use serde::{Deserialize, Serialize};

use super::{
    CompositeHeuristic, Heuristic, OpponentDistanceHeuristic, PathLengthHeuristic, RandomHeuristic,
    RandomProbingHeuristic, RegionHeuristic,
};
use crate::error::ConfigError;

/// One `(weight, child)` entry of a composite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedHeuristic {
    pub weight: f64,
    pub heuristic: HeuristicConfig,
}

/// Description of any heuristic, buildable into a boxed trait object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeuristicConfig {
    PathLength {
        max_distance: u32,
    },
    Region {
        #[serde(default)]
        include_opponent_regions: bool,
        #[serde(default)]
        max_cells: Option<usize>,
    },
    OpponentDistance {
        dist_threshold: u32,
        #[serde(default)]
        gated: Option<Box<HeuristicConfig>>,
    },
    Random,
    RandomProbing {
        #[serde(default)]
        delegate: Option<Box<HeuristicConfig>>,
        n_steps: u32,
        n_probes: u32,
    },
    Composite {
        children: Vec<WeightedHeuristic>,
    },
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig::elspeth()
    }
}

impl HeuristicConfig {
    /// Tuned preset: long straight runs first, then probed survival with
    /// opponent awareness, then territory, with a tiny random tie-breaker
    pub fn elspeth() -> Self {
        let weighted = |weight: f64, heuristic: HeuristicConfig| WeightedHeuristic { weight, heuristic };
        let territory = || HeuristicConfig::Region {
            include_opponent_regions: false,
            max_cells: None,
        };

        HeuristicConfig::Composite {
            children: vec![
                weighted(20.0, HeuristicConfig::PathLength { max_distance: 20 }),
                weighted(
                    10.0,
                    HeuristicConfig::RandomProbing {
                        delegate: Some(Box::new(HeuristicConfig::Composite {
                            children: vec![
                                weighted(
                                    1.0,
                                    HeuristicConfig::OpponentDistance {
                                        dist_threshold: 6,
                                        gated: None,
                                    },
                                ),
                                weighted(1.0, territory()),
                                weighted(
                                    1.0,
                                    HeuristicConfig::Region {
                                        include_opponent_regions: true,
                                        max_cells: None,
                                    },
                                ),
                            ],
                        })),
                        n_steps: 6,
                        n_probes: 20,
                    },
                ),
                weighted(1.0, territory()),
                weighted(1e-4, HeuristicConfig::Random),
            ],
        }
    }

    /// Check parameters without building
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            HeuristicConfig::PathLength { max_distance } if *max_distance == 0 => {
                Err(ConfigError::Invalid("path_length.max_distance must be positive".into()))
            }
            HeuristicConfig::Region { max_cells: Some(0), .. } => {
                Err(ConfigError::Invalid("region.max_cells must be positive".into()))
            }
            HeuristicConfig::OpponentDistance { dist_threshold, gated } => {
                if *dist_threshold == 0 {
                    return Err(ConfigError::Invalid(
                        "opponent_distance.dist_threshold must be positive".into(),
                    ));
                }
                gated.as_ref().map_or(Ok(()), |g| g.validate())
            }
            HeuristicConfig::RandomProbing {
                delegate,
                n_steps,
                n_probes,
            } => {
                if *n_steps == 0 || *n_probes == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "random_probing needs positive steps and probes, got {} and {}",
                        n_steps, n_probes
                    )));
                }
                delegate.as_ref().map_or(Ok(()), |d| d.validate())
            }
            HeuristicConfig::Composite { children } => {
                if children.is_empty() {
                    return Err(ConfigError::Invalid("composite needs at least one child".into()));
                }
                for child in children {
                    if !child.weight.is_finite() {
                        return Err(ConfigError::Invalid(format!("composite weight {} is not finite", child.weight)));
                    }
                    child.heuristic.validate()?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Heuristic>, ConfigError> {
        self.validate()?;
        Ok(self.build_unchecked())
    }

    /// Build without validating; callers must have validated or trust the source
    pub(crate) fn build_unchecked(&self) -> Box<dyn Heuristic> {
        match self {
            HeuristicConfig::PathLength { max_distance } => Box::new(PathLengthHeuristic::new(*max_distance)),
            HeuristicConfig::Region {
                include_opponent_regions,
                max_cells,
            } => Box::new(RegionHeuristic {
                include_opponent_regions: *include_opponent_regions,
                max_cells: *max_cells,
            }),
            HeuristicConfig::OpponentDistance { dist_threshold, gated } => match gated {
                Some(g) => Box::new(OpponentDistanceHeuristic::gated(*dist_threshold, g.build_unchecked())),
                None => Box::new(OpponentDistanceHeuristic::new(*dist_threshold)),
            },
            HeuristicConfig::Random => Box::new(RandomHeuristic),
            HeuristicConfig::RandomProbing {
                delegate,
                n_steps,
                n_probes,
            } => {
                let probing = RandomProbingHeuristic::new(*n_steps, *n_probes);
                match delegate {
                    Some(d) => Box::new(probing.with_delegate(d.build_unchecked())),
                    None => Box::new(probing),
                }
            }
            HeuristicConfig::Composite { children } => Box::new(CompositeHeuristic::new(
                children
                    .iter()
                    .map(|c| (c.weight, c.heuristic.build_unchecked()))
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elspeth_builds() {
        let h = HeuristicConfig::elspeth().build().unwrap();
        let name = h.to_string();
        assert!(name.starts_with("Composite[20*PathLength(20)"));
        assert!(name.contains("RandomProbing("));
    }

    #[test]
    fn test_parse_from_json() {
        let json = r#"{
            "kind": "composite",
            "children": [
                {"weight": 2.0, "heuristic": {"kind": "path_length", "max_distance": 8}},
                {"weight": 1.0, "heuristic": {"kind": "region", "include_opponent_regions": true}},
                {"weight": 0.001, "heuristic": {"kind": "random"}}
            ]
        }"#;
        let config: HeuristicConfig = serde_json::from_str(json).unwrap();
        match &config {
            HeuristicConfig::Composite { children } => assert_eq!(children.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = HeuristicConfig::elspeth();
        let json = serde_json::to_string(&config).unwrap();
        let back: HeuristicConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(HeuristicConfig::PathLength { max_distance: 0 }.build().is_err());
        assert!(HeuristicConfig::Composite { children: vec![] }.build().is_err());
        let nested = HeuristicConfig::RandomProbing {
            delegate: Some(Box::new(HeuristicConfig::OpponentDistance {
                dist_threshold: 0,
                gated: None,
            })),
            n_steps: 3,
            n_probes: 3,
        };
        assert!(matches!(nested.build(), Err(ConfigError::Invalid(_))));
    }
}
