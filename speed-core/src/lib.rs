//! spe_ed Core - Game engine and baseline players
//!
//! This crate provides the core game logic for spe_ed:
//! - Grid with copy-on-write rows
//! - Players, actions and configurable rules
//! - Pure transition function and a clone-and-branch simulator
//! - Single-agent simulated environment
//! - Policy trait and reactive baseline policies
//! - JSON replay format

pub mod action;
pub mod baselines;
pub mod cells;
pub mod env;
pub mod error;
pub mod player;
pub mod policy;
pub mod position;
pub mod replay;
pub mod rules;
pub mod simulate;
pub mod simulator;

// Re-exports for convenient access
pub use action::Action;
pub use baselines::{CirclePolicy, MazeWalkerPolicy, RandomPolicy, ScriptedPolicy, SpiralPolicy};
pub use cells::{Cells, FREE};
pub use env::{SimulatedEnv, StepInfo, StepResult, CONTROLLED_ID};
pub use error::{GameError, ReplayError};
pub use player::{Player, PlayerId, MAX_PLAYERS};
pub use policy::{GameRng, Observation, Policy};
pub use position::{Direction, Position};
pub use replay::{RoundSnapshot, SavedGame};
pub use rules::Rules;
pub use simulate::{marked_path, simulate, validate_players, Transition};
pub use simulator::Simulator;
