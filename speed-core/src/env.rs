//! Single-agent environment: one controlled player against fixed opponent
//! policies, stepped one round at a time

use rand::SeedableRng;
use tracing::{debug, info};

use crate::action::Action;
use crate::error::GameError;
use crate::player::{PlayerId, MAX_PLAYERS};
use crate::policy::{GameRng, Observation, Policy};
use crate::replay::{RoundSnapshot, SavedGame};
use crate::rules::Rules;
use crate::simulator::Simulator;

/// Id of the player driven through `step`
pub const CONTROLLED_ID: PlayerId = 1;

/// Per-step diagnostics
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepInfo {
    pub round: u32,
    /// Players eliminated by this step
    pub eliminated: Vec<PlayerId>,
}

/// Result of one environment step
#[derive(Clone, Debug)]
pub struct StepResult {
    pub observation: Observation,
    /// 0 until the episode ends, then +1 win / 0 draw / -1 loss
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// Simulated game with the controlled player as id 1 and each opponent
/// policy driving ids 2, 3, ...
pub struct SimulatedEnv {
    width: usize,
    height: usize,
    rules: Rules,
    opponents: Vec<Box<dyn Policy>>,
    rng: GameRng,
    state: Option<Simulator>,
    history: Vec<RoundSnapshot>,
    done: bool,
}

impl SimulatedEnv {
    pub fn new(width: usize, height: usize, opponents: Vec<Box<dyn Policy>>, seed: u64) -> Self {
        Self {
            width,
            height,
            rules: Rules::default(),
            opponents,
            rng: GameRng::seed_from_u64(seed),
            state: None,
            history: Vec::new(),
            done: false,
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn n_players(&self) -> usize {
        self.opponents.len() + 1
    }

    /// Current game state, once `reset` has been called
    pub fn state(&self) -> Option<&Simulator> {
        self.state.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Start a new episode on an empty grid with random placement
    pub fn reset(&mut self) -> Result<Observation, GameError> {
        if self.n_players() > MAX_PLAYERS {
            return Err(GameError::InvalidConfig(format!(
                "{} opponents leave no room for the controlled player",
                self.opponents.len()
            )));
        }
        let sim = Simulator::random(self.width, self.height, self.n_players(), self.rules, &mut self.rng)?;
        debug!(
            width = self.width,
            height = self.height,
            players = self.n_players(),
            "episode reset"
        );

        self.history.clear();
        self.history.push(RoundSnapshot::of(&sim));
        self.done = sim.is_over();
        let obs = Observation::from_simulator(&sim, CONTROLLED_ID)?;
        self.state = Some(sim);
        Ok(obs)
    }

    /// Play one round: opponents act on their own observations, then the
    /// transition is applied with `action` for the controlled player
    pub fn step(&mut self, action: Action) -> Result<StepResult, GameError> {
        if self.done {
            return Err(GameError::IllegalState("step called on a finished episode".into()));
        }
        let sim = self
            .state
            .as_ref()
            .ok_or_else(|| GameError::IllegalState("step called before reset".into()))?;

        let mut moves: Vec<(PlayerId, Action)> = Vec::with_capacity(self.n_players());
        if sim.is_active(CONTROLLED_ID) {
            moves.push((CONTROLLED_ID, action));
        }
        for (i, policy) in self.opponents.iter_mut().enumerate() {
            let id = i as PlayerId + 2;
            if sim.is_active(id) {
                let obs = Observation::from_simulator(sim, id)?;
                moves.push((id, policy.act(&obs, &mut self.rng)));
            }
        }

        let next = sim.step_with(&moves)?;
        let eliminated = next.eliminated().to_vec();
        if !eliminated.is_empty() {
            debug!(round = next.round(), ?eliminated, "players eliminated");
        }

        let controlled_alive = next.is_active(CONTROLLED_ID);
        self.done = !controlled_alive || next.is_over();
        let reward = if self.done { Self::outcome(&next) } else { 0.0 };
        if self.done {
            info!(round = next.round(), winner = ?next.winner(), reward, "episode finished");
        }

        self.history.push(RoundSnapshot::of(&next));
        let observation = Observation::from_simulator(&next, CONTROLLED_ID)?;
        let info = StepInfo {
            round: next.round(),
            eliminated,
        };
        self.state = Some(next);

        Ok(StepResult {
            observation,
            reward,
            done: self.done,
            info,
        })
    }

    /// Terminal reward for the controlled player
    fn outcome(sim: &Simulator) -> f64 {
        match (sim.is_active(CONTROLLED_ID), sim.active_count()) {
            (true, _) => 1.0,
            (false, 0) => 0.0,
            (false, _) => -1.0,
        }
    }

    /// Snapshots recorded since the last reset
    pub fn saved_game(&self, names: Vec<String>) -> SavedGame {
        SavedGame {
            width: self.width,
            height: self.height,
            names,
            winner: self.state.as_ref().and_then(Simulator::winner),
            you: Some(CONTROLLED_ID),
            rounds: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baselines::{MazeWalkerPolicy, ScriptedPolicy};
    use crate::player::Player;
    use crate::position::{Direction, Position};

    fn env_with(opponents: Vec<Box<dyn Policy>>) -> SimulatedEnv {
        SimulatedEnv::new(8, 8, opponents, 3)
    }

    /// Replace the random start with a fixed position
    fn place(env: &mut SimulatedEnv, players: Vec<Player>) {
        let sim = Simulator::with_players(env.width, env.height, players, env.rules).unwrap();
        env.history = vec![RoundSnapshot::of(&sim)];
        env.done = false;
        env.state = Some(sim);
    }

    #[test]
    fn test_reset_places_all_players() {
        let mut env = env_with(vec![Box::new(MazeWalkerPolicy::new()), Box::new(MazeWalkerPolicy::new())]);
        let obs = env.reset().unwrap();
        assert_eq!(obs.you.id, CONTROLLED_ID);
        assert_eq!(obs.opponents.len(), 2);
        assert_eq!(obs.round, 0);
        assert_eq!(obs.cells.occupied_count(), 3);
    }

    #[test]
    fn test_reset_is_reproducible_per_seed() {
        let mut a = env_with(vec![Box::new(MazeWalkerPolicy::new())]);
        let mut b = env_with(vec![Box::new(MazeWalkerPolicy::new())]);
        let (oa, ob) = (a.reset().unwrap(), b.reset().unwrap());
        assert_eq!(oa.you, ob.you);
        assert_eq!(oa.opponents, ob.opponents);
    }

    #[test]
    fn test_step_before_reset_is_illegal() {
        let mut env = env_with(vec![]);
        assert!(matches!(env.step(Action::ChangeNothing), Err(GameError::IllegalState(_))));
    }

    #[test]
    fn test_win_reward() {
        let mut env = env_with(vec![Box::new(ScriptedPolicy::new(vec![]))]);
        env.reset().unwrap();
        place(
            &mut env,
            vec![
                Player::new(1, Position::new(3, 3), Direction::Right),
                Player::new(2, Position::new(0, 0), Direction::Up),
            ],
        );
        let res = env.step(Action::ChangeNothing).unwrap();
        assert!(res.done);
        assert_eq!(res.reward, 1.0);
        assert_eq!(res.info.eliminated, vec![2]);
        assert_eq!(res.info.round, 1);
    }

    #[test]
    fn test_loss_reward_and_no_step_after_done() {
        let mut env = env_with(vec![Box::new(ScriptedPolicy::new(vec![]))]);
        env.reset().unwrap();
        place(
            &mut env,
            vec![
                Player::new(1, Position::new(0, 0), Direction::Up),
                Player::new(2, Position::new(3, 3), Direction::Right),
            ],
        );
        let res = env.step(Action::ChangeNothing).unwrap();
        assert!(res.done);
        assert_eq!(res.reward, -1.0);
        assert!(matches!(env.step(Action::ChangeNothing), Err(GameError::IllegalState(_))));
    }

    #[test]
    fn test_draw_reward() {
        let mut env = env_with(vec![Box::new(ScriptedPolicy::new(vec![]))]);
        env.reset().unwrap();
        place(
            &mut env,
            vec![
                Player::new(1, Position::new(2, 3), Direction::Right),
                Player::new(2, Position::new(4, 3), Direction::Left),
            ],
        );
        let res = env.step(Action::ChangeNothing).unwrap();
        assert!(res.done);
        assert_eq!(res.reward, 0.0);
        assert_eq!(res.info.eliminated, vec![1, 2]);
    }

    #[test]
    fn test_ongoing_step_has_zero_reward_and_history() {
        let mut env = env_with(vec![Box::new(ScriptedPolicy::new(vec![]))]);
        env.reset().unwrap();
        place(
            &mut env,
            vec![
                Player::new(1, Position::new(0, 0), Direction::Down),
                Player::new(2, Position::new(7, 7), Direction::Up),
            ],
        );
        let res = env.step(Action::ChangeNothing).unwrap();
        assert!(!res.done);
        assert_eq!(res.reward, 0.0);
        assert_eq!(res.observation.you.position, Position::new(0, 1));

        let game = env.saved_game(vec!["agent".into(), "idle".into()]);
        assert_eq!(game.rounds.len(), 2);
        assert_eq!(game.you, Some(CONTROLLED_ID));
        assert_eq!(game.winner, None);
    }

    #[test]
    fn test_too_many_opponents_rejected() {
        let opponents: Vec<Box<dyn Policy>> = (0..MAX_PLAYERS)
            .map(|_| Box::new(MazeWalkerPolicy::new()) as Box<dyn Policy>)
            .collect();
        let mut env = env_with(opponents);
        assert!(matches!(env.reset(), Err(GameError::InvalidConfig(_))));
    }
}
