//! Integration tests for spe_ed search
//!
//! Tests the full stack: forward model, environment, heuristics and search policies

use std::time::{Duration, Instant};

use rand::SeedableRng;
use speed_core::{
    Action, Direction, GameRng, MazeWalkerPolicy, Observation, Player, Policy, Position, Rules, SavedGame,
    SimulatedEnv, Simulator, SpiralPolicy,
};
use speed_search::{
    ActionSearchPolicy, HeuristicConfig, HeuristicPolicy, MaximinPolicy, PathLengthHeuristic, PolicyConfig,
    RandomProbingPolicy, RegionHeuristic,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn rng(seed: u64) -> GameRng {
    GameRng::seed_from_u64(seed)
}

fn two_players(width: usize, height: usize, a: (i32, i32, Direction), b: (i32, i32, Direction)) -> Simulator {
    Simulator::with_players(
        width,
        height,
        vec![
            Player::new(1, Position::new(a.0, a.1), a.2),
            Player::new(2, Position::new(b.0, b.1), b.2),
        ],
        Rules::default(),
    )
    .unwrap()
}

/// Play a full episode with `agent` as the controlled player; returns the
/// final reward and the number of rounds played
fn run_episode(env: &mut SimulatedEnv, agent: &mut dyn Policy, seed: u64) -> (f64, u32) {
    let mut rng = rng(seed);
    let mut obs = env.reset().unwrap();
    let mut rounds = 0;
    loop {
        let action = agent.act(&obs, &mut rng);
        let result = env.step(action).unwrap();
        rounds += 1;
        if result.done {
            return (result.reward, rounds);
        }
        obs = result.observation;
        assert!(rounds < 500, "episode did not terminate");
    }
}

// ============================================================================
// FORWARD MODEL
// ============================================================================

#[test]
fn test_quiet_rounds_keep_everyone_alive() {
    let mut sim = two_players(5, 5, (0, 0, Direction::Down), (4, 4, Direction::Up));
    for _ in 0..4 {
        sim = sim.step(&[Action::ChangeNothing, Action::ChangeNothing]).unwrap();
    }
    assert_eq!(sim.round(), 4);
    assert!(sim.is_active(1));
    assert!(sim.is_active(2));
    assert_eq!(sim.player(1).unwrap().position, Position::new(0, 4));
    assert_eq!(sim.player(2).unwrap().position, Position::new(4, 0));
    assert_eq!(sim.cells().occupied_count(), 10);
}

#[test]
fn test_speed_clamps_at_maximum() {
    let start = Simulator::with_players(
        30,
        3,
        vec![Player::new(1, Position::new(0, 1), Direction::Right).with_speed(10)],
        Rules::default(),
    )
    .unwrap();
    let next = start.step(&[Action::SpeedUp]).unwrap();
    let p = next.player(1).unwrap();
    assert_eq!(p.speed, 10);
    assert_eq!(p.position, Position::new(10, 1));
}

// ============================================================================
// ENVIRONMENT EPISODES
// ============================================================================

#[test]
fn test_episodes_against_search_opponents_terminate() {
    let opponents: Vec<Box<dyn Policy>> = vec![
        Box::new(
            ActionSearchPolicy::new(Box::new(PathLengthHeuristic::new(8)), 2)
                .with_time_budget(Duration::from_millis(20)),
        ),
        Box::new(HeuristicPolicy::new(Box::new(RegionHeuristic::new(false)))),
    ];
    let mut env = SimulatedEnv::new(12, 12, opponents, 11);
    let mut agent = RandomProbingPolicy::default();

    for seed in 0..3 {
        let (reward, rounds) = run_episode(&mut env, &mut agent, seed);
        assert!(reward == 1.0 || reward == 0.0 || reward == -1.0);
        assert!(rounds >= 1);
        assert!(env.is_done());
    }
}

#[test]
fn test_maximin_agent_plays_full_episode() {
    let opponents: Vec<Box<dyn Policy>> = vec![Box::new(MazeWalkerPolicy::new())];
    let mut env = SimulatedEnv::new(10, 10, opponents, 5);
    let mut agent = MaximinPolicy::new(Box::new(RegionHeuristic::new(true)), 2)
        .with_time_budget(Duration::from_millis(20))
        .with_relevance_radius(10);

    let (reward, _) = run_episode(&mut env, &mut agent, 9);
    assert!((-1.0..=1.0).contains(&reward));
}

#[test]
fn test_saved_game_round_trips_through_json() {
    let opponents: Vec<Box<dyn Policy>> = vec![Box::new(SpiralPolicy::new())];
    let mut env = SimulatedEnv::new(8, 8, opponents, 21);
    let mut agent = HeuristicPolicy::new(Box::new(PathLengthHeuristic::new(6)));
    let (_, rounds) = run_episode(&mut env, &mut agent, 4);

    let game = env.saved_game(vec!["agent".into(), "spiral".into()]);
    assert_eq!(game.len(), rounds as usize);
    assert_eq!(game.name_of(2), Some("spiral"));

    let json = game.to_json().unwrap();
    let back = SavedGame::from_json(&json).unwrap();
    assert_eq!(back, game);
    assert_eq!(back.last().unwrap().round, rounds);
}

// ============================================================================
// CONFIGURED POLICIES
// ============================================================================

#[test]
fn test_named_policies_make_legal_first_moves() {
    // plenty of room in every direction, so any sensible policy survives
    let sim = two_players(20, 20, (10, 10, Direction::Up), (2, 2, Direction::Right));
    let obs = Observation::from_simulator(&sim, 1).unwrap();

    let names = [
        "spiral",
        "maze_walker",
        "circle",
        "random_probing",
        "elspeth",
        "action_search",
        "maximin",
        "endgame",
        "maximin_endgame",
    ];
    for name in names {
        let mut policy = PolicyConfig::named(name).unwrap().build().unwrap();
        let obs = obs.clone().with_deadline(Instant::now() + Duration::from_millis(200));
        let action = policy.act(&obs, &mut rng(1));
        let next = sim.step_with(&[(1, action)]).unwrap();
        assert!(next.is_active(1), "{} played a fatal {:?}", policy, action);
    }
}

#[test]
fn test_policy_from_json_config() {
    let json = r#"{
        "kind": "action_search",
        "depth": 2,
        "time_budget_ms": 50,
        "heuristic": {"kind": "region"}
    }"#;
    let config: PolicyConfig = serde_json::from_str(json).unwrap();
    let mut policy = config.build().unwrap();

    let sim = two_players(6, 6, (0, 0, Direction::Up), (5, 5, Direction::Down));
    let obs = Observation::from_simulator(&sim, 1).unwrap();
    // up leaves the grid and left is the wall as well
    assert_eq!(policy.act(&obs, &mut rng(2)), Action::TurnRight);
}

#[test]
fn test_default_heuristic_config_is_buildable() {
    let policy = PolicyConfig::Heuristic {
        heuristic: HeuristicConfig::default(),
        occupancy_map_depth: 3,
    };
    assert!(policy.build().is_ok());
}

// ============================================================================
// DEADLINES
// ============================================================================

#[test]
fn test_expired_deadline_still_yields_legal_action() {
    let sim = two_players(8, 8, (0, 3, Direction::Left), (7, 7, Direction::Up));
    let obs = Observation::from_simulator(&sim, 1).unwrap().with_deadline(Instant::now());

    let mut search = ActionSearchPolicy::new(Box::new(RegionHeuristic::new(false)), 6);
    let action = search.act(&obs, &mut rng(3));
    assert!(sim.step_with(&[(1, action)]).unwrap().is_active(1));

    let mut maximin = MaximinPolicy::new(Box::new(RegionHeuristic::new(false)), 6);
    let action = maximin.act(&obs, &mut rng(3));
    assert!(sim.step_with(&[(1, action)]).unwrap().is_active(1));
}
