//! Integration tests for the tree search, the driver and match scoring.

use assert_matches::assert_matches;

use quoridor_zero::board::BoardState;
use quoridor_zero::config::{GameConfig, SearchConfig};
use quoridor_zero::driver::{greedy_action, MctsDriver};
use quoridor_zero::error::QuoridorError;
use quoridor_zero::game::{first_seat_point, first_seat_value};
use quoridor_zero::mcts::{NodeId, SearchTree};
use quoridor_zero::oracle::{EncodedBoard, Inference, OracleError, UniformOracle};

fn driver(seed: u64) -> MctsDriver {
    MctsDriver::with_seed(SearchConfig::default(), seed).unwrap()
}

fn finished_board() -> BoardState {
    // Opponent already stands on its goal row
    BoardState::new(GameConfig::default())
        .with_pawns((2, 2), (0, 0))
        .unwrap()
}

// =============================================================================
// Driver
// =============================================================================

#[test]
fn test_temperature_zero_is_one_hot_on_most_visited() {
    let board = BoardState::new(GameConfig::default());
    let tree = driver(1).search(&UniformOracle, &board, 60).unwrap();
    let visits = tree.root_visits();
    let best = visits.iter().copied().max().unwrap();
    let first_best = visits.iter().position(|&v| v == best).unwrap();

    let probs = driver(1)
        .action_probabilities(&UniformOracle, &board, 60, 0.0)
        .unwrap();
    assert_eq!(probs.iter().sum::<f32>(), 1.0);
    assert_eq!(probs.iter().filter(|&&p| p == 1.0).count(), 1);
    assert_eq!(probs[first_best], 1.0);
}

#[test]
fn test_choose_action_returns_legal_action() {
    let board = BoardState::new(GameConfig::default());
    let mut driver = driver(2);
    for _ in 0..5 {
        let action = driver.choose_action(&UniformOracle, &board, 20, 1.0).unwrap();
        assert!(board.legal_actions().contains(&action));
    }
}

#[test]
fn test_seeded_drivers_agree() {
    let board = BoardState::new(GameConfig::default());
    let a = driver(9)
        .action_probabilities(&UniformOracle, &board, 40, 1.0)
        .unwrap();
    let b = driver(9)
        .action_probabilities(&UniformOracle, &board, 40, 1.0)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_rollout_search_on_finished_board_fails() {
    assert_matches!(
        driver(3).choose_action_no_oracle(&finished_board()),
        Err(QuoridorError::State(_))
    );
}

#[test]
fn test_oracle_search_on_finished_board_fails() {
    assert_matches!(
        driver(3).choose_action(&UniformOracle, &finished_board(), 10, 1.0),
        Err(QuoridorError::State(_))
    );
}

#[test]
fn test_rollout_search_takes_winning_step() {
    // One step from the goal row with a free path
    let board = BoardState::new(GameConfig::default())
        .with_pawns((3, 2), (4, 0))
        .unwrap();
    assert_eq!(driver(4).choose_action_no_oracle(&board).unwrap(), 0);
}

// =============================================================================
// Oracle failures
// =============================================================================

#[test]
fn test_oracle_failure_propagates() {
    let offline = |_: &EncodedBoard| -> Result<Inference, OracleError> {
        Err(OracleError::Unavailable("offline".into()))
    };
    let board = BoardState::new(GameConfig::default());
    assert_matches!(
        driver(5).action_probabilities(&offline, &board, 10, 1.0),
        Err(QuoridorError::Oracle(OracleError::Unavailable(_)))
    );
}

#[test]
fn test_short_policy_is_rejected() {
    let short = |_: &EncodedBoard| -> Result<Inference, OracleError> {
        Ok(Inference {
            policy: vec![1.0; 3],
            value: 0.0,
        })
    };
    let board = BoardState::new(GameConfig::default());
    assert_matches!(
        driver(5).action_probabilities(&short, &board, 10, 1.0),
        Err(QuoridorError::Oracle(OracleError::InvalidOutput(_)))
    );
}

#[test]
fn test_out_of_range_value_is_rejected() {
    let board = BoardState::new(GameConfig::default());
    for bad in [f32::NAN, 2.0, f32::NEG_INFINITY] {
        let oracle = move |input: &EncodedBoard| -> Result<Inference, OracleError> {
            Ok(Inference {
                policy: vec![1.0; input.action_space()],
                value: bad,
            })
        };
        assert_matches!(
            driver(5).action_probabilities(&oracle, &board, 10, 1.0),
            Err(QuoridorError::Oracle(OracleError::InvalidOutput(_)))
        );
        assert_matches!(
            greedy_action(&oracle, &board),
            Err(QuoridorError::Oracle(OracleError::InvalidOutput(_)))
        );
    }
}

#[test]
fn test_zero_policy_on_legal_actions_falls_back_to_uniform() {
    // All mass on an action that is never legal at the start
    let skewed = |input: &EncodedBoard| -> Result<Inference, OracleError> {
        let mut policy = vec![0.0; input.action_space()];
        policy[2] = 1.0;
        Ok(Inference { policy, value: 0.0 })
    };
    let board = BoardState::new(GameConfig::default());
    let config = SearchConfig {
        dirichlet_epsilon: 0.0,
        ..SearchConfig::default()
    };
    let mut tree = SearchTree::new(board.clone(), config, fastrand::Rng::with_seed(1));
    tree.evaluate(tree.root(), &skewed).unwrap();
    let n = board.legal_actions().len() as f32;
    for &child in tree.children(tree.root()) {
        assert!((tree.get(child).prior - 1.0 / n).abs() < 1e-6);
    }
}

// =============================================================================
// Tree invariants
// =============================================================================

#[test]
fn test_dead_children_are_never_selected() {
    let board = BoardState::new(GameConfig::default());
    let mut tree = SearchTree::new(board, SearchConfig::default(), fastrand::Rng::with_seed(8));
    for _ in 0..400 {
        tree.evaluate(tree.root(), &UniformOracle).unwrap();
    }

    let mut dead = 0;
    for id in (0..tree.len()).map(NodeId) {
        let children = tree.children(id);
        let any_live = children.iter().any(|&c| !tree.get(c).dead);
        for &child in children {
            let node = tree.get(child);
            if node.dead {
                dead += 1;
                if any_live {
                    assert_eq!(node.n, 0, "dead child {} was visited", child.0);
                }
            }
        }
    }
    // Every live node owns one history entry
    assert_eq!(tree.history_len(), tree.len() - 1 - dead);
}

#[test]
fn test_visits_add_up() {
    let board = BoardState::new(GameConfig::default());
    let mut tree = SearchTree::new(board, SearchConfig::default(), fastrand::Rng::with_seed(2));
    for _ in 0..50 {
        tree.evaluate(tree.root(), &UniformOracle).unwrap();
    }
    let root = tree.get(tree.root());
    assert_eq!(root.n, 50);
    // The expansion visit is counted at the root only
    assert_eq!(tree.root_visits().iter().sum::<u32>(), 49);
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_scoring_unfinished_board_fails() {
    let board = BoardState::new(GameConfig::default());
    assert_matches!(first_seat_point(&board), Err(QuoridorError::State(_)));
    assert_matches!(first_seat_value(&board), Err(QuoridorError::State(_)));
}

#[test]
fn test_scoring_conventions_stay_apart() {
    // First seat to move (odd turn) and already lost
    let lost = finished_board();
    assert_eq!(first_seat_point(&lost).unwrap(), 0.0);
    assert_eq!(first_seat_value(&lost).unwrap(), -1.0);

    let won = finished_board().with_turn(2).unwrap();
    assert_eq!(first_seat_point(&won).unwrap(), 1.0);
    assert_eq!(first_seat_value(&won).unwrap(), 1.0);
}
