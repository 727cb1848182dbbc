//! Integration tests for the board rules: legal actions, walls and the
//! perspective flip.

use assert_matches::assert_matches;

use quoridor_zero::board::{Action, BoardState};
use quoridor_zero::config::GameConfig;
use quoridor_zero::error::QuoridorError;
use quoridor_zero::playout::random_action;
use quoridor_zero::walls::{Orientation, WallGrid};

// =============================================================================
// Helpers
// =============================================================================

fn standard() -> BoardState {
    BoardState::new(GameConfig::standard())
}

/// Play `plies` random actions (or until the game ends).
fn random_game(config: GameConfig, seed: u64, plies: usize) -> Vec<BoardState> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut board = BoardState::new(config);
    let mut seen = vec![board.clone()];
    for _ in 0..plies {
        if board.is_over() {
            break;
        }
        let action = random_action(&board, &mut rng).unwrap();
        board = board.next(action).unwrap();
        seen.push(board.clone());
    }
    seen
}

// =============================================================================
// Golden fixtures
// =============================================================================

#[test]
fn test_empty_standard_board_actions() {
    let board = standard();
    let legal = board.legal_actions();

    // Forward, left and right; backward runs off the home row.
    let mut expected = vec![0, 1, 3];
    expected.extend(8..8 + 2 * 64);
    assert_eq!(legal, expected);
    assert_eq!(legal.len(), 131);
}

#[test]
fn test_diagonal_jump_when_wall_behind_opponent() {
    let config = GameConfig::standard();
    let mut walls = WallGrid::new(9);
    walls.place(Orientation::Horizontal, 5, 4);
    let board = BoardState::from_parts(config, (4, 4), (5, 4), walls, 9, 10, 3).unwrap();

    let legal = board.legal_actions();
    // Sideways landings next to the opponent
    assert!(legal.contains(&5));
    assert!(legal.contains(&7));
    // Neither the blocked straight jump nor the occupied square
    assert!(!legal.contains(&4));
    assert!(!legal.contains(&0));

    let after = board.next(5).unwrap();
    // Mover landed on (5, 5); seen from the other side that is (3, 3)
    assert_eq!(after.opponent_pawn(), (3, 3));
}

#[test]
fn test_straight_jump_over_opponent() {
    let board = standard().with_pawns((4, 4), (5, 4)).unwrap();
    let legal = board.legal_actions();
    assert!(legal.contains(&4));
    assert!(!legal.contains(&5));
    assert!(!legal.contains(&7));
    assert_eq!(board.next(4).unwrap().opponent_pawn(), (2, 4));
}

#[test]
fn test_crossing_wall_is_rejected() {
    let board = standard();
    let vertical = Action::Wall(Orientation::Vertical, 3, 3).index(9);
    let horizontal = Action::Wall(Orientation::Horizontal, 3, 3).index(9);

    let mut after = board.clone();
    after.apply(vertical).unwrap();
    assert!(!after.is_legal(horizontal));
    assert!(!after.is_legal(vertical));
    // Overlapping half of the same orientation
    assert!(!after.is_legal(Action::Wall(Orientation::Vertical, 4, 3).index(9)));
    assert!(after.is_legal(Action::Wall(Orientation::Vertical, 5, 3).index(9)));
}

#[test]
fn test_wall_that_seals_a_pawn_is_rejected() {
    // 3x3 board, own pawn in the corner with its right side walled off
    let config = GameConfig::new(3, 2, 40).unwrap();
    let mut walls = WallGrid::new(3);
    walls.place(Orientation::Vertical, 0, 0);
    let board = BoardState::from_parts(config, (0, 0), (2, 2), walls, 2, 2, 1).unwrap();

    // Closing (1,0)-(2,0) and (1,1)-(2,1) would trap the pawn in the top
    // two cells of the first column.
    let sealing = Action::Wall(Orientation::Horizontal, 1, 0).index(3);
    assert_eq!(sealing, 14);
    assert!(!board.legal_actions().contains(&sealing));
    assert_matches!(
        board.next(sealing),
        Err(QuoridorError::InvalidAction { action }) if action == sealing
    );
    // The neighbouring slot leaves a way round
    assert!(board.is_legal(Action::Wall(Orientation::Horizontal, 1, 1).index(3)));
}

#[test]
fn test_no_walls_without_budget() {
    let board = BoardState::from_parts(
        GameConfig::standard(),
        (0, 4),
        (8, 4),
        WallGrid::new(9),
        0,
        10,
        1,
    )
    .unwrap();
    assert!(board.legal_actions().iter().all(|&a| a < 8));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_illegal_actions_fail() {
    let board = standard();
    // Backward off the home row
    assert_matches!(board.next(2), Err(QuoridorError::InvalidAction { action: 2 }));
    // Jump with nobody to jump over
    assert_matches!(board.next(4), Err(QuoridorError::InvalidAction { action: 4 }));
    // Past the end of the action space
    assert_matches!(board.next(10_000), Err(QuoridorError::InvalidAction { action: 10_000 }));
}

#[test]
fn test_failed_apply_leaves_board_untouched() {
    let board = standard();
    let mut copy = board.clone();
    assert!(copy.apply(2).is_err());
    assert!(copy.apply(500).is_err());
    assert_eq!(copy, board);
}

// =============================================================================
// Perspective flip
// =============================================================================

#[test]
fn test_flip_is_an_involution() {
    for board in random_game(GameConfig::default(), 3, 30) {
        let twice = board.flip().flip();
        assert_eq!(twice, board.clone().with_turn(board.turn() + 2).unwrap());
    }
}

#[test]
fn test_two_moves_keep_walls_in_place() {
    let mut walls = WallGrid::new(9);
    walls.place(Orientation::Vertical, 2, 6);
    walls.place(Orientation::Horizontal, 6, 1);
    let board =
        BoardState::from_parts(GameConfig::standard(), (0, 4), (8, 4), walls, 8, 8, 5).unwrap();

    // Both players step forward
    let after = board.next(0).unwrap().next(0).unwrap();
    assert_eq!(after.walls(), board.walls());
    assert_eq!(after.own_pawn(), (1, 4));
    assert_eq!(after.opponent_pawn(), (7, 4));
    assert_eq!(after.turn(), 7);
}

#[test]
fn test_wall_moves_to_other_frame() {
    let board = standard();
    let action = Action::Wall(Orientation::Vertical, 0, 0).index(9);
    let after = board.next(action).unwrap();
    assert_eq!(after.walls_self(), 10);
    assert_eq!(after.walls_other(), 9);
    assert!(after.walls().placed(Orientation::Vertical).get(7, 7));
    assert!(!after.walls().open_vertical().get(8, 7));
    assert!(!after.walls().open_vertical().get(7, 7));
}

// =============================================================================
// Properties over random games
// =============================================================================

#[test]
fn test_running_games_always_have_actions() {
    for seed in 0..10 {
        for board in random_game(GameConfig::default(), seed, 200) {
            if !board.is_over() {
                assert!(!board.legal_actions().is_empty());
            }
        }
    }
}

#[test]
fn test_legal_walls_keep_paths_open() {
    for board in random_game(GameConfig::default(), 21, 40) {
        if board.is_over() {
            break;
        }
        let before = board.walls().clone();
        for action in board.legal_actions().into_iter().filter(|&a| a >= 8) {
            let next = board.next(action).unwrap();
            let walls = next.walls();
            let mut uf = walls.connectivity();
            let n = next.size();
            assert!(walls.reaches_row(&mut uf, next.own_pawn(), n - 1));
            assert!(walls.reaches_row(&mut uf, next.opponent_pawn(), 0));
        }
        // Probing every slot leaves the grids bit-for-bit unchanged
        assert_eq!(board.walls(), &before);
    }
}

#[test]
fn test_games_end_by_goal_or_cap() {
    let config = GameConfig::new(5, 4, 60).unwrap();
    for seed in 0..5 {
        let last = random_game(config, seed, 1_000).pop().unwrap();
        assert!(last.is_over());
        assert!(last.is_loss() || last.turn() == 60);
    }
}
