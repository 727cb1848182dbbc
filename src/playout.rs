//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal actions until the game ends or the
//! draw cap is hit, then scores the result from the perspective of the
//! player to move at the start.

use crate::board::BoardState;
use crate::error::{QuoridorError, Result};

/// Value of a finished position for its side to move: `-1` loss, `0` draw.
#[inline]
pub fn terminal_value(board: &BoardState) -> f32 {
    if board.is_loss() { -1.0 } else { 0.0 }
}

/// Pick a uniformly random legal action.
pub fn random_action(board: &BoardState, rng: &mut fastrand::Rng) -> Result<usize> {
    let actions = board.legal_actions();
    if actions.is_empty() {
        return Err(QuoridorError::State(format!(
            "no legal action at turn {}",
            board.turn()
        )));
    }
    Ok(actions[rng.usize(..actions.len())])
}

/// Play random actions to the end of the game.
///
/// Returns `-1`, `0` or `1` from the point of view of the player to move
/// in `board`.
pub fn random_playout(board: &BoardState, rng: &mut fastrand::Rng) -> Result<f32> {
    let mut pos = board.clone();
    let mut sign = 1.0;

    while !pos.is_over() {
        let action = random_action(&pos, rng)?;
        pos = pos.next(action)?;
        sign = -sign;
    }

    Ok(sign * terminal_value(&pos))
}
