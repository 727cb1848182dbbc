//! Policy/value oracle interface and the input encoding it consumes.
//!
//! The oracle is normally a trained network living outside this crate. The
//! search only relies on the contract below: given an encoded position it
//! returns a policy over the *whole* action space and a value in `[-1, 1]`
//! for the side to move.

use thiserror::Error;

use crate::board::BoardState;
use crate::constants::{action_space_size, BASE_PLANES};

/// Errors raised by an oracle. Fatal to the search call that triggered them.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("invalid oracle output: {0}")]
    InvalidOutput(String),
}

/// Input tensor in plane-major `[channel][row][col]` layout.
///
/// Channels: own pawn, opponent pawn (seen from its own side), vertical openness (padded with a zero
/// column), horizontal openness (padded with a zero row), then `walls_self`
/// planes of ones, `max_walls - walls_self` planes of zeros, and the same
/// for the opponent.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBoard {
    pub planes: Vec<f32>,
    pub channels: usize,
    pub size: usize,
}

impl EncodedBoard {
    /// Value at `(channel, row, col)`.
    #[inline]
    pub fn at(&self, channel: usize, row: usize, col: usize) -> f32 {
        self.planes[(channel * self.size + row) * self.size + col]
    }

    /// Length of the action space this input belongs to.
    #[inline]
    pub fn action_space(&self) -> usize {
        action_space_size(self.size)
    }
}

/// Encode a position as oracle input.
pub fn encode_board(board: &BoardState) -> EncodedBoard {
    let n = board.size();
    let max_walls = board.config().walls() as usize;
    let channels = BASE_PLANES + 2 * max_walls;
    let plane = n * n;
    let mut planes = vec![0.0f32; channels * plane];

    let (r, c) = board.own_pawn();
    planes[r * n + c] = 1.0;
    // Opponent plane stays in the opponent's own frame
    let (r, c) = board.mirror(board.opponent_pawn());
    planes[plane + r * n + c] = 1.0;

    let walls = board.walls();
    for r in 0..n {
        for c in 0..n - 1 {
            if walls.open_vertical().get(r, c) {
                planes[2 * plane + r * n + c] = 1.0;
            }
        }
    }
    for r in 0..n - 1 {
        for c in 0..n {
            if walls.open_horizontal().get(r, c) {
                planes[3 * plane + r * n + c] = 1.0;
            }
        }
    }

    let budgets = [
        (BASE_PLANES, board.walls_self() as usize),
        (BASE_PLANES + max_walls, board.walls_other() as usize),
    ];
    for (first, count) in budgets {
        let start = first * plane;
        let end = (first + count.min(max_walls)) * plane;
        planes[start..end].fill(1.0);
    }

    EncodedBoard {
        planes,
        channels,
        size: n,
    }
}

/// Oracle output.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// One entry per action of the full action space.
    pub policy: Vec<f32>,
    /// Expected outcome for the side to move; `+1` is a certain win.
    pub value: f32,
}

impl Inference {
    /// Check the output against the oracle contract for `action_space`.
    pub fn validate(&self, action_space: usize) -> Result<(), OracleError> {
        if self.policy.len() != action_space {
            return Err(OracleError::InvalidOutput(format!(
                "policy has {} entries, action space has {action_space}",
                self.policy.len()
            )));
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(OracleError::InvalidOutput(format!(
                "value {} outside [-1, 1]",
                self.value
            )));
        }
        Ok(())
    }
}

/// A policy/value oracle.
pub trait NetworkOracle {
    fn infer(&self, input: &EncodedBoard) -> Result<Inference, OracleError>;
}

impl<F> NetworkOracle for F
where
    F: Fn(&EncodedBoard) -> Result<Inference, OracleError>,
{
    fn infer(&self, input: &EncodedBoard) -> Result<Inference, OracleError> {
        self(input)
    }
}

/// Uniform policy over the action space, neutral value.
///
/// Stand-in for a network when none is available; turns the guided search
/// into a plain visit-count search.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformOracle;

impl NetworkOracle for UniformOracle {
    fn infer(&self, input: &EncodedBoard) -> Result<Inference, OracleError> {
        let n = input.action_space();
        Ok(Inference {
            policy: vec![1.0 / n as f32; n],
            value: 0.0,
        })
    }
}
