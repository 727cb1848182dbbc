//! Default game and search parameters.
//!
//! Every value here is only a default: [`GameConfig`](crate::config::GameConfig)
//! and [`SearchConfig`](crate::config::SearchConfig) carry the values actually
//! used, and the binary exposes them as command line flags.
//!
//! # Action Space Layout
//!
//! For a board of side `N` the action space has `8 + 2 (N-1)^2` entries:
//!
//! ```text
//! [0, 4)                      step forward / left / backward / right
//! [4, 8)                      jump, landing next to the opponent in that direction
//! [8, 8 + (N-1)^2)            vertical wall slots, row-major
//! [8 + (N-1)^2, 8 + 2(N-1)^2) horizontal wall slots, row-major
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board side, as used for training.
pub const DEFAULT_SIZE: usize = 5;

/// Default wall budget per player.
pub const DEFAULT_WALLS: u32 = 4;

/// Default ply cap; a game reaching this turn number is a draw.
pub const DEFAULT_MAX_TURNS: u32 = 112;

/// Board side of the tournament game.
pub const STANDARD_SIZE: usize = 9;

/// Wall budget of the tournament game.
pub const STANDARD_WALLS: u32 = 10;

/// Ply cap used with the tournament board.
pub const STANDARD_MAX_TURNS: u32 = 200;

/// Smallest board on which both pawns can start apart and still move.
pub const MIN_SIZE: usize = 3;

// =============================================================================
// Action Encoding
// =============================================================================

/// Number of pawn actions (4 steps followed by 4 jumps).
pub const PAWN_ACTIONS: usize = 8;

/// Offset of the first jump action.
pub const JUMP_OFFSET: usize = 4;

/// Row/column deltas of forward, left, backward and right, in the mover's frame.
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default exploration constant for PUCT.
pub const C_PUCT: f32 = 1.0;

/// Default Dirichlet concentration for root noise.
pub const DIRICHLET_ALPHA: f32 = 0.35;

/// Default weight of root noise against the network prior.
pub const DIRICHLET_EPSILON: f32 = 0.25;

/// Visits a rollout leaf needs before it grows children.
pub const EXPAND_VISITS: u32 = 10;

/// Rollout simulations per decision when no oracle is available.
pub const ROLLOUT_SIMULATIONS: usize = 100;

/// Default oracle-guided simulations per decision.
pub const N_SIMS: usize = 300;

/// Default visit-count temperature used during self-play.
pub const TEMPERATURE: f32 = 1.0;

// =============================================================================
// Oracle Input
// =============================================================================

/// Planes that do not depend on the wall budget: own pawn, opponent pawn,
/// vertical openness and horizontal openness.
pub const BASE_PLANES: usize = 4;

/// Total number of actions for a board of side `size`.
#[inline]
pub const fn action_space_size(size: usize) -> usize {
    PAWN_ACTIONS + 2 * (size - 1) * (size - 1)
}
