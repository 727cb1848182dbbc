//! Quoridor-Zero: a Quoridor engine driven by Monte Carlo Tree Search.
//!
//! Positions are always stored from the point of view of the player to
//! move, so move generation, search and scoring never branch on seat. The
//! search can be guided by a policy/value oracle (normally a trained
//! network) or run on random playouts alone.
//!
//! ## Modules
//!
//! - [`constants`] - Default sizes and search parameters
//! - [`config`] - Game and search configuration
//! - [`error`] - Error types
//! - [`union_find`] - Disjoint sets for path checks
//! - [`walls`] - Wall grids and tentative placement
//! - [`board`] - Positions, legal actions and the perspective flip
//! - [`oracle`] - Oracle interface and input encoding
//! - [`playout`] - Random game simulation
//! - [`mcts`] - Search tree with PUCT and UCB1 selection
//! - [`driver`] - Per-decision search and action choice
//! - [`game`] - Agents, matches and scoring
//! - [`selfplay`] - Parallel self-play generation
//! - [`wire`] - JSON board format
//! - [`protocol`] - Line protocol for playing against the engine
//! - [`logging`] - Logger setup
//!
//! ## Example
//!
//! ```
//! use quoridor_zero::board::BoardState;
//! use quoridor_zero::config::{GameConfig, SearchConfig};
//! use quoridor_zero::driver::MctsDriver;
//!
//! let board = BoardState::new(GameConfig::default());
//! let mut driver = MctsDriver::with_seed(SearchConfig::default(), 7).unwrap();
//! let action = driver.choose_action_no_oracle(&board).unwrap();
//! assert!(board.legal_actions().contains(&action));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod game;
pub mod logging;
pub mod mcts;
pub mod oracle;
pub mod playout;
pub mod protocol;
pub mod selfplay;
pub mod union_find;
pub mod walls;
pub mod wire;
