//! Agents and match orchestration.
//!
//! Two scoring conventions coexist and are kept apart on purpose:
//! [`first_seat_point`] (`0`, `0.5`, `1`) for match aggregation and
//! [`first_seat_value`] (`-1`, `0`, `1`) for value targets.

use log::info;

use crate::board::BoardState;
use crate::config::GameConfig;
use crate::driver::{greedy_action, MctsDriver};
use crate::error::{QuoridorError, Result};
use crate::oracle::NetworkOracle;
use crate::playout::random_action;

/// Something that picks an action for the side to move.
pub trait Agent {
    fn name(&self) -> &str;
    fn select_action(&mut self, board: &BoardState) -> Result<usize>;
}

/// Oracle-guided MCTS player.
pub struct MctsAgent<O> {
    oracle: O,
    driver: MctsDriver,
    simulations: usize,
    temperature: f32,
}

impl<O: NetworkOracle> MctsAgent<O> {
    pub fn new(oracle: O, driver: MctsDriver, simulations: usize, temperature: f32) -> Self {
        Self {
            oracle,
            driver,
            simulations,
            temperature,
        }
    }
}

impl<O: NetworkOracle> Agent for MctsAgent<O> {
    fn name(&self) -> &str {
        "mcts"
    }

    fn select_action(&mut self, board: &BoardState) -> Result<usize> {
        self.driver
            .choose_action(&self.oracle, board, self.simulations, self.temperature)
    }
}

/// Rollout MCTS player; needs no oracle.
pub struct RolloutAgent {
    driver: MctsDriver,
}

impl RolloutAgent {
    pub fn new(driver: MctsDriver) -> Self {
        Self { driver }
    }
}

impl Agent for RolloutAgent {
    fn name(&self) -> &str {
        "rollout"
    }

    fn select_action(&mut self, board: &BoardState) -> Result<usize> {
        self.driver.choose_action_no_oracle(board)
    }
}

/// Plays the oracle's favourite legal action, no search.
pub struct GreedyAgent<O> {
    oracle: O,
}

impl<O: NetworkOracle> GreedyAgent<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<O: NetworkOracle> Agent for GreedyAgent<O> {
    fn name(&self) -> &str {
        "greedy"
    }

    fn select_action(&mut self, board: &BoardState) -> Result<usize> {
        greedy_action(&self.oracle, board)
    }
}

/// Uniformly random legal actions.
pub struct RandomAgent {
    rng: fastrand::Rng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn select_action(&mut self, board: &BoardState) -> Result<usize> {
        random_action(board, &mut self.rng)
    }
}

/// Result of one finished game.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Final position, from the side to move
    pub board: BoardState,
    pub plies: u32,
    /// First seat's point
    pub point: f32,
}

fn require_over(board: &BoardState) -> Result<()> {
    if board.is_over() {
        Ok(())
    } else {
        Err(QuoridorError::State(format!(
            "game still running at turn {}",
            board.turn()
        )))
    }
}

/// First seat's match point: `1` win, `0.5` draw, `0` loss.
pub fn first_seat_point(board: &BoardState) -> Result<f32> {
    require_over(board)?;
    if !board.is_loss() {
        return Ok(0.5);
    }
    Ok(if board.is_first_to_move() { 0.0 } else { 1.0 })
}

/// First seat's outcome value: `1` win, `0` draw, `-1` loss.
pub fn first_seat_value(board: &BoardState) -> Result<f32> {
    require_over(board)?;
    if !board.is_loss() {
        return Ok(0.0);
    }
    Ok(if board.is_first_to_move() { -1.0 } else { 1.0 })
}

/// Play one game, `first` moving on odd turns.
pub fn play_match(
    first: &mut dyn Agent,
    second: &mut dyn Agent,
    config: GameConfig,
) -> Result<MatchOutcome> {
    let mut board = BoardState::new(config);
    let mut plies = 0;

    while !board.is_over() {
        let agent: &mut dyn Agent = if board.is_first_to_move() {
            &mut *first
        } else {
            &mut *second
        };
        let action = agent.select_action(&board)?;
        board = board.next(action)?;
        plies += 1;
    }

    let point = first_seat_point(&board)?;
    info!(
        "{} vs {}: {} after {} plies",
        first.name(),
        second.name(),
        point,
        plies
    );
    Ok(MatchOutcome {
        board,
        plies,
        point,
    })
}

/// Points scored by `a` over a series of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub results: Vec<f32>,
    pub average: f32,
}

/// Play `matches` games between `a` and `b`, swapping seats every game.
pub fn evaluate_agents(
    a: &mut dyn Agent,
    b: &mut dyn Agent,
    matches: usize,
    config: GameConfig,
) -> Result<Evaluation> {
    let mut results = Vec::with_capacity(matches);
    for i in 0..matches {
        let point = if i % 2 == 0 {
            play_match(a, b, config)?.point
        } else {
            1.0 - play_match(b, a, config)?.point
        };
        results.push(point);
    }
    let average = if results.is_empty() {
        0.0
    } else {
        results.iter().sum::<f32>() / results.len() as f32
    };
    info!(
        "{} vs {}: {:.3} over {} matches",
        a.name(),
        b.name(),
        average,
        matches
    );
    Ok(Evaluation { results, average })
}
