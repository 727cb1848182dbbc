//! Per-decision search driver.
//!
//! Every call builds a fresh [`SearchTree`] (and with it a fresh history
//! set), runs a fixed simulation budget and turns the root's visit counts
//! into an action distribution over [`BoardState::legal_actions`].

use log::debug;

use crate::board::BoardState;
use crate::config::SearchConfig;
use crate::error::{QuoridorError, Result};
use crate::mcts::SearchTree;
use crate::oracle::{encode_board, NetworkOracle};

/// Runs searches and picks actions.
pub struct MctsDriver {
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl MctsDriver {
    /// Create a driver with an entropy-seeded RNG.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: fastrand::Rng::new(),
        })
    }

    /// Create a reproducible driver.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: fastrand::Rng::with_seed(seed),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn fresh_tree(&mut self, board: &BoardState) -> SearchTree {
        let rng = fastrand::Rng::with_seed(self.rng.u64(..));
        SearchTree::new(board.clone(), self.config, rng)
    }

    /// Run `simulations` oracle-guided evaluations from a fresh root.
    pub fn search<O: NetworkOracle + ?Sized>(
        &mut self,
        oracle: &O,
        board: &BoardState,
        simulations: usize,
    ) -> Result<SearchTree> {
        if simulations == 0 {
            return Err(QuoridorError::Config(
                "search needs at least one simulation".to_string(),
            ));
        }
        if board.is_over() {
            return Err(QuoridorError::State(format!(
                "cannot search a finished game (turn {})",
                board.turn()
            )));
        }
        let mut tree = self.fresh_tree(board);
        let root = tree.root();
        for _ in 0..simulations {
            tree.evaluate(root, oracle)?;
        }
        Ok(tree)
    }

    /// Search distribution over the legal actions of `board`, aligned with
    /// [`BoardState::legal_actions`].
    pub fn action_probabilities<O: NetworkOracle + ?Sized>(
        &mut self,
        oracle: &O,
        board: &BoardState,
        simulations: usize,
        temperature: f32,
    ) -> Result<Vec<f32>> {
        if temperature.is_nan() || temperature < 0.0 {
            return Err(QuoridorError::Config(format!(
                "temperature must be >= 0 (got {temperature})"
            )));
        }
        let tree = self.search(oracle, board, simulations)?;
        let probs = visit_distribution(&tree.root_visits(), &tree.root_live(), temperature);
        debug!(
            "turn {}: {} simulations, {} nodes, root value {:.3}",
            board.turn(),
            simulations,
            tree.len(),
            tree.get(tree.root()).mean_value()
        );
        Ok(probs)
    }

    /// Sample an action from the search distribution.
    pub fn choose_action<O: NetworkOracle + ?Sized>(
        &mut self,
        oracle: &O,
        board: &BoardState,
        simulations: usize,
        temperature: f32,
    ) -> Result<usize> {
        let probs = self.action_probabilities(oracle, board, simulations, temperature)?;
        let action = self.sample_action(&board.legal_actions(), &probs)?;
        debug!("turn {}: chose action {action}", board.turn());
        Ok(action)
    }

    /// Draw one of `legal` with the aligned probabilities `probs`.
    pub fn sample_action(&mut self, legal: &[usize], probs: &[f32]) -> Result<usize> {
        if legal.is_empty() || legal.len() != probs.len() {
            return Err(QuoridorError::State(format!(
                "{} probabilities for {} legal actions",
                probs.len(),
                legal.len()
            )));
        }
        Ok(legal[sample_index(probs, &mut self.rng)])
    }

    /// Rollout search without an oracle: pre-expand the root, run the
    /// configured number of rollouts and return the most visited action.
    pub fn choose_action_no_oracle(&mut self, board: &BoardState) -> Result<usize> {
        if board.is_over() {
            return Err(QuoridorError::State(format!(
                "no action to choose in a finished game (turn {})",
                board.turn()
            )));
        }
        let mut tree = self.fresh_tree(board);
        let root = tree.root();
        tree.expand_uniform(root)?;
        for _ in 0..self.config.rollout_simulations {
            tree.evaluate_rollout(root)?;
        }

        let counts = tree.root_visits();
        let best = argmax_first(&counts);
        let actions = tree.root_actions();
        let action = *actions
            .get(best)
            .ok_or_else(|| QuoridorError::State("root has no children".to_string()))?;
        debug!(
            "turn {}: rollout search chose action {action} ({} visits)",
            board.turn(),
            counts[best]
        );
        Ok(action)
    }
}

/// Legal action with the highest oracle prior, without any search.
pub fn greedy_action<O: NetworkOracle + ?Sized>(oracle: &O, board: &BoardState) -> Result<usize> {
    let legal = board.legal_actions();
    if legal.is_empty() {
        return Err(QuoridorError::State(format!(
            "no legal action at turn {}",
            board.turn()
        )));
    }
    let inference = oracle.infer(&encode_board(board))?;
    inference.validate(board.config().action_space())?;
    let mut best = legal[0];
    for &action in &legal {
        if inference.policy[action] > inference.policy[best] {
            best = action;
        }
    }
    Ok(best)
}

/// Turn visit counts into probabilities.
///
/// Temperature `0` gives a one-hot vector on the most visited child (first
/// wins ties); otherwise `p ∝ n^(1/T)`. If nothing was visited the live
/// children share the mass equally.
pub fn visit_distribution(counts: &[u32], live: &[bool], temperature: f32) -> Vec<f32> {
    let mut probs = vec![0.0f32; counts.len()];
    if counts.is_empty() {
        return probs;
    }

    if temperature == 0.0 {
        let best = if counts.iter().all(|&c| c == 0) {
            live.iter().position(|&l| l).unwrap_or(0)
        } else {
            argmax_first(counts)
        };
        probs[best] = 1.0;
        return probs;
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        let alive = live.iter().filter(|&&l| l).count();
        if alive == 0 {
            probs.fill(1.0 / counts.len() as f32);
        } else {
            for (p, &l) in probs.iter_mut().zip(live) {
                if l {
                    *p = 1.0 / alive as f32;
                }
            }
        }
        return probs;
    }

    // Scale by the max count first so large exponents stay finite
    let inv_t = 1.0 / temperature as f64;
    let weights: Vec<f64> = counts
        .iter()
        .map(|&c| (c as f64 / max as f64).powf(inv_t))
        .collect();
    let total: f64 = weights.iter().sum();
    for (p, w) in probs.iter_mut().zip(weights) {
        *p = (w / total) as f32;
    }
    probs
}

fn argmax_first(counts: &[u32]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}

/// Sample an index proportionally to `probs`.
fn sample_index(probs: &[f32], rng: &mut fastrand::Rng) -> usize {
    let total: f32 = probs.iter().sum();
    let mut target = rng.f32() * total;
    let mut last = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        if target < p {
            return i;
        }
        target -= p;
        last = i;
    }
    last
}
