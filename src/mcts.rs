//! Monte Carlo Tree Search over an arena of nodes.
//!
//! One [`SearchTree`] is built per decision and dropped afterwards. Nodes
//! live in a `Vec` and refer to their children by [`NodeId`]; the set of
//! canonical keys seen during the decision is stored once in the tree.
//!
//! Two evaluation schemes share the arena:
//! - [`SearchTree::evaluate`]: PUCT selection, leaves expanded with priors
//!   and a value from a [`NetworkOracle`], Dirichlet noise at the root.
//! - [`SearchTree::evaluate_rollout`]: UCB1 selection, leaves valued by
//!   random playouts and expanded only after enough visits.
//!
//! A child whose position already appeared during the decision is created
//! *dead*: it stays in its parent's list, so children line up with
//! [`BoardState::legal_actions`], but selection never picks it while a
//! live sibling exists.

use std::collections::HashSet;

use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma};

use crate::board::BoardState;
use crate::config::SearchConfig;
use crate::error::{QuoridorError, Result};
use crate::oracle::{encode_board, NetworkOracle};
use crate::playout::{random_playout, terminal_value};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Position at this node, from its mover's perspective
    pub board: BoardState,
    /// Action that led here from the parent (`None` for the root)
    pub action: Option<usize>,
    /// Prior probability assigned by the parent's expansion
    pub prior: f32,
    /// Accumulated value, from this node's mover's perspective
    pub w: f32,
    /// Visit count
    pub n: u32,
    /// `None` until the node is expanded
    pub children: Option<Vec<NodeId>>,
    pub root: bool,
    /// Position already seen during this decision
    pub dead: bool,
}

impl SearchNode {
    fn new(board: BoardState, action: Option<usize>, prior: f32, root: bool, dead: bool) -> Self {
        Self {
            board,
            action,
            prior,
            w: 0.0,
            n: 0,
            children: None,
            root,
            dead,
        }
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Average value from this node's mover's perspective.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.n == 0 { 0.0 } else { self.w / self.n as f32 }
    }

    /// PUCT score as seen from the parent.
    pub fn puct_score(&self, sqrt_total: f32, cpuct: f32) -> f32 {
        if self.dead {
            return f32::NEG_INFINITY;
        }
        let q = if self.n == 0 { 0.0 } else { -self.w / self.n as f32 };
        q + cpuct * self.prior * sqrt_total / (1.0 + self.n as f32)
    }

    /// UCB1 score as seen from the parent. Unvisited children come first.
    pub fn ucb1_score(&self, ln_total: f32) -> f32 {
        if self.dead {
            return f32::NEG_INFINITY;
        }
        if self.n == 0 {
            return f32::INFINITY;
        }
        let n = self.n as f32;
        -self.w / n + (2.0 * ln_total / n).sqrt()
    }
}

/// Arena holding one decision's search.
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    history: HashSet<String>,
    config: SearchConfig,
    rng: fastrand::Rng,
}

impl SearchTree {
    /// Create a tree with a single unexpanded root.
    pub fn new(board: BoardState, config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self {
            nodes: vec![SearchNode::new(board, None, 0.0, true, false)],
            history: HashSet::new(),
            config,
            rng,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct positions recorded during this decision.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Children of a node, empty if it is not expanded.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.as_deref().unwrap_or(&[])
    }

    fn allocate(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Add a successor, marking it dead if its position was seen before.
    fn push_child(&mut self, board: BoardState, action: usize, prior: f32) -> NodeId {
        let dead = !self.history.insert(board.key());
        self.allocate(SearchNode::new(board, Some(action), prior, false, dead))
    }

    #[inline]
    fn backup(&mut self, id: NodeId, value: f32) {
        let node = &mut self.nodes[id.0];
        node.w += value;
        node.n += 1;
    }

    fn legal_actions_of(&self, id: NodeId) -> Result<(BoardState, Vec<usize>)> {
        let board = self.nodes[id.0].board.clone();
        let legal = board.legal_actions();
        if legal.is_empty() {
            return Err(QuoridorError::State(format!(
                "no legal action at turn {}",
                board.turn()
            )));
        }
        Ok((board, legal))
    }

    /// Expand a node with one child per legal action and the given priors.
    fn expand(&mut self, id: NodeId, board: &BoardState, legal: &[usize], priors: &[f32]) -> Result<()> {
        let mut children = Vec::with_capacity(legal.len());
        for (&action, &prior) in legal.iter().zip(priors) {
            let next = board.next(action)?;
            children.push(self.push_child(next, action, prior));
        }
        trace!(
            "expanded node {} at turn {}: {} children",
            id.0,
            board.turn(),
            children.len()
        );
        self.nodes[id.0].children = Some(children);
        Ok(())
    }

    /// Expand a node with zero priors (rollout search).
    pub fn expand_uniform(&mut self, id: NodeId) -> Result<()> {
        if self.nodes[id.0].is_expanded() {
            return Ok(());
        }
        let (board, legal) = self.legal_actions_of(id)?;
        let priors = vec![0.0; legal.len()];
        self.expand(id, &board, &legal, &priors)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// First child with the highest score.
    fn argmax_child(&self, id: NodeId, score: impl Fn(&SearchNode) -> f32) -> Result<NodeId> {
        let children = self.children(id);
        let mut best = *children
            .first()
            .ok_or_else(|| QuoridorError::State("selection on a node without children".to_string()))?;
        let mut best_score = f32::NEG_INFINITY;
        for &child in children {
            let s = score(&self.nodes[child.0]);
            if s > best_score {
                best = child;
                best_score = s;
            }
        }
        Ok(best)
    }

    fn visit_total(&self, id: NodeId) -> u32 {
        self.children(id).iter().map(|c| self.nodes[c.0].n).sum()
    }

    /// Child maximising the PUCT score.
    pub fn select_puct(&self, id: NodeId) -> Result<NodeId> {
        let sqrt_total = (self.visit_total(id) as f32).sqrt();
        let cpuct = self.config.cpuct;
        self.argmax_child(id, |c| c.puct_score(sqrt_total, cpuct))
    }

    /// Child maximising UCB1.
    pub fn select_ucb1(&self, id: NodeId) -> Result<NodeId> {
        let ln_total = (self.visit_total(id).max(1) as f32).ln();
        self.argmax_child(id, |c| c.ucb1_score(ln_total))
    }

    // -------------------------------------------------------------------------
    // Oracle-guided evaluation
    // -------------------------------------------------------------------------

    /// Run one simulation from `id` and return its value for `id`'s mover.
    pub fn evaluate<O: NetworkOracle + ?Sized>(&mut self, id: NodeId, oracle: &O) -> Result<f32> {
        if self.nodes[id.0].board.is_over() {
            let value = terminal_value(&self.nodes[id.0].board);
            self.backup(id, value);
            return Ok(value);
        }

        if !self.nodes[id.0].is_expanded() {
            let (board, legal) = self.legal_actions_of(id)?;
            let inference = oracle.infer(&encode_board(&board))?;
            inference.validate(board.config().action_space())?;

            let mut priors = legal_priors(&inference.policy, &legal);
            if self.nodes[id.0].root {
                self.add_dirichlet_noise(&mut priors)?;
            }
            self.backup(id, inference.value);
            self.expand(id, &board, &legal, &priors)?;
            return Ok(inference.value);
        }

        let child = self.select_puct(id)?;
        let value = -self.evaluate(child, oracle)?;
        self.backup(id, value);
        Ok(value)
    }

    /// Mix Dirichlet(alpha) noise into the priors.
    fn add_dirichlet_noise(&mut self, priors: &mut [f32]) -> Result<()> {
        let eps = self.config.dirichlet_epsilon;
        if eps == 0.0 || priors.is_empty() {
            return Ok(());
        }
        let gamma = Gamma::new(self.config.dirichlet_alpha as f64, 1.0)
            .map_err(|e| QuoridorError::Config(format!("dirichlet alpha: {e}")))?;
        let mut rng = StdRng::seed_from_u64(self.rng.u64(..));
        let samples: Vec<f64> = (0..priors.len()).map(|_| gamma.sample(&mut rng)).collect();
        let total: f64 = samples.iter().sum();
        if total <= 0.0 {
            return Ok(());
        }
        for (p, s) in priors.iter_mut().zip(samples) {
            *p = (1.0 - eps) * *p + eps * (s / total) as f32;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Rollout evaluation
    // -------------------------------------------------------------------------

    /// Run one rollout simulation from `id` and return its value for `id`'s mover.
    pub fn evaluate_rollout(&mut self, id: NodeId) -> Result<f32> {
        if self.nodes[id.0].board.is_over() {
            let value = terminal_value(&self.nodes[id.0].board);
            self.backup(id, value);
            return Ok(value);
        }

        if !self.nodes[id.0].is_expanded() {
            let value = random_playout(&self.nodes[id.0].board, &mut self.rng)?;
            self.backup(id, value);
            if self.nodes[id.0].n >= self.config.rollout_expand_visits {
                self.expand_uniform(id)?;
            }
            return Ok(value);
        }

        let child = self.select_ucb1(id)?;
        let value = -self.evaluate_rollout(child)?;
        self.backup(id, value);
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Results
    // -------------------------------------------------------------------------

    /// Visit counts of the root's children in legal-action order; dead
    /// children count as zero.
    pub fn root_visits(&self) -> Vec<u32> {
        self.children(self.root())
            .iter()
            .map(|c| {
                let node = &self.nodes[c.0];
                if node.dead { 0 } else { node.n }
            })
            .collect()
    }

    /// Liveness of the root's children in legal-action order.
    pub fn root_live(&self) -> Vec<bool> {
        self.children(self.root())
            .iter()
            .map(|c| !self.nodes[c.0].dead)
            .collect()
    }

    /// Actions of the root's children in legal-action order.
    pub fn root_actions(&self) -> Vec<usize> {
        self.children(self.root())
            .iter()
            .filter_map(|c| self.nodes[c.0].action)
            .collect()
    }
}

/// Restrict a full policy to the legal actions and renormalise; uniform if
/// the restricted mass is zero.
pub fn legal_priors(policy: &[f32], legal: &[usize]) -> Vec<f32> {
    let mut priors: Vec<f32> = legal.iter().map(|&a| policy[a]).collect();
    let total: f32 = priors.iter().sum();
    if total > 0.0 && total.is_finite() {
        for p in &mut priors {
            *p /= total;
        }
    } else {
        priors.fill(1.0 / legal.len() as f32);
    }
    priors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::oracle::UniformOracle;

    fn tree(board: BoardState) -> SearchTree {
        SearchTree::new(board, SearchConfig::default(), fastrand::Rng::with_seed(11))
    }

    #[test]
    fn test_legal_priors_renormalise() {
        let policy = [0.1, 0.3, 0.0, 0.1, 0.5];
        let priors = legal_priors(&policy, &[1, 3]);
        assert!((priors[0] - 0.75).abs() < 1e-6);
        assert!((priors[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_legal_priors_zero_mass_is_uniform() {
        let policy = [0.0, 0.0, 1.0];
        assert_eq!(legal_priors(&policy, &[0, 1]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_first_evaluation_expands_root() {
        let board = BoardState::new(GameConfig::default());
        let legal = board.legal_actions();
        let mut t = tree(board);
        let value = t.evaluate(t.root(), &UniformOracle).unwrap();
        assert_eq!(value, 0.0);
        assert_eq!(t.get(t.root()).n, 1);
        assert_eq!(t.root_actions(), legal);
        // Noisy priors still form a distribution
        let total: f32 = t.children(t.root()).iter().map(|&c| t.get(c).prior).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_terminal_node_backs_up_loss() {
        let board = BoardState::new(GameConfig::default())
            .with_pawns((2, 2), (0, 3))
            .unwrap();
        let mut t = tree(board);
        assert_eq!(t.evaluate(t.root(), &UniformOracle).unwrap(), -1.0);
        assert_eq!(t.evaluate_rollout(t.root()).unwrap(), -1.0);
        assert_eq!(t.get(t.root()).n, 2);
        assert!(!t.get(t.root()).is_expanded());
    }

    #[test]
    fn test_puct_prefers_prior_then_value() {
        let mut node = SearchNode::new(BoardState::default(), Some(0), 0.5, false, false);
        assert_eq!(node.puct_score(0.0, 1.0), 0.0);
        assert!((node.puct_score(2.0, 1.0) - 1.0).abs() < 1e-6);
        node.w = -1.0;
        node.n = 1;
        // Child lost once: good for the parent
        assert!((node.puct_score(2.0, 1.0) - 1.5).abs() < 1e-6);
        node.dead = true;
        assert_eq!(node.puct_score(2.0, 1.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_ucb1_visits_unvisited_first() {
        let mut node = SearchNode::new(BoardState::default(), Some(0), 0.0, false, false);
        assert_eq!(node.ucb1_score(1.0), f32::INFINITY);
        node.n = 2;
        node.w = 2.0;
        assert!(node.ucb1_score(2.0f32.ln()) < 0.0);
    }

    #[test]
    fn test_rollout_leaf_expands_after_threshold() {
        let board = BoardState::new(GameConfig::default());
        let mut t = tree(board);
        for _ in 0..9 {
            t.evaluate_rollout(t.root()).unwrap();
        }
        assert!(!t.get(t.root()).is_expanded());
        t.evaluate_rollout(t.root()).unwrap();
        assert!(t.get(t.root()).is_expanded());
        assert!(t.children(t.root()).iter().all(|&c| t.get(c).prior == 0.0));
    }
}
