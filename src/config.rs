//! Game and search configuration.
//!
//! Both structs are small `Copy` values validated on construction, so code
//! holding one can rely on its invariants without re-checking.

use crate::constants::{
    action_space_size, BASE_PLANES, C_PUCT, DEFAULT_MAX_TURNS, DEFAULT_SIZE, DEFAULT_WALLS,
    DIRICHLET_ALPHA, DIRICHLET_EPSILON, EXPAND_VISITS, MIN_SIZE, ROLLOUT_SIMULATIONS,
    STANDARD_MAX_TURNS, STANDARD_SIZE, STANDARD_WALLS,
};
use crate::error::{QuoridorError, Result};

/// Board dimensions, wall budget and draw cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameConfig {
    size: usize,
    walls: u32,
    max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            walls: DEFAULT_WALLS,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl GameConfig {
    /// Create a validated configuration.
    pub fn new(size: usize, walls: u32, max_turns: u32) -> Result<Self> {
        if size < MIN_SIZE {
            return Err(QuoridorError::Config(format!(
                "board size must be at least {MIN_SIZE} (got {size})"
            )));
        }
        if max_turns < 2 {
            return Err(QuoridorError::Config(format!(
                "max turns must be at least 2 (got {max_turns})"
            )));
        }
        Ok(Self {
            size,
            walls,
            max_turns,
        })
    }

    /// The 9x9 tournament board with 10 walls each.
    pub fn standard() -> Self {
        Self {
            size: STANDARD_SIZE,
            walls: STANDARD_WALLS,
            max_turns: STANDARD_MAX_TURNS,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn walls(&self) -> u32 {
        self.walls
    }

    #[inline]
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Number of wall slots per orientation.
    #[inline]
    pub fn wall_slots(&self) -> usize {
        (self.size - 1) * (self.size - 1)
    }

    /// Length of the full action space.
    #[inline]
    pub fn action_space(&self) -> usize {
        action_space_size(self.size)
    }

    /// Depth of the oracle input tensor.
    #[inline]
    pub fn input_channels(&self) -> usize {
        BASE_PLANES + 2 * self.walls as usize
    }
}

/// Tunables of the tree search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub cpuct: f32,
    pub dirichlet_alpha: f32,
    pub dirichlet_epsilon: f32,
    /// Visits after which a rollout leaf expands.
    pub rollout_expand_visits: u32,
    /// Simulations run by the oracle-free decision.
    pub rollout_simulations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cpuct: C_PUCT,
            dirichlet_alpha: DIRICHLET_ALPHA,
            dirichlet_epsilon: DIRICHLET_EPSILON,
            rollout_expand_visits: EXPAND_VISITS,
            rollout_simulations: ROLLOUT_SIMULATIONS,
        }
    }
}

impl SearchConfig {
    /// Check the invariants the search relies on.
    pub fn validate(&self) -> Result<()> {
        if self.cpuct.is_nan() || self.cpuct <= 0.0 {
            return Err(QuoridorError::Config(format!(
                "cpuct must be positive (got {})",
                self.cpuct
            )));
        }
        if self.dirichlet_alpha.is_nan() || self.dirichlet_alpha <= 0.0 {
            return Err(QuoridorError::Config(format!(
                "dirichlet alpha must be positive (got {})",
                self.dirichlet_alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(QuoridorError::Config(format!(
                "dirichlet epsilon must be within [0, 1] (got {})",
                self.dirichlet_epsilon
            )));
        }
        if self.rollout_expand_visits == 0 || self.rollout_simulations == 0 {
            return Err(QuoridorError::Config(
                "rollout thresholds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_training_setup() {
        let config = GameConfig::default();
        assert_eq!(config.size(), 5);
        assert_eq!(config.walls(), 4);
        assert_eq!(config.max_turns(), 112);
        assert_eq!(config.action_space(), 8 + 2 * 16);
        assert_eq!(config.input_channels(), 12);
    }

    #[test]
    fn test_standard_board() {
        let config = GameConfig::standard();
        assert_eq!(config.action_space(), 136);
        assert_eq!(config.wall_slots(), 64);
    }

    #[test]
    fn test_rejects_tiny_board() {
        assert!(GameConfig::new(2, 1, 50).is_err());
        assert!(GameConfig::new(3, 0, 1).is_err());
        assert!(GameConfig::new(3, 0, 2).is_ok());
    }

    #[test]
    fn test_search_config_validation() {
        assert!(SearchConfig::default().validate().is_ok());

        let bad = SearchConfig {
            dirichlet_epsilon: 1.5,
            ..SearchConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = SearchConfig {
            cpuct: 0.0,
            ..SearchConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
