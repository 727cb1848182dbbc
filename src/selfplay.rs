//! Self-play data generation.
//!
//! Each game records, per ply, the encoded input, the search distribution
//! over the full action space and the final outcome from that ply's mover.
//! Games are independent and run in parallel, one driver per game.

use log::info;
use rayon::prelude::*;

use crate::board::BoardState;
use crate::config::{GameConfig, SearchConfig};
use crate::driver::MctsDriver;
use crate::error::Result;
use crate::game::{first_seat_point, first_seat_value};
use crate::oracle::{encode_board, EncodedBoard, NetworkOracle};

/// Training samples of one finished game.
#[derive(Debug, Clone)]
pub struct SelfPlayRecord {
    pub inputs: Vec<EncodedBoard>,
    /// Full-action-space search distributions
    pub policies: Vec<Vec<f32>>,
    /// Outcome for each ply's mover
    pub values: Vec<f32>,
    /// First seat's point
    pub point: f32,
}

impl SelfPlayRecord {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Play one game against itself and record it.
pub fn self_play_game<O: NetworkOracle + ?Sized>(
    oracle: &O,
    driver: &mut MctsDriver,
    config: GameConfig,
    simulations: usize,
    temperature: f32,
) -> Result<SelfPlayRecord> {
    let mut board = BoardState::new(config);
    let mut inputs = Vec::new();
    let mut policies = Vec::new();

    while !board.is_over() {
        let legal = board.legal_actions();
        let probs = driver.action_probabilities(oracle, &board, simulations, temperature)?;

        let mut policy = vec![0.0f32; config.action_space()];
        for (&action, &p) in legal.iter().zip(&probs) {
            policy[action] = p;
        }
        inputs.push(encode_board(&board));
        policies.push(policy);

        let action = driver.sample_action(&legal, &probs)?;
        board = board.next(action)?;
    }

    let first = first_seat_value(&board)?;
    let values = (0..inputs.len())
        .map(|ply| if ply % 2 == 0 { first } else { -first })
        .collect();
    let point = first_seat_point(&board)?;
    info!(
        "self-play game over after {} plies, first seat point {point}",
        inputs.len()
    );

    Ok(SelfPlayRecord {
        inputs,
        policies,
        values,
        point,
    })
}

/// Accumulates finished games for the caller.
#[derive(Debug, Clone, Default)]
pub struct SelfPlayBuffer {
    records: Vec<SelfPlayRecord>,
}

impl SelfPlayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: SelfPlayRecord) {
        self.records.push(record);
    }

    /// Number of recorded positions.
    pub fn len(&self) -> usize {
        self.records.iter().map(SelfPlayRecord::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn games(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[SelfPlayRecord] {
        &self.records
    }

    /// First seat's point of every game, in insertion order.
    pub fn results(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.point).collect()
    }

    pub fn mean_result(&self) -> Option<f32> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.results().iter().sum::<f32>() / self.records.len() as f32)
    }

    /// Flattened `(input, policy, value)` samples.
    pub fn samples(&self) -> impl Iterator<Item = (&EncodedBoard, &[f32], f32)> + '_ {
        self.records.iter().flat_map(|r| {
            r.inputs
                .iter()
                .zip(&r.policies)
                .zip(&r.values)
                .map(|((input, policy), &value)| (input, policy.as_slice(), value))
        })
    }
}

/// Play `games` independent games in parallel; game `i` is seeded with
/// `seed + i`.
#[allow(clippy::too_many_arguments)]
pub fn generate_self_play<O: NetworkOracle + Sync + ?Sized>(
    oracle: &O,
    search: SearchConfig,
    config: GameConfig,
    simulations: usize,
    temperature: f32,
    games: usize,
    seed: u64,
    buffer: &mut SelfPlayBuffer,
) -> Result<()> {
    let records = (0..games)
        .into_par_iter()
        .map(|i| {
            let mut driver = MctsDriver::with_seed(search, seed.wrapping_add(i as u64))?;
            self_play_game(oracle, &mut driver, config, simulations, temperature)
        })
        .collect::<Result<Vec<_>>>()?;

    for record in records {
        buffer.push(record);
    }
    info!(
        "generated {games} self-play games, buffer holds {} positions",
        buffer.len()
    );
    Ok(())
}
