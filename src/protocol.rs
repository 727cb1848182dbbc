//! Newline-delimited JSON protocol for playing against the engine.
//!
//! Every request line is answered with exactly one response line.
//!
//! ## Requests
//!
//! - `{"network_first": true}` starts a new game; the engine opens if
//!   `network_first` is set.
//! - `{"network_first": false, "board": {...}, "take_action": 12}` applies
//!   the human's action to `board`, then lets the engine reply.
//!
//! ## Responses
//!
//! The board fields of [`WireBoard`] plus `point` (`1` human won, `0` engine
//! won, `0.5` draw, `null` while running) and `network_first`. A request
//! that cannot be served yields `{"error": "..."}` and the loop carries on.
//!
//! ## Example
//!
//! ```ignore
//! use quoridor_zero::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new(config, Box::new(agent));
//! engine.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::config::GameConfig;
use crate::error::{QuoridorError, Result};
use crate::game::Agent;
use crate::wire::WireBoard;

#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolRequest {
    pub network_first: bool,
    #[serde(default)]
    pub board: Option<WireBoard>,
    #[serde(default)]
    pub take_action: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtocolResponse {
    #[serde(flatten)]
    pub board: WireBoard,
    pub point: Option<f32>,
    pub network_first: bool,
}

/// Protocol state: the board rules and the engine's player.
pub struct ProtocolEngine {
    config: GameConfig,
    engine: Box<dyn Agent>,
}

impl ProtocolEngine {
    pub fn new(config: GameConfig, engine: Box<dyn Agent>) -> Self {
        Self { config, engine }
    }

    /// Serve requests until `input` is exhausted.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.handle_line(line);
            writeln!(output, "{reply}")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Answer one request line with one response line.
    pub fn handle_line(&mut self, line: &str) -> String {
        let result = serde_json::from_str::<ProtocolRequest>(line)
            .map_err(QuoridorError::from)
            .and_then(|request| self.handle(&request))
            .and_then(|response| Ok(serde_json::to_string(&response)?));
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("rejected request: {e}");
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        }
    }

    /// Serve a parsed request.
    pub fn handle(&mut self, request: &ProtocolRequest) -> Result<ProtocolResponse> {
        let network_first = request.network_first;
        let Some(wire) = &request.board else {
            debug!("new game, engine first: {network_first}");
            let mut board = BoardState::new(self.config);
            if network_first {
                let action = self.engine.select_action(&board)?;
                board = board.next(action)?;
            }
            return Ok(respond(board, false, None, network_first));
        };

        let board = wire.decode(self.config)?;
        if board.is_over() {
            return Err(QuoridorError::State(format!(
                "game already over at turn {}",
                board.turn()
            )));
        }
        let action = request
            .take_action
            .ok_or_else(|| QuoridorError::Wire("take_action missing".to_string()))?;
        if !board.is_legal(action) {
            return Err(QuoridorError::InvalidAction { action });
        }

        let after_human = board.next(action)?;
        if after_human.is_over() {
            // Shown from the human's side, as the client expects
            let point = if after_human.is_loss() { 1.0 } else { 0.5 };
            info!("game over at turn {}: human point {point}", after_human.turn());
            let mut swapped = WireBoard::encode(&after_human);
            swapped.over = true;
            let board = swapped.decode(self.config)?;
            return Ok(respond(board, true, Some(point), network_first));
        }

        let reply = self.engine.select_action(&after_human)?;
        debug!("human played {action}, engine replies {reply}");
        let after_engine = after_human.next(reply)?;
        if after_engine.is_over() {
            let point = if after_engine.is_loss() { 0.0 } else { 0.5 };
            info!("game over at turn {}: human point {point}", after_engine.turn());
            return Ok(respond(after_engine, true, Some(point), network_first));
        }
        Ok(respond(after_engine, false, None, network_first))
    }
}

fn respond(board: BoardState, over: bool, point: Option<f32>, network_first: bool) -> ProtocolResponse {
    let mut wire = WireBoard::encode(&board);
    wire.over = over;
    ProtocolResponse {
        board: wire,
        point,
        network_first,
    }
}
