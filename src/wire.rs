//! JSON wire format shared with the browser client.
//!
//! Grids travel as nested arrays of `0`/`1`. `pawn_other.position` is the
//! opponent in its own frame, `pawn_other_position` the same pawn in the
//! mover's frame. A board sent with `over: true` is read back from the other
//! side: pawns and budgets swap and every grid turns by 180°.

use serde::{Deserialize, Serialize};

use crate::board::BoardState;
use crate::config::GameConfig;
use crate::error::{QuoridorError, Result};
use crate::walls::{Grid, Orientation, Point, WallGrid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePawn {
    pub position: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOpenVertical {
    pub open_vertical: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOpenHorizontal {
    pub open_horizontal: Vec<Vec<u8>>,
}

/// Slot matrices; `1` means no wall placed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSlots {
    pub vertical: Vec<Vec<u8>>,
    pub horizontal: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireBoard {
    #[serde(rename = "_type")]
    pub kind: String,
    pub pawn_self: WirePawn,
    pub pawn_other: WirePawn,
    #[serde(default)]
    pub pawn_other_position: Option<[usize; 2]>,
    pub wall_vertical: WireOpenVertical,
    pub wall_horizontal: WireOpenHorizontal,
    pub wall: WireSlots,
    #[serde(default)]
    pub takables: Vec<usize>,
    pub walls_self: u32,
    pub walls_other: u32,
    pub turn: u32,
    #[serde(default)]
    pub over: bool,
}

fn bits(grid: &Grid, invert: bool) -> Vec<Vec<u8>> {
    grid.to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|b| u8::from(b != invert)).collect())
        .collect()
}

fn grid(name: &str, rows: &[Vec<u8>], invert: bool) -> Result<Grid> {
    let mut bools = Vec::with_capacity(rows.len());
    for row in rows {
        let mut out = Vec::with_capacity(row.len());
        for &v in row {
            match v {
                0 => out.push(invert),
                1 => out.push(!invert),
                _ => {
                    return Err(QuoridorError::Wire(format!(
                        "{name}: expected 0 or 1, got {v}"
                    )));
                }
            }
        }
        bools.push(out);
    }
    Grid::from_rows(&bools).ok_or_else(|| QuoridorError::Wire(format!("{name}: ragged rows")))
}

fn point([row, col]: [usize; 2]) -> Point {
    (row, col)
}

impl WireBoard {
    /// Encode a position; `over` is left `false`.
    pub fn encode(board: &BoardState) -> Self {
        let walls = board.walls();
        let own = board.own_pawn();
        let other = board.opponent_pawn();
        let other_own_frame = board.mirror(other);
        Self {
            kind: "Board".to_string(),
            pawn_self: WirePawn {
                position: [own.0, own.1],
            },
            pawn_other: WirePawn {
                position: [other_own_frame.0, other_own_frame.1],
            },
            pawn_other_position: Some([other.0, other.1]),
            wall_vertical: WireOpenVertical {
                open_vertical: bits(walls.open_vertical(), false),
            },
            wall_horizontal: WireOpenHorizontal {
                open_horizontal: bits(walls.open_horizontal(), false),
            },
            wall: WireSlots {
                vertical: bits(walls.placed(Orientation::Vertical), true),
                horizontal: bits(walls.placed(Orientation::Horizontal), true),
            },
            takables: board.legal_actions(),
            walls_self: board.walls_self(),
            walls_other: board.walls_other(),
            turn: board.turn(),
            over: false,
        }
    }

    /// Rebuild the position, reading it from the other side when `over`.
    pub fn decode(&self, config: GameConfig) -> Result<BoardState> {
        if self.kind != "Board" {
            return Err(QuoridorError::Wire(format!(
                "expected _type \"Board\", got {:?}",
                self.kind
            )));
        }
        let n = config.size();
        let walls = WallGrid::from_parts(
            n,
            grid("open_vertical", &self.wall_vertical.open_vertical, false)?,
            grid("open_horizontal", &self.wall_horizontal.open_horizontal, false)?,
            grid("wall.vertical", &self.wall.vertical, true)?,
            grid("wall.horizontal", &self.wall.horizontal, true)?,
        )
        .ok_or_else(|| QuoridorError::Wire(format!("grid shapes do not fit a {n}x{n} board")))?;

        let own = point(self.pawn_self.position);
        let other = point(self.pawn_other.position);
        if own.0 >= n || own.1 >= n || other.0 >= n || other.1 >= n {
            return Err(QuoridorError::Wire(format!(
                "pawn off a {n}x{n} board: {own:?} / {other:?}"
            )));
        }
        let mirror = |(r, c): Point| (n - 1 - r, n - 1 - c);

        let (own, opponent, walls, walls_self, walls_other) = if self.over {
            (other, mirror(own), walls.rotated(), self.walls_other, self.walls_self)
        } else {
            (own, mirror(other), walls, self.walls_self, self.walls_other)
        };
        BoardState::from_parts(config, own, opponent, walls, walls_self, walls_other, self.turn)
            .map_err(|e| QuoridorError::Wire(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
