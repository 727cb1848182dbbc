//! Quoridor position representation and move execution.
//!
//! A [`BoardState`] is always expressed from the perspective of the player
//! about to move ("self"): self walks towards row `N-1`, the opponent
//! towards row `0`, and both pawns and walls are stored in self's frame.
//! After every action the board is turned around ([`BoardState::flip`]) so
//! the new mover is self again. Move generation, wall validation and scoring
//! therefore never need to know which seat is to play.

use std::fmt;

use crate::config::GameConfig;
use crate::constants::{DIRECTIONS, JUMP_OFFSET, PAWN_ACTIONS};
use crate::error::{QuoridorError, Result};
use crate::walls::{Orientation, Point, TentativeWall, WallGrid};

/// Decoded form of an action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Plain step in direction `0..4` (forward, left, backward, right).
    Step(usize),
    /// Land next to the opponent, offset from it in direction `0..4`.
    Jump(usize),
    /// Wall in slot `(row, col)`.
    Wall(Orientation, usize, usize),
}

impl Action {
    /// Decode an index of the action space of a board of side `size`.
    pub fn decode(index: usize, size: usize) -> Option<Self> {
        let side = size - 1;
        let slots = side * side;
        match index {
            i if i < JUMP_OFFSET => Some(Action::Step(i)),
            i if i < PAWN_ACTIONS => Some(Action::Jump(i - JUMP_OFFSET)),
            i if i < PAWN_ACTIONS + slots => {
                let slot = i - PAWN_ACTIONS;
                Some(Action::Wall(Orientation::Vertical, slot / side, slot % side))
            }
            i if i < PAWN_ACTIONS + 2 * slots => {
                let slot = i - PAWN_ACTIONS - slots;
                Some(Action::Wall(Orientation::Horizontal, slot / side, slot % side))
            }
            _ => None,
        }
    }

    /// Flat index of this action on a board of side `size`.
    pub fn index(self, size: usize) -> usize {
        let side = size - 1;
        match self {
            Action::Step(d) => d,
            Action::Jump(d) => JUMP_OFFSET + d,
            Action::Wall(Orientation::Vertical, r, c) => PAWN_ACTIONS + r * side + c,
            Action::Wall(Orientation::Horizontal, r, c) => {
                PAWN_ACTIONS + side * side + r * side + c
            }
        }
    }
}

/// Index of the direction opposite to `dir`.
#[inline]
fn reverse(dir: usize) -> usize {
    (dir + 2) % 4
}

/// A game position from the point of view of the player to move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    config: GameConfig,
    /// Self pawn, self's frame
    own: Point,
    /// Opponent pawn, mirrored into self's frame
    opponent: Point,
    walls: WallGrid,
    walls_self: u32,
    walls_other: u32,
    /// Ply number, starting at 1; odd means the first seat is to move
    turn: u32,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl BoardState {
    /// Initial position: both pawns on the middle column of their home row.
    pub fn new(config: GameConfig) -> Self {
        let n = config.size();
        let mid = n / 2;
        Self {
            config,
            own: (0, mid),
            opponent: (n - 1, n - 1 - mid),
            walls: WallGrid::new(n),
            walls_self: config.walls(),
            walls_other: config.walls(),
            turn: 1,
        }
    }

    /// Assemble a position from its parts, all in self's frame.
    pub fn from_parts(
        config: GameConfig,
        own: Point,
        opponent: Point,
        walls: WallGrid,
        walls_self: u32,
        walls_other: u32,
        turn: u32,
    ) -> Result<Self> {
        let n = config.size();
        if walls.size() != n {
            return Err(QuoridorError::State(format!(
                "wall grid is {}x{}, board is {n}x{n}",
                walls.size(),
                walls.size()
            )));
        }
        if own.0 >= n || own.1 >= n || opponent.0 >= n || opponent.1 >= n {
            return Err(QuoridorError::State(format!(
                "pawn off the board: {own:?} / {opponent:?}"
            )));
        }
        if own == opponent {
            return Err(QuoridorError::State(format!(
                "both pawns on {own:?}"
            )));
        }
        if turn == 0 {
            return Err(QuoridorError::State("turn numbers start at 1".to_string()));
        }
        Ok(Self {
            config,
            own,
            opponent,
            walls,
            walls_self,
            walls_other,
            turn,
        })
    }

    /// Same position with the pawns moved, keeping everything else.
    pub fn with_pawns(self, own: Point, opponent: Point) -> Result<Self> {
        let Self {
            config,
            walls,
            walls_self,
            walls_other,
            turn,
            ..
        } = self;
        Self::from_parts(config, own, opponent, walls, walls_self, walls_other, turn)
    }

    /// Same position at another ply number.
    pub fn with_turn(self, turn: u32) -> Result<Self> {
        let Self {
            config,
            own,
            opponent,
            walls,
            walls_self,
            walls_other,
            ..
        } = self;
        Self::from_parts(config, own, opponent, walls, walls_self, walls_other, turn)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.config.size()
    }

    #[inline]
    pub fn own_pawn(&self) -> Point {
        self.own
    }

    #[inline]
    pub fn opponent_pawn(&self) -> Point {
        self.opponent
    }

    #[inline]
    pub fn walls(&self) -> &WallGrid {
        &self.walls
    }

    #[inline]
    pub fn walls_self(&self) -> u32 {
        self.walls_self
    }

    #[inline]
    pub fn walls_other(&self) -> u32 {
        self.walls_other
    }

    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Mirror a point between the two players' frames.
    #[inline]
    pub fn mirror(&self, (row, col): Point) -> Point {
        let n = self.size();
        (n - 1 - row, n - 1 - col)
    }

    // -------------------------------------------------------------------------
    // Game status
    // -------------------------------------------------------------------------

    /// True when the opponent has reached its goal row: the side to move lost.
    #[inline]
    pub fn is_loss(&self) -> bool {
        self.opponent.0 == 0
    }

    #[inline]
    pub fn is_draw(&self) -> bool {
        self.turn >= self.config.max_turns()
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.is_loss() || self.is_draw()
    }

    /// Whether the player to move is the one who opened the game.
    #[inline]
    pub fn is_first_to_move(&self) -> bool {
        self.turn % 2 == 1
    }

    // -------------------------------------------------------------------------
    // Move generation
    // -------------------------------------------------------------------------

    /// Neighbour of `from` in direction `dir`, if it is on the board.
    fn step_from(&self, (row, col): Point, dir: usize) -> Option<Point> {
        let (dr, dc) = DIRECTIONS[dir];
        let n = self.size() as isize;
        let r = row as isize + dr;
        let c = col as isize + dc;
        if r < 0 || r >= n || c < 0 || c >= n {
            return None;
        }
        Some((r as usize, c as usize))
    }

    /// Neighbour of `from` in direction `dir` when the passage is open.
    fn passable(&self, from: Point, dir: usize) -> Option<Point> {
        self.step_from(from, dir)
            .filter(|&to| self.walls.is_open(from, to))
    }

    /// Legality bits of the eight pawn actions.
    pub fn pawn_mask(&self) -> [bool; PAWN_ACTIONS] {
        let mut mask = [false; PAWN_ACTIONS];
        for dir in 0..4 {
            let Some(next) = self.passable(self.own, dir) else {
                continue;
            };
            if next != self.opponent {
                mask[dir] = true;
                continue;
            }
            // Opponent in the way: jump straight over it, or sideways if the
            // cell behind it is walled off or off the board.
            if self.passable(next, dir).is_some() {
                mask[JUMP_OFFSET + dir] = true;
                continue;
            }
            for side in 0..4 {
                if side == dir || side == reverse(dir) {
                    continue;
                }
                if self.passable(next, side).is_some() {
                    mask[JUMP_OFFSET + side] = true;
                }
            }
        }
        mask
    }

    /// Whether both pawns can still reach their goal rows with these walls.
    fn both_reach_goal(&self, walls: &WallGrid) -> bool {
        let mut uf = walls.connectivity();
        let n = self.size();
        walls.reaches_row(&mut uf, self.own, n - 1) && walls.reaches_row(&mut uf, self.opponent, 0)
    }

    /// Probe one slot on a scratch copy of the walls.
    fn probe_wall(&self, scratch: &mut WallGrid, orientation: Orientation, row: usize, col: usize) -> bool {
        if !scratch.can_place(orientation, row, col) {
            return false;
        }
        let tentative = TentativeWall::place(scratch, orientation, row, col);
        self.both_reach_goal(&tentative)
    }

    /// Legality bits of all wall slots, vertical slots first.
    pub fn wall_mask(&self) -> Vec<bool> {
        let side = self.size() - 1;
        let mut mask = vec![false; 2 * side * side];
        if self.walls_self == 0 {
            return mask;
        }
        let mut scratch = self.walls.clone();
        for (block, orientation) in [Orientation::Vertical, Orientation::Horizontal]
            .into_iter()
            .enumerate()
        {
            for row in 0..side {
                for col in 0..side {
                    mask[block * side * side + row * side + col] =
                        self.probe_wall(&mut scratch, orientation, row, col);
                }
            }
        }
        debug_assert_eq!(scratch, self.walls);
        mask
    }

    /// Legal action indices: pawn actions first, then walls, ascending.
    ///
    /// The order is the canonical index-to-child mapping used by the search.
    pub fn legal_actions(&self) -> Vec<usize> {
        self.pawn_mask()
            .into_iter()
            .chain(self.wall_mask())
            .enumerate()
            .filter_map(|(i, legal)| legal.then_some(i))
            .collect()
    }

    /// Check a single action without enumerating the others.
    pub fn is_legal(&self, action: usize) -> bool {
        match Action::decode(action, self.size()) {
            Some(Action::Step(_)) | Some(Action::Jump(_)) => self.pawn_mask()[action],
            Some(Action::Wall(orientation, row, col)) => {
                self.walls_self > 0
                    && self.probe_wall(&mut self.walls.clone(), orientation, row, col)
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Move the own pawn. Fails unless `action` is a legal step or jump.
    pub fn apply_move(&mut self, action: usize) -> Result<()> {
        let target = match Action::decode(action, self.size()) {
            Some(Action::Step(dir)) if self.pawn_mask()[action] => self.step_from(self.own, dir),
            Some(Action::Jump(dir)) if self.pawn_mask()[action] => {
                self.step_from(self.opponent, dir)
            }
            _ => None,
        };
        self.own = target.ok_or(QuoridorError::InvalidAction { action })?;
        Ok(())
    }

    /// Place a wall. Fails unless `action` is a legal wall placement.
    pub fn apply_wall(&mut self, action: usize) -> Result<()> {
        match Action::decode(action, self.size()) {
            Some(Action::Wall(orientation, row, col)) if self.is_legal(action) => {
                self.walls.place(orientation, row, col);
                self.walls_self -= 1;
                Ok(())
            }
            _ => Err(QuoridorError::InvalidAction { action }),
        }
    }

    /// Apply either kind of action in place, without flipping.
    pub fn apply(&mut self, action: usize) -> Result<()> {
        if action < PAWN_ACTIONS {
            self.apply_move(action)
        } else {
            self.apply_wall(action)
        }
    }

    /// The same position seen by the other player, one ply later.
    pub fn flip(&self) -> Self {
        Self {
            config: self.config,
            own: self.mirror(self.opponent),
            opponent: self.mirror(self.own),
            walls: self.walls.rotated(),
            walls_self: self.walls_other,
            walls_other: self.walls_self,
            turn: self.turn + 1,
        }
    }

    /// Successor position after `action`, from the new mover's perspective.
    pub fn next(&self, action: usize) -> Result<Self> {
        let mut working = self.clone();
        working.apply(action)?;
        Ok(working.flip())
    }

    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------

    /// Canonical string used to detect repeated positions within a search.
    ///
    /// Covers pawns, budgets and walls; the turn number is left out so that
    /// the same position reached at different plies collides.
    pub fn key(&self) -> String {
        format!(
            "{},{}|{},{}|{},{}|{}|{}|{}|{}",
            self.own.0,
            self.own.1,
            self.opponent.0,
            self.opponent.1,
            self.walls_self,
            self.walls_other,
            self.walls.open_vertical(),
            self.walls.open_horizontal(),
            self.walls.placed(Orientation::Vertical),
            self.walls.placed(Orientation::Horizontal),
        )
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        let (own_label, other_label) = if self.is_first_to_move() {
            ('1', '2')
        } else {
            ('2', '1')
        };
        for r in 0..n {
            for c in 0..n {
                let ch = if (r, c) == self.own {
                    own_label
                } else if (r, c) == self.opponent {
                    other_label
                } else {
                    ' '
                };
                write!(f, " {ch} ")?;
                if c + 1 < n {
                    let sep = if self.walls.open_vertical().get(r, c) { ' ' } else { '|' };
                    write!(f, "{sep}")?;
                }
            }
            writeln!(f)?;
            if r + 1 == n {
                continue;
            }
            for c in 0..n {
                let seg = if self.walls.open_horizontal().get(r, c) { "   " } else { "---" };
                write!(f, "{seg}")?;
                if c + 1 < n {
                    write!(f, "*")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board5() -> BoardState {
        BoardState::new(GameConfig::default())
    }

    #[test]
    fn test_initial_position() {
        let board = board5();
        assert_eq!(board.own_pawn(), (0, 2));
        assert_eq!(board.opponent_pawn(), (4, 2));
        assert!(board.is_first_to_move());
        assert!(!board.is_over());
    }

    #[test]
    fn test_action_decode_roundtrip_bounds() {
        let n = 5;
        assert_eq!(Action::decode(0, n), Some(Action::Step(0)));
        assert_eq!(Action::decode(7, n), Some(Action::Jump(3)));
        assert_eq!(
            Action::decode(8, n),
            Some(Action::Wall(Orientation::Vertical, 0, 0))
        );
        assert_eq!(
            Action::decode(8 + 16, n),
            Some(Action::Wall(Orientation::Horizontal, 0, 0))
        );
        assert_eq!(
            Action::decode(8 + 31, n),
            Some(Action::Wall(Orientation::Horizontal, 3, 3))
        );
        assert_eq!(Action::decode(40, n), None);
        assert_eq!(Action::Wall(Orientation::Horizontal, 2, 1).index(n), 8 + 16 + 9);
    }

    #[test]
    fn test_forward_step_moves_pawn() {
        let mut board = board5();
        board.apply_move(0).unwrap();
        assert_eq!(board.own_pawn(), (1, 2));
    }

    #[test]
    fn test_backward_from_home_row_is_illegal() {
        let board = board5();
        assert!(!board.is_legal(2));
        assert!(matches!(
            board.next(2),
            Err(QuoridorError::InvalidAction { action: 2 })
        ));
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let mut board = board5();
        assert!(board.apply_move(8).is_err());
        assert!(board.apply_wall(0).is_err());
        assert!(board.apply(1000).is_err());
    }

    #[test]
    fn test_no_walls_without_budget() {
        let board = BoardState::new(GameConfig::new(5, 0, 50).unwrap());
        assert!(board.wall_mask().iter().all(|&legal| !legal));
        assert_eq!(board.legal_actions(), vec![0, 1, 3]);
    }

    #[test]
    fn test_flip_swaps_budgets_and_turn() {
        let mut board = board5();
        board.apply_wall(8).unwrap();
        let flipped = board.flip();
        assert_eq!(flipped.walls_self(), 4);
        assert_eq!(flipped.walls_other(), 3);
        assert_eq!(flipped.turn(), 2);
        assert!(!flipped.is_first_to_move());
    }

    #[test]
    fn test_key_ignores_turn() {
        let board = board5();
        let later = board.clone().with_turn(5).unwrap();
        assert_eq!(board.key(), later.key());
        let moved = board.clone().with_pawns((1, 2), (4, 2)).unwrap();
        assert_ne!(board.key(), moved.key());
    }

    #[test]
    fn test_display_shows_both_pawns() {
        let text = board5().to_string();
        assert!(text.contains(" 1 "));
        assert!(text.contains(" 2 "));
        assert_eq!(text.lines().count(), 9);
    }
}
