//! Wall bookkeeping: passage openness and occupied wall slots.
//!
//! A board of side `N` has two openness matrices:
//!
//! - `open_vertical` (`N x N-1`): entry `(r, c)` is the passage between
//!   cells `(r, c)` and `(r, c+1)`.
//! - `open_horizontal` (`N-1 x N`): entry `(r, c)` is the passage between
//!   cells `(r, c)` and `(r+1, c)`.
//!
//! A wall occupies one of the `(N-1) x (N-1)` slots at a grid intersection
//! and closes two openness entries. The slot matrices record placements
//! separately, since a vertical and a horizontal wall crossing at the same
//! intersection never close a common passage but still cannot coexist.

use std::fmt;
use std::ops::Deref;

use crate::union_find::UnionFind;

/// A cell on the board as `(row, col)`.
pub type Point = (usize, usize);

/// Dense row-major boolean matrix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn filled(rows: usize, cols: usize, value: bool) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    /// Build from nested rows. Returns `None` when the rows are ragged.
    pub fn from_rows(rows: &[Vec<bool>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.cells[row * self.cols + col] = value;
    }

    /// The matrix turned by 180 degrees.
    pub fn rotated(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().rev().copied().collect(),
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.cells.chunks(self.cols.max(1)).map(<[bool]>::to_vec).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.cells.iter().copied()
    }
}

/// Orientation of a wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    #[inline]
    pub fn crossing(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }
}

/// Openness and slot matrices of one board, seen from one player's frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WallGrid {
    size: usize,
    open_vertical: Grid,
    open_horizontal: Grid,
    placed_vertical: Grid,
    placed_horizontal: Grid,
}

impl WallGrid {
    /// An empty board: every passage open, no wall placed.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            open_vertical: Grid::filled(size, size - 1, true),
            open_horizontal: Grid::filled(size - 1, size, true),
            placed_vertical: Grid::filled(size - 1, size - 1, false),
            placed_horizontal: Grid::filled(size - 1, size - 1, false),
        }
    }

    /// Assemble from explicit matrices, checking their shapes.
    pub fn from_parts(
        size: usize,
        open_vertical: Grid,
        open_horizontal: Grid,
        placed_vertical: Grid,
        placed_horizontal: Grid,
    ) -> Option<Self> {
        let shapes = [
            (&open_vertical, size, size - 1),
            (&open_horizontal, size - 1, size),
            (&placed_vertical, size - 1, size - 1),
            (&placed_horizontal, size - 1, size - 1),
        ];
        if shapes
            .iter()
            .any(|(g, rows, cols)| g.rows() != *rows || g.cols() != *cols)
        {
            return None;
        }
        Some(Self {
            size,
            open_vertical,
            open_horizontal,
            placed_vertical,
            placed_horizontal,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn open_vertical(&self) -> &Grid {
        &self.open_vertical
    }

    pub fn open_horizontal(&self) -> &Grid {
        &self.open_horizontal
    }

    pub fn placed(&self, orientation: Orientation) -> &Grid {
        match orientation {
            Orientation::Vertical => &self.placed_vertical,
            Orientation::Horizontal => &self.placed_horizontal,
        }
    }

    /// Whether the passage between two orthogonally adjacent cells is open.
    pub fn is_open(&self, from: Point, to: Point) -> bool {
        let (r0, c0) = from;
        let (r1, c1) = to;
        if r0 == r1 && c0.abs_diff(c1) == 1 {
            self.open_vertical.get(r0, c0.min(c1))
        } else if c0 == c1 && r0.abs_diff(r1) == 1 {
            self.open_horizontal.get(r0.min(r1), c0)
        } else {
            false
        }
    }

    /// Openness entries closed by a wall in the given slot.
    fn passages(orientation: Orientation, row: usize, col: usize) -> [(usize, usize); 2] {
        match orientation {
            Orientation::Vertical => [(row, col), (row + 1, col)],
            Orientation::Horizontal => [(row, col), (row, col + 1)],
        }
    }

    fn openness_mut(&mut self, orientation: Orientation) -> &mut Grid {
        match orientation {
            Orientation::Vertical => &mut self.open_vertical,
            Orientation::Horizontal => &mut self.open_horizontal,
        }
    }

    fn openness(&self, orientation: Orientation) -> &Grid {
        match orientation {
            Orientation::Vertical => &self.open_vertical,
            Orientation::Horizontal => &self.open_horizontal,
        }
    }

    fn placed_mut(&mut self, orientation: Orientation) -> &mut Grid {
        match orientation {
            Orientation::Vertical => &mut self.placed_vertical,
            Orientation::Horizontal => &mut self.placed_horizontal,
        }
    }

    /// A wall fits in the slot if both of its passages are still open and no
    /// crossing wall sits on the same intersection.
    pub fn can_place(&self, orientation: Orientation, row: usize, col: usize) -> bool {
        let open = self.openness(orientation);
        Self::passages(orientation, row, col)
            .iter()
            .all(|&(r, c)| open.get(r, c))
            && !self.placed(orientation.crossing()).get(row, col)
    }

    /// Close the slot's passages and mark it occupied. No legality check.
    pub fn place(&mut self, orientation: Orientation, row: usize, col: usize) {
        for (r, c) in Self::passages(orientation, row, col) {
            self.openness_mut(orientation).set(r, c, false);
        }
        self.placed_mut(orientation).set(row, col, true);
    }

    /// Undo [`place`](Self::place) for a slot that was free beforehand.
    fn remove(&mut self, orientation: Orientation, row: usize, col: usize) {
        for (r, c) in Self::passages(orientation, row, col) {
            self.openness_mut(orientation).set(r, c, true);
        }
        self.placed_mut(orientation).set(row, col, false);
    }

    /// The same walls seen from the other side of the board.
    pub fn rotated(&self) -> Self {
        Self {
            size: self.size,
            open_vertical: self.open_vertical.rotated(),
            open_horizontal: self.open_horizontal.rotated(),
            placed_vertical: self.placed_vertical.rotated(),
            placed_horizontal: self.placed_horizontal.rotated(),
        }
    }

    /// Cell index used by the connectivity forest.
    #[inline]
    pub fn cell_index(&self, (row, col): Point) -> usize {
        row * self.size + col
    }

    /// Disjoint sets of cells joined by open passages.
    pub fn connectivity(&self) -> UnionFind {
        let n = self.size;
        let mut uf = UnionFind::new(n * n);
        for r in 0..n {
            for c in 0..n {
                let idx = r * n + c;
                if c + 1 < n && self.open_vertical.get(r, c) {
                    uf.union(idx, idx + 1);
                }
                if r + 1 < n && self.open_horizontal.get(r, c) {
                    uf.union(idx, idx + n);
                }
            }
        }
        uf
    }

    /// Whether `from` is connected to any cell of `goal_row`.
    pub fn reaches_row(&self, uf: &mut UnionFind, from: Point, goal_row: usize) -> bool {
        let start = self.cell_index(from);
        (0..self.size).any(|c| uf.connected(start, self.cell_index((goal_row, c))))
    }
}

/// A wall placed for the lifetime of the guard and removed on drop.
///
/// Used to test a candidate slot without any path leaking the mutation:
/// the wall comes off again whether the probe returns, bails out early or
/// unwinds.
pub struct TentativeWall<'a> {
    walls: &'a mut WallGrid,
    orientation: Orientation,
    row: usize,
    col: usize,
}

impl<'a> TentativeWall<'a> {
    /// Place a wall in a slot accepted by [`WallGrid::can_place`].
    pub fn place(walls: &'a mut WallGrid, orientation: Orientation, row: usize, col: usize) -> Self {
        debug_assert!(walls.can_place(orientation, row, col));
        walls.place(orientation, row, col);
        Self {
            walls,
            orientation,
            row,
            col,
        }
    }
}

impl Deref for TentativeWall<'_> {
    type Target = WallGrid;

    fn deref(&self) -> &WallGrid {
        self.walls
    }
}

impl Drop for TentativeWall<'_> {
    fn drop(&mut self) {
        self.walls.remove(self.orientation, self.row, self.col);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
