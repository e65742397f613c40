//! Occupancy grid with copy-on-write rows
//!
//! Every row lives behind an `Arc`. Cloning a grid copies `height` pointers;
//! writing a cell calls `Arc::make_mut` on its row, so a search branch only
//! duplicates the rows it actually touches and never aliases another
//! branch's mutable state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::player::PlayerId;
use crate::position::Position;

/// Value of an unoccupied cell
pub const FREE: u8 = 0;

/// Fixed-size occupancy map: each cell is free or owned by a player id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<u8>>", try_from = "Vec<Vec<u8>>")]
pub struct Cells {
    width: usize,
    height: usize,
    rows: Vec<Arc<Vec<u8>>>,
}

impl Cells {
    /// Empty grid. All rows initially share one allocation.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![Arc::new(vec![FREE; width]); height],
        }
    }

    /// Build from the dense row-major form (`0` = free, `k` = player `k`)
    pub fn from_dense(rows: &[Vec<u8>]) -> Result<Self, GameError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GameError::illegal("grid must have at least one cell"));
        }
        if let Some(y) = rows.iter().position(|r| r.len() != width) {
            return Err(GameError::illegal(format!(
                "row {} has {} cells, expected {}",
                y,
                rows[y].len(),
                width
            )));
        }
        Ok(Self {
            width,
            height,
            rows: rows.iter().map(|r| Arc::new(r.clone())).collect(),
        })
    }

    /// Dense row-major copy of the grid
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        self.rows.iter().map(|r| r.as_ref().clone()).collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Is the position inside the grid?
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Cell value, `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<u8> {
        if self.contains(pos) {
            Some(self.rows[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Free and inside the grid
    pub fn is_free(&self, pos: Position) -> bool {
        self.get(pos) == Some(FREE)
    }

    /// Mark a cell as owned by `owner`.
    ///
    /// Only the transition function writes the real game grid; this is also
    /// used to build hypothetical boards for lookahead.
    pub fn occupy(&mut self, pos: Position, owner: PlayerId) -> Result<(), GameError> {
        if owner == FREE {
            return Err(GameError::illegal("cannot occupy a cell with the free marker"));
        }
        if !self.contains(pos) {
            return Err(GameError::illegal(format!(
                "position ({}, {}) is outside the {}x{} grid",
                pos.x, pos.y, self.width, self.height
            )));
        }
        self.set(pos, owner);
        Ok(())
    }

    /// Unchecked write for callers that already validated `pos`
    pub(crate) fn set(&mut self, pos: Position, owner: PlayerId) {
        Arc::make_mut(&mut self.rows[pos.y as usize])[pos.x as usize] = owner;
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.iter().filter(|&&c| c != FREE).count())
            .sum()
    }

    /// All positions, row by row
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x as i32, y as i32)))
    }

    /// Whether row `y` is physically shared with `other` (no copy happened yet)
    pub fn shares_row(&self, other: &Cells, y: usize) -> bool {
        match (self.rows.get(y), other.rows.get(y)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Cells> for Vec<Vec<u8>> {
    fn from(cells: Cells) -> Self {
        cells.to_dense()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Cells {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Cells::from_dense(&rows)
    }
}
