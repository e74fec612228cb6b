//! Board model.
//!
//! An N×N grid of cells, each empty or holding a player snapshot, plus the
//! pure distance helpers every rule in the engine is written against.

use serde::{Deserialize, Serialize};

use crate::game::error::GameError;
use crate::game::types::{Cell, Occupant, PlayerId, PlayerSnapshot, Position};

/// Chebyshev distance: diagonal steps count as one.
pub fn chebyshev(a: Position, b: Position) -> usize {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

/// True when `a` and `b` are distinct and touch, diagonals included.
pub fn is_adjacent(a: Position, b: Position) -> bool {
    chebyshev(a, b) == 1
}

/// Square grid stored row-major: `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    /// Generate an empty board.
    pub fn new(size: usize) -> Self {
        let cells = (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| Cell {
                        x,
                        y,
                        occupant: Occupant::Empty,
                    })
                    .collect()
            })
            .collect();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Convert raw request coordinates into a position on this board.
    pub fn position(&self, x: i64, y: i64) -> Result<Position, GameError> {
        let out_of_bounds = || GameError::OutOfBounds { x, y };
        let px = usize::try_from(x).map_err(|_| out_of_bounds())?;
        let py = usize::try_from(y).map_err(|_| out_of_bounds())?;
        let pos = Position::new(px, py);
        if self.in_bounds(pos) {
            Ok(pos)
        } else {
            Err(out_of_bounds())
        }
    }

    pub fn is_interior(&self, pos: Position) -> bool {
        pos.x > 0 && pos.y > 0 && pos.x + 1 < self.size && pos.y + 1 < self.size
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x))
    }

    pub fn occupant(&self, pos: Position) -> Option<&Occupant> {
        self.cell(pos).map(|cell| &cell.occupant)
    }

    pub(crate) fn set_occupant(&mut self, pos: Position, occupant: Occupant) {
        if let Some(cell) = self.cells.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            cell.occupant = occupant;
        }
    }

    /// All cells except the outermost ring, row by row.
    pub fn interior_positions(&self) -> Vec<Position> {
        if self.size < 3 {
            return Vec::new();
        }
        (1..self.size - 1)
            .flat_map(|y| (1..self.size - 1).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Locate a player by scanning the board.
    pub fn find_player(&self, player_id: PlayerId) -> Option<(Position, &PlayerSnapshot)> {
        self.occupied()
            .find(|(_, snapshot)| snapshot.player_id == player_id)
    }

    /// Every occupied cell with its snapshot.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, &PlayerSnapshot)> {
        self.cells.iter().flatten().filter_map(|cell| {
            cell.occupant
                .player()
                .map(|snapshot| (Position::new(cell.x, cell.y), snapshot))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }
}
