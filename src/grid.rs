/*!
This module implements the occupancy grid: placement validation, settlement
commits, full-row detection, and row clearing with bottom-up compaction.
*/

use crate::{BlockId, Cell};

/// The playing grid, mapping each in-bounds cell to either empty or the
/// [`BlockId`] occupying it.
///
/// The grid is the single source of truth for collision and row-fullness.
/// It owns every id stored in it: ids leave the grid only through
/// [`Grid::clear_rows`] and [`Grid::reset`], which return them to the caller
/// for release back to the external pool.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: i32,
    height: i32,
    /// Column-major storage; `columns[x][y]`.
    columns: Vec<Vec<Option<BlockId>>>,
}

impl Grid {
    /// Creates an empty grid of the given dimensions.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not positive; a degenerate grid cannot
    /// host a simulation and this is a wiring error, not a runtime state.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            columns: vec![vec![None; height as usize]; width as usize],
        }
    }

    /// The number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// The number of in-bounds rows; rows at or above this form the spawn
    /// buffer.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The id occupying `cell`, or `None` if the cell is empty or out of
    /// bounds.
    pub fn block_at(&self, (x, y): Cell) -> Option<BlockId> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        self.columns[x as usize][y as usize]
    }

    /// Whether an in-bounds cell currently holds a block.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.block_at(cell).is_some()
    }

    /// Checks whether every given cell may be occupied by a moving piece.
    ///
    /// Cells beyond the top of the grid are always valid (the spawn buffer
    /// is never occupied); cells outside the side walls or below the floor
    /// never are. Pure query, no mutation.
    pub fn is_valid_placement(&self, cells: &[Cell]) -> bool {
        cells.iter().all(|&(x, y)| {
            x >= 0 && x < self.width && y >= 0 && (y >= self.height || self.columns[x as usize][y as usize].is_none())
        })
    }

    /// Marks the given cells occupied by the given ids.
    ///
    /// Cells at or above the top row are clamped into the top row so that an
    /// over-height settlement still registers for game-over detection;
    /// callers are expected to settle pieces fully in-bounds in practice.
    /// A clamped cell whose target is already occupied is skipped rather
    /// than overwritten. Returns the placements actually committed, so the
    /// caller can release the ids of any skipped ones.
    pub fn commit(&mut self, placements: &[(Cell, BlockId)]) -> Vec<(Cell, BlockId)> {
        let mut committed = Vec::with_capacity(placements.len());
        for &((x, y), id) in placements {
            if x < 0 || x >= self.width || y < 0 {
                continue;
            }
            let y = y.min(self.height - 1);
            let slot = &mut self.columns[x as usize][y as usize];
            if slot.is_none() {
                *slot = Some(id);
                committed.push(((x, y), id));
            }
        }
        committed
    }

    /// The ascending row indices where every column is occupied.
    pub fn full_rows(&self) -> Vec<i32> {
        (0..self.height)
            .filter(|&y| self.columns.iter().all(|col| col[y as usize].is_some()))
            .collect()
    }

    /// Removes the given rows and compacts every column downward.
    ///
    /// Out-of-range and duplicate row indices are ignored. Each column is
    /// rebuilt bottom-to-top: surviving rows are written into the next free
    /// slot in order, which preserves their relative order and leaves no
    /// gaps below them. The previous grid is replaced wholesale, so no
    /// partially-cleared state is ever observable. Returns the removed ids
    /// for release back to the pool; empty if no valid rows were given.
    pub fn clear_rows(&mut self, rows: &[i32]) -> Vec<BlockId> {
        let mut drop_row = vec![false; self.height as usize];
        for &y in rows {
            if y >= 0 && y < self.height {
                drop_row[y as usize] = true;
            }
        }
        if !drop_row.iter().any(|&d| d) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        let mut rebuilt = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut fresh = vec![None; self.height as usize];
            let mut write = 0;
            for (y, &slot) in column.iter().enumerate() {
                if drop_row[y] {
                    removed.extend(slot);
                } else if slot.is_some() {
                    fresh[write] = slot;
                    write += 1;
                } else {
                    write += 1;
                }
            }
            rebuilt.push(fresh);
        }
        self.columns = rebuilt;
        removed
    }

    /// Whether any column holds a block in the topmost in-bounds row.
    pub fn is_game_over(&self) -> bool {
        let top = (self.height - 1) as usize;
        self.columns.iter().any(|col| col[top].is_some())
    }

    /// Empties the grid, returning every previously-held id for release.
    pub fn reset(&mut self) -> Vec<BlockId> {
        let mut released = Vec::new();
        for column in &mut self.columns {
            for slot in column.iter_mut() {
                released.extend(slot.take());
            }
        }
        released
    }

    /// Every occupied cell with its id, for rendering queries.
    pub fn occupied_cells(&self) -> Vec<(Cell, BlockId)> {
        let mut cells = Vec::new();
        for (x, column) in self.columns.iter().enumerate() {
            for (y, slot) in column.iter().enumerate() {
                if let Some(id) = slot {
                    cells.push(((x as i32, y as i32), *id));
                }
            }
        }
        cells
    }
}
