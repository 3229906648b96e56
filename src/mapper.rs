/*!
The rendering-side coordinate seam.
*/

use crate::Cell;

/// Maps grid cells to world-space positions for visual placement.
///
/// This has no bearing on simulation correctness; a headless test harness
/// can wire any implementation, including a no-op one.
pub trait CoordinateMapper {
    /// World-space position of the given cell.
    fn cell_to_world(&self, cell: Cell) -> (f32, f32);
}

/// Linear mapper: `origin + cell * cell_size`.
#[derive(PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitMapper {
    /// World position of cell `(0, 0)`.
    pub origin: (f32, f32),
    /// World size of one cell.
    pub cell_size: f32,
}

impl Default for UnitMapper {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0),
            cell_size: 1.0,
        }
    }
}

impl CoordinateMapper for UnitMapper {
    fn cell_to_world(&self, (x, y): Cell) -> (f32, f32) {
        (
            self.origin.0 + x as f32 * self.cell_size,
            self.origin.1 + y as f32 * self.cell_size,
        )
    }
}
