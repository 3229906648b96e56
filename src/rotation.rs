/*!
This module handles rotation of [`ActivePiece`](crate::ActivePiece)s: the
90° offset transform and wall/floor kick resolution.
*/

use crate::{grid::Grid, shifted, Cell, Offset, PieceKind, Spin};

/*
Rotation is a pure transform on the piece's current offsets; kicks never
touch the offsets, they only shift the origin. The kick tables are ordered
by preference and always start with (0, 0) (rotate in place). 'I' gets a
longer table with ±2 horizontal trials: its 4-wide footprint can end up two
columns deep into a wall after turning, where ±1 is not enough leeway.
*/

/// Applies one 90° turn to a set of offsets.
///
/// Clockwise maps `(x, y)` to `(y, -x)`; counter-clockwise maps `(x, y)` to
/// `(-y, x)`.
pub fn rotated_offsets(offsets: [Offset; 4], spin: Spin) -> [Offset; 4] {
    offsets.map(|(x, y)| match spin {
        Spin::Cw => (y, -x),
        Spin::Ccw => (-y, x),
    })
}

/// The ordered trial offsets for a kind's rotation attempts.
#[rustfmt::skip]
pub fn kick_table(kind: PieceKind) -> &'static [Offset] {
    match kind {
        PieceKind::I => &[(0, 0), ( 1, 0), (-1, 0), ( 2, 0), (-2, 0), (0, 1)][..],
        _            => &[(0, 0), ( 1, 0), (-1, 0), (0, 1)][..],
    }
}

/// Tries to place rotated offsets at each kick in order.
///
/// Returns the first grid-valid `(new_origin, rotated_offsets)` pair, or
/// `None` if every trial fails. The O-kind is rejected outright: its rotated
/// shape is geometrically identical, so searching kicks for it would be
/// wasted (and could displace the piece for no visible reason).
pub fn resolve(
    grid: &Grid,
    origin: Cell,
    offsets: [Offset; 4],
    kind: PieceKind,
    spin: Spin,
) -> Option<(Cell, [Offset; 4])> {
    if kind == PieceKind::O {
        return None;
    }
    let turned = rotated_offsets(offsets, spin);
    kick_table(kind).iter().find_map(|&kick| {
        let candidate = shifted(origin, kick);
        let cells = turned.map(|off| shifted(candidate, off));
        grid.is_valid_placement(&cells)
            .then_some((candidate, turned))
    })
}
