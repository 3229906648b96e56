/*!
The active piece state machine: movement, rotation, gravity grounding, and
the bounded lock-delay reset budget.
*/

use std::time::Duration;

use crate::{grid::Grid, rotation, shifted, BlockId, Cell, Offset, PieceKind, Rotation, Spin};

/// Transient lock sub-state, active only from the first time the piece
/// grounds until settlement.
///
/// The budget is consumed by successful grounded player actions, never by
/// time spent grounded or by gravity, and survives the piece floating free
/// again; only settlement discards it.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct LockEpoch {
    remaining_resets: u8,
    /// Time the countdown has been running; `None` while the piece is back
    /// in free fall (countdown cancelled, epoch retained).
    countdown: Option<Duration>,
}

/// A falling piece in play.
///
/// Created at spawn with four pool handles, mutated every tick by
/// movement/rotation/gravity, and destroyed exactly once at settlement
/// after transferring its occupied cells to the [`Grid`].
#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivePiece {
    kind: PieceKind,
    origin: Cell,
    rotation: Rotation,
    offsets: [Offset; 4],
    blocks: [BlockId; 4],
    lock: Option<LockEpoch>,
}

impl ActivePiece {
    /// Creates a piece at its spawn origin, in spawn orientation, carrying
    /// the four pool handles it will deposit into the grid on settlement.
    pub fn new(kind: PieceKind, origin: Cell, blocks: [BlockId; 4]) -> Self {
        Self {
            kind,
            origin,
            rotation: Rotation::R0,
            offsets: kind.base_offsets(),
            blocks,
            lock: None,
        }
    }

    /// Shape of the piece.
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// The piece's origin cell (may lie above the grid height at spawn).
    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// Current rotation state.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The four cells the piece occupies right now.
    pub fn cells(&self) -> [Cell; 4] {
        self.offsets.map(|off| shifted(self.origin, off))
    }

    /// The four pool handles the piece carries.
    pub fn blocks(&self) -> [BlockId; 4] {
        self.blocks
    }

    /// Whether the piece could move one cell down.
    pub fn can_fall(&self, grid: &Grid) -> bool {
        grid.is_valid_placement(&self.cells_shifted((0, -1)))
    }

    /// Whether the piece is grounded with a running lock countdown.
    pub fn is_grounded(&self) -> bool {
        matches!(
            self.lock,
            Some(LockEpoch {
                countdown: Some(_),
                ..
            })
        )
    }

    /// The reset budget left in the active lock epoch, or `None` if the
    /// piece has not been grounded yet.
    pub fn remaining_lock_resets(&self) -> Option<u8> {
        self.lock.map(|epoch| epoch.remaining_resets)
    }

    /// Tries to move the piece by `delta`.
    ///
    /// Returns whether the move happened. `counts_for_lock_reset` must be
    /// `true` for player-initiated horizontal moves and `false` for
    /// gravity/soft-drop descents: falling must never touch the reset
    /// budget, even though grounding starts the countdown.
    pub fn try_move(&mut self, grid: &Grid, delta: Offset, counts_for_lock_reset: bool) -> bool {
        let was_grounded = self.is_grounded();
        if !grid.is_valid_placement(&self.cells_shifted(delta)) {
            return false;
        }
        self.origin = shifted(self.origin, delta);
        if counts_for_lock_reset {
            self.apply_grounded_action_rules(grid, was_grounded);
        }
        true
    }

    /// Tries to rotate the piece in the given direction, kicking if needed.
    ///
    /// Returns whether the rotation happened; on failure the piece is
    /// unchanged. The O-kind is always rejected (see
    /// [`rotation::resolve`]). A successful rotation is a player action and
    /// feeds the lock-reset rules like a horizontal move.
    pub fn try_rotate(&mut self, grid: &Grid, spin: Spin) -> bool {
        let was_grounded = self.is_grounded();
        let Some((origin, offsets)) = rotation::resolve(grid, self.origin, self.offsets, self.kind, spin)
        else {
            return false;
        };
        self.origin = origin;
        self.offsets = offsets;
        self.rotation = self.rotation.stepped(spin);
        self.apply_grounded_action_rules(grid, was_grounded);
        true
    }

    /// One gravity step: fall one cell, or ground the piece.
    ///
    /// Returns `true` if the piece fell. On a rejected descent the lock
    /// epoch is initialized (first grounding) or its countdown restarted
    /// from zero if it had been cancelled; an already running countdown is
    /// left untouched.
    pub fn fall_or_ground(&mut self, grid: &Grid, max_lock_resets: u8) -> bool {
        if self.try_move(grid, (0, -1), false) {
            return true;
        }
        match &mut self.lock {
            None => {
                self.lock = Some(LockEpoch {
                    remaining_resets: max_lock_resets,
                    countdown: Some(Duration::ZERO),
                });
            }
            Some(epoch) => {
                if epoch.countdown.is_none() {
                    epoch.countdown = Some(Duration::ZERO);
                }
            }
        }
        false
    }

    /// Advances the lock countdown, if one is running.
    ///
    /// Returns `true` once `lock_delay` has elapsed and the piece must
    /// settle.
    pub fn advance_lock(&mut self, delta: Duration, lock_delay: Duration) -> bool {
        if let Some(LockEpoch {
            countdown: Some(elapsed),
            ..
        }) = &mut self.lock
        {
            *elapsed = elapsed.saturating_add(delta);
            *elapsed >= lock_delay
        } else {
            false
        }
    }

    /// Moves the piece straight down as far as it fits (hard drop).
    pub fn drop_to_floor(&mut self, grid: &Grid) {
        while self.try_move(grid, (0, -1), false) {}
    }

    fn cells_shifted(&self, delta: Offset) -> [Cell; 4] {
        let origin = shifted(self.origin, delta);
        self.offsets.map(|off| shifted(origin, off))
    }

    /// The lock-epoch bookkeeping shared by moves and rotations.
    ///
    /// A successful action while grounded consumes one reset and restarts
    /// the countdown; with the budget exhausted the countdown keeps running
    /// unextended. If the action left the piece able to fall again the
    /// countdown is cancelled but the epoch (and its remaining budget)
    /// survives until settlement.
    fn apply_grounded_action_rules(&mut self, grid: &Grid, was_grounded: bool) {
        if was_grounded {
            if let Some(epoch) = &mut self.lock {
                if epoch.remaining_resets > 0 {
                    epoch.remaining_resets -= 1;
                    epoch.countdown = Some(Duration::ZERO);
                }
            }
        }
        if self.can_fall(grid) {
            if let Some(epoch) = &mut self.lock {
                epoch.countdown = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn blocks() -> [BlockId; 4] {
        [1, 2, 3, 4].map(|n| NonZeroU32::new(n).unwrap())
    }

    fn grounded_piece(grid: &Grid, kind: PieceKind, max_resets: u8) -> ActivePiece {
        let mut piece = ActivePiece::new(kind, (4, 0), blocks());
        assert!(!piece.fall_or_ground(grid, max_resets));
        assert!(piece.is_grounded());
        piece
    }

    #[test]
    fn gravity_never_touches_the_reset_budget() {
        let grid = Grid::new(10, 22);
        let mut piece = ActivePiece::new(PieceKind::T, (4, 5), blocks());
        for _ in 0..5 {
            assert!(piece.fall_or_ground(&grid, 3));
            assert_eq!(piece.remaining_lock_resets(), None);
        }
        assert!(!piece.fall_or_ground(&grid, 3));
        assert_eq!(piece.remaining_lock_resets(), Some(3));
        // Further grounded gravity ticks keep the countdown, budget intact.
        assert!(!piece.fall_or_ground(&grid, 3));
        assert_eq!(piece.remaining_lock_resets(), Some(3));
    }

    #[test]
    fn grounded_actions_consume_resets() {
        let grid = Grid::new(10, 22);
        let mut piece = grounded_piece(&grid, PieceKind::T, 2);
        assert!(piece.try_move(&grid, (1, 0), true));
        assert_eq!(piece.remaining_lock_resets(), Some(1));
        assert!(piece.try_move(&grid, (-1, 0), true));
        assert_eq!(piece.remaining_lock_resets(), Some(0));
        // Budget exhausted: the action still succeeds, no extension granted.
        assert!(piece.try_move(&grid, (1, 0), true));
        assert_eq!(piece.remaining_lock_resets(), Some(0));
        assert!(piece.is_grounded());
    }

    #[test]
    fn exhausted_budget_leaves_countdown_running() {
        let grid = Grid::new(10, 22);
        let lock_delay = Duration::from_millis(500);
        let mut piece = grounded_piece(&grid, PieceKind::T, 1);

        piece.advance_lock(Duration::from_millis(400), lock_delay);
        assert!(piece.try_move(&grid, (1, 0), true));
        // First reset restarted the countdown from zero.
        assert!(!piece.advance_lock(Duration::from_millis(400), lock_delay));

        assert!(piece.try_move(&grid, (-1, 0), true));
        // No budget left; the 400ms already on the clock still count.
        assert!(piece.advance_lock(Duration::from_millis(100), lock_delay));
    }

    #[test]
    fn budget_survives_floating_free_again() {
        let mut grid = Grid::new(10, 22);
        // A one-cell ledge: grounded on top of it, free after moving off.
        let id = NonZeroU32::new(99).unwrap();
        grid.commit(&[((4, 0), id)]);

        let mut piece = ActivePiece::new(PieceKind::O, (4, 1), blocks());
        assert!(!piece.fall_or_ground(&grid, 5));
        assert!(piece.is_grounded());

        assert!(piece.try_move(&grid, (2, 0), true));
        // Off the ledge: countdown cancelled, epoch retained, one reset spent.
        assert!(!piece.is_grounded());
        assert_eq!(piece.remaining_lock_resets(), Some(4));

        assert!(!piece.advance_lock(Duration::from_secs(10), Duration::from_millis(1)));
    }

    #[test]
    fn o_kind_rotation_is_rejected_unchanged() {
        let grid = Grid::new(10, 22);
        let mut piece = ActivePiece::new(PieceKind::O, (4, 5), blocks());
        let before = piece;
        assert!(!piece.try_rotate(&grid, Spin::Cw));
        assert!(!piece.try_rotate(&grid, Spin::Ccw));
        assert_eq!(piece, before);
    }

    #[test]
    fn rotation_steps_state_and_applies_kick() {
        let grid = Grid::new(10, 22);
        let mut piece = ActivePiece::new(PieceKind::T, (4, 5), blocks());
        assert!(piece.try_rotate(&grid, Spin::Cw));
        assert_eq!(piece.rotation(), Rotation::R1);
        assert!(piece.try_rotate(&grid, Spin::Ccw));
        assert_eq!(piece.rotation(), Rotation::R0);
        assert_eq!(piece.cells(), ActivePiece::new(PieceKind::T, (4, 5), blocks()).cells());
    }

    #[test]
    fn hard_drop_rests_on_the_floor() {
        let grid = Grid::new(10, 22);
        let mut piece = ActivePiece::new(PieceKind::I, (4, 20), blocks());
        piece.drop_to_floor(&grid);
        assert!(piece.cells().iter().all(|&(_, y)| y == 0));
        assert!(!piece.can_fall(&grid));
    }
}
