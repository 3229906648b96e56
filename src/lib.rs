/*!
# Blockfall Engine

`blockfall_engine` is a headless simulation core for a falling-block puzzle
game: it owns the occupancy grid, the active-piece state machine (gravity,
autorepeat, rotation with kicks, bounded lock-delay resets, settlement), and
the timed row-clear sequence. Rendering, menus, audio, and input devices are
external; they talk to the engine through [`PieceSpawner`], [`BlockPool`],
[`CoordinateMapper`], and the [`Event`]s returned from [`Simulation::tick`].

# Examples

```
use blockfall_engine::*;
use std::time::Duration;

// Starting up a simulation - in-game time only advances through `tick`.
let mut sim = Simulation::builder()
    .seed(42)
    /* ...Further optional configuration possible... */
    .build();

// Telling the simulation that 'left' was pressed, 16ms after the last tick;
// The active piece will try to move left before gravity is applied.
let events = sim.tick(
    Duration::from_millis(16),
    &[ButtonChange::Press(Button::MoveLeft)],
);

// Events report everything observable that happened during the tick;
// This is how a UI knows to play effects, tally scores, or end the round.
for event in events {
    if let Event::RowsCleared { count, .. } = event {
        println!("cleared {count} rows");
    }
}

// Read most recent simulation state;
// This is how a UI can know how to render the grid, etc.
let _occupied = sim.grid().occupied_cells();
```
*/

#![warn(missing_docs)]

mod builder;
pub mod clearing;
pub mod grid;
pub mod mapper;
mod piece;
pub mod pool;
pub mod rotation;
pub mod spawner;
mod update;

use std::{fmt, num::NonZeroU32, ops, time::Duration};

pub use builder::SimulationBuilder;
pub use clearing::{ClearSequencer, SequencerOutcome};
pub use grid::Grid;
pub use mapper::{CoordinateMapper, UnitMapper};
pub use piece::ActivePiece;
pub use pool::{BlockPool, SequentialPool};
pub use spawner::{PieceSpawner, QueueSpawner, UniformSpawner};

/// Coordinates used to address the playing grid, as `(column, row)`.
///
/// Row `0` is the floor and rows grow upward; rows at or above the grid
/// height form an unbounded, always-unoccupied spawn buffer.
pub type Cell = (i32, i32);
/// A coordinate offset that can be added to a [`Cell`].
pub type Offset = (i32, i32);
/// Opaque identity of a settled block, acquired from a [`BlockPool`].
///
/// The grid owns the ids it stores and hands them back out of
/// [`Grid::clear_rows`] / [`Grid::reset`] so the caller can release them.
pub type BlockId = NonZeroU32;

/// Adds an offset to a cell.
pub fn shifted((x, y): Cell, (dx, dy): Offset) -> Cell {
    (x + dx, y + dy)
}

/// Represents one of the seven falling piece shapes.
///
/// Each shape is four connected unit squares; the base offsets describe the
/// spawn orientation relative to the piece's rotation origin.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceKind {
    /// 'I'-piece; four squares in a straight line.
    I = 0,
    /// 'O'-piece; a 2×2 square. Rotationally symmetric, exempt from rotation.
    O,
    /// 'T'-piece; a 3-wide row with a center bump.
    T,
    /// 'S'-piece; two offset rows snaking up-right.
    S,
    /// 'Z'-piece; two offset rows snaking up-left.
    Z,
    /// 'J'-piece; a 3-wide row with a corner above its left end.
    J,
    /// 'L'-piece; a 3-wide row with a corner above its right end.
    L,
}

impl PieceKind {
    /// All `PieceKind` enum variants in order.
    ///
    /// Note that `PieceKind::VARIANTS[k as usize] == k` always holds.
    pub const VARIANTS: [Self; 7] = {
        use PieceKind::*;
        [I, O, T, S, Z, J, L]
    };

    /// Returns the four unit offsets of the shape in its spawn orientation,
    /// relative to the rotation origin.
    pub const fn base_offsets(self) -> [Offset; 4] {
        match self {
            PieceKind::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            PieceKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            PieceKind::T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            PieceKind::S => [(-1, 0), (0, 0), (0, 1), (1, 1)],
            PieceKind::Z => [(0, 0), (1, 0), (-1, 1), (0, 1)],
            PieceKind::J => [(-1, 0), (0, 0), (1, 0), (-1, 1)],
            PieceKind::L => [(-1, 0), (0, 0), (1, 0), (1, 1)],
        }
    }
}

/// Represents the rotation state an active piece can be in.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// Spawn orientation.
    R0 = 0,
    /// One clockwise quarter turn from spawn.
    R1,
    /// Half turn from spawn.
    R2,
    /// One counter-clockwise quarter turn from spawn.
    R3,
}

impl Rotation {
    /// All `Rotation` enum variants in order.
    ///
    /// Note that `Rotation::VARIANTS[r as usize] == r` always holds.
    pub const VARIANTS: [Self; 4] = {
        use Rotation::*;
        [R0, R1, R2, R3]
    };

    /// Find a new rotation state by turning in the given direction once.
    pub const fn stepped(self, spin: Spin) -> Self {
        let steps = match spin {
            Spin::Cw => 1,
            Spin::Ccw => 3,
        };
        Rotation::VARIANTS[(self as usize + steps) % 4]
    }
}

/// A rotation direction.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Spin {
    /// A 90° clockwise turn; maps each offset `(x, y)` to `(y, -x)`.
    Cw,
    /// A 90° counter-clockwise turn; maps each offset `(x, y)` to `(-y, x)`.
    Ccw,
}

/// Represents an abstract player input.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    /// Moves the piece once to the left; autorepeats while held.
    MoveLeft = 0,
    /// Moves the piece once to the right; autorepeats while held.
    MoveRight,
    /// "Soft" dropping.
    /// Pressing steps the piece down by one, settling it immediately if it
    /// was already grounded; holding replaces the gravity interval with the
    /// much shorter soft-drop interval.
    SoftDrop,
    /// Rotate the piece by +90° (clockwise).
    RotateCw,
    /// Rotate the piece by -90° (counter-clockwise).
    RotateCcw,
    /// "Hard" dropping.
    /// This immediately drops the piece all the way down until it hits a
    /// surface and settles it there.
    HardDrop,
}

impl Button {
    /// All `Button` enum variants.
    ///
    /// Note that `Button::VARIANTS[b as usize] == b` always holds.
    pub const VARIANTS: [Self; 6] = {
        use Button as B;
        [
            B::MoveLeft,
            B::MoveRight,
            B::SoftDrop,
            B::RotateCw,
            B::RotateCcw,
            B::HardDrop,
        ]
    };
}

impl<T> ops::Index<Button> for [T; Button::VARIANTS.len()] {
    type Output = T;

    fn index(&self, idx: Button) -> &Self::Output {
        &self[idx as usize]
    }
}

impl<T> ops::IndexMut<Button> for [T; Button::VARIANTS.len()] {
    fn index_mut(&mut self, idx: Button) -> &mut Self::Output {
        &mut self[idx as usize]
    }
}

/// A change in button state, between being held down or unpressed.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonChange {
    /// The signal of a button now being active / 'pressed down'.
    Press(Button),
    /// The signal of a button now being inactive / 'not pressed down'.
    Release(Button),
}

/// Configuration options of the simulation, all advanced exclusively by
/// [`Simulation::tick`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// How long it takes the active piece to fall one cell under gravity.
    pub fall_delay: Duration,
    /// The gravity interval substituted while 'soft drop' is held.
    pub soft_drop_delay: Duration,
    /// How long a 'move' button must be held before automatic shifting
    /// starts (DAS).
    pub delayed_auto_shift: Duration,
    /// How long it takes for automatic side movement to repeat once it has
    /// started (ARR).
    pub auto_repeat_rate: Duration,
    /// Grace period after the piece becomes grounded before it settles.
    pub lock_delay: Duration,
    /// How many grounded moves/rotations may restart the lock countdown
    /// before the budget is exhausted.
    pub max_lock_resets: u8,
    /// Debounce interval between processed rotation inputs.
    pub rotate_cooldown: Duration,
    /// Pause between settlement with full rows and the rows being removed.
    pub pre_clear_delay: Duration,
    /// Pause between the rows being removed and the next piece spawning.
    pub post_clear_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fall_delay: Duration::from_millis(1000),
            soft_drop_delay: Duration::from_millis(50),
            delayed_auto_shift: Duration::from_millis(167),
            auto_repeat_rate: Duration::from_millis(33),
            lock_delay: Duration::from_millis(500),
            max_lock_resets: 15,
            rotate_cooldown: Duration::from_millis(100),
            pre_clear_delay: Duration::from_millis(200),
            post_clear_delay: Duration::from_millis(50),
        }
    }
}

/// A number of observable events that can be returned by the simulation.
///
/// These are the engine's only outward channel: scoring sinks, sound/visual
/// effects, and game-over screens all key off this stream.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A new piece entered play.
    PieceSpawned {
        /// Shape of the spawned piece.
        kind: PieceKind,
    },
    /// A piece settled and transferred its cells into the grid.
    PieceLocked {
        /// Shape of the settled piece.
        kind: PieceKind,
        /// The four cells the piece occupied at settlement.
        cells: [Cell; 4],
    },
    /// A piece was quickly dropped from its original position to a new one.
    HardDrop {
        /// Shape of the dropped piece.
        kind: PieceKind,
        /// Origin before the drop.
        from: Cell,
        /// Origin after the drop.
        to: Cell,
    },
    /// A number of rows were removed from the grid.
    RowsCleared {
        /// How many rows were removed simultaneously.
        count: u32,
        /// Score awarded for the clear, see [`line_clear_bonus`].
        score_bonus: u32,
    },
    /// The round ended; the top grid row was occupied after a settlement.
    GameOver,
}

/// The score awarded for clearing `count` rows with one piece.
pub const fn line_clear_bonus(count: u32) -> u32 {
    match count {
        0 => 0,
        1 => 10,
        2 => 30,
        3 => 50,
        4 => 100,
        n => 10 * n,
    }
}

/// The top-level state the simulation is in.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// An active piece is in play and controlled by the player.
    PieceInPlay {
        /// The piece being played.
        piece: ActivePiece,
    },
    /// Full rows are being cleared; the grid still shows them until the
    /// pre-clear pause elapses.
    Clearing,
    /// The round is irreversibly over, no further input is processed.
    Ended,
}

/// Main simulation struct representing one round of play.
///
/// Owns the grid and its collaborators explicitly; several independent
/// simulations can coexist (e.g. in tests) with no shared state.
pub struct Simulation {
    /// Timing configuration of the simulation.
    pub config: Config,
    grid: Grid,
    spawner: Box<dyn PieceSpawner>,
    pool: Box<dyn BlockPool>,
    mapper: Box<dyn CoordinateMapper>,
    phase: Phase,
    sequencer: ClearSequencer,
    input: update::InputState,
    score: u32,
    rows_cleared: u32,
}

impl Simulation {
    /// Creates a blank new template representing a yet-to-be-started
    /// [`Simulation`] ready for configuration.
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Read accessor for the occupancy grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read accessor for the current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Read accessor to the active piece, if one is in play.
    pub fn piece(&self) -> Option<&ActivePiece> {
        match &self.phase {
            Phase::PieceInPlay { piece } => Some(piece),
            _ => None,
        }
    }

    /// The total score accumulated from row clears this round.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The total number of rows cleared this round.
    pub fn rows_cleared(&self) -> u32 {
        self.rows_cleared
    }

    /// Whether the round has ended and the simulation stopped processing.
    pub fn ended(&self) -> bool {
        matches!(self.phase, Phase::Ended)
    }

    /// The world-space positions of the active piece's four cells, computed
    /// through the configured [`CoordinateMapper`].
    ///
    /// Purely for rendering; returns `None` while no piece is in play.
    pub fn piece_world_positions(&self) -> Option<[(f32, f32); 4]> {
        self.piece()
            .map(|piece| piece.cells().map(|cell| self.mapper.cell_to_world(cell)))
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Simulation")
            .field("config", &self.config)
            .field("grid", &self.grid)
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("rows_cleared", &self.rows_cleared)
            .finish_non_exhaustive()
    }
}
