/*!
This module handles selection of which piece kinds enter play.
*/

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

use crate::{Cell, PieceKind};

/// Supplies piece kinds and the fixed spawn coordinate for new pieces.
///
/// The engine requests the next kind after every settlement/clear; it never
/// picks kinds itself, so selection policy (uniform, bag, scripted, ...)
/// lives entirely behind this trait.
pub trait PieceSpawner {
    /// The next kind to put into play.
    fn next_kind(&mut self) -> PieceKind;
    /// The fixed origin cell new pieces spawn at.
    fn spawn_origin(&self) -> Cell;
}

/// Uniformly random kind selection over the seven kinds.
///
/// Backed by a seedable PRNG so that equal seeds produce identical piece
/// streams.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformSpawner {
    rng: ChaCha12Rng,
    origin: Cell,
}

impl UniformSpawner {
    /// Creates a spawner from a seed and the spawn origin.
    pub fn new(seed: u64, origin: Cell) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
            origin,
        }
    }
}

impl PieceSpawner for UniformSpawner {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::VARIANTS[self.rng.random_range(0..=6)]
    }

    fn spawn_origin(&self) -> Cell {
        self.origin
    }
}

/// Scripted kind selection, cycling through a fixed sequence.
///
/// Useful for tests and demos that need a fully predictable stream.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueSpawner {
    kinds: Vec<PieceKind>,
    next: usize,
    origin: Cell,
}

impl QueueSpawner {
    /// Creates a spawner cycling through `kinds` in order.
    ///
    /// # Panics
    ///
    /// Panics if `kinds` is empty; a spawner that cannot spawn is a wiring
    /// error.
    pub fn new(kinds: Vec<PieceKind>, origin: Cell) -> Self {
        assert!(!kinds.is_empty(), "queue spawner needs at least one kind");
        Self {
            kinds,
            next: 0,
            origin,
        }
    }
}

impl PieceSpawner for QueueSpawner {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.next];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }

    fn spawn_origin(&self) -> Cell {
        self.origin
    }
}
