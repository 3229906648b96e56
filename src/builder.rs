/*!
This module handles creation / initialization / building of [`Simulation`]s.
*/

use super::*;

/// This builder exposes the ability to configure a new [`Simulation`] to
/// varying degrees.
///
/// Generally speaking, you'll first call [`SimulationBuilder::new`] or
/// [`Simulation::builder`], then chain calls to methods to set each field,
/// then call [`SimulationBuilder::build`]. Every collaborator has a default:
/// a 10×22 grid, a [`UniformSpawner`] over all seven kinds (seeded from
/// entropy unless a seed is given), a [`SequentialPool`], and a
/// [`UnitMapper`]. The built simulation starts with a piece already in play.
#[derive(Default)]
pub struct SimulationBuilder {
    /// Many of the configuration options that will be set for the simulation.
    pub config: Config,
    width: Option<i32>,
    height: Option<i32>,
    seed: Option<u64>,
    spawner: Option<Box<dyn PieceSpawner>>,
    pool: Option<Box<dyn BlockPool>>,
    mapper: Option<Box<dyn CoordinateMapper>>,
}

impl SimulationBuilder {
    /// Creates a blank new template representing a yet-to-be-started
    /// [`Simulation`] ready for configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`Simulation`] with the information specified by `self`.
    pub fn build(self) -> Simulation {
        let width = self.width.unwrap_or(10);
        let height = self.height.unwrap_or(22);
        let seed = self.seed.unwrap_or_else(rand::random);
        let spawner = self
            .spawner
            .unwrap_or_else(|| Box::new(UniformSpawner::new(seed, (width / 2 - 1, height))));
        let pool = self.pool.unwrap_or_else(|| Box::new(SequentialPool::new()));
        let mapper = self.mapper.unwrap_or_else(|| Box::new(UnitMapper::default()));

        let mut sim = Simulation {
            config: self.config,
            grid: Grid::new(width, height),
            spawner,
            pool,
            mapper,
            phase: Phase::Clearing, // replaced by the initial spawn below
            sequencer: ClearSequencer::new(),
            input: update::InputState::new(),
            score: 0,
            rows_cleared: 0,
        };
        sim.spawn(&mut Vec::new());
        sim
    }

    /// Sets the [`Config`] that will be used by the [`Simulation`].
    pub fn config(mut self, x: Config) -> Self {
        self.config = x;
        self
    }

    /// Grid dimensions in cells (default 10×22).
    pub fn grid_size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// The value to seed the default spawner's PRNG with.
    pub fn seed(mut self, x: u64) -> Self {
        self.seed = Some(x);
        self
    }

    /// How long it takes the active piece to fall one cell under gravity.
    pub fn fall_delay(mut self, x: Duration) -> Self {
        self.config.fall_delay = x;
        self
    }
    /// The gravity interval substituted while 'soft drop' is held.
    pub fn soft_drop_delay(mut self, x: Duration) -> Self {
        self.config.soft_drop_delay = x;
        self
    }
    /// How long a 'move' button must be held before automatic shifting
    /// starts.
    pub fn delayed_auto_shift(mut self, x: Duration) -> Self {
        self.config.delayed_auto_shift = x;
        self
    }
    /// How long it takes for automatic side movement to repeat once it has
    /// started.
    pub fn auto_repeat_rate(mut self, x: Duration) -> Self {
        self.config.auto_repeat_rate = x;
        self
    }
    /// Grace period after the piece becomes grounded before it settles.
    pub fn lock_delay(mut self, x: Duration) -> Self {
        self.config.lock_delay = x;
        self
    }
    /// How many grounded moves/rotations may restart the lock countdown.
    pub fn max_lock_resets(mut self, x: u8) -> Self {
        self.config.max_lock_resets = x;
        self
    }
    /// Debounce interval between processed rotation inputs.
    pub fn rotate_cooldown(mut self, x: Duration) -> Self {
        self.config.rotate_cooldown = x;
        self
    }
    /// Pause between settlement with full rows and the rows being removed.
    pub fn pre_clear_delay(mut self, x: Duration) -> Self {
        self.config.pre_clear_delay = x;
        self
    }
    /// Pause between the rows being removed and the next piece spawning.
    pub fn post_clear_delay(mut self, x: Duration) -> Self {
        self.config.post_clear_delay = x;
        self
    }

    /// Replaces the default spawner.
    pub fn spawner(mut self, x: impl PieceSpawner + 'static) -> Self {
        self.spawner = Some(Box::new(x));
        self
    }

    /// Replaces the default block pool.
    pub fn pool(mut self, x: impl BlockPool + 'static) -> Self {
        self.pool = Some(Box::new(x));
        self
    }

    /// Replaces the default coordinate mapper.
    pub fn mapper(mut self, x: impl CoordinateMapper + 'static) -> Self {
        self.mapper = Some(Box::new(x));
        self
    }
}
