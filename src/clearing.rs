/*!
The timed row-clear choreography: pause, clear, pause, spawn-next.

Pure sequencing, no combinatorial logic; the grid does the actual clearing.
*/

use std::{mem, time::Duration};

use crate::{grid::Grid, BlockId, Config};

#[derive(Eq, PartialEq, Clone, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum State {
    #[default]
    Idle,
    PreClear {
        rows: Vec<i32>,
        elapsed: Duration,
    },
    PostClear {
        elapsed: Duration,
    },
}

/// Decouples grid mutation from simulation continuation: after a settlement
/// with full rows, waits the pre-clear pause, performs the clear, waits the
/// post-clear pause, then signals that the next piece may spawn.
///
/// An empty row set signals spawn-next with no delay. The sequence can be
/// [`cancel`](ClearSequencer::cancel)led at any point without side effects.
#[derive(Eq, PartialEq, Clone, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClearSequencer {
    state: State,
}

/// What one [`ClearSequencer::advance`] call produced.
#[derive(Default, Debug)]
pub struct SequencerOutcome {
    /// `(row_count, removed_ids)` if the clear fired during this advance.
    /// The ids must be released back to the external pool by the caller.
    pub cleared: Option<(u32, Vec<BlockId>)>,
    /// Whether the sequence finished and the next piece may spawn.
    pub spawn_next: bool,
}

impl ClearSequencer {
    /// Creates an idle sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no sequence is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Begins a sequence for the given rows.
    pub fn begin(&mut self, rows: Vec<i32>) {
        self.state = State::PreClear {
            rows,
            elapsed: Duration::ZERO,
        };
    }

    /// Abandons any in-flight sequence without touching the grid.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }

    /// Advances the sequence by `delta`, clearing rows on `grid` when the
    /// pre-clear pause elapses.
    ///
    /// A single large `delta` can cross both pauses in one call.
    pub fn advance(&mut self, delta: Duration, config: &Config, grid: &mut Grid) -> SequencerOutcome {
        let mut outcome = SequencerOutcome::default();
        let mut budget = delta;
        loop {
            match &mut self.state {
                State::Idle => break,
                State::PreClear { rows, .. } if rows.is_empty() => {
                    self.state = State::Idle;
                    outcome.spawn_next = true;
                    break;
                }
                State::PreClear { rows, elapsed } => {
                    *elapsed = elapsed.saturating_add(budget);
                    if *elapsed < config.pre_clear_delay {
                        break;
                    }
                    budget = *elapsed - config.pre_clear_delay;
                    let rows = mem::take(rows);
                    let removed = grid.clear_rows(&rows);
                    outcome.cleared = Some((rows.len() as u32, removed));
                    self.state = State::PostClear {
                        elapsed: Duration::ZERO,
                    };
                }
                State::PostClear { elapsed } => {
                    *elapsed = elapsed.saturating_add(budget);
                    if *elapsed >= config.post_clear_delay {
                        self.state = State::Idle;
                        outcome.spawn_next = true;
                    }
                    break;
                }
            }
        }
        outcome
    }
}
