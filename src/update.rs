/*!
This module handles what happens when [`Simulation::tick`] is called.
*/

use std::mem;

use super::*;

/// Per-direction held-key timing for DAS/ARR autorepeat.
#[derive(Eq, PartialEq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct HeldMove {
    held: bool,
    /// Press-order stamp; when both directions are held, the later press
    /// drives autorepeat.
    press_seq: u64,
    hold: Duration,
    repeat: Duration,
}

/// Input-side state: which buttons are down, the autorepeat timers, the
/// rotation debounce, and the gravity accumulator.
#[derive(Eq, PartialEq, Clone, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct InputState {
    held: [bool; Button::VARIANTS.len()],
    left: HeldMove,
    right: HeldMove,
    rotate_cooldown: Duration,
    gravity: Duration,
    press_counter: u64,
}

impl InputState {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Simulation {
    /// The main function used to advance the simulation.
    ///
    /// Applies the given button changes, then advances all timers by
    /// `delta`: autorepeat, gravity (or soft drop), the lock countdown, and
    /// the clear sequence. Within one tick, input is resolved before the
    /// gravity check, so a player action can cancel a lock that gravity
    /// would otherwise have triggered in the same tick.
    ///
    /// Returns every observable [`Event`] produced, in order. Once the
    /// round has ended this is a guarded no-op returning no events.
    pub fn tick(&mut self, delta: Duration, inputs: &[ButtonChange]) -> Vec<Event> {
        let mut events = Vec::new();
        if self.ended() {
            return events;
        }

        for &change in inputs {
            self.apply_button_change(change, &mut events);
            if self.ended() {
                return events;
            }
        }

        self.input.rotate_cooldown = self.input.rotate_cooldown.saturating_sub(delta);

        match self.phase {
            Phase::PieceInPlay { .. } => self.advance_piece(delta, &mut events),
            Phase::Clearing => self.advance_clearing(delta, &mut events),
            Phase::Ended => {}
        }
        events
    }

    /// Returns the simulation to a fresh round.
    ///
    /// Every id held by the grid or the active piece goes back to the pool;
    /// any running lock countdown or clear-sequence wait is abandoned
    /// without side effects. A new piece spawns immediately.
    pub fn reset(&mut self) {
        if let Phase::PieceInPlay { piece } = &self.phase {
            for id in piece.blocks() {
                self.pool.release(id);
            }
        }
        for id in self.grid.reset() {
            self.pool.release(id);
        }
        self.sequencer.cancel();
        self.input = InputState::new();
        self.score = 0;
        self.rows_cleared = 0;
        self.phase = Phase::Clearing;
        self.spawn(&mut Vec::new());
    }

    fn apply_button_change(&mut self, change: ButtonChange, events: &mut Vec<Event>) {
        use {Button as B, ButtonChange as BC};
        match change {
            BC::Press(button) => {
                let fresh = !self.input.held[button];
                self.input.held[button] = true;
                match button {
                    // Moves.
                    // Immediate single step on key-down, then DAS/ARR
                    // autorepeat driven from `advance_piece`.
                    B::MoveLeft | B::MoveRight if fresh => {
                        self.input.press_counter += 1;
                        let stamp = HeldMove {
                            held: true,
                            press_seq: self.input.press_counter,
                            hold: Duration::ZERO,
                            repeat: Duration::ZERO,
                        };
                        let dx = if button == B::MoveLeft {
                            self.input.left = stamp;
                            -1
                        } else {
                            self.input.right = stamp;
                            1
                        };
                        if let Phase::PieceInPlay { piece } = &mut self.phase {
                            piece.try_move(&self.grid, (dx, 0), true);
                        }
                    }

                    // Soft drop.
                    // Tapping down while grounded is a settle shortcut;
                    // otherwise one immediate step (never a lock reset).
                    // The shortened gravity interval while held is applied
                    // in `advance_piece`.
                    B::SoftDrop if fresh => {
                        let grounded = self.piece().is_some_and(ActivePiece::is_grounded);
                        if grounded {
                            self.take_piece_and_settle(events);
                        } else if let Phase::PieceInPlay { piece } = &mut self.phase {
                            piece.fall_or_ground(&self.grid, self.config.max_lock_resets);
                            self.input.gravity = Duration::ZERO;
                        }
                    }

                    // Rotates.
                    // Debounced by the rotation cooldown, not by DAS/ARR.
                    B::RotateCw | B::RotateCcw => {
                        if self.input.rotate_cooldown.is_zero() {
                            if let Phase::PieceInPlay { piece } = &mut self.phase {
                                let spin = if button == B::RotateCw {
                                    Spin::Cw
                                } else {
                                    Spin::Ccw
                                };
                                piece.try_rotate(&self.grid, spin);
                                self.input.rotate_cooldown = self.config.rotate_cooldown;
                            }
                        }
                    }

                    // Hard drop: teleport down, then forced settle.
                    B::HardDrop if fresh => {
                        if let Phase::PieceInPlay { piece } = &mut self.phase {
                            let from = piece.origin();
                            piece.drop_to_floor(&self.grid);
                            events.push(Event::HardDrop {
                                kind: piece.kind(),
                                from,
                                to: piece.origin(),
                            });
                            self.take_piece_and_settle(events);
                        }
                    }

                    _ => {}
                }
            }

            BC::Release(button) => {
                self.input.held[button] = false;
                match button {
                    B::MoveLeft => self.input.left = HeldMove::default(),
                    B::MoveRight => self.input.right = HeldMove::default(),
                    _ => {}
                }
            }
        }
    }

    fn advance_piece(&mut self, delta: Duration, events: &mut Vec<Event>) {
        // Autorepeat: once the hold timer exceeds DAS, the repeat timer
        // produces one move per elapsed ARR interval.
        if let Some(dx) = self.active_move_dir() {
            let das = self.config.delayed_auto_shift;
            // A zero repeat rate would ask for infinitely many moves.
            let arr = self.config.auto_repeat_rate.max(Duration::from_micros(1));
            let timer = if dx < 0 {
                &mut self.input.left
            } else {
                &mut self.input.right
            };
            timer.hold = timer.hold.saturating_add(delta);
            let mut steps = 0;
            if timer.hold > das {
                timer.repeat = timer.repeat.saturating_add(delta);
                while timer.repeat >= arr {
                    timer.repeat -= arr;
                    steps += 1;
                }
            }
            for _ in 0..steps {
                let Phase::PieceInPlay { piece } = &mut self.phase else {
                    break;
                };
                if !piece.try_move(&self.grid, (dx, 0), true) {
                    break;
                }
            }
        }

        // Gravity; soft drop replaces the interval outright while held.
        let interval = if self.input.held[Button::SoftDrop] {
            self.config.soft_drop_delay
        } else {
            self.config.fall_delay
        };
        let interval = interval.max(Duration::from_micros(1));
        self.input.gravity = self.input.gravity.saturating_add(delta);
        while self.input.gravity >= interval {
            self.input.gravity -= interval;
            let Phase::PieceInPlay { piece } = &mut self.phase else {
                break;
            };
            if !piece.fall_or_ground(&self.grid, self.config.max_lock_resets) {
                // Grounded: the countdown takes over from here.
                self.input.gravity = Duration::ZERO;
                break;
            }
        }

        // Lock countdown.
        let expired = match &mut self.phase {
            Phase::PieceInPlay { piece } => piece.advance_lock(delta, self.config.lock_delay),
            _ => false,
        };
        if expired {
            self.take_piece_and_settle(events);
        }
    }

    fn advance_clearing(&mut self, delta: Duration, events: &mut Vec<Event>) {
        let outcome = self.sequencer.advance(delta, &self.config, &mut self.grid);
        if let Some((count, removed)) = outcome.cleared {
            for id in removed {
                self.pool.release(id);
            }
            let score_bonus = line_clear_bonus(count);
            self.score += score_bonus;
            self.rows_cleared += count;
            events.push(Event::RowsCleared { count, score_bonus });
            // Game over is evaluated after the clear, never before: the
            // clear itself can make the grid non-terminal again.
            if self.grid.is_game_over() {
                self.sequencer.cancel();
                events.push(Event::GameOver);
                self.phase = Phase::Ended;
                return;
            }
        }
        if outcome.spawn_next {
            self.spawn(events);
        }
    }

    /// Irreversibly transfers the active piece's cells into the grid and
    /// moves the simulation on to clearing or the next spawn.
    fn take_piece_and_settle(&mut self, events: &mut Vec<Event>) {
        let piece = match mem::replace(&mut self.phase, Phase::Clearing) {
            Phase::PieceInPlay { piece } => piece,
            // Settling is guarded by the state machine: without an active
            // piece (double settle, settled piece) this is a no-op.
            other => {
                self.phase = other;
                return;
            }
        };

        let cells = piece.cells();
        let blocks = piece.blocks();
        let placements: [(Cell, BlockId); 4] = std::array::from_fn(|i| (cells[i], blocks[i]));
        let committed = self.grid.commit(&placements);
        // Over-height clamping can collide two cells onto one slot; the
        // loser never entered the grid and its id goes straight back.
        for &(_, id) in &placements {
            if !committed.iter().any(|&(_, committed_id)| committed_id == id) {
                self.pool.release(id);
            }
        }
        events.push(Event::PieceLocked {
            kind: piece.kind(),
            cells,
        });

        let rows = self.grid.full_rows();
        if rows.is_empty() {
            if self.grid.is_game_over() {
                events.push(Event::GameOver);
                self.phase = Phase::Ended;
            } else {
                // No rows to clear: spawn next with no delay.
                self.spawn(events);
            }
        } else {
            self.sequencer.begin(rows);
            self.phase = Phase::Clearing;
        }
    }

    /// Puts the next piece into play: kind and origin from the spawner,
    /// four fresh ids from the pool.
    pub(crate) fn spawn(&mut self, events: &mut Vec<Event>) {
        let kind = self.spawner.next_kind();
        let origin = self.spawner.spawn_origin();
        let blocks = [(); 4].map(|()| self.pool.acquire());
        self.input.gravity = Duration::ZERO;
        self.phase = Phase::PieceInPlay {
            piece: ActivePiece::new(kind, origin, blocks),
        };
        events.push(Event::PieceSpawned { kind });
    }

    /// The held direction currently driving autorepeat; the later press
    /// wins when both are held.
    fn active_move_dir(&self) -> Option<i32> {
        match (self.input.left.held, self.input.right.held) {
            (true, true) => Some(if self.input.left.press_seq > self.input.right.press_seq {
                -1
            } else {
                1
            }),
            (true, false) => Some(-1),
            (false, true) => Some(1),
            (false, false) => None,
        }
    }
}
