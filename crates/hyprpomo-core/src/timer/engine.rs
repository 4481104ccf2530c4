//! Phase timer implementation.
//!
//! The phase timer is a sample-driven state machine. It does not use
//! internal threads or read the clock itself - the caller passes the current
//! monotonic offset and at most one key into `tick()` on every poll.
//!
//! ## State Transitions
//!
//! ```text
//! Running <-> Paused
//! Running -> Overtime            (work countdown reached zero)
//! Running -> Exited(Completed)   (break countdown reached zero)
//! Running | Paused -> Exited(Skipped)
//! Overtime -> Exited(Completed)  (break key)
//! any non-terminal -> Stopped    (quit / interrupt)
//! ```
//!
//! ## Time accounting
//!
//! Each tick adds the delta since the previous sample to exactly one
//! counter, chosen by the state the timer was in during that interval:
//! `elapsed` while running, `overtime` while in flow, nothing while paused.
//! The delta is applied before the key is handled, so a key takes effect
//! from the sample it was read on.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::input::Key;
use super::phase::{OutcomeKind, SessionOutcome, StopReason, TimerPhase};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Paused,
    /// Work countdown finished and the user kept going.
    Overtime,
    Exited(OutcomeKind),
    /// Quit or interrupted; no outcome.
    Stopped(StopReason),
}

impl TimerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TimerState::Exited(_) | TimerState::Stopped(_))
    }
}

/// Read-only view of a timer for displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub state: TimerState,
    pub planned: Duration,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub overtime: Duration,
}

impl TimerSnapshot {
    /// 0.0 .. 1.0 progress of the countdown.
    pub fn progress(&self) -> f64 {
        if self.planned.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.planned.as_secs_f64()).min(1.0)
    }
}

/// Timer for a single work or break phase.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    phase: TimerPhase,
    planned: Duration,
    state: TimerState,
    elapsed: Duration,
    overtime: Duration,
    last_sample: Duration,
    was_paused: bool,
    remaining_at_skip: Duration,
}

impl PhaseTimer {
    /// Start a phase in `Running` at monotonic offset `now`.
    pub fn new(phase: TimerPhase, planned: Duration, now: Duration) -> Self {
        Self {
            phase,
            planned,
            state: TimerState::Running,
            elapsed: Duration::ZERO,
            overtime: Duration::ZERO,
            last_sample: now,
            was_paused: false,
            remaining_at_skip: Duration::ZERO,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn overtime(&self) -> Duration {
        self.overtime
    }

    pub fn remaining(&self) -> Duration {
        self.planned.saturating_sub(self.elapsed)
    }

    pub fn was_paused(&self) -> bool {
        self.was_paused
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            state: self.state,
            planned: self.planned,
            elapsed: self.elapsed,
            remaining: self.remaining(),
            overtime: self.overtime,
        }
    }

    /// Consume an exited timer into its outcome.
    ///
    /// Returns `None` while the phase is still live or after a quit.
    pub fn into_outcome(self) -> Option<SessionOutcome> {
        let TimerState::Exited(kind) = self.state else {
            return None;
        };
        Some(SessionOutcome {
            phase: self.phase,
            planned: self.planned,
            elapsed_worked: self.elapsed,
            overtime: self.overtime,
            kind,
            remaining_at_skip: self.remaining_at_skip,
            was_paused: self.was_paused,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance to `now`, apply `key` if any, then check the countdown.
    ///
    /// Returns the event for whatever transition happened on this tick.
    pub fn tick(&mut self, now: Duration, key: Option<Key>) -> Option<Event> {
        if self.is_terminal() {
            return None;
        }

        self.flush_elapsed(now);

        if let Some(key) = key {
            if let Some(event) = self.handle_key(key) {
                return Some(event);
            }
        }

        self.check_deadline()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: Duration) {
        let delta = now.saturating_sub(self.last_sample);
        self.last_sample = self.last_sample.max(now);
        match self.state {
            TimerState::Running => self.elapsed += delta,
            TimerState::Overtime => self.overtime += delta,
            _ => {}
        }
    }

    fn handle_key(&mut self, key: Key) -> Option<Event> {
        match (key, self.state) {
            (Key::Quit, _) => Some(self.stop(StopReason::Quit)),
            (Key::Interrupt, _) => Some(self.stop(StopReason::Interrupted)),
            (Key::Pause, TimerState::Running) => {
                self.state = TimerState::Paused;
                self.was_paused = true;
                Some(Event::TimerPaused {
                    phase: self.phase,
                    remaining_ms: duration_ms(self.remaining()),
                    at: Utc::now(),
                })
            }
            (Key::Pause, TimerState::Paused) => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    phase: self.phase,
                    remaining_ms: duration_ms(self.remaining()),
                    at: Utc::now(),
                })
            }
            (Key::Skip, TimerState::Running | TimerState::Paused) => {
                self.remaining_at_skip = self.remaining();
                self.state = TimerState::Exited(OutcomeKind::Skipped);
                Some(Event::PhaseSkipped {
                    phase: self.phase,
                    remaining_ms: duration_ms(self.remaining_at_skip),
                    at: Utc::now(),
                })
            }
            (Key::Break, TimerState::Overtime) => {
                self.state = TimerState::Exited(OutcomeKind::Completed);
                Some(self.completed_event())
            }
            // Pause and skip are ignored in flow; break only means something in flow.
            _ => None,
        }
    }

    fn check_deadline(&mut self) -> Option<Event> {
        if self.state != TimerState::Running || self.elapsed < self.planned {
            return None;
        }

        // The sample that crossed zero overshoots by up to one poll. For work
        // that spill belongs to flow; for breaks it is simply dropped.
        let spill = self.elapsed - self.planned;
        self.elapsed = self.planned;

        if self.phase == TimerPhase::Work {
            self.overtime = spill;
            self.state = TimerState::Overtime;
            Some(Event::OvertimeEntered {
                phase: self.phase,
                at: Utc::now(),
            })
        } else {
            self.state = TimerState::Exited(OutcomeKind::Completed);
            Some(self.completed_event())
        }
    }

    fn stop(&mut self, reason: StopReason) -> Event {
        self.state = TimerState::Stopped(reason);
        Event::TimerStopped {
            phase: self.phase,
            reason,
            at: Utc::now(),
        }
    }

    fn completed_event(&self) -> Event {
        Event::PhaseCompleted {
            phase: self.phase,
            elapsed_ms: duration_ms(self.elapsed),
            overtime_ms: duration_ms(self.overtime),
            at: Utc::now(),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
