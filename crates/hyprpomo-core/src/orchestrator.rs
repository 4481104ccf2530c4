//! Work/break sequencing.
//!
//! The orchestrator owns the poll loop: every `poll_interval` it reads at
//! most one key, feeds the current clock sample to the [`PhaseTimer`],
//! forwards events to the observer and sleeps. Finished phases are routed
//! to the [`ScoringEngine`]; a quit or interrupt ends the run with nothing
//! scored for the phase in progress.
//!
//! ```text
//! loop {
//!     Work  --completed--> score, maybe finish the bound task
//!     ShortBreak | LongBreak (base + work overtime) --> score
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::events::{Event, SessionObserver};
use crate::progression::ProgressionStore;
use crate::scoring::ScoringEngine;
use crate::storage::SessionConfig;
use crate::timer::{
    Clock, KeySource, PhaseTimer, SessionOutcome, StopReason, TimerPhase, TimerState,
};

/// Label used when the run is not tied to anything specific.
pub const GENERAL_FOCUS: &str = "General Focus";

/// What the work sessions of a run are attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBinding {
    pub label: String,
    /// Set when the label comes from a stored task that can be completed.
    pub task_id: Option<u64>,
}

impl TaskBinding {
    pub fn general() -> Self {
        Self::label(GENERAL_FOCUS)
    }

    /// Free-text label, not linked to a stored task.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            task_id: None,
        }
    }

    pub fn stored(id: u64, name: impl Into<String>) -> Self {
        Self {
            label: name.into(),
            task_id: Some(id),
        }
    }
}

impl Default for TaskBinding {
    fn default() -> Self {
        Self::general()
    }
}

/// Run-scoped counters. Display only; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    pub work_sessions: u32,
    pub break_sessions: u32,
    pub worked: Duration,
    pub rested: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Interrupted,
}

impl From<StopReason> for SessionEnd {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Quit => SessionEnd::Quit,
            StopReason::Interrupted => SessionEnd::Interrupted,
        }
    }
}

/// Result of driving one phase.
#[derive(Debug)]
pub enum PhaseExit {
    Finished(SessionOutcome),
    Stopped(StopReason),
}

pub struct SessionOrchestrator<C, K, S> {
    config: SessionConfig,
    clock: C,
    keys: K,
    engine: ScoringEngine<S>,
    task: TaskBinding,
    totals: RunTotals,
}

impl<C: Clock, K: KeySource, S: ProgressionStore> SessionOrchestrator<C, K, S> {
    pub fn new(config: SessionConfig, clock: C, keys: K, store: S, task: TaskBinding) -> Self {
        let engine = ScoringEngine::new(store, config.clone());
        Self::with_engine(config, clock, keys, engine, task)
    }

    pub fn with_engine(
        config: SessionConfig,
        clock: C,
        keys: K,
        engine: ScoringEngine<S>,
        task: TaskBinding,
    ) -> Self {
        Self {
            config,
            clock,
            keys,
            engine,
            task,
            totals: RunTotals::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn task(&self) -> &TaskBinding {
        &self.task
    }

    pub fn engine(&self) -> &ScoringEngine<S> {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Break that follows the work sessions completed so far. A count of
    /// zero (first work phase skipped) is a multiple of the interval too.
    pub fn next_break(&self) -> TimerPhase {
        let done = self.totals.work_sessions;
        let every = self.config.long_break_interval.max(1);
        if done % every == 0 {
            TimerPhase::LongBreak
        } else {
            TimerPhase::ShortBreak
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Alternate work and break phases until the user quits.
    pub fn run(&mut self, observer: &mut dyn SessionObserver) -> SessionEnd {
        loop {
            let overtime = match self.run_work(observer) {
                Ok(overtime) => overtime,
                Err(end) => return end,
            };
            if let Err(end) = self.run_break(overtime, observer) {
                return end;
            }
        }
    }

    /// Run one work phase. Returns the flow time earned, which extends the
    /// following break.
    pub fn run_work(&mut self, observer: &mut dyn SessionObserver) -> Result<Duration, SessionEnd> {
        let outcome = match self.drive(TimerPhase::Work, self.config.work, observer) {
            PhaseExit::Finished(outcome) => outcome,
            PhaseExit::Stopped(reason) => return Err(reason.into()),
        };

        if !outcome.is_completed() {
            debug!("work skipped; nothing scored");
            return Ok(Duration::ZERO);
        }

        let overtime = outcome.overtime;
        self.score(outcome, observer);
        self.totals.work_sessions += 1;

        if let Some(id) = self.task.task_id {
            if observer.confirm_task_done(&self.task.label) {
                self.finish_task(id, observer);
            }
        }

        Ok(overtime)
    }

    /// Run the break that follows the current work count, lengthened by
    /// `overtime`.
    pub fn run_break(
        &mut self,
        overtime: Duration,
        observer: &mut dyn SessionObserver,
    ) -> Result<(), SessionEnd> {
        let phase = self.next_break();
        let base = match phase {
            TimerPhase::LongBreak => self.config.long_break,
            _ => self.config.short_break,
        };

        match self.drive(phase, base + overtime, observer) {
            PhaseExit::Finished(outcome) => {
                self.score(outcome, observer);
                self.totals.break_sessions += 1;
                Ok(())
            }
            PhaseExit::Stopped(reason) => Err(reason.into()),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn drive(
        &mut self,
        phase: TimerPhase,
        planned: Duration,
        observer: &mut dyn SessionObserver,
    ) -> PhaseExit {
        observer.on_event(&Event::PhaseStarted {
            phase,
            planned_secs: planned.as_secs(),
            task: self.task.label.clone(),
            at: Utc::now(),
        });

        let mut timer = PhaseTimer::new(phase, planned, self.clock.now());
        loop {
            let key = self.keys.poll_key();
            if let Some(event) = timer.tick(self.clock.now(), key) {
                debug!(?event, "timer transition");
                observer.on_event(&event);
            }
            if timer.is_terminal() {
                break;
            }
            observer.on_tick(&timer.snapshot(), &self.live_totals(&timer));
            self.clock.sleep(self.config.poll_interval);
        }

        if let TimerState::Stopped(reason) = timer.state() {
            return PhaseExit::Stopped(reason);
        }

        let counted = timer.elapsed() + timer.overtime();
        if phase.is_break() {
            self.totals.rested += counted;
        } else {
            self.totals.worked += counted;
        }

        match timer.into_outcome() {
            Some(outcome) => PhaseExit::Finished(outcome),
            None => PhaseExit::Stopped(StopReason::Interrupted),
        }
    }

    fn live_totals(&self, timer: &PhaseTimer) -> RunTotals {
        let mut totals = self.totals;
        let counted = timer.elapsed() + timer.overtime();
        if timer.phase().is_break() {
            totals.rested += counted;
        } else {
            totals.worked += counted;
        }
        totals
    }

    fn score(&mut self, outcome: SessionOutcome, observer: &mut dyn SessionObserver) {
        let phase = outcome.phase;
        let kind = outcome.kind;
        let now = self.clock.local_now();
        let report = self.engine.score(outcome, &self.task.label, now);

        for bounty in &report.completed_bounties {
            observer.on_event(&Event::BountyCompleted {
                id: bounty.id.clone(),
                text: bounty.text.clone(),
                xp: bounty.xp,
                at: Utc::now(),
            });
        }
        observer.on_event(&Event::SessionScored {
            phase,
            kind,
            report,
            at: Utc::now(),
        });
    }

    fn finish_task(&mut self, id: u64, observer: &mut dyn SessionObserver) {
        let (mut state, _) = self.engine.reload(self.clock.local_now());
        if !state.complete_task(id) {
            warn!(task_id = id, "bound task no longer exists");
        } else if let Err(e) = self.engine.store().save(&state) {
            warn!("{e}; task completion not saved");
        } else {
            observer.on_event(&Event::TaskCompleted {
                id,
                name: self.task.label.clone(),
                at: Utc::now(),
            });
        }
        self.task = TaskBinding::general();
    }
}
