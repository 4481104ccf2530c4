use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orchestrator::RunTotals;
use crate::scoring::ScoreReport;
use crate::timer::{OutcomeKind, StopReason, TimerPhase, TimerSnapshot};

/// Every state change in a run produces an Event.
/// The terminal view, status file, notifications and sounds all react to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: TimerPhase,
        planned_secs: u64,
        task: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: TimerPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: TimerPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Work countdown hit zero; flow counter is now running.
    OvertimeEntered {
        phase: TimerPhase,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: TimerPhase,
        elapsed_ms: u64,
        overtime_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseSkipped {
        phase: TimerPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Quit or interrupt. No outcome is produced for the phase.
    TimerStopped {
        phase: TimerPhase,
        reason: StopReason,
        at: DateTime<Utc>,
    },
    SessionScored {
        phase: TimerPhase,
        kind: OutcomeKind,
        report: ScoreReport,
        at: DateTime<Utc>,
    },
    BountyCompleted {
        id: String,
        text: String,
        xp: u64,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        id: u64,
        name: String,
        at: DateTime<Utc>,
    },
}

/// Side-effect hooks for a run.
///
/// Nothing here can fail back into the timer: methods return no errors, and
/// implementors swallow their own.
pub trait SessionObserver {
    fn on_event(&mut self, _event: &Event) {}

    /// Called once per poll with the live timer view.
    fn on_tick(&mut self, _snapshot: &TimerSnapshot, _totals: &RunTotals) {}

    /// Asked after a completed work phase bound to a stored task.
    fn confirm_task_done(&mut self, _task_name: &str) -> bool {
        false
    }
}

/// Observer that ignores everything and never confirms a task.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

impl<O: SessionObserver + ?Sized> SessionObserver for &mut O {
    fn on_event(&mut self, event: &Event) {
        (**self).on_event(event)
    }

    fn on_tick(&mut self, snapshot: &TimerSnapshot, totals: &RunTotals) {
        (**self).on_tick(snapshot, totals)
    }

    fn confirm_task_done(&mut self, task_name: &str) -> bool {
        (**self).confirm_task_done(task_name)
    }
}
