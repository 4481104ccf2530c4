use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of interval being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerPhase::Work)
    }

    /// Key used for sounds and colors (`work` / `break`).
    pub fn sound_key(self) -> &'static str {
        if self.is_break() {
            "break"
        } else {
            "work"
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Work => "WORK",
            TimerPhase::ShortBreak => "SHORT BREAK",
            TimerPhase::LongBreak => "LONG BREAK",
        }
    }
}

/// How a phase ended when it produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Completed,
    Skipped,
}

/// Why a phase ended without an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    /// The quit key.
    Quit,
    /// Ctrl-C or a termination signal.
    Interrupted,
}

/// Terminal record of one phase run.
///
/// Deliberately not `Clone`: the scoring engine takes it by value, so an
/// outcome can be rewarded at most once.
#[derive(Debug, PartialEq)]
pub struct SessionOutcome {
    pub phase: TimerPhase,
    pub planned: Duration,
    /// Time counted while running. Paused time is excluded and the value
    /// never exceeds `planned`.
    pub elapsed_worked: Duration,
    /// Time spent in flow after the countdown hit zero. Always zero for breaks.
    pub overtime: Duration,
    pub kind: OutcomeKind,
    /// `planned - elapsed_worked` at the moment of the skip; zero otherwise.
    pub remaining_at_skip: Duration,
    pub was_paused: bool,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        self.kind == OutcomeKind::Completed
    }

    /// Time credited to the session: counted work plus flow.
    pub fn total_worked(&self) -> Duration {
        self.elapsed_worked + self.overtime
    }
}
