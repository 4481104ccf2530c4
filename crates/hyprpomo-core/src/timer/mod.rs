mod clock;
mod engine;
mod input;
mod phase;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{PhaseTimer, TimerSnapshot, TimerState};
pub use input::{Key, KeySource, ScriptedKeys};
pub use phase::{OutcomeKind, SessionOutcome, StopReason, TimerPhase};

/// Render a duration as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(duration: std::time::Duration) -> String {
    let total = duration.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
