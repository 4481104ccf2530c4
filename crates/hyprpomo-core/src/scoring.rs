//! Session scoring engine.
//!
//! Turns a [`SessionOutcome`] into XP, history and bounty progress.
//!
//! ## Reward rules
//!
//! | Phase | Outcome | Reward |
//! |-------|---------|--------|
//! | Work | Completed | `planned/60 * rate + overtime/60 * rate * multiplier`, plus bounties |
//! | Work | Skipped | nothing |
//! | Break | Skipped with more than the threshold left | `remaining/60 * skip_rate` |
//! | Break | Completed | nothing |
//!
//! Fractional XP is only floored once, on the final session sum.
//!
//! Every call reloads the persisted state first and writes it back at most
//! once, so session XP, the history entry and bounty XP land together.

use chrono::{DateTime, Local, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::progression::{Bounty, BountyContext, HistoryEntry, ProgressionState, ProgressionStore};
use crate::storage::SessionConfig;
use crate::timer::{SessionOutcome, TimerPhase};

/// What one outcome earned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unrounded XP for the planned work time.
    pub base_xp: f64,
    /// Unrounded XP for flow time.
    pub overtime_xp: f64,
    /// Floored session XP (work) or break-skip XP.
    pub session_xp: u64,
    pub bounty_xp: u64,
    pub completed_bounties: Vec<Bounty>,
    /// Total XP after this outcome.
    pub total_xp: u64,
    /// Whether the outcome changed anything that had to be written.
    pub changed: bool,
}

impl ScoreReport {
    pub fn xp_delta(&self) -> u64 {
        self.session_xp + self.bounty_xp
    }
}

/// Unrounded `(base, overtime)` XP for an outcome. Zero for everything but
/// completed work and long-enough break skips (reported as `base`).
pub fn raw_xp(outcome: &SessionOutcome, config: &SessionConfig) -> (f64, f64) {
    match (outcome.phase, outcome.is_completed()) {
        (TimerPhase::Work, true) => {
            let base = minutes(outcome.planned) * config.xp_per_minute;
            let overtime =
                minutes(outcome.overtime) * config.xp_per_minute * config.overtime_multiplier;
            (base, overtime)
        }
        (TimerPhase::Work, false) => (0.0, 0.0),
        (_, true) => (0.0, 0.0),
        (_, false) => {
            if outcome.remaining_at_skip > config.break_skip_min_remaining {
                (minutes(outcome.remaining_at_skip) * config.break_skip_xp_per_minute, 0.0)
            } else {
                (0.0, 0.0)
            }
        }
    }
}

/// Floored XP for an outcome, excluding bounties.
pub fn outcome_xp(outcome: &SessionOutcome, config: &SessionConfig) -> u64 {
    let (base, overtime) = raw_xp(outcome, config);
    floor_xp(base + overtime)
}

fn minutes(d: std::time::Duration) -> f64 {
    d.as_secs_f64() / 60.0
}

fn floor_xp(xp: f64) -> u64 {
    if xp.is_finite() && xp > 0.0 {
        xp.floor() as u64
    } else {
        0
    }
}

/// Applies outcomes to a [`ProgressionStore`].
pub struct ScoringEngine<S> {
    store: S,
    config: SessionConfig,
    rng: StdRng,
}

impl<S: ProgressionStore> ScoringEngine<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic bounty draws, for tests.
    pub fn with_seed(store: S, config: SessionConfig, seed: u64) -> Self {
        Self {
            store,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reload the persisted state, redrawing bounties if the day changed.
    /// Read failures fall back to an empty state.
    pub fn reload(&mut self, now: DateTime<Local>) -> (ProgressionState, bool) {
        crate::progression::reload_state(&self.store, now.date_naive(), &mut self.rng)
    }

    /// Score one outcome. Takes it by value: an outcome is rewarded once.
    ///
    /// Persistence failures are logged and swallowed; the report still
    /// describes what was earned.
    pub fn score(&mut self, outcome: SessionOutcome, task: &str, now: DateTime<Local>) -> ScoreReport {
        let (base_xp, overtime_xp) = raw_xp(&outcome, &self.config);
        let session_xp = floor_xp(base_xp + overtime_xp);

        let (mut state, mut changed) = self.reload(now);
        let mut report = ScoreReport {
            base_xp,
            overtime_xp,
            session_xp,
            ..ScoreReport::default()
        };

        if outcome.phase == TimerPhase::Work && outcome.is_completed() {
            state.history.push(HistoryEntry {
                date: now.naive_local(),
                task: task.to_string(),
                duration: (outcome.planned + outcome.overtime).as_secs(),
            });

            let ctx = BountyContext {
                worked: outcome.total_worked(),
                was_paused: outcome.was_paused,
                hour: now.hour(),
            };
            report.completed_bounties = state.bounties.evaluate(&ctx);
            report.bounty_xp = report.completed_bounties.iter().map(|b| b.xp).sum();

            state.add_xp(session_xp + report.bounty_xp);
            changed = true;
        } else if session_xp > 0 {
            state.add_xp(session_xp);
            changed = true;
        }

        if changed {
            if let Err(e) = self.store.save(&state) {
                warn!("{e}; progression not saved");
            }
        }

        report.total_xp = state.xp;
        report.changed = changed;
        if report.xp_delta() > 0 {
            info!(
                phase = ?outcome.phase,
                session_xp = report.session_xp,
                bounty_xp = report.bounty_xp,
                total_xp = report.total_xp,
                "session scored"
            );
        }
        report
    }
}
