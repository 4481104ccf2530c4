//! # HyprPomo Core Library
//!
//! This library provides the core logic for the HyprPomo gamified Pomodoro timer.
//! The CLI binary is a thin terminal layer over the same core: it supplies the
//! keyboard, the status file, notifications and sound, and everything that
//! decides time or XP lives here.
//!
//! ## Architecture
//!
//! - **Phase Timer**: A tick-driven state machine (`Running`, `Paused`,
//!   `Overtime`, `Exited`) that the caller feeds with clock samples and keys
//! - **Scoring**: Turns a [`SessionOutcome`] into XP and bounty rewards and
//!   writes the result back to the progression store exactly once
//! - **Progression**: XP, history, tasks and the daily bounty set, persisted
//!   as JSON behind the [`ProgressionStore`] trait
//! - **Orchestrator**: Sequences work and break phases until the user quits
//!
//! ## Key Components
//!
//! - [`PhaseTimer`]: Core timer state machine
//! - [`ScoringEngine`]: Reward computation and persistence
//! - [`SessionOrchestrator`]: Work/break loop
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod progression;
pub mod scoring;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, StoreError};
pub use events::{Event, NoopObserver, SessionObserver};
pub use orchestrator::{
    PhaseExit, RunTotals, SessionEnd, SessionOrchestrator, TaskBinding, GENERAL_FOCUS,
};
pub use progression::{
    level_info, load_for_today, load_or_empty, reload_state, Bounty, BountyContext, BountySet,
    HistoryEntry, JsonFileStore, LevelInfo, MemoryStore, ProgressionState, ProgressionStore,
    TaskItem,
};
pub use scoring::{outcome_xp, raw_xp, ScoreReport, ScoringEngine};
pub use storage::{parse_duration, Config, DurationSetting, SessionConfig};
pub use timer::{
    format_clock, Clock, Key, KeySource, ManualClock, OutcomeKind, PhaseTimer, ScriptedKeys,
    SessionOutcome, StopReason, SystemClock, TimerPhase, TimerSnapshot, TimerState,
};
