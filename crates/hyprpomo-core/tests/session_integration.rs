//! Integration tests for full work/break runs.
//!
//! Every run is driven by a [`ManualClock`] that advances one second per poll
//! and a scripted key source, so poll `n` happens at `t = n` seconds until the
//! first phase boundary. Phase changes do not sleep, which shifts the mapping
//! by one poll per boundary.

use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;

use hyprpomo_core::progression::CATALOG;
use hyprpomo_core::{
    Bounty, BountySet, Event, JsonFileStore, Key, KeySource, ManualClock, MemoryStore,
    ProgressionState, ProgressionStore, RunTotals, ScoringEngine, ScriptedKeys, SessionConfig,
    SessionEnd, SessionObserver, SessionOrchestrator, TaskBinding, TimerPhase, TimerSnapshot,
};

// ============================================================================
// Helpers
// ============================================================================

fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
}

fn config(short_break: u64, long_break: u64) -> SessionConfig {
    SessionConfig {
        work: Duration::from_secs(60),
        short_break: Duration::from_secs(short_break),
        long_break: Duration::from_secs(long_break),
        poll_interval: Duration::from_secs(1),
        ..SessionConfig::default()
    }
}

/// State whose bounty set is already drawn for the test day.
fn seeded_state(bounty_ids: &[&str]) -> ProgressionState {
    let list = bounty_ids
        .iter()
        .map(|id| {
            let entry = CATALOG.iter().find(|e| e.id == *id).unwrap();
            Bounty {
                id: entry.id.into(),
                text: entry.text.into(),
                target: entry.target,
                current: entry.target.map(|_| 0),
                xp: entry.xp,
                completed: false,
            }
        })
        .collect();
    ProgressionState {
        bounties: BountySet {
            date: "2024-06-03".into(),
            list,
        },
        ..ProgressionState::default()
    }
}

fn orchestrator<K: KeySource, S: ProgressionStore>(
    config: SessionConfig,
    keys: K,
    store: S,
    task: TaskBinding,
) -> SessionOrchestrator<ManualClock, K, S> {
    let engine = ScoringEngine::with_seed(store, config.clone(), 7);
    SessionOrchestrator::with_engine(config, ManualClock::new(noon()), keys, engine, task)
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    ticks: usize,
    last_totals: RunTotals,
    confirm: bool,
    asked: Vec<String>,
}

impl Recorder {
    fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    fn started(&self) -> Vec<(TimerPhase, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::PhaseStarted {
                    phase,
                    planned_secs,
                    ..
                } => Some((*phase, *planned_secs)),
                _ => None,
            })
            .collect()
    }

    fn bounties(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::BountyCompleted { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for Recorder {
    fn on_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }

    fn on_tick(&mut self, _snapshot: &TimerSnapshot, totals: &RunTotals) {
        self.ticks += 1;
        self.last_totals = *totals;
    }

    fn confirm_task_done(&mut self, task_name: &str) -> bool {
        self.asked.push(task_name.to_string());
        self.confirm
    }
}

/// Presses break on every poll, then quits.
struct AlwaysBreak {
    polls: u64,
    quit_at: u64,
}

impl KeySource for AlwaysBreak {
    fn poll_key(&mut self) -> Option<Key> {
        let poll = self.polls;
        self.polls += 1;
        Some(if poll >= self.quit_at { Key::Quit } else { Key::Break })
    }
}

// ============================================================================
// Runs
// ============================================================================

#[test]
fn test_quit_mid_work_writes_nothing() {
    let store = MemoryStore::new(seeded_state(&["marathon"]));
    let mut orch = orchestrator(
        config(300, 900),
        ScriptedKeys::new([(45, Key::Quit)]),
        &store,
        TaskBinding::general(),
    );
    let mut rec = Recorder::default();

    assert_eq!(orch.run(&mut rec), SessionEnd::Quit);
    assert_eq!(store.saves(), 0);
    assert_eq!(store.snapshot(), seeded_state(&["marathon"]));
    assert!(matches!(rec.events.last(), Some(Event::TimerStopped { .. })));
}

#[test]
fn test_interrupt_ends_run_as_interrupted() {
    let store = MemoryStore::new(seeded_state(&[]));
    let mut orch = orchestrator(
        config(300, 900),
        ScriptedKeys::new([]).with_idle_limit(5),
        &store,
        TaskBinding::general(),
    );

    assert_eq!(orch.run(&mut Recorder::default()), SessionEnd::Interrupted);
    assert_eq!(store.saves(), 0);
}

#[test]
fn test_flow_extends_break_and_break_skip_pays() {
    // Work: countdown ends at poll 60, flow until break at poll 90 (30s flow).
    // Break: 5m + 30s, starts at t=90 (poll 91), skipped at poll 121 with 300s left.
    // Next work starts at poll 122 and is quit immediately.
    let store = MemoryStore::new(seeded_state(&["marathon"]));
    let keys = ScriptedKeys::new([(90, Key::Break), (121, Key::Skip), (122, Key::Quit)]);
    let mut orch = orchestrator(config(300, 900), keys, &store, TaskBinding::label("Deep work"));
    let mut rec = Recorder::default();

    assert_eq!(orch.run(&mut rec), SessionEnd::Quit);

    assert_eq!(
        rec.started(),
        [
            (TimerPhase::Work, 60),
            (TimerPhase::ShortBreak, 330),
            (TimerPhase::Work, 60),
        ]
    );

    let stored = store.snapshot();
    // 1 min * 10 + 0.5 min * 10 * 2 = 20, then 5 min left * 5 = 25
    assert_eq!(stored.xp, 45);
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.history[0].task, "Deep work");
    assert_eq!(stored.history[0].duration, 90);
    assert_eq!(stored.bounties.list[0].current, Some(1));
    assert_eq!(store.saves(), 2);

    let totals = orch.totals();
    assert_eq!(totals.work_sessions, 1);
    assert_eq!(totals.break_sessions, 1);
    assert_eq!(totals.worked, Duration::from_secs(90));
    assert_eq!(totals.rested, Duration::from_secs(30));
}

#[test]
fn test_fourth_session_earns_long_break_and_marathon() {
    // Each work phase enters flow at its 61st poll and breaks on the next one,
    // so every break is extended by exactly one second.
    let store = MemoryStore::new(seeded_state(&["marathon"]));
    let keys = AlwaysBreak {
        polls: 0,
        quit_at: 330,
    };
    let mut orch = orchestrator(config(10, 30), keys, &store, TaskBinding::general());
    let mut rec = Recorder::default();

    assert_eq!(orch.run(&mut rec), SessionEnd::Quit);

    use TimerPhase::{LongBreak, ShortBreak, Work};
    assert_eq!(
        rec.started(),
        [
            (Work, 60),
            (ShortBreak, 11),
            (Work, 60),
            (ShortBreak, 11),
            (Work, 60),
            (ShortBreak, 11),
            (Work, 60),
            (LongBreak, 31),
            (Work, 60),
        ]
    );
    assert_eq!(rec.bounties(), ["marathon"]);

    let stored = store.snapshot();
    assert_eq!(stored.xp, 4 * 10 + 100);
    assert_eq!(stored.history.len(), 4);
    assert!(stored.bounties.list[0].completed);
    assert_eq!(orch.totals().work_sessions, 4);
    assert_eq!(orch.totals().break_sessions, 4);
}

#[test]
fn test_pause_forfeits_iron_will() {
    // Paused from poll 10 to poll 40, so the countdown ends at poll 90.
    let store = MemoryStore::new(seeded_state(&["iron_will"]));
    let keys = ScriptedKeys::new([
        (10, Key::Pause),
        (40, Key::Pause),
        (95, Key::Break),
        (96, Key::Quit),
    ]);
    let mut orch = orchestrator(config(300, 900), keys, &store, TaskBinding::general());
    let mut rec = Recorder::default();
    orch.run(&mut rec);

    let stored = store.snapshot();
    // 10 + 5s flow (1.67) floors to 11
    assert_eq!(stored.xp, 11);
    assert_eq!(stored.history[0].duration, 65);
    assert!(!stored.bounties.list[0].completed);
    assert!(rec.bounties().is_empty());
}

#[test]
fn test_unpaused_session_earns_iron_will() {
    let store = MemoryStore::new(seeded_state(&["iron_will"]));
    let keys = ScriptedKeys::new([(65, Key::Break), (66, Key::Quit)]);
    let mut orch = orchestrator(config(300, 900), keys, &store, TaskBinding::general());
    let mut rec = Recorder::default();
    orch.run(&mut rec);

    assert_eq!(store.snapshot().xp, 11 + 60);
    assert_eq!(rec.bounties(), ["iron_will"]);
}

#[test]
fn test_confirmed_task_is_completed_and_label_resets() {
    let mut state = seeded_state(&[]);
    let id = state.add_task("Write report");
    let store = MemoryStore::new(state);

    // Work breaks at poll 61; break of 11s runs polls 62..=73; quit at 74.
    let keys = ScriptedKeys::new([(61, Key::Break), (74, Key::Quit)]);
    let mut orch = orchestrator(config(10, 30), keys, &store, TaskBinding::stored(id, "Write report"));
    let mut rec = Recorder::confirming();
    orch.run(&mut rec);

    assert_eq!(rec.asked, ["Write report"]);
    assert!(rec
        .events
        .iter()
        .any(|e| matches!(e, Event::TaskCompleted { id: 1, .. })));

    let stored = store.snapshot();
    assert!(stored.task(id).unwrap().completed);
    assert_eq!(stored.history[0].task, "Write report");
    assert_eq!(orch.task(), &TaskBinding::general());

    // The next work phase runs under the general label.
    let started: Vec<_> = rec
        .events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseStarted { task, .. } => Some(task.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(started, ["Write report", "Write report", "General Focus"]);
}

#[test]
fn test_declined_task_stays_bound() {
    let mut state = seeded_state(&[]);
    let id = state.add_task("Inbox zero");
    let store = MemoryStore::new(state);

    let keys = ScriptedKeys::new([(61, Key::Break), (74, Key::Quit)]);
    let mut orch = orchestrator(config(10, 30), keys, &store, TaskBinding::stored(id, "Inbox zero"));
    let mut rec = Recorder::default();
    orch.run(&mut rec);

    assert_eq!(rec.asked, ["Inbox zero"]);
    assert!(!store.snapshot().task(id).unwrap().completed);
    assert_eq!(orch.task().task_id, Some(id));
}

#[test]
fn test_free_text_label_is_never_offered_for_completion() {
    let store = MemoryStore::new(seeded_state(&[]));
    let keys = ScriptedKeys::new([(61, Key::Break), (62, Key::Quit)]);
    let mut orch = orchestrator(config(10, 30), keys, &store, TaskBinding::label("Reading"));
    let mut rec = Recorder::confirming();
    orch.run(&mut rec);

    assert!(rec.asked.is_empty());
    assert_eq!(store.snapshot().history[0].task, "Reading");
}

#[test]
fn test_ticks_report_live_totals() {
    let store = MemoryStore::new(seeded_state(&[]));
    let keys = ScriptedKeys::new([(30, Key::Quit)]);
    let mut orch = orchestrator(config(300, 900), keys, &store, TaskBinding::general());
    let mut rec = Recorder::default();
    orch.run(&mut rec);

    // Polls 0..=29 tick; poll 30 stops the timer before the view is updated.
    assert_eq!(rec.ticks, 30);
    assert_eq!(rec.last_totals.worked, Duration::from_secs(29));
    assert_eq!(rec.last_totals.work_sessions, 0);
}

#[test]
fn test_run_persists_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::with_path(dir.path().join("data.json"));
    store.save(&seeded_state(&[])).unwrap();

    let keys = ScriptedKeys::new([(61, Key::Break), (62, Key::Quit)]);
    let mut orch = orchestrator(config(10, 30), keys, &store, TaskBinding::general());
    orch.run(&mut Recorder::default());

    let reopened = JsonFileStore::with_path(dir.path().join("data.json"));
    let state = reopened.load().unwrap();
    assert_eq!(state.xp, 10);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].task, "General Focus");
}
