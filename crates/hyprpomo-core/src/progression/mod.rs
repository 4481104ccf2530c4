//! Persisted progression: XP, session history, tasks and the daily bounties.

mod bounty;
mod level;
mod store;

pub use bounty::{
    Bounty, BountyContext, BountyRule, BountySet, CatalogEntry, BOUNTIES_PER_DAY, CATALOG,
};
pub use level::{level_info, LevelInfo, XP_PER_LEVEL};
pub use store::{JsonFileStore, MemoryStore, ProgressionStore};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// One completed work session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local wall-clock time, written without a UTC offset.
    #[serde(deserialize_with = "local_timestamp")]
    pub date: NaiveDateTime,
    pub task: String,
    /// Seconds credited: planned work plus flow.
    #[serde(deserialize_with = "whole_seconds")]
    pub duration: u64,
}

/// Accepts `2024-06-02T10:15:30.123456` as well as an RFC 3339 stamp with an
/// offset, which is read as the local time it names.
fn local_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|d| d.naive_local()))
        .map_err(|e| serde::de::Error::custom(format!("invalid history date {raw:?}: {e}")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(u64),
    Fractional(f64),
}

/// Durations may carry a fractional part; they are rounded to whole seconds.
fn whole_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match Seconds::deserialize(deserializer)? {
        Seconds::Whole(secs) => secs,
        Seconds::Fractional(secs) => secs.max(0.0).round() as u64,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Everything that survives between runs, stored as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
    #[serde(default)]
    pub bounties: BountySet,
}

impl ProgressionState {
    /// Replace the bounty set if it belongs to another day.
    ///
    /// Returns `true` when a new set was drawn. Calling it again on the same
    /// day is a no-op.
    pub fn refresh_bounties<R: Rng + ?Sized>(&mut self, today: NaiveDate, rng: &mut R) -> bool {
        if self.bounties.is_for(today) {
            return false;
        }
        debug!(stale = %self.bounties.date, "drawing bounties for {today}");
        self.bounties = BountySet::generate(today, rng);
        true
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Add a task and return its id: one more than the largest id ever stored.
    pub fn add_task(&mut self, name: impl Into<String>) -> u64 {
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tasks.push(TaskItem {
            id,
            name: name.into(),
            completed: false,
        });
        id
    }

    /// Mark a task done. Returns `false` if no task has that id.
    pub fn complete_task(&mut self, id: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = true;
                true
            }
            None => false,
        }
    }

    pub fn task(&self, id: u64) -> Option<&TaskItem> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks not yet completed, in insertion order.
    pub fn active_tasks(&self) -> impl Iterator<Item = &TaskItem> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn level(&self) -> LevelInfo {
        level_info(self.xp)
    }
}

/// Load the persisted state as-is; read failures fall back to an empty state.
pub fn load_or_empty<S: ProgressionStore + ?Sized>(store: &S) -> ProgressionState {
    store.load().unwrap_or_else(|e| {
        warn!("{e}; starting from an empty progression state");
        ProgressionState::default()
    })
}

/// Load the latest state for `today` without writing anything.
///
/// Read failures fall back to an empty state. A stale bounty set is redrawn
/// in memory; the returned flag says whether that happened, so the caller
/// knows the state needs saving.
pub fn reload_state<S, R>(store: &S, today: NaiveDate, rng: &mut R) -> (ProgressionState, bool)
where
    S: ProgressionStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut state = load_or_empty(store);
    let refreshed = state.refresh_bounties(today, rng);
    (state, refreshed)
}

/// Like [`reload_state`], but a redrawn bounty set is written back straight away.
pub fn load_for_today<S, R>(store: &S, today: NaiveDate, rng: &mut R) -> (ProgressionState, bool)
where
    S: ProgressionStore + ?Sized,
    R: Rng + ?Sized,
{
    let (state, refreshed) = reload_state(store, today, rng);
    if refreshed {
        if let Err(e) = store.save(&state) {
            warn!("{e}");
        }
    }
    (state, refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn task_ids_are_strictly_increasing() {
        let mut state = ProgressionState::default();
        assert_eq!(state.add_task("a"), 1);
        assert_eq!(state.add_task("b"), 2);
        assert!(state.complete_task(1));
        assert_eq!(state.add_task("c"), 3);
    }

    #[test]
    fn completing_missing_task_is_a_no_op() {
        let mut state = ProgressionState::default();
        state.add_task("a");
        let before = state.clone();
        assert!(!state.complete_task(42));
        assert_eq!(state, before);
    }

    #[test]
    fn completed_tasks_leave_active_listing() {
        let mut state = ProgressionState::default();
        state.add_task("a");
        state.add_task("b");
        state.complete_task(1);
        let active: Vec<_> = state.active_tasks().map(|t| t.name.as_str()).collect();
        assert_eq!(active, ["b"]);
    }

    #[test]
    fn refresh_bounties_is_idempotent_within_a_day() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut state = ProgressionState::default();
        assert!(state.refresh_bounties(day(1), &mut rng));
        state.bounties.list[0].completed = true;
        let first = state.bounties.clone();

        assert!(!state.refresh_bounties(day(1), &mut rng));
        assert_eq!(state.bounties, first);

        assert!(state.refresh_bounties(day(2), &mut rng));
        assert_eq!(state.bounties.date, "2024-05-02");
        assert!(state.bounties.list.iter().all(|b| !b.completed));
    }

    #[test]
    fn load_for_today_writes_back_only_when_redrawn() {
        let mut rng = Pcg64::seed_from_u64(3);
        let store = MemoryStore::default();

        let (state, refreshed) = load_for_today(&store, day(9), &mut rng);
        assert!(refreshed);
        assert_eq!(store.saves(), 1);
        assert_eq!(store.snapshot().bounties, state.bounties);

        let (_, refreshed) = load_for_today(&store, day(9), &mut rng);
        assert!(!refreshed);
        assert_eq!(store.saves(), 1);
    }

    fn stamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
        day(2).and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn history_entry_uses_data_file_field_names() {
        let entry = HistoryEntry {
            date: stamp(10, 15, 30),
            task: "Focus".into(),
            duration: 1500,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-05-02T10:15:30");
        assert_eq!(json["task"], "Focus");
        assert_eq!(json["duration"], 1500);
    }

    #[test]
    fn history_entry_reads_naive_stamps_and_fractional_durations() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"date": "2024-05-02T10:15:30.123456", "task": "Focus", "duration": 1532.7}"#,
        )
        .unwrap();
        assert_eq!(entry.date.date(), day(2));
        assert_eq!(entry.date.format("%H:%M:%S").to_string(), "10:15:30");
        assert_eq!(entry.duration, 1533);
    }

    #[test]
    fn history_entry_reads_offset_stamps_as_local_time() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"date": "2024-05-02T10:15:30+02:00", "task": "Focus", "duration": 1500}"#,
        )
        .unwrap();
        assert_eq!(entry.date, stamp(10, 15, 30));
    }

    #[test]
    fn unreadable_store_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_or_empty(&JsonFileStore::with_path(&path)), ProgressionState::default());
    }
}
