//! Task management commands.
//!
//! Usage problems (missing name, non-numeric or unknown id) are reported on
//! stdout and leave the data file untouched; they are not errors. An
//! unreadable data file counts as empty and failed writes are only logged.

use hyprpomo_core::{load_or_empty, ProgressionState, ProgressionStore};
use tracing::{debug, warn};

use super::open_store;

pub fn add(name: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let name = name.join(" ");
    if name.trim().is_empty() {
        println!("Usage: hyprpomo add \"Task Name\"");
        return Ok(());
    }

    let store = open_store()?;
    let mut state = load_or_empty(&store);
    let id = state.add_task(name.as_str());
    save(&store, &state);
    debug!(id, "task added");
    println!("Task added: {name} (id {id})");
    Ok(())
}

pub fn done(id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(raw) = id else {
        println!("Usage: hyprpomo done <Task ID>");
        return Ok(());
    };
    let Ok(id) = raw.trim().parse::<u64>() else {
        println!("Please provide a valid numeric ID.");
        return Ok(());
    };

    let store = open_store()?;
    let mut state = load_or_empty(&store);
    if state.complete_task(id) {
        save(&store, &state);
        println!("Task {id} marked as complete!");
    } else {
        println!("Task {id} not found.");
    }
    Ok(())
}

fn save(store: &impl ProgressionStore, state: &ProgressionState) {
    if let Err(e) = store.save(state) {
        warn!("{e}; task change not saved");
    }
}
