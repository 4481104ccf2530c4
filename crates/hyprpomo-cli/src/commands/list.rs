use chrono::Local;
use hyprpomo_core::{load_for_today, ProgressionState};

use super::open_store;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let (state, _) = load_for_today(&store, Local::now().date_naive(), &mut rand::thread_rng());
    print!("{}", render(&state));
    Ok(())
}

/// Player stats, today's bounties and pending tasks.
pub fn render(state: &ProgressionState) -> String {
    let level = state.level();
    let mut out = String::new();

    out.push_str("Player Stats\n");
    out.push_str(&format!("  Level {}\n", level.level));
    out.push_str(&format!("  XP: {}/{}\n\n", level.xp_in_level, level.xp_per_level));

    out.push_str("Daily Bounties\n");
    for bounty in &state.bounties.list {
        let mark = if bounty.completed { "✔" } else { "○" };
        let progress = match (bounty.current, bounty.target) {
            (Some(current), Some(target)) if !bounty.completed => format!(" [{current}/{target}]"),
            _ => String::new(),
        };
        out.push_str(&format!("  {mark} {}{progress}  +{} XP\n", bounty.text, bounty.xp));
    }
    out.push('\n');

    let mut active = state.active_tasks().peekable();
    if active.peek().is_none() {
        out.push_str("No active tasks. Use 'hyprpomo add <name>' to create one.\n");
    } else {
        out.push_str("Pending Tasks\n");
        for task in active {
            out.push_str(&format!("  {:>3}  {}\n", task.id, task.name));
        }
    }
    out
}
