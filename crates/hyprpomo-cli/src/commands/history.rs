use hyprpomo_core::{format_clock, load_or_empty, HistoryEntry};
use std::time::Duration;

use super::open_store;

pub fn run(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let state = load_or_empty(&store);
    print!("{}", render(&state.history, limit));
    Ok(())
}

/// The `limit` most recent entries, newest first.
pub fn render(history: &[HistoryEntry], limit: usize) -> String {
    if history.is_empty() {
        return "No completed sessions yet.\n".to_string();
    }

    let mut out = String::new();
    for entry in history.iter().rev().take(limit) {
        out.push_str(&format!(
            "{}  {:>8}  {}\n",
            entry.date.format("%Y-%m-%d %H:%M"),
            format_clock(Duration::from_secs(entry.duration)),
            entry.task
        ));
    }
    let total: u64 = history.iter().map(|e| e.duration).sum();
    out.push_str(&format!(
        "\n{} sessions, {} focused\n",
        history.len(),
        format_clock(Duration::from_secs(total))
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(hour: u32, task: &str, duration: u64) -> HistoryEntry {
        HistoryEntry {
            date: NaiveDate::from_ymd_opt(2024, 6, 3)
                .and_then(|d| d.and_hms_opt(hour, 0, 0))
                .unwrap(),
            task: task.into(),
            duration,
        }
    }

    #[test]
    fn newest_first_and_limited() {
        let history = [entry(9, "first", 1500), entry(10, "second", 1500), entry(11, "third", 1800)];
        let out = render(&history, 2);
        let third = out.find("third").unwrap();
        let second = out.find("second").unwrap();
        assert!(third < second);
        assert!(!out.contains("first"));
        assert!(out.contains("30:00"));
        assert!(out.contains("3 sessions, 1:20:00 focused"));
    }

    #[test]
    fn empty_history() {
        assert_eq!(render(&[], 10), "No completed sessions yet.\n");
    }
}
