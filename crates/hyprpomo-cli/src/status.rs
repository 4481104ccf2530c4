//! Status bar side channel.
//!
//! A one-line text file that bar widgets poll. Writes are best-effort.

use hyprpomo_core::{format_clock, TimerPhase, TimerSnapshot, TimerState};
use std::path::PathBuf;
use tracing::debug;

pub struct StatusFile {
    path: PathBuf,
    last: Option<String>,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
        }
    }

    /// Write the line for `snapshot`, skipping the write if nothing changed.
    pub fn update(&mut self, snapshot: &TimerSnapshot) {
        let text = status_text(snapshot);
        if self.last.as_deref() == Some(text.as_str()) {
            return;
        }
        self.write(&text);
        self.last = Some(text);
    }

    pub fn clear(&mut self) {
        self.write("");
        self.last = None;
    }

    fn write(&self, text: &str) {
        if let Err(e) = std::fs::write(&self.path, text) {
            debug!(path = %self.path.display(), "status file not written: {e}");
        }
    }
}

pub fn status_text(snapshot: &TimerSnapshot) -> String {
    match snapshot.state {
        TimerState::Overtime => format!("🌊 +{}", format_clock(snapshot.overtime)),
        TimerState::Paused => format!("⏸ {}", format_clock(snapshot.remaining)),
        _ if snapshot.phase == TimerPhase::Work => format!("🍅 {}", format_clock(snapshot.remaining)),
        _ => format!("☕ {}", format_clock(snapshot.remaining)),
    }
}
