//! Desktop notifications and sounds.
//!
//! Both shell out to external programs on a detached thread. A missing
//! binary or a failed run is only logged at debug level.

use hyprpomo_core::storage::SoundsConfig;
use hyprpomo_core::TimerPhase;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

const APP_NAME: &str = "HyprPomo";
const ICON: &str = "alarm-clock";

pub fn send_notification(title: &str, message: &str) {
    let mut cmd = Command::new("notify-send");
    cmd.args(["-a", APP_NAME, "-i", ICON, title, message]);
    spawn_detached(cmd);
}

/// Sound player keyed by phase kind.
#[derive(Debug, Clone)]
pub struct SoundPlayer {
    enabled: bool,
    work: PathBuf,
    break_sound: PathBuf,
}

impl SoundPlayer {
    pub fn new(config: &SoundsConfig) -> Self {
        Self {
            enabled: config.enabled,
            work: PathBuf::from(&config.work),
            break_sound: PathBuf::from(&config.break_sound),
        }
    }

    pub fn sound_for(&self, phase: TimerPhase) -> Option<&Path> {
        if !self.enabled {
            return None;
        }
        let path = match phase.sound_key() {
            "work" => &self.work,
            _ => &self.break_sound,
        };
        path.exists().then_some(path.as_path())
    }

    pub fn play(&self, phase: TimerPhase) {
        if let Some(path) = self.sound_for(phase) {
            let mut cmd = Command::new("paplay");
            cmd.arg(path);
            spawn_detached(cmd);
        }
    }
}

fn spawn_detached(mut cmd: Command) {
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    std::thread::spawn(move || match cmd.status() {
        Ok(status) if !status.success() => debug!(?cmd, %status, "collaborator exited with failure"),
        Ok(_) => {}
        Err(e) => debug!(?cmd, "collaborator not run: {e}"),
    });
}
