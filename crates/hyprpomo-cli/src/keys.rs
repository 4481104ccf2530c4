//! Terminal key source.
//!
//! Raw mode is held for the lifetime of [`TerminalKeys`] so single key
//! presses arrive without Enter. In raw mode Ctrl-C is a key event, not a
//! signal; outside a terminal the SIGINT listener is the only way out.
//! SIGTERM is treated as an interrupt too, so the status file is emptied
//! and raw mode restored.

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use hyprpomo_core::{Key, KeySource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct TerminalKeys {
    raw: bool,
    interrupted: Arc<AtomicBool>,
}

impl TerminalKeys {
    /// Enter raw mode if stdin is a terminal and start the signal listener.
    pub fn new() -> Self {
        let interrupted = Arc::new(AtomicBool::new(false));
        spawn_signal_listener(Arc::clone(&interrupted));

        let raw = std::io::stdin().is_tty()
            && match enable_raw_mode() {
                Ok(()) => true,
                Err(e) => {
                    warn!("raw keyboard mode unavailable: {e}; only Ctrl-C will stop the timer");
                    false
                }
            };
        if !raw {
            debug!("stdin is not a terminal; keys disabled");
        }
        Self { raw, interrupted }
    }

    fn read_key(&self) -> Option<Key> {
        match event::poll(Duration::ZERO) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                debug!("key poll failed: {e}");
                return None;
            }
        }
        match event::read() {
            Ok(CtEvent::Key(key)) => translate(key),
            Ok(_) => None,
            Err(e) => {
                debug!("key read failed: {e}");
                None
            }
        }
    }
}

impl KeySource for TerminalKeys {
    fn poll_key(&mut self) -> Option<Key> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Some(Key::Interrupt);
        }
        if self.raw {
            self.read_key()
        } else {
            None
        }
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        if self.raw {
            let _ = disable_raw_mode();
        }
    }
}

fn translate(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Interrupt),
        KeyCode::Char(c) => Some(Key::from_char(c)),
        _ => None,
    }
}

fn spawn_signal_listener(flag: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                debug!("signal listener not started: {e}");
                return;
            }
        };
        runtime.block_on(async {
            if termination().await {
                flag.store(true, Ordering::SeqCst);
            }
        });
    });
}

/// Resolves once SIGINT or SIGTERM arrives. `false` if no handler could be
/// installed.
#[cfg(unix)]
async fn termination() -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            debug!("SIGTERM handler not installed: {e}");
            return tokio::signal::ctrl_c().await.is_ok();
        }
    };
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.is_ok(),
        _ = term.recv() => true,
    }
}

#[cfg(not(unix))]
async fn termination() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}
