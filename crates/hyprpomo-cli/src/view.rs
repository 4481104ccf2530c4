//! Terminal view for a running session.
//!
//! One live status line, redrawn in place every poll, plus plain lines for
//! phase changes and rewards. Output goes through crossterm so it renders
//! correctly while the keyboard is in raw mode.

use crossterm::cursor::MoveToColumn;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::QueueableCommand;
use dialoguer::Confirm;
use hyprpomo_core::storage::ColorsConfig;
use hyprpomo_core::{
    format_clock, level_info, Config, Event, OutcomeKind, RunTotals, SessionObserver, TimerPhase,
    TimerSnapshot, TimerState,
};
use rand::seq::SliceRandom;
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::notify::{send_notification, SoundPlayer};
use crate::status::StatusFile;

const QUOTES: &[&str] = &[
    "Focus is the key to all success.",
    "Flow state loading...",
    "Discipline is freedom.",
    "Code is poetry.",
    "One brick at a time.",
    "Reality is created by the mind.",
    "Stay hungry, stay foolish.",
];

const BAR_WIDTH: usize = 20;

pub fn random_quote() -> &'static str {
    QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUOTES[0])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub work: Color,
    pub rest: Color,
    pub pause: Color,
    pub dim: Color,
}

impl Palette {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        Self {
            work: parse_color(&colors.work, "colors.work", Color::Cyan),
            rest: parse_color(&colors.break_color, "colors.break", Color::Magenta),
            pause: parse_color(&colors.pause, "colors.pause", Color::Yellow),
            dim: parse_color(&colors.dim, "colors.dim", Color::DarkGrey),
        }
    }

    fn phase(&self, phase: TimerPhase) -> Color {
        if phase.is_break() {
            self.rest
        } else {
            self.work
        }
    }
}

fn parse_color(name: &str, key: &str, fallback: Color) -> Color {
    Color::try_from(name).unwrap_or_else(|()| {
        warn!("Unknown color for '{key}': {name:?}; using {fallback:?}");
        fallback
    })
}

pub struct TerminalView {
    palette: Palette,
    status: StatusFile,
    sounds: SoundPlayer,
    task: String,
    total_xp: u64,
    out: io::Stdout,
}

impl TerminalView {
    /// Build the view and blank the status file left by any earlier run.
    pub fn new(config: &Config, total_xp: u64) -> Self {
        let mut status = StatusFile::new(&config.status_file);
        status.clear();
        Self {
            palette: Palette::from_config(&config.colors),
            status,
            sounds: SoundPlayer::new(&config.sounds),
            task: String::new(),
            total_xp,
            out: io::stdout(),
        }
    }

    /// Print the run's quote in the dim color.
    pub fn quote(&mut self, quote: &str) {
        let dim = self.palette.dim;
        self.line(Some(dim), &format!("\"{quote}\""));
    }

    /// Print a full line above the live line.
    pub fn line(&mut self, color: Option<Color>, text: &str) {
        let result = (|| -> io::Result<()> {
            self.out.queue(MoveToColumn(0))?.queue(Clear(ClearType::CurrentLine))?;
            if let Some(color) = color {
                self.out.queue(SetForegroundColor(color))?;
            }
            self.out
                .queue(Print(text))?
                .queue(ResetColor)?
                .queue(Print("\r\n"))?;
            self.out.flush()
        })();
        if let Err(e) = result {
            debug!("terminal write failed: {e}");
        }
    }

    fn redraw(&mut self, color: Color, text: &str) {
        let result = (|| -> io::Result<()> {
            self.out
                .queue(MoveToColumn(0))?
                .queue(Clear(ClearType::CurrentLine))?
                .queue(SetForegroundColor(color))?
                .queue(Print(text))?
                .queue(ResetColor)?;
            self.out.flush()
        })();
        if let Err(e) = result {
            debug!("terminal redraw failed: {e}");
        }
    }
}

impl SessionObserver for TerminalView {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::PhaseStarted {
                phase,
                planned_secs,
                task,
                ..
            } => {
                self.task = task.clone();
                let color = self.palette.phase(*phase);
                if phase.is_break() {
                    self.line(Some(color), &format!("☕ {} ({}m)", phase.label(), planned_secs / 60));
                    send_notification("Break", &format!("Time to relax. ({}m)", planned_secs / 60));
                } else {
                    self.line(Some(color), &format!("🍅 {} · {task}", phase.label()));
                    send_notification("Focus", &format!("Time to work on: {task}"));
                }
                self.sounds.play(*phase);
            }
            Event::OvertimeEntered { .. } => {
                let color = self.palette.work;
                self.line(Some(color), "🌊 Flow state active. Press 'b' to break.");
            }
            Event::TimerStopped { .. } => {
                self.status.clear();
                self.line(Some(Color::Red), "Timer stopped.");
            }
            Event::BountyCompleted { text, xp, .. } => {
                self.line(Some(Color::Yellow), &format!("📜 Bounty Completed: {text} (+{xp} XP)"));
            }
            Event::SessionScored {
                phase, kind, report, ..
            } => {
                self.total_xp = report.total_xp;
                match (phase.is_break(), kind) {
                    (false, OutcomeKind::Completed) => {
                        let text = summary_message(report.base_xp, report.overtime_xp, report.bounty_xp);
                        self.line(Some(Color::Green), &text);
                    }
                    (true, OutcomeKind::Skipped) if report.session_xp > 0 => {
                        let text = format!(
                            "Break Skipped! +{} XP for getting back to work!",
                            report.session_xp
                        );
                        self.line(Some(Color::Magenta), &text);
                    }
                    _ => {}
                }
            }
            Event::TaskCompleted { .. } => self.line(Some(Color::Green), "Task Complete!"),
            Event::PhaseCompleted { .. }
            | Event::PhaseSkipped { .. }
            | Event::TimerPaused { .. }
            | Event::TimerResumed { .. } => {}
        }
    }

    fn on_tick(&mut self, snapshot: &TimerSnapshot, totals: &RunTotals) {
        self.status.update(snapshot);
        let color = match snapshot.state {
            TimerState::Paused => self.palette.pause,
            _ => self.palette.phase(snapshot.phase),
        };
        let text = live_line(snapshot, totals, self.total_xp, &self.task);
        self.redraw(color, &text);
    }

    fn confirm_task_done(&mut self, task_name: &str) -> bool {
        self.sounds.play(TimerPhase::Work);
        if !io::stdin().is_tty() {
            return false;
        }

        let dim = self.palette.dim;
        self.redraw(dim, "");
        let raw = terminal::is_raw_mode_enabled().unwrap_or(false);
        if raw {
            let _ = terminal::disable_raw_mode();
        }
        let answer = Confirm::new()
            .with_prompt(format!("Did you finish {task_name}?"))
            .default(false)
            .interact()
            .unwrap_or(false);
        if raw {
            if let Err(e) = terminal::enable_raw_mode() {
                warn!("could not restore raw keyboard mode: {e}");
            }
        }
        answer
    }
}

/// `Session Complete!` line with the floored parts of the reward.
pub fn summary_message(base_xp: f64, overtime_xp: f64, bounty_xp: u64) -> String {
    let mut msg = format!("Session Complete! Base: {} XP", base_xp as u64);
    if overtime_xp > 0.0 {
        msg.push_str(&format!(" | Flow Bonus: +{} XP", overtime_xp as u64));
    }
    if bounty_xp > 0 {
        msg.push_str(&format!(" | Bounties: +{bounty_xp} XP"));
    }
    msg
}

pub fn live_line(snapshot: &TimerSnapshot, totals: &RunTotals, total_xp: u64, task: &str) -> String {
    let level = level_info(total_xp);
    let stats = format!(
        "Lvl {} {}/{} XP | Work {} ({}) Break {} ({})",
        level.level,
        level.xp_in_level,
        level.xp_per_level,
        format_clock(totals.worked),
        totals.work_sessions,
        format_clock(totals.rested),
        totals.break_sessions,
    );

    match snapshot.state {
        TimerState::Overtime => format!(
            "🌊 FLOW +{} | {task} | {stats} | b:break q:quit",
            format_clock(snapshot.overtime)
        ),
        TimerState::Paused => format!(
            "⏸ PAUSED {} {} | {stats} | p:resume s:skip q:quit",
            bar(snapshot.progress()),
            format_clock(snapshot.remaining)
        ),
        _ => {
            let controls = if snapshot.phase.is_break() {
                "s:skip (rewards XP) q:quit"
            } else {
                "p:pause s:skip q:quit"
            };
            format!(
                "{} {} {:>3.0}% {} | {stats} | {controls}",
                snapshot.phase.label(),
                bar(snapshot.progress()),
                snapshot.progress() * 100.0,
                format_clock(snapshot.remaining)
            )
        }
    }
}

fn bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
