//! Bare invocation: pick a task and run work/break cycles until quit.

use chrono::Local;
use crossterm::tty::IsTty;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use hyprpomo_core::{
    load_for_today, parse_duration, Config, ProgressionState, SessionOrchestrator, SystemClock,
    TaskBinding,
};
use std::time::Duration;
use tracing::{debug, info};

use super::open_store;
use crate::keys::TerminalKeys;
use crate::view::{random_quote, TerminalView};

/// Positional tokens split into duration overrides and a free-text label.
#[derive(Debug, Default, PartialEq)]
pub struct StartArgs {
    /// Work, short break, long break; extra durations are ignored.
    pub durations: Vec<Duration>,
    pub label: Option<String>,
}

pub fn parse_tokens(tokens: &[String]) -> StartArgs {
    let mut args = StartArgs::default();
    let mut words = Vec::new();
    for token in tokens {
        match parse_duration(token) {
            Some(d) if args.durations.len() < 3 => args.durations.push(d),
            Some(_) => debug!(token = token.as_str(), "extra duration ignored"),
            None => words.push(token.as_str()),
        }
    }
    if !words.is_empty() {
        args.label = Some(words.join(" "));
    }
    args
}

pub fn run(tokens: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store()?;
    let (state, _) = load_for_today(&store, Local::now().date_naive(), &mut rand::thread_rng());

    let args = parse_tokens(tokens);
    let task = match args.label {
        Some(label) => TaskBinding::label(label),
        None if tokens.is_empty() => select_task(&state),
        None => TaskBinding::general(),
    };
    let session = config.session_config(&args.durations);
    info!(
        work = ?session.work,
        short_break = ?session.short_break,
        long_break = ?session.long_break,
        task = task.label.as_str(),
        "starting run"
    );

    let mut view = TerminalView::new(&config, state.xp);
    view.quote(random_quote());

    let mut orchestrator =
        SessionOrchestrator::new(session, SystemClock::new(), TerminalKeys::new(), store, task);
    let end = orchestrator.run(&mut view);
    let totals = orchestrator.totals();
    // Leaves raw mode before the final lines are printed.
    drop(orchestrator);

    info!(?end, ?totals, "run finished");
    Ok(())
}

/// Ask which stored task the run is for. Falls back to the general label
/// when there is nothing to pick or no terminal to ask on.
fn select_task(state: &ProgressionState) -> TaskBinding {
    let tasks: Vec<_> = state.active_tasks().collect();
    if tasks.is_empty() || !std::io::stdin().is_tty() {
        return TaskBinding::general();
    }

    let mut items = vec!["Custom / General".to_string()];
    items.extend(tasks.iter().map(|t| format!("{}: {}", t.id, t.name)));

    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a task")
        .items(&items)
        .default(0)
        .interact();

    match picked {
        Ok(i) if i > 0 => tasks
            .get(i - 1)
            .map(|t| TaskBinding::stored(t.id, t.name.clone()))
            .unwrap_or_default(),
        Ok(_) => TaskBinding::general(),
        Err(e) => {
            debug!("task selection aborted: {e}");
            TaskBinding::general()
        }
    }
}
