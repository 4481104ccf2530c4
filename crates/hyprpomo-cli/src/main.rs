use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod keys;
mod notify;
mod status;
mod view;

#[derive(Parser)]
#[command(
    name = "hyprpomo",
    version,
    about = "Gamified Pomodoro timer",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Durations (work, short break, long break) and/or a task label,
    /// e.g. `hyprpomo 45m 10m "Write report"`
    #[arg(value_name = "DURATION|LABEL")]
    tokens: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name
        name: Vec<String>,
    },
    /// Show level, daily bounties and pending tasks
    List,
    /// Mark a task as complete
    #[command(alias = "finish")]
    Done {
        /// Task ID
        id: Option<String>,
    },
    /// Show recent completed sessions
    History {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HYPRPOMO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();

    let matches = Cli::command()
        .after_help(commands::help::after_help())
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let result = match cli.command {
        Some(Commands::Add { name }) => commands::task::add(&name),
        Some(Commands::List) => commands::list::run(),
        Some(Commands::Done { id }) => commands::task::done(id.as_deref()),
        Some(Commands::History { limit }) => commands::history::run(limit),
        Some(Commands::Config { action }) => commands::config::run(action),
        None => commands::timer::run(&cli.tokens),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
