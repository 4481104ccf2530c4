use hyprpomo_core::Config;
use indoc::formatdoc;

/// Key bindings and config location, appended to `--help`.
pub fn after_help() -> String {
    let config_path = Config::path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|e| format!("unavailable ({e})"));

    formatdoc! {"
        Keys while the timer runs:
          p    Pause / resume
          s    Skip the current phase (skipping a break early earns XP)
          b    Break out of flow (end overtime)
          q    Quit

        Durations: bare minutes (45) or <n>s, <n>m, <n>h (90s, 45m, 1h).

        Config file located at: {config_path}
    "}
}
