mod config;
mod duration;

pub use config::{
    ColorsConfig, Config, DurationSetting, GameBalanceConfig, SessionConfig, SoundsConfig,
    TimesConfig, DEFAULT_PHASE_DURATION,
};
pub use duration::parse_duration;

use std::path::PathBuf;

use crate::error::ConfigError;

const APP_DIR: &str = "hypr_pomo";

/// Returns the directory holding `config.toml`.
///
/// `~/.config/hypr_pomo[-dev]/` based on HYPRPOMO_ENV, or `$HYPRPOMO_HOME`
/// when set (config and data then share that one directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    resolve_dir(dirs::config_dir(), ".config")
}

/// Returns the directory holding `data.json`.
///
/// `~/.local/share/hypr_pomo[-dev]/`, with the same overrides as [`config_dir`].
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    resolve_dir(dirs::data_dir(), ".local/share")
}

fn resolve_dir(platform_base: Option<PathBuf>, home_fallback: &str) -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HYPRPOMO_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base = platform_base.unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(home_fallback)
            });
            let env = std::env::var("HYPRPOMO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base.join(format!("{APP_DIR}-dev"))
            } else {
                base.join(APP_DIR)
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
