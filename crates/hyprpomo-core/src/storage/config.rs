//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Phase durations (`times`)
//! - Cosmetic colors for the terminal view
//! - XP balance (`game_balance`)
//! - Sound files per phase kind
//!
//! Configuration is stored at `~/.config/hypr_pomo/config.toml`. A broken
//! or partial file never stops the timer: missing keys take their defaults,
//! and a value of the wrong type is replaced on its own, with a warning,
//! leaving its neighbours intact. A `config.json` from older releases is
//! migrated the first time `config.toml` is created.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use super::config_dir;
use super::duration::parse_duration;
use crate::error::ConfigError;

/// Fallback for any phase duration that cannot be parsed.
pub const DEFAULT_PHASE_DURATION: Duration = Duration::from_secs(25 * 60);

/// A duration as written in the file: `25`, `"25"` or `"90s"`. Anything
/// else is kept as written and resolves to 25 minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSetting {
    Minutes(u64),
    Text(String),
    Other(toml::Value),
}

impl DurationSetting {
    fn text(value: &str) -> Self {
        DurationSetting::Text(value.to_string())
    }

    /// Resolve to a duration, falling back to 25 minutes with a warning.
    pub fn resolve(&self, key: &str) -> Duration {
        let parsed = match self {
            DurationSetting::Minutes(m) => m.checked_mul(60).map(Duration::from_secs),
            DurationSetting::Text(t) => parse_duration(t),
            DurationSetting::Other(_) => None,
        };
        parsed.unwrap_or_else(|| {
            let err = ConfigError::InvalidDuration {
                key: key.to_string(),
                value: match self {
                    DurationSetting::Minutes(m) => m.to_string(),
                    DurationSetting::Text(t) => t.clone(),
                    DurationSetting::Other(v) => v.to_string(),
                },
            };
            warn!("{err}; using 25m");
            DEFAULT_PHASE_DURATION
        })
    }
}

/// Phase durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesConfig {
    #[serde(default = "default_work")]
    pub work: DurationSetting,
    #[serde(default = "default_short_break")]
    pub short_break: DurationSetting,
    #[serde(default = "default_long_break")]
    pub long_break: DurationSetting,
}

/// Terminal colors. Names are crossterm color names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_work_color", deserialize_with = "lenient_work_color")]
    pub work: String,
    #[serde(
        rename = "break",
        default = "default_break_color",
        deserialize_with = "lenient_break_color"
    )]
    pub break_color: String,
    #[serde(default = "default_pause_color", deserialize_with = "lenient_pause_color")]
    pub pause: String,
    #[serde(default = "default_dim_color", deserialize_with = "lenient_dim_color")]
    pub dim: String,
}

/// XP tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBalanceConfig {
    #[serde(default = "default_xp_per_minute", deserialize_with = "lenient_xp_per_minute")]
    pub xp_per_minute: f64,
    #[serde(
        default = "default_overtime_multiplier",
        deserialize_with = "lenient_overtime_multiplier"
    )]
    pub overtime_multiplier: f64,
    #[serde(
        default = "default_break_skip_xp_per_minute",
        deserialize_with = "lenient_break_skip_xp_per_minute",
        alias = "break_skip_xp_per_min"
    )]
    pub break_skip_xp_per_minute: f64,
    /// Break skips with this much time left or less earn nothing.
    #[serde(
        default = "default_break_skip_min_remaining_secs",
        deserialize_with = "lenient_break_skip_min_remaining_secs"
    )]
    pub break_skip_min_remaining_secs: u64,
    /// Every n-th completed work session is followed by a long break.
    #[serde(
        default = "default_long_break_interval",
        deserialize_with = "lenient_long_break_interval"
    )]
    pub long_break_interval: u32,
}

/// Sound playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundsConfig {
    #[serde(default = "default_true", deserialize_with = "lenient_sounds_enabled")]
    pub enabled: bool,
    #[serde(default = "default_work_sound", deserialize_with = "lenient_work_sound")]
    pub work: String,
    #[serde(
        rename = "break",
        default = "default_break_sound",
        deserialize_with = "lenient_break_sound"
    )]
    pub break_sound: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/hypr_pomo/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// File rewritten every tick for status bars (waybar and friends).
    #[serde(default = "default_status_file", deserialize_with = "lenient_status_file")]
    pub status_file: PathBuf,
    #[serde(default, deserialize_with = "lenient_times")]
    pub times: TimesConfig,
    #[serde(default, deserialize_with = "lenient_colors")]
    pub colors: ColorsConfig,
    #[serde(default, deserialize_with = "lenient_game_balance")]
    pub game_balance: GameBalanceConfig,
    #[serde(default, deserialize_with = "lenient_sounds")]
    pub sounds: SoundsConfig,
}

// Default functions
fn default_work() -> DurationSetting {
    DurationSetting::text("25m")
}
fn default_short_break() -> DurationSetting {
    DurationSetting::text("5m")
}
fn default_long_break() -> DurationSetting {
    DurationSetting::text("15m")
}
fn default_work_color() -> String {
    "cyan".into()
}
fn default_break_color() -> String {
    "magenta".into()
}
fn default_pause_color() -> String {
    "yellow".into()
}
fn default_dim_color() -> String {
    "dark_grey".into()
}
fn default_xp_per_minute() -> f64 {
    10.0
}
fn default_overtime_multiplier() -> f64 {
    2.0
}
fn default_break_skip_xp_per_minute() -> f64 {
    5.0
}
fn default_break_skip_min_remaining_secs() -> u64 {
    60
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_work_sound() -> String {
    "/usr/share/sounds/freedesktop/stereo/complete.oga".into()
}
fn default_break_sound() -> String {
    "/usr/share/sounds/freedesktop/stereo/service-login.oga".into()
}
fn default_status_file() -> PathBuf {
    PathBuf::from("/tmp/hypr_pomo_status")
}

/// Read any value, then try it as `T`. A value of the wrong shape is
/// reported and dropped so the caller can substitute its default.
fn lenient_value<'de, D, T>(deserializer: D, key: &str) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = toml::Value::deserialize(deserializer)?;
    match value.clone().try_into() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => {
            warn!("Invalid configuration value for '{key}': {value}; using the default");
            Ok(None)
        }
    }
}

macro_rules! lenient {
    ($name:ident, $ty:ty, $key:literal, $fallback:expr) => {
        fn $name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
            Ok(lenient_value(deserializer, $key)?.unwrap_or_else($fallback))
        }
    };
}

lenient!(lenient_status_file, PathBuf, "status_file", default_status_file);
lenient!(lenient_times, TimesConfig, "times", TimesConfig::default);
lenient!(lenient_colors, ColorsConfig, "colors", ColorsConfig::default);
lenient!(lenient_game_balance, GameBalanceConfig, "game_balance", GameBalanceConfig::default);
lenient!(lenient_sounds, SoundsConfig, "sounds", SoundsConfig::default);
lenient!(lenient_work_color, String, "colors.work", default_work_color);
lenient!(lenient_break_color, String, "colors.break", default_break_color);
lenient!(lenient_pause_color, String, "colors.pause", default_pause_color);
lenient!(lenient_dim_color, String, "colors.dim", default_dim_color);
lenient!(lenient_xp_per_minute, f64, "game_balance.xp_per_minute", default_xp_per_minute);
lenient!(
    lenient_overtime_multiplier,
    f64,
    "game_balance.overtime_multiplier",
    default_overtime_multiplier
);
lenient!(
    lenient_break_skip_xp_per_minute,
    f64,
    "game_balance.break_skip_xp_per_minute",
    default_break_skip_xp_per_minute
);
lenient!(
    lenient_break_skip_min_remaining_secs,
    u64,
    "game_balance.break_skip_min_remaining_secs",
    default_break_skip_min_remaining_secs
);
lenient!(
    lenient_long_break_interval,
    u32,
    "game_balance.long_break_interval",
    default_long_break_interval
);
lenient!(lenient_sounds_enabled, bool, "sounds.enabled", default_true);
lenient!(lenient_work_sound, String, "sounds.work", default_work_sound);
lenient!(lenient_break_sound, String, "sounds.break", default_break_sound);

impl Default for TimesConfig {
    fn default() -> Self {
        Self {
            work: default_work(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            work: default_work_color(),
            break_color: default_break_color(),
            pause: default_pause_color(),
            dim: default_dim_color(),
        }
    }
}

impl Default for GameBalanceConfig {
    fn default() -> Self {
        Self {
            xp_per_minute: default_xp_per_minute(),
            overtime_multiplier: default_overtime_multiplier(),
            break_skip_xp_per_minute: default_break_skip_xp_per_minute(),
            break_skip_min_remaining_secs: default_break_skip_min_remaining_secs(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            work: default_work_sound(),
            break_sound: default_break_sound(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_file: default_status_file(),
            times: TimesConfig::default(),
            colors: ColorsConfig::default(),
            game_balance: GameBalanceConfig::default(),
            sounds: SoundsConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk, creating the file with defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`] for an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::migrate_legacy(path).unwrap_or_default();
                if let Err(e) = cfg.save_to(path) {
                    warn!("{e}");
                }
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Settings from a `config.json` next to `path`, if one exists.
    ///
    /// The JSON layout uses the same sections and keys. An unreadable legacy
    /// file is reported and ignored.
    fn migrate_legacy(path: &Path) -> Option<Self> {
        let legacy = path.with_file_name("config.json");
        let content = std::fs::read_to_string(&legacy).ok()?;
        match serde_json::from_str(&content) {
            Ok(cfg) => {
                warn!(
                    "Migrating settings from {} to {}; the old file is no longer read",
                    legacy.display(),
                    path.display()
                );
                Some(cfg)
            }
            Err(e) => {
                warn!("Ignoring {}: {e}", legacy.display());
                None
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning defaults on error.
    /// This is a convenience method that never fails; problems are logged.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("{e}. Using defaults.");
            Self::default()
        })
    }

    /// Like [`Config::load_or_default`] for an explicit path.
    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("{e}. Using defaults.");
            Self::default()
        })
    }

    /// Build the immutable per-run settings.
    ///
    /// `overrides` replace work, short break and long break in that order;
    /// missing entries come from the file.
    pub fn session_config(&self, overrides: &[Duration]) -> SessionConfig {
        let pick = |i: usize, setting: &DurationSetting, key: &str| {
            overrides.get(i).copied().unwrap_or_else(|| setting.resolve(key))
        };
        let balance = &self.game_balance;

        SessionConfig {
            work: pick(0, &self.times.work, "times.work"),
            short_break: pick(1, &self.times.short_break, "times.short_break"),
            long_break: pick(2, &self.times.long_break, "times.long_break"),
            xp_per_minute: non_negative(balance.xp_per_minute, "game_balance.xp_per_minute", 10.0),
            overtime_multiplier: non_negative(
                balance.overtime_multiplier,
                "game_balance.overtime_multiplier",
                2.0,
            ),
            break_skip_xp_per_minute: non_negative(
                balance.break_skip_xp_per_minute,
                "game_balance.break_skip_xp_per_minute",
                5.0,
            ),
            break_skip_min_remaining: Duration::from_secs(balance.break_skip_min_remaining_secs),
            long_break_interval: balance.long_break_interval.max(1),
            ..SessionConfig::default()
        }
    }
}

fn non_negative(value: f64, key: &str, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("Invalid configuration value for '{key}': {value}; using {fallback}");
        fallback
    }
}

/// Immutable settings for one run of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub work: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
    pub xp_per_minute: f64,
    pub overtime_multiplier: f64,
    pub break_skip_xp_per_minute: f64,
    pub break_skip_min_remaining: Duration,
    pub long_break_interval: u32,
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            long_break: Duration::from_secs(15 * 60),
            xp_per_minute: 10.0,
            overtime_multiplier: 2.0,
            break_skip_xp_per_minute: 5.0,
            break_skip_min_remaining: Duration::from_secs(60),
            long_break_interval: 4,
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.times.work, DurationSetting::Text("25m".into()));
        assert_eq!(parsed.colors.break_color, "magenta");
        assert_eq!(parsed.sounds.break_sound, cfg.sounds.break_sound);
        assert_eq!(parsed.game_balance.overtime_multiplier, 2.0);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [times]
            work = "50m"

            [game_balance]
            xp_per_minute = 12
            "#,
        )
        .unwrap();
        let session = cfg.session_config(&[]);
        assert_eq!(session.work, Duration::from_secs(50 * 60));
        assert_eq!(session.short_break, Duration::from_secs(5 * 60));
        assert_eq!(session.xp_per_minute, 12.0);
        assert_eq!(session.overtime_multiplier, 2.0);
    }

    #[test]
    fn integer_durations_are_minutes() {
        let cfg: Config = toml::from_str("[times]\nshort_break = 7\n").unwrap();
        assert_eq!(cfg.session_config(&[]).short_break, Duration::from_secs(7 * 60));
    }

    #[test]
    fn unparseable_duration_falls_back_to_25_minutes() {
        let cfg: Config = toml::from_str("[times]\nlong_break = \"forever\"\n").unwrap();
        assert_eq!(cfg.session_config(&[]).long_break, DEFAULT_PHASE_DURATION);
    }

    #[test]
    fn legacy_break_skip_key_is_accepted() {
        let cfg: Config = toml::from_str("[game_balance]\nbreak_skip_xp_per_min = 8\n").unwrap();
        assert_eq!(cfg.game_balance.break_skip_xp_per_minute, 8.0);
    }

    #[test]
    fn negative_rates_are_replaced() {
        let cfg: Config = toml::from_str("[game_balance]\nxp_per_minute = -3\n").unwrap();
        assert_eq!(cfg.session_config(&[]).xp_per_minute, 10.0);
    }

    #[test]
    fn overrides_apply_in_order() {
        let cfg = Config::default();
        let session = cfg.session_config(&[Duration::from_secs(45 * 60), Duration::from_secs(600)]);
        assert_eq!(session.work, Duration::from_secs(45 * 60));
        assert_eq!(session.short_break, Duration::from_secs(600));
        assert_eq!(session.long_break, Duration::from_secs(15 * 60));
    }

    #[test]
    fn load_from_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.game_balance.xp_per_minute, 10.0);
    }

    #[test]
    fn wrongly_typed_values_are_replaced_one_by_one() {
        let cfg: Config = toml::from_str(
            r#"
            [times]
            work = "50m"
            short_break = 2.5

            [colors]
            work = 7

            [game_balance]
            xp_per_minute = 20
            overtime_multiplier = "lots"

            [sounds]
            enabled = "yes"
            "#,
        )
        .unwrap();
        let session = cfg.session_config(&[]);
        assert_eq!(session.work, Duration::from_secs(50 * 60));
        assert_eq!(session.short_break, DEFAULT_PHASE_DURATION);
        assert_eq!(session.long_break, Duration::from_secs(15 * 60));
        assert_eq!(session.xp_per_minute, 20.0);
        assert_eq!(session.overtime_multiplier, 2.0);
        assert_eq!(cfg.colors.work, "cyan");
        assert!(cfg.sounds.enabled);
    }

    #[test]
    fn section_of_the_wrong_type_keeps_the_others() {
        let cfg: Config = toml::from_str(
            r#"
            times = "25m"

            [game_balance]
            long_break_interval = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.times.work, DurationSetting::Text("25m".into()));
        assert_eq!(cfg.session_config(&[]).long_break_interval, 3);
    }

    #[test]
    fn legacy_json_is_migrated_when_toml_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{
                "times": {"work": "45m", "short_break": "5m", "long_break": "15m"},
                "game_balance": {"xp_per_minute": 12, "break_skip_xp_per_min": 8}
            }"#,
        )
        .unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.session_config(&[]).work, Duration::from_secs(45 * 60));
        assert_eq!(cfg.game_balance.break_skip_xp_per_minute, 8.0);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.game_balance.xp_per_minute, 12.0);
    }

    #[test]
    fn unreadable_legacy_json_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ nope").unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.session_config(&[]).work, DEFAULT_PHASE_DURATION);
    }

    #[test]
    fn malformed_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "times = [[[").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
        let cfg = Config::load_or_default_from(&path);
        assert_eq!(cfg.session_config(&[]).work, DEFAULT_PHASE_DURATION);
    }
}
