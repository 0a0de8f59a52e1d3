//! Shared configuration for Learnbot.
//!
//! Provides functions to locate Learnbot's state directory and data files,
//! and [`BotConfig`], the settings read from the environment at startup.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.learnbot/`:
//!
//! ```text
//! ~/.learnbot/
//! ├── data/         # triggers.json, admins.json
//! ├── locales/      # optional <lang>.json overrides
//! └── config/       # .env.local with secrets
//! ```
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather (required)
//! - `SUPER_ADMIN_ID`: Numeric id of the always-authorized super admin
//! - `LEARNBOT_UTC_OFFSET`: Fixed offset for `{date}`/`{time}` (default `+07:00`)
//! - `LEARNBOT_DEFAULT_LANG`: Fallback language code (default `en`)
//! - `LEARNBOT_STATE_DIR`: Override the base state directory
//! - `LEARNBOT_DATA_DIR`: Override the data directory
//! - `LEARNBOT_LOCALES_DIR`: Override the locales directory

use std::path::PathBuf;

use chrono::FixedOffset;
use tracing::warn;

use crate::error::ConfigError;

/// Environment variable for the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable for the super admin id.
pub const SUPER_ADMIN_ENV: &str = "SUPER_ADMIN_ID";

/// Environment variable for the placeholder time zone offset.
pub const UTC_OFFSET_ENV: &str = "LEARNBOT_UTC_OFFSET";

/// Environment variable for the fallback language.
pub const DEFAULT_LANG_ENV: &str = "LEARNBOT_DEFAULT_LANG";

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "LEARNBOT_STATE_DIR";

/// Environment variable for custom data directory.
pub const DATA_DIR_ENV: &str = "LEARNBOT_DATA_DIR";

/// Environment variable for custom locales directory.
pub const LOCALES_DIR_ENV: &str = "LEARNBOT_LOCALES_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".learnbot";

/// Offset used when none is configured (UTC+7).
pub const DEFAULT_UTC_OFFSET: &str = "+07:00";

/// Language used when a user's language has no locale file.
pub const DEFAULT_LANGUAGE: &str = "en";

const DATA_SUBDIR: &str = "data";
const LOCALES_SUBDIR: &str = "locales";
const CONFIG_SUBDIR: &str = "config";

/// Get the Learnbot state directory.
///
/// The state directory is determined by:
/// 1. `LEARNBOT_STATE_DIR` environment variable if set
/// 2. `~/.learnbot` if home directory is available
/// 3. `.learnbot` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the data directory holding the trigger and admin tables.
pub fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(DATA_SUBDIR))
}

/// Get the directory scanned for locale overrides.
pub fn locales_dir() -> PathBuf {
    std::env::var(LOCALES_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(LOCALES_SUBDIR))
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the .env.local file path.
///
/// Environment file for secrets (bot token, super admin id).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Ensure the data and config directories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir())?;
    std::fs::create_dir_all(config_dir())?;
    Ok(())
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub token: String,
    /// Always-authorized admin, if configured.
    pub super_admin_id: Option<i64>,
    /// Offset used to render `{date}`, `{time}` and `{datetime}`.
    pub utc_offset: FixedOffset,
    /// Language used when a user's language is unknown.
    pub default_language: String,
    /// Where `triggers.json` and `admins.json` live.
    pub data_dir: PathBuf,
    /// Where locale overrides are read from.
    pub locales_dir: PathBuf,
}

impl BotConfig {
    /// Build a config from environment variables.
    ///
    /// # Errors
    /// Fails if the token is missing or the UTC offset is malformed. An
    /// invalid super admin id only logs a warning and is treated as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let super_admin_id = match std::env::var(SUPER_ADMIN_ENV) {
            Ok(raw) => {
                let parsed = parse_user_id(&raw);
                if parsed.is_none() {
                    warn!(value = %raw, "SUPER_ADMIN_ID is not a numeric id, ignoring it");
                }
                parsed
            }
            Err(_) => None,
        };

        let offset_raw =
            std::env::var(UTC_OFFSET_ENV).unwrap_or_else(|_| DEFAULT_UTC_OFFSET.to_string());
        let utc_offset = parse_utc_offset(&offset_raw)?;

        let default_language = std::env::var(DEFAULT_LANG_ENV)
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            token,
            super_admin_id,
            utc_offset,
            default_language,
            data_dir: data_dir(),
            locales_dir: locales_dir(),
        })
    }

    /// Path of the triggers table under this config's data directory.
    pub fn triggers_path(&self) -> PathBuf {
        self.data_dir.join("triggers.json")
    }

    /// Path of the admin roster under this config's data directory.
    pub fn admins_path(&self) -> PathBuf {
        self.data_dir.join("admins.json")
    }
}

/// Parse a user id. Only plain digits are accepted.
pub fn parse_user_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse a fixed UTC offset such as `+07:00`, `-0530`, `+7` or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidUtcOffset(raw.to_string());
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let (hours, minutes) = if digits.len() <= 2 {
        (digits.parse::<i32>().map_err(|_| invalid())?, 0)
    } else {
        let split = digits.len() - 2;
        (
            digits[..split].parse::<i32>().map_err(|_| invalid())?,
            digits[split..].parse::<i32>().map_err(|_| invalid())?,
        )
    };
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
