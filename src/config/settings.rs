//! Application settings and account configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AccountProfile};

/// Identity of the account this process runs.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Telegram user id of the account.
    pub account_id: AccountId,

    /// Username without `@`, if the account has one.
    pub username: Option<String>,

    /// Display name used in logs.
    pub first_name: String,
}

fn default_first_name() -> String {
    "Ubot".to_owned()
}

impl AccountSettings {
    /// Creates account settings from environment variables.
    ///
    /// Expects `UBOT_ACCOUNT_ID` to be set; `UBOT_USERNAME` and
    /// `UBOT_FIRST_NAME` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), with the account id given
    /// explicitly instead of read from `UBOT_ACCOUNT_ID`.
    pub fn from_env_with_id(account_id: i64) -> Result<Self, ConfigError> {
        Self::from_lookup(with_account_id(account_id, |key| std::env::var(key).ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let account_id = lookup("UBOT_ACCOUNT_ID")
            .ok_or(ConfigError::MissingEnvVar("UBOT_ACCOUNT_ID"))?
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidAccountId)?;

        Ok(Self {
            account_id: AccountId(account_id),
            username: lookup("UBOT_USERNAME").filter(|u| !u.trim().is_empty()),
            first_name: lookup("UBOT_FIRST_NAME").unwrap_or_else(default_first_name),
        })
    }

    /// Builds the profile registered when the account starts.
    #[must_use]
    pub fn profile(&self) -> AccountProfile {
        AccountProfile::new(self.account_id, self.username.clone(), self.first_name.clone())
    }
}

/// Wraps `lookup` so that `UBOT_ACCOUNT_ID` resolves to `account_id`.
fn with_account_id(
    account_id: i64,
    lookup: impl Fn(&str) -> Option<String>,
) -> impl Fn(&str) -> Option<String> {
    let account_id = account_id.to_string();
    move |key| {
        if key == "UBOT_ACCOUNT_ID" {
            Some(account_id.clone())
        } else {
            lookup(key)
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Path to the JSON file holding per-account preferences.
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,

    /// Log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("prefs.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            preferences_path: default_preferences_path(),
            log_level: default_log_level(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            preferences_path: lookup("UBOT_PREFS_PATH")
                .map_or_else(default_preferences_path, PathBuf::from),
            log_level: lookup("RUST_LOG").unwrap_or_else(default_log_level),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid account ID format (must be an integer)")]
    InvalidAccountId,
}
