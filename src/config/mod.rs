//! Configuration module for the userbot.
//!
//! Loads process settings and the identity of the account to start
//! from environment variables.

mod settings;

pub use settings::{AccountSettings, BotSettings, ConfigError};
