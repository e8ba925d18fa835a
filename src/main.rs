//! Ubot - Console Entry Point
//!
//! Starts one account and feeds it messages typed on stdin, one message
//! per line, printing the reply of every matched command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ubot::account::{AccountRegistry, JsonPreferenceStore, PreferenceStore};
use ubot::commands::{CommandResult, CommandRouter, IncomingMessage};
use ubot::config::{AccountSettings, BotSettings};

/// Multi-account userbot command dispatcher (console mode).
#[derive(Parser, Debug)]
#[command(name = "ubot")]
#[command(about = "Match userbot commands typed on stdin")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Path to the preferences JSON file (overrides `UBOT_PREFS_PATH`).
    #[arg(short, long)]
    prefs: Option<PathBuf>,

    /// Account id (overrides `UBOT_ACCOUNT_ID`).
    #[arg(long)]
    account_id: Option<i64>,

    /// Account username (overrides `UBOT_USERNAME`).
    #[arg(short, long)]
    username: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables before reading settings
    let env_loaded = dotenvy::from_filename(&args.env_file);

    let mut settings = BotSettings::from_env_with_defaults();
    if let Some(level) = &args.log_level {
        settings.log_level.clone_from(level);
    }
    if let Some(path) = &args.prefs {
        settings.preferences_path.clone_from(path);
    }

    init_logging(&settings.log_level, args.log_level.is_some());

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let mut account_settings = match args.account_id {
        Some(id) => AccountSettings::from_env_with_id(id),
        None => AccountSettings::from_env(),
    }
    .context("Failed to load account configuration")?;
    if args.username.is_some() {
        account_settings.username.clone_from(&args.username);
    }

    let store = Arc::new(
        JsonPreferenceStore::open(&settings.preferences_path).with_context(|| {
            format!(
                "Failed to open preferences at {}",
                settings.preferences_path.display()
            )
        })?,
    );
    info!("Preferences loaded from {}", store.path().display());
    let store: Arc<dyn PreferenceStore> = store;

    let registry = Arc::new(AccountRegistry::new());
    let account = account_settings.profile();
    registry
        .start_account(account.clone(), store.as_ref())
        .await
        .context("Failed to start account")?;

    let router = CommandRouter::with_builtins(Arc::clone(&registry), Arc::clone(&store));

    info!("Userbot is running. Type messages, Ctrl+D or Ctrl+C to stop.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    info!("Input closed, shutting down...");
                    break;
                };

                let mut message = IncomingMessage::new(line, account.id.0);
                match router.dispatch(&account, &mut message).await {
                    Some(result) => print_result(&result),
                    None => debug!("Not a command"),
                }
            }
        }
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str, from_cli: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level, from_cli))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the log filter. A level given on the command line wins over
/// `RUST_LOG`; otherwise `RUST_LOG` wins over the configured level.
fn log_filter(level: &str, from_cli: bool) -> EnvFilter {
    if from_cli {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn print_result(result: &CommandResult) {
    if result.success {
        println!("{}", result.message);
    } else {
        println!("✗ {}", result.message);
    }
}
