//! Roster Sync - operator console engine for a student project roster.
//!
//! The library sequences the backend operations behind the console: the
//! authenticated request envelope, the five resource tables, the
//! upload-ingest-refresh pipeline, row selection and batch push/pull.
//! The `roster-sync` binary drives it from the command line.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use cli::{Cli, Commands};
use config::ConsoleConfig;
use error::AppError;
use state::Console;

/// Build a console from settings and flags, then run one command.
pub async fn run(cli: Cli) -> Result<String, AppError> {
    let config = ConsoleConfig::load()?.with_overrides(cli.api_url, cli.timeout_secs, cli.store);
    log::debug!("Using backend {}", config.api_url);
    let console = Console::with_http(config)?;
    execute(&console, cli.command).await
}

/// Run one command against an existing console.
///
/// Every command except `login` and `logout` needs a restored session and
/// loads all tables before acting.
pub async fn execute(console: &Console, command: Commands) -> Result<String, AppError> {
    if command.needs_session() {
        if !console.session().is_authenticated().await {
            return Err(AppError::authentication(
                "Not logged in. Run `roster-sync login` first",
            ));
        }
        console.refresher().refresh_all().await;
    }

    match command {
        Commands::Login { username, password } => {
            commands::login(console, &username, &password).await
        }
        Commands::Logout => commands::logout(console).await,
        Commands::Show { resource } => commands::show(console, resource).await,
        Commands::Upload { files, target } => commands::upload(console, &files, target).await,
        Commands::Ingest { target } => commands::ingest(console, target).await,
        Commands::Refresh => commands::refresh(console).await,
        Commands::Set {
            action,
            surface,
            select,
            unlock,
        } => commands::set_permissions(console, surface, action, &select, unlock).await,
        Commands::Process => commands::process(console).await,
        Commands::Results => commands::results(console).await,
    }
}
