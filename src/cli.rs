//! Command-line interface.
//!
//! # Usage
//!
//! ```text
//! roster-sync login -u <username> -p <password>
//! roster-sync logout
//! roster-sync show <info|csv|csv-projects|projects|repos>
//! roster-sync upload <file>... --target <roster|projects>
//! roster-sync ingest --target <roster|projects>
//! roster-sync refresh
//! roster-sync set <push|pull> --surface <projects|repos> --select 0,2 [--unlock]
//! roster-sync process
//! roster-sync results
//! ```

use crate::models::{BatchAction, BatchSurface, ResourceKind};
use crate::services::pipeline::UploadTarget;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "roster-sync",
    version,
    about = "Reconcile a student project roster with repository permissions",
    long_about = None,
)]
pub struct Cli {
    /// Base URL of the roster backend.
    #[arg(long, env = "ROSTER_SYNC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session store file.
    #[arg(long, env = "ROSTER_SYNC_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Request timeout in seconds. No timeout when unset.
    #[arg(long, env = "ROSTER_SYNC_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a credential against the backend and remember it.
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the remembered credential.
    Logout,

    /// Print one resource table.
    Show {
        #[arg(value_parser = parse_resource)]
        resource: ResourceKind,
    },

    /// Upload a spreadsheet, ingest it and refresh everything.
    Upload {
        /// Only the first file is uploaded.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_parser = parse_target)]
        target: UploadTarget,
    },

    /// Retry ingest for an already uploaded spreadsheet.
    Ingest {
        #[arg(long, value_parser = parse_target)]
        target: UploadTarget,
    },

    /// Invalidate the server cache and reload every table.
    Refresh,

    /// Grant push or pull on selected rows.
    Set {
        #[arg(value_parser = parse_action)]
        action: BatchAction,
        #[arg(long, value_parser = parse_surface)]
        surface: BatchSurface,
        /// Row positions in the table, e.g. `0,2`.
        #[arg(long, value_delimiter = ',')]
        select: Vec<usize>,
        /// Release the table lock for this call.
        #[arg(long)]
        unlock: bool,
    },

    /// Apply roster membership changes to repositories.
    Process,

    /// Show the log of earlier processing runs.
    Results,
}

impl Commands {
    /// Whether the command acts on a restored session and loaded tables.
    pub fn needs_session(&self) -> bool {
        !matches!(self, Self::Login { .. } | Self::Logout)
    }
}

fn parse_resource(s: &str) -> Result<ResourceKind, String> {
    s.parse().map_err(|e: crate::error::AppError| e.detail())
}

fn parse_target(s: &str) -> Result<UploadTarget, String> {
    s.parse().map_err(|e: crate::error::AppError| e.detail())
}

fn parse_action(s: &str) -> Result<BatchAction, String> {
    s.parse().map_err(|e: crate::error::AppError| e.detail())
}

fn parse_surface(s: &str) -> Result<BatchSurface, String> {
    s.parse().map_err(|e: crate::error::AppError| e.detail())
}
