//! Operator command handlers.
//!
//! Each handler runs one operator action against a [`Console`] and returns
//! the text to show. Commands are organized by functionality:
//! - `auth`: login and logout
//! - `resources`: showing and refreshing the five tables
//! - `pipeline`: spreadsheet upload and ingest retry
//! - `batch`: push/pull on selected projects or repositories
//! - `membership`: roster processing and its run log
//!
//! [`Console`]: crate::state::Console

pub mod auth;
pub mod batch;
pub mod membership;
pub mod pipeline;
pub mod resources;

pub use auth::{login, logout};
pub use batch::set_permissions;
pub use membership::{process, results};
pub use pipeline::{ingest, upload};
pub use resources::{refresh, show};

use crate::models::ResourceRow;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render rows as a table under their column headers.
pub fn render_rows<R: ResourceRow>(rows: &[R]) -> String {
    let mut builder = Builder::default();
    builder.set_header(R::COLUMNS.iter().copied());
    for row in rows {
        builder.push_record(row.cells());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Render result log entries one per line.
pub fn render_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return "(no results)".to_string();
    }
    lines.join("\n")
}
