//! Roster processing commands.

use crate::commands::render_lines;
use crate::error::AppError;
use crate::state::Console;

/// Apply roster membership changes to repositories.
pub async fn process(console: &Console) -> Result<String, AppError> {
    let log = console.membership().process().await?;
    Ok(render_lines(&log.entries))
}

/// Show the backend's log of earlier processing runs.
pub async fn results(console: &Console) -> Result<String, AppError> {
    let lines = console.membership().fetch_results().await?;
    Ok(render_lines(&lines))
}
