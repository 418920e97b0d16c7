//! Batch permission commands.

use crate::commands::render_lines;
use crate::error::AppError;
use crate::models::{BatchAction, BatchSurface};
use crate::state::Console;

/// Select rows by position and apply `action` to them.
///
/// The table stays locked unless `unlock` is set, in which case the lock is
/// released for this call and put back afterwards.
pub async fn set_permissions(
    console: &Console,
    surface: BatchSurface,
    action: BatchAction,
    indices: &[usize],
    unlock: bool,
) -> Result<String, AppError> {
    console.select(surface, indices).await?;

    let controller = console.batch(surface);
    if unlock {
        controller.set_locked(false);
    }
    let applied = console.apply(surface, action).await;
    if unlock {
        controller.set_locked(true);
    }

    applied.map(|log| render_lines(&log.entries))
}
