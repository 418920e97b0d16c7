//! Batch permission mutations.
//!
//! One controller per table. A batch call needs a non-empty selection and
//! an unlocked table; otherwise the controller answers locally and never
//! touches the network. Every call that did reach the server is followed
//! by a full refresh so row statuses reflect what the backend recorded.

use crate::error::AppError;
use crate::models::{BatchAction, BatchRequest, BatchSurface, ResultLog, Selection};
use crate::services::busy::BusyGuard;
use crate::services::events::ConsoleEvent;
use crate::services::refresh::RefreshCoordinator;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub const EMPTY_SELECTION_MESSAGE: &str = "No projects selected";
pub const LOCKED_MESSAGE: &str = "Table is locked. Unlock it to apply changes";

/// Push/pull controller for one table.
pub struct BatchController {
    surface: BatchSurface,
    refresher: RefreshCoordinator,
    locked: AtomicBool,
    busy: AtomicBool,
    log: RwLock<ResultLog>,
}

impl BatchController {
    /// New controller. Starts locked.
    pub fn new(surface: BatchSurface, refresher: RefreshCoordinator) -> Self {
        Self {
            surface,
            refresher,
            locked: AtomicBool::new(true),
            busy: AtomicBool::new(false),
            log: RwLock::new(ResultLog::default()),
        }
    }

    pub fn surface(&self) -> BatchSurface {
        self.surface
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }

    /// Flip the lock. Returns the new state.
    pub fn toggle_lock(&self) -> bool {
        !self.locked.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Latest result log.
    pub async fn results(&self) -> ResultLog {
        self.log.read().await.clone()
    }

    /// Apply `action` to every selected project.
    ///
    /// # Returns
    /// The new result log. When the mutate call itself fails the log holds
    /// one synthetic entry and [`AppError::Batch`] is returned.
    pub async fn apply(
        &self,
        action: BatchAction,
        selection: &Selection,
    ) -> Result<ResultLog, AppError> {
        if selection.scope != self.surface.scope() {
            return Err(AppError::invalid_input_field(
                format!(
                    "Selection was taken from {}, not {}",
                    selection.scope, self.surface
                ),
                "select",
            ));
        }
        let _guard = BusyGuard::acquire(&self.busy, &format!("Batch {}", action))?;

        if selection.is_empty() {
            return Ok(self.publish(ResultLog::single(EMPTY_SELECTION_MESSAGE)).await);
        }
        if self.is_locked() {
            log::info!("[batch] {} on {} refused: table locked", action, self.surface);
            return Ok(self.publish(ResultLog::single(LOCKED_MESSAGE)).await);
        }

        log::info!(
            "[batch] {} {} item(s) on {}",
            action,
            selection.len(),
            self.surface
        );
        let body = BatchRequest {
            action,
            projects: &selection.items,
        };
        let outcome = match self
            .refresher
            .session()
            .post_json(self.surface.endpoint(), &body)
            .await
        {
            Ok(response) => response.json::<Value>().map(|v| result_lines(&v)),
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(lines) => Ok(self.publish(ResultLog::new(lines)).await),
            Err(e) => {
                let detail = e.detail();
                log::error!("[batch] {} on {} failed: {}", action, self.surface, detail);
                self.publish(ResultLog::single(format!("Error setting projects {}", detail)))
                    .await;
                Err(AppError::batch(detail))
            }
        };

        self.refresher.events().emit(ConsoleEvent::BatchCompleted {
            surface: self.surface,
            action,
            result_count: self.log.read().await.entries.len(),
            success: result.is_ok(),
        });
        self.refresher.refresh_all().await;

        result
    }

    async fn publish(&self, log: ResultLog) -> ResultLog {
        *self.log.write().await = log.clone();
        log
    }
}

/// Per-item strings from a `{results: [...]}` body.
fn result_lines(payload: &Value) -> Vec<String> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
