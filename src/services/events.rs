//! Console event types.
//!
//! These events are emitted during pipeline runs, reloads and batch
//! actions so a front end can reactively update its state. Nobody has to
//! listen; emission never fails.

use crate::models::{BatchAction, BatchSurface, ResourceKind};
use crate::services::pipeline::{PipelineState, UploadTarget};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Events published by the console.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// An upload pipeline entered a stage, finished, or failed.
    PipelineProgress {
        run_id: Uuid,
        target: UploadTarget,
        state: PipelineState,
        message: String,
    },

    /// A resource finished reloading.
    ResourceReloaded {
        kind: ResourceKind,
        row_count: usize,
        success: bool,
    },

    /// A batch mutation call completed.
    BatchCompleted {
        surface: BatchSurface,
        action: BatchAction,
        result_count: usize,
        success: bool,
    },

    /// A gated call was rejected for its credential.
    AuthRejected { message: String },
}

/// Broadcast channel for console events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ConsoleEvent) {
        // No receivers is fine.
        let _ = self.sender.send(event);
    }
}
