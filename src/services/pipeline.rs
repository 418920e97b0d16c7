//! Upload pipeline.
//!
//! Drives a dropped spreadsheet through upload, ingest, server cache
//! invalidation and a full refresh. The run is a small state machine:
//!
//! ```text
//! Idle -> Uploading -> Ingesting -> Invalidating -> Refreshing -> Idle
//!              \            \             \
//!               +------------+-------------+--> Failed(stage)
//! ```
//!
//! A failed stage aborts the rest of the run. Nothing is rolled back: an
//! uploaded file that never got ingested stays uploaded, and
//! [`UploadPipeline::run_ingest`] is the retry path.

use crate::error::AppError;
use crate::models::{ResourceKind, ResultLog};
use crate::services::busy::BusyGuard;
use crate::services::events::ConsoleEvent;
use crate::services::refresh::{RefreshCoordinator, RefreshReport};
use crate::services::transport::{HttpResponse, Method, RequestBody, UploadFile};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Which resource an upload feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadTarget {
    /// Student roster spreadsheet.
    Roster,
    /// Project list spreadsheet.
    Projects,
}

impl UploadTarget {
    pub fn upload_endpoint(self) -> &'static str {
        match self {
            Self::Roster => "/upload/csv",
            Self::Projects => "/upload/projects",
        }
    }

    pub fn ingest_endpoint(self) -> &'static str {
        match self {
            Self::Roster => "/ingest/csv",
            Self::Projects => "/ingest/projects",
        }
    }

    /// Resource holding the raw uploaded rows.
    pub fn resource(self) -> ResourceKind {
        match self {
            Self::Roster => ResourceKind::Csv,
            Self::Projects => ResourceKind::CsvProjects,
        }
    }
}

impl std::fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roster => write!(f, "roster"),
            Self::Projects => write!(f, "projects"),
        }
    }
}

impl std::str::FromStr for UploadTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "roster" | "csv" => Ok(Self::Roster),
            "projects" | "csv-projects" => Ok(Self::Projects),
            other => Err(AppError::invalid_input_field(
                format!("Unknown upload target '{}'", other),
                "target",
            )),
        }
    }
}

/// A stage of a running pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Uploading,
    Ingesting,
    Invalidating,
    Refreshing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uploading => write!(f, "uploading"),
            Self::Ingesting => write!(f, "ingesting"),
            Self::Invalidating => write!(f, "invalidating"),
            Self::Refreshing => write!(f, "refreshing"),
        }
    }
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running { stage: PipelineStage },
    Failed { stage: PipelineStage, message: String },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub target: UploadTarget,
    /// Server acknowledgements, in stage order.
    pub messages: Vec<String>,
    pub refresh: RefreshReport,
}

/// Runs upload pipelines one at a time.
pub struct UploadPipeline {
    refresher: RefreshCoordinator,
    state: RwLock<PipelineState>,
    log: RwLock<ResultLog>,
    busy: AtomicBool,
}

impl UploadPipeline {
    pub fn new(refresher: RefreshCoordinator) -> Self {
        Self {
            refresher,
            state: RwLock::new(PipelineState::Idle),
            log: RwLock::new(ResultLog::default()),
            busy: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> PipelineState {
        self.state.read().await.clone()
    }

    /// Messages of the latest run, or its failure.
    pub async fn results(&self) -> ResultLog {
        self.log.read().await.clone()
    }

    /// Upload one file and carry it through ingest and refresh.
    pub async fn run(
        &self,
        file: UploadFile,
        target: UploadTarget,
    ) -> Result<PipelineOutcome, AppError> {
        let _guard = BusyGuard::acquire(&self.busy, "Upload")?;
        let run_id = Uuid::new_v4();
        let session = self.refresher.session();

        let file_name = file.file_name.clone();
        self.enter(run_id, target, PipelineStage::Uploading, format!("Uploading {}", file_name))
            .await;
        let uploaded = session
            .gated_request(
                Method::Post,
                target.upload_endpoint(),
                Some(RequestBody::Multipart(file)),
            )
            .await;
        let response = match uploaded {
            Ok(response) => response,
            Err(e) => return Err(self.fail(run_id, target, PipelineStage::Uploading, e).await),
        };
        let messages = vec![acknowledgement(&response, format!("Uploaded {}", file_name))];

        // Show the raw rows before ingest finishes. A failure here only keeps stale rows.
        self.refresher.refresh(target.resource()).await;

        self.ingest_tail(run_id, target, messages).await
    }

    /// Re-run ingest, invalidation and refresh without uploading.
    pub async fn run_ingest(&self, target: UploadTarget) -> Result<PipelineOutcome, AppError> {
        let _guard = BusyGuard::acquire(&self.busy, "Upload")?;
        self.ingest_tail(Uuid::new_v4(), target, Vec::new()).await
    }

    async fn ingest_tail(
        &self,
        run_id: Uuid,
        target: UploadTarget,
        mut messages: Vec<String>,
    ) -> Result<PipelineOutcome, AppError> {
        let session = self.refresher.session();

        self.enter(run_id, target, PipelineStage::Ingesting, format!("Ingesting {}", target))
            .await;
        let response = match session.post_empty(target.ingest_endpoint()).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(run_id, target, PipelineStage::Ingesting, e).await),
        };
        messages.push(acknowledgement(&response, format!("Ingested {}", target)));

        self.enter(run_id, target, PipelineStage::Invalidating, "Invalidating server cache")
            .await;
        if let Err(e) = self.refresher.invalidate_cache().await {
            return Err(self.fail(run_id, target, PipelineStage::Invalidating, e).await);
        }

        self.enter(run_id, target, PipelineStage::Refreshing, "Refreshing all resources")
            .await;
        let refresh = self.refresher.refresh_all().await;

        *self.state.write().await = PipelineState::Idle;
        *self.log.write().await = ResultLog::new(messages.clone());
        log::info!("[pipeline] {} run {} complete", target, run_id);
        self.refresher.events().emit(ConsoleEvent::PipelineProgress {
            run_id,
            target,
            state: PipelineState::Idle,
            message: "Pipeline complete".to_string(),
        });

        Ok(PipelineOutcome {
            run_id,
            target,
            messages,
            refresh,
        })
    }

    async fn enter(
        &self,
        run_id: Uuid,
        target: UploadTarget,
        stage: PipelineStage,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let state = PipelineState::Running { stage };
        *self.state.write().await = state.clone();

        log::info!("[pipeline] {} run {}: {}", target, run_id, message);
        self.refresher.events().emit(ConsoleEvent::PipelineProgress {
            run_id,
            target,
            state,
            message,
        });
    }

    /// Record a stage failure and turn it into the error the caller returns.
    async fn fail(
        &self,
        run_id: Uuid,
        target: UploadTarget,
        stage: PipelineStage,
        cause: AppError,
    ) -> AppError {
        let detail = cause.detail();
        let error = AppError::pipeline(stage, detail.clone());
        log::error!("[pipeline] {} run {}: {}", target, run_id, error);

        let state = PipelineState::Failed {
            stage,
            message: detail,
        };
        *self.state.write().await = state.clone();
        *self.log.write().await = ResultLog::single(error.to_string());
        self.refresher.events().emit(ConsoleEvent::PipelineProgress {
            run_id,
            target,
            state,
            message: error.to_string(),
        });

        error
    }
}

fn acknowledgement(response: &HttpResponse, fallback: String) -> String {
    response.message().unwrap_or(fallback)
}
