//! Roster to repository membership processing.
//!
//! `POST /process` asks the backend to apply roster changes to repository
//! collaborators. The backend keeps a log of earlier runs that can be read
//! back with `GET /get_results`.

use crate::error::AppError;
use crate::models::ResultLog;
use crate::services::busy::BusyGuard;
use crate::services::refresh::RefreshCoordinator;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use tokio::sync::RwLock;

pub const PROCESS_ENDPOINT: &str = "/process";
pub const RESULTS_ENDPOINT: &str = "/get_results";

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    status: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RunLogResponse {
    #[serde(default)]
    results: Vec<RunLogEntry>,
}

#[derive(Debug, Deserialize)]
struct RunLogEntry {
    #[serde(default)]
    result: Value,
}

pub struct MembershipProcessor {
    refresher: RefreshCoordinator,
    busy: AtomicBool,
    log: RwLock<ResultLog>,
}

impl MembershipProcessor {
    pub fn new(refresher: RefreshCoordinator) -> Self {
        Self {
            refresher,
            busy: AtomicBool::new(false),
            log: RwLock::new(ResultLog::default()),
        }
    }

    pub async fn results(&self) -> ResultLog {
        self.log.read().await.clone()
    }

    /// Run membership processing, then refresh everything.
    ///
    /// A failed call leaves one synthetic entry in the log and is returned
    /// as an error; the refresh still happens.
    pub async fn process(&self) -> Result<ResultLog, AppError> {
        let _guard = BusyGuard::acquire(&self.busy, "Processing")?;
        log::info!("[process] Applying roster changes");

        let outcome = match self.refresher.session().post_empty(PROCESS_ENDPOINT).await {
            Ok(response) => response.json::<ProcessResponse>(),
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(body) => {
                let log = ResultLog::new(body.status.iter().map(line).collect());
                log::info!("[process] {} status line(s)", log.entries.len());
                *self.log.write().await = log.clone();
                Ok(log)
            }
            Err(e) => {
                log::error!("[process] Processing failed: {}", e);
                *self.log.write().await =
                    ResultLog::single(format!("Error processing roster {}", e.detail()));
                Err(e)
            }
        };

        self.refresher.refresh_all().await;
        result
    }

    /// Read the backend's log of earlier processing runs.
    pub async fn fetch_results(&self) -> Result<Vec<String>, AppError> {
        let payload = self.refresher.session().get_json(RESULTS_ENDPOINT).await?;
        let body: RunLogResponse = serde_json::from_value(payload)?;
        Ok(body.results.iter().map(|entry| line(&entry.result)).collect())
    }
}

fn line(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
