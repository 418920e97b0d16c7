//! Refresh coordinator.
//!
//! Fans a "reload everything" signal out to every resource fetcher. Used on
//! startup and after any state-changing operation. Calling it repeatedly is
//! always safe.

use crate::error::AppError;
use crate::models::ResourceKind;
use crate::services::events::EventBus;
use crate::services::resources::Resources;
use crate::services::session::Session;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Server-side cache invalidation endpoint.
pub const INVALIDATE_ENDPOINT: &str = "/refresh";

/// Outcome of a full refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<ResourceKind>,
    /// Resources that kept their previous rows.
    pub failed: Vec<ResourceKind>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Handle that reloads all resources.
#[derive(Clone)]
pub struct RefreshCoordinator {
    session: Arc<Session>,
    resources: Arc<Resources>,
    events: EventBus,
}

impl RefreshCoordinator {
    pub fn new(session: Arc<Session>, resources: Arc<Resources>, events: EventBus) -> Self {
        Self {
            session,
            resources,
            events,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Reload all five resources concurrently and wait for every one.
    pub async fn refresh_all(&self) -> RefreshReport {
        let session = self.session.as_ref();
        let events = &self.events;
        let resources = self.resources.as_ref();

        let (info, csv, csv_projects, projects, repos) = futures::join!(
            resources.info.reload(session, events),
            resources.csv.reload(session, events),
            resources.csv_projects.reload(session, events),
            resources.projects.reload(session, events),
            resources.repos.reload(session, events),
        );

        let mut report = RefreshReport::default();
        for (kind, ok) in ResourceKind::ALL
            .into_iter()
            .zip([info, csv, csv_projects, projects, repos])
        {
            if ok {
                report.refreshed.push(kind);
            } else {
                report.failed.push(kind);
            }
        }

        if !report.is_complete() {
            log::warn!("[refresh] Kept stale rows for {:?}", report.failed);
        }
        report
    }

    /// Reload a single resource.
    pub async fn refresh(&self, kind: ResourceKind) -> bool {
        self.resources
            .reload(kind, &self.session, &self.events)
            .await
    }

    /// Start a full refresh without waiting for it.
    pub fn spawn_refresh_all(&self) -> JoinHandle<RefreshReport> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.refresh_all().await })
    }

    /// Ask the server to drop its cached derived data.
    pub async fn invalidate_cache(&self) -> Result<(), AppError> {
        self.session.post_empty(INVALIDATE_ENDPOINT).await?;
        log::info!("[refresh] Server cache invalidated");
        Ok(())
    }

    /// Invalidate the server cache, then reload everything.
    pub async fn invalidate_and_refresh(&self) -> Result<RefreshReport, AppError> {
        self.invalidate_cache().await?;
        Ok(self.refresh_all().await)
    }
}
