//! Console wiring.
//!
//! [`Console`] owns one instance of every component and hands out
//! references to the command handlers. All components share the same
//! session, resources and event bus.

use crate::config::ConsoleConfig;
use crate::error::AppError;
use crate::models::{BatchAction, BatchSurface, ResultLog, Selection};
use crate::services::api_client::{ApiClient, ApiClientConfig};
use crate::services::batch::BatchController;
use crate::services::credentials::CredentialStore;
use crate::services::events::EventBus;
use crate::services::membership::MembershipProcessor;
use crate::services::pipeline::UploadPipeline;
use crate::services::refresh::RefreshCoordinator;
use crate::services::resources::Resources;
use crate::services::selection::SelectionTracker;
use crate::services::session::Session;
use crate::services::transport::Transport;
use std::sync::Arc;

pub struct Console {
    config: ConsoleConfig,
    events: EventBus,
    session: Arc<Session>,
    refresher: RefreshCoordinator,
    pipeline: UploadPipeline,
    membership: MembershipProcessor,
    project_selection: SelectionTracker,
    repo_selection: SelectionTracker,
    project_batch: BatchController,
    repo_batch: BatchController,
}

impl Console {
    /// Build a console over any transport, restoring a persisted session.
    pub fn new(config: ConsoleConfig, transport: Arc<dyn Transport>) -> Result<Self, AppError> {
        let events = EventBus::new();
        let store = CredentialStore::new(config.store_path.clone());
        let session = Arc::new(Session::restore(transport, store, events.clone())?);
        let refresher =
            RefreshCoordinator::new(session.clone(), Arc::new(Resources::new()), events.clone());

        Ok(Self {
            pipeline: UploadPipeline::new(refresher.clone()),
            membership: MembershipProcessor::new(refresher.clone()),
            project_selection: SelectionTracker::new(BatchSurface::Projects.scope()),
            repo_selection: SelectionTracker::new(BatchSurface::Repos.scope()),
            project_batch: BatchController::new(BatchSurface::Projects, refresher.clone()),
            repo_batch: BatchController::new(BatchSurface::Repos, refresher.clone()),
            config,
            events,
            session,
            refresher,
        })
    }

    /// Build a console talking HTTP to `config.api_url`.
    pub fn with_http(config: ConsoleConfig) -> Result<Self, AppError> {
        let client = ApiClient::new(ApiClientConfig {
            base_url: config.api_url.clone(),
            timeout_secs: config.timeout_secs,
        })?;
        Self::new(config, Arc::new(client))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    pub fn resources(&self) -> &Resources {
        self.refresher.resources()
    }

    pub fn pipeline(&self) -> &UploadPipeline {
        &self.pipeline
    }

    pub fn membership(&self) -> &MembershipProcessor {
        &self.membership
    }

    pub fn selection(&self, surface: BatchSurface) -> &SelectionTracker {
        match surface {
            BatchSurface::Projects => &self.project_selection,
            BatchSurface::Repos => &self.repo_selection,
        }
    }

    pub fn batch(&self, surface: BatchSurface) -> &BatchController {
        match surface {
            BatchSurface::Projects => &self.project_batch,
            BatchSurface::Repos => &self.repo_batch,
        }
    }

    /// Select rows of a table by position in its current collection.
    pub async fn select(
        &self,
        surface: BatchSurface,
        indices: &[usize],
    ) -> Result<Selection, AppError> {
        let resources = self.resources();
        match surface {
            BatchSurface::Projects => {
                let snapshot = resources.projects.snapshot().await;
                self.project_selection.on_selection_change(indices, &snapshot)
            }
            BatchSurface::Repos => {
                let snapshot = resources.repos.snapshot().await;
                self.repo_selection.on_selection_change(indices, &snapshot)
            }
        }
    }

    /// The table's selection, empty if its collection has since been reloaded.
    pub async fn current_selection(&self, surface: BatchSurface) -> Selection {
        let generation = match surface {
            BatchSurface::Projects => self.resources().projects.generation().await,
            BatchSurface::Repos => self.resources().repos.generation().await,
        };
        self.selection(surface).current(generation)
    }

    /// Apply a batch action to the table's current selection.
    pub async fn apply(
        &self,
        surface: BatchSurface,
        action: BatchAction,
    ) -> Result<ResultLog, AppError> {
        let selection = self.current_selection(surface).await;
        self.batch(surface).apply(action, &selection).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::services::transport::mock::MockTransport;
    use crate::services::transport::Method;
    use serde_json::json;

    /// Console over a mock with a persisted login.
    pub(crate) fn console(mock: Arc<MockTransport>) -> (Console, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig {
            store_path: dir.path().join("session.json"),
            ..ConsoleConfig::default()
        };
        CredentialStore::new(config.store_path.clone())
            .save(&Credential::new("admin", "hunter2"))
            .unwrap();
        (Console::new(config, mock).unwrap(), dir)
    }

    fn projects(names: &[&str]) -> serde_json::Value {
        let rows: Vec<_> = names
            .iter()
            .map(|n| json!({ "name": n, "github_url": format!("https://github.com/spark/{}", n) }))
            .collect();
        json!({ "projects": rows })
    }

    #[tokio::test]
    async fn test_select_then_apply() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/get_projects", 200, projects(&["engine", "loom", "atlas"]));
        mock.respond(Method::Post, "/set_projects", 200, json!({ "results": ["a", "b"] }));
        let (console, _dir) = console(mock.clone());
        console.resources().projects.reload(console.session(), console.events()).await;

        let selection = console.select(BatchSurface::Projects, &[0, 2]).await.unwrap();
        assert_eq!(selection.len(), 2);

        console.batch(BatchSurface::Projects).set_locked(false);
        let log = console
            .apply(BatchSurface::Projects, BatchAction::Pull)
            .await
            .unwrap();
        assert_eq!(log.entries, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_reload_drops_selection_before_apply() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/get_projects", 200, projects(&["engine", "loom"]));
        let (console, _dir) = console(mock.clone());
        console.refresher().refresh_all().await;
        console.select(BatchSurface::Projects, &[1]).await.unwrap();

        console.refresher().refresh_all().await;
        console.batch(BatchSurface::Projects).set_locked(false);
        let log = console
            .apply(BatchSurface::Projects, BatchAction::Push)
            .await
            .unwrap();

        assert_eq!(log.entries, vec!["No projects selected"]);
        assert_eq!(mock.calls(Method::Post, "/set_projects"), 0);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/get_projects", 200, projects(&["engine"]));
        mock.respond(Method::Get, "/git/get_all_repos", 200, json!({ "repos": [["engine", "u"]] }));
        let (console, _dir) = console(mock.clone());
        console.refresher().refresh_all().await;

        console.select(BatchSurface::Repos, &[0]).await.unwrap();
        console.batch(BatchSurface::Repos).toggle_lock();

        assert!(console.current_selection(BatchSurface::Projects).await.is_empty());
        assert_eq!(console.current_selection(BatchSurface::Repos).await.len(), 1);
        assert!(console.batch(BatchSurface::Projects).is_locked());
        assert!(!console.batch(BatchSurface::Repos).is_locked());
    }
}
