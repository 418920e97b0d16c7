//! Resource fetchers.
//!
//! One fetcher per server resource. Each owns its row collection and its
//! own loading flag, so a slow resource never holds back a faster one. A
//! failed reload is logged and leaves the previous rows in place.

use crate::error::AppError;
use crate::models::{
    map_rows, CsvProjectRow, CsvRow, InfoRow, ProjectRow, RepoRow, ResourceKind, ResourceRow,
};
use crate::services::events::{ConsoleEvent, EventBus};
use crate::services::session::Session;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rows as they were at one instant, tagged with the collection generation.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<R> {
    /// Bumped every time a reload replaces the rows.
    pub generation: u64,
    pub rows: Arc<Vec<R>>,
}

#[derive(Debug)]
struct SlotState<R> {
    rows: Arc<Vec<R>>,
    generation: u64,
    in_flight: usize,
    /// Ticket handed to the most recent reload.
    issued: u64,
    /// Ticket of the reload whose rows are currently held.
    applied: u64,
    last_error: Option<String>,
}

/// Fetcher and holder for one resource's rows.
#[derive(Debug)]
pub struct ResourceFetcher<R: ResourceRow> {
    state: RwLock<SlotState<R>>,
}

impl<R: ResourceRow> Default for ResourceFetcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceRow> ResourceFetcher<R> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SlotState {
                rows: Arc::new(Vec::new()),
                generation: 0,
                in_flight: 0,
                issued: 0,
                applied: 0,
                last_error: None,
            }),
        }
    }

    /// GET the resource and map it into rows. Does not touch held state.
    pub async fn fetch(session: &Session) -> Result<Vec<R>, AppError> {
        let payload = session.get_json(R::KIND.endpoint()).await?;
        map_rows(&payload)
    }

    /// Re-fetch and replace the held rows.
    ///
    /// # Returns
    /// `true` if the held rows are current once the call ends: either this
    /// response replaced them or a later reload already did. Failures are
    /// logged and keep the previous rows.
    pub async fn reload(&self, session: &Session, events: &EventBus) -> bool {
        let ticket = {
            let mut state = self.state.write().await;
            state.in_flight += 1;
            state.issued += 1;
            state.issued
        };

        let outcome = Self::fetch(session).await;

        let mut state = self.state.write().await;
        state.in_flight -= 1;

        match outcome {
            // A reload issued later already landed; these rows are older.
            Ok(_) if ticket < state.applied => {
                log::debug!("[fetch] Discarding superseded {} response", R::KIND);
                true
            }
            Ok(rows) => {
                let row_count = rows.len();
                state.rows = Arc::new(rows);
                state.generation += 1;
                state.applied = ticket;
                state.last_error = None;
                drop(state);

                log::info!("[fetch] Loaded {} {} rows", row_count, R::KIND);
                events.emit(ConsoleEvent::ResourceReloaded {
                    kind: R::KIND,
                    row_count,
                    success: true,
                });
                true
            }
            Err(e) => {
                let row_count = state.rows.len();
                state.last_error = Some(e.to_string());
                drop(state);

                log::error!("[fetch] Error fetching {}: {}", R::KIND, e);
                events.emit(ConsoleEvent::ResourceReloaded {
                    kind: R::KIND,
                    row_count,
                    success: false,
                });
                false
            }
        }
    }

    pub async fn snapshot(&self) -> CollectionSnapshot<R> {
        let state = self.state.read().await;
        CollectionSnapshot {
            generation: state.generation,
            rows: state.rows.clone(),
        }
    }

    pub async fn rows(&self) -> Arc<Vec<R>> {
        self.state.read().await.rows.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Whether any reload of this resource is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    /// Error from the most recent failed reload, cleared by a successful one.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }
}

/// All five resource collections.
#[derive(Debug, Default)]
pub struct Resources {
    pub info: ResourceFetcher<InfoRow>,
    pub csv: ResourceFetcher<CsvRow>,
    pub csv_projects: ResourceFetcher<CsvProjectRow>,
    pub projects: ResourceFetcher<ProjectRow>,
    pub repos: ResourceFetcher<RepoRow>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload one resource by kind.
    pub async fn reload(&self, kind: ResourceKind, session: &Session, events: &EventBus) -> bool {
        match kind {
            ResourceKind::Info => self.info.reload(session, events).await,
            ResourceKind::Csv => self.csv.reload(session, events).await,
            ResourceKind::CsvProjects => self.csv_projects.reload(session, events).await,
            ResourceKind::Projects => self.projects.reload(session, events).await,
            ResourceKind::Repos => self.repos.reload(session, events).await,
        }
    }

    pub async fn is_loading(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Info => self.info.is_loading().await,
            ResourceKind::Csv => self.csv.is_loading().await,
            ResourceKind::CsvProjects => self.csv_projects.is_loading().await,
            ResourceKind::Projects => self.projects.is_loading().await,
            ResourceKind::Repos => self.repos.is_loading().await,
        }
    }

    pub async fn last_error(&self, kind: ResourceKind) -> Option<String> {
        match kind {
            ResourceKind::Info => self.info.last_error().await,
            ResourceKind::Csv => self.csv.last_error().await,
            ResourceKind::CsvProjects => self.csv_projects.last_error().await,
            ResourceKind::Projects => self.projects.last_error().await,
            ResourceKind::Repos => self.repos.last_error().await,
        }
    }
}
