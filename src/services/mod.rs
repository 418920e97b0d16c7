//! Business logic services.
//!
//! This module contains the orchestration engine: the authenticated
//! session, the resource fetchers, the upload pipeline, selection
//! tracking and batch mutations.
//!
//! Services only talk to the backend through the [`transport::Transport`]
//! seam, so every one of them can be tested against a recording mock.

pub mod api_client;
pub mod batch;
pub mod busy;
pub mod credentials;
pub mod events;
pub mod membership;
pub mod pipeline;
pub mod refresh;
pub mod resources;
pub mod selection;
pub mod session;
pub mod transport;

pub use api_client::{ApiClient, ApiClientConfig};
pub use batch::BatchController;
pub use credentials::CredentialStore;
pub use events::{ConsoleEvent, EventBus};
pub use membership::MembershipProcessor;
pub use pipeline::{PipelineStage, PipelineState, UploadPipeline, UploadTarget};
pub use refresh::{RefreshCoordinator, RefreshReport};
pub use resources::{CollectionSnapshot, ResourceFetcher, Resources};
pub use selection::SelectionTracker;
pub use session::Session;
pub use transport::{Transport, UploadFile};
