//! Data models for the console.
//!
//! These models represent the rows read from the roster backend, the
//! operator's selection, and the bodies of mutating calls. All of them
//! derive Serialize so any front end can render them.

pub mod batch;
pub mod credential;
pub mod results;
pub mod rows;
pub mod selection;

// Re-exports for convenient access
pub use batch::{BatchAction, BatchRequest, BatchSurface};
pub use credential::Credential;
pub use results::ResultLog;
pub use rows::{
    map_rows, CsvProjectRow, CsvRow, InfoRow, ProjectRow, RepoRow, ResourceKind, ResourceRow,
};
pub use selection::{Selectable, SelectedProject, Selection, SelectionScope};
