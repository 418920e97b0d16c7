//! Batch permission mutation models.

use crate::error::AppError;
use crate::models::selection::{SelectedProject, SelectionScope};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Permission level requested for every selected repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    /// Write access.
    Push,
    /// Read-only access.
    Pull,
}

impl std::fmt::Display for BatchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
        }
    }
}

impl FromStr for BatchAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            other => Err(AppError::invalid_input_field(
                format!("Unknown action '{}', expected push or pull", other),
                "action",
            )),
        }
    }
}

/// Table a batch action is issued from. Each has its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSurface {
    /// Canonical project list.
    Projects,
    /// Raw repository list from the source-control host.
    Repos,
}

impl BatchSurface {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Projects => "/set_projects",
            Self::Repos => "/git/set_projects",
        }
    }

    pub fn scope(self) -> SelectionScope {
        match self {
            Self::Projects => SelectionScope::Projects,
            Self::Repos => SelectionScope::Repos,
        }
    }
}

impl std::fmt::Display for BatchSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.scope().fmt(f)
    }
}

impl FromStr for BatchSurface {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "projects" => Ok(Self::Projects),
            "repos" => Ok(Self::Repos),
            other => Err(AppError::invalid_input_field(
                format!("Unknown surface '{}', expected projects or repos", other),
                "surface",
            )),
        }
    }
}

/// Body of a batch mutation call.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    pub action: BatchAction,
    pub projects: &'a [SelectedProject],
}
