//! Row models for the five server resources.
//!
//! Each resource answers with a JSON object holding one named array. Every
//! element is mapped into a typed row by a pure `from_json` function; fields
//! missing from an element become empty strings instead of failing the fetch.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// The server resources a console displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Roster joined with projects.
    Info,
    /// Raw ingested roster rows.
    Csv,
    /// Raw ingested project rows.
    CsvProjects,
    /// Canonical project list.
    Projects,
    /// Repositories on the source-control host.
    Repos,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Info,
        ResourceKind::Csv,
        ResourceKind::CsvProjects,
        ResourceKind::Projects,
        ResourceKind::Repos,
    ];

    /// GET endpoint serving this resource.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Info => "/get_info",
            Self::Csv => "/get_csv",
            Self::CsvProjects => "/get_csv_projects",
            Self::Projects => "/get_projects",
            Self::Repos => "/git/get_all_repos",
        }
    }

    /// Name of the top-level array in the response.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Csv => "csv",
            Self::CsvProjects => "csv_projects",
            Self::Projects => "projects",
            Self::Repos => "repos",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Csv => write!(f, "csv"),
            Self::CsvProjects => write!(f, "csv-projects"),
            Self::Projects => write!(f, "projects"),
            Self::Repos => write!(f, "repos"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "info" => Ok(Self::Info),
            "csv" => Ok(Self::Csv),
            "csv-projects" => Ok(Self::CsvProjects),
            "projects" => Ok(Self::Projects),
            "repos" => Ok(Self::Repos),
            other => Err(AppError::invalid_input_field(
                format!("Unknown resource '{}'", other),
                "resource",
            )),
        }
    }
}

/// A row type backed by one server resource.
pub trait ResourceRow: Clone + Send + Sync + 'static {
    /// Resource this row is read from.
    const KIND: ResourceKind;

    /// Column headers, in display order.
    const COLUMNS: &'static [&'static str];

    /// Build a row from one element of the response array.
    ///
    /// `id` is the element's position; it is only stable within one fetch.
    fn from_json(id: usize, value: &Value) -> Self;

    /// Cell values matching [`Self::COLUMNS`].
    fn cells(&self) -> Vec<String>;
}

/// Map a whole response payload into rows.
///
/// A missing or null collection maps to no rows; any other non-array value
/// is a malformed response.
pub fn map_rows<R: ResourceRow>(payload: &Value) -> Result<Vec<R>, AppError> {
    let key = R::KIND.collection_key();

    if !payload.is_object() {
        return Err(AppError::internal(format!(
            "Expected a JSON object from {}",
            R::KIND.endpoint()
        )));
    }

    match payload.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .enumerate()
            .map(|(id, item)| R::from_json(id, item))
            .collect()),
        Some(_) => Err(AppError::internal(format!(
            "Expected `{}` to be an array in response from {}",
            key,
            R::KIND.endpoint()
        ))),
    }
}

/// Read a field as text. Missing and null map to empty; other scalars are rendered.
fn text(value: &Value, key: &str) -> String {
    render(value.get(key))
}

fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Roster joined with project, from `/get_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRow {
    pub id: usize,
    pub buid: String,
    pub name: String,
    pub email: String,
    pub github: String,
    pub semester: String,
    pub project: String,
    pub github_url: String,
    pub status: String,
}

impl ResourceRow for InfoRow {
    const KIND: ResourceKind = ResourceKind::Info;
    const COLUMNS: &'static [&'static str] = &[
        "id", "project", "github url", "buid", "name", "email", "github", "semester", "status",
    ];

    fn from_json(id: usize, value: &Value) -> Self {
        Self {
            id,
            buid: text(value, "buid"),
            name: text(value, "name"),
            email: text(value, "email"),
            github: text(value, "github"),
            semester: text(value, "semester"),
            project: text(value, "project_name"),
            github_url: text(value, "github_url"),
            status: text(value, "status"),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.project.clone(),
            self.github_url.clone(),
            self.buid.clone(),
            self.name.clone(),
            self.email.clone(),
            self.github.clone(),
            self.semester.clone(),
            self.status.clone(),
        ]
    }
}

/// Raw ingested roster row, from `/get_csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    pub id: usize,
    pub semester: String,
    pub course: String,
    pub project: String,
    pub organization: String,
    pub team: String,
    pub role: String,
    pub fname: String,
    pub lname: String,
    pub name: String,
    pub email: String,
    pub buid: String,
    pub github: String,
    pub status: String,
    pub project_github_url: String,
}

impl ResourceRow for CsvRow {
    const KIND: ResourceKind = ResourceKind::Csv;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "semester",
        "course",
        "project",
        "organization",
        "team",
        "role",
        "fname",
        "lname",
        "name",
        "email",
        "buid",
        "github",
        "status",
        "project github url",
    ];

    fn from_json(id: usize, value: &Value) -> Self {
        Self {
            id,
            semester: text(value, "semester"),
            course: text(value, "course"),
            project: text(value, "project"),
            organization: text(value, "organization"),
            team: text(value, "team"),
            role: text(value, "role"),
            fname: text(value, "fname"),
            lname: text(value, "lname"),
            name: text(value, "name"),
            email: text(value, "email"),
            buid: text(value, "buid"),
            github: text(value, "github"),
            status: text(value, "status"),
            project_github_url: text(value, "project_github_url"),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.semester.clone(),
            self.course.clone(),
            self.project.clone(),
            self.organization.clone(),
            self.team.clone(),
            self.role.clone(),
            self.fname.clone(),
            self.lname.clone(),
            self.name.clone(),
            self.email.clone(),
            self.buid.clone(),
            self.github.clone(),
            self.status.clone(),
            self.project_github_url.clone(),
        ]
    }
}

/// Raw ingested project row, from `/get_csv_projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvProjectRow {
    pub id: usize,
    pub project: String,
    pub semester: String,
    pub project_github_url: String,
    pub status: String,
}

impl ResourceRow for CsvProjectRow {
    const KIND: ResourceKind = ResourceKind::CsvProjects;
    const COLUMNS: &'static [&'static str] =
        &["id", "project", "semester", "project github url", "status"];

    fn from_json(id: usize, value: &Value) -> Self {
        Self {
            id,
            project: text(value, "project"),
            semester: text(value, "semester"),
            project_github_url: text(value, "project_github_url"),
            status: text(value, "status"),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.project.clone(),
            self.semester.clone(),
            self.project_github_url.clone(),
            self.status.clone(),
        ]
    }
}

/// Canonical project, from `/get_projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: usize,
    pub name: String,
    pub semester: String,
    pub github_url: String,
}

impl ResourceRow for ProjectRow {
    const KIND: ResourceKind = ResourceKind::Projects;
    const COLUMNS: &'static [&'static str] = &["id", "name", "github url", "semester"];

    fn from_json(id: usize, value: &Value) -> Self {
        Self {
            id,
            name: text(value, "name"),
            semester: text(value, "semester"),
            github_url: text(value, "github_url"),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.github_url.clone(),
            self.semester.clone(),
        ]
    }
}

/// Repository on the source-control host, from `/git/get_all_repos`.
///
/// The server sends each repository as a `[name, url]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRow {
    pub id: usize,
    pub name: String,
    pub github_url: String,
}

impl ResourceRow for RepoRow {
    const KIND: ResourceKind = ResourceKind::Repos;
    const COLUMNS: &'static [&'static str] = &["id", "name", "github url"];

    fn from_json(id: usize, value: &Value) -> Self {
        if value.is_array() {
            Self {
                id,
                name: render(value.get(0)),
                github_url: render(value.get(1)),
            }
        } else {
            Self {
                id,
                name: text(value, "name"),
                github_url: text(value, "github_url"),
            }
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.github_url.clone(),
        ]
    }
}
