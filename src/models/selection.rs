//! Operator selection model.

use crate::models::rows::{ProjectRow, RepoRow, ResourceRow};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which displayed collection a selection was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionScope {
    Projects,
    Repos,
}

impl std::fmt::Display for SelectionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Projects => write!(f, "projects"),
            Self::Repos => write!(f, "repos"),
        }
    }
}

/// One selected entity. Travels on the wire as a `[name, url]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedProject {
    pub name: String,
    pub github_url: String,
}

impl SelectedProject {
    pub fn new(name: impl Into<String>, github_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            github_url: github_url.into(),
        }
    }
}

impl Serialize for SelectedProject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.name, &self.github_url).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SelectedProject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (name, github_url) = <(String, String)>::deserialize(deserializer)?;
        Ok(Self { name, github_url })
    }
}

/// Rows an operator can select for a batch action.
pub trait Selectable: ResourceRow {
    const SCOPE: SelectionScope;

    fn selection_key(&self) -> SelectedProject;
}

impl Selectable for ProjectRow {
    const SCOPE: SelectionScope = SelectionScope::Projects;

    fn selection_key(&self) -> SelectedProject {
        SelectedProject::new(&self.name, &self.github_url)
    }
}

impl Selectable for RepoRow {
    const SCOPE: SelectionScope = SelectionScope::Repos;

    fn selection_key(&self) -> SelectedProject {
        SelectedProject::new(&self.name, &self.github_url)
    }
}

/// Ordered set of selected entities, tied to the collection generation it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub scope: SelectionScope,

    /// Generation of the source collection when the selection was made.
    pub generation: u64,

    pub items: Vec<SelectedProject>,
}

impl Selection {
    pub fn empty(scope: SelectionScope, generation: u64) -> Self {
        Self {
            scope,
            generation,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_project_wire_format() {
        let item = SelectedProject::new("engine", "https://github.com/spark/engine");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"["engine","https://github.com/spark/engine"]"#);

        let back: SelectedProject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_selection_key_from_rows() {
        let project = ProjectRow {
            id: 4,
            name: "loom".to_string(),
            semester: "spring-2025".to_string(),
            github_url: "https://github.com/spark/loom".to_string(),
        };
        assert_eq!(
            project.selection_key(),
            SelectedProject::new("loom", "https://github.com/spark/loom")
        );
    }
}
