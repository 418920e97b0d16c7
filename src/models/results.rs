//! Result log model.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Latest human-readable outcome of an operation, one entry per attempted item.
///
/// Each run replaces the whole log; older runs are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultLog {
    pub entries: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResultLog {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries,
            updated_at: Some(Utc::now()),
        }
    }

    /// A log holding one synthetic entry.
    pub fn single(entry: impl Into<String>) -> Self {
        Self::new(vec![entry.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_never_updated() {
        let log = ResultLog::default();
        assert!(log.is_empty());
        assert!(log.updated_at.is_none());
    }

    #[test]
    fn test_single_entry() {
        let log = ResultLog::single("No projects selected");
        assert_eq!(log.entries, vec!["No projects selected"]);
        assert!(log.updated_at.is_some());
    }
}
