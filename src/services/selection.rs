//! Selection tracker.
//!
//! Maps row indices from the displayed collection into `(name, url)` pairs.
//! A selection remembers the collection generation it was taken from and
//! is dropped as soon as that collection has been reloaded.

use crate::error::AppError;
use crate::models::{Selectable, SelectedProject, Selection, SelectionScope};
use crate::services::resources::CollectionSnapshot;
use std::sync::Mutex;

/// Current selection over one collection.
#[derive(Debug)]
pub struct SelectionTracker {
    scope: SelectionScope,
    current: Mutex<Selection>,
}

impl SelectionTracker {
    pub fn new(scope: SelectionScope) -> Self {
        Self {
            scope,
            current: Mutex::new(Selection::empty(scope, 0)),
        }
    }

    pub fn scope(&self) -> SelectionScope {
        self.scope
    }

    /// Replace the selection with the rows at `indices` in `snapshot`.
    ///
    /// Order follows `indices`; repeated indices are kept once. An index
    /// outside the snapshot rejects the whole change and leaves the
    /// previous selection untouched.
    pub fn on_selection_change<R: Selectable>(
        &self,
        indices: &[usize],
        snapshot: &CollectionSnapshot<R>,
    ) -> Result<Selection, AppError> {
        if R::SCOPE != self.scope {
            return Err(AppError::internal(format!(
                "Cannot select {} rows in the {} table",
                R::SCOPE,
                self.scope
            )));
        }

        let mut items: Vec<SelectedProject> = Vec::with_capacity(indices.len());
        for &index in indices {
            let row = snapshot.rows.get(index).ok_or_else(|| {
                AppError::invalid_input_field(
                    format!(
                        "Row {} is out of range ({} {} rows)",
                        index,
                        snapshot.rows.len(),
                        self.scope
                    ),
                    "select",
                )
            })?;
            let key = row.selection_key();
            if !items.contains(&key) {
                items.push(key);
            }
        }

        let selection = Selection {
            scope: self.scope,
            generation: snapshot.generation,
            items,
        };
        *self.lock() = selection.clone();
        Ok(selection)
    }

    /// The selection, or an empty one if the collection has moved past it.
    pub fn current(&self, live_generation: u64) -> Selection {
        let mut current = self.lock();
        if current.generation != live_generation {
            if !current.is_empty() {
                log::debug!(
                    "[selection] Dropping stale {} selection ({} items)",
                    self.scope,
                    current.len()
                );
            }
            *current = Selection::empty(self.scope, live_generation);
        }
        current.clone()
    }

    pub fn clear(&self) {
        let mut current = self.lock();
        let generation = current.generation;
        *current = Selection::empty(self.scope, generation);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Selection> {
        // Selection is replaced whole, so a poisoned value is still consistent.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
