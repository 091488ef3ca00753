//! Category Commands
//!
//! Create, rename and delete categories. Deleting cascades: the category's
//! items become unassigned in the same store commit that drops it.

use crate::app::Catalog;
use crate::domain::{Category, CategoryDraft, CategoryId, DomainResult};

impl Catalog {
    /// Create a category and append it to the board
    pub async fn add_category(&self, name: &str) -> DomainResult<Category> {
        let draft = CategoryDraft::new(name).map_err(|e| self.reject(e))?;

        match self.backend.categories().create(&draft).await {
            Ok(category) => {
                tracing::info!(category_id = %category.id, name = %category.name, "category added");
                self.store.add_category(category.clone());
                Ok(category)
            }
            Err(e) => {
                self.report("add category", &e);
                Err(e)
            }
        }
    }

    /// Rename a category in place. `Ok(None)` when it no longer exists locally.
    pub async fn rename_category(&self, id: &CategoryId, name: &str) -> DomainResult<Option<Category>> {
        let draft = CategoryDraft::new(name).map_err(|e| self.reject(e))?;

        let Some(existing) = self.store.snapshot().category(id).cloned() else {
            tracing::debug!(category_id = %id, "rename of unknown category ignored");
            return Ok(None);
        };
        let renamed = Category {
            name: draft.name,
            ..existing
        };

        match self.backend.categories().update(&renamed).await {
            Ok(category) => {
                self.store.update_category(category.clone());
                tracing::info!(category_id = %id, name = %category.name, "category renamed");
                Ok(Some(category))
            }
            Err(e) => {
                self.report("rename category", &e);
                Err(e)
            }
        }
    }

    /// Delete a category remotely, then drop it and orphan its items locally.
    ///
    /// Returns how many items became unassigned. A remote failure aborts
    /// before anything local changes.
    pub async fn delete_category(&self, id: &CategoryId) -> DomainResult<usize> {
        if let Err(e) = self.backend.categories().delete(id).await {
            self.report("delete category", &e);
            return Err(e);
        }

        let orphaned = self.store.remove_category(id).unwrap_or(0);
        tracing::info!(category_id = %id, orphaned, "category deleted");
        Ok(orphaned)
    }
}
