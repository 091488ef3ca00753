//! Item Commands
//!
//! Add, edit and delete items from form input.

use crate::app::Catalog;
use crate::domain::{DomainError, DomainResult, Entity, Item, ItemDraft, ItemForm, ItemId};

impl Catalog {
    /// Validate a form, including that its category exists locally
    fn checked_draft(&self, form: &ItemForm) -> DomainResult<ItemDraft> {
        let draft = form.validate().map_err(|e| self.reject(e))?;
        if let Some(category_id) = &draft.category_id {
            if !self.store.snapshot().has_category(category_id) {
                return Err(self.reject(DomainError::InvalidInput(format!(
                    "Unknown category '{}'",
                    category_id
                ))));
            }
        }
        Ok(draft)
    }

    /// Create an item from the add form
    pub async fn add_item(&self, form: &ItemForm) -> DomainResult<Item> {
        let draft = self.checked_draft(form)?;

        match self.backend.items().create(&draft).await {
            Ok(item) => {
                tracing::info!(item_id = %item.id, "item added");
                self.store.add_item(item.clone());
                Ok(item)
            }
            Err(e) => {
                self.report("add item", &e);
                Err(e)
            }
        }
    }

    /// Save the edit form over an existing item.
    ///
    /// `Ok(None)` when the item disappeared before the save.
    pub async fn update_item(&self, id: &ItemId, form: &ItemForm) -> DomainResult<Option<Item>> {
        let draft = self.checked_draft(form)?;

        if self.store.snapshot().item(id).is_none() {
            tracing::debug!(item_id = %id, "update of unknown item ignored");
            return Ok(None);
        }
        let edited = Item::from_draft(id.clone(), draft);

        match self.backend.items().update(&edited).await {
            Ok(item) => {
                self.store.update_item(item.clone());
                tracing::info!(item_id = %id, "item updated");
                Ok(Some(item))
            }
            Err(e) => {
                self.report("update item", &e);
                Err(e)
            }
        }
    }

    pub async fn delete_item(&self, id: &ItemId) -> DomainResult<()> {
        if let Err(e) = self.backend.items().delete(id).await {
            self.report("delete item", &e);
            return Err(e);
        }
        self.store.remove_item(id);
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::seeded_catalog;
    use crate::app::CatalogEvent;
    use crate::domain::{CategoryId, MISSING_FIELDS_MESSAGE};

    use super::*;

    fn lamp_form() -> ItemForm {
        ItemForm {
            name: "Desk Lamp".to_string(),
            department: "Ops".to_string(),
            issued_date: "2026-01-15".to_string(),
            category_id: Some(CategoryId::new("cat-3")),
            serial_number: "SN004".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_item() {
        let (catalog, script) = seeded_catalog().await;

        let lamp = catalog.add_item(&lamp_form()).await.unwrap();
        assert!(lamp.belongs_to(&CategoryId::new("cat-3")));

        let state = catalog.snapshot();
        assert_eq!(state.items.len(), 4);
        assert_eq!(state.items_in(&CategoryId::new("cat-3")).len(), 2);
        assert_eq!(script.count("create item"), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let (catalog, script) = seeded_catalog().await;
        let mut events = catalog.subscribe();

        let form = ItemForm {
            department: String::new(),
            ..lamp_form()
        };
        let err = catalog.add_item(&form).await.unwrap_err();

        assert_eq!(err, DomainError::InvalidInput(MISSING_FIELDS_MESSAGE.to_string()));
        assert!(script.calls().is_empty());
        assert_eq!(catalog.snapshot().items.len(), 3);
        assert!(matches!(events.try_recv(), Ok(CatalogEvent::Alert(_))));
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let (catalog, script) = seeded_catalog().await;
        let form = ItemForm {
            category_id: Some(CategoryId::new("cat-9")),
            ..lamp_form()
        };

        let err = catalog.add_item(&form).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(ref m) if m.contains("cat-9")));
        assert!(script.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_item_replaces_fields() {
        let (catalog, script) = seeded_catalog().await;
        let pen_id = ItemId::new("item-101");
        let mut form = ItemForm::from_item(catalog.snapshot().item(&pen_id).unwrap());
        form.name = "Red Pen (Gel)".to_string();

        let saved = catalog.update_item(&pen_id, &form).await.unwrap().unwrap();
        assert_eq!(saved.name, "Red Pen (Gel)");
        assert_eq!(catalog.snapshot().item(&pen_id).unwrap().name, "Red Pen (Gel)");
        assert_eq!(script.count("update item"), 1);

        let ghost = catalog.update_item(&ItemId::new("item-999"), &form).await.unwrap();
        assert!(ghost.is_none());
        assert_eq!(script.count("update item"), 1);
    }

    #[tokio::test]
    async fn test_delete_item_failure_keeps_item() {
        let (catalog, script) = seeded_catalog().await;
        let pad = ItemId::new("item-102");
        script.fail(
            "delete item",
            DomainError::Remote {
                status: 500,
                message: "Database unavailable".to_string(),
            },
        );

        assert!(catalog.delete_item(&pad).await.is_err());
        assert!(catalog.snapshot().item(&pad).is_some());
        assert_eq!(
            catalog.last_error().as_deref(),
            Some("Failed to delete item: Database unavailable")
        );

        script.recover("delete item");
        catalog.delete_item(&pad).await.unwrap();
        assert!(catalog.snapshot().item(&pad).is_none());
    }
}
