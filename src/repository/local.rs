//! In-Memory Repository Implementation
//!
//! Local-only backend used when the catalog runs without a server.
//! Ids are client-generated timestamp tokens (`item-1734000000000`).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::domain::{Category, CategoryId, DomainError, DomainResult, Entity, Item};
use super::traits::{CatalogBackend, Repository};

/// One in-memory collection, kept in insertion order
pub struct LocalCollection<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Entity> LocalCollection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn next_id(records: &[T]) -> T::Id {
        let base = format!("{}-{}", T::KIND, chrono::Utc::now().timestamp_millis());
        let mut candidate = base.clone();
        let mut n = 1;
        while records.iter().any(|r| r.id().to_string() == candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        T::Id::from(candidate)
    }

    fn not_found(id: &T::Id) -> DomainError {
        DomainError::NotFound(format!("{} {} not found", T::KIND, id))
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for LocalCollection<T> {
    async fn list(&self) -> DomainResult<Vec<T>> {
        Ok(self.records.lock().clone())
    }

    async fn create(&self, draft: &T::Draft) -> DomainResult<T> {
        let mut records = self.records.lock();
        let id = Self::next_id(&records);
        let entity = T::from_draft(id, draft.clone());
        records.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let mut records = self.records.lock();
        let slot = records
            .iter_mut()
            .find(|r| r.id() == entity.id())
            .ok_or_else(|| Self::not_found(entity.id()))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: &T::Id) -> DomainResult<()> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

/// Category collection that orphans the local items of a deleted category
pub struct LocalCategories {
    inner: LocalCollection<Category>,
    items: Arc<LocalCollection<Item>>,
}

#[async_trait]
impl Repository<Category> for LocalCategories {
    async fn list(&self) -> DomainResult<Vec<Category>> {
        self.inner.list().await
    }

    async fn create(&self, draft: &<Category as Entity>::Draft) -> DomainResult<Category> {
        self.inner.create(draft).await
    }

    async fn update(&self, entity: &Category) -> DomainResult<Category> {
        self.inner.update(entity).await
    }

    async fn delete(&self, id: &CategoryId) -> DomainResult<()> {
        self.inner.delete(id).await?;
        for item in self.items.records.lock().iter_mut() {
            if item.belongs_to(id) {
                item.category_id = None;
            }
        }
        Ok(())
    }
}

/// Catalog kept entirely in process memory
pub struct LocalBackend {
    categories: LocalCategories,
    items: Arc<LocalCollection<Item>>,
}

impl LocalBackend {
    pub fn new(categories: Vec<Category>, items: Vec<Item>) -> Self {
        let items = Arc::new(LocalCollection::new(items));
        Self {
            categories: LocalCategories {
                inner: LocalCollection::new(categories),
                items: items.clone(),
            },
            items,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Backend preloaded with the demo catalog
    pub fn seeded() -> Self {
        let (categories, items) = seed_data();
        Self::new(categories, items)
    }
}

impl CatalogBackend for LocalBackend {
    fn categories(&self) -> &dyn Repository<Category> {
        &self.categories
    }

    fn items(&self) -> &dyn Repository<Item> {
        self.items.as_ref()
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}

/// Demo catalog: three stationery categories, one item in each
pub fn seed_data() -> (Vec<Category>, Vec<Item>) {
    let categories = vec![
        Category::new("cat-1", "Writing Tools"),
        Category::new("cat-2", "Paper Products"),
        Category::new("cat-3", "Desk Accessories"),
    ];

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let items = vec![
        Item::new("item-101", "Blue Pen (Gel)", "HR", date(2025, 11, 1))
            .in_category("cat-1")
            .with_serial("SN001"),
        Item::new("item-102", "A4 Ruled Pad", "IT", date(2025, 11, 20))
            .in_category("cat-2")
            .with_serial("SN002"),
        Item::new("item-103", "Stapler (Heavy Duty)", "Finance", date(2025, 12, 5))
            .in_category("cat-3")
            .with_serial("SN003"),
    ];

    (categories, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryDraft, ItemForm};

    #[tokio::test]
    async fn test_seeded_lists_demo_catalog() {
        let backend = LocalBackend::seeded();
        let categories = backend.categories().list().await.unwrap();
        let items = backend.items().list().await.unwrap();

        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Writing Tools", "Paper Products", "Desk Accessories"]);
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_create_generates_unique_timestamp_ids() {
        let backend = LocalBackend::empty();
        let draft = CategoryDraft::new("Tools").unwrap();

        let a = backend.categories().create(&draft).await.unwrap();
        let b = backend.categories().create(&draft).await.unwrap();
        assert!(a.id.as_str().starts_with("category-"));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let backend = LocalBackend::empty();
        let form = ItemForm {
            name: "Lamp".to_string(),
            department: "Ops".to_string(),
            issued_date: "2025-01-02".to_string(),
            ..Default::default()
        };
        let ghost = Item::from_draft("item-x".into(), form.validate().unwrap());

        let err = backend.items().update(&ghost).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_category_orphans_local_items() {
        let backend = LocalBackend::seeded();
        backend.categories().delete(&CategoryId::new("cat-2")).await.unwrap();

        let items = backend.items().list().await.unwrap();
        let pad = items.iter().find(|i| i.id.as_str() == "item-102").unwrap();
        assert!(pad.is_unassigned());

        let err = backend.categories().delete(&CategoryId::new("cat-2")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
