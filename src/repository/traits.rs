//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for the remote collections.
//! Implementations talk HTTP or keep everything in memory.

use async_trait::async_trait;

use crate::domain::{Category, DomainResult, Entity, Item};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type. Every call returns the store's canonical
/// copy of the record.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// List all entities, in store order
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Create a new entity; the store assigns the id
    async fn create(&self, draft: &T::Draft) -> DomainResult<T>;

    /// Replace an existing entity with the given full field set
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: &T::Id) -> DomainResult<()>;
}

/// The pair of collections a catalog is backed by
pub trait CatalogBackend: Send + Sync {
    fn categories(&self) -> &dyn Repository<Category>;

    fn items(&self) -> &dyn Repository<Item>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
