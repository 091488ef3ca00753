//! Domain Layer
//!
//! Contains the catalog entities and core abstractions.
//! This layer has no I/O; it only depends on serde, serde_json and chrono.

mod attribute;
mod category;
mod entity;
mod id;
mod item;

pub use attribute::{AttributeValue, Attributes};
pub use category::{Category, CategoryDraft};
pub use entity::{DomainError, DomainResult, Entity};
pub use id::{CategoryId, ItemId};
pub use item::{Item, ItemDraft, ItemForm, MISSING_FIELDS_MESSAGE};
