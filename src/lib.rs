//! Asset Catalog
//!
//! Layered architecture:
//! - domain: Entities, ids and validation rules
//! - repository: Remote collection client (HTTP) and the in-memory backend
//! - store: Shared in-memory catalog state
//! - commands: Catalog command handlers (CRUD, drag reconciliation, cascade)
//! - session: Authentication gate with idle expiry

pub mod app;
pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;
pub mod session;
pub mod store;

pub use app::{Catalog, CatalogEvent, LoadState};
pub use catalog_dragdrop::{interpret, DragEnd, DragKind, MoveIntent, CATEGORY_BOARD_ID};
pub use commands::DragOutcome;
pub use config::{BackendMode, CatalogConfig, ConfigError, ReassignFailurePolicy};
pub use domain::{Category, CategoryId, DomainError, DomainResult, Item, ItemForm, ItemId};
pub use session::{Session, SessionState};
pub use store::{CatalogState, EntityStore};
