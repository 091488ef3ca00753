//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for catalog entities.
//! All entities have a unique ID and are thread-safe.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone + Debug + Serialize + DeserializeOwned + 'static {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + Hash + Debug + Display + From<String> + Send + Sync + 'static;

    /// Field set sent when creating the entity (everything but the id)
    type Draft: Clone + Debug + Serialize + Send + Sync + 'static;

    /// Singular name used in logs and error messages
    const KIND: &'static str;

    /// Collection name on the remote store
    const COLLECTION: &'static str;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;

    /// Build the stored record from a draft once an id is known
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Non-success answer from the remote store
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// Request never produced a response
    #[error("Network error: {0}")]
    Transport(String),
    /// Response arrived but could not be decoded
    #[error("Unexpected response: {0}")]
    Format(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}
