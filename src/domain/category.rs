//! Category Entity
//!
//! User-defined groups items are sorted into. The order of the category
//! collection is the board order.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::id::CategoryId;

/// A category column on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Fields sent when creating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
}

impl CategoryDraft {
    /// Trim the name and reject blank ones
    pub fn new(name: &str) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput(
                "Category name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl Entity for Category {
    type Id = CategoryId;
    type Draft = CategoryDraft;

    const KIND: &'static str = "category";
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self {
        Self {
            id,
            name: draft.name,
        }
    }
}
