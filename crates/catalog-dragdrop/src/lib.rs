//! Catalog DragDrop Utilities
//!
//! Turns a finished drag gesture into a typed move intent.
//! Pointer tracking and animation belong to the view layer; this crate only
//! sees the drag-end result.

use serde::{Deserialize, Serialize};

/// Container id of the horizontal board that holds the category columns.
/// Only category drags may land here.
pub const CATEGORY_BOARD_ID: &str = "all-categories";

/// What was being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    /// A whole category column
    Category,
    /// A single item card
    Item,
}

/// Where the drag started
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSource {
    pub index: usize,
}

/// Where the drag was released
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropDestination {
    pub index: usize,
    pub container_id: String,
}

/// Completed drag gesture as reported by the view layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub source: DragSource,
    /// None when the drag was cancelled or dropped outside any target
    #[serde(default)]
    pub destination: Option<DropDestination>,
    pub kind: DragKind,
    pub dragged_id: String,
}

impl DragEnd {
    /// Drag of a category column from one board slot to another
    pub fn category(dragged_id: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            source: DragSource { index: from },
            destination: Some(DropDestination {
                index: to,
                container_id: CATEGORY_BOARD_ID.to_string(),
            }),
            kind: DragKind::Category,
            dragged_id: dragged_id.into(),
        }
    }

    /// Drag of an item card into a category column
    pub fn item(dragged_id: impl Into<String>, container_id: impl Into<String>, index: usize) -> Self {
        Self {
            source: DragSource { index: 0 },
            destination: Some(DropDestination {
                index,
                container_id: container_id.into(),
            }),
            kind: DragKind::Item,
            dragged_id: dragged_id.into(),
        }
    }

    /// Drop outside any target
    pub fn cancelled(kind: DragKind, dragged_id: impl Into<String>, from: usize) -> Self {
        Self {
            source: DragSource { index: from },
            destination: None,
            kind,
            dragged_id: dragged_id.into(),
        }
    }
}

/// Typed state change requested by a drag
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveIntent {
    /// Move the category at `from_index` to `to_index` in the board order
    ReorderCategories { from_index: usize, to_index: usize },
    /// Put the item into another category
    ReassignItemCategory { item_id: String, new_category_id: String },
}

/// Interpret a drag-end event.
///
/// Indices are passed through untouched; the caller applies them to the
/// current state. Item drops only look at the destination container, so a
/// drop at another index of the same column resolves to the item's current
/// category.
pub fn interpret(event: &DragEnd) -> Option<MoveIntent> {
    let destination = event.destination.as_ref()?;

    match event.kind {
        DragKind::Category => Some(MoveIntent::ReorderCategories {
            from_index: event.source.index,
            to_index: destination.index,
        }),
        DragKind::Item => {
            if destination.container_id == CATEGORY_BOARD_ID {
                return None;
            }
            Some(MoveIntent::ReassignItemCategory {
                item_id: event.dragged_id.clone(),
                new_category_id: destination.container_id.clone(),
            })
        }
    }
}

/// Single-element list move.
///
/// Removes the element at `from` and inserts it at `to`, where `to` is read in
/// the post-removal index space. `to` past the end lands on the last slot.
/// Returns false (list untouched) when `from` is out of range or the element
/// would stay where it is.
pub fn reorder<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= list.len() {
        return false;
    }
    let to = to.min(list.len() - 1);
    if from == to {
        return false;
    }
    let moved = list.remove(from);
    list.insert(to, moved);
    true
}
