//! Drag Commands
//!
//! Turns a finished drag gesture into a store change and, for item moves,
//! a remote update. Reassignment is optimistic: the store changes before the
//! remote call and the configured policy decides what a failure undoes.
//! Under `Revert` the item returns to the last category the remote accepted.

use catalog_dragdrop::{interpret, DragEnd, MoveIntent};
use tokio::task::JoinHandle;

use crate::app::{Catalog, CatalogEvent};
use crate::config::ReassignFailurePolicy;
use crate::domain::{CategoryId, DomainError, Item, ItemId};
use crate::store::Reassignment;

/// What a drag gesture ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Cancelled drop or a drop target that takes nothing
    NoIntent,
    CategoriesReordered { from: usize, to: usize },
    /// Intent understood but nothing to change (same slot, same category,
    /// or the item/category is gone)
    Unchanged,
    /// Moved locally and confirmed by the remote
    ItemReassigned { item: Item },
    /// Moved locally, remote update failed
    ReassignFailed {
        item_id: ItemId,
        error: DomainError,
        reverted: bool,
    },
}

/// Local half of a drag: either finished, or a move awaiting the remote
enum Applied {
    Done(DragOutcome),
    Sync(Reassignment),
}

impl Catalog {
    /// Handle the end of a drag gesture
    pub async fn on_drag_end(&self, event: DragEnd) -> DragOutcome {
        match self.apply_drag_end(&event) {
            Applied::Done(outcome) => outcome,
            Applied::Sync(moved) => self.sync_reassignment(moved).await,
        }
    }

    /// Fire-and-forget variant for event loops that must not wait on the remote.
    ///
    /// The store change is committed before this returns; only the remote
    /// update runs on the spawned task.
    pub fn spawn_drag_end(&self, event: DragEnd) -> JoinHandle<DragOutcome> {
        match self.apply_drag_end(&event) {
            Applied::Done(outcome) => tokio::spawn(async move { outcome }),
            Applied::Sync(moved) => {
                let catalog = self.clone();
                tokio::spawn(async move { catalog.sync_reassignment(moved).await })
            }
        }
    }

    pub async fn apply_intent(&self, intent: MoveIntent) -> DragOutcome {
        match self.apply_move(intent) {
            Applied::Done(outcome) => outcome,
            Applied::Sync(moved) => self.sync_reassignment(moved).await,
        }
    }

    /// Move a category column. Board order is local only.
    pub fn reorder_categories(&self, from: usize, to: usize) -> DragOutcome {
        if self.store.move_category(from, to) {
            tracing::debug!(from, to, "categories reordered");
            DragOutcome::CategoriesReordered { from, to }
        } else {
            DragOutcome::Unchanged
        }
    }

    /// Move an item into another category and push the change to the remote
    pub async fn reassign_item(&self, item_id: &ItemId, category_id: &CategoryId) -> DragOutcome {
        match self.begin_reassignment(item_id, category_id) {
            Applied::Done(outcome) => outcome,
            Applied::Sync(moved) => self.sync_reassignment(moved).await,
        }
    }

    fn apply_drag_end(&self, event: &DragEnd) -> Applied {
        match interpret(event) {
            Some(intent) => self.apply_move(intent),
            None => {
                tracing::trace!(dragged_id = %event.dragged_id, "drop without intent");
                Applied::Done(DragOutcome::NoIntent)
            }
        }
    }

    fn apply_move(&self, intent: MoveIntent) -> Applied {
        match intent {
            MoveIntent::ReorderCategories {
                from_index,
                to_index,
            } => Applied::Done(self.reorder_categories(from_index, to_index)),
            MoveIntent::ReassignItemCategory {
                item_id,
                new_category_id,
            } => self.begin_reassignment(&ItemId::from(item_id), &CategoryId::from(new_category_id)),
        }
    }

    /// Optimistic store change, committed synchronously
    fn begin_reassignment(&self, item_id: &ItemId, category_id: &CategoryId) -> Applied {
        match self.store.reassign_item(item_id, category_id) {
            Some(moved) => Applied::Sync(moved),
            None => {
                tracing::debug!(item_id = %item_id, category_id = %category_id, "reassignment skipped");
                Applied::Done(DragOutcome::Unchanged)
            }
        }
    }

    async fn sync_reassignment(&self, moved: Reassignment) -> DragOutcome {
        let item_id = moved.item.id.clone();
        let category_id = moved.target.clone();

        match self.backend.items().update(&moved.item).await {
            Ok(_) => {
                self.store.confirm_reassignment(&moved);
                tracing::info!(item_id = %item_id, category_id = %category_id, "item reassigned");
                DragOutcome::ItemReassigned { item: moved.item }
            }
            Err(error) => {
                let revert = self.policy == ReassignFailurePolicy::Revert;
                let reverted = self.store.fail_reassignment(&moved, revert);
                tracing::warn!(
                    item_id = %item_id,
                    category_id = %category_id,
                    error = %error,
                    reverted,
                    "failed to sync item category"
                );
                self.emit(CatalogEvent::SyncFailed {
                    item_id: item_id.clone(),
                    message: error.to_string(),
                    reverted,
                });
                DragOutcome::ReassignFailed {
                    item_id,
                    error,
                    reverted,
                }
            }
        }
    }
}
