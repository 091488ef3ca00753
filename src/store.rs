//! Entity Store
//!
//! In-memory catalog state shared by every command.
//! Readers take lock-free snapshots; writers build the next state from the
//! current one and swap it in whole, so a reader never sees half of a
//! compound change.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::domain::{Category, CategoryId, Item, ItemId};

/// Both collections at one point in time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    /// Categories in board order
    pub categories: Vec<Category>,
    /// All items, assigned or not
    pub items: Vec<Item>,
    /// Items with category moves the remote has not answered yet
    pending: BTreeMap<ItemId, PendingMove>,
}

/// Remote bookkeeping for an item whose category is in flight
#[derive(Clone, Debug, PartialEq)]
struct PendingMove {
    /// Last category the remote is known to hold
    confirmed: Option<CategoryId>,
    in_flight: usize,
}

/// One category column with its items
#[derive(Debug, PartialEq)]
pub struct BoardColumn<'a> {
    pub category: &'a Category,
    pub items: Vec<&'a Item>,
}

impl CatalogState {
    pub fn new(categories: Vec<Category>, items: Vec<Item>) -> Self {
        Self {
            categories,
            items,
            pending: BTreeMap::new(),
        }
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn has_category(&self, id: &CategoryId) -> bool {
        self.category(id).is_some()
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Items filed under a category
    pub fn items_in(&self, id: &CategoryId) -> Vec<&Item> {
        self.items.iter().filter(|i| i.belongs_to(id)).collect()
    }

    pub fn unassigned_items(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| i.is_unassigned()).collect()
    }

    /// Name of the item's category, None when unassigned or dangling
    pub fn category_name(&self, item: &Item) -> Option<&str> {
        item.category_id
            .as_ref()
            .and_then(|id| self.category(id))
            .map(|c| c.name.as_str())
    }

    /// Category columns in board order
    pub fn board(&self) -> Vec<BoardColumn<'_>> {
        self.categories
            .iter()
            .map(|category| BoardColumn {
                category,
                items: self.items_in(&category.id),
            })
            .collect()
    }
}

/// Shared, swappable catalog state
pub struct EntityStore {
    state: ArcSwap<CatalogState>,
    /// Serializes writers; readers never take it
    writer: Mutex<()>,
    /// Bumped on every committed change
    version: AtomicU64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(CatalogState::default())
    }
}

impl EntityStore {
    pub fn new(state: CatalogState) -> Self {
        Self {
            state: ArcSwap::from_pointee(state),
            writer: Mutex::new(()),
            version: AtomicU64::new(0),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> Arc<CatalogState> {
        self.state.load_full()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Apply a change atomically.
    ///
    /// `change` edits a private copy of the state. Returning `Some` commits
    /// the copy; returning `None` leaves the current snapshot in place.
    pub fn transact<R>(&self, change: impl FnOnce(&mut CatalogState) -> Option<R>) -> Option<R> {
        let _writer = self.writer.lock();
        let mut next = CatalogState::clone(&self.state.load());
        let result = change(&mut next)?;
        self.state.store(Arc::new(next));
        self.version.fetch_add(1, Ordering::AcqRel);
        Some(result)
    }

    // ========================
    // Whole-collection replacement
    // ========================

    pub fn replace_all(&self, categories: Vec<Category>, items: Vec<Item>) {
        self.transact(|state| {
            state.categories = categories;
            state.items = items;
            state.pending.clear();
            Some(())
        });
    }

    pub fn replace_categories(&self, categories: Vec<Category>) {
        self.transact(|state| {
            state.categories = categories;
            Some(())
        });
    }

    pub fn replace_items(&self, items: Vec<Item>) {
        self.transact(|state| {
            state.items = items;
            state.pending.clear();
            Some(())
        });
    }

    // ========================
    // Store helper functions
    // ========================

    /// Append a category at the end of the board
    pub fn add_category(&self, category: Category) {
        self.transact(|state| {
            state.categories.push(category);
            Some(())
        });
    }

    /// Replace a category by ID, keeping its board position
    pub fn update_category(&self, updated: Category) -> bool {
        self.transact(|state| {
            let slot = state.categories.iter_mut().find(|c| c.id == updated.id)?;
            *slot = updated;
            Some(())
        })
        .is_some()
    }

    /// Move a category within the board order
    pub fn move_category(&self, from: usize, to: usize) -> bool {
        self.transact(|state| catalog_dragdrop::reorder(&mut state.categories, from, to).then_some(()))
            .is_some()
    }

    /// Remove a category and unassign its items in one commit.
    /// Returns the number of orphaned items, None if the category is unknown.
    pub fn remove_category(&self, id: &CategoryId) -> Option<usize> {
        self.transact(|state| {
            let position = state.categories.iter().position(|c| &c.id == id)?;
            state.categories.remove(position);

            let mut orphaned = 0;
            for item in state.items.iter_mut().filter(|i| i.belongs_to(id)) {
                item.category_id = None;
                orphaned += 1;
            }
            Some(orphaned)
        })
    }

    pub fn add_item(&self, item: Item) {
        self.transact(|state| {
            state.items.push(item);
            Some(())
        });
    }

    /// Replace an item by ID
    pub fn update_item(&self, updated: Item) -> bool {
        self.transact(|state| {
            let slot = state.items.iter_mut().find(|i| i.id == updated.id)?;
            *slot = updated;
            Some(())
        })
        .is_some()
    }

    /// Remove an item by ID
    pub fn remove_item(&self, id: &ItemId) -> bool {
        self.transact(|state| {
            let position = state.items.iter().position(|i| &i.id == id)?;
            state.items.remove(position);
            state.pending.remove(id);
            Some(())
        })
        .is_some()
    }

    // ========================
    // Optimistic reassignment
    // ========================

    /// Move an item into an existing category ahead of the remote update.
    ///
    /// Declines (nothing committed) when the item is gone, the category is
    /// unknown, or the item is already there. Every accepted move must be
    /// settled with [`confirm_reassignment`](Self::confirm_reassignment) or
    /// [`fail_reassignment`](Self::fail_reassignment).
    pub fn reassign_item(&self, id: &ItemId, category_id: &CategoryId) -> Option<Reassignment> {
        self.transact(|state| {
            if !state.has_category(category_id) {
                return None;
            }
            let item = state.items.iter_mut().find(|i| &i.id == id)?;
            if item.belongs_to(category_id) {
                return None;
            }
            let previous = item.category_id.replace(category_id.clone());
            let moved = Reassignment {
                previous: previous.clone(),
                target: category_id.clone(),
                item: item.clone(),
            };

            let pending = state.pending.entry(id.clone()).or_insert(PendingMove {
                confirmed: previous,
                in_flight: 0,
            });
            pending.in_flight += 1;
            Some(moved)
        })
    }

    /// Record that the remote accepted a move
    pub fn confirm_reassignment(&self, moved: &Reassignment) {
        let id = &moved.item.id;
        self.transact(|state| {
            let pending = state.pending.get_mut(id)?;
            pending.confirmed = Some(moved.target.clone());
            pending.in_flight -= 1;
            if pending.in_flight == 0 {
                state.pending.remove(id);
            }
            Some(())
        });
    }

    /// Record that the remote rejected a move.
    ///
    /// With `revert`, the item goes back to the last category the remote
    /// confirmed, but only once no other move of it is still in flight; the
    /// last move to settle decides. Returns true when the item was put back.
    pub fn fail_reassignment(&self, moved: &Reassignment, revert: bool) -> bool {
        let id = &moved.item.id;
        self.transact(|state| {
            let pending = state.pending.get_mut(id)?;
            pending.in_flight -= 1;
            if pending.in_flight > 0 {
                return Some(false);
            }
            let confirmed = pending.confirmed.clone();
            state.pending.remove(id);
            if !revert {
                return Some(false);
            }

            let target_exists = match &confirmed {
                Some(category_id) => state.has_category(category_id),
                None => true,
            };
            let Some(item) = state.items.iter_mut().find(|i| &i.id == id) else {
                return Some(false);
            };
            if !target_exists || item.category_id == confirmed {
                return Some(false);
            }
            item.category_id = confirmed;
            Some(true)
        })
        .unwrap_or(false)
    }

    /// Number of items with unanswered category moves
    pub fn pending_moves(&self) -> usize {
        self.snapshot().pending.len()
    }
}

/// Outcome of [`EntityStore::reassign_item`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reassignment {
    /// Category the item was in before the move
    pub previous: Option<CategoryId>,
    pub target: CategoryId,
    /// The item as committed
    pub item: Item,
}
