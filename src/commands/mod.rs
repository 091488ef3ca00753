//! Commands Layer
//!
//! Catalog command handlers: the mutation boundary between user gestures
//! and the store/backend pair.

mod category_cmd;
mod drag_cmd;
mod item_cmd;

#[cfg(test)]
pub(crate) mod testing;

pub use drag_cmd::DragOutcome;
