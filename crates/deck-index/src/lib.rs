#![forbid(unsafe_code)]

//! Item index: the ordered set of data items behind a Deck.
//!
//! [`ItemIndex`] assigns stable identity to items and derives their display
//! order from a filter predicate, a sort key, and a reversal flag. Every
//! mutation publishes a [`deck_core::DeckEvent`] the render reconciler uses
//! to decide what to redraw.

pub mod index;
pub mod item;

pub use index::{ChangeOptions, ItemIndex};
pub use item::{Data, Filter, Item, SortKey, SortKeyFn, filter_by_field, sort_by_field};
