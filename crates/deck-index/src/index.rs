#![forbid(unsafe_code)]

//! The item index: identity map plus derived display order.
//!
//! # Design
//!
//! [`ItemIndex`] is a cheap-to-clone handle over shared storage
//! (`Rc<RefCell<..>>`), so the reconciler and event handlers can read the
//! index while the host keeps mutating it through its own handle.
//!
//! # Invariants
//!
//! 1. After any mutation (unless indexing was explicitly deferred), every
//!    item's display index equals its position in the sequence obtained by
//!    filtering, then sorting, then optionally reversing all items.
//!    Filtered-out items have no display index.
//! 2. Displayed indices form the contiguous range `0..displayed_len()`.
//! 3. Equal sort keys keep insertion order (stable sort).
//! 4. Events are published only after derived state is consistent, and
//!    never while the index storage is borrowed.
//! 5. Setting a filter, sort key, or reversal flag identical to the current
//!    one (pointer-equal for closures) is a no-op and publishes nothing.
//!
//! # Failure Modes
//!
//! - **Re-entrant access from a filter or sort closure**: closures run while
//!   the index storage is borrowed; reading the index from inside them panics
//!   (RefCell borrow rules). Closures must only look at the item they get.
//! - **Invalid input**: validation happens before any mutation, so a failed
//!   `add_all` leaves the index untouched.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use deck_core::{DeckEvent, EventBindable, EventBus, EventSource, ItemId, ValidationError};
use serde_json::Value;
use tracing::debug;

use crate::item::{Data, Filter, Item, SortKey, SortKeyFn};

/// Options for changes to the item set or to item data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeOptions {
    /// Skip re-indexing; the caller will call [`ItemIndex::index`] later.
    pub defer_index: bool,
    /// Publish no events for this change.
    pub silent: bool,
}

impl ChangeOptions {
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            defer_index: true,
            silent: false,
        }
    }

    #[must_use]
    pub fn silent() -> Self {
        Self {
            defer_index: false,
            silent: true,
        }
    }
}

#[derive(Default)]
struct IndexState {
    items: AHashMap<ItemId, Item>,
    next_seq: u64,
    next_generated: u64,
    filter: Option<Filter>,
    sort_key: Option<SortKeyFn>,
    reversed: bool,
    /// Displayed ids in display order.
    order: Vec<ItemId>,
}

impl IndexState {
    fn insert(&mut self, mut item: Item) -> ItemId {
        let id = item.id().clone();
        match self.items.get(&id) {
            // Overwrite keeps the original place in the base order.
            Some(existing) => item.seq = existing.seq,
            None => {
                self.next_seq += 1;
                item.seq = self.next_seq;
            }
        }
        item.set_display_index(self.items.get(&id).and_then(Item::display_index));
        self.items.insert(id.clone(), item);
        id
    }

    fn generate_id(&mut self) -> ItemId {
        loop {
            self.next_generated += 1;
            let id = ItemId::new(format!("item-{}", self.next_generated));
            if !self.items.contains_key(&id) {
                return id;
            }
        }
    }

    /// Recompute display indices; returns ids whose index changed.
    fn reindex(&mut self) -> Vec<ItemId> {
        let mut shown: Vec<(&Item, SortKey)> = self
            .items
            .values()
            .filter(|item| self.filter.as_ref().is_none_or(|f| f(item)))
            .map(|item| {
                let key = self.sort_key.as_ref().map_or(SortKey::None, |k| k(item));
                (item, key)
            })
            .collect();
        shown.sort_by(|(a, ka), (b, kb)| ka.cmp(kb).then(a.seq.cmp(&b.seq)));
        if self.reversed {
            shown.reverse();
        }
        let order: Vec<ItemId> = shown.into_iter().map(|(item, _)| item.id().clone()).collect();

        let mut positions: AHashMap<&ItemId, usize> = AHashMap::with_capacity(order.len());
        for (pos, id) in order.iter().enumerate() {
            positions.insert(id, pos);
        }

        let mut changed = Vec::new();
        for (id, item) in &mut self.items {
            if item.set_display_index(positions.get(id).copied()) {
                changed.push(id.clone());
            }
        }
        changed.sort_by_key(|id| {
            positions.get(id).copied().map_or((1, 0), |pos| (0, pos))
        });
        drop(positions);
        self.order = order;
        changed
    }
}

/// Shared, filterable, sortable item collection.
///
/// Cloning an `ItemIndex` creates a new handle to the **same** items.
#[derive(Clone)]
pub struct ItemIndex {
    state: Rc<RefCell<IndexState>>,
    bus: EventBus,
}

impl std::fmt::Debug for ItemIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ItemIndex")
            .field("items", &state.items.len())
            .field("displayed", &state.order.len())
            .field("filtered", &state.filter.is_some())
            .field("sorted", &state.sort_key.is_some())
            .field("reversed", &state.reversed)
            .finish()
    }
}

impl EventBindable for ItemIndex {
    fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn source(&self) -> EventSource {
        EventSource::Index
    }
}

impl ItemIndex {
    /// Create an empty index publishing on `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: Rc::new(RefCell::new(IndexState::default())),
            bus,
        }
    }

    // -- Reads --------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.state.borrow().items.contains_key(id)
    }

    /// A snapshot of one item.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<Item> {
        self.state.borrow().items.get(id).cloned()
    }

    /// Borrow one item without cloning it.
    pub fn with_item<R>(&self, id: &ItemId, f: impl FnOnce(&Item) -> R) -> Option<R> {
        self.state.borrow().items.get(id).map(f)
    }

    /// Displayed ids in display order.
    #[must_use]
    pub fn display_order(&self) -> Vec<ItemId> {
        self.state.borrow().order.clone()
    }

    /// Number of items currently displayed.
    #[must_use]
    pub fn displayed_len(&self) -> usize {
        self.state.borrow().order.len()
    }

    /// Every id, displayed or not, in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        let state = self.state.borrow();
        let mut items: Vec<&Item> = state.items.values().collect();
        items.sort_by_key(|item| item.seq);
        items.into_iter().map(|item| item.id().clone()).collect()
    }

    #[must_use]
    pub fn filter(&self) -> Option<Filter> {
        self.state.borrow().filter.clone()
    }

    #[must_use]
    pub fn sort_key(&self) -> Option<SortKeyFn> {
        self.state.borrow().sort_key.clone()
    }

    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.state.borrow().reversed
    }

    // -- Insertion ----------------------------------------------------------

    /// Insert an item; an existing item with the same id is overwritten.
    pub fn add(&self, item: Item, opts: ChangeOptions) -> Result<ItemId, ValidationError> {
        if item.id().as_str().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let id = self.state.borrow_mut().insert(item);
        let mut events = Vec::new();
        if !opts.silent {
            events.push(DeckEvent::ItemAdded { id: id.clone() });
        }
        self.finish(events, opts);
        Ok(id)
    }

    /// Insert an item-like JSON value (see [`Item::from_value`]).
    pub fn add_value(&self, value: Value, opts: ChangeOptions) -> Result<ItemId, ValidationError> {
        let item = self.item_from_value(value)?;
        self.add(item, opts)
    }

    /// Insert many items, indexing exactly once at the end.
    ///
    /// Every item is validated first; on error nothing is inserted.
    pub fn add_all(
        &self,
        items: impl IntoIterator<Item = Item>,
        opts: ChangeOptions,
    ) -> Result<Vec<ItemId>, ValidationError> {
        let items: Vec<Item> = items.into_iter().collect();
        if items.iter().any(|item| item.id().as_str().is_empty()) {
            return Err(ValidationError::EmptyId);
        }
        let ids: Vec<ItemId> = {
            let mut state = self.state.borrow_mut();
            items.into_iter().map(|item| state.insert(item)).collect()
        };
        debug!(count = ids.len(), "batch insert");
        let events = if opts.silent {
            Vec::new()
        } else {
            ids.iter()
                .map(|id| DeckEvent::ItemAdded { id: id.clone() })
                .collect()
        };
        self.finish(events, opts);
        Ok(ids)
    }

    /// Insert many item-like JSON values, indexing exactly once at the end.
    pub fn add_all_values(
        &self,
        values: impl IntoIterator<Item = Value>,
        opts: ChangeOptions,
    ) -> Result<Vec<ItemId>, ValidationError> {
        let items = values
            .into_iter()
            .map(|value| self.item_from_value(value))
            .collect::<Result<Vec<_>, _>>()?;
        self.add_all(items, opts)
    }

    fn item_from_value(&self, value: Value) -> Result<Item, ValidationError> {
        let state = &self.state;
        Item::from_value(value, || state.borrow_mut().generate_id())
    }

    // -- Removal ------------------------------------------------------------

    /// Remove an item by id. Returns `false` (and does nothing) if absent.
    pub fn remove(&self, id: &ItemId, opts: ChangeOptions) -> bool {
        let removed = self.state.borrow_mut().items.remove(id).is_some();
        if !removed {
            return false;
        }
        let mut events = Vec::new();
        if !opts.silent {
            events.push(DeckEvent::ItemRemoved { id: id.clone() });
        }
        self.finish(events, opts);
        true
    }

    /// Remove every item, re-indexing once.
    pub fn clear(&self, opts: ChangeOptions) {
        let mut removed: Vec<Item> = {
            let mut state = self.state.borrow_mut();
            state.items.drain().map(|(_, item)| item).collect()
        };
        if removed.is_empty() {
            return;
        }
        removed.sort_by_key(|item| item.seq);
        debug!(count = removed.len(), "index cleared");
        let events = if opts.silent {
            Vec::new()
        } else {
            removed
                .into_iter()
                .map(|item| DeckEvent::ItemRemoved {
                    id: item.id().clone(),
                })
                .collect()
        };
        self.finish(events, opts);
    }

    // -- Data ---------------------------------------------------------------

    /// Replace an item's whole data mapping.
    pub fn set_data(&self, id: &ItemId, data: Data) -> Result<(), ValidationError> {
        self.set_data_with(id, data, ChangeOptions::default())
    }

    /// [`set_data`](Self::set_data) with explicit re-index and event options.
    pub fn set_data_with(
        &self,
        id: &ItemId,
        data: Data,
        opts: ChangeOptions,
    ) -> Result<(), ValidationError> {
        {
            let mut state = self.state.borrow_mut();
            let item = state
                .items
                .get_mut(id)
                .ok_or_else(|| ValidationError::UnknownItem(id.clone()))?;
            item.replace_data(data);
        }
        let events = if opts.silent {
            Vec::new()
        } else {
            vec![DeckEvent::ItemChanged {
                id: id.clone(),
                key: None,
            }]
        };
        self.finish(events, opts);
        Ok(())
    }

    /// Replace one key of an item's data.
    pub fn set_value(
        &self,
        id: &ItemId,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), ValidationError> {
        self.set_value_with(id, key, value, ChangeOptions::default())
    }

    /// [`set_value`](Self::set_value) with explicit re-index and event options.
    ///
    /// Batch several deferred updates and call [`index`](Self::index) once.
    pub fn set_value_with(
        &self,
        id: &ItemId,
        key: impl Into<String>,
        value: Value,
        opts: ChangeOptions,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        {
            let mut state = self.state.borrow_mut();
            let item = state
                .items
                .get_mut(id)
                .ok_or_else(|| ValidationError::UnknownItem(id.clone()))?;
            item.set_value(key.clone(), value);
        }
        let events = if opts.silent {
            Vec::new()
        } else {
            vec![DeckEvent::ItemChanged {
                id: id.clone(),
                key: Some(key),
            }]
        };
        self.finish(events, opts);
        Ok(())
    }

    // -- Ordering settings --------------------------------------------------

    /// Replace the filter. Pointer-equal filters are a no-op.
    pub fn set_filter(&self, filter: Option<Filter>) {
        {
            let mut state = self.state.borrow_mut();
            if same_closure(&state.filter, &filter) {
                return;
            }
            state.filter = filter;
        }
        self.finish(vec![DeckEvent::FilterChanged], ChangeOptions::default());
    }

    /// Replace the sort key. Pointer-equal keys are a no-op.
    pub fn set_sort_key(&self, sort_key: Option<SortKeyFn>) {
        {
            let mut state = self.state.borrow_mut();
            if same_closure(&state.sort_key, &sort_key) {
                return;
            }
            state.sort_key = sort_key;
        }
        self.finish(vec![DeckEvent::SortKeyChanged], ChangeOptions::default());
    }

    /// Flip the display order. Setting the current value is a no-op.
    pub fn set_reversed(&self, reversed: bool) {
        {
            let mut state = self.state.borrow_mut();
            if state.reversed == reversed {
                return;
            }
            state.reversed = reversed;
        }
        self.finish(vec![DeckEvent::ReversedChanged], ChangeOptions::default());
    }

    // -- Indexing -----------------------------------------------------------

    /// Recompute every display index and publish `Indexed`.
    ///
    /// Returns the ids whose display index changed.
    pub fn index(&self) -> Vec<ItemId> {
        let changed = self.reindex_quietly();
        self.emit(DeckEvent::Indexed {
            changed: changed.clone(),
        });
        changed
    }

    fn reindex_quietly(&self) -> Vec<ItemId> {
        let mut state = self.state.borrow_mut();
        let changed = state.reindex();
        debug!(
            items = state.items.len(),
            displayed = state.order.len(),
            changed = changed.len(),
            "reindexed"
        );
        changed
    }

    /// Re-index (unless deferred) and then publish, in that order, so
    /// handlers observe consistent display indices.
    fn finish(&self, mut events: Vec<DeckEvent>, opts: ChangeOptions) {
        if !opts.defer_index {
            let changed = self.reindex_quietly();
            if !opts.silent {
                events.push(DeckEvent::Indexed { changed });
            }
        }
        for event in events {
            self.emit(event);
        }
    }
}

fn same_closure<T: ?Sized>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
        _ => false,
    }
}
