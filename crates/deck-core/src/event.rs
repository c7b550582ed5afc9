#![forbid(unsafe_code)]

//! Typed, single-threaded event bus.
//!
//! # Design
//!
//! [`EventBus`] is a cheap-to-clone handle over shared storage
//! (`Rc<..>`). Every published [`DeckEvent`] is wrapped in an [`Envelope`]
//! naming its [`EventSource`] and delivered to every live handler whose
//! [`Interest`] matches the event's [`EventKind`].
//!
//! # Invariants
//!
//! 1. Handlers are called in registration order.
//! 2. Delivery is never reentrant: an event published from inside a handler
//!    is queued and delivered after the current dispatch completes.
//! 3. Queued events are delivered in FIFO order.
//! 4. Dropping a [`Subscription`] stops delivery to its handler; the dead
//!    entry is pruned lazily on the next dispatch.
//!
//! # Failure Modes
//!
//! - **Handler panic**: the dispatch flag is reset on unwind so the bus stays
//!   usable, but events still queued behind the panicking one stay queued
//!   until the next publish.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::debug_span;
use web_time::Instant;

use crate::geometry::Rect;
use crate::id::{GroupId, ItemId, NodeId, RenderId};

/// Component that published an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Host,
    Index,
    Reconciler,
    Canvas,
    Gesture,
    Deck,
}

/// Every event Deck components exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
    /// An item was inserted (or overwritten) in the index.
    ItemAdded { id: ItemId },
    /// Item data changed; `key` is `None` when the whole mapping was replaced.
    ItemChanged { id: ItemId, key: Option<String> },
    /// An item was removed from the index.
    ItemRemoved { id: ItemId },
    FilterChanged,
    SortKeyChanged,
    ReversedChanged,
    /// Display indices were recomputed; `changed` lists items whose index moved.
    Indexed { changed: Vec<ItemId> },
    /// The active layout policy was replaced.
    LayoutChanged,
    /// The visible frame moved or resized.
    FrameBoundsChanged { bounds: Rect },
    /// A realized render finished an animation and is stored in the render map.
    RenderSet {
        item: ItemId,
        render: RenderId,
        node: NodeId,
        group: Option<GroupId>,
    },
    /// A realized render finished its exit animation and was dropped.
    RenderRemoved {
        item: ItemId,
        render: RenderId,
        node: NodeId,
        group: Option<GroupId>,
    },
    /// An erased item has no realized renders left.
    ItemErased { id: ItemId },
}

/// Discriminant of [`DeckEvent`], used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ItemAdded,
    ItemChanged,
    ItemRemoved,
    FilterChanged,
    SortKeyChanged,
    ReversedChanged,
    Indexed,
    LayoutChanged,
    FrameBoundsChanged,
    RenderSet,
    RenderRemoved,
    ItemErased,
}

impl DeckEvent {
    /// The kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ItemAdded { .. } => EventKind::ItemAdded,
            Self::ItemChanged { .. } => EventKind::ItemChanged,
            Self::ItemRemoved { .. } => EventKind::ItemRemoved,
            Self::FilterChanged => EventKind::FilterChanged,
            Self::SortKeyChanged => EventKind::SortKeyChanged,
            Self::ReversedChanged => EventKind::ReversedChanged,
            Self::Indexed { .. } => EventKind::Indexed,
            Self::LayoutChanged => EventKind::LayoutChanged,
            Self::FrameBoundsChanged { .. } => EventKind::FrameBoundsChanged,
            Self::RenderSet { .. } => EventKind::RenderSet,
            Self::RenderRemoved { .. } => EventKind::RenderRemoved,
            Self::ItemErased { .. } => EventKind::ItemErased,
        }
    }
}

/// A published event plus its sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub sender: EventSource,
    pub event: DeckEvent,
}

/// Which events a handler wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interest {
    All,
    Kinds(Vec<EventKind>),
}

impl Interest {
    /// Interest in a single kind.
    #[must_use]
    pub fn only(kind: EventKind) -> Self {
        Self::Kinds(vec![kind])
    }

    #[must_use]
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            Self::All => true,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

type HandlerRc = Rc<dyn Fn(&Envelope)>;
type HandlerWeak = Weak<dyn Fn(&Envelope)>;

struct HandlerEntry {
    interest: Interest,
    handler: HandlerWeak,
}

struct BusInner {
    handlers: RefCell<Vec<HandlerEntry>>,
    queue: RefCell<VecDeque<Envelope>>,
    dispatching: Cell<bool>,
    published: Cell<u64>,
}

/// Shared publish/subscribe bus.
///
/// Cloning an `EventBus` creates a new handle to the **same** bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.inner.handlers.borrow().len())
            .field("queued", &self.inner.queue.borrow().len())
            .field("published", &self.inner.published.get())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Resets the dispatch flag even if a handler unwinds.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                handlers: RefCell::new(Vec::new()),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
                published: Cell::new(0),
            }),
        }
    }

    /// Register a handler. Dropping the returned guard unsubscribes it.
    pub fn subscribe(
        &self,
        interest: Interest,
        handler: impl Fn(&Envelope) + 'static,
    ) -> Subscription {
        let strong: HandlerRc = Rc::new(handler);
        self.inner.handlers.borrow_mut().push(HandlerEntry {
            interest,
            handler: Rc::downgrade(&strong),
        });
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Publish an event. Delivery happens before this call returns unless a
    /// dispatch is already running, in which case the event is queued.
    pub fn publish(&self, sender: EventSource, event: DeckEvent) {
        self.inner.published.set(self.inner.published.get() + 1);
        self.inner
            .queue
            .borrow_mut()
            .push_back(Envelope { sender, event });

        if self.inner.dispatching.get() {
            return;
        }
        self.inner.dispatching.set(true);
        let _guard = DispatchGuard(&self.inner.dispatching);

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(envelope) = next else { break };
            self.deliver(&envelope);
        }
    }

    /// Total number of events published so far.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.inner.published.get()
    }

    /// Number of registered handlers (including dead ones not yet pruned).
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    fn deliver(&self, envelope: &Envelope) {
        let kind = envelope.event.kind();
        let handlers: Vec<HandlerRc> = {
            let mut entries = self.inner.handlers.borrow_mut();
            entries.retain(|e| e.handler.strong_count() > 0);
            entries
                .iter()
                .filter(|e| e.interest.matches(kind))
                .filter_map(|e| e.handler.upgrade())
                .collect()
        };
        if handlers.is_empty() {
            return;
        }

        let start = Instant::now();
        let span = debug_span!(
            "deck.dispatch",
            kind = ?kind,
            handlers = handlers.len() as u64,
            duration_us = tracing::field::Empty
        );
        let _entered = span.enter();
        for handler in &handlers {
            handler(envelope);
        }
        span.record("duration_us", start.elapsed().as_micros() as u64);
    }
}

/// RAII guard for a bus handler.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Capability of components that publish on, and listen to, an [`EventBus`].
pub trait EventBindable {
    /// The bus this component is bound to.
    fn bus(&self) -> &EventBus;

    /// The sender tag used for this component's events.
    fn source(&self) -> EventSource;

    /// Publish an event tagged with this component as sender.
    fn emit(&self, event: DeckEvent) {
        self.bus().publish(self.source(), event);
    }

    /// Subscribe to events on this component's bus.
    fn bind(&self, interest: Interest, handler: impl Fn(&Envelope) + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.bus().subscribe(interest, handler)
    }
}
