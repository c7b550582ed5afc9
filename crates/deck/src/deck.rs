#![forbid(unsafe_code)]

//! The [`Deck`] coordinator: owns the components and wires them to the bus.
//!
//! A deck is the dependency-injection context of one view. It creates the
//! [`ItemIndex`], the [`Reconciler`], and the [`GroupRegistry`] from the
//! collaborators a host supplies (canvas, animator, optional layout) and
//! subscribes to the bus so that:
//!
//! | Event                                   | Reaction                                  |
//! |-----------------------------------------|-------------------------------------------|
//! | `ItemAdded`, `ItemChanged`              | redraw that item                          |
//! | `Indexed { changed }`                   | redraw every changed item                 |
//! | any of the above, displayed count moved | redraw all items                          |
//! | `ItemRemoved`                           | erase that item's renders                 |
//! | `LayoutChanged`                         | redraw all items                          |
//! | `FrameBoundsChanged`                    | redraw all, refresh visibility and bounds |
//! | `RenderSet` with a group                | join the render's surface to that group   |
//! | `RenderSet` without a group, `RenderRemoved` | leave any group                      |
//!
//! Handlers run to completion before the next event is delivered, so every
//! public call below returns with index and render map consistent.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use deck_core::animation::Animator;
use deck_core::{
    ConfigurationError, DeckEvent, Envelope, EventBindable, EventBus, EventKind, EventSource,
    Interest, ItemId, NodeId, Subscription,
};
use deck_gesture::{GestureConfig, GestureInput, GestureUnit, Recognizer, Surface};
use deck_index::{ChangeOptions, Data, Filter, Item, ItemIndex, SortKeyFn};
use deck_layout::GridLayout;
use deck_render::{Canvas, LayoutPolicy, Reconciler};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ConfigError, DeckConfig};
use crate::error::Result;
use crate::groups::GroupRegistry;

const WIRED_EVENTS: [EventKind; 9] = [
    EventKind::ItemAdded,
    EventKind::ItemChanged,
    EventKind::ItemRemoved,
    EventKind::Indexed,
    EventKind::LayoutChanged,
    EventKind::FrameBoundsChanged,
    EventKind::RenderSet,
    EventKind::RenderRemoved,
    EventKind::ItemErased,
];

/// Collaborators and settings for a [`Deck`].
#[derive(Default)]
pub struct DeckBuilder {
    bus: Option<EventBus>,
    canvas: Option<Rc<dyn Canvas>>,
    animator: Option<Rc<dyn Animator>>,
    layout: Option<Rc<dyn LayoutPolicy>>,
    config: DeckConfig,
}

impl std::fmt::Debug for DeckBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckBuilder")
            .field("canvas", &self.canvas.is_some())
            .field("animator", &self.animator.is_some())
            .field("layout", &self.layout.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl DeckBuilder {
    /// Share an existing bus instead of creating one.
    #[must_use]
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    #[must_use]
    pub fn canvas(mut self, canvas: Rc<dyn Canvas>) -> Self {
        self.canvas = Some(canvas);
        self
    }

    #[must_use]
    pub fn animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Layout to start with; defaults to a [`GridLayout`] timed by the config.
    #[must_use]
    pub fn layout(mut self, layout: Rc<dyn LayoutPolicy>) -> Self {
        self.layout = Some(layout);
        self
    }

    #[must_use]
    pub fn config(mut self, config: DeckConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and wire every component to the bus.
    pub fn build(self) -> Result<Deck> {
        let canvas = self.canvas.ok_or(ConfigurationError::MissingCanvas)?;
        let animator = self.animator.ok_or(ConfigurationError::MissingAnimator)?;
        let config = self.config.validated()?;
        let layout = self.layout.unwrap_or_else(|| {
            Rc::new(
                GridLayout::default()
                    .timing(config.animation.move_options())
                    .show(config.animation.show_spec())
                    .hide(config.animation.hide_spec()),
            )
        });
        let gesture = layout
            .canvas_gesture_options()
            .unwrap_or_else(|| config.gesture.to_gesture_config());
        gesture
            .validate()
            .map_err(|e| ConfigError::Validation(vec![e.to_string()]))?;

        let bus = self.bus.unwrap_or_default();
        let index = ItemIndex::new(bus.clone());
        let reconciler = Reconciler::new(
            bus.clone(),
            Rc::clone(&canvas),
            Rc::clone(&animator),
            layout,
        );
        let frame = Rc::clone(&canvas);
        let groups = GroupRegistry::new(Rc::clone(&animator), move || frame.frame_bounds(), gesture);

        let inner = Rc::new(DeckInner {
            bus,
            canvas,
            animator,
            index,
            reconciler,
            groups,
            config,
            subscriptions: RefCell::new(Vec::new()),
        });
        let deck = Deck { inner };
        deck.wire();
        debug!(handlers = deck.inner.bus.handler_count(), "deck built");
        Ok(deck)
    }
}

struct DeckInner {
    bus: EventBus,
    canvas: Rc<dyn Canvas>,
    animator: Rc<dyn Animator>,
    index: ItemIndex,
    reconciler: Reconciler,
    groups: GroupRegistry,
    config: DeckConfig,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// One animated, gesture-enabled view over a set of items.
///
/// Cloning a `Deck` creates a new handle to the **same** deck.
#[derive(Clone)]
pub struct Deck {
    inner: Rc<DeckInner>,
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("items", &self.inner.index.len())
            .field("reconciler", &self.inner.reconciler)
            .field("groups", &self.inner.groups)
            .finish()
    }
}

impl EventBindable for Deck {
    fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn source(&self) -> EventSource {
        EventSource::Deck
    }
}

impl Deck {
    #[must_use]
    pub fn builder() -> DeckBuilder {
        DeckBuilder::default()
    }

    // -- Components ---------------------------------------------------------

    #[must_use]
    pub fn index(&self) -> &ItemIndex {
        &self.inner.index
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.inner.reconciler
    }

    #[must_use]
    pub fn groups(&self) -> &GroupRegistry {
        &self.inner.groups
    }

    #[must_use]
    pub fn config(&self) -> &DeckConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn canvas(&self) -> Rc<dyn Canvas> {
        Rc::clone(&self.inner.canvas)
    }

    // -- Items --------------------------------------------------------------

    /// Insert (or overwrite) an item and draw it.
    pub fn add(&self, item: Item) -> Result<ItemId> {
        Ok(self.inner.index.add(item, ChangeOptions::default())?)
    }

    /// Insert an item-like JSON value and draw it.
    pub fn add_value(&self, value: Value) -> Result<ItemId> {
        Ok(self.inner.index.add_value(value, ChangeOptions::default())?)
    }

    /// Insert many items, indexing and drawing once.
    pub fn add_all(&self, items: impl IntoIterator<Item = Item>) -> Result<Vec<ItemId>> {
        Ok(self.inner.index.add_all(items, ChangeOptions::default())?)
    }

    /// Insert many item-like JSON values, indexing and drawing once.
    pub fn add_all_values(&self, values: impl IntoIterator<Item = Value>) -> Result<Vec<ItemId>> {
        Ok(self
            .inner
            .index
            .add_all_values(values, ChangeOptions::default())?)
    }

    /// Remove an item; its renders animate out. Returns `false` if absent.
    pub fn remove(&self, id: &ItemId) -> bool {
        self.inner.index.remove(id, ChangeOptions::default())
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.inner.index.clear(ChangeOptions::default());
    }

    pub fn set_data(&self, id: &ItemId, data: Data) -> Result<()> {
        Ok(self.inner.index.set_data(id, data)?)
    }

    pub fn set_value(&self, id: &ItemId, key: impl Into<String>, value: Value) -> Result<()> {
        Ok(self.inner.index.set_value(id, key, value)?)
    }

    pub fn set_filter(&self, filter: Option<Filter>) {
        self.inner.index.set_filter(filter);
    }

    pub fn set_sort_key(&self, sort_key: Option<SortKeyFn>) {
        self.inner.index.set_sort_key(sort_key);
    }

    pub fn set_reversed(&self, reversed: bool) {
        self.inner.index.set_reversed(reversed);
    }

    // -- Drawing ------------------------------------------------------------

    /// Swap the layout and redraw every item.
    pub fn set_layout(&self, layout: Rc<dyn LayoutPolicy>) {
        self.inner.reconciler.set_layout(layout);
        self.inner.groups.set_config(self.canvas_gesture_config());
        self.emit(DeckEvent::LayoutChanged);
    }

    /// Tell the deck the canvas frame moved or resized.
    pub fn frame_changed(&self) {
        let bounds = self.inner.canvas.frame_bounds();
        self.inner
            .bus
            .publish(EventSource::Canvas, DeckEvent::FrameBoundsChanged { bounds });
    }

    /// Redraw every item in the index.
    pub fn draw_all(&self) -> Result<()> {
        self.sync_displayed_count();
        let items: Vec<Item> = self
            .inner
            .index
            .ids()
            .iter()
            .filter_map(|id| self.inner.index.get(id))
            .collect();
        Ok(self.inner.reconciler.draw_all(&items)?)
    }

    /// Animate every render out without touching the index.
    pub fn erase_all(&self) {
        self.inner.reconciler.erase_all();
    }

    // -- Gestures -----------------------------------------------------------

    /// Gesture options of the canvas: the layout's, else the configured ones.
    #[must_use]
    pub fn canvas_gesture_config(&self) -> GestureConfig {
        self.inner
            .reconciler
            .layout()
            .canvas_gesture_options()
            .unwrap_or_else(|| self.inner.config.gesture.to_gesture_config())
    }

    /// Build a gesture unit for the canvas surface itself.
    pub fn canvas_gesture(
        &self,
        surface: Rc<dyn Surface>,
        recognizer: Recognizer,
    ) -> std::result::Result<GestureUnit, ConfigurationError> {
        GestureUnit::builder()
            .surface(surface)
            .animator(Rc::clone(&self.inner.animator))
            .recognizer(recognizer)
            .config(self.canvas_gesture_config())
            .build()
    }

    /// Route a recognized gesture on `node` to its group unit.
    pub fn handle_gesture(&self, node: NodeId, input: &GestureInput) -> bool {
        self.inner.groups.handle(node, input)
    }

    // -- Wiring -------------------------------------------------------------

    fn wire(&self) {
        let weak: Weak<DeckInner> = Rc::downgrade(&self.inner);
        let sub = self
            .inner
            .bus
            .subscribe(Interest::Kinds(WIRED_EVENTS.to_vec()), move |env| {
                if let Some(inner) = weak.upgrade() {
                    Deck { inner }.on_event(env);
                }
            });
        self.inner.subscriptions.borrow_mut().push(sub);
    }

    fn on_event(&self, env: &Envelope) {
        match &env.event {
            DeckEvent::ItemAdded { id } | DeckEvent::ItemChanged { id, .. } => {
                if self.sync_displayed_count() {
                    self.redraw_all();
                } else {
                    self.redraw(id);
                }
            }
            DeckEvent::Indexed { changed } => {
                if self.sync_displayed_count() {
                    self.redraw_all();
                } else {
                    for id in changed {
                        self.redraw(id);
                    }
                }
            }
            DeckEvent::ItemRemoved { id } => {
                if let Err(err) = self.inner.reconciler.erase_item(id) {
                    warn!(item = %id, error = %err, "erase failed");
                }
            }
            DeckEvent::LayoutChanged => self.redraw_all(),
            DeckEvent::FrameBoundsChanged { .. } => {
                self.redraw_all();
                self.inner.reconciler.refresh_visibility();
                self.inner.groups.update_bounds();
            }
            DeckEvent::RenderSet { node, group, .. } => match group {
                Some(group) => {
                    let Some(surface) = self.inner.canvas.surface(*node) else {
                        return;
                    };
                    if let Err(err) = self.inner.groups.join(group, surface) {
                        warn!(%node, group = group.as_str(), error = %err, "gesture join failed");
                    }
                }
                None => self.inner.groups.leave(*node),
            },
            DeckEvent::RenderRemoved { node, .. } => self.inner.groups.leave(*node),
            DeckEvent::ItemErased { id } => debug!(item = %id, "item erased"),
            _ => {}
        }
    }

    /// Push the displayed count to the reconciler; `true` if it moved.
    fn sync_displayed_count(&self) -> bool {
        self.inner
            .reconciler
            .set_displayed_count(self.inner.index.displayed_len())
    }

    fn redraw(&self, id: &ItemId) {
        let Some(item) = self.inner.index.get(id) else {
            return;
        };
        if let Err(err) = self.inner.reconciler.draw_item(&item) {
            warn!(item = %id, error = %err, "draw failed");
        }
    }

    fn redraw_all(&self) {
        if let Err(err) = self.draw_all() {
            warn!(error = %err, "redraw failed");
        }
    }
}
