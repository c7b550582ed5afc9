#![forbid(unsafe_code)]

//! Render reconciler: diff layout output against realized renders.
//!
//! For every drawn item the active [`LayoutPolicy`] returns a sequence of
//! [`RenderDescriptor`]s. Render ids are positions in that sequence, and the
//! reconciler partitions the union of previous and requested ids:
//!
//! - **merge** (in both): copy the new descriptor onto the realized render,
//!   keep its node, and re-animate only if the target transform changed,
//! - **add** (new only): create a node, animate it in from the show state,
//! - **remove** (previous only): animate it out with the hide state.
//!
//! # Lifecycle
//!
//! ```text
//!   pending-add ──begin──▶ attached ──complete──▶ steady ⇄ steady
//!                                                    │
//!                                               remove/erase
//!                                                    ▼
//!                                removing ──complete──▶ destroyed
//! ```
//!
//! Renders are stored in the map as soon as the diff creates them, so a
//! second draw with unchanged layout output merges instead of re-adding.
//! Nodes are attached to the canvas on their first `begin`, never at creation.
//!
//! Items that leave the display (filtered out) get no descriptors, so their
//! renders take the remove path and their nodes are destroyed. Showing such
//! an item again creates fresh nodes that replay the show animation; hosts
//! that toggle filters often pay node creation each time.
//!
//! # Invariants
//!
//! 1. Every render id of a draw lands in exactly one partition.
//! 2. Only the newest animation of a render may move its node or finish its
//!    lifecycle; superseded and interrupted completions only record a snapshot.
//! 3. No borrow of reconciler state is held while calling the layout,
//!    publishing on the bus, or starting an animation.
//!
//! # Failure Modes
//!
//! - An empty item id or an unknown render is a [`ValidationError`] raised
//!   before any state changes.
//! - A partition defect is an [`InvariantViolation`]; it cannot occur for
//!   well-formed id sets.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use deck_core::animation::{
    AnimationCallbacks, AnimationOptions, AnimationTarget, Animator, Completion, Progress,
    Transform,
};
use deck_core::{
    DeckError, DeckEvent, EventBindable, EventBus, EventSource, InvariantViolation, ItemId,
    NodeId, RenderId, ValidationError,
};
use deck_index::Item;
use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::descriptor::{RealizedRender, RenderDescriptor};
use crate::policy::{LayoutContext, LayoutPolicy};

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Render ids split by what a draw does with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub merge: Vec<RenderId>,
    pub add: Vec<RenderId>,
    pub remove: Vec<RenderId>,
}

/// Partition previous and requested render ids.
pub fn partition(
    previous: &BTreeSet<RenderId>,
    requested: &BTreeSet<RenderId>,
) -> Result<Partition, InvariantViolation> {
    let part = Partition {
        merge: previous.intersection(requested).copied().collect(),
        add: requested.difference(previous).copied().collect(),
        remove: previous.difference(requested).copied().collect(),
    };
    let total = previous.union(requested).count();
    if part.merge.len() + part.add.len() + part.remove.len() != total {
        return Err(InvariantViolation::new(format!(
            "render partition covers {} of {total} ids",
            part.merge.len() + part.add.len() + part.remove.len()
        )));
    }
    Ok(part)
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ItemRenders {
    renders: BTreeMap<RenderId, RealizedRender>,
    /// Set by erase; cleared by the next draw.
    erasing: bool,
}

/// Identifies the animation a callback belongs to.
#[derive(Debug, Clone)]
struct RenderKey {
    item: ItemId,
    render: RenderId,
    node: NodeId,
    generation: u64,
}

struct Request {
    key: RenderKey,
    from: Transform,
    to: Transform,
    options: AnimationOptions,
}

enum Outcome {
    Stored(RealizedRender),
    Removed {
        render: RealizedRender,
        erased: bool,
    },
}

struct Inner {
    bus: EventBus,
    canvas: Rc<dyn Canvas>,
    animator: Rc<dyn Animator>,
    layout: RefCell<Rc<dyn LayoutPolicy>>,
    items: RefCell<AHashMap<ItemId, ItemRenders>>,
    displayed_count: Cell<usize>,
}

/// Authoritative item → realized renders map plus the diff that updates it.
///
/// Cloning a `Reconciler` creates a new handle to the **same** reconciler.
#[derive(Clone)]
pub struct Reconciler {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("items", &self.item_count())
            .field("renders", &self.render_count())
            .finish()
    }
}

impl EventBindable for Reconciler {
    fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn source(&self) -> EventSource {
        EventSource::Reconciler
    }
}

impl Reconciler {
    /// Create a reconciler drawing onto `canvas` through `animator`.
    pub fn new(
        bus: EventBus,
        canvas: Rc<dyn Canvas>,
        animator: Rc<dyn Animator>,
        layout: Rc<dyn LayoutPolicy>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                bus,
                canvas,
                animator,
                layout: RefCell::new(layout),
                items: RefCell::new(AHashMap::new()),
                displayed_count: Cell::new(0),
            }),
        }
    }

    // -- Collaborators ------------------------------------------------------

    #[must_use]
    pub fn layout(&self) -> Rc<dyn LayoutPolicy> {
        Rc::clone(&self.inner.layout.borrow())
    }

    /// Replace the layout. Callers redraw afterwards.
    pub fn set_layout(&self, layout: Rc<dyn LayoutPolicy>) {
        *self.inner.layout.borrow_mut() = layout;
    }

    #[must_use]
    pub fn canvas(&self) -> Rc<dyn Canvas> {
        Rc::clone(&self.inner.canvas)
    }

    /// Record how many items the index currently displays.
    ///
    /// Returns `true` when the count differs from the previous one, in which
    /// case layouts that depend on it may place every item differently.
    pub fn set_displayed_count(&self, count: usize) -> bool {
        self.inner.displayed_count.replace(count) != count
    }

    /// Context handed to the layout on every call.
    #[must_use]
    pub fn context(&self) -> LayoutContext {
        LayoutContext {
            frame: self.inner.canvas.frame_bounds(),
            displayed_count: self.inner.displayed_count.get(),
        }
    }

    // -- Readers ------------------------------------------------------------

    /// Number of items with at least one realized render.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Total realized renders, including those animating out.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.inner
            .items
            .borrow()
            .values()
            .map(|e| e.renders.len())
            .sum()
    }

    #[must_use]
    pub fn contains_item(&self, id: &ItemId) -> bool {
        self.inner.items.borrow().contains_key(id)
    }

    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.inner.items.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Realized renders of `id`, ordered by render id.
    #[must_use]
    pub fn renders(&self, id: &ItemId) -> Vec<RealizedRender> {
        self.inner
            .items
            .borrow()
            .get(id)
            .map(|e| e.renders.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn render(&self, id: &ItemId, render: RenderId) -> Option<RealizedRender> {
        self.inner
            .items
            .borrow()
            .get(id)
            .and_then(|e| e.renders.get(&render).cloned())
    }

    /// Whether `id` was erased and still has renders animating out.
    #[must_use]
    pub fn is_erasing(&self, id: &ItemId) -> bool {
        self.inner
            .items
            .borrow()
            .get(id)
            .is_some_and(|e| e.erasing)
    }

    // -- Drawing ------------------------------------------------------------

    /// Reconcile one item against fresh layout output.
    ///
    /// Items without a display index get no descriptors, so every existing
    /// render animates out.
    pub fn draw_item(&self, item: &Item) -> Result<(), DeckError> {
        let id = item.id();
        if id.as_str().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        let layout = self.layout();
        let ctx = self.context();
        let descriptors = if item.is_displayed() {
            layout.renders(item, &ctx)
        } else {
            Vec::new()
        };

        let requested: BTreeSet<RenderId> = (0..descriptors.len()).map(RenderId).collect();
        let previous: BTreeSet<RenderId> = self
            .inner
            .items
            .borrow()
            .get(id)
            .map(|e| e.renders.keys().copied().collect())
            .unwrap_or_default();
        let part = partition(&previous, &requested)?;
        debug!(
            item = %id,
            merge = part.merge.len(),
            add = part.add.len(),
            remove = part.remove.len(),
            "reconcile"
        );

        // Nodes are created before borrowing so the canvas sees a quiet map.
        let created: Vec<(RenderId, NodeId)> = part
            .add
            .iter()
            .map(|&rid| (rid, self.inner.canvas.create_node(id, rid)))
            .collect();

        let show = layout.show_animation();
        let hide = layout.hide_animation();
        let mut requests = Vec::new();
        {
            let mut items = self.inner.items.borrow_mut();
            let entry = items.entry(id.clone()).or_default();
            entry.erasing = false;

            for &rid in &part.merge {
                let descriptor = descriptors[rid.0].clone();
                let Some(render) = entry.renders.get_mut(&rid) else {
                    continue;
                };
                let unchanged =
                    !render.removing && render.descriptor.transform == descriptor.transform;
                render.removing = false;
                render.descriptor = descriptor;
                if !unchanged {
                    requests.push(retarget_to_descriptor(render));
                }
            }

            for (rid, node) in created {
                let descriptor = descriptors[rid.0].clone();
                let start = show.patch.apply_to(&descriptor.transform);
                let mut render = RealizedRender::new(rid, id.clone(), node, descriptor, start);
                requests.push(retarget_to_descriptor(&mut render));
                entry.renders.insert(rid, render);
            }

            for &rid in &part.remove {
                if let Some(render) = entry.renders.get_mut(&rid)
                    && !render.removing
                {
                    render.removing = true;
                    let to = hide.patch.apply_to(&render.current);
                    requests.push(retarget(render, to, hide.options));
                }
            }

            if entry.renders.is_empty() {
                items.remove(id);
            }
        }

        for request in requests {
            if request.key.generation == 1 {
                self.inner.canvas.apply(request.key.node, &request.from);
            }
            self.start(request);
        }
        Ok(())
    }

    /// Draw every item in `items`.
    pub fn draw_all<'a>(&self, items: impl IntoIterator<Item = &'a Item>) -> Result<(), DeckError> {
        for item in items {
            self.draw_item(item)?;
        }
        Ok(())
    }

    /// Replace (or create) a single render of `item` without a layout pass.
    pub fn set_render(
        &self,
        item: &Item,
        render: RenderId,
        descriptor: RenderDescriptor,
    ) -> Result<(), DeckError> {
        let id = item.id();
        if id.as_str().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        let exists = self
            .inner
            .items
            .borrow()
            .get(id)
            .is_some_and(|e| e.renders.contains_key(&render));
        let node = (!exists).then(|| self.inner.canvas.create_node(id, render));
        let show = self.layout().show_animation();

        let request = {
            let mut items = self.inner.items.borrow_mut();
            let entry = items.entry(id.clone()).or_default();
            entry.erasing = false;
            match node {
                Some(node) => {
                    let start = show.patch.apply_to(&descriptor.transform);
                    let mut realized = RealizedRender::new(render, id.clone(), node, descriptor, start);
                    let request = retarget_to_descriptor(&mut realized);
                    entry.renders.insert(render, realized);
                    Some(request)
                }
                None => {
                    let realized = entry.renders.get_mut(&render).ok_or_else(|| {
                        InvariantViolation::new(format!("render {render} of {id} vanished"))
                    })?;
                    let unchanged = !realized.removing
                        && realized.descriptor.transform == descriptor.transform;
                    realized.removing = false;
                    realized.descriptor = descriptor;
                    (!unchanged).then(|| retarget_to_descriptor(realized))
                }
            }
        };

        if let Some(request) = request {
            if request.key.generation == 1 {
                self.inner.canvas.apply(request.key.node, &request.from);
            }
            self.start(request);
        }
        Ok(())
    }

    /// Animate a single render out.
    pub fn remove_render(&self, id: &ItemId, render: RenderId) -> Result<(), ValidationError> {
        if id.as_str().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let hide = self.layout().hide_animation();
        let request = {
            let mut items = self.inner.items.borrow_mut();
            let realized = items
                .get_mut(id)
                .and_then(|e| e.renders.get_mut(&render))
                .ok_or_else(|| ValidationError::UnknownRender {
                    item: id.clone(),
                    render,
                })?;
            if realized.removing {
                None
            } else {
                realized.removing = true;
                let to = hide.patch.apply_to(&realized.current);
                Some(retarget(realized, to, hide.options))
            }
        };
        if let Some(request) = request {
            self.start(request);
        }
        Ok(())
    }

    /// Animate every render of `id` out, independent of index removal.
    ///
    /// Publishes [`DeckEvent::ItemErased`] once the last render is gone,
    /// immediately if there are none.
    pub fn erase_item(&self, id: &ItemId) -> Result<(), ValidationError> {
        if id.as_str().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        let hide = self.layout().hide_animation();
        let requests = {
            let mut items = self.inner.items.borrow_mut();
            match items.get_mut(id) {
                None => None,
                Some(entry) => {
                    entry.erasing = true;
                    Some(
                        entry
                            .renders
                            .values_mut()
                            .filter(|r| !r.removing)
                            .map(|r| {
                                r.removing = true;
                                let to = hide.patch.apply_to(&r.current);
                                retarget(r, to, hide.options)
                            })
                            .collect::<Vec<_>>(),
                    )
                }
            }
        };
        match requests {
            None => {
                debug!(item = %id, "erase without renders");
                self.emit(DeckEvent::ItemErased { id: id.clone() });
            }
            Some(requests) => {
                debug!(item = %id, exiting = requests.len(), "erase");
                for request in requests {
                    self.start(request);
                }
            }
        }
        Ok(())
    }

    /// Erase every item that has realized renders.
    pub fn erase_all(&self) {
        for id in self.item_ids() {
            // Ids in the map are never empty.
            let _ = self.erase_item(&id);
        }
    }

    /// Re-run content load/unload for every attached render.
    pub fn refresh_visibility(&self) {
        let keys: Vec<(ItemId, RenderId)> = self
            .inner
            .items
            .borrow()
            .iter()
            .flat_map(|(id, e)| {
                e.renders
                    .values()
                    .filter(|r| r.in_canvas && !r.removing)
                    .map(|r| (id.clone(), r.id))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (id, render) in keys {
            self.update_visibility(&id, render);
        }
    }

    // -- Animation plumbing -------------------------------------------------

    fn start(&self, request: Request) {
        let Request {
            key,
            from,
            to,
            options,
        } = request;
        let node = key.node;
        trace!(item = %key.item, render = %key.render, %node, generation = key.generation, "animate");

        let on_begin = (Rc::downgrade(&self.inner), key.clone());
        let on_progress = (Rc::downgrade(&self.inner), key.clone());
        let on_complete = (Rc::downgrade(&self.inner), key);
        let callbacks = AnimationCallbacks::new()
            .on_begin(move || {
                if let Some(this) = upgrade(&on_begin.0) {
                    this.began(&on_begin.1);
                }
            })
            .on_progress(move |p: &Progress| {
                if let Some(this) = upgrade(&on_progress.0) {
                    this.progressed(&on_progress.1, p);
                }
            })
            .on_complete(move |c: &Completion| {
                if let Some(this) = upgrade(&on_complete.0) {
                    this.completed(&on_complete.1, c);
                }
            });
        self.inner.animator.animate(
            node,
            AnimationTarget::Transform { from, to },
            options,
            callbacks,
        );
    }

    /// Run `f` on the render `key` names, if it still owns the same node.
    fn with_render<R>(&self, key: &RenderKey, f: impl FnOnce(&mut RealizedRender) -> R) -> Option<R> {
        let mut items = self.inner.items.borrow_mut();
        let render = items.get_mut(&key.item)?.renders.get_mut(&key.render)?;
        (render.node == key.node).then(|| f(render))
    }

    fn began(&self, key: &RenderKey) {
        let attach = self.with_render(key, |r| {
            if r.generation == key.generation {
                r.began = true;
            }
            !std::mem::replace(&mut r.in_canvas, true)
        });
        if attach == Some(true) {
            trace!(item = %key.item, render = %key.render, node = %key.node, "attach");
            self.inner.canvas.attach(key.node);
        }
    }

    fn progressed(&self, key: &RenderKey, progress: &Progress) {
        let Some(transform) = progress.value.transform() else {
            return;
        };
        let current = self.with_render(key, |r| {
            r.last_progress = Some(*progress);
            if r.generation == key.generation {
                r.current = transform;
                true
            } else {
                false
            }
        });
        if current == Some(true) {
            self.inner.canvas.apply(key.node, &transform);
            self.update_visibility(&key.item, key.render);
        }
    }

    fn completed(&self, key: &RenderKey, completion: &Completion) {
        let outcome = {
            let mut items = self.inner.items.borrow_mut();
            let Some(entry) = items.get_mut(&key.item) else {
                return;
            };
            let Some(render) = entry.renders.get_mut(&key.render) else {
                return;
            };
            if render.node != key.node {
                return;
            }
            render.last_completion = Some(*completion);
            if completion.interrupted || render.generation != key.generation {
                trace!(item = %key.item, render = %key.render, "superseded completion");
                return;
            }
            if let Some(t) = completion.value.transform() {
                render.current = t;
            }
            if render.removing {
                let Some(render) = entry.renders.remove(&key.render) else {
                    return;
                };
                let erased = entry.renders.is_empty() && entry.erasing;
                if entry.renders.is_empty() {
                    items.remove(&key.item);
                }
                Outcome::Removed { render, erased }
            } else {
                Outcome::Stored(render.clone())
            }
        };

        match outcome {
            Outcome::Stored(render) => {
                self.inner.canvas.apply(render.node, &render.current);
                self.update_visibility(&key.item, key.render);
                self.emit(DeckEvent::RenderSet {
                    item: render.item.clone(),
                    render: render.id,
                    node: render.node,
                    group: render.descriptor.group.clone(),
                });
            }
            Outcome::Removed { render, erased } => {
                if render.content_loaded {
                    self.layout().unload_render(&render, &self.context());
                }
                self.inner.canvas.destroy(render.node);
                debug!(item = %render.item, render = %render.id, node = %render.node, "render removed");
                self.emit(DeckEvent::RenderRemoved {
                    item: render.item.clone(),
                    render: render.id,
                    node: render.node,
                    group: render.descriptor.group.clone(),
                });
                if erased {
                    self.emit(DeckEvent::ItemErased {
                        id: render.item.clone(),
                    });
                }
            }
        }
    }

    /// Load or unload content depending on whether the render is on screen.
    fn update_visibility(&self, id: &ItemId, render: RenderId) {
        let Some((node, rect, loaded)) = self
            .inner
            .items
            .borrow()
            .get(id)
            .and_then(|e| e.renders.get(&render))
            .map(|r| (r.node, r.current.rect(), r.content_loaded))
        else {
            return;
        };
        let visible = self.inner.canvas.is_visible(node, &rect);
        if visible == loaded {
            return;
        }
        let snapshot = {
            let mut items = self.inner.items.borrow_mut();
            let Some(r) = items.get_mut(id).and_then(|e| e.renders.get_mut(&render)) else {
                return;
            };
            r.content_loaded = visible;
            r.clone()
        };
        let ctx = self.context();
        let layout = self.layout();
        if visible {
            trace!(item = %id, %render, "load content");
            layout.load_render(&snapshot, &ctx);
        } else {
            trace!(item = %id, %render, "unload content");
            layout.unload_render(&snapshot, &ctx);
        }
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<Reconciler> {
    weak.upgrade().map(|inner| Reconciler { inner })
}

/// Bump the render's generation and build a request from its current state.
fn retarget(render: &mut RealizedRender, to: Transform, options: AnimationOptions) -> Request {
    render.generation += 1;
    render.began = false;
    Request {
        key: RenderKey {
            item: render.item.clone(),
            render: render.id,
            node: render.node,
            generation: render.generation,
        },
        from: render.current,
        to,
        options,
    }
}

/// Retarget a render onto its own descriptor.
fn retarget_to_descriptor(render: &mut RealizedRender) -> Request {
    let to = render.descriptor.transform;
    let options = render.descriptor.options;
    retarget(render, to, options)
}
