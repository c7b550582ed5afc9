#![forbid(unsafe_code)]

//! Gesture group coordinator: several units that pan as one.
//!
//! # Invariants
//!
//! 1. Membership is a set by identity; adding a member twice is a no-op.
//! 2. Bounds are derived only from member geometry and the container, so
//!    recomputing them any number of times yields the same rectangles.
//! 3. Each member's bounds allow exactly the group translations that keep
//!    the union of member rectangles covering the container. An axis on which
//!    the union fits inside the container is locked at the current position.

use std::cell::RefCell;
use std::rc::Rc;

use deck_core::{Point, Rect};
use tracing::{debug, trace};

use crate::config::MoveMode;
use crate::input::GestureInput;
use crate::unit::GestureUnit;

pub(crate) struct GroupInner {
    container: Box<dyn Fn() -> Rect>,
    members: RefCell<Vec<GestureUnit>>,
}

/// Ordered set of [`GestureUnit`]s sharing one logical gesture.
///
/// Cloning a `GestureGroup` creates a new handle to the **same** group.
#[derive(Clone)]
pub struct GestureGroup {
    inner: Rc<GroupInner>,
}

impl std::fmt::Debug for GestureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureGroup")
            .field("members", &self.inner.members.borrow().len())
            .field("container", &(self.inner.container)())
            .finish()
    }
}

/// Allowed group translation along one axis.
///
/// Returns `(min, max)`; both are zero when the content fits the container.
fn translation_range(content_start: f64, content_len: f64, start: f64, len: f64) -> (f64, f64) {
    if content_len <= len {
        return (0.0, 0.0);
    }
    let min = (start + len) - (content_start + content_len);
    let max = start - content_start;
    (min, max)
}

impl GestureGroup {
    /// Create an empty group whose container geometry is read on demand.
    pub fn new(container: impl Fn() -> Rect + 'static) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                container: Box::new(container),
                members: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<GroupInner>) -> Self {
        Self { inner }
    }

    /// Whether two handles refer to the same group.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.members.borrow().is_empty()
    }

    #[must_use]
    pub fn contains(&self, unit: &GestureUnit) -> bool {
        self.inner.members.borrow().iter().any(|m| m.ptr_eq(unit))
    }

    #[must_use]
    pub fn members(&self) -> Vec<GestureUnit> {
        self.inner.members.borrow().clone()
    }

    #[must_use]
    pub fn container(&self) -> Rect {
        (self.inner.container)()
    }

    /// Add `unit` and recompute bounds. Returns `false` if already a member.
    pub fn add_member(&self, unit: &GestureUnit) -> bool {
        if self.contains(unit) {
            return false;
        }
        if let Some(previous) = unit.group() {
            previous.remove_member(unit);
        }
        self.inner.members.borrow_mut().push(unit.clone());
        unit.set_group(Rc::downgrade(&self.inner));
        self.update_bounds();
        true
    }

    /// Remove `unit` and recompute bounds. Returns `false` if not a member.
    pub fn remove_member(&self, unit: &GestureUnit) -> bool {
        let removed = {
            let mut members = self.inner.members.borrow_mut();
            let before = members.len();
            members.retain(|m| !m.ptr_eq(unit));
            members.len() != before
        };
        if removed {
            unit.set_group(std::rc::Weak::new());
            self.update_bounds();
        }
        removed
    }

    /// Recompute every member's bounds from the union of member geometry.
    pub fn update_bounds(&self) {
        let members = self.members();
        let rects: Vec<Rect> = members.iter().map(|m| m.surface().rect()).collect();
        let Some(union) = Rect::union_all(&rects) else {
            return;
        };
        let container = self.container().normalize();
        let (x_min, x_max) =
            translation_range(union.left, union.width, container.left, container.width);
        let (y_min, y_max) =
            translation_range(union.top, union.height, container.top, container.height);
        debug!(
            members = members.len(),
            x_min, x_max, y_min, y_max, "group bounds updated"
        );

        for (member, rect) in members.iter().zip(&rects) {
            let bounds = match member.config().mode {
                MoveMode::Position => Rect::from_edges(
                    rect.left + x_min,
                    rect.top + y_min,
                    rect.left + x_max,
                    rect.top + y_max,
                ),
                MoveMode::Scroll => {
                    // Content moves opposite to the scroll offset.
                    let offset = member.surface().scroll_offset();
                    Rect::from_edges(
                        offset.x - x_max,
                        offset.y - y_max,
                        offset.x - x_min,
                        offset.y - y_min,
                    )
                }
            };
            member.set_bounds(bounds);
        }
    }

    /// Replay a gesture handled by `origin` on every other member.
    ///
    /// Members sharing `origin`'s surface are skipped since that surface has
    /// already moved. Taps and presses stay with the member that saw them.
    pub fn apply_gesture(&self, origin: &GestureUnit, input: &GestureInput) {
        if matches!(input, GestureInput::Tap { .. } | GestureInput::Press { .. }) {
            return;
        }
        let node = origin.node();
        for member in self.members() {
            if member.ptr_eq(origin) || member.node() == node {
                continue;
            }
            trace!(from = %node, to = %member.node(), kind = ?input.kind(), "replay gesture");
            member.apply(input);
        }
    }

    /// Translation the group may still move by before reaching its bounds,
    /// measured on the first member.
    #[must_use]
    pub fn slack(&self) -> Option<Rect> {
        let first = self.inner.members.borrow().first().cloned()?;
        let position = first.position();
        Some(first.bounds().translate(Point::ZERO - position))
    }
}
