#![forbid(unsafe_code)]

//! In-memory [`Surface`] for tests.

use std::cell::Cell;
use std::rc::Rc;

use deck_core::{NodeId, Point, Rect};

use crate::surface::Surface;

/// Surface backed by plain cells; counts position writes.
#[derive(Debug)]
pub struct TestSurface {
    node: NodeId,
    rect: Cell<Rect>,
    scroll: Cell<Point>,
    moves: Cell<usize>,
}

impl TestSurface {
    #[must_use]
    pub fn new(node: u64, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            node: NodeId(node),
            rect: Cell::new(rect),
            scroll: Cell::new(Point::ZERO),
            moves: Cell::new(0),
        })
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.rect.get().origin()
    }

    /// Number of `set_position` calls so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves.get()
    }

    /// Resize without counting as a move.
    pub fn resize(&self, width: f64, height: f64) {
        let r = self.rect.get();
        self.rect.set(Rect::new(r.left, r.top, width, height));
    }
}

impl Surface for TestSurface {
    fn node(&self) -> NodeId {
        self.node
    }

    fn rect(&self) -> Rect {
        self.rect.get()
    }

    fn set_position(&self, position: Point) {
        let r = self.rect.get();
        self.rect.set(Rect::new(position.x, position.y, r.width, r.height));
        self.moves.set(self.moves.get() + 1);
    }

    fn scroll_offset(&self) -> Point {
        self.scroll.get()
    }

    fn set_scroll_offset(&self, offset: Point) {
        self.scroll.set(offset);
    }
}
