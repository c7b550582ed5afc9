#![forbid(unsafe_code)]

//! The visual surface a gesture unit moves.

use deck_core::{NodeId, Point, Rect};

/// A movable visual surface.
///
/// Implemented by the host's canvas (one per gesture-enabled node).
pub trait Surface {
    /// Identity of the underlying node.
    fn node(&self) -> NodeId;

    /// Current geometry in container coordinates.
    fn rect(&self) -> Rect;

    /// Move the surface's top-left corner.
    fn set_position(&self, position: Point);

    /// Current scroll offset (scrollable surfaces only).
    fn scroll_offset(&self) -> Point {
        Point::ZERO
    }

    /// Set the scroll offset (scrollable surfaces only).
    fn set_scroll_offset(&self, _offset: Point) {}
}
