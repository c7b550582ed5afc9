#![forbid(unsafe_code)]

//! Contract of the canvas/frame pair that owns the physical visual nodes.

use std::rc::Rc;

use deck_core::animation::Transform;
use deck_core::{ItemId, NodeId, Rect, RenderId};
use deck_gesture::Surface;

/// Host-side owner of visual nodes and the visible frame.
///
/// All methods take `&self`; implementations use interior mutability.
/// None of them may call back into the reconciler synchronously.
pub trait Canvas {
    /// Visible frame rectangle in canvas coordinates.
    fn frame_bounds(&self) -> Rect;

    /// Create a detached node for one render of `item`.
    fn create_node(&self, item: &ItemId, render: RenderId) -> NodeId;

    /// Physically insert `node` into the live tree.
    fn attach(&self, node: NodeId);

    /// Push interpolated visual properties to `node`.
    fn apply(&self, node: NodeId, transform: &Transform);

    /// Detach and drop `node`.
    fn destroy(&self, node: NodeId);

    /// Whether `node`, currently covering `rect`, is visible in the frame.
    fn is_visible(&self, _node: NodeId, rect: &Rect) -> bool {
        self.frame_bounds().intersects(rect)
    }

    /// Movable surface backing `node`, for gesture-enabled renders.
    fn surface(&self, _node: NodeId) -> Option<Rc<dyn Surface>> {
        None
    }
}
