#![forbid(unsafe_code)]

//! Render descriptors (requested state) and realized renders (live state).

use deck_core::animation::{AnimationOptions, Completion, Progress, Transform};
use deck_core::{GroupId, ItemId, NodeId, RenderId};

/// One requested visual manifestation of an item.
///
/// Produced fresh on every layout pass; its [`RenderId`] is its position in
/// the sequence the layout returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDescriptor {
    pub transform: Transform,
    pub options: AnimationOptions,
    /// Gesture group this render's surface joins, if any.
    pub group: Option<GroupId>,
}

impl RenderDescriptor {
    #[must_use]
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            options: AnimationOptions::default(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AnimationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A descriptor bound to a live visual node.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedRender {
    pub(crate) id: RenderId,
    pub(crate) item: ItemId,
    pub(crate) node: NodeId,
    pub(crate) descriptor: RenderDescriptor,
    /// Last transform pushed to the canvas.
    pub(crate) current: Transform,
    pub(crate) removing: bool,
    pub(crate) in_canvas: bool,
    pub(crate) content_loaded: bool,
    pub(crate) generation: u64,
    pub(crate) began: bool,
    pub(crate) last_progress: Option<Progress>,
    pub(crate) last_completion: Option<Completion>,
}

impl RealizedRender {
    pub(crate) fn new(
        id: RenderId,
        item: ItemId,
        node: NodeId,
        descriptor: RenderDescriptor,
        start: Transform,
    ) -> Self {
        Self {
            id,
            item,
            node,
            descriptor,
            current: start,
            removing: false,
            in_canvas: false,
            content_loaded: false,
            generation: 0,
            began: false,
            last_progress: None,
            last_completion: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> RenderId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &RenderDescriptor {
        &self.descriptor
    }

    /// Target transform of the latest descriptor.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Transform {
        &self.descriptor.transform
    }

    /// Transform currently shown on the canvas.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &Transform {
        &self.current
    }

    #[inline]
    #[must_use]
    pub fn group(&self) -> Option<&GroupId> {
        self.descriptor.group.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_removing(&self) -> bool {
        self.removing
    }

    #[inline]
    #[must_use]
    pub fn is_in_canvas(&self) -> bool {
        self.in_canvas
    }

    #[inline]
    #[must_use]
    pub fn is_content_loaded(&self) -> bool {
        self.content_loaded
    }

    /// Whether the latest animation has fired `begin`.
    #[must_use]
    pub fn has_begun(&self) -> bool {
        self.began
    }

    #[must_use]
    pub fn last_progress(&self) -> Option<&Progress> {
        self.last_progress.as_ref()
    }

    #[must_use]
    pub fn last_completion(&self) -> Option<&Completion> {
        self.last_completion.as_ref()
    }
}
