#![forbid(unsafe_code)]

//! Stack layout: displayed items pile up in the middle of the frame.

use deck_core::animation::{AnimationOptions, AnimationSpec, Transform};
use deck_core::{GroupId, Point, Rect};
use deck_gesture::GestureConfig;
use deck_index::Item;
use deck_render::{LayoutContext, LayoutPolicy, RenderDescriptor, default_hide, default_show};

use crate::cells::Cells;

/// A pile of cards, first displayed item on top.
///
/// Each card below the top is shifted by `offset`, shrunk by `scale_step`,
/// and cards deeper than `visible_depth` are fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayout {
    card: Cells,
    offset: Point,
    scale_step: f64,
    visible_depth: usize,
    group: Option<GroupId>,
    timing: AnimationOptions,
    show: AnimationSpec,
    hide: AnimationSpec,
    gesture: Option<GestureConfig>,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            card: Cells::new(200.0, 280.0, 0.0),
            offset: Point::new(0.0, 8.0),
            scale_step: 0.04,
            visible_depth: 4,
            group: None,
            timing: AnimationOptions::default(),
            show: default_show(),
            hide: default_hide(),
            gesture: None,
        }
    }
}

impl StackLayout {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            card: Cells::new(width, height, 0.0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn scale_step(mut self, step: f64) -> Self {
        self.scale_step = step;
        self
    }

    #[must_use]
    pub fn visible_depth(mut self, depth: usize) -> Self {
        self.visible_depth = depth;
        self
    }

    /// Put every card in one gesture group so the pile pans together.
    #[must_use]
    pub fn group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn timing(mut self, timing: AnimationOptions) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn show(mut self, show: AnimationSpec) -> Self {
        self.show = show;
        self
    }

    #[must_use]
    pub fn hide(mut self, hide: AnimationSpec) -> Self {
        self.hide = hide;
        self
    }

    #[must_use]
    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = Some(gesture);
        self
    }

    /// Transform of the card at `depth` in a pile of `count`.
    #[must_use]
    pub fn card_transform(&self, frame: Rect, depth: usize, count: usize) -> Transform {
        let center = frame.center();
        let d = depth as f64;
        let rect = Rect::new(
            center.x - self.card.width / 2.0 + self.offset.x * d,
            center.y - self.card.height / 2.0 + self.offset.y * d,
            self.card.width,
            self.card.height,
        );
        Transform {
            scale: (1.0 - self.scale_step * d).max(0.1),
            opacity: if depth < self.visible_depth { 1.0 } else { 0.0 },
            z_index: i32::try_from(count.saturating_sub(depth)).unwrap_or(i32::MAX),
            ..Transform::from_rect(rect)
        }
    }
}

impl LayoutPolicy for StackLayout {
    fn renders(&self, item: &Item, ctx: &LayoutContext) -> Vec<RenderDescriptor> {
        let Some(depth) = item.display_index() else {
            return Vec::new();
        };
        let transform = self.card_transform(ctx.frame, depth, ctx.displayed_count);
        let descriptor = RenderDescriptor::new(transform).with_options(self.timing);
        vec![match &self.group {
            Some(group) => descriptor.with_group(group.clone()),
            None => descriptor,
        }]
    }

    fn show_animation(&self) -> AnimationSpec {
        self.show
    }

    fn hide_animation(&self) -> AnimationSpec {
        self.hide
    }

    fn canvas_gesture_options(&self) -> Option<GestureConfig> {
        self.gesture
    }
}
