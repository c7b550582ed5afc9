#![forbid(unsafe_code)]

//! The narrow contract a layout implements.

use std::time::Duration;

use deck_core::Rect;
use deck_core::animation::{AnimationOptions, AnimationSpec, Easing, TransformPatch};
use deck_gesture::GestureConfig;
use deck_index::Item;

use crate::descriptor::{RealizedRender, RenderDescriptor};

/// Per-call context handed to a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Visible frame rectangle.
    pub frame: Rect,
    /// Number of items currently displayed by the index.
    pub displayed_count: usize,
}

/// Default enter animation: fade in from transparent.
#[must_use]
pub fn default_show() -> AnimationSpec {
    AnimationSpec {
        patch: TransformPatch::opacity(0.0),
        options: AnimationOptions::new(Duration::from_millis(300), Easing::EaseOut),
    }
}

/// Default exit animation: fade out.
#[must_use]
pub fn default_hide() -> AnimationSpec {
    AnimationSpec {
        patch: TransformPatch::opacity(0.0),
        options: AnimationOptions::new(Duration::from_millis(300), Easing::EaseIn),
    }
}

/// Layout policy: maps displayed items to render descriptors.
pub trait LayoutPolicy {
    /// Descriptors for one displayed item; render ids are sequence positions.
    fn renders(&self, item: &Item, ctx: &LayoutContext) -> Vec<RenderDescriptor>;

    /// A render's node became visible; load its content.
    fn load_render(&self, _render: &RealizedRender, _ctx: &LayoutContext) {}

    /// A render's node left the frame; release its content.
    fn unload_render(&self, _render: &RealizedRender, _ctx: &LayoutContext) {}

    /// Start state and timing for renders entering the canvas.
    fn show_animation(&self) -> AnimationSpec {
        default_show()
    }

    /// End state and timing for renders leaving the canvas.
    fn hide_animation(&self) -> AnimationSpec {
        default_hide()
    }

    /// Gesture options for the canvas itself, overriding the configured ones.
    fn canvas_gesture_options(&self) -> Option<GestureConfig> {
        None
    }
}
