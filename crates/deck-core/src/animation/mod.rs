#![forbid(unsafe_code)]

//! Animation contract between Deck and an animation engine.
//!
//! Deck never interpolates on its own. Components describe *where* a node
//! should end up ([`AnimationTarget`]) and *how* to get there
//! ([`AnimationOptions`]), then hand both to an [`Animator`] together with
//! [`AnimationCallbacks`]. The engine reports back through those callbacks:
//!
//! - `begin` exactly once, when the animation starts running,
//! - `progress` zero or more times with the interpolated value,
//! - `complete` exactly once, even for zero-duration animations and for
//!   animations superseded by a newer one on the same node.
//!
//! Callers apply interpolated values themselves (the reconciler pushes them
//! to the canvas, gesture units to their surface), which keeps engines free
//! of any knowledge about visual nodes.

mod tween;

#[cfg(any(test, feature = "test-helpers"))]
mod recording;

pub use tween::TweenEngine;

#[cfg(any(test, feature = "test-helpers"))]
pub use recording::{RecordedCall, RecordingAnimator};

use std::time::Duration;

use crate::geometry::{Point, Rect};
use crate::id::NodeId;

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Timing curve applied to linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] to eased progress.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Visual properties of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    /// Rotation in degrees.
    pub rotate: f64,
    pub opacity: f64,
    pub z_index: i32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale: 1.0,
            rotate: 0.0,
            opacity: 1.0,
            z_index: 0,
        }
    }
}

impl Transform {
    /// A transform placing a node on `rect` with default visuals.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Bounding rectangle after scaling about the top-left corner.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.width * self.scale,
            self.height * self.scale,
        )
    }

    /// Linear interpolation; `z_index` jumps to the target as soon as `t > 0`.
    #[must_use]
    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            left: mix(self.left, to.left),
            top: mix(self.top, to.top),
            width: mix(self.width, to.width),
            height: mix(self.height, to.height),
            scale: mix(self.scale, to.scale),
            rotate: mix(self.rotate, to.rotate),
            opacity: mix(self.opacity, to.opacity),
            z_index: if t > 0.0 { to.z_index } else { self.z_index },
        }
    }
}

/// Partial transform overlaid on a full one (show/hide animation states).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale: Option<f64>,
    pub rotate: Option<f64>,
    pub opacity: Option<f64>,
    pub z_index: Option<i32>,
}

impl TransformPatch {
    /// Fade to (or from) the given opacity.
    #[must_use]
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Builder: also set scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `base` with every present field of this patch replacing its counterpart.
    #[must_use]
    pub fn apply_to(&self, base: &Transform) -> Transform {
        Transform {
            left: self.left.unwrap_or(base.left),
            top: self.top.unwrap_or(base.top),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            scale: self.scale.unwrap_or(base.scale),
            rotate: self.rotate.unwrap_or(base.rotate),
            opacity: self.opacity.unwrap_or(base.opacity),
            z_index: self.z_index.unwrap_or(base.z_index),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests and reports
// ---------------------------------------------------------------------------

/// Timing of one animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationOptions {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::EaseInOut,
            delay: Duration::ZERO,
        }
    }
}

impl AnimationOptions {
    #[must_use]
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    /// Zero-duration options: the value lands on the first frame.
    #[must_use]
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Easing::Linear)
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Preset state and timing for entering or leaving the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationSpec {
    pub patch: TransformPatch,
    pub options: AnimationOptions,
}

/// What an animation interpolates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationTarget {
    /// Visual properties of a node.
    Transform { from: Transform, to: Transform },
    /// Top-left position of a directly positioned surface.
    Position { from: Point, to: Point },
    /// Scroll offset of a scrollable surface.
    Scroll { from: Point, to: Point },
}

impl AnimationTarget {
    /// Value at eased progress `t`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> AnimatedValue {
        match self {
            Self::Transform { from, to } => AnimatedValue::Transform(from.lerp(to, t)),
            Self::Position { from, to } => AnimatedValue::Position(lerp_point(*from, *to, t)),
            Self::Scroll { from, to } => AnimatedValue::Scroll(lerp_point(*from, *to, t)),
        }
    }

    /// Final value.
    #[must_use]
    pub fn end_value(&self) -> AnimatedValue {
        match self {
            Self::Transform { to, .. } => AnimatedValue::Transform(*to),
            Self::Position { to, .. } => AnimatedValue::Position(*to),
            Self::Scroll { to, .. } => AnimatedValue::Scroll(*to),
        }
    }
}

fn lerp_point(from: Point, to: Point, t: f64) -> Point {
    from + (to - from) * t
}

/// An interpolated value handed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedValue {
    Transform(Transform),
    Position(Point),
    Scroll(Point),
}

impl AnimatedValue {
    /// The point carried by a position or scroll value.
    #[must_use]
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::Transform(_) => None,
            Self::Position(p) | Self::Scroll(p) => Some(*p),
        }
    }

    /// The transform carried by a transform value.
    #[must_use]
    pub fn transform(&self) -> Option<Transform> {
        match self {
            Self::Transform(t) => Some(*t),
            Self::Position(_) | Self::Scroll(_) => None,
        }
    }
}

/// Payload of a `progress` callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Linear (uneased) progress in [0, 1].
    pub fraction: f64,
    pub value: AnimatedValue,
}

/// Payload of a `complete` callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub value: AnimatedValue,
    /// The animation was superseded or stopped before reaching its target.
    pub interrupted: bool,
}

type BeginFn = Box<dyn FnOnce()>;
type ProgressFn = Box<dyn FnMut(&Progress)>;
type CompleteFn = Box<dyn FnOnce(&Completion)>;

/// Lifecycle hooks for one animation.
#[derive(Default)]
pub struct AnimationCallbacks {
    pub begin: Option<BeginFn>,
    pub progress: Option<ProgressFn>,
    pub complete: Option<CompleteFn>,
}

impl std::fmt::Debug for AnimationCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationCallbacks")
            .field("begin", &self.begin.is_some())
            .field("progress", &self.progress.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

impl AnimationCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_begin(mut self, f: impl FnOnce() + 'static) -> Self {
        self.begin = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_progress(mut self, f: impl FnMut(&Progress) + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce(&Completion) + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

/// An animation engine.
///
/// Engines must not invoke callbacks from inside [`animate`](Self::animate)
/// or [`stop`](Self::stop); callers may hold state borrowed while issuing
/// requests.
pub trait Animator {
    /// Start animating `node`. An animation already running on `node` is
    /// superseded: it completes with `interrupted = true`.
    fn animate(
        &self,
        node: NodeId,
        target: AnimationTarget,
        options: AnimationOptions,
        callbacks: AnimationCallbacks,
    );

    /// Stop the animation running on `node`, if any (completes interrupted).
    fn stop(&self, node: NodeId);

    /// Whether an animation is in flight for `node`.
    fn is_animating(&self, node: NodeId) -> bool;
}
