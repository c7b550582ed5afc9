#![forbid(unsafe_code)]

//! Gesture physics unit: turns pointer gestures into bounded surface motion.
//!
//! # State Machine
//!
//! ```text
//!   idle ──PanStart──▶ dragging ──PanEnd──▶ snapping ──complete──▶ idle
//!                                  │
//!                                Swipe
//!                                  ▼
//!                              inertia ──complete──▶ snapping
//! ```
//!
//! A `PanStart` while snapping or in inertia supersedes the running motion:
//! the animation is stopped, its follow-up snap is cancelled, and the drag
//! starts from wherever the surface currently is.
//!
//! # Invariants
//!
//! 1. Motion inside the bounds is 1:1 with the gesture delta.
//! 2. Past a bound, the first `resistance_threshold` pixels are 1:1. Beyond
//!    that the overshoot becomes `resistance_threshold + excess * resistance_scale`.
//! 3. Snap-back touches only the axes that are out of bounds.
//! 4. Only the newest motion's callbacks may move the surface (generation
//!    check), so superseded animations never fight a live drag.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use deck_core::animation::{
    AnimationCallbacks, AnimationOptions, AnimationTarget, Animator, Completion, Progress,
};
use deck_core::{ConfigurationError, NodeId, Point, Rect};
use tracing::{debug, trace};

use crate::config::{Axes, GestureConfig, MoveMode, Recognizer};
use crate::group::{GestureGroup, GroupInner};
use crate::input::GestureInput;
use crate::surface::Surface;

/// Damp a one-axis candidate position against `[min, max]`.
///
/// Inside the range, and up to `threshold` past an edge, the candidate is
/// returned unchanged. Once `excess > threshold` the result sits
/// `threshold + excess * scale` beyond that edge.
#[must_use]
pub fn resist(candidate: f64, min: f64, max: f64, threshold: f64, scale: f64) -> f64 {
    let (edge, excess, direction) = if candidate < min {
        (min, min - candidate, -1.0)
    } else if candidate > max {
        (max, candidate - max, 1.0)
    } else {
        return candidate;
    };
    if excess <= threshold {
        return candidate;
    }
    edge + direction * (threshold + excess * scale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionKind {
    Snap,
    Inertia,
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    generation: u64,
    kind: MotionKind,
}

type TapListener = Rc<dyn Fn(&GestureInput)>;

struct UnitState {
    surface: Rc<dyn Surface>,
    animator: Rc<dyn Animator>,
    recognizer: Recognizer,
    config: GestureConfig,
    bounds: Rect,
    origin: Option<Point>,
    motion: Option<Motion>,
    generation: u64,
    group: Weak<GroupInner>,
    listeners: Vec<TapListener>,
}

impl UnitState {
    fn current(&self) -> Point {
        match self.config.mode {
            MoveMode::Position => self.surface.rect().origin(),
            MoveMode::Scroll => self.surface.scroll_offset(),
        }
    }

    fn place(&self, p: Point) {
        match self.config.mode {
            MoveMode::Position => self.surface.set_position(p),
            MoveMode::Scroll => self.surface.set_scroll_offset(p),
        }
    }

    fn target(&self, from: Point, to: Point) -> AnimationTarget {
        match self.config.mode {
            MoveMode::Position => AnimationTarget::Position { from, to },
            MoveMode::Scroll => AnimationTarget::Scroll { from, to },
        }
    }

    /// Zero out components on disabled axes.
    fn mask(&self, v: Point) -> Point {
        Point::new(
            if self.config.axes.contains(Axes::HORIZONTAL) { v.x } else { 0.0 },
            if self.config.axes.contains(Axes::VERTICAL) { v.y } else { 0.0 },
        )
    }

    fn resisted(&self, candidate: Point) -> Point {
        let b = self.bounds;
        let c = &self.config;
        Point::new(
            resist(candidate.x, b.left, b.right(), c.resistance_threshold, c.resistance_scale),
            resist(candidate.y, b.top, b.bottom(), c.resistance_threshold, c.resistance_scale),
        )
    }
}

/// Builder for [`GestureUnit`]; surface, animator, and recognizer are required.
#[derive(Default)]
pub struct GestureUnitBuilder {
    surface: Option<Rc<dyn Surface>>,
    animator: Option<Rc<dyn Animator>>,
    recognizer: Option<Recognizer>,
    config: GestureConfig,
    bounds: Option<Rect>,
}

impl std::fmt::Debug for GestureUnitBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureUnitBuilder")
            .field("surface", &self.surface.as_ref().map(|s| s.node()))
            .field("animator", &self.animator.is_some())
            .field("recognizer", &self.recognizer)
            .field("config", &self.config)
            .finish()
    }
}

impl GestureUnitBuilder {
    #[must_use]
    pub fn surface(mut self, surface: Rc<dyn Surface>) -> Self {
        self.surface = Some(surface);
        self
    }

    #[must_use]
    pub fn animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    #[must_use]
    pub fn recognizer(mut self, recognizer: Recognizer) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    #[must_use]
    pub fn config(mut self, config: GestureConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Build the unit, failing on missing collaborators or bad tuning.
    pub fn build(self) -> Result<GestureUnit, ConfigurationError> {
        let surface = self.surface.ok_or(ConfigurationError::MissingSurface)?;
        let recognizer = self.recognizer.ok_or(ConfigurationError::MissingRecognizer)?;
        let animator = self.animator.ok_or(ConfigurationError::MissingAnimator)?;
        self.config.validate()?;
        Ok(GestureUnit {
            state: Rc::new(RefCell::new(UnitState {
                surface,
                animator,
                recognizer,
                config: self.config,
                bounds: self.bounds.unwrap_or_else(Rect::unbounded).normalize(),
                origin: None,
                motion: None,
                generation: 0,
                group: Weak::new(),
                listeners: Vec::new(),
            })),
        })
    }
}

/// Per-surface gesture physics.
///
/// Cloning a `GestureUnit` creates a new handle to the **same** unit.
#[derive(Clone)]
pub struct GestureUnit {
    state: Rc<RefCell<UnitState>>,
}

impl std::fmt::Debug for GestureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("GestureUnit")
            .field("node", &state.surface.node())
            .field("bounds", &state.bounds)
            .field("dragging", &state.origin.is_some())
            .field("motion", &state.motion.map(|m| m.kind))
            .finish()
    }
}

impl GestureUnit {
    #[must_use]
    pub fn builder() -> GestureUnitBuilder {
        GestureUnitBuilder::default()
    }

    /// Whether two handles refer to the same unit.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.state.borrow().surface.node()
    }

    #[must_use]
    pub fn surface(&self) -> Rc<dyn Surface> {
        Rc::clone(&self.state.borrow().surface)
    }

    #[must_use]
    pub fn config(&self) -> GestureConfig {
        self.state.borrow().config
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds.normalize();
    }

    /// Current position (or scroll offset in scroll mode).
    #[must_use]
    pub fn position(&self) -> Point {
        self.state.borrow().current()
    }

    #[must_use]
    pub fn is_inertia_running(&self) -> bool {
        self.state
            .borrow()
            .motion
            .is_some_and(|m| m.kind == MotionKind::Inertia)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().origin.is_some()
    }

    /// The group this unit belongs to, if any.
    #[must_use]
    pub fn group(&self) -> Option<GestureGroup> {
        self.state.borrow().group.upgrade().map(GestureGroup::from_inner)
    }

    pub(crate) fn set_group(&self, group: Weak<GroupInner>) {
        self.state.borrow_mut().group = group;
    }

    /// Register a listener for taps and presses on this surface.
    pub fn on_tap(&self, listener: impl Fn(&GestureInput) + 'static) {
        self.state.borrow_mut().listeners.push(Rc::new(listener));
    }

    /// Handle a gesture from the recognizer: move this surface, then replay
    /// the gesture on the rest of the group.
    pub fn handle(&self, input: &GestureInput) {
        if !self.state.borrow().recognizer.accepts(input.kind()) {
            return;
        }
        let group = self.group();
        if let Some(group) = &group
            && matches!(input, GestureInput::PanStart | GestureInput::Wheel { .. })
        {
            group.update_bounds();
        }
        self.apply(input);
        if let Some(group) = group {
            group.apply_gesture(self, input);
        }
    }

    /// Apply a gesture to this surface only.
    pub fn apply(&self, input: &GestureInput) {
        match *input {
            GestureInput::PanStart => self.on_gesture_start(),
            GestureInput::PanMove { delta } => self.on_gesture_move(delta),
            GestureInput::PanEnd { .. } => self.on_gesture_end(),
            GestureInput::Swipe { velocity } => self.on_swipe(velocity),
            GestureInput::Wheel { delta } => self.on_wheel(delta),
            GestureInput::Tap { .. } | GestureInput::Press { .. } => {
                let listeners = self.state.borrow().listeners.clone();
                for listener in listeners {
                    listener(input);
                }
            }
        }
    }

    /// Snapshot the reference origin, superseding any running motion.
    pub fn on_gesture_start(&self) {
        let (animator, node) = {
            let mut state = self.state.borrow_mut();
            let running = state.motion.take();
            state.generation += 1;
            let origin = state.current();
            state.origin = Some(origin);
            trace!(node = %state.surface.node(), x = origin.x, y = origin.y, "gesture start");
            match running {
                Some(_) => (Some(Rc::clone(&state.animator)), state.surface.node()),
                None => (None, state.surface.node()),
            }
        };
        if let Some(animator) = animator {
            animator.stop(node);
        }
    }

    /// Move to origin + `delta` (cumulative), damped past the bounds.
    pub fn on_gesture_move(&self, delta: Point) {
        if self.state.borrow().origin.is_none() {
            self.on_gesture_start();
        }
        let state = self.state.borrow();
        let Some(origin) = state.origin else { return };
        let delta = state.mask(delta);
        let candidate = match state.config.mode {
            MoveMode::Position => origin + delta,
            MoveMode::Scroll => origin - delta,
        };
        let next = state.resisted(candidate);
        state.place(next);
    }

    /// End the drag; snap back unless inertia is already running.
    pub fn on_gesture_end(&self) {
        let inertia = {
            let mut state = self.state.borrow_mut();
            state.origin = None;
            state.motion.is_some_and(|m| m.kind == MotionKind::Inertia)
        };
        if !inertia {
            self.snap_to_bounds();
        }
    }

    /// Throw the surface with `velocity`, then snap back to the bounds.
    pub fn on_swipe(&self, velocity: Point) {
        let (from, to, duration) = {
            let state = self.state.borrow();
            let v = state.mask(velocity);
            let from = state.current();
            let scale = state.config.inertia_distance_scale;
            let to = match state.config.mode {
                MoveMode::Position => from - v * scale,
                MoveMode::Scroll => from + v * scale,
            };
            let ms = v.length() * state.config.inertia_duration_scale;
            (from, to, Duration::from_micros((ms.max(0.0) * 1000.0).round() as u64))
        };
        if from == to {
            self.snap_to_bounds();
            return;
        }
        let easing = self.state.borrow().config.inertia_easing;
        debug!(node = %self.node(), to_x = to.x, to_y = to.y, duration_ms = duration.as_millis() as u64, "inertia");
        self.start_motion(
            MotionKind::Inertia,
            from,
            to,
            AnimationOptions::new(duration, easing),
        );
    }

    /// Wheel scrolling: an instantaneous drag that snaps back like a pan.
    pub fn on_wheel(&self, delta: Point) {
        self.on_gesture_start();
        self.on_gesture_move(Point::ZERO - delta);
        self.on_gesture_end();
    }

    /// Animate each out-of-bounds axis back to its nearest bound.
    pub fn snap_to_bounds(&self) {
        let (from, to, options) = {
            let state = self.state.borrow();
            let from = state.current();
            let to = state.bounds.clamp_point(from);
            let options = AnimationOptions::new(state.config.snap_duration, state.config.snap_easing);
            (from, to, options)
        };
        if from == to {
            return;
        }
        debug!(node = %self.node(), from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, "snap to bounds");
        self.start_motion(MotionKind::Snap, from, to, options);
    }

    fn start_motion(&self, kind: MotionKind, from: Point, to: Point, options: AnimationOptions) {
        let (animator, node, target, generation) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            let generation = state.generation;
            state.motion = Some(Motion { generation, kind });
            (
                Rc::clone(&state.animator),
                state.surface.node(),
                state.target(from, to),
                generation,
            )
        };

        let on_progress = Rc::downgrade(&self.state);
        let on_complete = Rc::downgrade(&self.state);
        let callbacks = AnimationCallbacks::new()
            .on_progress(move |p: &Progress| {
                if let Some(state) = on_progress.upgrade() {
                    let state = state.borrow();
                    if state.generation == generation
                        && let Some(point) = p.value.point()
                    {
                        state.place(point);
                    }
                }
            })
            .on_complete(move |c: &Completion| {
                if let Some(state) = on_complete.upgrade() {
                    GestureUnit { state }.finish_motion(generation, kind, c);
                }
            });
        animator.animate(node, target, options, callbacks);
    }

    fn finish_motion(&self, generation: u64, kind: MotionKind, completion: &Completion) {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return;
            }
            if !completion.interrupted
                && let Some(point) = completion.value.point()
            {
                state.place(point);
            }
            state.motion = None;
        }
        if kind == MotionKind::Inertia && !completion.interrupted {
            self.snap_to_bounds();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureKinds;
    use crate::testing::TestSurface;
    use deck_core::animation::{AnimatedValue, RecordingAnimator};

    fn unit_with(
        surface: &Rc<TestSurface>,
        animator: &Rc<RecordingAnimator>,
        bounds: Rect,
    ) -> GestureUnit {
        GestureUnit::builder()
            .surface(Rc::clone(surface) as Rc<dyn Surface>)
            .animator(Rc::clone(animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::all())
            .bounds(bounds)
            .build()
            .expect("complete configuration")
    }

    #[test]
    fn build_requires_surface_and_recognizer() {
        let animator: Rc<dyn Animator> = Rc::new(RecordingAnimator::new());
        let err = GestureUnit::builder()
            .animator(Rc::clone(&animator))
            .recognizer(Recognizer::all())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingSurface);

        let err = GestureUnit::builder()
            .surface(TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0)))
            .animator(animator)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingRecognizer);
    }

    #[test]
    fn resist_inside_bounds_is_identity() {
        assert_eq!(resist(5.0, 0.0, 10.0, 4.0, 0.5), 5.0);
    }

    #[test]
    fn resist_within_threshold_is_undamped() {
        assert_eq!(resist(13.0, 0.0, 10.0, 4.0, 0.5), 13.0);
        assert_eq!(resist(-4.0, 0.0, 10.0, 4.0, 0.5), -4.0);
    }

    #[test]
    fn resist_damps_only_the_excess() {
        // 10 past the right edge, threshold 4: 4 + 10 * 0.5 = 9 past the edge.
        assert_eq!(resist(20.0, 0.0, 10.0, 4.0, 0.5), 19.0);
        assert_eq!(resist(-10.0, 0.0, 10.0, 4.0, 0.5), -9.0);
        // At or under the threshold the overshoot is 1:1.
        assert_eq!(resist(14.0, 0.0, 10.0, 4.0, 0.5), 14.0);
    }

    #[test]
    fn drag_inside_bounds_is_one_to_one() {
        let surface = TestSurface::new(1, Rect::new(50.0, 50.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, 0.0, 100.0, 100.0));

        unit.handle(&GestureInput::PanStart);
        unit.handle(&GestureInput::PanMove {
            delta: Point::new(20.0, -30.0),
        });
        assert_eq!(surface.position(), Point::new(70.0, 20.0));
    }

    #[test]
    fn drag_past_bounds_rubber_bands() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, 0.0, 0.0, 0.0));

        unit.on_gesture_start();
        unit.on_gesture_move(Point::new(40.0, 0.0));
        assert_eq!(surface.position(), Point::new(20.0, 0.0));
    }

    #[test]
    fn end_snaps_only_violated_axes() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, 0.0, 100.0, 100.0));

        unit.on_gesture_start();
        unit.on_gesture_move(Point::new(-20.0, 30.0));
        unit.on_gesture_end();

        assert_eq!(animator.call_count(), 1);
        let call = animator.call(0).unwrap();
        assert_eq!(
            call.target,
            AnimationTarget::Position {
                from: Point::new(-10.0, 30.0),
                to: Point::new(0.0, 30.0),
            }
        );
        animator.finish(0);
        assert_eq!(surface.position(), Point::new(0.0, 30.0));
    }

    #[test]
    fn end_inside_bounds_does_not_animate() {
        let surface = TestSurface::new(1, Rect::new(10.0, 10.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, 0.0, 100.0, 100.0));
        unit.on_gesture_start();
        unit.on_gesture_move(Point::new(5.0, 5.0));
        unit.on_gesture_end();
        assert_eq!(animator.call_count(), 0);
    }

    #[test]
    fn swipe_runs_inertia_then_snaps() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = GestureUnit::builder()
            .surface(Rc::clone(&surface) as Rc<dyn Surface>)
            .animator(Rc::clone(&animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::all())
            .bounds(Rect::new(0.0, 0.0, 100.0, 0.0))
            .config(GestureConfig {
                inertia_distance_scale: 100.0,
                inertia_duration_scale: 10.0,
                ..GestureConfig::default()
            })
            .build()
            .unwrap();

        unit.on_swipe(Point::new(-2.0, 0.0));
        assert!(unit.is_inertia_running());
        let inertia = animator.call(0).unwrap();
        assert_eq!(
            inertia.target,
            AnimationTarget::Position {
                from: Point::ZERO,
                to: Point::new(200.0, 0.0),
            }
        );
        assert_eq!(inertia.options.duration, Duration::from_millis(20));

        // Pan end during inertia does not snap.
        unit.on_gesture_end();
        assert_eq!(animator.call_count(), 1);

        animator.finish(0);
        assert!(!unit.is_inertia_running());
        assert_eq!(surface.position(), Point::new(200.0, 0.0));
        let snap = animator.call(1).expect("follow-up snap");
        assert_eq!(
            snap.target,
            AnimationTarget::Position {
                from: Point::new(200.0, 0.0),
                to: Point::new(100.0, 0.0),
            }
        );
    }

    #[test]
    fn scroll_swipe_follows_velocity_then_snaps() {
        let surface = TestSurface::new(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = GestureUnit::builder()
            .surface(Rc::clone(&surface) as Rc<dyn Surface>)
            .animator(Rc::clone(&animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::all())
            .bounds(Rect::new(0.0, 0.0, 100.0, 0.0))
            .config(GestureConfig {
                mode: MoveMode::Scroll,
                inertia_distance_scale: 100.0,
                inertia_duration_scale: 10.0,
                ..GestureConfig::default()
            })
            .build()
            .unwrap();

        // Scroll offsets move with the velocity, unlike positions.
        unit.on_swipe(Point::new(2.0, 0.0));
        let inertia = animator.call(0).unwrap();
        assert_eq!(
            inertia.target,
            AnimationTarget::Scroll {
                from: Point::ZERO,
                to: Point::new(200.0, 0.0),
            }
        );
        assert_eq!(inertia.options.duration, Duration::from_millis(20));

        animator.finish(0);
        assert_eq!(surface.scroll_offset(), Point::new(200.0, 0.0));
        assert_eq!(surface.position(), Point::ZERO);
        let snap = animator.call(1).expect("follow-up snap");
        assert_eq!(
            snap.target,
            AnimationTarget::Scroll {
                from: Point::new(200.0, 0.0),
                to: Point::new(100.0, 0.0),
            }
        );
        animator.finish(1);
        assert_eq!(surface.scroll_offset(), Point::new(100.0, 0.0));
    }

    #[test]
    fn new_gesture_supersedes_inertia() {
        let surface = TestSurface::new(9, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, 0.0, 0.0, 0.0));

        unit.on_swipe(Point::new(-1.0, 0.0));
        animator.progress(0, 0.5);
        let mid = surface.position();
        unit.on_gesture_start();
        assert_eq!(animator.stopped(), vec![NodeId(9)]);

        // The stale completion neither moves the surface nor snaps.
        animator.finish(0);
        assert_eq!(surface.position(), mid);
        assert_eq!(animator.call_count(), 1);
        assert!(unit.is_dragging());
    }

    #[test]
    fn scroll_mode_inverts_drag() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.set_scroll_offset(Point::new(100.0, 0.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = GestureUnit::builder()
            .surface(Rc::clone(&surface) as Rc<dyn Surface>)
            .animator(Rc::clone(&animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::all())
            .config(GestureConfig {
                mode: MoveMode::Scroll,
                ..GestureConfig::default()
            })
            .build()
            .unwrap();
        unit.on_gesture_start();
        unit.on_gesture_move(Point::new(30.0, 0.0));
        assert_eq!(surface.scroll_offset(), Point::new(70.0, 0.0));
        assert_eq!(surface.position(), Point::ZERO);
    }

    #[test]
    fn disabled_axis_does_not_move() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = GestureUnit::builder()
            .surface(Rc::clone(&surface) as Rc<dyn Surface>)
            .animator(Rc::clone(&animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::all())
            .config(GestureConfig {
                axes: Axes::VERTICAL,
                ..GestureConfig::default()
            })
            .build()
            .unwrap();
        unit.on_gesture_start();
        unit.on_gesture_move(Point::new(30.0, 15.0));
        assert_eq!(surface.position(), Point::new(0.0, 15.0));
    }

    #[test]
    fn recognizer_binding_filters_input() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = GestureUnit::builder()
            .surface(Rc::clone(&surface) as Rc<dyn Surface>)
            .animator(Rc::clone(&animator) as Rc<dyn Animator>)
            .recognizer(Recognizer::new(GestureKinds::TAP))
            .build()
            .unwrap();
        let taps = Rc::new(RefCell::new(0));
        let t = Rc::clone(&taps);
        unit.on_tap(move |_| *t.borrow_mut() += 1);

        unit.handle(&GestureInput::PanStart);
        unit.handle(&GestureInput::PanMove {
            delta: Point::new(5.0, 5.0),
        });
        unit.handle(&GestureInput::Tap { point: Point::ZERO });
        assert_eq!(surface.position(), Point::ZERO);
        assert_eq!(*taps.borrow(), 1);
    }

    #[test]
    fn wheel_moves_and_snaps_back() {
        let surface = TestSurface::new(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        let animator = Rc::new(RecordingAnimator::new());
        let unit = unit_with(&surface, &animator, Rect::new(0.0, -100.0, 0.0, 100.0));
        unit.handle(&GestureInput::Wheel {
            delta: Point::new(0.0, 40.0),
        });
        assert_eq!(surface.position(), Point::new(0.0, -40.0));
        assert_eq!(animator.call_count(), 0, "still inside bounds");

        unit.handle(&GestureInput::Wheel {
            delta: Point::new(0.0, 100.0),
        });
        assert_eq!(surface.position(), Point::new(0.0, -120.0));
        assert_eq!(animator.call_count(), 1);
        assert_eq!(
            animator.call(0).unwrap().target.end_value(),
            AnimatedValue::Position(Point::new(0.0, -100.0))
        );
    }
}
