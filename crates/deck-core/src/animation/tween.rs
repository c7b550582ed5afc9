#![forbid(unsafe_code)]

//! Tick-driven tween engine.
//!
//! [`TweenEngine`] keeps at most one tween per node and advances all of them
//! on [`tick`](TweenEngine::tick). It is the reference [`Animator`]: hosts
//! call `tick` once per animation frame, tests call it with fixed steps.
//!
//! # Invariants
//!
//! 1. Callbacks fire only from inside `tick`, never from `animate`/`stop`.
//! 2. Per tween: `begin` once, then `progress` once per tick while running,
//!    then `complete` once.
//! 3. A superseded or stopped tween completes with `interrupted = true` on
//!    the next tick, carrying the last value it reached.
//! 4. A zero-duration tween begins, reports its final value and completes
//!    on the first tick after it was requested.

use std::cell::RefCell;
use std::time::Duration;

use tracing::trace;

use super::{
    AnimatedValue, AnimationCallbacks, AnimationOptions, AnimationTarget, Animator, Completion,
    Progress,
};
use crate::id::NodeId;

struct Tween {
    id: u64,
    node: NodeId,
    target: AnimationTarget,
    options: AnimationOptions,
    elapsed: Duration,
    last: AnimatedValue,
    begun: bool,
    callbacks: AnimationCallbacks,
}

impl Tween {
    /// Linear progress, or `None` while still inside the delay.
    fn fraction(&self) -> Option<f64> {
        let running = self.elapsed.checked_sub(self.options.delay)?;
        if self.options.duration.is_zero() {
            return Some(1.0);
        }
        Some((running.as_secs_f64() / self.options.duration.as_secs_f64()).min(1.0))
    }
}

#[derive(Default)]
struct EngineState {
    next_id: u64,
    active: Vec<Tween>,
    interrupted: Vec<Tween>,
}

impl EngineState {
    fn supersede(&mut self, node: NodeId) {
        if let Some(pos) = self.active.iter().position(|t| t.node == node) {
            let tween = self.active.remove(pos);
            trace!(node = %node, tween = tween.id, "tween superseded");
            self.interrupted.push(tween);
        }
    }
}

/// One callback invocation prepared under the borrow and run after it.
enum Work {
    Begin(Box<dyn FnOnce()>),
    Progress {
        tween: u64,
        callback: Box<dyn FnMut(&Progress)>,
        progress: Progress,
        /// Hand the closure back to the tween afterwards (it keeps running).
        restore: bool,
    },
    Complete(Box<dyn FnOnce(&Completion)>, Completion),
}

/// Reference animation engine driven by explicit ticks.
#[derive(Default)]
pub struct TweenEngine {
    state: RefCell<EngineState>,
}

impl std::fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TweenEngine")
            .field("active", &state.active.len())
            .field("interrupted", &state.interrupted.len())
            .finish()
    }
}

impl TweenEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of running tweens.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    /// Whether nothing is running or waiting to report completion.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = self.state.borrow();
        state.active.is_empty() && state.interrupted.is_empty()
    }

    /// Advance every tween by `dt` and run the resulting callbacks.
    pub fn tick(&self, dt: Duration) {
        let work = self.prepare(dt);
        for item in work {
            match item {
                Work::Begin(begin) => begin(),
                Work::Progress {
                    tween,
                    mut callback,
                    progress,
                    restore,
                } => {
                    if restore && !self.is_running(tween) {
                        // Superseded by an earlier callback in this tick.
                        continue;
                    }
                    callback(&progress);
                    if restore {
                        let mut state = self.state.borrow_mut();
                        if let Some(t) = state.active.iter_mut().find(|t| t.id == tween) {
                            t.callbacks.progress = Some(callback);
                        }
                    }
                }
                Work::Complete(complete, completion) => complete(&completion),
            }
        }
    }

    /// Advance all tweens under the borrow and collect the callbacks to run.
    fn prepare(&self, dt: Duration) -> Vec<Work> {
        let mut state = self.state.borrow_mut();
        let mut work = Vec::new();

        for mut tween in std::mem::take(&mut state.interrupted) {
            if !tween.begun
                && let Some(begin) = tween.callbacks.begin.take()
            {
                work.push(Work::Begin(begin));
            }
            if let Some(complete) = tween.callbacks.complete.take() {
                let completion = Completion {
                    value: tween.last,
                    interrupted: true,
                };
                work.push(Work::Complete(complete, completion));
            }
        }

        let mut i = 0;
        while i < state.active.len() {
            let tween = &mut state.active[i];
            tween.elapsed += dt;
            let Some(fraction) = tween.fraction() else {
                i += 1;
                continue;
            };
            if !tween.begun {
                tween.begun = true;
                if let Some(begin) = tween.callbacks.begin.take() {
                    work.push(Work::Begin(begin));
                }
            }
            tween.last = if fraction >= 1.0 {
                tween.target.end_value()
            } else {
                tween.target.value_at(tween.options.easing.apply(fraction))
            };
            let done = fraction >= 1.0;
            if let Some(callback) = tween.callbacks.progress.take() {
                work.push(Work::Progress {
                    tween: tween.id,
                    callback,
                    progress: Progress {
                        fraction,
                        value: tween.last,
                    },
                    restore: !done,
                });
            }
            if done {
                let mut tween = state.active.remove(i);
                trace!(node = %tween.node, tween = tween.id, "tween finished");
                if let Some(complete) = tween.callbacks.complete.take() {
                    let completion = Completion {
                        value: tween.last,
                        interrupted: false,
                    };
                    work.push(Work::Complete(complete, completion));
                }
            } else {
                i += 1;
            }
        }
        work
    }

    fn is_running(&self, tween: u64) -> bool {
        self.state.borrow().active.iter().any(|t| t.id == tween)
    }
}

impl Animator for TweenEngine {
    fn animate(
        &self,
        node: NodeId,
        target: AnimationTarget,
        options: AnimationOptions,
        callbacks: AnimationCallbacks,
    ) {
        let mut state = self.state.borrow_mut();
        state.supersede(node);
        state.next_id += 1;
        let id = state.next_id;
        trace!(node = %node, tween = id, duration_ms = options.duration.as_millis() as u64, "tween scheduled");
        state.active.push(Tween {
            id,
            node,
            last: target.value_at(0.0),
            target,
            options,
            elapsed: Duration::ZERO,
            begun: false,
            callbacks,
        });
    }

    fn stop(&self, node: NodeId) {
        self.state.borrow_mut().supersede(node);
    }

    fn is_animating(&self, node: NodeId) -> bool {
        self.state.borrow().active.iter().any(|t| t.node == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, Transform};
    use crate::geometry::Point;
    use std::rc::Rc;

    const MS_100: Duration = Duration::from_millis(100);

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Begin,
        Progress(f64),
        Complete { interrupted: bool },
    }

    fn recording(log: &Rc<RefCell<Vec<Seen>>>) -> AnimationCallbacks {
        let (b, p, c) = (Rc::clone(log), Rc::clone(log), Rc::clone(log));
        AnimationCallbacks::new()
            .on_begin(move || b.borrow_mut().push(Seen::Begin))
            .on_progress(move |pr| p.borrow_mut().push(Seen::Progress(pr.fraction)))
            .on_complete(move |c2| {
                c.borrow_mut().push(Seen::Complete {
                    interrupted: c2.interrupted,
                });
            })
    }

    fn scroll(to: f64) -> AnimationTarget {
        AnimationTarget::Scroll {
            from: Point::ZERO,
            to: Point::new(to, 0.0),
        }
    }

    #[test]
    fn lifecycle_order() {
        let engine = TweenEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        engine.animate(
            NodeId(1),
            scroll(10.0),
            AnimationOptions::new(Duration::from_millis(200), Easing::Linear),
            recording(&log),
        );
        assert!(log.borrow().is_empty(), "animate must not fire callbacks");

        engine.tick(MS_100);
        engine.tick(MS_100);
        assert_eq!(
            *log.borrow(),
            vec![
                Seen::Begin,
                Seen::Progress(0.5),
                Seen::Progress(1.0),
                Seen::Complete { interrupted: false }
            ]
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn zero_duration_still_begins_and_completes() {
        let engine = TweenEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        engine.animate(NodeId(1), scroll(5.0), AnimationOptions::immediate(), recording(&log));
        engine.tick(Duration::ZERO);
        assert_eq!(
            *log.borrow(),
            vec![
                Seen::Begin,
                Seen::Progress(1.0),
                Seen::Complete { interrupted: false }
            ]
        );
    }

    #[test]
    fn superseding_interrupts_previous() {
        let engine = TweenEngine::new();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let opts = AnimationOptions::new(MS_100, Easing::Linear);

        engine.animate(NodeId(7), scroll(10.0), opts, recording(&first));
        engine.tick(Duration::from_millis(50));
        engine.animate(NodeId(7), scroll(20.0), opts, recording(&second));
        assert_eq!(engine.active_count(), 1);

        engine.tick(MS_100);
        assert_eq!(
            first.borrow().last(),
            Some(&Seen::Complete { interrupted: true })
        );
        assert_eq!(
            second.borrow().last(),
            Some(&Seen::Complete { interrupted: false })
        );
    }

    #[test]
    fn stop_completes_interrupted_with_last_value() {
        let engine = TweenEngine::new();
        let value = Rc::new(RefCell::new(None));
        let v = Rc::clone(&value);
        engine.animate(
            NodeId(2),
            scroll(100.0),
            AnimationOptions::new(MS_100, Easing::Linear),
            AnimationCallbacks::new().on_complete(move |c| *v.borrow_mut() = Some(*c)),
        );
        engine.tick(Duration::from_millis(25));
        engine.stop(NodeId(2));
        assert!(!engine.is_animating(NodeId(2)));
        engine.tick(Duration::ZERO);

        let done = (*value.borrow()).expect("complete fired");
        assert!(done.interrupted);
        assert_eq!(done.value, AnimatedValue::Scroll(Point::new(25.0, 0.0)));
    }

    #[test]
    fn delay_postpones_begin() {
        let engine = TweenEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let opts = AnimationOptions::new(MS_100, Easing::Linear).with_delay(MS_100);
        engine.animate(NodeId(3), scroll(1.0), opts, recording(&log));
        engine.tick(Duration::from_millis(50));
        assert!(log.borrow().is_empty());
        engine.tick(Duration::from_millis(50));
        assert_eq!(log.borrow().first(), Some(&Seen::Begin));
    }

    #[test]
    fn complete_may_start_follow_up_on_same_node() {
        let engine = Rc::new(TweenEngine::new());
        let follow_up_done = Rc::new(RefCell::new(false));
        let e = Rc::clone(&engine);
        let done = Rc::clone(&follow_up_done);
        engine.animate(
            NodeId(4),
            AnimationTarget::Transform {
                from: Transform::default(),
                to: Transform {
                    left: 10.0,
                    ..Transform::default()
                },
            },
            AnimationOptions::immediate(),
            AnimationCallbacks::new().on_complete(move |_| {
                e.animate(
                    NodeId(4),
                    scroll(1.0),
                    AnimationOptions::immediate(),
                    AnimationCallbacks::new()
                        .on_complete(move |c| *done.borrow_mut() = !c.interrupted),
                );
            }),
        );
        engine.tick(Duration::ZERO);
        assert!(engine.is_animating(NodeId(4)));
        engine.tick(Duration::ZERO);
        assert!(*follow_up_done.borrow());
    }
}
