#![forbid(unsafe_code)]

//! Manually driven [`Animator`] for tests.
//!
//! Every `animate` call is recorded; nothing runs until a test fires the
//! lifecycle callbacks by index.

use std::cell::RefCell;

use super::{
    AnimationCallbacks, AnimationOptions, AnimationTarget, Animator, Completion, Progress,
};
use crate::id::NodeId;

/// A recorded `animate` request (callbacks excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub node: NodeId,
    pub target: AnimationTarget,
    pub options: AnimationOptions,
}

struct Slot {
    call: RecordedCall,
    callbacks: AnimationCallbacks,
    done: bool,
}

/// Animator that records requests and lets the caller play them back.
#[derive(Default)]
pub struct RecordingAnimator {
    slots: RefCell<Vec<Slot>>,
    stopped: RefCell<Vec<NodeId>>,
}

impl std::fmt::Debug for RecordingAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingAnimator")
            .field("calls", &self.slots.borrow().len())
            .finish()
    }
}

impl RecordingAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `animate` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.slots.borrow().len()
    }

    /// All recorded requests in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.slots.borrow().iter().map(|s| s.call.clone()).collect()
    }

    /// A single recorded request.
    #[must_use]
    pub fn call(&self, index: usize) -> Option<RecordedCall> {
        self.slots.borrow().get(index).map(|s| s.call.clone())
    }

    /// Nodes passed to `stop`.
    #[must_use]
    pub fn stopped(&self) -> Vec<NodeId> {
        self.stopped.borrow().clone()
    }

    /// Fire `begin` for call `index` (no-op if already fired).
    pub fn begin(&self, index: usize) {
        let begin = self.slots.borrow_mut()[index].callbacks.begin.take();
        if let Some(begin) = begin {
            begin();
        }
    }

    /// Fire `progress` for call `index` at linear fraction `fraction`.
    pub fn progress(&self, index: usize, fraction: f64) {
        let (callback, progress) = {
            let mut slots = self.slots.borrow_mut();
            let slot = &mut slots[index];
            let value = slot
                .call
                .target
                .value_at(slot.call.options.easing.apply(fraction));
            (slot.callbacks.progress.take(), Progress { fraction, value })
        };
        if let Some(mut callback) = callback {
            callback(&progress);
            self.slots.borrow_mut()[index].callbacks.progress = Some(callback);
        }
    }

    /// Fire `begin` (if pending) then `complete` for call `index`.
    pub fn finish(&self, index: usize) {
        self.complete_with(index, false);
    }

    /// Like [`finish`](Self::finish) but reports the animation as interrupted.
    pub fn interrupt(&self, index: usize) {
        self.complete_with(index, true);
    }

    /// Finish every pending call, including calls recorded while finishing.
    pub fn finish_all(&self) {
        let mut i = 0;
        while i < self.call_count() {
            if !self.slots.borrow()[i].done {
                self.finish(i);
            }
            i += 1;
        }
    }

    fn complete_with(&self, index: usize, interrupted: bool) {
        self.begin(index);
        let (complete, completion) = {
            let mut slots = self.slots.borrow_mut();
            let slot = &mut slots[index];
            slot.done = true;
            let value = if interrupted {
                slot.call.target.value_at(0.0)
            } else {
                slot.call.target.end_value()
            };
            (
                slot.callbacks.complete.take(),
                Completion { value, interrupted },
            )
        };
        if let Some(complete) = complete {
            complete(&completion);
        }
    }
}

impl Animator for RecordingAnimator {
    fn animate(
        &self,
        node: NodeId,
        target: AnimationTarget,
        options: AnimationOptions,
        callbacks: AnimationCallbacks,
    ) {
        self.slots.borrow_mut().push(Slot {
            call: RecordedCall {
                node,
                target,
                options,
            },
            callbacks,
            done: false,
        });
    }

    fn stop(&self, node: NodeId) {
        self.stopped.borrow_mut().push(node);
    }

    fn is_animating(&self, node: NodeId) -> bool {
        self.slots
            .borrow()
            .iter()
            .any(|s| s.call.node == node && !s.done)
    }
}
