#![forbid(unsafe_code)]

//! Deck public facade crate.
//!
//! A [`Deck`] keeps an ordered, filtered, sorted index of data items and
//! mirrors it onto a host canvas as animated renders, with rubber-band drag,
//! inertia, and snap-back gestures grouped across renders. This crate wires
//! the component crates together and re-exports the types a host needs; the
//! [`prelude`] covers day-to-day usage.

pub mod config;
pub mod deck;
pub mod error;
pub mod groups;
#[cfg(feature = "tracing-json")]
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use deck_core::animation::{
    AnimationOptions, AnimationSpec, Animator, Easing, Transform, TransformPatch, TweenEngine,
};
pub use deck_core::{
    ConfigurationError, DeckError, DeckEvent, Envelope, EventBindable, EventBus, EventKind,
    EventSource, GroupId, Interest, InvariantViolation, ItemId, NodeId, Point, Rect, RenderId,
    Subscription, ValidationError,
};

// --- Index re-exports ------------------------------------------------------

pub use deck_index::{
    ChangeOptions, Data, Filter, Item, ItemIndex, SortKey, SortKeyFn, filter_by_field,
    sort_by_field,
};

// --- Gesture re-exports ----------------------------------------------------

pub use deck_gesture::{
    Axes, GestureConfig, GestureGroup, GestureInput, GestureKinds, GestureUnit, MoveMode,
    Recognizer, Surface,
};

// --- Render and layout re-exports ------------------------------------------

pub use deck_layout::{Cells, GridLayout, StackLayout};
pub use deck_render::{
    Canvas, LayoutContext, LayoutPolicy, RealizedRender, Reconciler, RenderDescriptor,
};

// --- Facade ----------------------------------------------------------------

pub use config::{AnimationSection, ConfigError, DeckConfig, GestureSection};
pub use deck::{Deck, DeckBuilder};
pub use error::{Error, Result};
pub use groups::GroupRegistry;

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Canvas, ChangeOptions, Deck, DeckConfig, DeckEvent, Error, GestureConfig, GestureInput,
        GridLayout, Item, ItemId, LayoutPolicy, NodeId, Point, Rect, RenderDescriptor, Result,
        StackLayout, Surface, Transform, TweenEngine,
    };

    pub use crate::{core, gesture, index, layout, render};
}

pub use deck_core as core;
pub use deck_gesture as gesture;
pub use deck_index as index;
pub use deck_layout as layout;
pub use deck_render as render;
