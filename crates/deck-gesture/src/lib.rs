#![forbid(unsafe_code)]

//! Gesture physics for Deck.
//!
//! A [`GestureUnit`] wraps one movable [`Surface`] and turns classified
//! pointer gestures ([`GestureInput`]) into bounded motion: 1:1 inside its
//! bounds, rubber-banded past them, with snap-back and inertia driven through
//! a [`deck_core::animation::Animator`]. A [`GestureGroup`] keeps several
//! units moving in lock-step inside a shared container.

pub mod config;
pub mod group;
pub mod input;
pub mod surface;
pub mod unit;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::{Axes, GestureConfig, GestureKinds, MoveMode, Recognizer};
pub use group::GestureGroup;
pub use input::GestureInput;
pub use surface::Surface;
pub use unit::{GestureUnit, GestureUnitBuilder, resist};
