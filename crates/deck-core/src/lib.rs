#![forbid(unsafe_code)]

//! Core: geometry, identity, the typed event bus, the animation contract,
//! and the error taxonomy.
//!
//! # Role in Deck
//! `deck-core` is the leaf crate. Everything here is collaborator-agnostic:
//! the index, the gesture physics, and the render reconciler all build on
//! these types without knowing about each other.
//!
//! # Primary responsibilities
//! - **Geometry**: rectangle normalization, intersection, union, distance.
//! - **EventBus**: non-reentrant publish/subscribe over a closed event enum.
//! - **Animator**: the contract an animation engine implements, plus a
//!   tick-driven [`animation::TweenEngine`].
//! - **Errors**: validation, configuration, and invariant failures.

pub mod animation;
pub mod error;
pub mod event;
pub mod geometry;
pub mod id;

pub use error::{ConfigurationError, DeckError, InvariantViolation, ValidationError};
pub use event::{DeckEvent, Envelope, EventBindable, EventBus, EventKind, EventSource, Interest, Subscription};
pub use geometry::{Point, Rect};
pub use id::{GroupId, ItemId, NodeId, RenderId};
