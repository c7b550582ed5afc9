#![forbid(unsafe_code)]

//! Render reconciliation for Deck.
//!
//! A [`LayoutPolicy`] says where each displayed item should appear as one or
//! more [`RenderDescriptor`]s. The [`Reconciler`] diffs that request against
//! the [`RealizedRender`]s it already owns and drives node creation,
//! attachment, re-targeting, and destruction through a [`Canvas`] and a
//! [`deck_core::animation::Animator`].

pub mod canvas;
pub mod descriptor;
pub mod policy;
pub mod reconciler;

pub use canvas::Canvas;
pub use descriptor::{RealizedRender, RenderDescriptor};
pub use policy::{LayoutContext, LayoutPolicy, default_hide, default_show};
pub use reconciler::{Partition, Reconciler, partition};
