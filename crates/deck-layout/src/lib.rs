#![forbid(unsafe_code)]

//! Concrete layout policies for Deck.
//!
//! Layouts share cell geometry through [`Cells`] rather than building on
//! each other; each one implements [`deck_render::LayoutPolicy`] directly.

pub mod cells;
pub mod grid;
pub mod stack;

pub use cells::{Cells, grid_position};
pub use grid::GridLayout;
pub use stack::StackLayout;
