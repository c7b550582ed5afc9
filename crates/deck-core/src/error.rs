#![forbid(unsafe_code)]

//! Error taxonomy shared by every Deck crate.
//!
//! # Design Principles
//!
//! 1. **Fail before mutating**: a [`ValidationError`] is raised before any
//!    index or render-map state changes.
//! 2. **No retries**: none of these errors are transient; callers fix the
//!    input or the wiring.
//! 3. **Defects are typed**: an [`InvariantViolation`] means a bug in Deck,
//!    never bad input.

use std::fmt;

use crate::id::{ItemId, RenderId};

/// A required argument is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Item-like input was not a key/value mapping.
    NotAnObject { found: &'static str },
    /// The `id` field is neither a string nor a number.
    MalformedId { found: &'static str },
    /// An explicit id was empty.
    EmptyId,
    /// No item with this id is known.
    UnknownItem(ItemId),
    /// The item has no realized render with this id.
    UnknownRender { item: ItemId, render: RenderId },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "item must be a key/value object, got {found}")
            }
            Self::MalformedId { found } => {
                write!(f, "item id must be a string or number, got {found}")
            }
            Self::EmptyId => f.write_str("item id must not be empty"),
            Self::UnknownItem(id) => write!(f, "unknown item: {id}"),
            Self::UnknownRender { item, render } => {
                write!(f, "item {item} has no render {render}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A required collaborator or setting is absent at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A gesture unit was built without a surface.
    MissingSurface,
    /// A gesture unit was built without a recognizer binding.
    MissingRecognizer,
    /// A component was built without an animation engine.
    MissingAnimator,
    /// A deck was built without a canvas.
    MissingCanvas,
    /// A numeric setting is out of range.
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSurface => f.write_str("gesture unit requires a surface"),
            Self::MissingRecognizer => {
                f.write_str("gesture unit requires a recognizer binding")
            }
            Self::MissingAnimator => f.write_str("an animation engine is required"),
            Self::MissingCanvas => f.write_str("a deck requires a canvas"),
            Self::InvalidValue { field, reason } => write!(f, "{field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// An internal consistency check failed. Always a defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub detail: String,
}

impl InvariantViolation {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violated: {}", self.detail)
    }
}

impl std::error::Error for InvariantViolation {}

/// Umbrella error for the Deck crates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    Validation(ValidationError),
    Configuration(ConfigurationError),
    Invariant(InvariantViolation),
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation error: {e}"),
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::Invariant(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DeckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Configuration(e) => Some(e),
            Self::Invariant(e) => Some(e),
        }
    }
}

impl From<ValidationError> for DeckError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ConfigurationError> for DeckError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<InvariantViolation> for DeckError {
    fn from(e: InvariantViolation) -> Self {
        Self::Invariant(e)
    }
}
