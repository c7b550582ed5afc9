#![forbid(unsafe_code)]

//! Top-level error type for applications embedding a deck.

use std::fmt;

use deck_core::{ConfigurationError, DeckError, InvariantViolation, ValidationError};

use crate::config::ConfigError;

/// Any failure surfaced by the facade.
#[derive(Debug)]
pub enum Error {
    /// Validation, configuration, or invariant failure in a component.
    Deck(DeckError),
    /// Loading or validating a [`DeckConfig`](crate::DeckConfig).
    Config(ConfigError),
    /// The tracing subscriber could not be installed.
    Logging(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deck(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Logging(msg) => write!(f, "logging: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Deck(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<DeckError> for Error {
    fn from(err: DeckError) -> Self {
        Self::Deck(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Deck(err.into())
    }
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        Self::Deck(err.into())
    }
}

impl From<InvariantViolation> for Error {
    fn from(err: InvariantViolation) -> Self {
        Self::Deck(err.into())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for deck APIs.
pub type Result<T> = std::result::Result<T, Error>;
