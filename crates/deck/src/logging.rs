#![forbid(unsafe_code)]

//! JSON log output for hosts that do not install their own subscriber.
//!
//! Deck crates only emit `tracing` events and spans; this helper wires them
//! to stdout as JSON lines, filtered like `RUST_LOG` (e.g. `"deck=debug"`).

use tracing_subscriber::EnvFilter;

use crate::error::Error;

/// Install a global JSON subscriber with the given filter directives.
///
/// Fails instead of panicking when the filter does not parse or a global
/// subscriber is already set.
pub fn init(filter: &str) -> Result<(), Error> {
    let filter = EnvFilter::try_new(filter).map_err(|e| Error::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Like [`init`], reading directives from `RUST_LOG` (default `"info"`).
pub fn init_from_env() -> Result<(), Error> {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    init(&directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_is_an_error() {
        assert!(matches!(init("deck=loud"), Err(Error::Logging(_))));
    }
}
