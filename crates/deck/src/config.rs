#![forbid(unsafe_code)]

//! Data-driven tuning for a [`Deck`](crate::Deck).
//!
//! # Loading
//!
//! ```toml
//! # deck.toml
//! [gesture]
//! resistance_threshold = 24.0
//! resistance_scale = 0.4
//! snap_duration_ms = 250
//!
//! [animation]
//! show_duration_ms = 200
//! hide_easing = "ease-in-cubic"
//! ```
//!
//! ```rust,ignore
//! let config = DeckConfig::load_toml_file("deck.toml")?;
//! let config = DeckConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the corresponding component uses when
//! built without a config, so `DeckConfig::default()` changes nothing.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use deck_core::animation::{AnimationOptions, AnimationSpec, Easing};
use deck_gesture::{Axes, GestureConfig, MoveMode};
use deck_render::{default_hide, default_show};

// ---------------------------------------------------------------------------
// Top-level DeckConfig
// ---------------------------------------------------------------------------

/// All tunables of a deck, grouped by subsystem.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DeckConfig {
    /// Canvas gesture physics.
    pub gesture: GestureSection,
    /// Default render animations.
    pub animation: AnimationSection,
}

/// Gesture physics section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureSection {
    pub mode: MoveMode,
    pub horizontal: bool,
    pub vertical: bool,
    pub resistance_threshold: f64,
    pub resistance_scale: f64,
    pub inertia_distance_scale: f64,
    pub inertia_duration_scale: f64,
    pub inertia_easing: Easing,
    pub snap_duration_ms: u64,
    pub snap_easing: Easing,
}

impl Default for GestureSection {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureSection {
    fn from(config: &GestureConfig) -> Self {
        Self {
            mode: config.mode,
            horizontal: config.axes.contains(Axes::HORIZONTAL),
            vertical: config.axes.contains(Axes::VERTICAL),
            resistance_threshold: config.resistance_threshold,
            resistance_scale: config.resistance_scale,
            inertia_distance_scale: config.inertia_distance_scale,
            inertia_duration_scale: config.inertia_duration_scale,
            inertia_easing: config.inertia_easing,
            snap_duration_ms: u64::try_from(config.snap_duration.as_millis()).unwrap_or(u64::MAX),
            snap_easing: config.snap_easing,
        }
    }
}

impl GestureSection {
    /// Convert to the runtime gesture config.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        let mut axes = Axes::empty();
        axes.set(Axes::HORIZONTAL, self.horizontal);
        axes.set(Axes::VERTICAL, self.vertical);
        GestureConfig {
            mode: self.mode,
            axes,
            resistance_threshold: self.resistance_threshold,
            resistance_scale: self.resistance_scale,
            inertia_distance_scale: self.inertia_distance_scale,
            inertia_duration_scale: self.inertia_duration_scale,
            inertia_easing: self.inertia_easing,
            snap_duration: Duration::from_millis(self.snap_duration_ms),
            snap_easing: self.snap_easing,
        }
    }
}

/// Render animation section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AnimationSection {
    /// Timing of moves between layout positions.
    pub move_duration_ms: u64,
    pub move_easing: Easing,
    pub show_duration_ms: u64,
    pub show_easing: Easing,
    pub hide_duration_ms: u64,
    pub hide_easing: Easing,
}

impl Default for AnimationSection {
    fn default() -> Self {
        let moves = AnimationOptions::default();
        let show = default_show().options;
        let hide = default_hide().options;
        let ms = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            move_duration_ms: ms(moves.duration),
            move_easing: moves.easing,
            show_duration_ms: ms(show.duration),
            show_easing: show.easing,
            hide_duration_ms: ms(hide.duration),
            hide_easing: hide.easing,
        }
    }
}

impl AnimationSection {
    /// Timing for renders moving between layout positions.
    #[must_use]
    pub fn move_options(&self) -> AnimationOptions {
        AnimationOptions::new(Duration::from_millis(self.move_duration_ms), self.move_easing)
    }

    /// Enter animation: the default show state with configured timing.
    #[must_use]
    pub fn show_spec(&self) -> AnimationSpec {
        AnimationSpec {
            options: AnimationOptions::new(
                Duration::from_millis(self.show_duration_ms),
                self.show_easing,
            ),
            ..default_show()
        }
    }

    /// Exit animation: the default hide state with configured timing.
    #[must_use]
    pub fn hide_spec(&self) -> AnimationSpec {
        AnimationSpec {
            options: AnimationOptions::new(
                Duration::from_millis(self.hide_duration_ms),
                self.hide_easing,
            ),
            ..default_hide()
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl DeckConfig {
    /// Parse from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load a TOML file and reject out-of-range values.
    #[cfg(feature = "config")]
    pub fn load_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)?.validated()
    }

    /// Load a JSON file and reject out-of-range values.
    #[cfg(feature = "config")]
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_file(path)?.validated()
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// `self` if valid, otherwise every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let g = &self.gesture;

        if !(g.resistance_threshold >= 0.0 && g.resistance_threshold.is_finite()) {
            errors.push(format!(
                "gesture.resistance_threshold must be finite and >= 0, got {}",
                g.resistance_threshold
            ));
        }
        if !(g.resistance_scale > 0.0 && g.resistance_scale <= 1.0) {
            errors.push(format!(
                "gesture.resistance_scale must be in (0, 1], got {}",
                g.resistance_scale
            ));
        }
        if !(g.inertia_distance_scale >= 0.0 && g.inertia_distance_scale.is_finite()) {
            errors.push(format!(
                "gesture.inertia_distance_scale must be finite and >= 0, got {}",
                g.inertia_distance_scale
            ));
        }
        if !(g.inertia_duration_scale >= 0.0 && g.inertia_duration_scale.is_finite()) {
            errors.push(format!(
                "gesture.inertia_duration_scale must be finite and >= 0, got {}",
                g.inertia_duration_scale
            ));
        }
        if !g.horizontal && !g.vertical {
            errors.push("gesture must enable at least one axis".into());
        }

        let a = &self.animation;
        for (name, ms) in [
            ("move_duration_ms", a.move_duration_ms),
            ("show_duration_ms", a.show_duration_ms),
            ("hide_duration_ms", a.hide_duration_ms),
        ] {
            if ms > 60_000 {
                errors.push(format!("animation.{name} must be <= 60000, got {ms}"));
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors loading a [`DeckConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
