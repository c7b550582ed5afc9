#![forbid(unsafe_code)]

//! Gesture physics configuration and recognizer binding.

use std::time::Duration;

use bitflags::bitflags;
use deck_core::ConfigurationError;
use deck_core::animation::Easing;

bitflags! {
    /// Gesture kinds a unit accepts from its recognizer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GestureKinds: u8 {
        const PAN = 1 << 0;
        const SWIPE = 1 << 1;
        const TAP = 1 << 2;
        const PRESS = 1 << 3;
        const WHEEL = 1 << 4;
    }
}

bitflags! {
    /// Axes a surface may move along.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Axes: u8 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL = 1 << 1;
    }
}

/// Binding between a gesture unit and the recognizer feeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognizer {
    pub kinds: GestureKinds,
}

impl Recognizer {
    #[must_use]
    pub const fn new(kinds: GestureKinds) -> Self {
        Self { kinds }
    }

    /// Accept every gesture kind.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(GestureKinds::all())
    }

    #[must_use]
    pub fn accepts(&self, kind: GestureKinds) -> bool {
        self.kinds.contains(kind)
    }
}

/// How a unit moves its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MoveMode {
    /// Set the surface's top/left position.
    #[default]
    Position,
    /// Set the surface's scroll offset; dragging right scrolls left.
    Scroll,
}

/// Resistance, snap-back, and inertia tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub mode: MoveMode,
    pub axes: Axes,
    /// Distance past a bound that moves 1:1 before damping starts.
    pub resistance_threshold: f64,
    /// Factor applied to the whole excess once it passes the threshold, in (0, 1].
    pub resistance_scale: f64,
    /// Inertia travel per unit of velocity.
    pub inertia_distance_scale: f64,
    /// Inertia duration in milliseconds per unit of velocity.
    pub inertia_duration_scale: f64,
    pub inertia_easing: Easing,
    pub snap_duration: Duration,
    pub snap_easing: Easing,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            mode: MoveMode::Position,
            axes: Axes::all(),
            resistance_threshold: 0.0,
            resistance_scale: 0.5,
            inertia_distance_scale: 200.0,
            inertia_duration_scale: 500.0,
            inertia_easing: Easing::EaseOutCubic,
            snap_duration: Duration::from_millis(300),
            snap_easing: Easing::EaseOut,
        }
    }
}

impl GestureConfig {
    /// Check every tunable is in range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |field, reason: &str| ConfigurationError::InvalidValue {
            field,
            reason: reason.to_string(),
        };
        if !(self.resistance_threshold >= 0.0 && self.resistance_threshold.is_finite()) {
            return Err(invalid("resistance_threshold", "must be finite and >= 0"));
        }
        if !(self.resistance_scale > 0.0 && self.resistance_scale <= 1.0) {
            return Err(invalid("resistance_scale", "must be in (0, 1]"));
        }
        if !(self.inertia_distance_scale >= 0.0 && self.inertia_distance_scale.is_finite()) {
            return Err(invalid("inertia_distance_scale", "must be finite and >= 0"));
        }
        if !(self.inertia_duration_scale >= 0.0 && self.inertia_duration_scale.is_finite()) {
            return Err(invalid("inertia_duration_scale", "must be finite and >= 0"));
        }
        Ok(())
    }
}
