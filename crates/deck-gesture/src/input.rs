#![forbid(unsafe_code)]

//! Classified gesture events delivered by the recognizer.

use deck_core::Point;

use crate::config::GestureKinds;

/// One already-classified pointer gesture.
///
/// Pan deltas are cumulative since `PanStart`. Velocities follow the
/// recognizer convention and point *against* the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    PanStart,
    PanMove { delta: Point },
    PanEnd { delta: Point, velocity: Point },
    Swipe { velocity: Point },
    Tap { point: Point },
    Press { point: Point },
    /// Wheel delta; positive y scrolls content up.
    Wheel { delta: Point },
}

impl GestureInput {
    /// The recognizer kind that produces this event.
    #[must_use]
    pub fn kind(&self) -> GestureKinds {
        match self {
            Self::PanStart | Self::PanMove { .. } | Self::PanEnd { .. } => GestureKinds::PAN,
            Self::Swipe { .. } => GestureKinds::SWIPE,
            Self::Tap { .. } => GestureKinds::TAP,
            Self::Press { .. } => GestureKinds::PRESS,
            Self::Wheel { .. } => GestureKinds::WHEEL,
        }
    }
}
