//! Pointer input for the rig and the events it reports back to the host.

use serde::{Deserialize, Serialize};

use crate::drag::ContainerSize;
use crate::limb::{Limb, LimbTransform};

/// A single pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Pointer identifier (for multi-touch).
    #[serde(default)]
    pub pointer_id: u32,
    /// X position in screen coordinates.
    pub x: f64,
    /// Y position in screen coordinates.
    pub y: f64,
    /// Timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl PointerSample {
    /// Create a sample for the primary pointer.
    #[must_use]
    pub const fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            pointer_id: 0,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Set the pointer identifier.
    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Pointer input delivered by the host.
///
/// `Down` is targeted at a limb; `Move`, `Up` and `Cancel` are the
/// window-level events the host routes while the rig holds a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Pointer pressed on a limb.
    Down {
        /// The limb under the pointer.
        limb: Limb,
        /// Where and when.
        #[serde(flatten)]
        sample: PointerSample,
    },
    /// Pointer moved.
    Move {
        /// Where and when.
        #[serde(flatten)]
        sample: PointerSample,
        /// Current rendered size of the limb's container.
        container: ContainerSize,
    },
    /// Pointer released.
    Up {
        /// Where and when.
        #[serde(flatten)]
        sample: PointerSample,
    },
    /// Platform cancelled the pointer (e.g., palm rejection).
    Cancel {
        /// Where and when.
        #[serde(flatten)]
        sample: PointerSample,
    },
}

impl PointerEvent {
    /// The sample carried by this event.
    #[must_use]
    pub const fn sample(&self) -> &PointerSample {
        match self {
            Self::Down { sample, .. }
            | Self::Move { sample, .. }
            | Self::Up { sample }
            | Self::Cancel { sample } => sample,
        }
    }
}

/// Events the rig reports to its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RigEvent {
    /// A limb was pressed while the rig is display-only.
    EditRequested,
    /// The selection changed. `None` means nothing is selected.
    Selected {
        /// The newly selected limb.
        limb: Option<Limb>,
    },
    /// A preset rotation was applied.
    Rotated {
        /// The rotated limb.
        limb: Limb,
        /// The applied angle.
        degrees: f64,
    },
    /// A drag finished and its transform was persisted.
    Committed {
        /// The dragged limb.
        limb: Limb,
        /// The committed placement.
        transform: LimbTransform,
    },
    /// A drag was abandoned and the limb reverted.
    Cancelled {
        /// The limb whose drag was discarded.
        limb: Limb,
    },
}

/// What the rig did with one pointer event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointerOutcome {
    /// Event to forward to the host, if any.
    pub event: Option<RigEvent>,
    /// Whether the host should suppress the platform's default action.
    pub prevent_default: bool,
}

impl PointerOutcome {
    /// No host event and no default suppression.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            event: None,
            prevent_default: false,
        }
    }

    /// The event was consumed without producing a host event.
    #[must_use]
    pub const fn consumed() -> Self {
        Self {
            event: None,
            prevent_default: true,
        }
    }

    /// The event was consumed and produced `event`.
    #[must_use]
    pub const fn emit(event: RigEvent) -> Self {
        Self {
            event: Some(event),
            prevent_default: true,
        }
    }
}
