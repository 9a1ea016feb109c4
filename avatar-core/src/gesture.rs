//! # Gesture Classification
//!
//! Tells a tap apart from a drag for one pointer-down-to-up interaction.
//!
//! ```text
//! down ──► Undecided ──(move beyond slop)──► Drag ──(up)──► DragEnd
//!              │
//!              └──(up)──► Tap      if within slop and < tap_max_ms
//!                         NoOp     otherwise
//! ```
//!
//! Distance alone misreads jittery taps as drags and time alone drops slow
//! taps, so both guards apply.

use serde::{Deserialize, Serialize};

use crate::drag::PointerDelta;
use crate::event::PointerSample;
use crate::limb::{Limb, LimbTransform};

/// Thresholds for tap/drag classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement in either axis beyond this many pixels starts a drag.
    pub tap_slop_px: f64,
    /// A release at or after this many milliseconds is not a tap.
    pub tap_max_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_slop_px: 5.0,
            tap_max_ms: 200,
        }
    }
}

impl GestureConfig {
    fn exceeds_slop(&self, delta: PointerDelta) -> bool {
        delta.dx.abs() > self.tap_slop_px || delta.dy.abs() > self.tap_slop_px
    }
}

/// How far a session has been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No movement beyond the slop yet.
    Undecided,
    /// The pointer moved beyond the slop; the session is a drag.
    Drag,
}

/// Result of feeding a move sample to a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Sample belongs to another pointer or is unusable.
    Ignored,
    /// Still within the slop.
    Pending,
    /// This sample crossed the slop; drag updates begin.
    DragStarted(PointerDelta),
    /// An ongoing drag moved.
    Dragged(PointerDelta),
}

/// How a session ended on pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Short, still press: toggle selection.
    Tap,
    /// A drag finished: commit the transform.
    DragEnd,
    /// Slow press without movement: nothing happens.
    NoOp,
}

/// A single pointer-down-to-up interaction on one limb.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    limb: Limb,
    pointer_id: u32,
    origin: (f64, f64),
    started_at_ms: u64,
    start_transform: LimbTransform,
    classified: Classification,
}

impl GestureSession {
    /// Open a session for a pointer-down on `limb`.
    ///
    /// `start_transform` is the limb's placement at this instant; drag deltas
    /// are applied to it rather than to the live value.
    #[must_use]
    pub fn begin(limb: Limb, sample: &PointerSample, start_transform: LimbTransform) -> Self {
        tracing::debug!(
            "Gesture begin on {limb} at ({}, {}) pointer {}",
            sample.x,
            sample.y,
            sample.pointer_id
        );
        Self {
            limb,
            pointer_id: sample.pointer_id,
            origin: (sample.x, sample.y),
            started_at_ms: sample.timestamp_ms,
            start_transform,
            classified: Classification::Undecided,
        }
    }

    /// The limb this session acts on.
    #[must_use]
    pub const fn limb(&self) -> Limb {
        self.limb
    }

    /// The pointer that owns this session.
    #[must_use]
    pub const fn pointer_id(&self) -> u32 {
        self.pointer_id
    }

    /// Pointer-down position.
    #[must_use]
    pub const fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Placement snapshot taken at pointer-down.
    #[must_use]
    pub const fn start_transform(&self) -> &LimbTransform {
        &self.start_transform
    }

    /// Rotation snapshot taken at pointer-down.
    #[must_use]
    pub const fn start_rotation(&self) -> f64 {
        self.start_transform.rotation_degrees()
    }

    /// Current classification.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        self.classified
    }

    /// Whether the session has become a drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.classified == Classification::Drag
    }

    /// Whether `sample` comes from the pointer that owns this session.
    #[must_use]
    pub const fn owns(&self, sample: &PointerSample) -> bool {
        sample.pointer_id == self.pointer_id
    }

    /// Offset of `sample` from the origin.
    #[must_use]
    pub fn delta(&self, sample: &PointerSample) -> PointerDelta {
        PointerDelta::new(sample.x - self.origin.0, sample.y - self.origin.1)
    }

    /// Feed a move sample.
    pub fn on_move(&mut self, sample: &PointerSample, config: &GestureConfig) -> MoveOutcome {
        if !self.owns(sample) || !sample.is_finite() {
            return MoveOutcome::Ignored;
        }
        let delta = self.delta(sample);
        match self.classified {
            Classification::Drag => MoveOutcome::Dragged(delta),
            Classification::Undecided if config.exceeds_slop(delta) => {
                self.classified = Classification::Drag;
                tracing::debug!(
                    "Gesture on {} classified as drag ({}, {})",
                    self.limb,
                    delta.dx,
                    delta.dy
                );
                MoveOutcome::DragStarted(delta)
            }
            Classification::Undecided => MoveOutcome::Pending,
        }
    }

    /// Close the session on pointer-up.
    #[must_use]
    pub fn finish(self, sample: &PointerSample, config: &GestureConfig) -> GestureOutcome {
        let outcome = match self.classified {
            Classification::Drag => GestureOutcome::DragEnd,
            Classification::Undecided => {
                let elapsed = sample.timestamp_ms.saturating_sub(self.started_at_ms);
                let still = !sample.is_finite() || !config.exceeds_slop(self.delta(sample));
                if still && elapsed < config.tap_max_ms {
                    GestureOutcome::Tap
                } else {
                    GestureOutcome::NoOp
                }
            }
        };
        tracing::debug!("Gesture on {} ended as {:?}", self.limb, outcome);
        outcome
    }
}
