//! Scripted rig sessions.
//!
//! A script is the event stream a host would deliver, written as JSON:
//!
//! ```json
//! { "editable": true, "steps": [
//!   { "step": "pointer", "event": { "type": "down", "limb": "leftArm", "x": 100, "y": 100, "timestamp_ms": 0 } },
//!   { "step": "pointer", "event": { "type": "move", "x": 150, "y": 100, "timestamp_ms": 40,
//!                                   "container": { "width": 200, "height": 200 } } },
//!   { "step": "pointer", "event": { "type": "up", "x": 150, "y": 100, "timestamp_ms": 400 } },
//!   { "step": "preset", "limb": "leftArm", "degrees": 90 }
//! ] }
//! ```

use std::path::Path;

use avatar_core::{
    AvatarRig, HostState, KeyValueStore, Limb, LimbMap, LimbTransform, PointerEvent, RigError,
    RigEvent, RigResult, RotationPreset,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    /// The script is not valid JSON or names an unknown step.
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A replayable session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Whether the host starts in edit mode.
    #[serde(default)]
    pub editable: bool,
    /// Steps in delivery order.
    pub steps: Vec<Step>,
}

/// One host action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Deliver a pointer event.
    Pointer {
        /// The event.
        event: PointerEvent,
    },
    /// Switch edit mode.
    Edit {
        /// New edit-mode flag.
        editable: bool,
    },
    /// Toggle selection directly, as a toolbar button would.
    Select {
        /// The limb.
        limb: Limb,
    },
    /// Apply a preset rotation.
    Preset {
        /// The limb.
        limb: Limb,
        /// The preset angle.
        degrees: RotationPreset,
    },
    /// Cancel the current gesture.
    Cancel,
    /// Drop stored placements.
    Reset,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] if `json` is not a valid script.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }
}

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Events the rig reported, in order.
    pub events: Vec<RigEvent>,
    /// Steps the rig refused, with the reason.
    pub rejected: Vec<String>,
    /// Limb placements after the last step.
    pub transforms: LimbMap<LimbTransform>,
    /// Selection after the last step.
    pub selected: Option<Limb>,
}

/// Run `script` against `rig`.
///
/// Presets the rig refuses are recorded in [`ReplayReport::rejected`] and the
/// replay continues.
///
/// # Errors
///
/// Returns an error if a commit, preset or reset cannot be persisted.
pub fn replay<S: KeyValueStore>(rig: &mut AvatarRig<S>, script: &Script) -> RigResult<ReplayReport> {
    let mut host = if script.editable {
        HostState::editing()
    } else {
        HostState::display()
    };
    let mut events = Vec::new();
    let mut rejected = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        tracing::debug!("Step {index}: {step:?}");
        match step {
            Step::Pointer { event } => {
                events.extend(rig.handle(&mut host, event)?.event);
            }
            Step::Edit { editable } => {
                host.editable = *editable;
                if !editable {
                    events.extend(rig.cancel_gesture());
                    host.selection.clear();
                }
            }
            Step::Select { limb } => events.push(rig.select(&mut host, *limb)),
            Step::Preset { limb, degrees } => match rig.apply_preset(&host, *limb, *degrees) {
                Ok(event) => events.push(event),
                Err(
                    e @ (RigError::NotEditable
                    | RigError::NotSelected(_)
                    | RigError::GestureInProgress(_)),
                ) => {
                    tracing::warn!("Step {index} rejected: {e}");
                    rejected.push(format!("step {index}: {e}"));
                }
                Err(e) => return Err(e),
            },
            Step::Cancel => events.extend(rig.cancel_gesture()),
            Step::Reset => rig.reset()?,
        }
    }
    rig.teardown();

    Ok(ReplayReport {
        events,
        rejected,
        transforms: *rig.transforms(),
        selected: host.selection.selected(),
    })
}
