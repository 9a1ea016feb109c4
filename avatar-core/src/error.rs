//! Error types for rig operations.

use thiserror::Error;

use crate::limb::Limb;
use crate::store::StoreError;

/// Result type for rig operations.
pub type RigResult<T> = Result<T, RigError>;

/// Errors that can occur in rig operations.
#[derive(Debug, Error)]
pub enum RigError {
    /// The host has not enabled edit mode.
    #[error("Rig is not in edit mode")]
    NotEditable,

    /// A preset was applied to a limb that is not the current selection.
    #[error("Limb is not selected: {0}")]
    NotSelected(Limb),

    /// The limb is in the middle of a drag gesture.
    #[error("Gesture in progress on {0}")]
    GestureInProgress(Limb),

    /// The angle is not one of the preset rotations.
    #[error("Not a preset rotation: {0} degrees")]
    InvalidPreset(f64),

    /// A limb name could not be parsed.
    #[error("Unknown limb: {0}")]
    UnknownLimb(String),

    /// Persistent storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Record or configuration serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Config(#[from] std::io::Error),
}
