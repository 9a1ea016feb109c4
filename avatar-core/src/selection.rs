//! Limb selection and preset rotations.
//!
//! The selection lives with the host rather than inside the rig, so the rig and
//! any preset toolbar read the same value.

use serde::{Deserialize, Serialize};

use crate::limb::Limb;
use crate::RigError;

/// The single active limb selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: Option<Limb>,
}

impl Selection {
    /// Nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// The selected limb, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<Limb> {
        self.selected
    }

    /// Whether `limb` is the selected one.
    #[must_use]
    pub fn is_selected(&self, limb: Limb) -> bool {
        self.selected == Some(limb)
    }

    /// Toggle `limb`: select it, or clear the selection if it already was.
    ///
    /// Returns the new selection.
    pub fn select(&mut self, limb: Limb) -> Option<Limb> {
        self.selected = if self.is_selected(limb) {
            None
        } else {
            Some(limb)
        };
        self.selected
    }

    /// Clear the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }
}

/// Interaction state owned by the host screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    /// Whether drag/select/rotate interactions are enabled.
    pub editable: bool,
    /// The current limb selection.
    pub selection: Selection,
}

impl HostState {
    /// Display-only host state.
    #[must_use]
    pub const fn display() -> Self {
        Self {
            editable: false,
            selection: Selection::new(),
        }
    }

    /// Edit-mode host state with nothing selected.
    #[must_use]
    pub const fn editing() -> Self {
        Self {
            editable: true,
            selection: Selection::new(),
        }
    }
}

/// Snap angles offered for the selected limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RotationPreset {
    /// -90 degrees.
    Minus90,
    /// -45 degrees.
    Minus45,
    /// 0 degrees.
    Zero,
    /// 45 degrees.
    Plus45,
    /// 90 degrees.
    Plus90,
    /// 135 degrees.
    Plus135,
    /// 180 degrees.
    Half,
}

impl RotationPreset {
    /// All presets in toolbar order.
    pub const ALL: [RotationPreset; 7] = [
        Self::Minus90,
        Self::Minus45,
        Self::Zero,
        Self::Plus45,
        Self::Plus90,
        Self::Plus135,
        Self::Half,
    ];

    /// The absolute angle of this preset.
    #[must_use]
    pub const fn degrees(self) -> f64 {
        match self {
            Self::Minus90 => -90.0,
            Self::Minus45 => -45.0,
            Self::Zero => 0.0,
            Self::Plus45 => 45.0,
            Self::Plus90 => 90.0,
            Self::Plus135 => 135.0,
            Self::Half => 180.0,
        }
    }
}

impl TryFrom<f64> for RotationPreset {
    type Error = RigError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|preset| (preset.degrees() - degrees).abs() < f64::EPSILON)
            .ok_or(RigError::InvalidPreset(degrees))
    }
}

impl From<RotationPreset> for f64 {
    fn from(preset: RotationPreset) -> Self {
        preset.degrees()
    }
}
