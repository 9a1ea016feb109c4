//! Equipped avatar parts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::limb::Limb;

/// Head shown before anything else is chosen.
pub const DEFAULT_HEAD: &str = "head-toast";

/// Frame shown before anything else is chosen.
pub const DEFAULT_FRAME: &str = "border-[#8B4513]";

/// A slot an asset can be equipped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    /// The head ("avatar").
    Avatar,
    /// The frame around the avatar.
    Frame,
    /// Hat above the head.
    Hat,
    /// Body below the head.
    Body,
    /// Left arm attachment.
    LeftArm,
    /// Right arm attachment.
    RightArm,
    /// Legs below the body.
    Legs,
}

impl From<Limb> for Slot {
    fn from(limb: Limb) -> Self {
        match limb {
            Limb::LeftArm => Self::LeftArm,
            Limb::RightArm => Self::RightArm,
        }
    }
}

/// Identifiers of the equipped parts, in the persisted record's field names.
///
/// Each field is read on its own: a null or mistyped value falls back to that
/// field's default instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Equipment {
    /// Head identifier or external image URL.
    #[serde(rename = "equippedAvatar", deserialize_with = "lenient_head")]
    pub head: String,
    /// Frame style.
    #[serde(rename = "equippedFrame", deserialize_with = "lenient_frame")]
    pub frame: String,
    /// Hat identifier.
    #[serde(rename = "equippedHat", deserialize_with = "lenient_id")]
    pub hat: Option<String>,
    /// Body identifier.
    #[serde(rename = "equippedBody", deserialize_with = "lenient_id")]
    pub body: Option<String>,
    /// Left arm identifier.
    #[serde(rename = "equippedLeftArm", deserialize_with = "lenient_id")]
    pub left_arm: Option<String>,
    /// Right arm identifier.
    #[serde(rename = "equippedRightArm", deserialize_with = "lenient_id")]
    pub right_arm: Option<String>,
    /// Legs identifier.
    #[serde(rename = "equippedLegs", deserialize_with = "lenient_id")]
    pub legs: Option<String>,
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(id) => Ok(Some(id)),
        Value::Null => Ok(None),
        other => {
            tracing::warn!("Ignoring non-string equipment value {other}");
            Ok(None)
        }
    }
}

fn lenient_head<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_id(deserializer)?.unwrap_or_else(|| DEFAULT_HEAD.to_string()))
}

fn lenient_frame<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_id(deserializer)?.unwrap_or_else(|| DEFAULT_FRAME.to_string()))
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            head: DEFAULT_HEAD.to_string(),
            frame: DEFAULT_FRAME.to_string(),
            hat: None,
            body: None,
            left_arm: None,
            right_arm: None,
            legs: None,
        }
    }
}

impl Equipment {
    /// Put `value` into `slot`, replacing what was there.
    pub fn equip(&mut self, slot: Slot, value: impl Into<String>) {
        let value = value.into();
        match slot {
            Slot::Avatar => self.head = value,
            Slot::Frame => self.frame = value,
            Slot::Hat => self.hat = Some(value),
            Slot::Body => self.body = Some(value),
            Slot::LeftArm => self.left_arm = Some(value),
            Slot::RightArm => self.right_arm = Some(value),
            Slot::Legs => self.legs = Some(value),
        }
    }

    /// Empty `slot`. The head and frame can only be replaced, so this returns
    /// `false` for them and leaves them unchanged.
    pub fn unequip(&mut self, slot: Slot) -> bool {
        let target = match slot {
            Slot::Avatar | Slot::Frame => return false,
            Slot::Hat => &mut self.hat,
            Slot::Body => &mut self.body,
            Slot::LeftArm => &mut self.left_arm,
            Slot::RightArm => &mut self.right_arm,
            Slot::Legs => &mut self.legs,
        };
        *target = None;
        true
    }

    /// Identifier equipped on a limb.
    #[must_use]
    pub fn limb(&self, limb: Limb) -> Option<&str> {
        match limb {
            Limb::LeftArm => self.left_arm.as_deref(),
            Limb::RightArm => self.right_arm.as_deref(),
        }
    }

    /// Every non-empty identifier, for building catalogs.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.head.as_str())
            .chain(self.hat.as_deref())
            .chain(self.body.as_deref())
            .chain(self.left_arm.as_deref())
            .chain(self.right_arm.as_deref())
            .chain(self.legs.as_deref())
            .filter(|id| !id.is_empty())
    }
}
