//! Persisted record layout shared with the web client's local storage.
//!
//! Limb overrides are kept in the web client's string-percent format so records
//! written by earlier clients stay readable:
//!
//! ```text
//! { "top": "50%", "horizontal": "-40%", "rotation": -15,
//!   "transformOrigin": "left center", "width": "65%", "height": "80%" }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::equipment::Equipment;
use crate::limb::{Limb, LimbMap, LimbTransform};

/// Document form of one limb override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmPositionDocument {
    /// Vertical anchor, e.g. `"50%"`.
    pub top: String,
    /// Horizontal offset, e.g. `"-40%"`.
    pub horizontal: String,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Pivot, e.g. `"left center"`.
    pub transform_origin: String,
    /// Width override, e.g. `"65%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Height override, e.g. `"80%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl From<&LimbTransform> for ArmPositionDocument {
    fn from(transform: &LimbTransform) -> Self {
        Self {
            top: format_percent(transform.top_percent()),
            horizontal: format_percent(transform.horizontal_percent()),
            rotation: transform.rotation_degrees(),
            transform_origin: transform.transform_origin().as_css().to_string(),
            width: transform.width_override().map(format_percent),
            height: transform.height_override().map(format_percent),
        }
    }
}

impl ArmPositionDocument {
    /// Convert to a runtime transform for `limb`.
    ///
    /// The stored origin is ignored; the pivot always follows the limb's side.
    ///
    /// # Errors
    ///
    /// Returns an error string if a position or the rotation is not a finite
    /// number.
    pub fn into_transform(self, limb: Limb) -> Result<LimbTransform, String> {
        let top = parse_percent(&self.top).ok_or_else(|| format!("bad top {:?}", self.top))?;
        let horizontal = parse_percent(&self.horizontal)
            .ok_or_else(|| format!("bad horizontal {:?}", self.horizontal))?;
        if !self.rotation.is_finite() {
            return Err(format!("bad rotation {}", self.rotation));
        }
        if self.transform_origin != limb.transform_origin().as_css() {
            tracing::debug!(
                "Ignoring stored origin {:?} for {limb}",
                self.transform_origin
            );
        }
        let width = self.width.as_deref().and_then(parse_percent);
        let height = self.height.as_deref().and_then(parse_percent);

        Ok(LimbTransform::default_for(limb)
            .with_top_percent(top)
            .with_horizontal_percent(horizontal)
            .with_rotation(self.rotation)
            .with_size(width, height))
    }
}

/// Format a percentage the way the web client writes it.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}

/// Parse `"12.5%"` or `"12.5"` into `12.5`. Returns `None` for anything that
/// is not a finite number.
#[must_use]
pub fn parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The whole persisted profile record.
///
/// Only the equipment and limb overrides are interpreted; every other field
/// (coins, owned items, profiles...) is carried through untouched. A null or
/// mistyped rig field falls back to its own default and never fails the
/// record, so a write-back cannot drop the fields around it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Equipped parts.
    #[serde(flatten)]
    pub equipment: Equipment,
    /// Raw limb overrides keyed by limb name.
    #[serde(rename = "armPositions", default, deserialize_with = "lenient_overrides")]
    arm_positions: Map<String, Value>,
    /// Fields owned by other parts of the application.
    #[serde(flatten)]
    other: Map<String, Value>,
}

fn lenient_overrides<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Map<String, Value>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(overrides) => Ok(overrides),
        Value::Null => Ok(Map::new()),
        other => {
            tracing::warn!("Discarding non-object armPositions {other}");
            Ok(Map::new())
        }
    }
}

impl ProfileRecord {
    /// Parse a record.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The stored override for `limb`.
    ///
    /// A malformed entry is logged and treated as absent, so that limb falls
    /// back to its default while the other keeps its override.
    #[must_use]
    pub fn limb_override(&self, limb: Limb) -> Option<LimbTransform> {
        let raw = self.arm_positions.get(limb.as_str())?;
        if raw.is_null() {
            return None;
        }
        let parsed = serde_json::from_value::<ArmPositionDocument>(raw.clone())
            .map_err(|e| e.to_string())
            .and_then(|doc| doc.into_transform(limb));
        match parsed {
            Ok(transform) => Some(transform),
            Err(e) => {
                tracing::warn!("Discarding malformed {limb} override: {e}");
                None
            }
        }
    }

    /// Overrides for both limbs.
    #[must_use]
    pub fn limb_overrides(&self) -> LimbMap<Option<LimbTransform>> {
        LimbMap::from_fn(|limb| self.limb_override(limb))
    }

    /// Store an override for `limb`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform cannot be converted to JSON.
    pub fn set_limb_override(
        &mut self,
        limb: Limb,
        transform: &LimbTransform,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(ArmPositionDocument::from(transform))?;
        self.arm_positions.insert(limb.as_str().to_string(), value);
        Ok(())
    }

    /// Drop every limb override.
    pub fn clear_limb_overrides(&mut self) {
        self.arm_positions.clear();
    }

    /// An unrelated field carried in the record.
    #[must_use]
    pub fn other(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }
}
