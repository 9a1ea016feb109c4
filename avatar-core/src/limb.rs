//! Limbs and their placement transforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RigError;

/// Default limb width as a percentage of the body box.
pub const DEFAULT_WIDTH_PERCENT: f64 = 65.0;

/// Default limb height as a percentage of the body box.
pub const DEFAULT_HEIGHT_PERCENT: f64 = 80.0;

/// An attachment point on the avatar body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Limb {
    /// The avatar's left arm (drawn on the viewer's right).
    LeftArm,
    /// The avatar's right arm (drawn on the viewer's left).
    RightArm,
}

impl Limb {
    /// Both limbs, in paint order.
    pub const ALL: [Limb; 2] = [Limb::RightArm, Limb::LeftArm];

    /// Stable identifier used in persisted records and host bindings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeftArm => "leftArm",
            Self::RightArm => "rightArm",
        }
    }

    /// The pivot this limb rotates around. Not user-editable.
    #[must_use]
    pub const fn transform_origin(self) -> TransformOrigin {
        match self {
            Self::LeftArm => TransformOrigin::LeftCenter,
            Self::RightArm => TransformOrigin::RightCenter,
        }
    }

    /// The body edge the horizontal offset is measured from.
    #[must_use]
    pub const fn anchor_edge(self) -> AnchorEdge {
        match self {
            Self::LeftArm => AnchorEdge::Right,
            Self::RightArm => AnchorEdge::Left,
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Limb {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leftArm" | "left-arm" | "left" => Ok(Self::LeftArm),
            "rightArm" | "right-arm" | "right" => Ok(Self::RightArm),
            other => Err(RigError::UnknownLimb(other.to_string())),
        }
    }
}

/// Rotation pivot of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformOrigin {
    /// `left center`
    #[serde(rename = "left center")]
    LeftCenter,
    /// `right center`
    #[serde(rename = "right center")]
    RightCenter,
}

impl TransformOrigin {
    /// CSS spelling of the origin.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::LeftCenter => "left center",
            Self::RightCenter => "right center",
        }
    }
}

/// Body edge a limb's horizontal offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorEdge {
    /// Offset from the body's left edge.
    Left,
    /// Offset from the body's right edge.
    Right,
}

/// Wrap an angle in degrees into `(-180, 180]`.
///
/// Values already in range are returned unchanged, so the function is
/// idempotent. Non-finite input maps to `0.0`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    if degrees > -180.0 && degrees <= 180.0 {
        return degrees;
    }
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Placement of one limb, in percentages of the body box.
///
/// Fields are private so that the clamp and normalization invariants hold for
/// every value that exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LimbTransform {
    top_percent: f64,
    horizontal_percent: f64,
    rotation_degrees: f64,
    transform_origin: TransformOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    width_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height_percent: Option<f64>,
}

impl LimbTransform {
    /// The compiled-in placement for a limb.
    #[must_use]
    pub fn default_for(limb: Limb) -> Self {
        let rotation = match limb {
            Limb::LeftArm => -15.0,
            Limb::RightArm => 15.0,
        };
        Self {
            top_percent: 50.0,
            horizontal_percent: -40.0,
            rotation_degrees: rotation,
            transform_origin: limb.transform_origin(),
            width_percent: Some(DEFAULT_WIDTH_PERCENT),
            height_percent: Some(DEFAULT_HEIGHT_PERCENT),
        }
    }

    /// Vertical anchor, `0..=100`.
    #[must_use]
    pub const fn top_percent(&self) -> f64 {
        self.top_percent
    }

    /// Signed horizontal offset from the limb's anchor edge.
    #[must_use]
    pub const fn horizontal_percent(&self) -> f64 {
        self.horizontal_percent
    }

    /// Rotation in degrees, within `(-180, 180]`.
    #[must_use]
    pub const fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    /// Rotation pivot.
    #[must_use]
    pub const fn transform_origin(&self) -> TransformOrigin {
        self.transform_origin
    }

    /// Width override, if one was stored.
    #[must_use]
    pub const fn width_override(&self) -> Option<f64> {
        self.width_percent
    }

    /// Height override, if one was stored.
    #[must_use]
    pub const fn height_override(&self) -> Option<f64> {
        self.height_percent
    }

    /// Effective width in percent.
    #[must_use]
    pub fn width_percent(&self) -> f64 {
        self.width_percent.unwrap_or(DEFAULT_WIDTH_PERCENT)
    }

    /// Effective height in percent.
    #[must_use]
    pub fn height_percent(&self) -> f64 {
        self.height_percent.unwrap_or(DEFAULT_HEIGHT_PERCENT)
    }

    /// Set the vertical anchor, clamped to `0..=100`. Non-finite values are ignored.
    #[must_use]
    pub fn with_top_percent(mut self, top: f64) -> Self {
        if top.is_finite() {
            self.top_percent = top.clamp(0.0, 100.0);
        }
        self
    }

    /// Set the horizontal offset. Unclamped; non-finite values are ignored.
    #[must_use]
    pub fn with_horizontal_percent(mut self, horizontal: f64) -> Self {
        if horizontal.is_finite() {
            self.horizontal_percent = horizontal;
        }
        self
    }

    /// Set the rotation, wrapped into `(-180, 180]`.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = normalize_rotation(degrees);
        self
    }

    /// Replace the size overrides. Non-finite or non-positive sizes drop the override.
    #[must_use]
    pub fn with_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        self.width_percent = width.filter(|w| valid(*w));
        self.height_percent = height.filter(|h| valid(*h));
        self
    }
}

/// One value per limb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimbMap<T> {
    /// Value for [`Limb::LeftArm`].
    pub left_arm: T,
    /// Value for [`Limb::RightArm`].
    pub right_arm: T,
}

impl<T> LimbMap<T> {
    /// Build a map by evaluating `f` for each limb.
    pub fn from_fn(mut f: impl FnMut(Limb) -> T) -> Self {
        Self {
            left_arm: f(Limb::LeftArm),
            right_arm: f(Limb::RightArm),
        }
    }

    /// Borrow the value for a limb.
    #[must_use]
    pub const fn get(&self, limb: Limb) -> &T {
        match limb {
            Limb::LeftArm => &self.left_arm,
            Limb::RightArm => &self.right_arm,
        }
    }

    /// Mutably borrow the value for a limb.
    pub fn get_mut(&mut self, limb: Limb) -> &mut T {
        match limb {
            Limb::LeftArm => &mut self.left_arm,
            Limb::RightArm => &mut self.right_arm,
        }
    }

    /// Iterate `(limb, value)` pairs in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (Limb, &T)> {
        Limb::ALL.into_iter().map(move |limb| (limb, self.get(limb)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_defaults_per_side() {
        let left = LimbTransform::default_for(Limb::LeftArm);
        assert!(approx(left.top_percent(), 50.0));
        assert!(approx(left.horizontal_percent(), -40.0));
        assert!(approx(left.rotation_degrees(), -15.0));
        assert_eq!(left.transform_origin(), TransformOrigin::LeftCenter);

        let right = LimbTransform::default_for(Limb::RightArm);
        assert!(approx(right.rotation_degrees(), 15.0));
        assert_eq!(right.transform_origin(), TransformOrigin::RightCenter);
        assert!(approx(right.width_percent(), 65.0));
        assert!(approx(right.height_percent(), 80.0));
    }

    #[test]
    fn test_normalize_rotation_wraps() {
        assert!(approx(normalize_rotation(190.0), -170.0));
        assert!(approx(normalize_rotation(-190.0), 170.0));
        assert!(approx(normalize_rotation(540.0), 180.0));
        assert!(approx(normalize_rotation(-180.0), 180.0));
        assert!(approx(normalize_rotation(180.0), 180.0));
        assert!(approx(normalize_rotation(720.0), 0.0));
        assert!(approx(normalize_rotation(-45.0), -45.0));
    }

    #[test]
    fn test_normalize_rotation_non_finite() {
        assert!(approx(normalize_rotation(f64::NAN), 0.0));
        assert!(approx(normalize_rotation(f64::INFINITY), 0.0));
    }

    #[test]
    fn test_top_clamps_horizontal_does_not() {
        let t = LimbTransform::default_for(Limb::LeftArm)
            .with_top_percent(150.0)
            .with_horizontal_percent(-250.0);
        assert!(approx(t.top_percent(), 100.0));
        assert!(approx(t.horizontal_percent(), -250.0));

        let t = t.with_top_percent(-3.0);
        assert!(approx(t.top_percent(), 0.0));
    }

    #[test]
    fn test_non_finite_position_ignored() {
        let t = LimbTransform::default_for(Limb::RightArm)
            .with_top_percent(f64::NAN)
            .with_horizontal_percent(f64::NEG_INFINITY);
        assert!(approx(t.top_percent(), 50.0));
        assert!(approx(t.horizontal_percent(), -40.0));
    }

    #[test]
    fn test_size_overrides() {
        let t = LimbTransform::default_for(Limb::LeftArm).with_size(None, Some(-1.0));
        assert_eq!(t.width_override(), None);
        assert_eq!(t.height_override(), None);
        assert!(approx(t.width_percent(), DEFAULT_WIDTH_PERCENT));
    }

    #[test]
    fn test_limb_parse() {
        assert_eq!("leftArm".parse::<Limb>().ok(), Some(Limb::LeftArm));
        assert_eq!("right".parse::<Limb>().ok(), Some(Limb::RightArm));
        assert!(matches!(
            "tail".parse::<Limb>(),
            Err(RigError::UnknownLimb(name)) if name == "tail"
        ));
        assert_eq!(Limb::LeftArm.to_string(), "leftArm");
    }

    #[test]
    fn test_limb_map_iter_order() {
        let map = LimbMap::from_fn(Limb::as_str);
        let order: Vec<_> = map.iter().map(|(limb, _)| limb).collect();
        assert_eq!(order, vec![Limb::RightArm, Limb::LeftArm]);
        assert_eq!(*map.get(Limb::LeftArm), "leftArm");
    }
}
