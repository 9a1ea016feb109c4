//! # Composition
//!
//! Assembles the equipped parts into back-to-front layers.
//!
//! ```text
//! legs ─► right arm ─► left arm ─► body ─► head ─► hat
//! (back)                                          (front)
//! ```
//!
//! The body gates the legs and both arms when the layers are built, not when
//! parts are equipped, so equip order never matters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::equipment::Equipment;
use crate::limb::{AnchorEdge, Limb, LimbMap, LimbTransform};
use crate::rig::LimbState;

/// Prefix of identifiers that name built-in heads rather than image URLs.
pub const INTERNAL_HEAD_PREFIX: &str = "head-";

/// Glyph drawn in place of a head that cannot be resolved.
pub const PLACEHOLDER_GLYPH: char = '?';

/// A renderable graphic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifier the asset is registered under.
    pub id: String,
    /// SVG fragment drawn inside the layer's box.
    pub markup: String,
}

impl Asset {
    /// Create an asset.
    #[must_use]
    pub fn new(id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            markup: markup.into(),
        }
    }
}

/// Looks up graphics by identifier.
pub trait AssetResolver {
    /// The asset registered as `id`, or `None` if there is none.
    fn resolve(&self, id: &str) -> Option<&Asset>;
}

/// In-memory asset table.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, Asset>,
}

impl AssetCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset, replacing any with the same identifier.
    pub fn insert(&mut self, asset: Asset) {
        self.assets.insert(asset.id.clone(), asset);
    }

    /// Builder form of [`AssetCatalog::insert`].
    #[must_use]
    pub fn with(mut self, asset: Asset) -> Self {
        self.insert(asset);
        self
    }

    /// Number of registered assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetResolver for AssetCatalog {
    fn resolve(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }
}

/// Which part a layer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Legs, behind everything.
    Legs,
    /// Right arm.
    RightArm,
    /// Left arm.
    LeftArm,
    /// Body card.
    Body,
    /// Head.
    Head,
    /// Hat, in front of everything.
    Hat,
}

impl From<Limb> for LayerKind {
    fn from(limb: Limb) -> Self {
        match limb {
            Limb::LeftArm => Self::LeftArm,
            Limb::RightArm => Self::RightArm,
        }
    }
}

/// What a layer shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContent {
    /// A resolved asset.
    Asset {
        /// The graphic.
        asset: Asset,
    },
    /// An external image (heads only).
    ExternalImage {
        /// Image URL.
        url: String,
    },
    /// A placeholder glyph (heads only).
    Placeholder {
        /// Glyph to draw.
        glyph: char,
    },
}

/// Box a layer is positioned relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    /// The avatar's root box (the head circle).
    Root,
    /// The body box.
    Body,
}

/// A fixed box in percentages of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlacement {
    /// Top edge.
    pub top: f64,
    /// Left edge.
    pub left: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Rotation in degrees.
    pub rotation_degrees: f64,
    /// Whether `left` names the box's horizontal center instead of its edge.
    pub centered: bool,
}

impl BoxPlacement {
    const fn new(top: f64, left: f64, width: f64, height: f64, rotation_degrees: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            rotation_degrees,
            centered: false,
        }
    }
}

/// Head fills the root box.
pub const HEAD_PLACEMENT: BoxPlacement = BoxPlacement::new(0.0, 0.0, 100.0, 100.0, 0.0);

/// Hat sits over the top of the head, tilted.
pub const HAT_PLACEMENT: BoxPlacement = BoxPlacement::new(-55.0, 10.0, 80.0, 70.0, -5.0);

/// Body hangs below the head, centered.
pub const BODY_PLACEMENT: BoxPlacement = BoxPlacement {
    top: 80.0,
    left: 50.0,
    width: 70.0,
    height: 70.0,
    rotation_degrees: 0.0,
    centered: true,
};

/// Legs hang below the body box.
pub const LEGS_PLACEMENT: BoxPlacement = BoxPlacement::new(85.0, 10.0, 80.0, 80.0, -2.0);

/// Where a layer goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placement {
    /// A fixed box.
    Fixed {
        /// Parent box.
        parent: Parent,
        /// Position and size.
        #[serde(flatten)]
        placement: BoxPlacement,
    },
    /// A user-positioned limb inside the body box.
    Limb {
        /// Body edge the horizontal offset is measured from.
        anchor: AnchorEdge,
        /// The limb's placement.
        transform: LimbTransform,
    },
}

/// One drawn part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Which part.
    pub kind: LayerKind,
    /// What is drawn.
    pub content: LayerContent,
    /// Where it is drawn.
    pub placement: Placement,
    /// Interaction state for limb layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<LimbState>,
}

/// The assembled avatar, back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Composition {
    /// Layers in paint order.
    pub layers: Vec<Layer>,
}

impl Composition {
    /// The layer for `kind`, if drawn.
    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    /// Whether a layer of `kind` is drawn.
    #[must_use]
    pub fn contains(&self, kind: LayerKind) -> bool {
        self.layer(kind).is_some()
    }

    /// Layer kinds in paint order.
    #[must_use]
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|layer| layer.kind).collect()
    }
}

/// Build the layers for `equipment`.
///
/// Missing assets never fail: an unresolvable head becomes a placeholder and
/// every other unresolvable part is left out.
#[must_use]
pub fn compose<R: AssetResolver + ?Sized>(
    equipment: &Equipment,
    transforms: &LimbMap<LimbTransform>,
    states: &LimbMap<LimbState>,
    resolver: &R,
) -> Composition {
    let lookup = |id: Option<&str>| id.and_then(|id| resolver.resolve(id)).cloned();
    let mut layers = Vec::with_capacity(6);

    let body = lookup(equipment.body.as_deref());
    if let Some(body) = body {
        if let Some(legs) = lookup(equipment.legs.as_deref()) {
            layers.push(fixed_layer(LayerKind::Legs, legs, Parent::Body, LEGS_PLACEMENT));
        }
        for (limb, transform) in transforms.iter() {
            let Some(asset) = lookup(equipment.limb(limb)) else {
                continue;
            };
            layers.push(Layer {
                kind: limb.into(),
                content: LayerContent::Asset { asset },
                placement: Placement::Limb {
                    anchor: limb.anchor_edge(),
                    transform: *transform,
                },
                state: Some(*states.get(limb)),
            });
        }
        layers.push(fixed_layer(LayerKind::Body, body, Parent::Root, BODY_PLACEMENT));
    } else if equipment.limb(Limb::LeftArm).is_some()
        || equipment.limb(Limb::RightArm).is_some()
        || equipment.legs.is_some()
    {
        tracing::debug!("No body equipped; limbs and legs not drawn");
    }

    layers.push(Layer {
        kind: LayerKind::Head,
        content: head_content(&equipment.head, resolver),
        placement: Placement::Fixed {
            parent: Parent::Root,
            placement: HEAD_PLACEMENT,
        },
        state: None,
    });

    if let Some(hat) = lookup(equipment.hat.as_deref()) {
        layers.push(fixed_layer(LayerKind::Hat, hat, Parent::Root, HAT_PLACEMENT));
    }

    Composition { layers }
}

fn fixed_layer(kind: LayerKind, asset: Asset, parent: Parent, placement: BoxPlacement) -> Layer {
    Layer {
        kind,
        content: LayerContent::Asset { asset },
        placement: Placement::Fixed { parent, placement },
        state: None,
    }
}

fn head_content<R: AssetResolver + ?Sized>(head: &str, resolver: &R) -> LayerContent {
    if head.is_empty() {
        return LayerContent::Placeholder {
            glyph: PLACEHOLDER_GLYPH,
        };
    }
    if head.starts_with(INTERNAL_HEAD_PREFIX) {
        return resolver.resolve(head).map_or(
            LayerContent::Placeholder {
                glyph: PLACEHOLDER_GLYPH,
            },
            |asset| LayerContent::Asset {
                asset: asset.clone(),
            },
        );
    }
    LayerContent::ExternalImage {
        url: head.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::Slot;
    use proptest::prelude::*;

    fn catalog() -> AssetCatalog {
        AssetCatalog::new()
            .with(Asset::new("head-toast", "<circle r='40'/>"))
            .with(Asset::new("hat-crown", "<path d='M0 0'/>"))
            .with(Asset::new("body-robot", "<rect/>"))
            .with(Asset::new("legs-robot", "<rect/>"))
            .with(Asset::new("arm-l-robot", "<rect/>"))
            .with(Asset::new("arm-r-robot", "<rect/>"))
    }

    fn transforms() -> LimbMap<LimbTransform> {
        LimbMap::from_fn(LimbTransform::default_for)
    }

    fn states() -> LimbMap<LimbState> {
        LimbMap::from_fn(|_| LimbState::Default)
    }

    fn full_equipment() -> Equipment {
        let mut equipment = Equipment::default();
        equipment.equip(Slot::Hat, "hat-crown");
        equipment.equip(Slot::Body, "body-robot");
        equipment.equip(Slot::Legs, "legs-robot");
        equipment.equip(Slot::LeftArm, "arm-l-robot");
        equipment.equip(Slot::RightArm, "arm-r-robot");
        equipment
    }

    #[test]
    fn test_full_avatar_z_order() {
        let composition = compose(&full_equipment(), &transforms(), &states(), &catalog());
        assert_eq!(
            composition.kinds(),
            vec![
                LayerKind::Legs,
                LayerKind::RightArm,
                LayerKind::LeftArm,
                LayerKind::Body,
                LayerKind::Head,
                LayerKind::Hat,
            ]
        );
    }

    #[test]
    fn test_no_body_hides_limbs_and_legs() {
        let mut equipment = full_equipment();
        equipment.unequip(Slot::Body);
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        assert_eq!(composition.kinds(), vec![LayerKind::Head, LayerKind::Hat]);
    }

    #[test]
    fn test_unresolvable_body_counts_as_missing() {
        let mut equipment = full_equipment();
        equipment.equip(Slot::Body, "body-unknown");
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        assert!(!composition.contains(LayerKind::LeftArm));
        assert!(!composition.contains(LayerKind::Legs));
        assert!(!composition.contains(LayerKind::Body));
    }

    #[test]
    fn test_unknown_internal_head_is_placeholder() {
        let mut equipment = Equipment::default();
        equipment.equip(Slot::Avatar, "head-missing");
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        let head = composition.layer(LayerKind::Head).expect("head always drawn");
        assert_eq!(head.content, LayerContent::Placeholder { glyph: '?' });
    }

    #[test]
    fn test_empty_head_is_placeholder() {
        let mut equipment = Equipment::default();
        equipment.equip(Slot::Avatar, "");
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        assert!(matches!(
            composition.layer(LayerKind::Head).map(|l| &l.content),
            Some(LayerContent::Placeholder { .. })
        ));
    }

    #[test]
    fn test_external_head_url() {
        let mut equipment = Equipment::default();
        equipment.equip(Slot::Avatar, "https://example.com/me.png");
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        assert_eq!(
            composition.layer(LayerKind::Head).map(|l| &l.content),
            Some(&LayerContent::ExternalImage {
                url: "https://example.com/me.png".to_string()
            })
        );
    }

    #[test]
    fn test_unresolvable_hat_omitted() {
        let mut equipment = Equipment::default();
        equipment.equip(Slot::Hat, "hat-unknown");
        let composition = compose(&equipment, &transforms(), &states(), &catalog());
        assert_eq!(composition.kinds(), vec![LayerKind::Head]);
    }

    #[test]
    fn test_limb_layer_carries_transform_and_state() {
        let moved = transforms();
        let mut moved = moved;
        moved.left_arm = moved.left_arm.with_rotation(90.0);
        let mut limb_states = states();
        limb_states.left_arm = LimbState::Selected;

        let composition = compose(&full_equipment(), &moved, &limb_states, &catalog());
        let left = composition.layer(LayerKind::LeftArm).expect("left arm drawn");
        assert_eq!(left.state, Some(LimbState::Selected));
        match left.placement {
            Placement::Limb { anchor, transform } => {
                assert_eq!(anchor, AnchorEdge::Right);
                assert!((transform.rotation_degrees() - 90.0).abs() < 1e-9);
            }
            Placement::Fixed { .. } => panic!("Expected limb placement"),
        }
    }

    #[test]
    fn test_layer_serializes() {
        let composition = compose(&full_equipment(), &transforms(), &states(), &catalog());
        let json = serde_json::to_value(&composition).expect("serialize");
        assert_eq!(json["layers"][0]["kind"], "legs");
        assert_eq!(json["layers"][0]["placement"]["parent"], "body");
    }

    proptest! {
        #[test]
        fn prop_body_gates_limbs(
            body in proptest::option::of(Just("body-robot".to_string())),
            legs in proptest::option::of(Just("legs-robot".to_string())),
            left in proptest::option::of(Just("arm-l-robot".to_string())),
            right in proptest::option::of(Just("arm-r-robot".to_string())),
        ) {
            let equipment = Equipment {
                body: body.clone(),
                legs: legs.clone(),
                left_arm: left.clone(),
                right_arm: right.clone(),
                ..Equipment::default()
            };
            let composition = compose(&equipment, &transforms(), &states(), &catalog());
            let has_body = body.is_some();
            prop_assert_eq!(composition.contains(LayerKind::Legs), has_body && legs.is_some());
            prop_assert_eq!(composition.contains(LayerKind::LeftArm), has_body && left.is_some());
            prop_assert_eq!(composition.contains(LayerKind::RightArm), has_body && right.is_some());
            prop_assert!(composition.contains(LayerKind::Head));
        }
    }
}
