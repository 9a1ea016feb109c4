//! # Avatar Rig Core
//!
//! Interactive limb rig for a layered character avatar.
//! Compiles to WASM for the web host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               avatar-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Input           │  Rig                     │
//! │  - Pointer events│  - Gesture sessions      │
//! │  - Tap vs. drag  │  - Selection & presets   │
//! │                  │  - Drag mapping          │
//! ├─────────────────────────────────────────────┤
//! │  Composition     │  Persistence             │
//! │  - Layer order   │  - Profile record        │
//! │  - Body gating   │  - Limb overrides        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod composition;
pub mod config;
pub mod drag;
pub mod equipment;
pub mod error;
pub mod event;
pub mod gesture;
pub mod limb;
pub mod rig;
pub mod schema;
pub mod selection;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use composition::{
    compose, Asset, AssetCatalog, AssetResolver, BoxPlacement, Composition, Layer, LayerContent,
    LayerKind, Parent, Placement,
};
pub use config::RigConfig;
pub use drag::{map_drag, ContainerSize, DragConfig, PointerDelta};
pub use equipment::{Equipment, Slot};
pub use error::{RigError, RigResult};
pub use event::{PointerEvent, PointerOutcome, PointerSample, RigEvent};
pub use gesture::{Classification, GestureConfig, GestureOutcome, GestureSession, MoveOutcome};
pub use limb::{normalize_rotation, AnchorEdge, Limb, LimbMap, LimbTransform, TransformOrigin};
pub use rig::{AvatarRig, LimbState};
pub use schema::{ArmPositionDocument, ProfileRecord};
pub use selection::{HostState, RotationPreset, Selection};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, TransformStore};

/// Avatar core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
