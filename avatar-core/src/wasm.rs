//! WebAssembly bindings for avatar-core.
//!
//! The web host owns the DOM, the edit-mode flag and the storage write-back;
//! everything crosses the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{
    Asset, AssetCatalog, AvatarRig, HostState, KeyValueStore, Limb, MemoryStore, PointerEvent,
    ProfileRecord, RigConfig, RotationPreset,
};

/// Initialize the avatar WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Rig instance for WASM.
#[wasm_bindgen]
pub struct WasmRig {
    rig: AvatarRig<MemoryStore>,
    host: HostState,
}

#[wasm_bindgen]
impl WasmRig {
    /// Create a rig from the stored profile record, if any.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(record_json: Option<String>) -> Self {
        let config = RigConfig::default();
        let backend = record_json.map_or_else(MemoryStore::new, |json| {
            MemoryStore::with_value(&config.storage_key, json)
        });
        Self {
            rig: AvatarRig::load(backend, config),
            host: HostState::display(),
        }
    }

    /// Enter or leave edit mode.
    ///
    /// Leaving edit mode mid-drag reverts the limb; the `cancelled` event is
    /// returned as JSON in that case.
    #[wasm_bindgen(js_name = setEditable)]
    pub fn set_editable(&mut self, editable: bool) -> Option<String> {
        self.host.editable = editable;
        if editable {
            return None;
        }
        self.host.selection.clear();
        self.rig
            .cancel_gesture()
            .and_then(|event| serde_json::to_string(&event).ok())
    }

    /// Feed one pointer event. Returns the outcome as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event is malformed or a commit fails.
    #[wasm_bindgen(js_name = handlePointer)]
    pub fn handle_pointer(&mut self, event_json: &str) -> Result<String, String> {
        let event: PointerEvent = serde_json::from_str(event_json).map_err(|e| e.to_string())?;
        let outcome = self
            .rig
            .handle(&mut self.host, &event)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&outcome).map_err(|e| e.to_string())
    }

    /// Apply a preset rotation to the selected limb. Returns the event as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the limb or angle is invalid or the rig
    /// refuses the preset.
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&mut self, limb: &str, degrees: f64) -> Result<String, String> {
        let limb: Limb = limb.parse().map_err(|e: crate::RigError| e.to_string())?;
        let preset = RotationPreset::try_from(degrees).map_err(|e| e.to_string())?;
        let event = self
            .rig
            .apply_preset(&self.host, limb, preset)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&event).map_err(|e| e.to_string())
    }

    /// Limb holding the pointer capture, if any.
    #[wasm_bindgen(js_name = captureOwner)]
    #[must_use]
    pub fn capture_owner(&self) -> Option<String> {
        self.rig.capture_owner().map(|limb| limb.as_str().to_string())
    }

    /// Selected limb, if any.
    #[wasm_bindgen(js_name = selectedLimb)]
    #[must_use]
    pub fn selected_limb(&self) -> Option<String> {
        self.host
            .selection
            .selected()
            .map(|limb| limb.as_str().to_string())
    }

    /// Current limb placements as JSON.
    #[wasm_bindgen(js_name = getTransformsJson)]
    #[must_use]
    pub fn get_transforms_json(&self) -> String {
        serde_json::to_string(self.rig.transforms()).unwrap_or_default()
    }

    /// Layered view as JSON, resolving parts against `catalog_json`
    /// (an array of `{ "id", "markup" }`).
    ///
    /// # Errors
    ///
    /// Returns an error string if the catalog cannot be parsed.
    #[wasm_bindgen(js_name = getCompositionJson)]
    pub fn get_composition_json(&self, catalog_json: &str) -> Result<String, String> {
        let assets: Vec<Asset> = serde_json::from_str(catalog_json).map_err(|e| e.to_string())?;
        let catalog = assets.into_iter().fold(AssetCatalog::new(), AssetCatalog::with);
        let equipment = self.rig.store().load_equipment();
        let composition = self.rig.compose(&self.host, &equipment, &catalog);
        serde_json::to_string(&composition).map_err(|e| e.to_string())
    }

    /// The profile record to write back to local storage.
    #[wasm_bindgen(js_name = exportRecordJson)]
    #[must_use]
    pub fn export_record_json(&self) -> String {
        let store = self.rig.store();
        match store.backend().get(store.key()) {
            Ok(Some(json)) => json,
            _ => ProfileRecord::default().to_json().unwrap_or_default(),
        }
    }

    /// Return both limbs to their default placements.
    ///
    /// # Errors
    ///
    /// Returns an error string if the record cannot be rewritten.
    pub fn reset(&mut self) -> Result<(), String> {
        self.rig.reset().map_err(|e| e.to_string())
    }

    /// Release any capture before the host view is destroyed.
    pub fn teardown(&mut self) {
        self.rig.teardown();
    }
}

impl Default for WasmRig {
    fn default() -> Self {
        Self::new(None)
    }
}
