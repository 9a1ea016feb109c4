//! # Avatar Rig
//!
//! Drives limb selection, dragging and preset rotation from pointer input.
//!
//! ```text
//!              load (override found)
//!   Default ─────────────────────────► Positioned
//!      │  ▲                               │  ▲
//!  tap │  │ tap again / other limb   tap  │  │ pointer-up (commit)
//!      ▼  │                               ▼  │
//!   Selected ──────── drag-start ───────► Dragging
//! ```
//!
//! Outside edit mode every limb is in `Display` and any press on a limb only
//! asks the host for edit mode.
//!
//! The rig holds at most one [`GestureSession`]. While it exists the rig owns
//! the pointer capture and the host must route window-level move/up events to
//! it; [`AvatarRig::capture_owner`] reports this. Every path that ends a
//! session releases the capture: pointer-up, cancel, a selection change to
//! another limb, leaving edit mode, [`AvatarRig::reset`] and
//! [`AvatarRig::teardown`].

use serde::{Deserialize, Serialize};

use crate::composition::{compose, AssetResolver, Composition};
use crate::config::RigConfig;
use crate::drag::{map_drag, ContainerSize};
use crate::equipment::Equipment;
use crate::event::{PointerEvent, PointerOutcome, PointerSample, RigEvent};
use crate::gesture::{GestureOutcome, GestureSession, MoveOutcome};
use crate::limb::{Limb, LimbMap, LimbTransform};
use crate::selection::{HostState, RotationPreset};
use crate::store::{KeyValueStore, TransformStore};
use crate::{RigError, RigResult};

/// Interaction state of one limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimbState {
    /// Using the built-in placement.
    Default,
    /// Using a stored placement.
    Positioned,
    /// Selected for preset rotation.
    Selected,
    /// Being dragged.
    Dragging,
    /// Display-only rig.
    Display,
}

/// The interactive limb rig.
#[derive(Debug)]
pub struct AvatarRig<S> {
    config: RigConfig,
    store: TransformStore<S>,
    live: LimbMap<LimbTransform>,
    overridden: LimbMap<bool>,
    session: Option<GestureSession>,
}

impl<S: KeyValueStore> AvatarRig<S> {
    /// Load the rig from `backend`. Limbs without a valid stored override
    /// start at their defaults.
    pub fn load(backend: S, config: RigConfig) -> Self {
        let store = TransformStore::new(backend, config.storage_key.clone());
        let overrides = store.load_overrides();
        let live = LimbMap::from_fn(|limb| {
            overrides
                .get(limb)
                .unwrap_or_else(|| LimbTransform::default_for(limb))
        });
        let overridden = LimbMap::from_fn(|limb| overrides.get(limb).is_some());
        tracing::info!(
            "Rig loaded (leftArm override: {}, rightArm override: {})",
            overridden.left_arm,
            overridden.right_arm
        );
        Self {
            config,
            store,
            live,
            overridden,
            session: None,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RigConfig {
        &self.config
    }

    /// The persistence layer.
    #[must_use]
    pub const fn store(&self) -> &TransformStore<S> {
        &self.store
    }

    /// Current placement of `limb`, including any uncommitted drag.
    #[must_use]
    pub fn transform(&self, limb: Limb) -> LimbTransform {
        *self.live.get(limb)
    }

    /// Current placements of both limbs.
    #[must_use]
    pub const fn transforms(&self) -> &LimbMap<LimbTransform> {
        &self.live
    }

    /// Whether `limb` uses a stored placement.
    #[must_use]
    pub fn has_override(&self, limb: Limb) -> bool {
        *self.overridden.get(limb)
    }

    /// The in-progress gesture, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// The limb that currently holds the pointer capture.
    ///
    /// While this is `Some`, the host keeps its window-level move/up
    /// listeners installed; once it is `None` they must be removed.
    #[must_use]
    pub fn capture_owner(&self) -> Option<Limb> {
        self.session.as_ref().map(GestureSession::limb)
    }

    /// State of `limb` under the host's current mode and selection.
    #[must_use]
    pub fn limb_state(&self, host: &HostState, limb: Limb) -> LimbState {
        if !host.editable {
            return LimbState::Display;
        }
        let dragging = self
            .session
            .as_ref()
            .is_some_and(|s| s.limb() == limb && s.is_dragging());
        if dragging {
            LimbState::Dragging
        } else if host.selection.is_selected(limb) {
            LimbState::Selected
        } else if self.has_override(limb) {
            LimbState::Positioned
        } else {
            LimbState::Default
        }
    }

    /// States of both limbs.
    #[must_use]
    pub fn limb_states(&self, host: &HostState) -> LimbMap<LimbState> {
        LimbMap::from_fn(|limb| self.limb_state(host, limb))
    }

    /// Dispatch one pointer event.
    ///
    /// # Errors
    ///
    /// Returns an error only if committing a finished drag fails to persist.
    pub fn handle(&mut self, host: &mut HostState, event: &PointerEvent) -> RigResult<PointerOutcome> {
        match event {
            PointerEvent::Down { limb, sample } => Ok(self.pointer_down(host, *limb, sample)),
            PointerEvent::Move { sample, container } => {
                Ok(self.pointer_move(host, sample, *container))
            }
            PointerEvent::Up { sample } => self.pointer_up(host, sample),
            PointerEvent::Cancel { sample } => Ok(self.pointer_cancel(sample)),
        }
    }

    /// Pointer pressed on `limb`.
    ///
    /// In display mode this only requests edit mode. In edit mode it opens a
    /// gesture session unless one is already running (secondary touches are
    /// ignored).
    pub fn pointer_down(&mut self, host: &HostState, limb: Limb, sample: &PointerSample) -> PointerOutcome {
        if !host.editable {
            self.discard_session();
            tracing::debug!("Press on {limb} in display mode, requesting edit");
            return PointerOutcome::emit(RigEvent::EditRequested);
        }
        if let Some(session) = &self.session {
            tracing::debug!(
                "Ignoring pointer {} on {limb}; {} already captured by pointer {}",
                sample.pointer_id,
                session.limb(),
                session.pointer_id()
            );
            return PointerOutcome::none();
        }
        if !sample.is_finite() {
            return PointerOutcome::none();
        }
        self.session = Some(GestureSession::begin(limb, sample, self.transform(limb)));
        PointerOutcome::none()
    }

    /// Pointer moved while captured.
    ///
    /// Drag updates only touch the live placement; nothing is persisted until
    /// pointer-up.
    pub fn pointer_move(
        &mut self,
        host: &HostState,
        sample: &PointerSample,
        container: ContainerSize,
    ) -> PointerOutcome {
        if !host.editable {
            return self.leave_edit_mode();
        }
        let Some(session) = self.session.as_mut() else {
            return PointerOutcome::none();
        };
        match session.on_move(sample, &self.config.gesture) {
            MoveOutcome::Ignored | MoveOutcome::Pending => PointerOutcome::none(),
            MoveOutcome::DragStarted(delta) | MoveOutcome::Dragged(delta) => {
                let limb = session.limb();
                let next = map_drag(session.start_transform(), delta, container, &self.config.drag);
                *self.live.get_mut(limb) = next;
                PointerOutcome::consumed()
            }
        }
    }

    /// Pointer released.
    ///
    /// # Errors
    ///
    /// Returns an error if a finished drag cannot be persisted. The capture
    /// is released and the live placement keeps the dragged value either way.
    pub fn pointer_up(&mut self, host: &mut HostState, sample: &PointerSample) -> RigResult<PointerOutcome> {
        if !self.session.as_ref().is_some_and(|s| s.owns(sample)) {
            return Ok(PointerOutcome::none());
        }
        if !host.editable {
            return Ok(self.leave_edit_mode());
        }
        let Some(session) = self.session.take() else {
            return Ok(PointerOutcome::none());
        };
        let limb = session.limb();
        match session.finish(sample, &self.config.gesture) {
            GestureOutcome::Tap => Ok(PointerOutcome::emit(self.select(host, limb))),
            GestureOutcome::DragEnd => {
                let transform = self.transform(limb);
                self.store
                    .save_override(limb, &transform)
                    .inspect_err(|e| tracing::warn!("Failed to persist {limb}: {e}"))?;
                *self.overridden.get_mut(limb) = true;
                tracing::info!(
                    "Committed {limb}: top {}%, horizontal {}%, rotation {}",
                    transform.top_percent(),
                    transform.horizontal_percent(),
                    transform.rotation_degrees()
                );
                Ok(PointerOutcome::emit(RigEvent::Committed { limb, transform }))
            }
            GestureOutcome::NoOp => Ok(PointerOutcome::none()),
        }
    }

    /// Platform cancelled the capturing pointer.
    pub fn pointer_cancel(&mut self, sample: &PointerSample) -> PointerOutcome {
        if !self.session.as_ref().is_some_and(|s| s.owns(sample)) {
            return PointerOutcome::none();
        }
        self.cancel_gesture()
            .map_or_else(PointerOutcome::none, PointerOutcome::emit)
    }

    /// Abandon the current gesture. A drag reverts to its pre-drag placement
    /// without writing anything; returns `Cancelled` in that case.
    pub fn cancel_gesture(&mut self) -> Option<RigEvent> {
        let session = self.discard_session()?;
        session.is_dragging().then(|| RigEvent::Cancelled {
            limb: session.limb(),
        })
    }

    /// Toggle the selection of `limb`.
    ///
    /// A gesture running on the other limb is discarded first.
    pub fn select(&mut self, host: &mut HostState, limb: Limb) -> RigEvent {
        if self.session.as_ref().is_some_and(|s| s.limb() != limb) {
            self.discard_session();
        }
        let selected = host.selection.select(limb);
        tracing::debug!("Selection is now {selected:?}");
        RigEvent::Selected { limb: selected }
    }

    /// Snap the selected limb to a preset angle and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::NotEditable`] outside edit mode,
    /// [`RigError::NotSelected`] if `limb` is not selected,
    /// [`RigError::GestureInProgress`] while `limb` is being dragged, or a
    /// storage error if the write fails.
    pub fn apply_preset(
        &mut self,
        host: &HostState,
        limb: Limb,
        preset: RotationPreset,
    ) -> RigResult<RigEvent> {
        if !host.editable {
            return Err(RigError::NotEditable);
        }
        if !host.selection.is_selected(limb) {
            return Err(RigError::NotSelected(limb));
        }
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.limb() == limb && s.is_dragging())
        {
            return Err(RigError::GestureInProgress(limb));
        }
        let degrees = preset.degrees();
        let transform = self.transform(limb).with_rotation(degrees);
        self.store.save_override(limb, &transform)?;
        *self.live.get_mut(limb) = transform;
        *self.overridden.get_mut(limb) = true;
        tracing::info!("Rotated {limb} to preset {degrees}");
        Ok(RigEvent::Rotated { limb, degrees })
    }

    /// Drop all stored placements and return both limbs to their defaults.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the record cannot be written.
    pub fn reset(&mut self) -> RigResult<()> {
        self.discard_session();
        self.store.clear_overrides()?;
        self.live = LimbMap::from_fn(LimbTransform::default_for);
        self.overridden = LimbMap::default();
        tracing::info!("Limb placements reset to defaults");
        Ok(())
    }

    /// Release the capture when the host screen goes away.
    pub fn teardown(&mut self) {
        if let Some(session) = self.discard_session() {
            tracing::debug!("Teardown released capture on {}", session.limb());
        }
    }

    /// Build the layered view for `equipment`.
    #[must_use]
    pub fn compose<R: AssetResolver + ?Sized>(
        &self,
        host: &HostState,
        equipment: &Equipment,
        resolver: &R,
    ) -> Composition {
        compose(equipment, &self.live, &self.limb_states(host), resolver)
    }

    fn leave_edit_mode(&mut self) -> PointerOutcome {
        self.cancel_gesture()
            .map_or_else(PointerOutcome::none, |event| {
                tracing::debug!("Edit mode ended mid-gesture");
                PointerOutcome::emit(event)
            })
    }

    fn discard_session(&mut self) -> Option<GestureSession> {
        let session = self.session.take()?;
        if session.is_dragging() {
            *self.live.get_mut(session.limb()) = *session.start_transform();
            tracing::debug!("Discarded drag on {}, placement reverted", session.limb());
        }
        Some(session)
    }
}
