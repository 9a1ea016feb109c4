//! Avatar Rig Integration Tests
//!
//! Drives the rig through the same event stream a host would deliver:
//! - Tap to select and deselect
//! - Drag from the default placement and commit
//! - Display-mode edit requests
//! - Persistence across reloads
//! - Layered composition of the dragged limbs

use avatar_core::{
    Asset, AssetCatalog, AvatarRig, ContainerSize, Equipment, FileStore, HostState, KeyValueStore,
    LayerKind, Limb, LimbState, LimbTransform, MemoryStore, Placement, PointerEvent,
    PointerSample, RigConfig, RigEvent, RotationPreset, Slot,
};
use proptest::prelude::*;

const CONTAINER: ContainerSize = ContainerSize::new(200.0, 200.0);

fn down(limb: Limb, x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Down {
        limb,
        sample: PointerSample::new(x, y, t),
    }
}

fn moved(x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Move {
        sample: PointerSample::new(x, y, t),
        container: CONTAINER,
    }
}

fn up(x: f64, y: f64, t: u64) -> PointerEvent {
    PointerEvent::Up {
        sample: PointerSample::new(x, y, t),
    }
}

/// Feed events in order and collect what the rig reported.
fn run<S: KeyValueStore>(
    rig: &mut AvatarRig<S>,
    host: &mut HostState,
    events: &[PointerEvent],
) -> Vec<RigEvent> {
    events
        .iter()
        .filter_map(|event| rig.handle(host, event).expect("handled").event)
        .collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn full_catalog() -> AssetCatalog {
    ["head-toast", "body-robot", "arm-claw", "legs-wheels", "hat-crown"]
        .into_iter()
        .fold(AssetCatalog::new(), |catalog, id| {
            catalog.with(Asset::new(id, format!("<svg id=\"{id}\"/>")))
        })
}

fn full_equipment() -> Equipment {
    let mut equipment = Equipment::default();
    equipment.equip(Slot::Body, "body-robot");
    equipment.equip(Slot::LeftArm, "arm-claw");
    equipment.equip(Slot::RightArm, "arm-claw");
    equipment.equip(Slot::Legs, "legs-wheels");
    equipment.equip(Slot::Hat, "hat-crown");
    equipment
}

// ============================================================================
// Selection Tests
// ============================================================================

#[test]
fn test_quick_tap_selects_and_second_tap_deselects() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();

    let events = run(
        &mut rig,
        &mut host,
        &[
            down(Limb::RightArm, 40.0, 40.0, 1000),
            moved(42.0, 41.0, 1050),
            up(42.0, 41.0, 1100),
        ],
    );
    assert_eq!(
        events,
        vec![RigEvent::Selected {
            limb: Some(Limb::RightArm)
        }]
    );
    assert_eq!(
        rig.transform(Limb::RightArm),
        LimbTransform::default_for(Limb::RightArm)
    );

    let events = run(
        &mut rig,
        &mut host,
        &[down(Limb::RightArm, 40.0, 40.0, 2000), up(40.0, 40.0, 2080)],
    );
    assert_eq!(events, vec![RigEvent::Selected { limb: None }]);
    assert_eq!(host.selection.selected(), None);
}

#[test]
fn test_tapping_other_limb_moves_selection() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();
    run(
        &mut rig,
        &mut host,
        &[down(Limb::LeftArm, 0.0, 0.0, 0), up(0.0, 0.0, 10)],
    );
    run(
        &mut rig,
        &mut host,
        &[down(Limb::RightArm, 0.0, 0.0, 100), up(0.0, 0.0, 110)],
    );
    assert_eq!(host.selection.selected(), Some(Limb::RightArm));
    assert_eq!(rig.limb_state(&host, Limb::LeftArm), LimbState::Default);
}

#[test]
fn test_display_mode_requests_edit_and_ignores_drag() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::display();
    let events = run(
        &mut rig,
        &mut host,
        &[
            down(Limb::LeftArm, 0.0, 0.0, 0),
            moved(100.0, 100.0, 10),
            up(100.0, 100.0, 400),
        ],
    );
    assert_eq!(events, vec![RigEvent::EditRequested]);
    assert_eq!(
        rig.transform(Limb::LeftArm),
        LimbTransform::default_for(Limb::LeftArm)
    );
    assert!(rig.store().backend().peek(rig.store().key()).is_none());
}

// ============================================================================
// Drag Tests
// ============================================================================

#[test]
fn test_drag_commits_once_on_release() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();

    let events = run(
        &mut rig,
        &mut host,
        &[
            down(Limb::LeftArm, 100.0, 100.0, 0),
            moved(103.0, 100.0, 20),
            moved(150.0, 100.0, 60),
        ],
    );
    assert!(events.is_empty());
    assert!(rig.store().backend().peek(rig.store().key()).is_none());

    let live = rig.transform(Limb::LeftArm);
    assert!(approx(live.top_percent(), 50.0));
    assert!(approx(live.horizontal_percent(), -15.0));
    assert!(approx(live.rotation_degrees(), 25.0));

    let events = run(&mut rig, &mut host, &[up(150.0, 100.0, 500)]);
    assert_eq!(
        events,
        vec![RigEvent::Committed {
            limb: Limb::LeftArm,
            transform: live
        }]
    );
    assert_eq!(host.selection.selected(), None);
    assert_eq!(rig.capture_owner(), None);

    let stored = rig.store().load_overrides();
    assert_eq!(stored.left_arm, Some(live));
    assert!(stored.right_arm.is_none());
}

#[test]
fn test_drag_down_clamps_top() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();
    run(
        &mut rig,
        &mut host,
        &[
            down(Limb::RightArm, 0.0, 0.0, 0),
            moved(0.0, 1000.0, 10),
            up(0.0, 1000.0, 20),
        ],
    );
    let t = rig.transform(Limb::RightArm);
    assert!(approx(t.top_percent(), 100.0));
    assert!(approx(t.rotation_degrees(), normalize(15.0 - 400.0)));
}

fn normalize(degrees: f64) -> f64 {
    avatar_core::normalize_rotation(degrees)
}

#[test]
fn test_container_collapsed_to_zero_still_drags() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();
    rig.handle(&mut host, &down(Limb::LeftArm, 0.0, 0.0, 0))
        .expect("down");
    rig.handle(
        &mut host,
        &PointerEvent::Move {
            sample: PointerSample::new(1.0, 0.0, 10),
            container: ContainerSize::new(0.0, 0.0),
        },
    )
    .expect("move");
    // Under the slop: nothing moves yet.
    assert_eq!(
        rig.transform(Limb::LeftArm),
        LimbTransform::default_for(Limb::LeftArm)
    );
    rig.handle(
        &mut host,
        &PointerEvent::Move {
            sample: PointerSample::new(10.0, 0.0, 20),
            container: ContainerSize::new(0.0, 0.0),
        },
    )
    .expect("move");
    let t = rig.transform(Limb::LeftArm);
    assert!(t.horizontal_percent().is_finite());
    assert!(approx(t.horizontal_percent(), -40.0 + 1000.0));
}

#[test]
fn test_preset_after_drag_keeps_position() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();
    run(
        &mut rig,
        &mut host,
        &[
            down(Limb::RightArm, 0.0, 0.0, 0),
            moved(0.0, 40.0, 10),
            up(0.0, 40.0, 300),
        ],
    );
    let dragged = rig.transform(Limb::RightArm);
    rig.select(&mut host, Limb::RightArm);
    rig.apply_preset(&host, Limb::RightArm, RotationPreset::Minus45)
        .expect("preset");

    let t = rig.transform(Limb::RightArm);
    assert!(approx(t.top_percent(), dragged.top_percent()));
    assert!(approx(t.horizontal_percent(), dragged.horizontal_percent()));
    assert!(approx(t.rotation_degrees(), -45.0));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_file_store_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let backend = FileStore::with_data_dir(dir.path()).expect("store");
        let mut rig = AvatarRig::load(backend, RigConfig::default());
        let mut host = HostState::editing();
        run(
            &mut rig,
            &mut host,
            &[
                down(Limb::LeftArm, 0.0, 0.0, 0),
                moved(20.0, 0.0, 10),
                up(20.0, 0.0, 300),
            ],
        );
    }

    let backend = FileStore::with_data_dir(dir.path()).expect("store");
    let rig = AvatarRig::load(backend, RigConfig::default());
    assert!(rig.has_override(Limb::LeftArm));
    assert!(approx(rig.transform(Limb::LeftArm).horizontal_percent(), -30.0));
    assert!(approx(rig.transform(Limb::LeftArm).rotation_degrees(), 1.0));
    assert!(!rig.has_override(Limb::RightArm));
}

#[test]
fn test_corrupt_record_falls_back_to_defaults() {
    let config = RigConfig::default();
    let backend = MemoryStore::with_value(&config.storage_key, "][");
    let mut rig = AvatarRig::load(backend, config);
    assert_eq!(
        rig.transform(Limb::LeftArm),
        LimbTransform::default_for(Limb::LeftArm)
    );

    // The next commit replaces the corrupt record with a valid one.
    let mut host = HostState::editing();
    rig.select(&mut host, Limb::LeftArm);
    rig.apply_preset(&host, Limb::LeftArm, RotationPreset::Zero)
        .expect("preset");
    assert!(rig.store().load_overrides().left_arm.is_some());
}

#[test]
fn test_custom_storage_key() {
    let config = RigConfig {
        storage_key: "other_profile".to_string(),
        ..RigConfig::default()
    };
    let mut rig = AvatarRig::load(MemoryStore::new(), config);
    rig.reset().expect("reset");
    assert!(rig.store().backend().peek("other_profile").is_some());
}

// ============================================================================
// Composition Tests
// ============================================================================

#[test]
fn test_composition_follows_live_drag() {
    let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut host = HostState::editing();
    run(
        &mut rig,
        &mut host,
        &[down(Limb::RightArm, 0.0, 0.0, 0), moved(0.0, 20.0, 10)],
    );

    let composition = rig.compose(&host, &full_equipment(), &full_catalog());
    assert_eq!(
        composition.kinds(),
        vec![
            LayerKind::Legs,
            LayerKind::RightArm,
            LayerKind::LeftArm,
            LayerKind::Body,
            LayerKind::Head,
            LayerKind::Hat
        ]
    );
    let right = composition.layer(LayerKind::RightArm).expect("right arm");
    assert_eq!(right.state, Some(LimbState::Dragging));
    match right.placement {
        Placement::Limb { transform, .. } => assert!(approx(transform.top_percent(), 60.0)),
        Placement::Fixed { .. } => panic!("arm should use a limb placement"),
    }
}

#[test]
fn test_composition_without_body_drops_limbs() {
    let rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
    let mut equipment = full_equipment();
    equipment.unequip(Slot::Body);
    let composition = rig.compose(&HostState::display(), &equipment, &full_catalog());
    assert_eq!(composition.kinds(), vec![LayerKind::Head, LayerKind::Hat]);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_gesture_is_tap_or_drag_never_both(
        dx in -20.0f64..20.0,
        dy in -20.0f64..20.0,
        held in 0u64..400,
    ) {
        let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
        let mut host = HostState::editing();
        let events = run(
            &mut rig,
            &mut host,
            &[
                down(Limb::LeftArm, 100.0, 100.0, 0),
                moved(100.0 + dx, 100.0 + dy, held / 2),
                up(100.0 + dx, 100.0 + dy, held),
            ],
        );
        // Same arithmetic as the rig so the slop boundary agrees exactly.
        let dragged = ((100.0 + dx) - 100.0).abs() > 5.0 || ((100.0 + dy) - 100.0).abs() > 5.0;
        if dragged {
            prop_assert_eq!(events.len(), 1);
            let committed = matches!(events[0], RigEvent::Committed { limb: Limb::LeftArm, .. });
            prop_assert!(committed);
            prop_assert_eq!(host.selection.selected(), None);
        } else if held < 200 {
            prop_assert_eq!(events, vec![RigEvent::Selected { limb: Some(Limb::LeftArm) }]);
            prop_assert_eq!(rig.transform(Limb::LeftArm), LimbTransform::default_for(Limb::LeftArm));
        } else {
            prop_assert!(events.is_empty());
            prop_assert_eq!(host.selection.selected(), None);
            prop_assert!(!rig.has_override(Limb::LeftArm));
        }
        prop_assert_eq!(rig.capture_owner(), None);
    }

    #[test]
    fn prop_live_rotation_stays_in_range(
        points in proptest::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..20),
    ) {
        let mut rig = AvatarRig::load(MemoryStore::new(), RigConfig::default());
        let mut host = HostState::editing();
        rig.handle(&mut host, &down(Limb::RightArm, 0.0, 0.0, 0)).expect("down");
        for (i, (x, y)) in points.into_iter().enumerate() {
            rig.handle(&mut host, &moved(x, y, i as u64)).expect("move");
            let t = rig.transform(Limb::RightArm);
            prop_assert!(t.rotation_degrees() > -180.0 && t.rotation_degrees() <= 180.0);
            prop_assert!((0.0..=100.0).contains(&t.top_percent()));
        }
    }
}
