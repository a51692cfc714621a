//! Transition integration tests on a headless world.
//!
//! The GPU capture backend is replaced by a recording one, so these tests
//! exercise the full flow: snapshot, overlay, scene start, attach, tweens and
//! release.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::prelude::*;
use raylib::prelude::Vector2;
use serde_json::json;

use statetransition::components::mapposition::MapPosition;
use statetransition::components::persistent::Persistent;
use statetransition::components::screenposition::ScreenPosition;
use statetransition::components::sprite::Sprite;
use statetransition::components::transitionoverlay::TransitionOverlay;
use statetransition::components::tween::{Easing, TweenAlpha, TweenChannel};
use statetransition::components::zindex::ZIndex;
use statetransition::events::scene::install_scene_manager;
use statetransition::events::tween::TweenFinishedEvent;
use statetransition::resources::camera2d::Camera2DRes;
use statetransition::resources::framecapture::{CaptureRequest, FrameCapture, FrameCaptureBackend};
use statetransition::resources::scene::{
    SceneError, SceneParams, SceneState, register_scene, start_scene,
};
use statetransition::resources::screensize::ScreenSize;
use statetransition::resources::transition::{
    OverlayPhase, TransitionController, TransitionError, TransitionSettings,
};
use statetransition::resources::worldtime::WorldTime;
use statetransition::systems::scene::check_pending_scene;
use statetransition::systems::tween::{
    tween_alpha_system, tween_mapposition_system, tween_rotation_system, tween_scale_system,
    tween_screenposition_system,
};
use statetransition::transition::{
    bring_to_top, install_transition, release_transition_resources, transition_to,
};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ==================== HARNESS ====================

#[derive(Default)]
struct CaptureLog {
    requests: Vec<CaptureRequest>,
    releases: Vec<String>,
    live: Vec<String>,
    fail: bool,
}

struct RecordingCapture(Rc<RefCell<CaptureLog>>);

impl FrameCapture for RecordingCapture {
    fn capture(&mut self, _world: &mut World, request: &CaptureRequest) -> Result<(), String> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err("device lost".to_string());
        }
        log.requests.push(request.clone());
        log.live.push(request.key.clone());
        Ok(())
    }

    fn release(&mut self, _world: &mut World, key: &str) {
        let mut log = self.0.borrow_mut();
        log.releases.push(key.to_string());
        log.live.retain(|k| k != key);
    }
}

#[derive(Resource, Default)]
struct Received(Vec<(String, SceneParams)>);

fn enter_title(mut commands: Commands, params: Res<SceneParams>, mut rx: ResMut<Received>) {
    rx.0.push(("title".to_string(), params.clone()));
    commands.spawn((MapPosition::new(0.0, 0.0), ZIndex(5)));
}

fn enter_play(mut commands: Commands, params: Res<SceneParams>, mut rx: ResMut<Received>) {
    rx.0.push(("play".to_string(), params.clone()));
    commands.spawn((MapPosition::new(0.0, 0.0), ZIndex(3)));
    commands.spawn((MapPosition::new(10.0, 0.0), ZIndex(7)));
}

fn make_world(settings: TransitionSettings) -> (World, Rc<RefCell<CaptureLog>>) {
    let mut world = World::new();
    world.insert_resource(WorldTime {
        delta: 0.1,
        ..Default::default()
    });
    world.insert_resource(ScreenSize { w: 800, h: 600 });
    world.init_resource::<Received>();
    install_scene_manager(&mut world);
    install_transition(&mut world, settings);
    let log = Rc::new(RefCell::new(CaptureLog::default()));
    world.insert_non_send_resource(FrameCaptureBackend::new(RecordingCapture(log.clone())));
    register_scene(&mut world, "title", enter_title);
    register_scene(&mut world, "play", enter_play);
    (world, log)
}

/// World already showing `title`.
fn world_on_title(settings: TransitionSettings) -> (World, Rc<RefCell<CaptureLog>>) {
    let (mut world, log) = make_world(settings);
    start_scene(&mut world, "title", SceneParams::default()).unwrap();
    frame(&mut world);
    world.resource_mut::<Received>().0.clear();
    (world, log)
}

fn frame(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            check_pending_scene,
            tween_mapposition_system,
            tween_screenposition_system,
            tween_rotation_system,
            tween_scale_system,
            tween_alpha_system,
        )
            .chain(),
    );
    schedule.run(world);
    world.flush();
}

fn overlays(world: &mut World) -> Vec<Entity> {
    world
        .query_filtered::<Entity, With<TransitionOverlay>>()
        .iter(world)
        .collect()
}

fn phase(world: &World) -> OverlayPhase {
    world.resource::<TransitionController>().phase().clone()
}

fn settings_with(json: &str) -> TransitionSettings {
    let mut controller = TransitionController::default();
    controller.update_settings_json(json).unwrap();
    controller.settings()
}

// ==================== ARGUMENT AND FAILURE HANDLING ====================

#[test]
fn missing_key_fails_without_side_effects() {
    let (mut world, log) = world_on_title(TransitionSettings::default());

    let err = transition_to(&mut world, "", SceneParams::default()).unwrap_err();

    assert!(matches!(err, TransitionError::MissingSceneKey));
    assert!(log.borrow().requests.is_empty());
    assert!(overlays(&mut world).is_empty());
    assert!(!world.resource::<WorldTime>().paused);
    assert!(!world.resource::<SceneState>().is_pending());
}

#[test]
fn unknown_scene_propagates_registry_error() {
    let (mut world, log) = world_on_title(TransitionSettings::default());

    let err = transition_to(&mut world, "nowhere", SceneParams::default()).unwrap_err();

    assert!(matches!(
        err,
        TransitionError::Scene(SceneError::NotRegistered(ref key)) if key == "nowhere"
    ));
    assert!(log.borrow().requests.is_empty());
    assert!(overlays(&mut world).is_empty());
    assert!(!world.resource::<WorldTime>().paused);
}

#[test]
fn missing_backend_is_reported() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    world.remove_non_send_resource::<FrameCaptureBackend>();

    let err = transition_to(&mut world, "play", SceneParams::default()).unwrap_err();

    assert!(matches!(err, TransitionError::NoCaptureBackend));
    assert!(overlays(&mut world).is_empty());
    assert!(!world.resource::<SceneState>().is_pending());
}

#[test]
fn capture_failure_restores_pause_and_leaves_nothing_behind() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    log.borrow_mut().fail = true;

    let err = transition_to(&mut world, "play", SceneParams::default()).unwrap_err();

    assert!(matches!(err, TransitionError::Capture(_)));
    assert!(!world.resource::<WorldTime>().paused);
    assert!(overlays(&mut world).is_empty());
    assert!(!world.resource::<TransitionController>().is_active());
    assert_eq!(phase(&world), OverlayPhase::Idle);
}

#[test]
fn pause_flag_is_restored_to_its_previous_value() {
    for was_paused in [false, true] {
        let (mut world, _log) = world_on_title(TransitionSettings::default());
        world.resource_mut::<WorldTime>().paused = was_paused;

        transition_to(&mut world, "play", SceneParams::default()).unwrap();

        assert_eq!(world.resource::<WorldTime>().paused, was_paused);
    }
}

// ==================== SNAPSHOT AND OVERLAY ====================

#[test]
fn snapshot_is_viewport_sized_and_follows_camera() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    world.insert_resource(Camera2DRes::centered_on(
        Vector2 { x: 1000.0, y: 500.0 },
        800,
        600,
    ));

    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    let log = log.borrow();
    assert_eq!(log.requests.len(), 1);
    let request = &log.requests[0];
    assert_eq!((request.width, request.height), (800, 600));
    let scroll = request.scroll();
    assert!(approx_eq(scroll.x, 600.0));
    assert!(approx_eq(scroll.y, 200.0));
}

#[test]
fn overlay_waits_off_the_display_list_until_the_scene_starts() {
    let (mut world, log) = world_on_title(TransitionSettings::default());

    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    let overlay = overlays(&mut world);
    assert_eq!(overlay.len(), 1);
    let overlay = overlay[0];
    assert!(world.get::<Persistent>(overlay).is_some());
    assert!(world.get::<ZIndex>(overlay).is_none());
    let pos = world.get::<ScreenPosition>(overlay).unwrap();
    assert!(approx_eq(pos.pos.x, 400.0) && approx_eq(pos.pos.y, 300.0));
    let sprite = world.get::<Sprite>(overlay).unwrap();
    assert_eq!(sprite.tex_key, log.borrow().requests[0].key);
    assert_eq!(
        world.resource::<TransitionController>().snapshot(),
        Some(sprite.tex_key.as_str())
    );
    assert!(approx_eq(sprite.origin.x, 400.0) && approx_eq(sprite.origin.y, 300.0));
    assert_eq!(
        phase(&world),
        OverlayPhase::Armed {
            scene: "play".to_string()
        }
    );
    assert!(world.resource::<SceneState>().is_pending());
}

#[test]
fn overlay_is_attached_above_the_new_scene() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    frame(&mut world);

    assert_eq!(world.resource::<SceneState>().current(), Some("play"));
    let overlay = overlays(&mut world)[0];
    assert!(world.get::<Persistent>(overlay).is_none());
    assert_eq!(world.get::<ZIndex>(overlay), Some(&ZIndex(8)));
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 1 });
    // Title's entity went with the old scene.
    let zs: Vec<i32> = world
        .query_filtered::<&ZIndex, Without<TransitionOverlay>>()
        .iter(&world)
        .map(|z| z.0)
        .collect();
    assert_eq!(zs.len(), 2);
    assert!(!zs.contains(&5));
}

#[test]
fn overlay_tweens_use_current_settings() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    world
        .resource_mut::<TransitionController>()
        .update_settings_json(r#"{"duration": 0.5, "easing": "linear", "bogus": true}"#)
        .unwrap();
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    frame(&mut world);

    let overlay = overlays(&mut world)[0];
    let tween = world.get::<TweenAlpha>(overlay).unwrap();
    assert!(approx_eq(tween.clock.duration, 0.5));
    assert_eq!(tween.clock.easing, Easing::Linear);
    assert!(approx_eq(tween.from, 1.0));
    assert!(approx_eq(tween.to, 0.0));
}

#[test]
fn payload_reaches_the_target_scene() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    let params = SceneParams::new([json!(3), json!("hard")]);

    transition_to(&mut world, "play", params.clone()).unwrap();
    frame(&mut world);

    assert_eq!(
        world.resource::<Received>().0,
        vec![("play".to_string(), params)]
    );
}

// ==================== COMPLETION AND RELEASE ====================

#[test]
fn overlay_and_snapshot_are_released_after_the_animation() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    frame(&mut world);
    assert_eq!(overlays(&mut world).len(), 1);

    for _ in 0..5 {
        frame(&mut world);
    }

    assert!(overlays(&mut world).is_empty());
    assert!(log.borrow().live.is_empty());
    assert_eq!(phase(&world), OverlayPhase::Idle);
    assert!(!world.resource::<TransitionController>().is_active());
}

#[test]
fn paused_world_holds_the_overlay() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    world.resource_mut::<WorldTime>().paused = true;

    for _ in 0..10 {
        frame(&mut world);
    }

    assert_eq!(overlays(&mut world).len(), 1);
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 1 });
}

#[test]
fn barrier_waits_for_every_overlay_tween() {
    let settings = settings_with(r#"{"properties": {"alpha": 0, "rotation": 90, "position": {"y": 0}}}"#);
    let (mut world, _log) = world_on_title(settings);
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    world.resource_mut::<WorldTime>().paused = true;
    frame(&mut world);
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 3 });

    let overlay = overlays(&mut world)[0];
    world.trigger(TweenFinishedEvent {
        entity: overlay,
        channel: TweenChannel::Alpha,
    });
    world.flush();
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 2 });
    assert!(world.get_entity(overlay).is_ok());

    // Events for other entities do not count.
    let other = world.spawn_empty().id();
    world.trigger(TweenFinishedEvent {
        entity: other,
        channel: TweenChannel::Alpha,
    });
    world.flush();
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 2 });

    world.resource_mut::<WorldTime>().paused = false;
    for _ in 0..5 {
        frame(&mut world);
    }
    assert!(overlays(&mut world).is_empty());
}

#[test]
fn empty_properties_release_immediately() {
    let settings = settings_with(r#"{"properties": {}}"#);
    let (mut world, log) = world_on_title(settings);
    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    frame(&mut world);

    assert!(overlays(&mut world).is_empty());
    assert!(log.borrow().live.is_empty());
    assert_eq!(phase(&world), OverlayPhase::Idle);
}

#[test]
fn unknown_properties_only_are_treated_as_empty() {
    let settings = settings_with(r#"{"properties": {"blur": 4}}"#);
    let (mut world, _log) = world_on_title(settings);
    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    frame(&mut world);

    assert!(overlays(&mut world).is_empty());
}

// ==================== CANCEL BY REPLACEMENT ====================

#[test]
fn new_transition_replaces_the_one_in_flight() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    frame(&mut world);
    let first = overlays(&mut world)[0];
    let first_key = log.borrow().requests[0].key.clone();

    transition_to(&mut world, "title", SceneParams::default()).unwrap();

    let now = overlays(&mut world);
    assert_eq!(now.len(), 1);
    assert_ne!(now[0], first);
    assert!(world.get_entity(first).is_err());
    let log_ref = log.borrow();
    assert_eq!(log_ref.releases, vec![first_key]);
    assert_eq!(log_ref.live.len(), 1);
}

#[test]
fn back_to_back_transitions_keep_one_pair() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    transition_to(&mut world, "title", SceneParams::default()).unwrap();

    assert_eq!(overlays(&mut world).len(), 1);
    assert_eq!(log.borrow().live.len(), 1);

    frame(&mut world);

    assert_eq!(world.resource::<SceneState>().current(), Some("title"));
    assert_eq!(overlays(&mut world).len(), 1);
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 1 });
}

#[test]
fn leaving_the_scene_mid_animation_releases_the_overlay() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    frame(&mut world);

    start_scene(&mut world, "title", SceneParams::default()).unwrap();
    frame(&mut world);

    assert!(overlays(&mut world).is_empty());
    assert!(log.borrow().live.is_empty());
    assert_eq!(phase(&world), OverlayPhase::Idle);
}

#[test]
fn overlay_armed_for_another_scene_is_dropped() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    // A plain start overrides the pending one before it is applied.
    start_scene(&mut world, "title", SceneParams::default()).unwrap();

    frame(&mut world);

    assert_eq!(world.resource::<SceneState>().current(), Some("title"));
    assert!(overlays(&mut world).is_empty());
    assert!(log.borrow().live.is_empty());
}

#[test]
fn release_is_safe_when_nothing_is_held() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    release_transition_resources(&mut world);
    release_transition_resources(&mut world);
    assert!(log.borrow().releases.is_empty());
    assert_eq!(phase(&world), OverlayPhase::Idle);
}

#[test]
fn release_tolerates_an_already_despawned_overlay() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    let overlay = overlays(&mut world)[0];
    world.despawn(overlay);

    release_transition_resources(&mut world);

    assert!(log.borrow().live.is_empty());
    assert!(!world.resource::<TransitionController>().is_active());
}

// ==================== BRING TO TOP ====================

#[test]
fn bring_to_top_is_a_noop_without_an_attached_overlay() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    bring_to_top(&mut world);

    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    bring_to_top(&mut world);

    let overlay = overlays(&mut world)[0];
    assert!(world.get::<ZIndex>(overlay).is_none());
}

#[test]
fn bring_to_top_lifts_the_overlay_above_late_entities() {
    let (mut world, _log) = world_on_title(TransitionSettings::default());
    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    frame(&mut world);
    world.spawn((MapPosition::new(0.0, 0.0), ZIndex(50)));

    bring_to_top(&mut world);

    let overlay = overlays(&mut world)[0];
    assert_eq!(world.get::<ZIndex>(overlay), Some(&ZIndex(51)));
}

/// World with a scene manager but no transition controller.
fn world_without_controller() -> (World, Rc<RefCell<CaptureLog>>) {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(ScreenSize { w: 320, h: 240 });
    world.init_resource::<Received>();
    install_scene_manager(&mut world);
    let log = Rc::new(RefCell::new(CaptureLog::default()));
    world.insert_non_send_resource(FrameCaptureBackend::new(RecordingCapture(log.clone())));
    register_scene(&mut world, "play", enter_play);
    (world, log)
}

#[test]
fn transition_installs_the_controller_on_first_use() {
    let (mut world, log) = world_without_controller();

    transition_to(&mut world, "play", SceneParams::default()).unwrap();

    assert_eq!(
        world.resource::<TransitionController>().settings(),
        TransitionSettings::default()
    );
    assert_eq!(log.borrow().requests.len(), 1);
}

#[test]
fn unknown_scene_does_not_install_the_controller() {
    let (mut world, log) = world_without_controller();

    let err = transition_to(&mut world, "nowhere", SceneParams::default()).unwrap_err();

    assert!(matches!(err, TransitionError::Scene(SceneError::NotRegistered(_))));
    assert!(!world.contains_resource::<TransitionController>());
    assert!(log.borrow().requests.is_empty());
    assert!(!world.resource::<WorldTime>().paused);
}

// ==================== REPEATED TRANSITIONS ====================

#[test]
fn revisiting_a_scene_attaches_a_single_overlay() {
    let (mut world, log) = world_on_title(TransitionSettings::default());
    for target in ["play", "title"] {
        transition_to(&mut world, target, SceneParams::default()).unwrap();
        for _ in 0..6 {
            frame(&mut world);
        }
        assert_eq!(world.resource::<SceneState>().current(), Some(target));
        assert!(overlays(&mut world).is_empty());
    }

    transition_to(&mut world, "play", SceneParams::default()).unwrap();
    frame(&mut world);

    assert_eq!(world.resource::<SceneState>().current(), Some("play"));
    assert_eq!(overlays(&mut world).len(), 1);
    assert_eq!(phase(&world), OverlayPhase::Animating { pending: 1 });
    let log = log.borrow();
    assert_eq!(log.requests.len(), 3);
    assert_eq!(log.live, vec![log.requests[2].key.clone()]);
    assert_eq!(
        world.resource::<TransitionController>().snapshot(),
        Some(log.requests[2].key.as_str())
    );
}
