//! Scene transitions with a snapshot overlay.
//!
//! [`transition_to`] freezes the current frame into a snapshot, starts the
//! target scene, and lays the snapshot over it as an overlay that animates
//! out (by default a fade). Once every overlay tween has finished, the
//! overlay and snapshot are released.
//!
//! # Setup
//!
//! ```ignore
//! install_scene_manager(&mut world);
//! install_transition(&mut world, TransitionSettings::default());
//! world.insert_non_send_resource(FrameCaptureBackend::new(RaylibFrameCapture));
//!
//! // later, from any exclusive context
//! transition_to(&mut world, "play", SceneParams::new([json!(3)]))?;
//! ```
//!
//! At most one snapshot and one overlay exist at a time. Starting a new
//! transition while one is in flight releases the previous pair first.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::persistent::Persistent;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::screenposition::ScreenPosition;
use crate::components::sprite::Sprite;
use crate::components::tint::Tint;
use crate::components::transitionoverlay::TransitionOverlay;
use crate::components::zindex::ZIndex;
use crate::resources::camera2d::Camera2DRes;
use crate::resources::framecapture::{CaptureRequest, with_frame_capture};
use crate::resources::scene::{
    SceneError, SceneHookPoint, SceneParams, SceneRegistry, register_scene_hook, start_scene,
};
use crate::resources::screensize::ScreenSize;
use crate::resources::transition::{
    OverlayPhase, TransitionController, TransitionError, TransitionSettings,
};
use crate::resources::worldtime::WorldTime;
use crate::systems::transition::{
    attach_transition_overlay, observe_overlay_tween_finished, release_animating_overlay,
};

/// Install the transition controller with `settings`, its scene hooks and
/// its tween observer.
///
/// Call once per world, after the scene manager is installed.
pub fn install_transition(world: &mut World, settings: TransitionSettings) {
    world.insert_resource(TransitionController::new(settings));
    register_scene_hook(world, SceneHookPoint::BeforeStart, release_animating_overlay);
    register_scene_hook(world, SceneHookPoint::AfterInit, attach_transition_overlay);
    world.spawn((Observer::new(observe_overlay_tween_finished), Persistent));
}

fn set_paused(world: &mut World, paused: bool) -> bool {
    match world.get_resource_mut::<WorldTime>() {
        Some(mut time) => std::mem::replace(&mut time.paused, paused),
        None => false,
    }
}

/// Transition to scene `key`, forwarding `params` to it.
///
/// An empty `key` fails without side effects. Otherwise any transition
/// still in flight is released first, and an unregistered `key` fails
/// without touching anything else. The simulation pause flag is back to
/// its previous value when this returns, whether it succeeded or not. On
/// failure no snapshot or overlay is left behind.
pub fn transition_to(
    world: &mut World,
    key: &str,
    params: SceneParams,
) -> Result<(), TransitionError> {
    if key.is_empty() {
        return Err(TransitionError::MissingSceneKey);
    }
    release_transition_resources(world);

    world
        .get_resource::<SceneRegistry>()
        .ok_or(SceneError::MissingRegistry)?
        .get(key)?;

    if !world.contains_resource::<TransitionController>() {
        debug!("Installing transition controller with default settings");
        install_transition(world, TransitionSettings::default());
    }

    let was_paused = set_paused(world, true);
    let result = begin_transition(world, key, params);
    set_paused(world, was_paused);

    match &result {
        Ok(()) => info!("Transition to '{}' started", key),
        Err(e) => {
            warn!("Transition to '{}' failed: {}", key, e);
            release_transition_resources(world);
        }
    }
    result
}

fn begin_transition(
    world: &mut World,
    key: &str,
    params: SceneParams,
) -> Result<(), TransitionError> {
    let screen = world
        .get_resource::<ScreenSize>()
        .copied()
        .ok_or_else(|| TransitionError::Capture("viewport size unknown".to_string()))?;
    let camera = world
        .get_resource::<Camera2DRes>()
        .copied()
        .unwrap_or_else(Camera2DRes::identity);

    let snapshot = world
        .resource_mut::<TransitionController>()
        .next_snapshot_key();
    let request = CaptureRequest {
        key: snapshot.clone(),
        width: screen.w.max(1) as u32,
        height: screen.h.max(1) as u32,
        camera: camera.0,
    };
    with_frame_capture(world, |backend, world| backend.capture(world, &request))
        .ok_or(TransitionError::NoCaptureBackend)?
        .map_err(TransitionError::Capture)?;

    // Not on the display list until attached to the new scene.
    let overlay = world
        .spawn((
            TransitionOverlay,
            Persistent,
            Sprite::centered(
                snapshot.clone(),
                request.width as f32,
                request.height as f32,
            ),
            ScreenPosition::viewport_center(screen.w, screen.h),
            Tint::default(),
            Scale::default(),
            Rotation::default(),
        ))
        .id();
    world
        .resource_mut::<TransitionController>()
        .arm(snapshot, overlay, key);

    start_scene(world, key, params)?;
    Ok(())
}

/// Put the attached overlay above every other entity.
///
/// No-op while no overlay is attached to a scene.
pub fn bring_to_top(world: &mut World) {
    let Some(controller) = world.get_resource::<TransitionController>() else {
        return;
    };
    if !matches!(controller.phase(), OverlayPhase::Animating { .. }) {
        return;
    }
    let Some(overlay) = controller.overlay() else {
        return;
    };
    if world.get::<ZIndex>(overlay).is_none() {
        return;
    }

    let top = {
        let mut query = world.query::<(Entity, &ZIndex)>();
        let others: Vec<ZIndex> = query
            .iter(world)
            .filter(|(e, _)| *e != overlay)
            .map(|(_, z)| *z)
            .collect();
        ZIndex::above(others.iter())
    };
    debug!("Overlay brought to z={}", top.0);
    world.entity_mut(overlay).insert(top);
}

/// Despawn the overlay and release the snapshot, whichever exist.
///
/// Safe to call at any time; missing or already-gone resources are skipped.
pub fn release_transition_resources(world: &mut World) {
    let Some((snapshot, overlay)) = world
        .get_resource_mut::<TransitionController>()
        .map(|mut controller| controller.take_resources())
    else {
        return;
    };

    if let Some(entity) = overlay {
        if world.get_entity(entity).is_ok() {
            world.despawn(entity);
            debug!("Despawned transition overlay {:?}", entity);
        }
    }
    if let Some(key) = snapshot {
        if with_frame_capture(world, |backend, world| backend.release(world, &key)).is_none() {
            warn!("No capture backend to release snapshot '{}'", key);
        }
    }
}
