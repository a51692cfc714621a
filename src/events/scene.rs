//! Scene start event and the lifecycle manager behind it.
//!
//! Code asks for a new scene through
//! [`start_scene`](crate::resources::scene::start_scene), which only records
//! the request in [`SceneState`]. Each frame
//! [`check_pending_scene`](crate::systems::scene::check_pending_scene) emits a
//! [`SceneStartEvent`] when a request is pending; the observer in this module
//! takes the request and queues [`enter_scene`], which performs the actual
//! switch with exclusive world access.
//!
//! Start sequence, in order:
//! 1. [`SceneHookPoint::BeforeStart`](crate::resources::scene::SceneHookPoint) hooks
//! 2. despawn every entity without [`Persistent`]
//! 3. record the new current scene and insert its [`SceneParams`]
//! 4. run the scene's init system
//! 5. [`SceneHookPoint::AfterInit`](crate::resources::scene::SceneHookPoint) hooks

use crate::components::persistent::Persistent;
use crate::resources::scene::{SceneHooks, SceneParams, SceneRegistry, SceneState};
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemId;
use log::{debug, info, warn};

/// Event used to indicate that a pending scene start should be applied.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneStartEvent {}

/// Observer that takes the pending scene request and queues its start.
pub fn observe_scene_start_event(
    _trigger: On<SceneStartEvent>,
    mut commands: Commands,
    state: Option<ResMut<SceneState>>,
) {
    let Some(mut state) = state else {
        warn!("SceneStartEvent triggered without a SceneState resource");
        return;
    };
    let Some((key, params)) = state.take_pending() else {
        debug!("No scene start pending.");
        return;
    };
    info!(
        "Transitioning from {:?} to '{}'",
        state.current().unwrap_or("<none>"),
        key
    );
    commands.queue(move |world: &mut World| enter_scene(world, &key, params));
}

/// Install the scene lifecycle manager: its resources and observer.
///
/// Idempotent for the resources; call it once per world.
pub fn install_scene_manager(world: &mut World) {
    world.get_resource_or_insert_with(SceneRegistry::new);
    world.get_resource_or_insert_with(SceneState::new);
    world.get_resource_or_insert_with(SceneHooks::default);
    world.spawn((Observer::new(observe_scene_start_event), Persistent));
}

fn run_hooks(world: &mut World, hooks: Vec<SystemId>, point: &str) {
    for id in hooks {
        if let Err(e) = world.run_system(id) {
            warn!("Scene {} hook failed: {}", point, e);
        }
    }
}

/// Switch to scene `key` right away, forwarding `params`.
///
/// Normally reached through [`observe_scene_start_event`]. Unknown keys are
/// logged and leave the world untouched.
pub fn enter_scene(world: &mut World, key: &str, params: SceneParams) {
    let init = match world
        .get_resource::<SceneRegistry>()
        .map(|registry| registry.get(key).map(|entry| entry.init))
    {
        Some(Ok(init)) => init,
        Some(Err(e)) => {
            warn!("Cannot start scene: {}", e);
            return;
        }
        None => {
            warn!("Cannot start scene '{}': no SceneRegistry", key);
            return;
        }
    };

    let (before, after) = world
        .get_resource::<SceneHooks>()
        .map(|h| (h.before_start.clone(), h.after_init.clone()))
        .unwrap_or_default();

    run_hooks(world, before, "before-start");

    let doomed: Vec<Entity> = world
        .query_filtered::<Entity, Without<Persistent>>()
        .iter(world)
        .collect();
    debug!("Despawning {} scene entities", doomed.len());
    for entity in doomed {
        world.despawn(entity);
    }

    world
        .get_resource_or_insert_with(SceneState::new)
        .set_current(key);
    world.insert_resource(params);

    if let Err(e) = world.run_system(init) {
        warn!("Init system of scene '{}' failed: {}", key, e);
    }

    run_hooks(world, after, "after-init");
    debug!("Scene '{}' started", key);
}
