use crate::events::scene::SceneStartEvent;
use crate::resources::scene::SceneState;
use bevy_ecs::prelude::*;

/// Trigger a [`SceneStartEvent`] when a scene start has been requested.
pub fn check_pending_scene(mut commands: Commands, state: Option<Res<SceneState>>) {
    if state.is_some_and(|s| s.is_pending()) {
        commands.trigger(SceneStartEvent {});
    }
}
