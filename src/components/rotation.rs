use bevy_ecs::prelude::Component;

/// Rotation around the sprite origin, in degrees.
#[derive(Component, Clone, Debug, Copy, Default)]
pub struct Rotation {
    pub degrees: f32,
}
