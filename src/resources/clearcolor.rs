//! Background color resource.
//!
//! Read by the render system and by the snapshot capture so that a snapshot
//! shows the same background as the frame it was taken from. Scenes set it
//! in their init systems.

use bevy_ecs::prelude::Resource;
use raylib::prelude::Color;

#[derive(Resource, Clone, Copy, Debug)]
pub struct ClearColor(pub Color);

impl Default for ClearColor {
    fn default() -> Self {
        ClearColor(Color::BLACK)
    }
}
