use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;

/// Sprite is identified by a texture key and its size in pixels.
/// The offset selects a sub-rectangle of the texture (top-left of the frame).
/// The origin is the pivot (in pixels) relative to the frame's top-left, used
/// for placement, rotation and scaling when rendering.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub tex_key: String,
    pub width: f32,
    pub height: f32,
    pub offset: Vector2,
    pub origin: Vector2,
}

impl Sprite {
    /// Whole-texture sprite with the pivot at its top-left corner.
    pub fn new(tex_key: impl Into<String>, width: f32, height: f32) -> Self {
        Sprite {
            tex_key: tex_key.into(),
            width,
            height,
            offset: Vector2 { x: 0.0, y: 0.0 },
            origin: Vector2 { x: 0.0, y: 0.0 },
        }
    }

    /// Whole-texture sprite anchored at its center.
    pub fn centered(tex_key: impl Into<String>, width: f32, height: f32) -> Self {
        Sprite::new(tex_key, width, height).with_anchor(0.5, 0.5)
    }

    /// Set the pivot as a fraction of the sprite size (0.5, 0.5 is the center).
    pub fn with_anchor(mut self, ax: f32, ay: f32) -> Self {
        self.origin = Vector2 {
            x: self.width * ax,
            y: self.height * ay,
        };
        self
    }
}
