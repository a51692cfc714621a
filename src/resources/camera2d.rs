//! Shared 2D camera resource.
//!
//! Wraps raylib's [`raylib::prelude::Camera2D`] so that systems can agree on
//! a single world/screen transform. Update this resource to pan/zoom the view.

use bevy_ecs::prelude::Resource;
use raylib::prelude::{Camera2D, Vector2};

/// ECS resource that holds the active 2D camera parameters.
#[derive(Resource, Clone, Copy)]
pub struct Camera2DRes(pub Camera2D);

impl Camera2DRes {
    /// Camera whose view's top-left corner is the world origin, at zoom 1.
    pub fn identity() -> Self {
        Camera2DRes(Camera2D {
            target: Vector2 { x: 0.0, y: 0.0 },
            offset: Vector2 { x: 0.0, y: 0.0 },
            rotation: 0.0,
            zoom: 1.0,
        })
    }

    /// Camera centered on `target` for a viewport of the given size.
    pub fn centered_on(target: Vector2, width: i32, height: i32) -> Self {
        Camera2DRes(Camera2D {
            target,
            offset: Vector2 {
                x: width as f32 * 0.5,
                y: height as f32 * 0.5,
            },
            rotation: 0.0,
            zoom: 1.0,
        })
    }

    /// World coordinate shown at the viewport's top-left corner.
    pub fn scroll(&self) -> Vector2 {
        let cam = &self.0;
        let zoom = if cam.zoom.abs() > f32::EPSILON {
            cam.zoom
        } else {
            1.0
        };
        Vector2 {
            x: cam.target.x - cam.offset.x / zoom,
            y: cam.target.y - cam.offset.y / zoom,
        }
    }
}
