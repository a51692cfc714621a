//! Screen size resource.
//!
//! Stores the viewport dimensions in pixels. Rendering, snapshot capture and
//! the transition overlay read it.

use bevy_ecs::prelude::Resource;

/// Current screen size in pixels.
#[derive(Resource, Clone, Copy, Debug)]
pub struct ScreenSize {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}
