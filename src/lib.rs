//! Scene transitions for a raylib + bevy_ecs 2D runtime.
//!
//! This crate exposes a minimal host runtime (scenes, tweens, sprites, a
//! camera and a renderer) plus the [`transition`] module, which switches
//! scenes behind an animated snapshot of the outgoing frame.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
pub mod transition;
