//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the game world.
//!
//! Submodules overview:
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`persistent`] – marker for entities that persist across scene changes
//! - [`rotation`] – rotation angle in degrees
//! - [`scale`] – 2D scale factor for sprites
//! - [`screenposition`] – screen-space position for viewport-fixed entities
//! - [`sprite`] – 2D sprite rendering component
//! - [`tint`] – color modulation and opacity
//! - [`transitionoverlay`] – marker for the snapshot overlay
//! - [`tween`] – animated interpolation of position, rotation, scale and alpha
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod mapposition;
pub mod persistent;
pub mod rotation;
pub mod scale;
pub mod screenposition;
pub mod sprite;
pub mod tint;
pub mod transitionoverlay;
pub mod tween;
pub mod zindex;
