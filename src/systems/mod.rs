//! Engine systems.
//!
//! This module groups all ECS systems that advance simulation and rendering.
//!
//! Submodules overview
//! - [`render`] – draw the world and viewport passes using Raylib
//! - [`scene`] – check for pending scene starts and trigger events
//! - [`time`] – update simulation time and delta
//! - [`transition`] – attach, animate and release the transition overlay
//! - [`tween`] – animate position, rotation, scale and alpha over time

pub mod render;
pub mod scene;
pub mod time;
pub mod transition;
pub mod tween;
