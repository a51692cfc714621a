//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `camera2d` – shared 2D camera used for world/screen transforms
//! - `clearcolor` – background color of frames and snapshots
//! - `framecapture` – offscreen render-to-texture backend
//! - `gameconfig` – settings loaded from the INI config file
//! - `scene` – scene registry, lifecycle state, hooks and payloads
//! - `screensize` – viewport dimensions in pixels
//! - `texturestore` – loaded textures keyed by string IDs
//! - `transition` – transition settings and controller state
//! - `worldtime` – simulation time, delta and pause flag
pub mod camera2d;
pub mod clearcolor;
pub mod framecapture;
pub mod gameconfig;
pub mod scene;
pub mod screensize;
pub mod texturestore;
pub mod transition;
pub mod worldtime;
