//! Event types and observers used by the engine.
//!
//! Submodules:
//! - [`scene`] – scene start notifications and the lifecycle manager
//! - [`tween`] – completion notifications of one-shot tweens
pub mod scene;
pub mod tween;
