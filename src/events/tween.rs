//! Tween completion events.
//!
//! When a tween in [`LoopMode::Once`](crate::components::tween::LoopMode::Once)
//! reaches its end, a [`TweenFinishedEvent`] is triggered. Looping tweens
//! never finish and never emit it.
//!
//! # Related
//!
//! - [`crate::systems::tween`] – the systems that emit these events
//! - [`crate::systems::transition::observe_overlay_tween_finished`] – counts
//!   them down for the transition overlay

use bevy_ecs::prelude::*;

use crate::components::tween::TweenChannel;

/// Event emitted when a one-shot tween completes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenFinishedEvent {
    /// The entity carrying the tween.
    pub entity: Entity,
    /// Which property the finished tween was driving.
    pub channel: TweenChannel,
}
