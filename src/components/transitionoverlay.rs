//! Marker for the transition overlay entity.
//!
//! There is at most one such entity at a time; the
//! [`TransitionController`](crate::resources::transition::TransitionController)
//! keeps its id.

use bevy_ecs::prelude::Component;

/// Tag for the sprite that displays the pre-transition snapshot.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TransitionOverlay;
