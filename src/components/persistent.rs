//! Persistent entity marker component.
//!
//! Entities with the [`Persistent`] component are not despawned when a new
//! scene starts. Registered scene systems, hooks and observers carry it, and
//! so does a transition overlay while it waits for its target scene.

use bevy_ecs::prelude::Component;

/// Tag component used to mark entities that survive scene teardown.
#[derive(Component, Clone, Debug)]
pub struct Persistent;
