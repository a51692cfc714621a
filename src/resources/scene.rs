//! Scene registry and lifecycle resources.
//!
//! A scene is a named init system registered in the [`SceneRegistry`]. The
//! [`SceneState`] resource tracks the current scene and any pending start
//! requested through [`start_scene`]. [`SceneHooks`] lists the systems the
//! lifecycle manager runs around every scene start. See
//! `crate::events::scene::observe_scene_start_event` for how a pending start
//! is applied.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemId;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

use crate::components::persistent::Persistent;

/// Failures of the scene registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene '{0}' is not registered")]
    NotRegistered(String),
    #[error("no scene registry in the world")]
    MissingRegistry,
}

/// A registered scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneEntry {
    /// System run once each time the scene starts.
    pub init: SystemId,
}

/// Map of scene names to their entries.
#[derive(Resource, Default)]
pub struct SceneRegistry {
    scenes: FxHashMap<String, SceneEntry>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        SceneRegistry::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, init: SystemId) {
        self.scenes.insert(name.into(), SceneEntry { init });
    }

    pub fn get(&self, name: impl AsRef<str>) -> Result<&SceneEntry, SceneError> {
        let name = name.as_ref();
        self.scenes
            .get(name)
            .ok_or_else(|| SceneError::NotRegistered(name.to_string()))
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.scenes.contains_key(name.as_ref())
    }
}

/// Payload forwarded to a scene by the code that started it.
///
/// Inserted as a resource right before the scene's init system runs, so the
/// scene can read it without the init system taking any input.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SceneParams {
    pub args: Vec<Value>,
}

impl SceneParams {
    pub fn new(args: impl IntoIterator<Item = Value>) -> Self {
        SceneParams {
            args: args.into_iter().collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// Representation of a requested scene start.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NextScene {
    #[default]
    Unchanged,
    Pending { key: String, params: SceneParams },
}

/// Current scene and pending start request.
#[derive(Resource, Debug, Default)]
pub struct SceneState {
    current: Option<String>,
    next: NextScene,
}

impl SceneState {
    pub fn new() -> Self {
        SceneState::default()
    }

    /// Name of the running scene, if any has started yet.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.next, NextScene::Pending { .. })
    }

    /// Mark a start as pending. A later request replaces an earlier one.
    pub fn request(&mut self, key: impl Into<String>, params: SceneParams) {
        self.next = NextScene::Pending {
            key: key.into(),
            params,
        };
    }

    /// Take the pending request, leaving [`NextScene::Unchanged`].
    pub fn take_pending(&mut self) -> Option<(String, SceneParams)> {
        match std::mem::take(&mut self.next) {
            NextScene::Pending { key, params } => Some((key, params)),
            NextScene::Unchanged => None,
        }
    }

    pub(crate) fn set_current(&mut self, key: impl Into<String>) {
        self.current = Some(key.into());
    }
}

/// Where a hook runs in the scene start sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneHookPoint {
    /// Before the outgoing scene's entities are despawned.
    BeforeStart,
    /// After the incoming scene's init system has run.
    AfterInit,
}

/// Systems run by the lifecycle manager around every scene start.
#[derive(Resource, Default, Debug)]
pub struct SceneHooks {
    pub before_start: Vec<SystemId>,
    pub after_init: Vec<SystemId>,
}

impl SceneHooks {
    pub fn add(&mut self, point: SceneHookPoint, id: SystemId) {
        match point {
            SceneHookPoint::BeforeStart => self.before_start.push(id),
            SceneHookPoint::AfterInit => self.after_init.push(id),
        }
    }
}

/// Register `system` as the init routine of scene `name`.
///
/// Registered systems are entities in bevy_ecs; the entity is marked
/// [`Persistent`] so scene teardown does not despawn it.
pub fn register_scene<M>(
    world: &mut World,
    name: impl Into<String>,
    system: impl IntoSystem<(), (), M> + 'static,
) -> SystemId {
    let name = name.into();
    let id = world.register_system(system);
    world.entity_mut(id.entity()).insert(Persistent);
    let mut registry = world.get_resource_or_insert_with(SceneRegistry::new);
    if registry.contains(&name) {
        warn!("Scene '{}' registered again; replacing its init system", name);
    } else {
        debug!("Registered scene '{}'", name);
    }
    registry.insert(name, id);
    id
}

/// Register `system` to run at `point` of every scene start.
pub fn register_scene_hook<M>(
    world: &mut World,
    point: SceneHookPoint,
    system: impl IntoSystem<(), (), M> + 'static,
) -> SystemId {
    let id = world.register_system(system);
    world.entity_mut(id.entity()).insert(Persistent);
    world
        .get_resource_or_insert_with(SceneHooks::default)
        .add(point, id);
    id
}

/// Request a start of scene `key`, forwarding `params` to it.
///
/// The start is applied on the next run of
/// [`check_pending_scene`](crate::systems::scene::check_pending_scene).
pub fn start_scene(
    world: &mut World,
    key: impl AsRef<str>,
    params: SceneParams,
) -> Result<(), SceneError> {
    let key = key.as_ref();
    world
        .get_resource::<SceneRegistry>()
        .ok_or(SceneError::MissingRegistry)?
        .get(key)?;
    debug!("Scene '{}' requested with {} arg(s)", key, params.args.len());
    world
        .get_resource_or_insert_with(SceneState::new)
        .request(key, params);
    Ok(())
}
