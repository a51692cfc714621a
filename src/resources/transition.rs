//! Transition settings and controller state.
//!
//! [`TransitionSettings`] describe how the overlay animates out: duration,
//! easing and a map of overlay property targets. [`TransitionController`] is
//! the resource that owns those settings plus the in-flight snapshot and
//! overlay. The operations that drive it live in [`crate::transition`].

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::tween::Easing;
use crate::resources::scene::SceneError;

/// Default duration of the overlay animation, in seconds.
pub const DEFAULT_DURATION: f32 = 0.3;
/// Default easing of the overlay animation.
pub const DEFAULT_EASING: Easing = Easing::ExpoInOut;

/// Failures of [`transition_to`](crate::transition::transition_to) and the
/// settings parsers.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("no scene key passed")]
    MissingSceneKey,
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("no frame capture backend installed")]
    NoCaptureBackend,
    #[error("frame capture failed: {0}")]
    Capture(String),
    #[error("invalid transition options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Target value of one overlay property.
///
/// `Scalar` drives a single property (`alpha`, `rotation`, `x`, ...).
/// `Group` drives the sub-components of a structured property, e.g.
/// `position: {x, y}` or `scale: {x, y}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyTarget {
    Scalar(f32),
    Group(BTreeMap<String, f32>),
}

/// Property name to target value, iterated in name order.
pub type PropertyMap = BTreeMap<String, PropertyTarget>;

/// How the overlay animates out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSettings {
    /// Animation duration in seconds.
    pub duration: f32,
    pub easing: Easing,
    pub properties: PropertyMap,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        let mut properties = PropertyMap::new();
        properties.insert("alpha".to_string(), PropertyTarget::Scalar(0.0));
        TransitionSettings {
            duration: DEFAULT_DURATION,
            easing: DEFAULT_EASING,
            properties,
        }
    }
}

impl TransitionSettings {
    /// Overwrite every field present in `options`, keep the others.
    pub fn merge(&mut self, options: TransitionOptions) {
        if let Some(duration) = options.duration {
            self.duration = duration.max(0.0);
        }
        if let Some(easing) = options.easing {
            self.easing = easing;
        }
        if let Some(properties) = options.properties {
            self.properties = properties;
        }
    }
}

/// Partial settings. Fields left `None` keep their current value.
///
/// Deserializing ignores unknown keys, so loosely-typed input such as
/// `{"duration": 0.5, "unknownKey": 1}` only touches `duration`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransitionOptions {
    pub duration: Option<f32>,
    pub easing: Option<Easing>,
    pub properties: Option<PropertyMap>,
}

impl TransitionOptions {
    pub fn from_json(json: &str) -> Result<Self, TransitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Where the overlay is in its life.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// No transition in flight.
    #[default]
    Idle,
    /// Overlay built, waiting for `scene` to finish its init.
    Armed { scene: String },
    /// Overlay attached; `pending` tweens have not finished yet.
    Animating { pending: usize },
}

/// Owner of the transition settings, snapshot and overlay.
#[derive(Resource, Debug, Default)]
pub struct TransitionController {
    settings: TransitionSettings,
    snapshot: Option<String>,
    overlay: Option<Entity>,
    phase: OverlayPhase,
    captures: u64,
}

impl TransitionController {
    pub fn new(settings: TransitionSettings) -> Self {
        TransitionController {
            settings,
            ..Default::default()
        }
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> TransitionSettings {
        self.settings.clone()
    }

    pub fn update_settings(&mut self, options: TransitionOptions) {
        self.settings.merge(options);
        debug!("Transition settings now {:?}", self.settings);
    }

    /// Merge loosely-typed JSON options; unknown keys are ignored.
    pub fn update_settings_json(&mut self, json: &str) -> Result<(), TransitionError> {
        let options = TransitionOptions::from_json(json)?;
        self.update_settings(options);
        Ok(())
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    pub fn overlay(&self) -> Option<Entity> {
        self.overlay
    }

    pub fn phase(&self) -> &OverlayPhase {
        &self.phase
    }

    /// Whether a snapshot or overlay is alive.
    pub fn is_active(&self) -> bool {
        self.snapshot.is_some() || self.overlay.is_some()
    }

    pub(crate) fn next_snapshot_key(&mut self) -> String {
        self.captures += 1;
        format!("transition_snapshot_{}", self.captures)
    }

    pub(crate) fn arm(&mut self, snapshot: String, overlay: Entity, scene: impl Into<String>) {
        self.snapshot = Some(snapshot);
        self.overlay = Some(overlay);
        self.phase = OverlayPhase::Armed {
            scene: scene.into(),
        };
    }

    pub(crate) fn start_animating(&mut self, pending: usize) {
        self.phase = OverlayPhase::Animating { pending };
    }

    /// Count one finished tween. Returns true when none are left.
    pub(crate) fn tween_finished(&mut self) -> bool {
        match &mut self.phase {
            OverlayPhase::Animating { pending } => {
                *pending = pending.saturating_sub(1);
                *pending == 0
            }
            _ => false,
        }
    }

    /// Forget the snapshot and overlay, returning what was held.
    pub(crate) fn take_resources(&mut self) -> (Option<String>, Option<Entity>) {
        self.phase = OverlayPhase::Idle;
        (self.snapshot.take(), self.overlay.take())
    }
}
