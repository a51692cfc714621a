//! Systems driving the transition overlay through its life.
//!
//! - [`attach_transition_overlay`] runs after a scene's init system. It puts
//!   the armed overlay on top of the new scene and launches its tweens.
//! - [`release_animating_overlay`] runs before a scene starts. An overlay
//!   still animating belongs to the scene being left, so it goes with it.
//! - [`observe_overlay_tween_finished`] counts finished overlay tweens and
//!   releases the overlay and snapshot once all of them are done.
//!
//! They are wired up by [`install_transition`](crate::transition::install_transition).

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use bevy_ecs::system::EntityCommands;
use log::{debug, warn};
use raylib::prelude::Vector2;

use crate::components::persistent::Persistent;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::screenposition::ScreenPosition;
use crate::components::tint::Tint;
use crate::components::transitionoverlay::TransitionOverlay;
use crate::components::tween::{Easing, TweenAlpha, TweenPosition, TweenRotation, TweenScale};
use crate::components::zindex::ZIndex;
use crate::events::tween::TweenFinishedEvent;
use crate::resources::scene::SceneState;
use crate::resources::transition::{OverlayPhase, PropertyMap, PropertyTarget, TransitionController};
use crate::transition::release_transition_resources;

/// Current values of the overlay's animatable properties.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OverlayState {
    pub pos: Vector2,
    pub degrees: f32,
    pub scale: Vector2,
    pub alpha: f32,
}

impl OverlayState {
    pub(crate) fn new(pos: &ScreenPosition, rot: &Rotation, scale: &Scale, tint: &Tint) -> Self {
        OverlayState {
            pos: pos.pos,
            degrees: rot.degrees,
            scale: scale.scale,
            alpha: tint.alpha(),
        }
    }
}

/// Target value per tween channel, folded from a property map.
#[derive(Debug, Clone, Default)]
pub(crate) struct OverlayTweenPlan {
    pub position: Option<Vector2>,
    pub rotation: Option<f32>,
    pub scale: Option<Vector2>,
    pub alpha: Option<f32>,
}

impl OverlayTweenPlan {
    /// Fold `properties` into per-channel targets starting from `from`.
    ///
    /// Axes a property leaves out keep their current value. Unknown names
    /// and mismatched shapes are skipped with a warning.
    pub(crate) fn from_properties(properties: &PropertyMap, from: &OverlayState) -> Self {
        let mut plan = OverlayTweenPlan::default();
        for (name, target) in properties {
            match (name.as_str(), target) {
                ("alpha", PropertyTarget::Scalar(v)) => plan.alpha = Some(*v),
                ("rotation" | "angle", PropertyTarget::Scalar(v)) => plan.rotation = Some(*v),
                ("x", PropertyTarget::Scalar(v)) => {
                    plan.position.get_or_insert(from.pos).x = *v;
                }
                ("y", PropertyTarget::Scalar(v)) => {
                    plan.position.get_or_insert(from.pos).y = *v;
                }
                ("scale", PropertyTarget::Scalar(v)) => {
                    plan.scale = Some(Vector2 { x: *v, y: *v });
                }
                // `cameraOffset` is the camera-fixed position of the overlay.
                ("position" | "cameraOffset", PropertyTarget::Group(group)) => {
                    let pos = plan.position.get_or_insert(from.pos);
                    fold_axes(name, group, pos);
                }
                ("scale", PropertyTarget::Group(group)) => {
                    let scale = plan.scale.get_or_insert(from.scale);
                    fold_axes(name, group, scale);
                }
                _ => warn!("Skipping unsupported overlay property '{}': {:?}", name, target),
            }
        }
        plan
    }

    /// Number of tweens the plan launches.
    pub(crate) fn channels(&self) -> usize {
        [
            self.position.is_some(),
            self.rotation.is_some(),
            self.scale.is_some(),
            self.alpha.is_some(),
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }

    /// Insert one tween per planned channel on `entity`.
    pub(crate) fn insert_tweens(
        &self,
        from: &OverlayState,
        entity: &mut EntityCommands,
        duration: f32,
        easing: Easing,
    ) {
        if let Some(to) = self.position {
            entity.insert(TweenPosition::new(from.pos, to, duration).with_easing(easing));
        }
        if let Some(to) = self.rotation {
            entity.insert(TweenRotation::new(from.degrees, to, duration).with_easing(easing));
        }
        if let Some(to) = self.scale {
            entity.insert(TweenScale::new(from.scale, to, duration).with_easing(easing));
        }
        if let Some(to) = self.alpha {
            entity.insert(TweenAlpha::new(from.alpha, to, duration).with_easing(easing));
        }
    }
}

fn fold_axes(name: &str, group: &std::collections::BTreeMap<String, f32>, out: &mut Vector2) {
    for (axis, v) in group {
        match axis.as_str() {
            "x" => out.x = *v,
            "y" => out.y = *v,
            _ => warn!("Skipping unsupported overlay property '{}.{}'", name, axis),
        }
    }
}

/// After-init hook: attach the armed overlay to the scene that just started.
///
/// The overlay stops being [`Persistent`], goes above every other entity and
/// starts tweening toward the configured targets. If the started scene is not
/// the one the overlay was armed for, the overlay and snapshot are released.
pub fn attach_transition_overlay(
    mut commands: Commands,
    controller: Option<ResMut<TransitionController>>,
    state: Option<Res<SceneState>>,
    overlays: Query<(&ScreenPosition, &Rotation, &Scale, &Tint), With<TransitionOverlay>>,
    zindices: Query<&ZIndex>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    let OverlayPhase::Armed { scene } = controller.phase() else {
        return;
    };
    let current = state.as_ref().and_then(|s| s.current());
    if current != Some(scene.as_str()) {
        debug!(
            "Scene {:?} started instead of '{}'; dropping overlay",
            current, scene
        );
        commands.queue(release_transition_resources);
        return;
    }

    let Some(overlay) = controller.overlay() else {
        commands.queue(release_transition_resources);
        return;
    };
    let Ok((pos, rot, scale, tint)) = overlays.get(overlay) else {
        warn!("Transition overlay {:?} is gone before attach", overlay);
        commands.queue(release_transition_resources);
        return;
    };

    let from = OverlayState::new(pos, rot, scale, tint);
    let settings = controller.settings();
    let plan = OverlayTweenPlan::from_properties(&settings.properties, &from);
    let top = ZIndex::above(zindices.iter());

    let mut entity = commands.entity(overlay);
    entity.remove::<Persistent>().insert(top);
    plan.insert_tweens(&from, &mut entity, settings.duration, settings.easing);

    let pending = plan.channels();
    debug!(
        "Overlay attached at z={} with {} tween(s) over {}s",
        top.0, pending, settings.duration
    );
    controller.start_animating(pending);
    if pending == 0 {
        commands.queue(release_transition_resources);
    }
}

/// Before-start hook: release an overlay still animating over the old scene.
pub fn release_animating_overlay(
    mut commands: Commands,
    controller: Option<Res<TransitionController>>,
) {
    if controller.is_some_and(|c| matches!(c.phase(), OverlayPhase::Animating { .. })) {
        debug!("Scene left during overlay animation; releasing overlay");
        commands.queue(release_transition_resources);
    }
}

/// Count down the overlay's tweens and release it when all have finished.
pub fn observe_overlay_tween_finished(
    trigger: On<TweenFinishedEvent>,
    mut commands: Commands,
    controller: Option<ResMut<TransitionController>>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    let event = trigger.event();
    if controller.overlay() != Some(event.entity) {
        return;
    }
    debug!("Overlay tween {:?} finished", event.channel);
    if controller.tween_finished() {
        commands.queue(release_transition_resources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::transition::TransitionSettings;
    use std::collections::BTreeMap;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn overlay_state() -> OverlayState {
        OverlayState {
            pos: Vector2 { x: 400.0, y: 300.0 },
            degrees: 0.0,
            scale: Vector2 { x: 1.0, y: 1.0 },
            alpha: 1.0,
        }
    }

    fn props(json: &str) -> PropertyMap {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_default_settings_plan_a_fade() {
        let plan = OverlayTweenPlan::from_properties(
            &TransitionSettings::default().properties,
            &overlay_state(),
        );
        assert_eq!(plan.channels(), 1);
        assert_eq!(plan.alpha, Some(0.0));
    }

    #[test]
    fn test_scalar_axes_fold_into_one_position_tween() {
        let plan = OverlayTweenPlan::from_properties(&props(r#"{"x": 0, "y": 50}"#), &overlay_state());
        assert_eq!(plan.channels(), 1);
        let pos = plan.position.unwrap();
        assert!(approx_eq(pos.x, 0.0));
        assert!(approx_eq(pos.y, 50.0));
    }

    #[test]
    fn test_position_group_keeps_missing_axis() {
        let plan =
            OverlayTweenPlan::from_properties(&props(r#"{"position": {"y": -200}}"#), &overlay_state());
        let pos = plan.position.unwrap();
        assert!(approx_eq(pos.x, 400.0));
        assert!(approx_eq(pos.y, -200.0));
    }

    #[test]
    fn test_scale_scalar_is_uniform_and_group_is_per_axis() {
        let uniform = OverlayTweenPlan::from_properties(&props(r#"{"scale": 0}"#), &overlay_state());
        let s = uniform.scale.unwrap();
        assert!(approx_eq(s.x, 0.0) && approx_eq(s.y, 0.0));

        let axis =
            OverlayTweenPlan::from_properties(&props(r#"{"scale": {"x": 2}}"#), &overlay_state());
        let s = axis.scale.unwrap();
        assert!(approx_eq(s.x, 2.0) && approx_eq(s.y, 1.0));
    }

    #[test]
    fn test_camera_offset_is_a_position_group() {
        let plan = OverlayTweenPlan::from_properties(
            &props(r#"{"cameraOffset": {"x": -400}, "y": 0}"#),
            &overlay_state(),
        );
        assert_eq!(plan.channels(), 1);
        let pos = plan.position.unwrap();
        assert!(approx_eq(pos.x, -400.0));
        assert!(approx_eq(pos.y, 0.0));
    }

    #[test]
    fn test_angle_is_rotation() {
        let plan = OverlayTweenPlan::from_properties(&props(r#"{"angle": 90}"#), &overlay_state());
        assert_eq!(plan.rotation, Some(90.0));
    }

    #[test]
    fn test_unknown_properties_are_skipped() {
        let plan = OverlayTweenPlan::from_properties(
            &props(r#"{"blur": 3, "alpha": {"x": 1}, "position": {"z": 4}, "rotation": 45}"#),
            &overlay_state(),
        );
        assert!(plan.alpha.is_none());
        assert_eq!(plan.rotation, Some(45.0));
        // "position" is planned but its unknown axis leaves it unchanged.
        let pos = plan.position.unwrap();
        assert!(approx_eq(pos.x, 400.0) && approx_eq(pos.y, 300.0));
        assert_eq!(plan.channels(), 2);
    }

    #[test]
    fn test_empty_properties_plan_nothing() {
        let plan = OverlayTweenPlan::from_properties(&BTreeMap::new(), &overlay_state());
        assert_eq!(plan.channels(), 0);
    }
}
