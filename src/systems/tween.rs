//! Tween animation systems.
//!
//! These systems update entity properties over time based on tween components:
//! - [`tween_mapposition_system`] – animates [`MapPosition`](crate::components::mapposition::MapPosition)
//! - [`tween_screenposition_system`] – animates [`ScreenPosition`](crate::components::screenposition::ScreenPosition)
//! - [`tween_rotation_system`] – animates [`Rotation`](crate::components::rotation::Rotation)
//! - [`tween_scale_system`] – animates [`Scale`](crate::components::scale::Scale)
//! - [`tween_alpha_system`] – animates the alpha of [`Tint`](crate::components::tint::Tint)
//!
//! Each tween component specifies start/end values and a
//! [`TweenClock`](crate::components::tween::TweenClock). The systems read
//! delta time from [`WorldTime`](crate::resources::worldtime::WorldTime), so a
//! paused world freezes every tween. When a [`LoopMode::Once`] tween ends a
//! [`TweenFinishedEvent`] is triggered.

use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::screenposition::ScreenPosition;
use crate::components::tint::Tint;
use crate::components::tween::{
    Easing, LoopMode, TweenAlpha, TweenChannel, TweenClock, TweenPosition, TweenRotation,
    TweenScale,
};
use crate::events::tween::TweenFinishedEvent;
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;
use raylib::math::Vector2;
use std::f32::consts::PI;

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub(crate) fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
        Easing::SineOut => (t * PI / 2.0).sin(),
        Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        Easing::ExpoIn => {
            if t <= 0.0 {
                0.0
            } else {
                2f32.powf(10.0 * t - 10.0)
            }
        }
        Easing::ExpoOut => {
            if t >= 1.0 {
                1.0
            } else {
                1.0 - 2f32.powf(-10.0 * t)
            }
        }
        Easing::ExpoInOut => {
            if t <= 0.0 {
                0.0
            } else if t >= 1.0 {
                1.0
            } else if t < 0.5 {
                2f32.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}

/// Linearly interpolate between two 2D vectors.
pub(crate) fn lerp_v2(a: Vector2, b: Vector2, t: f32) -> Vector2 {
    Vector2 {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Linearly interpolate between two floats.
pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Advance tween time and handle looping/completion.
///
/// Returns true when a [`LoopMode::Once`] clock reaches its end on this call.
pub(crate) fn advance(clock: &mut TweenClock, dt: f32) -> bool {
    let duration = clock.duration.max(0.0);
    let dir = if clock.forward { 1.0 } else { -1.0 };
    clock.time += dt * dir;

    let finished_forward = clock.forward && clock.time >= duration;
    let finished_backward = !clock.forward && clock.time <= 0.0;

    if !(finished_forward || finished_backward) {
        return false;
    }
    match clock.loop_mode {
        LoopMode::Once => {
            clock.playing = false;
            clock.time = clock.time.clamp(0.0, duration);
            true
        }
        LoopMode::Loop => {
            clock.time = if finished_forward { 0.0 } else { duration };
            false
        }
        LoopMode::PingPong => {
            clock.forward = !clock.forward;
            clock.time = clock.time.clamp(0.0, duration);
            false
        }
    }
}

/// Eased progress of a clock. Zero-length clocks sit at their end.
pub(crate) fn progress(clock: &TweenClock) -> f32 {
    if clock.duration <= 0.0 {
        return if clock.forward { 1.0 } else { 0.0 };
    }
    ease(clock.easing, clock.time / clock.duration)
}

/// Step a playing clock. Returns the eased progress and whether it finished.
fn step(clock: &mut TweenClock, dt: f32) -> Option<(f32, bool)> {
    if !clock.playing {
        return None;
    }
    let finished = advance(clock, dt);
    Some((progress(clock), finished))
}

fn frame_delta(world_time: &WorldTime) -> f32 {
    if world_time.paused {
        0.0
    } else {
        world_time.delta.max(0.0)
    }
}

/// Animate world entity positions based on [`TweenPosition`] components.
pub fn tween_mapposition_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut MapPosition, &mut TweenPosition)>,
    mut commands: Commands,
) {
    let dt = frame_delta(&world_time);
    for (entity, mut mp, mut tw) in query.iter_mut() {
        let Some((t, finished)) = step(&mut tw.clock, dt) else {
            continue;
        };
        mp.pos = lerp_v2(tw.from, tw.to, t);
        if finished {
            commands.trigger(TweenFinishedEvent {
                entity,
                channel: TweenChannel::Position,
            });
        }
    }
}

/// Animate viewport-fixed entity positions based on [`TweenPosition`] components.
pub fn tween_screenposition_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut ScreenPosition, &mut TweenPosition), Without<MapPosition>>,
    mut commands: Commands,
) {
    let dt = frame_delta(&world_time);
    for (entity, mut sp, mut tw) in query.iter_mut() {
        let Some((t, finished)) = step(&mut tw.clock, dt) else {
            continue;
        };
        sp.pos = lerp_v2(tw.from, tw.to, t);
        if finished {
            commands.trigger(TweenFinishedEvent {
                entity,
                channel: TweenChannel::Position,
            });
        }
    }
}

/// Animate entity rotations based on [`TweenRotation`] components.
pub fn tween_rotation_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Rotation, &mut TweenRotation)>,
    mut commands: Commands,
) {
    let dt = frame_delta(&world_time);
    for (entity, mut rot, mut tw) in query.iter_mut() {
        let Some((t, finished)) = step(&mut tw.clock, dt) else {
            continue;
        };
        rot.degrees = lerp_f32(tw.from, tw.to, t);
        if finished {
            commands.trigger(TweenFinishedEvent {
                entity,
                channel: TweenChannel::Rotation,
            });
        }
    }
}

/// Animate entity scales based on [`TweenScale`] components.
pub fn tween_scale_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Scale, &mut TweenScale)>,
    mut commands: Commands,
) {
    let dt = frame_delta(&world_time);
    for (entity, mut scale, mut tw) in query.iter_mut() {
        let Some((t, finished)) = step(&mut tw.clock, dt) else {
            continue;
        };
        scale.scale = lerp_v2(tw.from, tw.to, t);
        if finished {
            commands.trigger(TweenFinishedEvent {
                entity,
                channel: TweenChannel::Scale,
            });
        }
    }
}

/// Animate entity opacity based on [`TweenAlpha`] components.
pub fn tween_alpha_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Tint, &mut TweenAlpha)>,
    mut commands: Commands,
) {
    let dt = frame_delta(&world_time);
    for (entity, mut tint, mut tw) in query.iter_mut() {
        let Some((t, finished)) = step(&mut tw.clock, dt) else {
            continue;
        };
        tint.set_alpha(lerp_f32(tw.from, tw.to, t));
        if finished {
            commands.trigger(TweenFinishedEvent {
                entity,
                channel: TweenChannel::Alpha,
            });
        }
    }
}
