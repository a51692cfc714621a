//! Tween components for animated interpolation.
//!
//! This module provides components for smoothly animating entity properties
//! over time:
//! - [`TweenPosition`] – animate [`MapPosition`](super::mapposition::MapPosition)
//!   or [`ScreenPosition`](super::screenposition::ScreenPosition)
//! - [`TweenRotation`] – animate [`Rotation`](super::rotation::Rotation)
//! - [`TweenScale`] – animate [`Scale`](super::scale::Scale)
//! - [`TweenAlpha`] – animate the alpha of [`Tint`](super::tint::Tint)
//!
//! Every tween carries a [`TweenClock`] with its duration, [`Easing`] and
//! [`LoopMode`]. See [`crate::systems::tween`] for the update systems and
//! [`crate::events::tween::TweenFinishedEvent`] for completion notifications.

use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::Component;
use raylib::prelude::Vector2;
use serde::{Deserialize, Serialize};

/// Determines how a tween behaves when it reaches the end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopMode {
    /// Play once, stop and report completion.
    Once,
    /// Restart from the beginning when finished.
    Loop,
    /// Reverse direction when reaching either end.
    PingPong,
}

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed (no easing).
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
    /// Starts slow, accelerates (sinusoidal).
    SineIn,
    /// Starts fast, decelerates (sinusoidal).
    SineOut,
    /// Slow start and end (sinusoidal).
    SineInOut,
    /// Starts very slow, accelerates sharply (exponential).
    ExpoIn,
    /// Starts very fast, decelerates sharply (exponential).
    ExpoOut,
    /// Very slow start and end (exponential).
    ExpoInOut,
}

impl Easing {
    pub const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
    ];

    /// Snake-case name, as used in config files and JSON options.
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "quad_in",
            Easing::QuadOut => "quad_out",
            Easing::QuadInOut => "quad_in_out",
            Easing::CubicIn => "cubic_in",
            Easing::CubicOut => "cubic_out",
            Easing::CubicInOut => "cubic_in_out",
            Easing::SineIn => "sine_in",
            Easing::SineOut => "sine_out",
            Easing::SineInOut => "sine_in_out",
            Easing::ExpoIn => "expo_in",
            Easing::ExpoOut => "expo_out",
            Easing::ExpoInOut => "expo_in_out",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| format!("unknown easing '{}'", s))
    }
}

/// Which property a tween drives. Carried by completion events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TweenChannel {
    Position,
    Rotation,
    Scale,
    Alpha,
}

/// Playback state shared by every tween component.
#[derive(Copy, Clone, Debug)]
pub struct TweenClock {
    /// Duration in seconds.
    pub duration: f32,
    /// Easing function to use.
    pub easing: Easing,
    /// Behavior when the tween ends.
    pub loop_mode: LoopMode,
    /// Whether the tween is currently playing.
    pub playing: bool,
    /// Current time within the tween.
    pub time: f32,
    /// Direction of playback (true = forward).
    pub forward: bool,
}

impl TweenClock {
    pub fn new(duration: f32) -> Self {
        TweenClock {
            duration,
            easing: Easing::Linear,
            loop_mode: LoopMode::Once,
            playing: true,
            time: 0.0,
            forward: true,
        }
    }
}

/// Animates an entity's position between two points.
///
/// Applies to [`MapPosition`](super::mapposition::MapPosition) for world
/// entities and to [`ScreenPosition`](super::screenposition::ScreenPosition)
/// for viewport-fixed ones.
#[derive(Component, Clone, Debug)]
pub struct TweenPosition {
    /// Starting position.
    pub from: Vector2,
    /// Ending position.
    pub to: Vector2,
    pub clock: TweenClock,
}

impl TweenPosition {
    pub fn new(from: Vector2, to: Vector2, duration: f32) -> Self {
        TweenPosition {
            from,
            to,
            clock: TweenClock::new(duration),
        }
    }
}

/// Animates an entity's [`Rotation`](super::rotation::Rotation) between two angles (degrees).
#[derive(Component, Clone, Debug)]
pub struct TweenRotation {
    pub from: f32,
    pub to: f32,
    pub clock: TweenClock,
}

impl TweenRotation {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        TweenRotation {
            from,
            to,
            clock: TweenClock::new(duration),
        }
    }
}

/// Animates an entity's [`Scale`](super::scale::Scale) between two values.
#[derive(Component, Clone, Debug)]
pub struct TweenScale {
    pub from: Vector2,
    pub to: Vector2,
    pub clock: TweenClock,
}

impl TweenScale {
    pub fn new(from: Vector2, to: Vector2, duration: f32) -> Self {
        TweenScale {
            from,
            to,
            clock: TweenClock::new(duration),
        }
    }
}

/// Animates the opacity of an entity's [`Tint`](super::tint::Tint), in `[0.0, 1.0]`.
#[derive(Component, Clone, Debug)]
pub struct TweenAlpha {
    pub from: f32,
    pub to: f32,
    pub clock: TweenClock,
}

impl TweenAlpha {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        TweenAlpha {
            from,
            to,
            clock: TweenClock::new(duration),
        }
    }
}

macro_rules! tween_builders {
    ($($tween:ty),* $(,)?) => {
        $(
            impl $tween {
                pub fn with_easing(mut self, easing: Easing) -> Self {
                    self.clock.easing = easing;
                    self
                }
                pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
                    self.clock.loop_mode = loop_mode;
                    self
                }
                pub fn with_backwards(mut self) -> Self {
                    self.clock.time = self.clock.duration;
                    self.clock.forward = false;
                    self
                }
            }
        )*
    };
}

tween_builders!(TweenPosition, TweenRotation, TweenScale, TweenAlpha);
