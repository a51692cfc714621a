//! Demo scenes and input handling.
//!
//! Two scenes, `title` and `play`, built from procedurally generated
//! textures. SPACE transitions between them carrying a visit counter as
//! payload; 1/2/3 switch the overlay animation between fade, zoom-out and
//! slide; B drops a burst of blocks on top; arrows scroll the camera.

use bevy_ecs::prelude::*;
use log::{error, info};
use raylib::prelude::*;
use serde_json::json;

use statetransition::components::mapposition::MapPosition;
use statetransition::components::rotation::Rotation;
use statetransition::components::scale::Scale;
use statetransition::components::sprite::Sprite;
use statetransition::components::tint::Tint;
use statetransition::components::tween::{Easing, LoopMode, TweenRotation, TweenScale};
use statetransition::components::zindex::ZIndex;
use statetransition::resources::camera2d::Camera2DRes;
use statetransition::resources::clearcolor::ClearColor;
use statetransition::resources::scene::{SceneParams, SceneState};
use statetransition::resources::screensize::ScreenSize;
use statetransition::resources::texturestore::TextureStore;
use statetransition::resources::transition::{
    PropertyMap, PropertyTarget, TransitionController, TransitionOptions,
};
use statetransition::resources::worldtime::WorldTime;
use statetransition::transition::{bring_to_top, transition_to};

const CAMERA_SPEED: f32 = 240.0;
const TILE: i32 = 64;

/// Generate the textures used by both scenes.
pub fn load_textures(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    width: i32,
    height: i32,
) -> Result<TextureStore, String> {
    let mut store = TextureStore::new();
    let images = [
        (
            "title_bg",
            Image::gen_image_checked(
                width * 2,
                height * 2,
                TILE,
                TILE,
                Color::DARKBLUE,
                Color::new(0, 0, 80, 255),
            ),
        ),
        (
            "play_bg",
            Image::gen_image_checked(
                width * 2,
                height * 2,
                TILE / 2,
                TILE / 2,
                Color::DARKGREEN,
                Color::new(0, 60, 20, 255),
            ),
        ),
        (
            "logo",
            Image::gen_image_gradient_radial(256, 256, 0.2, Color::GOLD, Color::BLANK),
        ),
        ("block", Image::gen_image_color(TILE, TILE, Color::RAYWHITE)),
    ];
    for (key, image) in images.iter() {
        let texture = rl
            .load_texture_from_image(thread, image)
            .map_err(|e| format!("Failed to create texture '{}': {}", key, e))?;
        store.insert(*key, texture);
    }
    Ok(store)
}

fn visits(params: &SceneParams) -> u64 {
    params
        .get(0)
        .and_then(|v| v.get("visits"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}

fn spawn_blocks(commands: &mut Commands, count: u64, screen: &ScreenSize, z: ZIndex) {
    for _ in 0..count {
        let x = fastrand::i32(0..screen.w.max(1).saturating_mul(2)) as f32;
        let y = fastrand::i32(0..screen.h.max(1).saturating_mul(2)) as f32;
        let tint = Tint::new(fastrand::u8(64..), fastrand::u8(64..), fastrand::u8(64..), 255);
        let spin = TweenRotation::new(0.0, 360.0, fastrand::f32() * 3.0 + 1.0)
            .with_loop_mode(LoopMode::Loop);
        commands.spawn((
            Sprite::centered("block", TILE as f32 * 0.5, TILE as f32 * 0.5),
            MapPosition::new(x, y),
            z,
            tint,
            Rotation::default(),
            spin,
        ));
    }
}

/// Init system of the `title` scene.
pub fn enter_title(
    mut commands: Commands,
    params: Res<SceneParams>,
    screen: Res<ScreenSize>,
) {
    let visits = visits(&params);
    info!("Title scene, visit {}", visits);
    commands.insert_resource(ClearColor(Color::DARKGRAY));
    commands.insert_resource(Camera2DRes::centered_on(
        Vector2 {
            x: screen.w as f32 * 0.5,
            y: screen.h as f32 * 0.5,
        },
        screen.w,
        screen.h,
    ));
    commands.spawn((
        Sprite::new("title_bg", screen.w as f32 * 2.0, screen.h as f32 * 2.0),
        MapPosition::new(-(screen.w as f32) * 0.5, -(screen.h as f32) * 0.5),
        ZIndex(0),
    ));
    commands.spawn((
        Sprite::centered("logo", 256.0, 256.0),
        MapPosition::new(screen.w as f32 * 0.5, screen.h as f32 * 0.5),
        ZIndex(2),
        Scale::uniform(0.8),
        TweenScale::new(Vector2 { x: 0.8, y: 0.8 }, Vector2 { x: 1.2, y: 1.2 }, 1.0)
            .with_easing(Easing::SineInOut)
            .with_loop_mode(LoopMode::PingPong),
    ));
    spawn_blocks(&mut commands, 4 + visits, &screen, ZIndex(1));
}

/// Init system of the `play` scene.
pub fn enter_play(mut commands: Commands, params: Res<SceneParams>, screen: Res<ScreenSize>) {
    let visits = visits(&params);
    info!("Play scene, visit {}", visits);
    commands.insert_resource(ClearColor(Color::BLACK));
    commands.spawn((
        Sprite::new("play_bg", screen.w as f32 * 2.0, screen.h as f32 * 2.0),
        MapPosition::new(-(screen.w as f32) * 0.5, -(screen.h as f32) * 0.5),
        ZIndex(0),
    ));
    spawn_blocks(&mut commands, 16 + visits * 4, &screen, ZIndex(1));
}

/// Per-frame demo state.
#[derive(Resource, Debug, Default)]
pub struct DemoState {
    pub visits: u64,
}

fn preset(number: u8, screen: &ScreenSize) -> PropertyMap {
    let mut properties = PropertyMap::new();
    match number {
        2 => {
            properties.insert("scale".to_string(), PropertyTarget::Scalar(0.0));
            properties.insert("rotation".to_string(), PropertyTarget::Scalar(180.0));
        }
        3 => {
            let mut position = std::collections::BTreeMap::new();
            position.insert("x".to_string(), -(screen.w as f32) * 0.5);
            properties.insert("position".to_string(), PropertyTarget::Group(position));
        }
        _ => {
            properties.insert("alpha".to_string(), PropertyTarget::Scalar(0.0));
        }
    }
    properties
}

/// Read the keyboard and drive transitions, presets and the camera.
pub fn demo_input_system(
    rl: NonSend<RaylibHandle>,
    time: Res<WorldTime>,
    screen: Res<ScreenSize>,
    state: Res<SceneState>,
    mut demo: ResMut<DemoState>,
    mut controller: ResMut<TransitionController>,
    mut camera: ResMut<Camera2DRes>,
    mut commands: Commands,
) {
    if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
        demo.visits += 1;
        let target = if state.current() == Some("title") {
            "play"
        } else {
            "title"
        };
        let params = SceneParams::new([json!({ "visits": demo.visits })]);
        commands.queue(move |world: &mut World| {
            if let Err(e) = transition_to(world, target, params) {
                error!("Transition failed: {}", e);
            }
        });
    }

    // Blocks spawned mid-transition must not cover the overlay.
    if rl.is_key_pressed(KeyboardKey::KEY_B) {
        spawn_blocks(&mut commands, 8, &screen, ZIndex(100));
        commands.queue(bring_to_top);
    }

    for (key, number, name) in [
        (KeyboardKey::KEY_ONE, 1, "fade"),
        (KeyboardKey::KEY_TWO, 2, "zoom-out"),
        (KeyboardKey::KEY_THREE, 3, "slide"),
    ] {
        if rl.is_key_pressed(key) {
            info!("Transition preset: {}", name);
            controller
                .update_settings(TransitionOptions::default().with_properties(preset(number, &screen)));
        }
    }

    let step = CAMERA_SPEED * time.delta;
    let mut pan = Vector2 { x: 0.0, y: 0.0 };
    if rl.is_key_down(KeyboardKey::KEY_LEFT) {
        pan.x -= step;
    }
    if rl.is_key_down(KeyboardKey::KEY_RIGHT) {
        pan.x += step;
    }
    if rl.is_key_down(KeyboardKey::KEY_UP) {
        pan.y -= step;
    }
    if rl.is_key_down(KeyboardKey::KEY_DOWN) {
        pan.y += step;
    }
    camera.0.target.x += pan.x;
    camera.0.target.y += pan.y;
}
