//! State transition demo.
//!
//! A small 2D program using:
//! - **raylib** for windowing and graphics
//! - **bevy_ecs** for entity-component-system architecture
//!
//! Two scenes (`title` and `play`) swap on SPACE. Each swap freezes the
//! current frame into a snapshot and animates it away over the new scene.
//!
//! # Main Loop
//!
//! 1. Initialize the raylib window, ECS world and resources
//! 2. Install the scene manager, the transition controller and the capture backend
//! 3. Register the demo scenes and start `title`
//! 4. Run the main loop: input, pending scene starts, tweens, render
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --duration 0.6 --easing cubic_in_out
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod game;

use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use statetransition::components::tween::Easing;
use statetransition::events::scene::install_scene_manager;
use statetransition::resources::camera2d::Camera2DRes;
use statetransition::resources::clearcolor::ClearColor;
use statetransition::resources::framecapture::{FrameCaptureBackend, RaylibFrameCapture};
use statetransition::resources::gameconfig::GameConfig;
use statetransition::resources::scene::{SceneParams, register_scene, start_scene};
use statetransition::resources::screensize::ScreenSize;
use statetransition::resources::transition::TransitionSettings;
use statetransition::resources::worldtime::WorldTime;
use statetransition::systems::render::render_system;
use statetransition::systems::scene::check_pending_scene;
use statetransition::systems::time::update_world_time;
use statetransition::systems::tween::{
    tween_alpha_system, tween_mapposition_system, tween_rotation_system, tween_scale_system,
    tween_screenposition_system,
};
use statetransition::transition::install_transition;

use crate::game::{DemoState, demo_input_system, enter_play, enter_title, load_textures};

/// Scene transitions with snapshot overlays.
#[derive(Parser)]
#[command(version, about = "Scene transition demo: SPACE switches scenes, 1/2/3 pick the effect.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Overlay animation duration in seconds (overrides the config file).
    #[arg(long, value_name = "SECS")]
    duration: Option<f32>,

    /// Overlay easing, e.g. `expo_in_out` (overrides the config file).
    #[arg(long, value_name = "NAME")]
    easing: Option<Easing>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::info!("{}; using defaults", e);
    }
    if let Some(duration) = cli.duration {
        config.transition.duration = Some(duration);
    }
    if let Some(easing) = cli.easing {
        config.transition.easing = Some(easing);
    }

    let (width, height) = config.window_size();

    // --------------- Raylib window & assets ---------------
    let (mut rl, thread) = raylib::init()
        .size(width as i32, height as i32)
        .title("State Transition")
        .build();
    rl.set_target_fps(config.target_fps);

    let textures = match load_textures(&mut rl, &thread, width as i32, height as i32) {
        Ok(textures) => textures,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(ScreenSize {
        w: width as i32,
        h: height as i32,
    });
    world.insert_resource(Camera2DRes::identity());
    world.insert_resource(ClearColor::default());
    world.insert_resource(DemoState::default());
    world.insert_resource(textures);

    let mut settings = TransitionSettings::default();
    settings.merge(config.transition.clone());
    world.insert_resource(config);

    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(thread);
    world.insert_non_send_resource(FrameCaptureBackend::new(RaylibFrameCapture));

    install_scene_manager(&mut world);
    install_transition(&mut world, settings);

    register_scene(&mut world, "title", enter_title);
    register_scene(&mut world, "play", enter_play);
    if let Err(e) = start_scene(&mut world, "title", SceneParams::default()) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let mut update = Schedule::default();
    update.add_systems(demo_input_system);
    update.add_systems(check_pending_scene.after(demo_input_system));
    update.add_systems(
        (
            tween_mapposition_system,
            tween_screenposition_system,
            tween_rotation_system,
            tween_scale_system,
            tween_alpha_system,
        )
            .chain()
            .after(check_pending_scene),
    );
    update.add_systems(render_system.after(tween_alpha_system));

    // --------------- Main loop ---------------
    while !world
        .non_send_resource::<raylib::RaylibHandle>()
        .window_should_close()
    {
        let dt = world
            .non_send_resource::<raylib::RaylibHandle>()
            .get_frame_time();
        update_world_time(&mut world, dt);

        update.run(&mut world);

        world.clear_trackers();
    }
}
