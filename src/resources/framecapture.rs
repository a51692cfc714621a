//! Offscreen frame capture.
//!
//! The transition controller never touches the GPU directly. It asks the
//! installed [`FrameCapture`] backend to render the current frame into an
//! offscreen image stored under a texture key, and later to release it.
//!
//! The backend lives in the world as the non-send [`FrameCaptureBackend`]
//! resource. [`RaylibFrameCapture`] is the backend used by the game binary;
//! tests install recording backends instead.
//!
//! # Note
//! Raylib handles are non-send resources. The raylib backend takes
//! `RaylibHandle` and `RaylibThread` out of the world for the duration of the
//! capture and puts them back before returning.

use bevy_ecs::prelude::*;
use log::debug;
use raylib::prelude::*;

use crate::resources::camera2d::Camera2DRes;
use crate::resources::clearcolor::ClearColor;
use crate::resources::texturestore::TextureStore;
use crate::systems::render::{draw_screen_pass, draw_world_pass};

/// What to capture and where to store it.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Texture key the captured image is stored under.
    pub key: String,
    /// Image width in pixels (the viewport width).
    pub width: u32,
    /// Image height in pixels (the viewport height).
    pub height: u32,
    /// Camera the world pass is rendered with.
    pub camera: Camera2D,
}

impl CaptureRequest {
    /// World coordinate drawn at the image's top-left corner.
    pub fn scroll(&self) -> Vector2 {
        Camera2DRes(self.camera).scroll()
    }
}

/// Render-to-texture service consumed by the transition controller.
pub trait FrameCapture {
    /// Render the visible frame into an image stored under `request.key`.
    fn capture(&mut self, world: &mut World, request: &CaptureRequest) -> Result<(), String>;

    /// Free the image stored under `key`. Unknown keys are ignored.
    fn release(&mut self, world: &mut World, key: &str);
}

/// Non-send resource holding the installed capture backend.
pub struct FrameCaptureBackend(pub Box<dyn FrameCapture>);

impl FrameCaptureBackend {
    pub fn new(backend: impl FrameCapture + 'static) -> Self {
        FrameCaptureBackend(Box::new(backend))
    }
}

/// Run `f` with the installed backend and mutable access to the world.
///
/// Returns `None` when no backend is installed.
pub fn with_frame_capture<R>(
    world: &mut World,
    f: impl FnOnce(&mut dyn FrameCapture, &mut World) -> R,
) -> Option<R> {
    let mut backend = world.remove_non_send_resource::<FrameCaptureBackend>()?;
    let out = f(backend.0.as_mut(), world);
    world.insert_non_send_resource(backend);
    Some(out)
}

/// Capture backend drawing through raylib.
///
/// Stores snapshots as regular textures in [`TextureStore`], so any
/// [`Sprite`](crate::components::sprite::Sprite) can display them.
#[derive(Debug, Default, Clone, Copy)]
pub struct RaylibFrameCapture;

impl RaylibFrameCapture {
    fn render_snapshot(
        &self,
        world: &mut World,
        rl: &mut RaylibHandle,
        th: &RaylibThread,
        request: &CaptureRequest,
    ) -> Result<Texture2D, String> {
        let clear = world
            .get_resource::<ClearColor>()
            .copied()
            .unwrap_or_default();

        let mut target = rl
            .load_render_texture(th, request.width, request.height)
            .map_err(|e| format!("Failed to create snapshot texture: {}", e))?;
        {
            let mut d = rl.begin_texture_mode(th, &mut target);
            d.clear_background(clear.0);
            {
                let mut d2 = d.begin_mode2D(request.camera);
                draw_world_pass(world, &mut d2);
            }
            draw_screen_pass(world, &mut d);
        }

        // Render textures are stored upside down.
        let mut image = target
            .texture()
            .load_image()
            .map_err(|e| format!("Failed to read back snapshot: {}", e))?;
        image.flip_vertical();

        rl.load_texture_from_image(th, &image)
            .map_err(|e| format!("Failed to upload snapshot: {}", e))
    }
}

impl FrameCapture for RaylibFrameCapture {
    fn capture(&mut self, world: &mut World, request: &CaptureRequest) -> Result<(), String> {
        let mut rl = world
            .remove_non_send_resource::<RaylibHandle>()
            .ok_or_else(|| "RaylibHandle is not in the world".to_string())?;
        let Some(th) = world.remove_non_send_resource::<RaylibThread>() else {
            world.insert_non_send_resource(rl);
            return Err("RaylibThread is not in the world".to_string());
        };

        let result = self.render_snapshot(world, &mut rl, &th, request);

        world.insert_non_send_resource(rl);
        world.insert_non_send_resource(th);

        let texture = result?;
        debug!(
            "Captured {}x{} snapshot as '{}'",
            request.width, request.height, request.key
        );
        world
            .get_resource_or_insert_with(TextureStore::new)
            .insert(request.key.clone(), texture);
        Ok(())
    }

    fn release(&mut self, world: &mut World, key: &str) {
        if let Some(mut store) = world.get_resource_mut::<TextureStore>() {
            if store.remove(key).is_some() {
                debug!("Released snapshot '{}'", key);
            }
        }
    }
}
