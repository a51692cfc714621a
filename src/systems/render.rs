//! Sprite rendering.
//!
//! Drawing happens in two passes over the display list (every entity with a
//! [`Sprite`] and a [`ZIndex`]):
//! - [`draw_world_pass`] draws [`MapPosition`] entities under the 2D camera;
//! - [`draw_screen_pass`] draws [`ScreenPosition`] entities in viewport pixels.
//!
//! Both passes are generic over the draw handle so the same code renders the
//! window ([`render_system`]) and offscreen snapshots
//! ([`RaylibFrameCapture`](crate::resources::framecapture::RaylibFrameCapture)).

use bevy_ecs::prelude::*;
use log::warn;
use raylib::prelude::*;

use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::screenposition::ScreenPosition;
use crate::components::sprite::Sprite;
use crate::components::tint::Tint;
use crate::components::zindex::ZIndex;
use crate::resources::camera2d::Camera2DRes;
use crate::resources::clearcolor::ClearColor;
use crate::resources::texturestore::TextureStore;

/// One sprite ready to draw, detached from the world.
struct DrawItem {
    sprite: Sprite,
    pos: Vector2,
    z: ZIndex,
    color: Color,
    scale: Vector2,
    degrees: f32,
}

impl DrawItem {
    fn new(
        sprite: &Sprite,
        pos: Vector2,
        z: &ZIndex,
        tint: Option<&Tint>,
        scale: Option<&Scale>,
        rotation: Option<&Rotation>,
    ) -> Self {
        DrawItem {
            sprite: sprite.clone(),
            pos,
            z: *z,
            color: tint.map(|t| t.color).unwrap_or(Color::WHITE),
            scale: scale.map(|s| s.scale).unwrap_or(Vector2 { x: 1.0, y: 1.0 }),
            degrees: rotation.map(|r| r.degrees).unwrap_or(0.0),
        }
    }
}

fn draw_items<D: RaylibDraw>(world: &World, d: &mut D, mut items: Vec<DrawItem>) {
    items.sort_by_key(|item| item.z);

    let Some(textures) = world.get_resource::<TextureStore>() else {
        return;
    };

    for item in items.iter() {
        let Some(tex) = textures.get(&item.sprite.tex_key) else {
            continue;
        };
        // Source rect selects a frame from the texture
        let src = Rectangle {
            x: item.sprite.offset.x,
            y: item.sprite.offset.y,
            width: item.sprite.width,
            height: item.sprite.height,
        };
        // Position is the pivot; the scaled origin keeps it in place
        let dest = Rectangle {
            x: item.pos.x,
            y: item.pos.y,
            width: item.sprite.width * item.scale.x,
            height: item.sprite.height * item.scale.y,
        };
        let origin = Vector2 {
            x: item.sprite.origin.x * item.scale.x,
            y: item.sprite.origin.y * item.scale.y,
        };
        d.draw_texture_pro(tex, src, dest, origin, item.degrees, item.color);
    }
}

/// Draw world-space sprites. Call inside a 2D camera scope.
pub fn draw_world_pass<D: RaylibDraw>(world: &mut World, d: &mut D) {
    let items: Vec<DrawItem> = world
        .query::<(
            &Sprite,
            &MapPosition,
            &ZIndex,
            Option<&Tint>,
            Option<&Scale>,
            Option<&Rotation>,
        )>()
        .iter(world)
        .map(|(s, p, z, t, sc, r)| DrawItem::new(s, p.pos, z, t, sc, r))
        .collect();
    draw_items(world, d, items);
}

/// Draw viewport-fixed sprites, on top of the world pass.
pub fn draw_screen_pass<D: RaylibDraw>(world: &mut World, d: &mut D) {
    let items: Vec<DrawItem> = world
        .query_filtered::<(
            &Sprite,
            &ScreenPosition,
            &ZIndex,
            Option<&Tint>,
            Option<&Scale>,
            Option<&Rotation>,
        ), Without<MapPosition>>()
        .iter(world)
        .map(|(s, p, z, t, sc, r)| DrawItem::new(s, p.pos, z, t, sc, r))
        .collect();
    draw_items(world, d, items);
}

/// Exclusive system drawing one frame to the window.
pub fn render_system(world: &mut World) {
    let Some(mut rl) = world.remove_non_send_resource::<RaylibHandle>() else {
        warn!("render_system: RaylibHandle missing");
        return;
    };
    let Some(th) = world.remove_non_send_resource::<RaylibThread>() else {
        world.insert_non_send_resource(rl);
        warn!("render_system: RaylibThread missing");
        return;
    };

    let clear = world
        .get_resource::<ClearColor>()
        .copied()
        .unwrap_or_default();
    let camera = world
        .get_resource::<Camera2DRes>()
        .copied()
        .unwrap_or_else(Camera2DRes::identity);

    {
        let mut d = rl.begin_drawing(&th);
        d.clear_background(clear.0);
        {
            let mut d2 = d.begin_mode2D(camera.0);
            draw_world_pass(world, &mut d2);
        }
        draw_screen_pass(world, &mut d);
    }

    world.insert_non_send_resource(rl);
    world.insert_non_send_resource(th);
}
