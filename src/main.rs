//! Scanline Engine demo
//!
//! Renders `assets/scene.ron` (or a built-in scene) with the settings in
//! `assets/render.ron` and shows the framebuffer in a window.
//!
//! Controls:
//! - WASD move, Q/E down/up, arrows or right mouse drag to look around
//! - Space turns toward the scene origin
//! - T cycles texture mode, F toggles bilinear filtering
//! - B toggles back-face removal, Z the depth test, O the sort policy

use macroquad::prelude::*;
use scanline_engine::pipeline::SortPolicy;
use scanline_engine::rasterizer::{FilterMode as TexFilter, TextureMode};
use scanline_engine::{camera, math, Light, LightKind, RasterSettings, Renderer, Scene, HEIGHT, VERSION, WIDTH};

const SETTINGS_PATH: &str = "assets/render.ron";
const SCENE_PATH: &str = "assets/scene.ron";

/// Camera-relative acceleration, units per second squared
const MOVE_ACCEL: f32 = 30.0;
/// Degrees per pixel of mouse travel
const MOUSE_LOOK: f32 = 0.25;
/// Degrees per second for the arrow keys
const KEY_LOOK: f32 = 90.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Scanline Engine v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_settings() -> RasterSettings {
    match RasterSettings::load(SETTINGS_PATH) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("{}: {}, using default settings", SETTINGS_PATH, e);
            RasterSettings::default()
        }
    }
}

fn load_scene() -> Scene {
    match scanline_engine::load_scene(SCENE_PATH) {
        Ok(scene) => scene,
        Err(e) => {
            log::warn!("{}: {}, using the built-in scene", SCENE_PATH, e);
            Scene::demo()
        }
    }
}

/// Add the configured ambient level when the scene brings none of its own.
fn ensure_ambient(scene: &mut Scene, level: f32) {
    let has_ambient = scene.lights.iter().any(|l| l.enabled && l.kind == LightKind::Ambient);
    if !has_ambient && level > 0.0 {
        scene.lights.push(Light::ambient(scanline_engine::rasterizer::Color::WHITE, level));
    }
}

fn drive_camera(camera: &mut camera::Camera, last_mouse: &mut (f32, f32), dt: f32) {
    let mut thrust = math::Vec3::ZERO;
    if is_key_down(KeyCode::W) {
        thrust.z += MOVE_ACCEL;
    }
    if is_key_down(KeyCode::S) {
        thrust.z -= MOVE_ACCEL;
    }
    if is_key_down(KeyCode::A) {
        thrust.x -= MOVE_ACCEL;
    }
    if is_key_down(KeyCode::D) {
        thrust.x += MOVE_ACCEL;
    }
    if is_key_down(KeyCode::Q) {
        thrust.y -= MOVE_ACCEL;
    }
    if is_key_down(KeyCode::E) {
        thrust.y += MOVE_ACCEL;
    }
    camera.thrust(thrust);

    let mut d_pitch = 0.0;
    let mut d_yaw = 0.0;
    let mouse = mouse_position();
    if is_mouse_button_down(MouseButton::Right) {
        // Window Y grows downward
        d_yaw += (mouse.0 - last_mouse.0) * MOUSE_LOOK;
        d_pitch -= (mouse.1 - last_mouse.1) * MOUSE_LOOK;
    }
    *last_mouse = mouse;
    if is_key_down(KeyCode::Left) {
        d_yaw -= KEY_LOOK * dt;
    }
    if is_key_down(KeyCode::Right) {
        d_yaw += KEY_LOOK * dt;
    }
    if is_key_down(KeyCode::Up) {
        d_pitch += KEY_LOOK * dt;
    }
    if is_key_down(KeyCode::Down) {
        d_pitch -= KEY_LOOK * dt;
    }
    if d_pitch != 0.0 || d_yaw != 0.0 {
        camera.rotate(d_pitch, d_yaw);
    }

    if is_key_pressed(KeyCode::Space) {
        camera.set_target(math::Vec3::ZERO);
    }
}

/// Apply render toggles. Returns the new settings when any key changed one.
fn toggle_settings(current: &RasterSettings) -> Option<RasterSettings> {
    let mut settings = current.clone();
    if is_key_pressed(KeyCode::T) {
        settings.texture_mode = match settings.texture_mode {
            TextureMode::None => TextureMode::Affine,
            TextureMode::Affine => TextureMode::Perspective,
            TextureMode::Perspective => TextureMode::None,
        };
    }
    if is_key_pressed(KeyCode::F) {
        settings.filter = match settings.filter {
            TexFilter::Nearest => TexFilter::Bilinear,
            TexFilter::Bilinear => TexFilter::Nearest,
        };
    }
    if is_key_pressed(KeyCode::B) {
        settings.backface_cull = !settings.backface_cull;
    }
    if is_key_pressed(KeyCode::Z) {
        settings.depth_test = !settings.depth_test;
    }
    if is_key_pressed(KeyCode::O) {
        settings.sort = match settings.sort {
            SortPolicy::None => SortPolicy::BackToFront,
            SortPolicy::BackToFront => SortPolicy::FrontToBack,
            SortPolicy::FrontToBack => SortPolicy::None,
        };
    }
    (settings != *current).then_some(settings)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut renderer = match Renderer::new(load_settings()) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("{}, using default settings", e);
            match Renderer::new(RasterSettings::default()) {
                Ok(renderer) => renderer,
                Err(e) => {
                    log::error!("{}", e);
                    return;
                }
            }
        }
    };

    let mut scene = load_scene();
    ensure_ambient(&mut scene, renderer.settings().ambient);
    let mut camera = scene.camera.build(renderer.view());

    let mut rgba = Vec::new();
    let mut last_mouse = mouse_position();

    log::info!("=== Scanline Engine v{} ===", VERSION);

    loop {
        let dt = get_frame_time().min(0.1);

        drive_camera(&mut camera, &mut last_mouse, dt);
        if let Some(settings) = toggle_settings(renderer.settings()) {
            log::info!(
                "texture {:?}, filter {:?}, backface {}, depth test {}, sort {:?}",
                settings.texture_mode,
                settings.filter,
                settings.backface_cull,
                settings.depth_test,
                settings.sort
            );
            match renderer.set_settings(settings) {
                Ok(()) => camera.view = renderer.view(),
                Err(e) => log::warn!("{}", e),
            }
        }
        camera.update(dt);

        let stats = match renderer.render_frame(&scene, &camera) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("frame failed: {}", e);
                break;
            }
        };

        // Convert framebuffer to texture and draw it letterboxed
        let fb = renderer.framebuffer();
        fb.copy_rgba_top_down(&mut rgba);
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &rgba);
        texture.set_filter(FilterMode::Nearest);

        let screen_w = screen_width();
        let screen_h = screen_height();
        let fb_aspect = fb.width as f32 / fb.height as f32;
        let (draw_w, draw_h) = if fb_aspect > screen_w / screen_h {
            (screen_w, screen_w / fb_aspect)
        } else {
            (screen_h * fb_aspect, screen_h)
        };

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            (screen_w - draw_w) * 0.5,
            (screen_h - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );
        draw_text(
            &format!(
                "{} fps | {} faces | {} px | culled {} obj {} back {} frustum",
                get_fps(),
                stats.faces_rasterized,
                stats.pixels_drawn,
                stats.objects_culled,
                stats.faces_backfacing,
                stats.faces_culled
            ),
            8.0,
            20.0,
            18.0,
            WHITE,
        );

        next_frame().await;
    }
}
