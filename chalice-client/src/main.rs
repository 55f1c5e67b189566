use std::{rc::Rc, time::Instant};

use chalice_core::{app::ChaliceApp, asset::AssetLoader, scene::PerspectiveCamera};
use glam::Vec2;
use sdl2::{
    event::Event,
    keyboard::Keycode,
    mouse::MouseButton,
};

use crate::{
    abs::App,
    config::ClientConfig,
    error::ClientError,
    other::{KeyboardState, MouseState, UpdateContext},
    render::{
        dither::DitherPass,
        model::{CameraUniforms, ModelRenderer},
        ui::{font::Font, panel::DebugPanel, uirenderer::UIRenderer},
    },
    surface::GlSurface,
};

/// Compiles the `vert.glsl`/`frag.glsl` pair under `render/shaders/<name>/`. The path prefix
/// leads from the calling file to the crate's `src` directory.
#[macro_export]
macro_rules! shader_program {
    ($name:ident, $gl:expr, $path_prefix:literal) => {
        $crate::abs::ShaderProgram::from_sources(
            $gl,
            include_str!(concat!(
                $path_prefix,
                "/render/shaders/",
                stringify!($name),
                "/vert.glsl"
            )),
            include_str!(concat!(
                $path_prefix,
                "/render/shaders/",
                stringify!($name),
                "/frag.glsl"
            )),
        )
        .map_err(|log| $crate::error::ClientError::Shader {
            name: stringify!($name),
            log,
        })
    };
}

mod abs;
mod config;
mod error;
mod logger;
mod other;
mod render;
mod surface;

fn main() {
    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("chalice: {}", err);
        std::process::exit(1);
    }
}

fn status_line(error: Option<&str>) -> Option<String> {
    error.map(|err| format!("{}. Press R to retry.", err))
}

fn run() -> Result<(), ClientError> {
    logger::init()?;
    let config = ClientConfig::load();
    log::set_max_level(config.level_filter());

    let mut app = App::new(&config.window)?;

    let mut model_renderer = ModelRenderer::new(&app.gl, shader_program!(model, &app.gl, ".")?);
    let mut dither_pass =
        DitherPass::new(&app.gl, shader_program!(dither, &app.gl, ".")?).map_err(ClientError::Gl)?;

    let (width, height) = app.logical_size();
    let mut ui_renderer = UIRenderer::new(
        &app.gl,
        shader_program!(ui, &app.gl, ".")?,
        Vec2::new(width as f32, height as f32),
    )
    .map_err(ClientError::Gl)?;
    let font = Rc::new(Font::new(&app.gl).map_err(ClientError::Gl)?);

    let loader = AssetLoader::default();
    loader.preload(&config.asset_path);
    let mut chalice: ChaliceApp<GlSurface> = ChaliceApp::new(loader, config.asset_path.clone());
    chalice.mount(width);
    chalice.attach_surface(GlSurface::new(&app.gl));

    let mut debug_panel = DebugPanel::new(
        &font,
        chalice.panel(),
        status_line(chalice.model_error()).as_deref(),
    );

    let mut keyboard = KeyboardState::default();
    let mut mouse = MouseState::default();

    let start = Instant::now();
    let mut last_frame_time = start;

    'running: loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        keyboard.begin_frame();
        mouse.begin_frame();

        for event in app.event_pump.poll_iter() {
            keyboard.handle_event(&event);
            mouse.handle_event(&event);
            if let Event::Quit { .. } = event {
                break 'running;
            }
            if let Some((width, height)) = other::resized_to(&event) {
                chalice.resize(width);
                ui_renderer.resize(Vec2::new(width as f32, height as f32));
            }
        }

        if keyboard.pressed.contains(&Keycode::Escape) {
            break 'running;
        }
        if keyboard.pressed.contains(&Keycode::R) && chalice.model_error().is_some() {
            log::info!("Retrying model load");
            chalice.load_model();
        }

        let (width, height) = app.logical_size();
        let window_size = Vec2::new(width as f32, height as f32);

        let status = status_line(chalice.model_error());
        let ctx = UpdateContext::new(&keyboard, &mouse, delta_time);
        debug_panel.update(&ctx, chalice.panel_mut(), status.as_deref());
        debug_panel.layout(window_size);

        if !debug_panel.captures_mouse(mouse.position) {
            let fov = PerspectiveCamera::default().fov;
            let orbit = chalice.orbit_mut();
            if mouse.down.contains(&MouseButton::Left) {
                orbit.rotate(mouse.delta.x, mouse.delta.y, window_size.y);
            } else if mouse.down.contains(&MouseButton::Right) {
                orbit.pan(mouse.delta.x, mouse.delta.y, window_size.y, fov);
            }
            if mouse.scroll_delta.y != 0.0 {
                orbit.zoom(mouse.scroll_delta.y);
            }
        }
        let eye = chalice.orbit_mut().update();
        let view = chalice.orbit().view_matrix();

        let (drawable_width, drawable_height) = app.drawable_size();
        let aspect = drawable_width as f32 / drawable_height.max(1) as f32;
        let time = start.elapsed().as_secs_f32();

        let scene = chalice.scene();
        let camera = scene.camera().unwrap_or_default();
        let environment = scene.environment();
        let stage = scene.post_processing().unwrap_or_default();
        let items = scene.draw_list(time);

        let size = (drawable_width, drawable_height);
        dither_pass.begin(size).map_err(ClientError::Gl)?;
        model_renderer
            .draw(
                &items,
                &CameraUniforms {
                    view,
                    projection: camera.projection(aspect),
                    eye,
                },
                environment,
            )
            .map_err(ClientError::Gl)?;
        dither_pass
            .finish(size, stage.dither)
            .map_err(ClientError::Gl)?;

        debug_panel.draw(&mut ui_renderer);

        app.window.gl_swap_window();
    }

    chalice.teardown();
    log::info!(
        "Exiting after {} scene builds, {} render targets and {} mesh uploads",
        chalice.scene_builds(),
        dither_pass.rebuilds(),
        model_renderer.uploaded()
    );
    Ok(())
}
