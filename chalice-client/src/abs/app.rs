//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use crate::{config::WindowConfig, error::ClientError};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] from the window configuration.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    ///
    /// The default framebuffer is requested without an alpha channel and with a depth buffer.
    pub fn new(config: &WindowConfig) -> Result<Self, ClientError> {
        let sdl = sdl2::init().map_err(ClientError::Sdl)?;
        let video_subsystem = sdl.video().map_err(ClientError::Sdl)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_alpha_size(0);
        gl_attr.set_depth_size(24);

        let (width, height) = if config.fullscreen {
            let display_mode = video_subsystem
                .current_display_mode(0)
                .map_err(ClientError::Sdl)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (config.width, config.height)
        };

        let mut window = video_subsystem
            .window(&config.title, width, height)
            .opengl()
            .resizable()
            .allow_highdpi()
            .build()?;
        window
            .set_fullscreen(if config.fullscreen {
                sdl2::video::FullscreenType::Desktop
            } else {
                sdl2::video::FullscreenType::Off
            })
            .map_err(ClientError::Sdl)?;

        let gl_context = window.gl_create_context().map_err(ClientError::Sdl)?;
        window.gl_make_current(&gl_context).map_err(ClientError::Sdl)?;
        let interval = if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(err) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {}", err);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(ClientError::Sdl)?;
        let gl = Arc::new(gl);

        log::info!("Opened {}x{} window with OpenGL 3.3 core", width, height);

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }

    /// Size of the window in logical (screen) pixels.
    pub fn logical_size(&self) -> (u32, u32) {
        self.window.size()
    }

    /// Size of the drawable area in physical pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}
