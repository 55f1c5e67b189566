//! The OpenGL render surface.

use std::sync::Arc;

use chalice_core::{Color, surface::RenderSurface};
use glow::HasContext;

/// The window's GL context seen as a clearable surface. The clear color is global GL state, so
/// every later `glClear` uses the color set here.
pub struct GlSurface {
    gl: Arc<glow::Context>,
}

impl GlSurface {
    pub fn new(gl: &Arc<glow::Context>) -> Self {
        Self {
            gl: Arc::clone(gl),
        }
    }
}

impl RenderSurface for GlSurface {
    fn set_clear_color(&mut self, color: Color) {
        let c = color.to_srgb();
        unsafe {
            self.gl.clear_color(c.x, c.y, c.z, 1.0);
        }
        log::debug!("Clear color set to {}", color);
    }
}
