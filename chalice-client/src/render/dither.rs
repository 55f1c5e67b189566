//! The dither pass.
//!
//! The scene renders into an offscreen [`Framebuffer`] the size of the drawable area, then a
//! fullscreen quad copies it to the window through an ordered dither. The framebuffer is built
//! once per drawable size and reused between frames.

use std::sync::Arc;

use chalice_core::postprocess::{BAYER_4X4, DitherEffect, StageCache};
use glam::Vec2;
use glow::HasContext;

use crate::abs::{Framebuffer, Mesh, ShaderProgram, Vertex};

#[repr(C)]
struct QuadVertex {
    position: Vec2,
}

impl Vertex for QuadVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<QuadVertex>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
        }
    }
}

pub struct DitherPass {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    quad: Mesh,
    targets: StageCache<(u32, u32), Framebuffer>,
}

impl DitherPass {
    pub fn new(gl: &Arc<glow::Context>, shader_program: ShaderProgram) -> Result<Self, String> {
        let vertices = [
            QuadVertex {
                position: Vec2::new(-1.0, -1.0),
            },
            QuadVertex {
                position: Vec2::new(1.0, -1.0),
            },
            QuadVertex {
                position: Vec2::new(1.0, 1.0),
            },
            QuadVertex {
                position: Vec2::new(-1.0, 1.0),
            },
        ];
        let quad = Mesh::new_static(gl, &vertices, &[0, 1, 2, 0, 2, 3], glow::TRIANGLES)?;
        Ok(Self {
            gl: Arc::clone(gl),
            shader_program,
            quad,
            targets: StageCache::new(),
        })
    }

    /// Binds the offscreen target for a drawable of `size` pixels and clears it with the
    /// current clear color.
    pub fn begin(&mut self, size: (u32, u32)) -> Result<(), String> {
        let gl = Arc::clone(&self.gl);
        let target = self.targets.get_or_build(&size, |&(w, h)| {
            log::debug!("Building {}x{} dither target", w, h);
            Framebuffer::new(&gl, w, h)
        })?;
        target.bind();
        unsafe {
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        Ok(())
    }

    /// Copies the offscreen target to the window through `effect`.
    pub fn finish(&mut self, size: (u32, u32), effect: DitherEffect) -> Result<(), String> {
        Framebuffer::unbind(&self.gl);
        let gl = Arc::clone(&self.gl);
        let target = self
            .targets
            .get_or_build(&size, |&(w, h)| Framebuffer::new(&gl, w, h))?;

        unsafe {
            self.gl.viewport(0, 0, size.0 as i32, size.1 as i32);
            self.gl.disable(glow::DEPTH_TEST);
        }

        target.texture().bind(0);
        self.shader_program.use_program();
        self.shader_program.set_uniform("u_scene", 0);
        self.shader_program.set_uniform("u_bayer", BAYER_4X4);
        self.shader_program
            .set_uniform("u_cell_size", effect.cell_size);
        self.shader_program.set_uniform("u_levels", effect.levels);
        self.quad.draw();
        Ok(())
    }

    /// How many offscreen targets have been built so far.
    pub fn rebuilds(&self) -> usize {
        self.targets.builds()
    }
}
