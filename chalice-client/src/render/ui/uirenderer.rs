//! The UI renderer.
//!
//! Quads are batched while consecutive commands share a render mode and flushed through one
//! dynamic mesh that is reused for every batch.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, TextureHandle},
    render::ui::UIVertex,
};

/// The rendering mode for a UI element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UIRenderMode {
    Texture(TextureHandle, Vec4),
    Color(Vec4),
}

/// A draw command for rendering a UI element.
pub struct DrawCommand {
    pub rect: [Vec2; 2],
    pub uv_rect: [Vec2; 2],
    pub mode: UIRenderMode,
}

impl DrawCommand {
    /// A solid rectangle at `position` of `size`.
    pub fn solid(position: Vec2, size: Vec2, color: Vec4) -> Self {
        Self {
            rect: [position, position + size],
            uv_rect: [Vec2::ZERO, Vec2::ONE],
            mode: UIRenderMode::Color(color),
        }
    }
}

/// The UI renderer for rendering 2D elements on the screen.
pub struct UIRenderer {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    pub projection_matrix: Mat4,
    mode: Option<UIRenderMode>,
    vertices: Vec<UIVertex>,
    indices: Vec<u32>,
    mesh: Mesh,
}

impl UIRenderer {
    /// Creates a new UI renderer for a window `size` logical pixels large.
    pub fn new(
        gl: &Arc<glow::Context>,
        shader_program: ShaderProgram,
        size: Vec2,
    ) -> Result<Self, String> {
        let mesh = Mesh::new_dynamic::<UIVertex>(gl, &[], &[], glow::TRIANGLES)?;
        Ok(Self {
            gl: Arc::clone(gl),
            shader_program,
            projection_matrix: Self::projection(size),
            mode: None,
            vertices: Vec::new(),
            indices: Vec::new(),
            mesh,
        })
    }

    /// Top-left origin, y pointing down.
    pub fn projection(size: Vec2) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, size.x, size.y, 0.0, -1.0, 1.0)
    }

    pub fn resize(&mut self, size: Vec2) {
        self.projection_matrix = Self::projection(size);
    }

    /// Adds a draw command to the UI renderer.
    pub fn add_command(&mut self, command: DrawCommand) {
        // A mode change flushes the current batch.
        if self.mode.is_some_and(|mode| mode != command.mode) {
            self.finish();
        }
        self.append_command(&command);
        self.mode = Some(command.mode);
    }

    /// Finishes the current batch and draws it.
    pub fn finish(&mut self) {
        self.draw_mesh();
        self.vertices.clear();
        self.indices.clear();
        self.mode = None;
    }

    fn draw_mesh(&mut self) {
        let Some(mode) = self.mode else {
            return;
        };
        if self.indices.is_empty() {
            return;
        }

        self.mesh.update(&self.vertices, &self.indices);

        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }

        self.shader_program.use_program();
        self.shader_program
            .set_uniform("u_projection", self.projection_matrix);
        match mode {
            UIRenderMode::Texture(texture_handle, color) => {
                texture_handle.bind(&self.gl, 0);
                self.shader_program.set_uniform("u_tex", 0);
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", false);
            }
            UIRenderMode::Color(color) => {
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", true);
            }
        }

        self.mesh.draw();

        unsafe {
            self.gl.disable(glow::BLEND);
        }
    }

    /// Appends a draw command's vertices and indices to the current batch.
    fn append_command(&mut self, command: &DrawCommand) {
        let base_index = self.vertices.len() as u32;
        let [min, max] = command.rect;
        let [uv_min, uv_max] = command.uv_rect;

        self.vertices.push(UIVertex {
            position: Vec2::new(max.x, min.y),
            uv: Vec2::new(uv_max.x, uv_min.y),
        });
        self.vertices.push(UIVertex {
            position: Vec2::new(min.x, min.y),
            uv: Vec2::new(uv_min.x, uv_min.y),
        });
        self.vertices.push(UIVertex {
            position: Vec2::new(min.x, max.y),
            uv: Vec2::new(uv_min.x, uv_max.y),
        });
        self.vertices.push(UIVertex {
            position: Vec2::new(max.x, max.y),
            uv: Vec2::new(uv_max.x, uv_max.y),
        });
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
    }
}
