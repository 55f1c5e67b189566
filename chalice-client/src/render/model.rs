//! The model pass: draws the scene's meshes lit by the procedural studio environment.

use std::{collections::HashMap, sync::Arc};

use chalice_core::{
    asset::MeshData,
    scene::{DrawItem, EnvironmentLight},
};
use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::abs::{Mesh, ShaderProgram, Vertex};

#[repr(C)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex for ModelVertex {
    fn vertex_attribs(gl: &glow::Context) {
        unsafe {
            let stride = std::mem::size_of::<ModelVertex>() as i32;
            // Position attribute
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            // Normal attribute
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(
                1,
                3,
                glow::FLOAT,
                false,
                stride,
                3 * std::mem::size_of::<f32>() as i32,
            );
        }
    }
}

impl ModelVertex {
    pub fn from_mesh(mesh: &MeshData) -> Vec<ModelVertex> {
        mesh.positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| ModelVertex { position, normal })
            .collect()
    }
}

/// Per-frame camera inputs of the model pass.
pub struct CameraUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
}

/// Draws [`DrawItem`]s, uploading each geometry the first time it is seen.
pub struct ModelRenderer {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    meshes: HashMap<(std::path::PathBuf, String), Mesh>,
}

impl ModelRenderer {
    pub fn new(gl: &Arc<glow::Context>, shader_program: ShaderProgram) -> Self {
        Self {
            gl: Arc::clone(gl),
            shader_program,
            meshes: HashMap::new(),
        }
    }

    /// Draws every item into the bound framebuffer. Items whose geometry or material is missing
    /// from their asset are skipped.
    pub fn draw(
        &mut self,
        items: &[DrawItem],
        camera: &CameraUniforms,
        environment: Option<EnvironmentLight>,
    ) -> Result<(), String> {
        let environment = environment.unwrap_or(EnvironmentLight {
            intensity: 0.0,
            highlight: chalice_core::Color::BLACK,
        });

        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.enable(glow::CULL_FACE);
        }

        self.shader_program.use_program();
        self.shader_program.set_uniform("u_view", camera.view);
        self.shader_program
            .set_uniform("u_projection", camera.projection);
        self.shader_program.set_uniform("u_eye", camera.eye);
        self.shader_program
            .set_uniform("u_env_intensity", environment.intensity);
        self.shader_program
            .set_uniform("u_highlight", environment.highlight.to_linear());

        for item in items {
            let (Some(geometry), Some(material)) = (item.mesh.geometry(), item.mesh.material())
            else {
                continue;
            };

            let key = (item.mesh.asset.path.clone(), item.mesh.geometry.clone());
            if !self.meshes.contains_key(&key) {
                let vertices = ModelVertex::from_mesh(geometry);
                let mesh = Mesh::new_static(&self.gl, &vertices, &geometry.indices, glow::TRIANGLES)?;
                log::debug!(
                    "Uploaded mesh {} ({} vertices, {} indices)",
                    geometry.name,
                    vertices.len(),
                    geometry.indices.len()
                );
                self.meshes.insert(key.clone(), mesh);
            }

            // A negative determinant flips the winding order.
            unsafe {
                self.gl.front_face(if item.world.determinant() < 0.0 {
                    glow::CW
                } else {
                    glow::CCW
                });
            }

            self.shader_program.set_uniform("u_model", item.world);
            self.shader_program
                .set_uniform("u_base_color", material.base_color);
            self.shader_program
                .set_uniform("u_metallic", material.metallic);
            self.shader_program
                .set_uniform("u_roughness", material.roughness);
            self.shader_program
                .set_uniform("u_emissive", material.emissive);

            if let Some(mesh) = self.meshes.get(&key) {
                mesh.draw();
            }
        }

        unsafe {
            self.gl.front_face(glow::CCW);
            self.gl.disable(glow::CULL_FACE);
            self.gl.disable(glow::DEPTH_TEST);
        }
        Ok(())
    }

    /// Number of geometries uploaded to the GPU.
    pub fn uploaded(&self) -> usize {
        self.meshes.len()
    }
}
