//! Thin wrappers around SDL2 and OpenGL objects: the window and context, shaders, meshes,
//! textures and framebuffers. Every wrapper frees its GL object on drop.

pub mod app;
pub mod framebuffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use framebuffer::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
