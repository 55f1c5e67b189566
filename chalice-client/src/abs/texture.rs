//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which owns a GPU texture, and [`TextureHandle`], a
//! copyable reference to one that UI draw commands can carry.

use std::{num::NonZero, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

/// Represents a handle to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub NonZero<u32>);

impl TextureHandle {
    /// Binds the texture handle to the specified texture unit.
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(self.0)));
        }
    }
}

/// Sampling used when the texture is magnified or minified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

impl Filter {
    fn gl(self) -> i32 {
        match self {
            Filter::Nearest => glow::NEAREST as i32,
            Filter::Linear => glow::LINEAR as i32,
        }
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    pub(super) gl: Arc<glow::Context>,
    pub(super) id: glow::Texture,
    pub(super) width: u32,
    pub(super) height: u32,
}

impl Texture {
    /// Uploads an [`image::DynamicImage`] as an RGBA8 texture.
    pub fn new(gl: &Arc<glow::Context>, image: &DynamicImage, filter: Filter) -> Result<Self, String> {
        let (width, height) = image.dimensions();
        let data = image.to_rgba8().into_raw();
        Self::with_storage(
            gl,
            width,
            height,
            glow::RGBA8 as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(&data),
            filter,
        )
    }

    /// Allocates an uninitialized texture, e.g. as a render target.
    pub fn empty(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        internal_format: i32,
        format: u32,
        ty: u32,
        filter: Filter,
    ) -> Result<Self, String> {
        Self::with_storage(gl, width, height, internal_format, format, ty, None, filter)
    }

    #[allow(clippy::too_many_arguments)]
    fn with_storage(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        internal_format: i32,
        format: u32,
        ty: u32,
        data: Option<&[u8]>,
        filter: Filter,
    ) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                width as i32,
                height as i32,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(data),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter.gl());
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter.gl());
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                width,
                height,
            })
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a handle to the texture.
    pub fn handle(&self) -> TextureHandle {
        TextureHandle(self.id.0)
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}
