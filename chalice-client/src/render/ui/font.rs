//! The built-in bitmap font.
//!
//! Glyphs are 5x7 pixel bitmaps, one byte per row with the leftmost pixel in bit 4. They are
//! rasterized into an atlas of 6x8 cells at startup, so the client ships no font file. Lowercase
//! letters render as uppercase and anything without a glyph renders as `?`.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::{
    abs::{Filter, Texture},
    render::ui::uirenderer::{DrawCommand, UIRenderMode},
};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
pub const CELL_WIDTH: u32 = 6;
pub const CELL_HEIGHT: u32 = 8;
const ATLAS_COLUMNS: u32 = 16;

#[rustfmt::skip]
const GLYPHS: &[(char, [u8; 7])] = &[
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('!', [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04]),
    ('#', [0x0a, 0x0a, 0x1f, 0x0a, 0x1f, 0x0a, 0x0a]),
    ('%', [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03]),
    ('\'', [0x04, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('(', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    (')', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    ('+', [0x00, 0x04, 0x04, 0x1f, 0x04, 0x04, 0x00]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x0c, 0x04, 0x08]),
    ('-', [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c]),
    ('/', [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00]),
    ('0', [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e]),
    ('1', [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('2', [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f]),
    ('3', [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e]),
    ('4', [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02]),
    ('5', [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e]),
    ('6', [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e]),
    ('7', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e]),
    ('9', [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c]),
    (':', [0x00, 0x0c, 0x0c, 0x00, 0x0c, 0x0c, 0x00]),
    ('=', [0x00, 0x00, 0x1f, 0x00, 0x1f, 0x00, 0x00]),
    ('?', [0x0e, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04]),
    ('A', [0x0e, 0x11, 0x11, 0x11, 0x1f, 0x11, 0x11]),
    ('B', [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e]),
    ('C', [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e]),
    ('D', [0x1c, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1c]),
    ('E', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f]),
    ('F', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10]),
    ('G', [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0f]),
    ('H', [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('I', [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0c]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f]),
    ('M', [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('P', [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10]),
    ('Q', [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d]),
    ('R', [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11]),
    ('S', [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e]),
    ('T', [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0a, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0a]),
    ('X', [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x11, 0x0a, 0x04, 0x04, 0x04]),
    ('Z', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1f]),
];

/// Index of the glyph drawn for `c`.
pub fn glyph_index(c: char) -> usize {
    let c = c.to_ascii_uppercase();
    GLYPHS
        .iter()
        .position(|(g, _)| *g == c)
        .or_else(|| GLYPHS.iter().position(|(g, _)| *g == '?'))
        .unwrap_or(0)
}

/// Rasterizes every glyph into a white-on-transparent atlas.
pub fn rasterize_atlas() -> RgbaImage {
    let rows = (GLYPHS.len() as u32).div_ceil(ATLAS_COLUMNS);
    let mut atlas = RgbaImage::new(ATLAS_COLUMNS * CELL_WIDTH, rows * CELL_HEIGHT);
    for (index, (_, bitmap)) in GLYPHS.iter().enumerate() {
        let (ox, oy) = cell_origin(index);
        for (y, row) in bitmap.iter().enumerate() {
            for x in 0..GLYPH_WIDTH {
                if row & (1 << (GLYPH_WIDTH - 1 - x)) != 0 {
                    atlas.put_pixel(ox + x, oy + y as u32, Rgba([255, 255, 255, 255]));
                }
            }
        }
    }
    atlas
}

fn cell_origin(index: usize) -> (u32, u32) {
    let index = index as u32;
    (
        (index % ATLAS_COLUMNS) * CELL_WIDTH,
        (index / ATLAS_COLUMNS) * CELL_HEIGHT,
    )
}

/// Size of `text` drawn at `font_size` pixels per line.
pub fn measure(text: &str, font_size: f32) -> Vec2 {
    let char_width = font_size * CELL_WIDTH as f32 / CELL_HEIGHT as f32;
    let lines = text.split('\n');
    let (count, widest) = lines.fold((0usize, 0usize), |(count, widest), line| {
        (count + 1, widest.max(line.chars().count()))
    });
    Vec2::new(widest as f32 * char_width, count as f32 * font_size)
}

pub struct Font {
    atlas: Texture,
}

impl Font {
    /// Rasterizes the glyphs and uploads the atlas.
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self, String> {
        let image = DynamicImage::ImageRgba8(rasterize_atlas());
        let atlas = Texture::new(gl, &image, Filter::Nearest)?;
        Ok(Self { atlas })
    }

    pub fn glyph_uvs(&self, c: char) -> [Vec2; 2] {
        let (x, y) = cell_origin(glyph_index(c));
        let size = Vec2::new(self.atlas.width() as f32, self.atlas.height() as f32);
        let min = Vec2::new(x as f32, y as f32) / size;
        let max = min + Vec2::new(CELL_WIDTH as f32, CELL_HEIGHT as f32) / size;
        [min, max]
    }

    pub fn measure_text(&self, text: &str, font_size: f32) -> Vec2 {
        measure(text, font_size)
    }

    pub fn char_size(&self, font_size: f32) -> Vec2 {
        Vec2::new(font_size * CELL_WIDTH as f32 / CELL_HEIGHT as f32, font_size)
    }

    /// Draw commands for `text` with its top-left corner at the origin.
    pub fn text(&self, text: &str, font_size: f32, color: Vec4) -> Vec<DrawCommand> {
        let mut commands = Vec::new();
        let mut cursor = Vec2::ZERO;
        let char_size = self.char_size(font_size);

        for line in text.lines() {
            for c in line.chars() {
                if c != ' ' {
                    commands.push(DrawCommand {
                        rect: [cursor, cursor + char_size],
                        uv_rect: self.glyph_uvs(c),
                        mode: UIRenderMode::Texture(self.atlas.handle(), color),
                    });
                }
                cursor.x += char_size.x;
            }
            cursor.x = 0.0;
            cursor.y += char_size.y;
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_maps_to_uppercase() {
        assert_eq!(glyph_index('a'), glyph_index('A'));
        assert_eq!(glyph_index('z'), glyph_index('Z'));
    }

    #[test]
    fn test_unknown_characters_use_question_mark() {
        let question = glyph_index('?');
        assert_eq!(glyph_index('~'), question);
        assert_eq!(glyph_index('é'), question);
        assert_ne!(glyph_index('#'), question);
    }

    #[test]
    fn test_glyph_table_has_no_duplicates() {
        for (i, (c, _)) in GLYPHS.iter().enumerate() {
            assert_eq!(glyph_index(*c), i, "duplicate glyph {:?}", c);
        }
    }

    #[test]
    fn test_atlas_pixels_match_bitmaps() {
        let atlas = rasterize_atlas();
        assert_eq!(atlas.width(), ATLAS_COLUMNS * CELL_WIDTH);
        // The top row of '1' is only its middle pixel.
        let (ox, oy) = cell_origin(glyph_index('1'));
        let lit: Vec<bool> = (0..GLYPH_WIDTH)
            .map(|x| atlas.get_pixel(ox + x, oy)[3] == 255)
            .collect();
        assert_eq!(lit, vec![false, false, true, false, false]);
        // The spacing column stays empty.
        assert_eq!(atlas.get_pixel(ox + GLYPH_WIDTH, oy + 3)[3], 0);
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("", 16.0), Vec2::new(0.0, 16.0));
        assert_eq!(measure("ABCD", 16.0), Vec2::new(48.0, 16.0));
        assert_eq!(measure("AB\nABCD", 8.0), Vec2::new(24.0, 16.0));
    }
}
