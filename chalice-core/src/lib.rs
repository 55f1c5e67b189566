//! The core of the chalice viewer. This crate contains everything that does not
//! need a window or a GPU: the tunable scene parameters, responsive sizing,
//! asset loading, scene-graph composition and the root application state.

use glam::{Vec3, Vec4};

pub mod anim;
pub mod app;
pub mod asset;
pub mod controls;
pub mod model;
pub mod observe;
pub mod orbit;
pub mod postprocess;
pub mod scene;
pub mod surface;
pub mod viewport;

/// An 8-bit sRGB color, as edited in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as normalized sRGB components.
    pub fn to_srgb(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Returns the color converted to linear light, for use in lighting.
    pub fn to_linear(self) -> Vec3 {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let srgb = self.to_srgb();
        Vec3::new(channel(srgb.x), channel(srgb.y), channel(srgb.z))
    }

    /// Returns the color as an opaque RGBA vector in sRGB space.
    pub fn to_vec4(self) -> Vec4 {
        self.to_srgb().extend(1.0)
    }

    /// Formats the color as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    /// Parses `#rrggbb` or the short `#rgb` form. The leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid color code: {}", s));
        }
        match hex.len() {
            6 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 2], 16)
                        .map_err(|_| format!("Invalid color channel in {}", s))
                };
                Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| format!("Invalid color channel in {}", s))
                };
                Ok(Color::new(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(format!("Invalid color code: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("#ffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!(
            "#066aff".parse::<Color>().unwrap(),
            Color::new(0x06, 0x6a, 0xff)
        );
        assert_eq!("0af".parse::<Color>().unwrap(), Color::new(0x00, 0xaa, 0xff));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_formatting() {
        assert_eq!(Color::new(0x06, 0x6a, 0xff).to_string(), "#066aff");
        assert_eq!(Color::WHITE.to_vec4(), Vec4::ONE);
    }

    #[test]
    fn test_linear_conversion_keeps_extremes() {
        assert_eq!(Color::BLACK.to_linear(), Vec3::ZERO);
        let white = Color::WHITE.to_linear();
        assert!((white - Vec3::ONE).abs().max_element() < 1e-5);
        let mid = Color::new(128, 128, 128).to_linear();
        assert!(mid.x > 0.2 && mid.x < 0.23);
    }
}
