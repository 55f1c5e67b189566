use std::rc::Rc;

use chalice_core::Color;
use glam::{Vec2, Vec4};

use crate::render::ui::{
    font::Font,
    uirenderer::{DrawCommand, UIRenderer},
    widgets::{LayoutContext, Widget},
};

/// A color chip followed by the color's hex code.
pub struct Swatch {
    pub position: Vec2,
    pub height: f32,
    pub color: Color,
    pub font_size: f32,
    font: Rc<Font>,
}

impl Swatch {
    pub fn new(color: Color, height: f32, font: &Rc<Font>) -> Self {
        Self {
            position: Vec2::ZERO,
            height,
            color,
            font_size: 8.0,
            font: Rc::clone(font),
        }
    }

    fn label(&self) -> String {
        self.color.to_hex()
    }
}

impl Widget for Swatch {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let text = self.font.measure_text(&self.label(), self.font_size);
        Vec2::new(self.height * 2.0 + 6.0 + text.x, self.height.max(text.y))
    }

    fn update(&mut self, _ctx: &crate::other::UpdateContext) {}

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint().min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        let chip = Vec2::new(self.height * 2.0, self.height);
        ui_renderer.add_command(DrawCommand::solid(
            self.position,
            chip,
            Vec4::new(0.5, 0.5, 0.5, 1.0),
        ));
        ui_renderer.add_command(DrawCommand::solid(
            self.position + Vec2::ONE,
            chip - Vec2::splat(2.0),
            self.color.to_vec4(),
        ));

        let label = self.label();
        let text_size = self.font.measure_text(&label, self.font_size);
        let offset = Vec2::new(chip.x + 6.0, ((self.height - text_size.y) / 2.0).floor());
        for mut command in self
            .font
            .text(&label, self.font_size, Vec4::new(0.85, 0.85, 0.85, 1.0))
        {
            command.rect[0] += self.position + offset;
            command.rect[1] += self.position + offset;
            ui_renderer.add_command(command);
        }
    }
}
