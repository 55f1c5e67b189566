use std::rc::Rc;

use glam::{Vec2, Vec4};

use crate::render::ui::{
    font::Font,
    uirenderer::UIRenderer,
    widgets::{LayoutContext, Widget},
};

pub struct Label {
    pub text: String,
    pub position: Vec2,
    pub font_size: f32,
    pub color: Vec4,
    pub font: Rc<Font>,
}

impl Label {
    pub fn new(text: &str, font_size: f32, color: Vec4, font: &Rc<Font>) -> Self {
        Self {
            text: text.to_string(),
            position: Vec2::ZERO,
            font_size,
            color,
            font: Rc::clone(font),
        }
    }
}

impl Widget for Label {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.font.measure_text(&self.text, self.font_size)
    }

    fn update(&mut self, _ctx: &crate::other::UpdateContext) {}

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint().min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        for mut command in self.font.text(&self.text, self.font_size, self.color) {
            command.rect[0] += self.position;
            command.rect[1] += self.position;
            ui_renderer.add_command(command);
        }
    }
}
