use std::rc::Rc;

use glam::{Vec2, Vec4};
use sdl2::mouse::MouseButton;

use crate::render::ui::{
    font::Font,
    uirenderer::{DrawCommand, UIRenderer},
    widgets::{LayoutContext, Widget, contains},
};

/// A flat clickable bar with a left-aligned label.
pub struct Button {
    pub position: Vec2,
    pub size: Vec2,
    pub label: String,
    pub label_color: Vec4,
    pub label_font_size: f32,
    pub background: Vec4,
    is_down: bool,
    is_down_last: bool,
    hovered: bool,
    font: Rc<Font>,
}

impl Button {
    pub fn new(
        label: &str,
        label_color: Vec4,
        label_font_size: f32,
        size: Vec2,
        background: Vec4,
        font: &Rc<Font>,
    ) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            label: label.to_string(),
            label_color,
            label_font_size,
            background,
            is_down: false,
            is_down_last: false,
            hovered: false,
            font: Rc::clone(font),
        }
    }

    /// True on the frame the button is let go while still hovered.
    pub fn is_released(&self) -> bool {
        !self.is_down && self.is_down_last && self.hovered
    }
}

impl Widget for Button {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, ctx: &crate::other::UpdateContext) {
        self.is_down_last = self.is_down;
        self.hovered = contains(self.position, self.size, ctx.mouse.position);
        self.is_down = ctx.mouse.down.contains(&MouseButton::Left) && self.hovered;
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size.min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        let tint = if self.is_down {
            0.8
        } else if self.hovered {
            1.2
        } else {
            1.0
        };
        let background = (self.background.truncate() * tint).extend(self.background.w);
        ui_renderer.add_command(DrawCommand::solid(self.position, self.size, background));

        let text_size = self.font.measure_text(&self.label, self.label_font_size);
        let offset = Vec2::new(
            self.label_font_size * 0.5,
            ((self.size.y - text_size.y) / 2.0).floor(),
        );
        for mut command in self
            .font
            .text(&self.label, self.label_font_size, self.label_color)
        {
            command.rect[0] += self.position + offset;
            command.rect[1] += self.position + offset;
            ui_renderer.add_command(command);
        }
    }
}
