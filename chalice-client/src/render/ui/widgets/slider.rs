use std::rc::Rc;

use glam::{Vec2, Vec4};
use sdl2::mouse::MouseButton;

use crate::render::ui::{
    font::Font,
    uirenderer::{DrawCommand, UIRenderer},
    widgets::{LayoutContext, Widget, contains},
};

/// Maps a cursor at `x` over a track spanning `left..left + width` to a value in `min..=max`.
pub fn value_at(x: f32, left: f32, width: f32, min: f32, max: f32) -> f32 {
    let t = ((x - left) / width.max(1.0)).clamp(0.0, 1.0);
    min + (max - min) * t
}

/// A horizontal slider with its label and value printed over the track.
pub struct Slider {
    pub position: Vec2,
    pub size: Vec2,
    pub label: String,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub decimals: usize,
    pub fill: Vec4,
    pub font_size: f32,
    dragging: bool,
    changed: bool,
    font: Rc<Font>,
}

impl Slider {
    pub fn new(label: &str, value: f32, range: (f32, f32), size: Vec2, font: &Rc<Font>) -> Self {
        Self {
            position: Vec2::ZERO,
            size,
            label: label.to_string(),
            value,
            min: range.0,
            max: range.1,
            decimals: 2,
            fill: Vec4::new(0.3, 0.45, 0.9, 1.0),
            font_size: 8.0,
            dragging: false,
            changed: false,
            font: Rc::clone(font),
        }
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_fill(mut self, fill: Vec4) -> Self {
        self.fill = fill;
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The value the user dragged to this frame, if it moved.
    pub fn take_change(&mut self) -> Option<f32> {
        std::mem::take(&mut self.changed).then_some(self.value)
    }

    fn fraction(&self) -> f32 {
        if self.max > self.min {
            ((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Widget for Slider {
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
        let mouse = ctx.mouse;
        if mouse.pressed.contains(&MouseButton::Left)
            && contains(self.position, self.size, mouse.position)
        {
            self.dragging = true;
        }
        if !mouse.down.contains(&MouseButton::Left) {
            self.dragging = false;
        }
        if self.dragging {
            let value = value_at(
                mouse.position.x,
                self.position.x,
                self.size.x,
                self.min,
                self.max,
            );
            if value != self.value {
                self.value = value;
                self.changed = true;
            }
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size.min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        ui_renderer.add_command(DrawCommand::solid(
            self.position,
            self.size,
            Vec4::new(0.16, 0.16, 0.18, 1.0),
        ));
        ui_renderer.add_command(DrawCommand::solid(
            self.position,
            Vec2::new(self.size.x * self.fraction(), self.size.y),
            self.fill,
        ));

        let text = format!("{} {:.*}", self.label, self.decimals, self.value);
        let text_size = self.font.measure_text(&text, self.font_size);
        let offset = Vec2::new(4.0, ((self.size.y - text_size.y) / 2.0).floor());
        for mut command in self.font.text(&text, self.font_size, Vec4::ONE) {
            command.rect[0] += self.position + offset;
            command.rect[1] += self.position + offset;
            ui_renderer.add_command(command);
        }
    }
}
