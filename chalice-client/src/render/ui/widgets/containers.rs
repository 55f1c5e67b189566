//! Containers that can hold multiple widgets.

use glam::{Vec2, Vec4};

use crate::render::ui::{
    uirenderer::{DrawCommand, UIRenderer},
    widgets::{LayoutContext, Widget},
};

/// Alignment options for widgets within a container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Start,
    Center,
    End,
}

/// A vertical column container that arranges its child widgets vertically.
pub struct Column {
    pub widgets: Vec<Box<dyn Widget>>,
    pub spacing: f32,
    pub alignment: Alignment,
    /// Left, top, right and bottom padding.
    pub padding: Vec4,
    pub min_size: Vec2,
    /// Fill drawn behind the children, if any.
    pub background: Option<Vec4>,
    position: Vec2,
    size: Vec2,
}

impl Column {
    /// Creates a new `Column` container with the specified spacing, alignment and padding.
    pub fn new(spacing: f32, alignment: Alignment, padding: Vec4) -> Self {
        Self {
            widgets: Vec::new(),
            spacing,
            alignment,
            padding,
            min_size: Vec2::ZERO,
            background: None,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
        }
    }

    /// Adds a widget to the column.
    pub fn add_widget<T: Widget + 'static>(&mut self, widget: T) {
        self.widgets.push(Box::new(widget));
    }

    /// Gets a certain widget by index.
    pub fn get_widget<T: Widget + 'static>(&self, index: usize) -> Option<&T> {
        self.widgets.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Gets a certain widget by index as mutable.
    pub fn get_widget_mut<T: Widget + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.widgets
            .get_mut(index)?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Where the column was last laid out, and its size.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.position, self.size)
    }
}

impl Widget for Column {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for widget in &self.widgets {
            let size = widget.size_hint();
            width = width.max(size.x);
            height += size.y;
        }

        height += self.spacing * (self.widgets.len().saturating_sub(1)) as f32;
        width += self.padding.x + self.padding.z;
        height += self.padding.y + self.padding.w;

        Vec2::new(width, height).max(self.min_size)
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        let size = self.size_hint();
        let inner_width = size.x - self.padding.x - self.padding.z;
        let mut cursor_y = ctx.cursor.y + self.padding.y;

        for widget in self.widgets.iter_mut() {
            let widget_size = widget.size_hint();
            let offset_x = self.padding.x
                + match self.alignment {
                    Alignment::Start => 0.0,
                    Alignment::Center => (inner_width - widget_size.x) / 2.0,
                    Alignment::End => inner_width - widget_size.x,
                };

            let layout_ctx = LayoutContext {
                max_size: widget_size,
                cursor: Vec2::new(ctx.cursor.x + offset_x, cursor_y),
            };

            widget.layout(&layout_ctx);
            cursor_y += widget_size.y + self.spacing;
        }

        self.position = ctx.cursor;
        self.size = size;
        size
    }

    fn update(&mut self, ctx: &crate::other::UpdateContext) {
        for widget in &mut self.widgets {
            widget.update(ctx);
        }
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        if let Some(background) = self.background {
            ui_renderer.add_command(DrawCommand::solid(self.position, self.size, background));
        }
        for widget in &self.widgets {
            widget.draw(ui_renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec2, Vec2);

    impl Widget for Fixed {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn size_hint(&self) -> Vec2 {
            self.0
        }

        fn update(&mut self, _ctx: &crate::other::UpdateContext) {}

        fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
            self.1 = ctx.cursor;
            self.0
        }

        fn draw(&self, _ui_renderer: &mut UIRenderer) {}
    }

    fn column(alignment: Alignment) -> Column {
        let mut column = Column::new(2.0, alignment, Vec4::new(4.0, 6.0, 4.0, 6.0));
        column.add_widget(Fixed(Vec2::new(100.0, 10.0), Vec2::ZERO));
        column.add_widget(Fixed(Vec2::new(50.0, 20.0), Vec2::ZERO));
        column
    }

    #[test]
    fn test_size_hint_includes_padding_and_spacing() {
        assert_eq!(column(Alignment::Start).size_hint(), Vec2::new(108.0, 44.0));
    }

    #[test]
    fn test_layout_stacks_children() {
        let mut column = column(Alignment::Start);
        column.layout(&LayoutContext {
            max_size: Vec2::splat(1000.0),
            cursor: Vec2::new(10.0, 10.0),
        });
        let first = column.get_widget::<Fixed>(0).unwrap();
        let second = column.get_widget::<Fixed>(1).unwrap();
        assert_eq!(first.1, Vec2::new(14.0, 16.0));
        assert_eq!(second.1, Vec2::new(14.0, 28.0));
        assert_eq!(column.bounds(), (Vec2::new(10.0, 10.0), Vec2::new(108.0, 44.0)));
    }

    #[test]
    fn test_layout_aligns_narrow_children() {
        let mut column = column(Alignment::End);
        column.layout(&LayoutContext {
            max_size: Vec2::splat(1000.0),
            cursor: Vec2::ZERO,
        });
        assert_eq!(column.get_widget::<Fixed>(1).unwrap().1.x, 54.0);
    }
}
