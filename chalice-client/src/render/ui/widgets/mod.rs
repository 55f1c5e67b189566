//! Contains all widgets and the `Widget` trait for building user interfaces.

use glam::Vec2;

use super::uirenderer::UIRenderer;
use crate::other::UpdateContext;

/// Context provided to widgets during the layout phase.
pub struct LayoutContext {
    pub max_size: Vec2,
    pub cursor: Vec2,
}

/// A widget trait for building user interfaces.
pub trait Widget {
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Gives a hint of the desired size of the widget.
    fn size_hint(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Updates the widget state.
    fn update(&mut self, ctx: &UpdateContext);

    /// Updates the widget layout given the available space.
    fn layout(&mut self, ctx: &LayoutContext) -> Vec2;

    /// Draws the widget with the given UI renderer.
    fn draw(&self, ui_renderer: &mut UIRenderer);
}

/// Whether `point` lies inside the rectangle at `position` of `size`.
pub fn contains(position: Vec2, size: Vec2, point: Vec2) -> bool {
    point.x >= position.x
        && point.x <= position.x + size.x
        && point.y >= position.y
        && point.y <= position.y + size.y
}

pub mod button;
pub mod containers;
pub mod label;
pub mod slider;
pub mod swatch;

pub use button::*;
pub use containers::*;
pub use label::*;
pub use slider::*;
pub use swatch::*;
