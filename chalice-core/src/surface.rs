//! The render surface handle.
//!
//! The root application owns exactly one [`SurfaceSlot`]. It records the surface once the window
//! has created it and forwards background changes to it. Changes that arrive before the surface
//! exists are held back, and only the latest one is applied when the surface attaches.

use crate::Color;

/// An output target that can be cleared to a color.
pub trait RenderSurface {
    fn set_clear_color(&mut self, color: Color);
}

/// Owns the render surface once it exists.
pub struct SurfaceSlot<S> {
    surface: Option<S>,
    clear_color: Color,
}

impl<S: RenderSurface> SurfaceSlot<S> {
    pub fn new(clear_color: Color) -> Self {
        Self {
            surface: None,
            clear_color,
        }
    }

    /// Records the surface and applies the current clear color to it.
    pub fn attach(&mut self, mut surface: S) {
        surface.set_clear_color(self.clear_color);
        self.surface = Some(surface);
    }

    /// Updates the clear color. Without a surface this only remembers the value.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_clear_color(color);
        }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Gives the surface back, leaving the slot empty.
    pub fn detach(&mut self) -> Option<S> {
        self.surface.take()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// Records every clear-color call. Clones share the same log.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSurface {
        pub calls: Rc<RefCell<Vec<Color>>>,
    }

    impl RenderSurface for RecordingSurface {
        fn set_clear_color(&mut self, color: Color) {
            self.calls.borrow_mut().push(color);
        }
    }

    #[test]
    fn test_updates_before_attach_are_deferred() {
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        let mut slot = SurfaceSlot::new(Color::WHITE);

        slot.set_clear_color(Color::new(1, 0, 0));
        slot.set_clear_color(Color::new(2, 0, 0));
        assert!(calls.borrow().is_empty());

        slot.attach(surface);
        assert_eq!(*calls.borrow(), vec![Color::new(2, 0, 0)]);
    }

    #[test]
    fn test_one_call_per_update_after_attach() {
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        let mut slot = SurfaceSlot::new(Color::WHITE);
        slot.attach(surface);
        slot.set_clear_color(Color::BLACK);

        assert_eq!(*calls.borrow(), vec![Color::WHITE, Color::BLACK]);
        assert_eq!(slot.clear_color(), Color::BLACK);
    }

    #[test]
    fn test_detach_stops_updates() {
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        let mut slot = SurfaceSlot::new(Color::WHITE);
        slot.attach(surface);
        assert!(slot.detach().is_some());
        slot.set_clear_color(Color::BLACK);
        assert_eq!(calls.borrow().len(), 1);
        assert!(!slot.is_attached());
    }
}
