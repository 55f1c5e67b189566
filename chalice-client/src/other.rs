use std::collections::HashSet;

use glam::Vec2;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    mouse::MouseButton,
};

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

/// The current state of the mouse, in logical window pixels.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub scroll_delta: Vec2,
}

impl KeyboardState {
    /// Clears the per-frame edges. Call before pumping the frame's events.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::KeyDown {
                keycode: Some(key),
                repeat: false,
                ..
            } => {
                self.down.insert(*key);
                self.pressed.insert(*key);
            }
            Event::KeyUp {
                keycode: Some(key), ..
            } => {
                self.down.remove(key);
                self.released.insert(*key);
            }
            _ => {}
        }
    }
}

impl MouseState {
    /// Clears the per-frame edges and motion. Call before pumping the frame's events.
    pub fn begin_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.pressed.clear();
        self.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => {
                self.position = Vec2::new(*x as f32, *y as f32);
                self.delta += Vec2::new(*xrel as f32, *yrel as f32);
            }
            Event::MouseButtonDown { mouse_btn, .. } => {
                self.down.insert(*mouse_btn);
                self.pressed.insert(*mouse_btn);
            }
            Event::MouseButtonUp { mouse_btn, .. } => {
                self.down.remove(mouse_btn);
                self.released.insert(*mouse_btn);
            }
            Event::MouseWheel {
                precise_x,
                precise_y,
                ..
            } => {
                self.scroll_delta += Vec2::new(*precise_x, *precise_y);
            }
            _ => {}
        }
    }
}

/// Context provided to widgets during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard and mouse states and delta time.
    pub fn new(keyboard: &'a KeyboardState, mouse: &'a MouseState, delta_time: f32) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
        }
    }
}

/// Returns the new drawable size if the event resizes the window.
///
/// Both `Resized` and `SizeChanged` are reported, since SDL only sends the former for
/// user or window-manager resizes.
pub fn resized_to(event: &Event) -> Option<(u32, u32)> {
    match event {
        Event::Window {
            win_event:
                WindowEvent::Resized(width, height) | WindowEvent::SizeChanged(width, height),
            ..
        } => Some(((*width).max(0) as u32, (*height).max(0) as u32)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(win_event: WindowEvent) -> Event {
        Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event,
        }
    }

    #[test]
    fn test_both_resize_events_are_reported() {
        assert_eq!(
            resized_to(&window(WindowEvent::Resized(800, 600))),
            Some((800, 600))
        );
        assert_eq!(
            resized_to(&window(WindowEvent::SizeChanged(1024, 768))),
            Some((1024, 768))
        );
        assert_eq!(resized_to(&window(WindowEvent::Exposed)), None);
        assert_eq!(resized_to(&Event::Quit { timestamp: 0 }), None);
    }

    #[test]
    fn test_negative_sizes_clamp_to_zero() {
        assert_eq!(
            resized_to(&window(WindowEvent::SizeChanged(-5, 10))),
            Some((0, 10))
        );
    }
}
