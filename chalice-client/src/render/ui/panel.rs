//! The debug panel: an on-screen editor for the [`ControlPanel`].
//!
//! The panel starts collapsed to its title bar. Expanded, it lists each folder with its
//! controls: a slider for numbers, and red/green/blue sliders plus a swatch for colors. Edits go
//! through [`ControlPanel::set`], so the rest of the application sees them as ordinary
//! parameter changes. A model load failure is shown as a status line under the title.

use std::rc::Rc;

use chalice_core::{
    Color,
    controls::{ControlPanel, ControlSpec, ControlValue},
};
use glam::{Vec2, Vec4};

use crate::{
    other::UpdateContext,
    render::ui::{
        font::{CELL_HEIGHT, CELL_WIDTH, Font},
        uirenderer::UIRenderer,
        widgets::{Alignment, Button, Column, LayoutContext, Label, Slider, Swatch, Widget, contains},
    },
};

pub const PANEL_WIDTH: f32 = 260.0;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 16.0;
const FONT_SIZE: f32 = 8.0;

const TITLE_COLOR: Vec4 = Vec4::new(0.1, 0.1, 0.12, 1.0);
const FOLDER_COLOR: Vec4 = Vec4::new(0.2, 0.2, 0.23, 1.0);
const BACKGROUND: Vec4 = Vec4::new(0.07, 0.07, 0.08, 0.92);
const TEXT_COLOR: Vec4 = Vec4::new(0.9, 0.9, 0.9, 1.0);
const ERROR_COLOR: Vec4 = Vec4::new(1.0, 0.35, 0.35, 1.0);

/// One line of the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Title {
        collapsed: bool,
    },
    Status(String),
    Folder {
        index: usize,
        name: &'static str,
        collapsed: bool,
    },
    Number {
        key: &'static str,
        label: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    ColorLabel(&'static str),
    Channel {
        key: &'static str,
        channel: usize,
        value: u8,
    },
    Swatch {
        key: &'static str,
        color: Color,
    },
}

const CHANNELS: [&str; 3] = ["R", "G", "B"];

fn channels(color: Color) -> [u8; 3] {
    [color.r, color.g, color.b]
}

/// `color` with one channel (0 red, 1 green, 2 blue) replaced.
pub fn with_channel(color: Color, channel: usize, value: u8) -> Color {
    let mut c = channels(color);
    if let Some(slot) = c.get_mut(channel) {
        *slot = value;
    }
    Color::new(c[0], c[1], c[2])
}

/// Clamps and snaps a dragged number to its control's declared range and step.
pub fn normalized(panel: &ControlPanel, key: &str, value: f32) -> f32 {
    panel
        .control(key)
        .map_or(value, |control| control.spec.normalize(value))
}

/// The panel's lines for the current state.
pub fn rows(panel: &ControlPanel, status: Option<&str>) -> Vec<Row> {
    let mut rows = vec![Row::Title {
        collapsed: panel.collapsed,
    }];
    if let Some(status) = status {
        rows.push(Row::Status(status.to_string()));
    }
    if panel.collapsed {
        return rows;
    }

    for (index, folder) in panel.folders().iter().enumerate() {
        rows.push(Row::Folder {
            index,
            name: folder.name,
            collapsed: folder.collapsed,
        });
        if folder.collapsed {
            continue;
        }
        for control in &folder.controls {
            match (control.spec, panel.value(control.key)) {
                (ControlSpec::Number { min, max, .. }, Ok(ControlValue::Number(value))) => {
                    rows.push(Row::Number {
                        key: control.key,
                        label: control.label,
                        value,
                        min,
                        max,
                    });
                }
                (ControlSpec::Color { .. }, Ok(ControlValue::Color(color))) => {
                    rows.push(Row::ColorLabel(control.label));
                    for (channel, value) in channels(color).into_iter().enumerate() {
                        rows.push(Row::Channel {
                            key: control.key,
                            channel,
                            value,
                        });
                    }
                    rows.push(Row::Swatch {
                        key: control.key,
                        color,
                    });
                }
                _ => log::warn!("Control {} has no readable value", control.key),
            }
        }
    }
    rows
}

/// Whether two row lists have the same lines, ignoring the values shown on them.
fn same_structure(a: &[Row], b: &[Row]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|pair| match pair {
            (Row::Number { key: x, .. }, Row::Number { key: y, .. }) => x == y,
            (
                Row::Channel {
                    key: x, channel: i, ..
                },
                Row::Channel {
                    key: y, channel: j, ..
                },
            ) => x == y && i == j,
            (Row::Swatch { key: x, .. }, Row::Swatch { key: y, .. }) => x == y,
            (x, y) => x == y,
        })
}

/// Breaks `text` into lines of at most `max_chars` characters.
pub fn wrap(text: &str, max_chars: usize) -> String {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct DebugPanel {
    font: Rc<Font>,
    column: Column,
    rows: Vec<Row>,
}

impl DebugPanel {
    pub fn new(font: &Rc<Font>, panel: &ControlPanel, status: Option<&str>) -> Self {
        let mut debug_panel = Self {
            font: Rc::clone(font),
            column: Column::new(3.0, Alignment::Start, Vec4::splat(0.0)),
            rows: Vec::new(),
        };
        debug_panel.rebuild(rows(panel, status));
        debug_panel
    }

    fn rebuild(&mut self, rows: Vec<Row>) {
        let mut column = Column::new(3.0, Alignment::Start, Vec4::new(0.0, 0.0, 0.0, 6.0));
        column.min_size = Vec2::new(PANEL_WIDTH, 0.0);
        column.background = Some(BACKGROUND);

        let full = Vec2::new(PANEL_WIDTH, ROW_HEIGHT);
        let inset = Vec2::new(PANEL_WIDTH - 16.0, ROW_HEIGHT);
        let char_width = FONT_SIZE * CELL_WIDTH as f32 / CELL_HEIGHT as f32;

        for row in &rows {
            match row {
                Row::Title { collapsed } => {
                    let marker = if *collapsed { "+" } else { "-" };
                    column.add_widget(Button::new(
                        &format!("{} CONTROLS", marker),
                        TEXT_COLOR,
                        FONT_SIZE,
                        Vec2::new(PANEL_WIDTH, ROW_HEIGHT + 4.0),
                        TITLE_COLOR,
                        &self.font,
                    ));
                }
                Row::Status(text) => {
                    let max_chars = ((PANEL_WIDTH - 16.0) / char_width) as usize;
                    column.add_widget(Indented(Label::new(
                        &wrap(text, max_chars),
                        FONT_SIZE,
                        ERROR_COLOR,
                        &self.font,
                    )));
                }
                Row::Folder {
                    name, collapsed, ..
                } => {
                    let marker = if *collapsed { "+" } else { "-" };
                    column.add_widget(Button::new(
                        &format!("{} {}", marker, name),
                        TEXT_COLOR,
                        FONT_SIZE,
                        full,
                        FOLDER_COLOR,
                        &self.font,
                    ));
                }
                Row::Number {
                    label,
                    value,
                    min,
                    max,
                    ..
                } => {
                    column.add_widget(Indented(
                        Slider::new(label, *value, (*min, *max), inset, &self.font)
                            .with_decimals(1),
                    ));
                }
                Row::ColorLabel(label) => {
                    column.add_widget(Indented(Label::new(
                        label,
                        FONT_SIZE,
                        TEXT_COLOR,
                        &self.font,
                    )));
                }
                Row::Channel { channel, value, .. } => {
                    let mut fill = Vec4::new(0.25, 0.25, 0.25, 1.0);
                    fill[*channel] = 0.75;
                    column.add_widget(Indented(
                        Slider::new(
                            CHANNELS[*channel],
                            *value as f32,
                            (0.0, 255.0),
                            inset,
                            &self.font,
                        )
                        .with_decimals(0)
                        .with_fill(fill),
                    ));
                }
                Row::Swatch { color, .. } => {
                    column.add_widget(Indented(Swatch::new(*color, 12.0, &self.font)));
                }
            }
        }

        self.column = column;
        self.rows = rows;
    }

    /// Shows current values on the existing widgets.
    fn sync(&mut self, rows: Vec<Row>) {
        for (i, row) in rows.iter().enumerate() {
            match row {
                Row::Number { value, .. } => {
                    if let Some(slider) = self.indented_mut::<Slider>(i) {
                        slider.value = *value;
                    }
                }
                Row::Channel { value, .. } => {
                    if let Some(slider) = self.indented_mut::<Slider>(i) {
                        slider.value = *value as f32;
                    }
                }
                Row::Swatch { color, .. } => {
                    if let Some(swatch) = self.indented_mut::<Swatch>(i) {
                        swatch.color = *color;
                    }
                }
                _ => {}
            }
        }
        self.rows = rows;
    }

    fn indented_mut<T: Widget + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.column
            .get_widget_mut::<Indented<T>>(index)
            .map(|w| &mut w.0)
    }

    /// Feeds input to the widgets and applies the resulting edits to `panel`.
    pub fn update(&mut self, ctx: &UpdateContext, panel: &mut ControlPanel, status: Option<&str>) {
        self.column.update(ctx);

        let mut restructure = false;
        for i in 0..self.rows.len() {
            let row = self.rows[i].clone();
            match row {
                Row::Title { .. } => {
                    if self
                        .column
                        .get_widget::<Button>(i)
                        .is_some_and(|b| b.is_released())
                    {
                        panel.collapsed = !panel.collapsed;
                        restructure = true;
                    }
                }
                Row::Folder { index, .. } => {
                    if self
                        .column
                        .get_widget::<Button>(i)
                        .is_some_and(|b| b.is_released())
                    {
                        if let Some(folder) = panel.folders_mut().get_mut(index) {
                            folder.collapsed = !folder.collapsed;
                        }
                        restructure = true;
                    }
                }
                Row::Number { key, .. } => {
                    if let Some(value) = self.indented_mut::<Slider>(i).and_then(|s| s.take_change())
                    {
                        let value = normalized(panel, key, value);
                        if let Err(err) = panel.set(key, ControlValue::Number(value)) {
                            log::warn!("{}", err);
                        }
                    }
                }
                Row::Channel { key, channel, .. } => {
                    if let Some(value) = self.indented_mut::<Slider>(i).and_then(|s| s.take_change())
                    {
                        let edit = match panel.value(key) {
                            Ok(ControlValue::Color(color)) => Ok(with_channel(
                                color,
                                channel,
                                value.round().clamp(0.0, 255.0) as u8,
                            )),
                            Ok(_) => Err(format!("Control {} is not a color", key)),
                            Err(err) => Err(err.to_string()),
                        }
                        .and_then(|color| {
                            panel
                                .set(key, ControlValue::Color(color))
                                .map_err(|err| err.to_string())
                        });
                        if let Err(err) = edit {
                            log::warn!("{}", err);
                        }
                    }
                }
                _ => {}
            }
        }

        let rows = rows(panel, status);
        if restructure || !same_structure(&rows, &self.rows) {
            self.rebuild(rows);
        } else {
            self.sync(rows);
        }
    }

    /// Places the panel in the top-right corner of a window `window_size` logical pixels large.
    pub fn layout(&mut self, window_size: Vec2) {
        let cursor = Vec2::new(
            (window_size.x - PANEL_WIDTH - MARGIN).max(0.0),
            MARGIN,
        );
        self.column.layout(&LayoutContext {
            max_size: window_size,
            cursor,
        });
    }

    pub fn draw(&self, ui_renderer: &mut UIRenderer) {
        self.column.draw(ui_renderer);
        ui_renderer.finish();
    }

    /// Whether pointer input at `point` belongs to the panel rather than the scene.
    pub fn captures_mouse(&self, point: Vec2) -> bool {
        let (position, size) = self.column.bounds();
        let dragging = (0..self.rows.len()).any(|i| {
            self.column
                .get_widget::<Indented<Slider>>(i)
                .is_some_and(|s| s.0.is_dragging())
        });
        dragging || contains(position, size, point)
    }
}

/// Shifts a widget right by a fixed indent.
struct Indented<W>(W);

const INDENT: f32 = 8.0;

impl<W: Widget + 'static> Widget for Indented<W> {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        self.0.size_hint() + Vec2::new(INDENT, 0.0)
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.0.update(ctx);
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.0.layout(&LayoutContext {
            max_size: ctx.max_size - Vec2::new(INDENT, 0.0),
            cursor: ctx.cursor + Vec2::new(INDENT, 0.0),
        }) + Vec2::new(INDENT, 0.0)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        self.0.draw(ui_renderer);
    }
}

#[cfg(test)]
mod tests {
    use chalice_core::controls::{BG_COLOR, HIGHLIGHT, INTENSITY};

    use super::*;

    #[test]
    fn test_collapsed_panel_shows_only_title() {
        let panel = ControlPanel::new();
        assert_eq!(rows(&panel, None), vec![Row::Title { collapsed: true }]);
    }

    #[test]
    fn test_status_line_shows_while_collapsed() {
        let panel = ControlPanel::new();
        let rows = rows(&panel, Some("could not load"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], Row::Status("could not load".to_string()));
    }

    #[test]
    fn test_expanded_rows_follow_folders() {
        let mut panel = ControlPanel::new();
        panel.collapsed = false;
        let rows = rows(&panel, None);

        let folders: Vec<_> = rows
            .iter()
            .filter_map(|r| match r {
                Row::Folder { name, .. } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(folders, vec!["Scene Settings", "Environment Settings"]);

        let channels = rows
            .iter()
            .filter(|r| matches!(r, Row::Channel { key, .. } if *key == HIGHLIGHT))
            .count();
        assert_eq!(channels, 3);
        assert!(rows.contains(&Row::Swatch {
            key: BG_COLOR,
            color: Color::WHITE
        }));
        assert!(rows.iter().any(|r| matches!(
            r,
            Row::Number { key, value, min, max, .. }
                if *key == INTENSITY && *value == 1.5 && *min == 0.0 && *max == 5.0
        )));
    }

    #[test]
    fn test_collapsed_folder_hides_controls() {
        let mut panel = ControlPanel::new();
        panel.collapsed = false;
        panel.folders_mut()[1].collapsed = true;
        let rows = rows(&panel, None);
        assert!(!rows.iter().any(|r| matches!(r, Row::Number { .. })));
        assert!(rows.iter().any(|r| matches!(r, Row::Swatch { key, .. } if *key == BG_COLOR)));
    }

    #[test]
    fn test_value_changes_keep_structure() {
        let mut panel = ControlPanel::new();
        panel.collapsed = false;
        let before = rows(&panel, None);
        panel
            .set(BG_COLOR, ControlValue::Color(Color::new(10, 20, 30)))
            .unwrap();
        let after = rows(&panel, None);
        assert_ne!(before, after);
        assert!(same_structure(&before, &after));

        panel.folders_mut()[0].collapsed = true;
        assert!(!same_structure(&after, &rows(&panel, None)));
    }

    #[test]
    fn test_dragged_numbers_are_normalized() {
        let panel = ControlPanel::new();
        assert_eq!(normalized(&panel, INTENSITY, 7.0), 5.0);
        assert_eq!(normalized(&panel, INTENSITY, -1.0), 0.0);
        assert_eq!(normalized(&panel, INTENSITY, 2.34), 2.3);
        assert_eq!(normalized(&panel, "fog", 2.34), 2.34);
    }

    #[test]
    fn test_with_channel() {
        let color = Color::new(1, 2, 3);
        assert_eq!(with_channel(color, 0, 9), Color::new(9, 2, 3));
        assert_eq!(with_channel(color, 2, 9), Color::new(1, 2, 9));
        assert_eq!(with_channel(color, 5, 9), color);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("abcdef", 4), "abcd\nef");
        assert_eq!(wrap("abc", 10), "abc");
        assert_eq!(wrap("", 3), "");
    }
}
