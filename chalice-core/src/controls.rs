//! The debug control panel model.
//!
//! [`ControlPanel`] declares the tunable controls, grouped into named folders, and bridges edits
//! into an [`Observable<SceneParameters>`]. The control surface clamps and snaps numeric edits
//! with [`ControlSpec::normalize`] before handing them over. [`ControlPanel::set`] stores what
//! it is given.

use crate::{
    Color,
    observe::{Observable, Subscription},
};

pub const BG_COLOR: &str = "bgColor";
pub const INTENSITY: &str = "intensity";
pub const HIGHLIGHT: &str = "highlight";

/// The live, user-tunable scene parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParameters {
    pub background: Color,
    pub environment_intensity: f32,
    pub highlight: Color,
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            environment_intensity: 1.5,
            highlight: Color::new(0x06, 0x6a, 0xff),
        }
    }
}

/// The kind and bounds of a single control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlSpec {
    Color { default: Color },
    Number {
        default: f32,
        min: f32,
        max: f32,
        step: f32,
    },
}

impl ControlSpec {
    /// Clamps a numeric input to the declared bounds and snaps it to the step grid.
    ///
    /// Returns the input unchanged for color controls.
    pub fn normalize(&self, value: f32) -> f32 {
        match *self {
            ControlSpec::Number { min, max, step, .. } => {
                if !value.is_finite() {
                    return if value == f32::INFINITY { max } else { min };
                }
                let clamped = value.clamp(min, max);
                if step <= 0.0 {
                    return clamped;
                }
                let steps = ((clamped - min) / step).round();
                // Round away the float noise from `min + n * step`.
                let snapped = ((min + steps * step) * 1e4).round() / 1e4;
                snapped.clamp(min, max)
            }
            ControlSpec::Color { .. } => value,
        }
    }
}

/// One declared control.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub key: &'static str,
    pub label: &'static str,
    pub spec: ControlSpec,
}

/// A named group of controls that can be folded in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: &'static str,
    pub controls: Vec<Control>,
    pub collapsed: bool,
}

/// The value of a control as read or written by the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Color(Color),
    Number(f32),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),
    #[error("Control {0} does not accept this kind of value")]
    WrongKind(String),
}

/// The declared controls plus the parameters they drive.
pub struct ControlPanel {
    folders: Vec<Folder>,
    params: Observable<SceneParameters>,
    pub collapsed: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    /// Declares the "Scene Settings" and "Environment Settings" folders with their defaults.
    pub fn new() -> Self {
        let defaults = SceneParameters::default();
        let folders = vec![
            Folder {
                name: "Scene Settings",
                controls: vec![Control {
                    key: BG_COLOR,
                    label: "Background Color",
                    spec: ControlSpec::Color {
                        default: defaults.background,
                    },
                }],
                collapsed: false,
            },
            Folder {
                name: "Environment Settings",
                controls: vec![
                    Control {
                        key: INTENSITY,
                        label: "Environment Intensity",
                        spec: ControlSpec::Number {
                            default: defaults.environment_intensity,
                            min: 0.0,
                            max: 5.0,
                            step: 0.1,
                        },
                    },
                    Control {
                        key: HIGHLIGHT,
                        label: "Highlight Color",
                        spec: ControlSpec::Color {
                            default: defaults.highlight,
                        },
                    },
                ],
                collapsed: false,
            },
        ];

        Self {
            folders,
            params: Observable::new(defaults),
            collapsed: true,
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folders_mut(&mut self) -> &mut [Folder] {
        &mut self.folders
    }

    /// Looks up a control declaration by key.
    pub fn control(&self, key: &str) -> Option<&Control> {
        self.folders
            .iter()
            .flat_map(|f| f.controls.iter())
            .find(|c| c.key == key)
    }

    /// Returns the current parameters.
    pub fn params(&self) -> SceneParameters {
        self.params.get()
    }

    /// Returns a handle to the observable parameters.
    pub fn observable(&self) -> Observable<SceneParameters> {
        self.params.clone()
    }

    pub fn subscribe(&self, callback: impl FnMut(&SceneParameters) + 'static) -> Subscription {
        self.params.subscribe(callback)
    }

    /// Reads the current value of a control.
    pub fn value(&self, key: &str) -> Result<ControlValue, ControlError> {
        let params = self.params.get();
        match key {
            BG_COLOR => Ok(ControlValue::Color(params.background)),
            INTENSITY => Ok(ControlValue::Number(params.environment_intensity)),
            HIGHLIGHT => Ok(ControlValue::Color(params.highlight)),
            _ => Err(ControlError::UnknownControl(key.to_string())),
        }
    }

    /// Applies an edit coming from the control surface. Values are stored as given; range
    /// checks belong to the surface. Edits that do not change the value do not notify
    /// subscribers.
    pub fn set(&self, key: &str, value: ControlValue) -> Result<(), ControlError> {
        if self.control(key).is_none() {
            return Err(ControlError::UnknownControl(key.to_string()));
        }

        let mut params = self.params.get();
        match (key, value) {
            (BG_COLOR, ControlValue::Color(c)) => params.background = c,
            (HIGHLIGHT, ControlValue::Color(c)) => params.highlight = c,
            (INTENSITY, ControlValue::Number(n)) => params.environment_intensity = n,
            _ => return Err(ControlError::WrongKind(key.to_string())),
        }

        if params != self.params.get() {
            log::debug!("Control {} set to {:?}", key, value);
            self.params.set(params);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn test_declared_controls_and_defaults() {
        let panel = ControlPanel::new();
        let names: Vec<_> = panel.folders().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Scene Settings", "Environment Settings"]);
        assert!(panel.collapsed);

        assert_eq!(
            panel.value(BG_COLOR).unwrap(),
            ControlValue::Color(Color::WHITE)
        );
        assert_eq!(panel.value(INTENSITY).unwrap(), ControlValue::Number(1.5));
        assert_eq!(
            panel.value(HIGHLIGHT).unwrap(),
            ControlValue::Color("#066aff".parse().unwrap())
        );
        assert_eq!(
            panel.control(INTENSITY).unwrap().spec,
            ControlSpec::Number {
                default: 1.5,
                min: 0.0,
                max: 5.0,
                step: 0.1
            }
        );
    }

    #[test]
    fn test_intensity_is_clamped() {
        let spec = ControlPanel::new().control(INTENSITY).unwrap().spec;
        assert_eq!(spec.normalize(1e9), 5.0);
        assert_eq!(spec.normalize(-42.0), 0.0);
        assert_eq!(spec.normalize(f32::NEG_INFINITY), 0.0);
        assert_eq!(spec.normalize(f32::INFINITY), 5.0);
    }

    #[test]
    fn test_set_stores_values_as_given() {
        let panel = ControlPanel::new();
        panel.set(INTENSITY, ControlValue::Number(2.34)).unwrap();
        assert_eq!(panel.params().environment_intensity, 2.34);
    }

    #[test]
    fn test_intensity_snaps_to_step() {
        let spec = ControlPanel::new().control(INTENSITY).unwrap().spec;
        assert_eq!(spec.normalize(2.34), 2.3);
        assert_eq!(spec.normalize(2.36), 2.4);
        assert_eq!(spec.normalize(0.3), 0.3);
        let half_step = spec.normalize(1.05);
        assert!(half_step == 1.0 || half_step == 1.1);
    }

    #[test]
    fn test_edits_notify_once_per_change() {
        let panel = ControlPanel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_cb = Rc::clone(&seen);
        let _sub = panel.subscribe(move |p| seen_cb.borrow_mut().push(p.background));

        let red = Color::new(0xff, 0, 0);
        panel.set(BG_COLOR, ControlValue::Color(red)).unwrap();
        panel.set(BG_COLOR, ControlValue::Color(red)).unwrap();

        assert_eq!(*seen.borrow(), vec![red]);
        assert_eq!(panel.params().background, red);
    }

    #[test]
    fn test_rejects_unknown_and_mismatched_edits() {
        let panel = ControlPanel::new();
        assert_eq!(
            panel.set("fog", ControlValue::Number(1.0)),
            Err(ControlError::UnknownControl("fog".to_string()))
        );
        assert_eq!(
            panel.set(INTENSITY, ControlValue::Color(Color::BLACK)),
            Err(ControlError::WrongKind(INTENSITY.to_string()))
        );
        assert_eq!(panel.params(), SceneParameters::default());
    }
}
