//! Responsive sizing of the model.
//!
//! The model scale follows the viewport width across two tiers. [`ResponsiveSizing`] listens to
//! [`ResizeEvents`] and publishes tier changes into an [`Observable<ViewportState>`].

use crate::observe::{Observable, Signal, Subscription};

/// Widths at or below this many logical pixels use the compact tier.
pub const COMPACT_MAX_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportTier {
    Compact,
    Normal,
}

impl ViewportTier {
    pub fn from_width(width: u32) -> Self {
        if width <= COMPACT_MAX_WIDTH {
            ViewportTier::Compact
        } else {
            ViewportTier::Normal
        }
    }

    /// The model scale used in this tier.
    pub fn model_scale(self) -> f32 {
        match self {
            ViewportTier::Compact => 2.4,
            ViewportTier::Normal => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub tier: ViewportTier,
}

impl ViewportState {
    pub fn from_width(width: u32) -> Self {
        Self {
            tier: ViewportTier::from_width(width),
        }
    }

    pub fn model_scale(&self) -> f32 {
        self.tier.model_scale()
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            tier: ViewportTier::Normal,
        }
    }
}

/// Window resize notifications. The payload is the new width in logical pixels.
pub type ResizeEvents = Signal<u32>;

/// Keeps a [`ViewportState`] in sync with resize events.
pub struct ResponsiveSizing {
    state: Observable<ViewportState>,
}

impl ResponsiveSizing {
    pub fn new(state: Observable<ViewportState>) -> Self {
        Self { state }
    }

    /// Applies the width at mount time and subscribes to later resizes.
    ///
    /// The returned guard owns the subscription; no callbacks fire once it is dropped.
    pub fn mount(&self, initial_width: u32, events: &ResizeEvents) -> Subscription {
        Self::apply(&self.state, initial_width);
        let state = self.state.clone();
        events.subscribe(move |width| Self::apply(&state, *width))
    }

    fn apply(state: &Observable<ViewportState>, width: u32) {
        let next = ViewportState::from_width(width);
        if state.get() != next {
            log::debug!("Viewport width {} switches tier to {:?}", width, next.tier);
            state.set(next);
        }
    }
}
