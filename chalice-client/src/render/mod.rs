//! Everything that draws: the model pass, the dither pass and the UI.

pub mod dither;
pub mod model;
pub mod ui;
