//! Scene description: animation parameters, colors and per-frame motion.

pub mod color;
pub mod motion;
pub mod params;
