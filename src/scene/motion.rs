//! Per-frame scene evaluation.
//!
//! Everything here is a pure function of `progress` (and the overlay text), expressed in a
//! fixed 1920x1080 design space. The rasterizer scales design space to the actual canvas.

use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Point, Vec2};
use crate::scene::color::Rgba;

/// Design-space width.
pub const DESIGN_WIDTH: f64 = 1920.0;
/// Design-space height.
pub const DESIGN_HEIGHT: f64 = 1080.0;

/// Number of orbiting circles.
pub const CIRCLE_COUNT: usize = 5;
const ORBIT_REVOLUTIONS: f64 = 3.0;
const ORBIT_RADIUS: Vec2 = Vec2::new(400.0, 300.0);
const CIRCLE_BASE_RADIUS: f64 = 50.0;
const CIRCLE_RADIUS_SWING: f64 = 30.0;

const TEXT_BASE_SIZE: f64 = 120.0;
const TEXT_SIZE_SWING: f64 = 20.0;

/// Two-stop linear gradient running from the top-left to the bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagonalGradient {
    pub hue_start: f64,
    pub hue_end: f64,
    pub start: Rgba,
    pub end: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCircle {
    pub center: Point,
    pub radius: f64,
    pub color: Rgba,
}

/// Drop shadow applied to the text overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    pub color: Rgba,
    /// Canvas-style blur amount; the gaussian sigma is half of this.
    pub blur: f64,
    pub offset: Vec2,
}

impl TextShadow {
    pub fn sigma(&self) -> f64 {
        self.blur / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub font_size: f64,
    pub center: Point,
    pub color: Rgba,
    pub shadow: TextShadow,
}

/// Fully evaluated scene for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneFrame {
    pub progress: f64,
    pub background: DiagonalGradient,
    pub circles: [OrbitCircle; CIRCLE_COUNT],
    pub text: Option<TextOverlay>,
}

impl SceneFrame {
    pub fn at(progress: f64, text: Option<&str>) -> Self {
        let background = gradient_at(progress);
        let circles =
            std::array::from_fn(|j| orbit_circle_at(progress, j, background.hue_start));
        let text = text
            .filter(|t| !t.is_empty())
            .map(|t| text_overlay_at(progress, t));
        Self {
            progress,
            background,
            circles,
            text,
        }
    }
}

/// Hue rotates one full turn over the animation; the end stop sits opposite.
pub fn gradient_at(progress: f64) -> DiagonalGradient {
    let hue_start = (progress * 360.0) % 360.0;
    let hue_end = (progress * 360.0 + 180.0) % 360.0;
    DiagonalGradient {
        hue_start,
        hue_end,
        start: Rgba::hsl(hue_start, 0.7, 0.5),
        end: Rgba::hsl(hue_end, 0.7, 0.3),
    }
}

pub fn orbit_circle_at(progress: f64, j: usize, hue_start: f64) -> OrbitCircle {
    let jf = j as f64;
    let angle = progress * TAU * ORBIT_REVOLUTIONS + jf * TAU / CIRCLE_COUNT as f64;
    let center = Point::new(
        DESIGN_WIDTH / 2.0 + angle.cos() * ORBIT_RADIUS.x,
        DESIGN_HEIGHT / 2.0 + angle.sin() * ORBIT_RADIUS.y,
    );
    let radius = CIRCLE_BASE_RADIUS + (progress * PI * 4.0 + jf).sin() * CIRCLE_RADIUS_SWING;
    OrbitCircle {
        center,
        radius,
        color: Rgba::hsla((hue_start + jf * 60.0) % 360.0, 0.8, 0.6, 0.5),
    }
}

pub fn text_overlay_at(progress: f64, text: &str) -> TextOverlay {
    TextOverlay {
        text: text.to_owned(),
        font_size: TEXT_BASE_SIZE + (progress * TAU).sin() * TEXT_SIZE_SWING,
        center: Point::new(DESIGN_WIDTH / 2.0, DESIGN_HEIGHT / 2.0),
        color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        shadow: TextShadow {
            color: Rgba::new(0.0, 0.0, 0.0, 0.8),
            blur: 20.0,
            offset: Vec2::new(5.0, 5.0),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/motion.rs"]
mod tests;
