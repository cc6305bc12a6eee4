use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index within a synthesized sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Supported playback rates.
///
/// Serialized as the bare integer (`15`, `24`, `30`, `60`); anything else is rejected.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    Fps15,
    Fps24,
    #[default]
    Fps30,
    Fps60,
}

impl FrameRate {
    pub const ALL: [FrameRate; 4] = [Self::Fps15, Self::Fps24, Self::Fps30, Self::Fps60];

    pub fn new(fps: u32) -> ReelResult<Self> {
        match fps {
            15 => Ok(Self::Fps15),
            24 => Ok(Self::Fps24),
            30 => Ok(Self::Fps30),
            60 => Ok(Self::Fps60),
            other => Err(ReelError::validation(format!(
                "unsupported frame rate {other} (expected one of 15, 24, 30, 60)"
            ))),
        }
    }

    pub fn get(self) -> u32 {
        match self {
            Self::Fps15 => 15,
            Self::Fps24 => 24,
            Self::Fps30 => 30,
            Self::Fps60 => 60,
        }
    }

    /// Delay between two replayed frames (`1000 / fps` milliseconds).
    pub fn frame_interval(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.get()))
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = ReelError;

    fn try_from(value: u32) -> ReelResult<Self> {
        Self::new(value)
    }
}

impl From<FrameRate> for u32 {
    fn from(value: FrameRate) -> Self {
        value.get()
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Canvas {
    pub fn validate(self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ReelError::validation(format!(
                "canvas {}x{} exceeds the {}px surface limit",
                self.width,
                self.height,
                u16::MAX
            )));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p video output)",
            ));
        }
        Ok(())
    }

    pub fn byte_len_rgba8(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
