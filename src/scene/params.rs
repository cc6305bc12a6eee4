use serde::{Deserialize, Serialize};

use crate::foundation::core::FrameRate;

/// Shortest clip, in seconds.
pub const MIN_DURATION_SECS: u32 = 1;
/// Longest clip, in seconds.
pub const MAX_DURATION_SECS: u32 = 10;

/// Clamp a user-entered duration into `MIN_DURATION_SECS..=MAX_DURATION_SECS`.
pub fn clamp_duration_secs(raw: i64) -> u32 {
    raw.clamp(i64::from(MIN_DURATION_SECS), i64::from(MAX_DURATION_SECS)) as u32
}

fn de_clamped_duration<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_duration_secs)
}

/// Inputs of one synthesis run. Fixed for the duration of the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationParams {
    /// Overlay text; `None` (or an empty string) draws no text.
    pub text: Option<String>,
    /// Clip length in seconds, always within `1..=10`.
    #[serde(deserialize_with = "de_clamped_duration")]
    duration_secs: u32,
    pub fps: FrameRate,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            text: None,
            duration_secs: 3,
            fps: FrameRate::Fps30,
        }
    }
}

impl AnimationParams {
    /// Build parameters, clamping `duration_secs` into range.
    pub fn new(text: Option<String>, duration_secs: i64, fps: FrameRate) -> Self {
        Self {
            text: text.filter(|t| !t.is_empty()),
            duration_secs: clamp_duration_secs(duration_secs),
            fps,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn overlay_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// `duration * fps`.
    pub fn total_frames(&self) -> u64 {
        u64::from(self.duration_secs) * u64::from(self.fps.get())
    }

    /// Normalized position of frame `i` in `[0, 1)`.
    pub fn progress(&self, i: u64) -> f64 {
        let total = self.total_frames();
        if total == 0 {
            return 0.0;
        }
        i as f64 / total as f64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/params.rs"]
mod tests;
