use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::FrameRGBA;

/// Output container (and implied codec) of an encoded clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// VP9 in WebM via system `ffmpeg`.
    #[default]
    WebM,
    /// H.264 in MP4 via system `ffmpeg`.
    Mp4,
    /// Animated GIF, encoded in-process.
    Gif,
    /// Concatenated raw premultiplied RGBA8 frames.
    Raw,
}

impl Container {
    pub fn mime(self) -> &'static str {
        match self {
            Self::WebM => "video/webm",
            Self::Mp4 => "video/mp4",
            Self::Gif => "image/gif",
            Self::Raw => "application/octet-stream",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
            Self::Raw => "rgba",
        }
    }

    /// Whether encoding shells out to `ffmpeg`.
    pub fn needs_ffmpeg(self) -> bool {
        matches!(self, Self::WebM | Self::Mp4)
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Configuration handed to a [`CaptureSession`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub fps: FrameRate,
}

/// A finished clip held in memory.
#[derive(Clone, Debug)]
pub struct EncodedVideo {
    pub container: Container,
    pub bytes: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub fps: FrameRate,
    pub frame_count: u64,
}

impl EncodedVideo {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Suggested download name, e.g. `generated-video.webm`.
    pub fn file_name(&self) -> String {
        format!("generated-video.{}", self.container.extension())
    }
}

/// Observes the drawing surface during replay and incrementally encodes what it sees.
///
/// Ordering contract: `capture` is called in strictly increasing `FrameIndex` order, between one
/// `begin` and one `finish`.
pub trait CaptureSession: Send {
    fn container(&self) -> Container;
    /// Called once before any frame is captured.
    fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()>;
    /// Capture the surface content for frame `idx`.
    fn capture(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// End of stream: finalize and return the encoded clip.
    fn finish(&mut self) -> ReelResult<EncodedVideo>;
}

impl<T: CaptureSession + ?Sized> CaptureSession for Box<T> {
    fn container(&self) -> Container {
        (**self).container()
    }

    fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        (**self).begin(cfg)
    }

    fn capture(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        (**self).capture(idx, frame)
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        (**self).finish()
    }
}

/// Shared ordering / size checks used by the built-in sessions.
#[derive(Debug, Default)]
pub(crate) struct CaptureGuard {
    cfg: Option<CaptureConfig>,
    last_idx: Option<FrameIndex>,
    count: u64,
}

impl CaptureGuard {
    pub(crate) fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        if self.cfg.is_some() {
            return Err(ReelError::encode("capture session already started"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "capture width/height must be non-zero",
            ));
        }
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.count = 0;
        Ok(())
    }

    pub(crate) fn check(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<CaptureConfig> {
        let cfg = self
            .cfg
            .ok_or_else(|| ReelError::encode("capture session not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReelError::encode(format!(
                "capture received out-of-order frame {} after {}",
                idx.0, last.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);
        self.count += 1;
        Ok(cfg)
    }

    pub(crate) fn end(&mut self) -> ReelResult<(CaptureConfig, u64)> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| ReelError::encode("capture session not started"))?;
        Ok((cfg, self.count))
    }
}

/// Keeps every captured frame; `finish` yields them as a [`Container::Raw`] stream.
#[derive(Debug, Default)]
pub struct InMemoryCapture {
    guard: CaptureGuard,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemoryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames captured so far, in capture order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }
}

impl CaptureSession for InMemoryCapture {
    fn container(&self) -> Container {
        Container::Raw
    }

    fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        self.guard.begin(cfg)?;
        self.frames.clear();
        Ok(())
    }

    fn capture(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        self.guard.check(idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        let (cfg, frame_count) = self.guard.end()?;
        let bytes: Vec<u8> = self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect();
        Ok(EncodedVideo {
            container: Container::Raw,
            bytes: bytes.into(),
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            frame_count,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
