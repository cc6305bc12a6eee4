use gif::{Encoder, Frame, Repeat};

use crate::encode::sink::{CaptureConfig, CaptureGuard, CaptureSession, Container, EncodedVideo};
use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::flatten_premul_to_rgb8;
use crate::render::surface::FrameRGBA;

/// NeuQuant sampling speed passed to `gif` (1 = best, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// In-process animated GIF encoder. Loops forever.
pub struct GifCapture {
    guard: CaptureGuard,
    encoder: Option<Encoder<Vec<u8>>>,
    written: u64,
}

impl GifCapture {
    pub fn new() -> Self {
        Self {
            guard: CaptureGuard::default(),
            encoder: None,
            written: 0,
        }
    }
}

impl Default for GifCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay for the `n`-th frame in centiseconds.
///
/// GIF delays are whole centiseconds, so delays are rounded against the running clock to keep the
/// total duration exact over the clip (30 fps alternates 3 and 4).
pub(crate) fn frame_delay_cs(n: u64, fps: FrameRate) -> u16 {
    let fps = u64::from(fps.get());
    let at = |k: u64| (k * 100 + fps / 2) / fps;
    let delay = at(n + 1) - at(n);
    u16::try_from(delay).unwrap_or(u16::MAX).max(1)
}

impl CaptureSession for GifCapture {
    fn container(&self) -> Container {
        Container::Gif
    }

    fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        let (Ok(w), Ok(h)) = (u16::try_from(cfg.width), u16::try_from(cfg.height)) else {
            return Err(ReelError::validation("gif width/height must fit in u16"));
        };
        self.guard.begin(cfg)?;

        let mut encoder = Encoder::new(Vec::new(), w, h, &[])
            .map_err(|e| ReelError::encode(format!("failed to create gif encoder: {e}")))?;
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ReelError::encode(format!("failed to set gif repeat: {e}")))?;
        self.encoder = Some(encoder);
        self.written = 0;
        Ok(())
    }

    fn capture(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self.guard.check(idx, frame)?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ReelError::encode("gif capture is already finalized"))?;

        let rgb = flatten_premul_to_rgb8(&frame.data, [0, 0, 0]);
        let mut gif_frame =
            Frame::from_rgb_speed(cfg.width as u16, cfg.height as u16, &rgb, QUANTIZE_SPEED);
        gif_frame.delay = frame_delay_cs(self.written, cfg.fps);

        encoder
            .write_frame(&gif_frame)
            .map_err(|e| ReelError::encode(format!("failed to write gif frame: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        let (cfg, frame_count) = self.guard.end()?;
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| ReelError::encode("gif capture not started"))?;
        let bytes = encoder
            .into_inner()
            .map_err(|e| ReelError::encode(format!("failed to finalize gif: {e}")))?;

        Ok(EncodedVideo {
            container: Container::Gif,
            bytes: bytes.into(),
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            frame_count,
        })
    }
}
