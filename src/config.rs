use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encode::SessionOpts;
use crate::encode::ffmpeg::DEFAULT_VIDEO_BITRATE;
use crate::encode::sink::Container;
use crate::encode::still::DEFAULT_JPEG_QUALITY;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::SurfaceOpts;
use crate::replay::Pacing;

/// Runtime configuration shared by the CLI and the HTTP service.
///
/// Every field has a default, so an empty JSON object (or no file at all) is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub canvas: Canvas,
    /// JPEG quality of synthesized stills, `1..=100`.
    pub jpeg_quality: u8,
    pub container: Container,
    /// Target bitrate (bits/s) for ffmpeg-encoded containers.
    pub video_bitrate: u32,
    /// Font file for the overlay text. A bold system sans-serif is used when unset.
    pub font_path: Option<PathBuf>,
    pub bind: SocketAddr,
    pub pacing: Pacing,
    /// Where ffmpeg writes the clip before it is read back. The system temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            container: Container::WebM,
            video_bitrate: DEFAULT_VIDEO_BITRATE,
            font_path: None,
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            pacing: Pacing::Realtime,
            scratch_dir: None,
        }
    }
}

impl ReelConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let f = std::fs::File::open(path).map_err(|e| {
            ReelError::validation(format!("failed to open config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(std::io::BufReader::new(f)).map_err(|e| {
            ReelError::serde(format!("failed to parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `from_path` when a path is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> ReelResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ReelError::validation("jpeg_quality must be within 1..=100"));
        }
        if self.container == Container::Raw {
            return Err(ReelError::validation(
                "container must be one of webm, mp4, gif",
            ));
        }
        if self.video_bitrate == 0 {
            return Err(ReelError::validation("video_bitrate must be non-zero"));
        }
        Ok(())
    }

    pub fn surface_opts(&self) -> SurfaceOpts {
        SurfaceOpts {
            font_path: self.font_path.clone(),
        }
    }

    pub fn session_opts(&self) -> SessionOpts {
        let mut opts = SessionOpts {
            bitrate: self.video_bitrate,
            ..SessionOpts::default()
        };
        if let Some(dir) = &self.scratch_dir {
            opts.scratch_dir = dir.clone();
        }
        opts
    }
}
