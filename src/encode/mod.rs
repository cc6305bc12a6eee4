//! Still-frame codec and the capture sessions that turn a replayed surface into a clip.

/// `ffmpeg`-based sessions (WebM / MP4 via system `ffmpeg`).
pub mod ffmpeg;
/// Animated GIF session, encoded in-process.
pub mod gif_enc;
/// Capture session trait and the in-memory session.
pub mod sink;
/// JPEG/PNG encoding of individual frames.
pub mod still;

use std::path::PathBuf;

use crate::foundation::error::ReelResult;

use self::ffmpeg::{FfmpegCapture, FfmpegCaptureOpts};
use self::gif_enc::GifCapture;
use self::sink::{CaptureSession, Container, InMemoryCapture};

/// Knobs shared by every container when opening a session.
#[derive(Clone, Debug)]
pub struct SessionOpts {
    pub bitrate: u32,
    pub scratch_dir: PathBuf,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            bitrate: ffmpeg::DEFAULT_VIDEO_BITRATE,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Open a fresh capture session for `container`.
pub fn open_session(container: Container, opts: &SessionOpts) -> ReelResult<Box<dyn CaptureSession>> {
    Ok(match container {
        Container::WebM | Container::Mp4 => {
            let mut ff = FfmpegCaptureOpts::new(container);
            ff.bitrate = opts.bitrate;
            ff.scratch_dir = opts.scratch_dir.clone();
            Box::new(FfmpegCapture::new(ff)?)
        }
        Container::Gif => Box::new(GifCapture::new()),
        Container::Raw => Box::new(InMemoryCapture::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_session_matches_container() {
        let opts = SessionOpts::default();
        for c in [Container::WebM, Container::Mp4, Container::Gif, Container::Raw] {
            assert_eq!(open_session(c, &opts).unwrap().container(), c);
        }
    }

    #[test]
    fn open_session_rejects_zero_bitrate_for_ffmpeg() {
        let opts = SessionOpts {
            bitrate: 0,
            ..SessionOpts::default()
        };
        assert!(open_session(Container::WebM, &opts).is_err());
        assert!(open_session(Container::Gif, &opts).is_ok());
    }
}
