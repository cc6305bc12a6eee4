//! framereel renders a procedural gradient/particle animation on the CPU and turns it into a
//! downloadable clip.
//!
//! The pipeline has two phases sharing one drawing [`Surface`]:
//!
//! - [`FrameSynthesizer`] paints `duration * fps` frames and snapshots each one as a JPEG still
//! - [`StreamEncoder`] replays those stills at the frame rate while a [`CaptureSession`] records
//!   the surface, producing an [`EncodedVideo`]
//!
//! [`StudioHandle`] sequences both phases for the HTTP service in [`server`].
#![forbid(unsafe_code)]

mod foundation;

/// Runtime configuration.
pub mod config;
/// Capture sessions and still-image codecs.
pub mod encode;
/// Drawing surface and rasterization.
pub mod render;
/// Timed replay into a capture session.
pub mod replay;
/// Handles to encoded clips.
pub mod resource;
/// Pure per-frame scene math.
pub mod scene;
/// HTTP service.
pub mod server;
/// Session state driving synthesis and replay.
pub mod studio;
/// Frame synthesis.
pub mod synth;

pub use crate::foundation::core::{Affine, Canvas, FrameIndex, FrameRate, Point, Rect, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::config::ReelConfig;
pub use crate::encode::ffmpeg::{FfmpegCapture, FfmpegCaptureOpts, is_ffmpeg_on_path};
pub use crate::encode::gif_enc::GifCapture;
pub use crate::encode::sink::{
    CaptureConfig, CaptureSession, Container, EncodedVideo, InMemoryCapture,
};
pub use crate::encode::{SessionOpts, open_session};
pub use crate::render::surface::{FrameRGBA, Surface, SurfaceOpts};
pub use crate::render::text::{OverlayFont, resolve_overlay_font};
pub use crate::replay::{Pacing, ReplaySchedule, ReplayStep, Replayed, StreamEncoder};
pub use crate::resource::{VideoHandle, VideoStore};
pub use crate::scene::color::Rgba;
pub use crate::scene::motion::SceneFrame;
pub use crate::scene::params::{AnimationParams, MAX_DURATION_SECS, MIN_DURATION_SECS};
pub use crate::studio::{StudioHandle, StudioState};
pub use crate::synth::{Frame, FrameSequence, FrameSynthesizer};
